//! # pathway-rs
//!
//! Transfer engine and relay pipeline for USDC transfers between Noble and
//! EVM chains over Circle's Cross-Chain Transfer Protocol.
//!
//! The crate has two halves:
//!
//! - The **engine** (`path`, `fees`, `deposit`, `receive`): validates a
//!   transfer path, quotes both legs in USDC, executes the source-chain
//!   burn, and submits the attested mint on the destination.
//! - The **relay pipeline** (`store`, `queue`, `relay`, `api`): a set of
//!   queue-fed stages that carry a submitted transfer from burn confirmation
//!   through attestation to the destination mint, with at-least-once
//!   delivery and per-record retry state.
//!
//! ## Quoting a transfer
//!
//! ```rust,no_run
//! use pathway_rs::{Chain, Clients, Config, FeeEstimator, Path};
//! use alloy_primitives::U256;
//!
//! # async fn example() -> pathway_rs::Result<()> {
//! let config = Config::load()?;
//! let clients = Clients::from_config(&config)?;
//!
//! let path = Path {
//!     from_chain: Chain::Base,
//!     to_chain: Chain::Noble,
//!     sender_address: "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504".into(),
//!     receiver_address: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".into(),
//!     amount: U256::from(25_000_000u64),
//!     fee: U256::ZERO,
//! };
//!
//! let quote = FeeEstimator::new(&clients).quote(&path).await?;
//! println!("routing fee: {}", quote.estimated_fee.routing_fee.amount);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the pipeline
//!
//! ```rust,no_run
//! use pathway_rs::relay::RelayContext;
//! use pathway_rs::{Clients, Config, InMemoryStore, Queues};
//!
//! # async fn example() -> pathway_rs::Result<()> {
//! let config = Config::load()?;
//! let ctx = RelayContext {
//!     clients: Clients::from_config(&config)?,
//!     store: InMemoryStore::new(),
//!     queues: Queues::in_memory(),
//!     relay: config.relay.clone(),
//! };
//! ctx.run().await
//! # }
//! ```

pub mod api;
pub mod chain;
pub mod clients;
pub mod config;
pub mod contracts;
pub mod deposit;
pub mod error;
pub mod fees;
pub mod message;
pub mod path;
pub mod protocol;
pub mod queue;
pub mod receive;
pub mod relay;
pub mod spans;
pub mod store;

pub use chain::Chain;
pub use clients::{Clients, NobleClient};
pub use config::{Config, Platform};
pub use deposit::{deposit_for_burn_with_caller, DepositOutcome};
pub use error::{PathwayError, Result};
pub use fees::{routing_fee, FeeEstimator};
pub use message::{Call, CallKind, MessageKey, Quote, ReceiveMessage, Status};
pub use path::Path;
pub use protocol::{AttestationClient, BurnMessage, DepositEvents};
pub use queue::{InMemoryQueue, MessageQueue, Queues};
pub use receive::{receive, receive_with, CallSubmitter, DirectSubmitter, ReceiveOutcome};
pub use store::{InMemoryStore, MessageStore, StatusUpdate};
