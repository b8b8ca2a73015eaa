//! Alloy contract bindings for the on-chain surfaces the engine touches.

pub mod cctp;
pub mod ens;
pub mod erc20;
pub mod multicaller;
pub mod price_feed;

pub use cctp::{IMessageTransmitter, ITokenMessenger};
pub use ens::{IAddrResolver, IEnsRegistry, ENS_REGISTRY};
pub use erc20::IErc20;
pub use multicaller::IMulticallerWithPermit;
pub use price_feed::AggregatorV3;
