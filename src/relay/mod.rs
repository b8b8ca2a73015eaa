//! The relay pipeline.
//!
//! Five queue-fed stages plus two periodic sweeps move a transfer record
//! from `waiting` to `received`:
//!
//! ```text
//!            scheduler (periodic sweep)
//!           /         |          \
//!   execution    attestation     retry ----> relay executor
//!   (waiting ->  (pending ->       ^          (attested -> received,
//!    pending)     attested) -------+------->   failure -> failed)
//!                                failsafe (periodic failed-sweep)
//! ```
//!
//! Queues carry only message keys; each stage re-reads the record, so any
//! entry may be delivered more than once without harm. A stage reports the
//! keys that need redelivery in its [`BatchReport`] and never aborts a batch
//! for one bad record.

pub mod attestation;
pub mod execution;
pub mod executor;
pub mod failsafe;
pub mod retry;
pub mod scheduler;

use std::time::Duration;

use tracing::{error, info};

use crate::clients::Clients;
use crate::config::RelayConfig;
use crate::error::Result;
use crate::message::MessageKey;
use crate::queue::{MessageQueue, Queues, MAX_BATCH_SIZE};
use crate::store::MessageStore;

/// Outcome of one stage run over one batch: only the keys to redeliver.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub failures: Vec<MessageKey>,
}

impl BatchReport {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything a stage needs, built once at startup.
pub struct RelayContext<S, Q>
where
    S: MessageStore,
    Q: MessageQueue,
{
    pub clients: Clients,
    pub store: S,
    pub queues: Queues<Q>,
    pub relay: RelayConfig,
}

impl<S, Q> RelayContext<S, Q>
where
    S: MessageStore,
    Q: MessageQueue,
{
    /// One full pass: periodic sweeps, then every queue drained through its
    /// stage. Each queue is snapshotted before its stage runs, and
    /// redelivery failures go back on afterwards, so a record that keeps
    /// failing is seen once per tick and waits out the sweep interval
    /// between attempts.
    pub async fn tick(&self) -> Result<()> {
        scheduler::run(self).await?;
        failsafe::run(self).await?;

        for batch in Self::drain(&self.queues.execution).await? {
            let report = execution::run(self, batch).await;
            self.requeue(&self.queues.execution, report).await?;
        }

        for batch in Self::drain(&self.queues.attestation).await? {
            let report = attestation::run(self, batch).await;
            self.requeue(&self.queues.attestation, report).await?;
        }

        for batch in Self::drain(&self.queues.retry).await? {
            let report = retry::run(self, batch).await;
            self.requeue(&self.queues.retry, report).await?;
        }

        for batch in Self::drain(&self.queues.relay).await? {
            let report = executor::run(self, batch).await;
            self.requeue(&self.queues.relay, report).await?;
        }

        Ok(())
    }

    /// Take everything currently on a queue, in stage-sized batches.
    async fn drain(queue: &Q) -> Result<Vec<Vec<MessageKey>>> {
        let mut batches = Vec::new();
        loop {
            let batch = queue.receive(MAX_BATCH_SIZE).await?;
            if batch.is_empty() {
                return Ok(batches);
            }
            batches.push(batch);
        }
    }

    /// Tick forever at the configured sweep interval.
    pub async fn run(&self) -> Result<()> {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.relay.sweep_interval_ms));
        info!(
            sweep_interval_ms = self.relay.sweep_interval_ms,
            "relay pipeline started"
        );
        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                error!(error = %e, "relay tick failed");
            }
        }
    }

    async fn requeue(&self, queue: &Q, report: BatchReport) -> Result<()> {
        if !report.is_clean() {
            crate::queue::send_batch(queue, report.failures).await?;
        }
        Ok(())
    }
}
