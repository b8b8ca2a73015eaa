//! Failsafe sweep: a second chance for stranded failed records.
//!
//! The scheduler already routes due failed records to the retry queue; this
//! periodic sweep does the same thing independently, so a scheduler outage
//! or a dropped queue delivery cannot strand a record forever.

use chrono::Utc;
use tracing::debug;

use crate::error::Result;
use crate::message::Status;
use crate::queue::{send_batch, MessageQueue};
use crate::spans;
use crate::store::MessageStore;

use super::{BatchReport, RelayContext};

pub async fn run<S, Q>(ctx: &RelayContext<S, Q>) -> Result<BatchReport>
where
    S: MessageStore,
    Q: MessageQueue,
{
    let now = Utc::now();
    let due: Vec<_> = ctx
        .store
        .scan_by_status(Status::Failed)
        .await?
        .into_iter()
        .filter(|record| record.retry_at.map_or(true, |at| at <= now))
        .map(|record| record.key)
        .collect();

    let span = spans::relay_stage("failsafe", due.len());
    let _guard = span.enter();

    if !due.is_empty() {
        debug!(count = due.len(), "failsafe re-enqueueing failed records");
        send_batch(&ctx.queues.retry, due).await?;
    }
    Ok(BatchReport::ok())
}
