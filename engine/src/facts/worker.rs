//! The single long-lived verification worker.
//!
//! Drains the claim queue in FIFO order, gating pipeline *starts* by the
//! configured rate limit. The gate is measured from the previous start, not
//! the previous finish, so a long verification naturally widens the gap and
//! no extra delay is stacked on top.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::FactEngine;
use crate::events::Notification;

/// Long-lived consumer of the claim queue.
pub struct FactWorker {
    engine: Arc<FactEngine>,
    rate_limit: Duration,
    cancel: CancellationToken,
}

impl FactWorker {
    pub fn new(engine: Arc<FactEngine>, rate_limit: Duration, cancel: CancellationToken) -> Self {
        Self {
            engine,
            rate_limit,
            cancel,
        }
    }

    /// Run until cancelled. Cancellation is only observed between claims, at
    /// the dequeue suspension point; an in-flight verification always runs to
    /// completion.
    pub async fn run(self) {
        info!(rate_limit = ?self.rate_limit, "fact worker started");
        let mut last_start: Option<Instant> = None;

        loop {
            let claim = tokio::select! {
                _ = self.cancel.cancelled() => break,
                claim = self.engine.state().dequeue_claim() => match claim {
                    Some(claim) => claim,
                    None => break,
                },
            };

            if let Some(previous) = last_start {
                let next_start = previous + self.rate_limit;
                if next_start > Instant::now() {
                    debug!("rate limit active, waiting for next verification slot");
                }
                tokio::time::sleep_until(next_start).await;
            }
            last_start = Some(Instant::now());

            info!(claim = %claim, "processing fact check");
            if let Err(err) = self.engine.verify_claim(&claim).await {
                warn!(error = %err, claim = %claim, "fact check failed, moving on");
                self.engine
                    .sink()
                    .emit(Notification::from_error(&err))
                    .await;
            }
        }

        info!("fact worker stopped");
    }
}
