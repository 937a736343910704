use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::storage::{shared::SharedUsageLog, usage_store::UsageStore};

/// Persists the shared log. Saves happen every `interval` and once more after shutdown is
/// requested, so at most one interval of data is lost if the process is killed outright.
pub struct AutosaveModule {
    store: UsageStore,
    log: SharedUsageLog,
    interval: Duration,
    shutdown: CancellationToken,
}

impl AutosaveModule {
    pub fn new(
        store: UsageStore,
        log: SharedUsageLog,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            log,
            interval,
            shutdown,
        }
    }

    /// Writes the current state of the log to disk. Failures are logged and otherwise ignored.
    pub async fn save(&self) {
        let snapshot = self.log.snapshot().await;
        self.store.save(&snapshot).await;
    }

    pub async fn run(self) {
        let mut save_point = Instant::now() + self.interval;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep_until(save_point) => {
                    debug!("Periodic save");
                    self.save().await;
                    save_point = Instant::now() + self.interval;
                }
            }
        }

        info!("Flushing usage log before shutdown");
        self.save().await;
    }
}
