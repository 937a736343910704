use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::entities::UsageLog;

/// In-memory usage log shared between the tracker, which is the only writer, and any number of
/// readers. Readers are expected to either hold the read guard briefly or take a
/// [snapshot](SharedUsageLog::snapshot).
#[derive(Clone, Default)]
pub struct SharedUsageLog {
    inner: Arc<RwLock<UsageLog>>,
}

impl SharedUsageLog {
    pub fn new(log: UsageLog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(log)),
        }
    }

    /// Copies the current state of the log.
    pub async fn snapshot(&self) -> UsageLog {
        self.inner.read().await.clone()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, UsageLog> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, UsageLog> {
        self.inner.write().await
    }
}
