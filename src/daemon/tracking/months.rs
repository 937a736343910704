use std::collections::BTreeSet;

use tokio::sync::watch;

use crate::daemon::storage::entities::MonthKey;

/// Set of months the log has data for. Presentation layers can [subscribe](KnownMonths::subscribe)
/// to find out when tracking rolls over into a new month.
pub struct KnownMonths {
    sender: watch::Sender<BTreeSet<MonthKey>>,
}

impl KnownMonths {
    pub fn new(months: impl IntoIterator<Item = MonthKey>) -> Self {
        let (sender, _) = watch::channel(months.into_iter().collect());
        Self { sender }
    }

    /// Adds `month`, notifying subscribers only when it wasn't known yet. Returns whether the
    /// month is new.
    pub fn insert(&self, month: MonthKey) -> bool {
        self.sender.send_if_modified(|months| months.insert(month))
    }

    pub fn subscribe(&self) -> watch::Receiver<BTreeSet<MonthKey>> {
        self.sender.subscribe()
    }
}
