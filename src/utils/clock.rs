use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use tokio::time::Instant;

/// Represents an entity responsible for providing time across application. This allows tests to
/// decide which day it is and how fast time passes.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall-clock time in the local timezone. Days are attributed using this value.
    fn local_time(&self) -> NaiveDateTime;

    /// Monotonic time used for scheduling.
    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn local_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
