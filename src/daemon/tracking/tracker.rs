use std::{collections::BTreeSet, time::Duration};

use chrono::NaiveDate;
use tokio::{sync::watch, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    daemon::storage::{
        entities::{AppId, MonthKey},
        shared::SharedUsageLog,
    },
    utils::clock::Clock,
    window_api::ForegroundSampler,
};

use super::months::KnownMonths;

/// What happened during a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub date: NaiveDate,
    /// Application the second was attributed to. `None` when sampling failed.
    pub app: Option<AppId>,
    /// The tick created the record for `date`.
    pub new_day: bool,
    /// The tick added the month of `date` to the known months.
    pub new_month: bool,
}

pub struct UsageTracker {
    log: SharedUsageLog,
    sampler: Box<dyn ForegroundSampler>,
    known_months: KnownMonths,
    shutdown: CancellationToken,
    tick_interval: Duration,
    clock: Box<dyn Clock>,
}

impl UsageTracker {
    pub fn new(
        log: SharedUsageLog,
        sampler: Box<dyn ForegroundSampler>,
        known_months: KnownMonths,
        shutdown: CancellationToken,
        tick_interval: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            log,
            sampler,
            known_months,
            shutdown,
            tick_interval,
            clock,
        }
    }

    pub fn subscribe_months(&self) -> watch::Receiver<BTreeSet<MonthKey>> {
        self.known_months.subscribe()
    }

    /// Performs one sampling step: reads the wall clock, attributes one second to the
    /// foreground application of today, and registers the month if it's new.
    pub async fn tick(&mut self) -> TickOutcome {
        let date = self.clock.local_time().date();

        // Sampling happens before taking the lock, so that readers don't wait on the OS.
        let app = self.sampler.current_foreground_app();

        let new_day = {
            let mut log = self.log.write().await;
            let new_day = !log.contains_day(date);
            let day = log.ensure_day(date);
            if let Some(app) = &app {
                day.record_tick(app);
            }
            new_day
        };

        if new_day {
            info!("Started tracking {date}");
        }

        let month = MonthKey::from(date);
        let new_month = self.known_months.insert(month);
        if new_month {
            info!("Started tracking month {month}");
        }

        match &app {
            Some(app) => trace!("Attributed a second of {date} to {app}"),
            None => trace!("No foreground application, skipping attribution"),
        }

        TickOutcome {
            date,
            app,
            new_day,
            new_month,
        }
    }

    /// Executes the tracking loop until shutdown is requested.
    pub async fn run(mut self) {
        info!("Tracking started");
        let mut tick_point = self.clock.instant();
        loop {
            tick_point += self.tick_interval;

            self.tick().await;

            tick_point = skip_missed(tick_point, self.clock.instant(), self.tick_interval);

            tokio::select! {
                biased;
                // Once cancelled no more ticks are recorded, so the final save sees everything.
                _ = self.shutdown.cancelled() => {
                    info!("Tracking stopped");
                    return;
                }
                _ = self.clock.sleep_until(tick_point) => ()
            }
        }
    }
}

/// Moves `tick_point` past `now` in whole intervals. Ticks that were missed because the process
/// was suspended or a tick took too long are dropped instead of being replayed in a burst.
fn skip_missed(mut tick_point: Instant, now: Instant, interval: Duration) -> Instant {
    if tick_point > now {
        return tick_point;
    }
    let behind = now - tick_point;
    let skipped = behind.as_nanos() / interval.as_nanos().max(1) + 1;
    debug!("Tracker fell behind by {behind:?}, skipping {skipped} ticks");
    tick_point += interval * u32::try_from(skipped).unwrap_or(u32::MAX);
    tick_point
}
