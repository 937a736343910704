use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use saving::AutosaveModule;
use storage::{shared::SharedUsageLog, usage_store::UsageStore};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracking::{months::KnownMonths, tracker::UsageTracker};

use crate::{
    query::months_available,
    utils::clock::{Clock, DefaultClock},
    window_api::{ForegroundSampler, GenericSampler},
};

pub mod args;
pub mod saving;
pub mod shutdown;
pub mod storage;
pub mod tracking;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(60);

/// Represents the starting point for the daemon. Runs until the process receives a shutdown
/// signal, then flushes the usage log to `dir`.
pub async fn start_daemon(dir: PathBuf, save_interval: Duration) -> Result<()> {
    let sampler = GenericSampler::new()?;

    let store = UsageStore::in_dir(&dir);
    let initial = store.load_or_backup().await;
    info!("Loaded usage for {} days from {:?}", initial.len(), store.path());

    let shutdown_token = CancellationToken::new();

    let known_months = KnownMonths::new(months_available(&initial));
    let log = SharedUsageLog::new(initial);

    let tracker = create_tracker(
        log.clone(),
        sampler,
        known_months,
        &shutdown_token,
        DefaultClock,
    );

    let saver = AutosaveModule::new(store, log, save_interval, shutdown_token.clone());

    tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        tracker.run(),
        saver.run(),
    );

    info!("Daemon stopped");
    Ok(())
}

fn create_tracker(
    log: SharedUsageLog,
    sampler: impl ForegroundSampler + 'static,
    known_months: KnownMonths,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> UsageTracker {
    UsageTracker::new(
        log,
        Box::new(sampler),
        known_months,
        shutdown_token.clone(),
        DEFAULT_TICK_INTERVAL,
        Box::new(clock),
    )
}

#[cfg(test)]
mod daemon_tests {
    use std::{fs, time::Duration};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
    use tempfile::tempdir;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            create_tracker,
            saving::AutosaveModule,
            storage::{entities::UsageLog, shared::SharedUsageLog, usage_store::UsageStore},
            tracking::months::KnownMonths,
        },
        query::{daily_totals, day_detail, months_available},
        utils::{clock::Clock, logging::TEST_LOGGING},
        window_api::MockForegroundSampler,
    };

    fn test_start_date() -> NaiveDateTime {
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN)
    }

    fn test_items() -> Vec<Option<&'static str>> {
        vec![Some("test"), Some("test"), None, Some("test b")]
    }

    #[derive(Clone)]
    struct TestClock {
        start_time: NaiveDateTime,
        reference: Instant,
    }

    #[async_trait]
    impl Clock for TestClock {
        fn local_time(&self) -> NaiveDateTime {
            self.start_time + TimeDelta::from_std(self.reference.elapsed()).unwrap()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: tokio::time::Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    /// Smoke test running the tracker and the saver together the way the daemon does, on
    /// paused time so that it doesn't take real seconds.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let mut mock_sampler = MockForegroundSampler::new();
        let mut items = test_items().into_iter().cycle();
        mock_sampler
            .expect_current_foreground_app()
            .returning(move || items.next().flatten().map(Into::into))
            .times(8);

        let dir = tempdir()?;
        let store = UsageStore::in_dir(dir.path());

        // History from a previous run must survive.
        let mut previous = UsageLog::new();
        let yesterday = test_start_date().date().pred_opt().unwrap();
        previous.ensure_day(yesterday).add(&"old".into(), 120);
        store.try_save(&previous).await?;

        let initial = store.load_or_backup().await;
        let shutdown_token = CancellationToken::new();
        let log = SharedUsageLog::new(initial.clone());
        let test_clock = TestClock {
            start_time: test_start_date(),
            reference: Instant::now(),
        };
        let tracker = create_tracker(
            log.clone(),
            mock_sampler,
            KnownMonths::new(months_available(&initial)),
            &shutdown_token,
            test_clock,
        );
        let saver = AutosaveModule::new(
            store.clone(),
            log.clone(),
            Duration::from_secs(3),
            shutdown_token.clone(),
        );

        tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(7500)).await;
                shutdown_token.cancel()
            },
            tracker.run(),
            saver.run(),
        );

        let files = fs::read_dir(dir.path())?.collect::<Vec<_>>();
        assert_eq!(files.len(), 1);

        let stored = store.try_load().await?;
        assert_eq!(stored, log.snapshot().await);

        let today = test_start_date().date();
        let detail = day_detail(&stored, today);
        assert_eq!(detail.len(), 2);
        assert_eq!(&*detail[0].app, "test");
        assert_eq!(detail[0].seconds, 4);
        assert_eq!(&*detail[1].app, "test b");
        assert_eq!(detail[1].seconds, 2);

        assert_eq!(stored.day(yesterday).unwrap().seconds("old"), 120);
        assert_eq!(
            daily_totals(&stored, today.into()),
            vec![(yesterday, 120), (today, 6)]
        );

        Ok(())
    }
}
