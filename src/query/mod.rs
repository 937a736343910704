//! Read-only views over a [UsageLog]. These are pure functions meant to be called on a snapshot
//! of the log by whatever presents the data. Asking about a month or a day without data yields an
//! empty result, never an error.

pub mod view;

use chrono::NaiveDate;

use crate::daemon::storage::entities::{AppUsage, MonthKey, UsageLog};

/// Months that have at least one recorded day, ascending and without duplicates.
pub fn months_available(log: &UsageLog) -> Vec<MonthKey> {
    let mut months: Vec<MonthKey> = Vec::new();
    // Days are already ordered, so equal months are always adjacent.
    for (date, _) in log.days() {
        let month = MonthKey::from(date);
        if months.last() != Some(&month) {
            months.push(month);
        }
    }
    months
}

/// Total seconds of every recorded day of `month`, ascending by date.
pub fn daily_totals(log: &UsageLog, month: MonthKey) -> Vec<(NaiveDate, u64)> {
    log.days_in(month)
        .map(|(date, record)| (date, record.total()))
        .collect()
}

/// Full breakdown of a day, most used application first. Applications with equal time keep the
/// order in which they were first seen.
pub fn day_detail(log: &UsageLog, date: NaiveDate) -> Vec<AppUsage> {
    let Some(record) = log.day(date) else {
        return vec![];
    };
    let mut usages = record.iter().cloned().collect::<Vec<_>>();
    // Stable sort keeps first-seen order between ties.
    usages.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    usages
}

/// At most `n` most used applications of a day. See [day_detail] for ordering.
pub fn top_n(log: &UsageLog, date: NaiveDate, n: usize) -> Vec<AppUsage> {
    let mut usages = day_detail(log, date);
    usages.truncate(n);
    usages
}

pub fn day_total(log: &UsageLog, date: NaiveDate) -> u64 {
    log.day(date).map_or(0, |record| record.total())
}

/// Last recorded day of `month`. This is the day shown in detail when nothing else was picked.
pub fn latest_day(log: &UsageLog, month: MonthKey) -> Option<NaiveDate> {
    log.days_in(month).last().map(|(date, _)| date)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::daemon::storage::entities::{AppUsage, DayRecord, MonthKey, UsageLog};

    use super::{daily_totals, day_detail, day_total, latest_day, months_available, top_n};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    fn day(usages: &[(&str, u64)]) -> DayRecord {
        usages
            .iter()
            .map(|(app, seconds)| AppUsage::new(*app, *seconds))
            .collect()
    }

    fn simple_log() -> UsageLog {
        [(date(2024, 1, 1), day(&[("a.exe", 10), ("b.exe", 30)]))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_simple_day_detail() {
        let log = simple_log();
        assert_eq!(
            day_detail(&log, date(2024, 1, 1)),
            vec![AppUsage::new("b.exe", 30), AppUsage::new("a.exe", 10)]
        );
    }

    #[test]
    fn test_simple_daily_totals() {
        let log = simple_log();
        assert_eq!(
            daily_totals(&log, month(2024, 1)),
            vec![(date(2024, 1, 1), 40)]
        );
        assert_eq!(day_total(&log, date(2024, 1, 1)), 40);
    }

    #[test]
    fn test_totals_saturate() {
        let log: UsageLog = [(date(2024, 1, 1), day(&[("a", u64::MAX), ("b", 1)]))]
            .into_iter()
            .collect();
        assert_eq!(
            daily_totals(&log, month(2024, 1)),
            vec![(date(2024, 1, 1), u64::MAX)]
        );
        assert_eq!(day_total(&log, date(2024, 1, 1)), u64::MAX);
    }

    #[test]
    fn test_empty_log() {
        let log = UsageLog::new();
        assert!(months_available(&log).is_empty());
        assert!(day_detail(&log, date(2024, 1, 1)).is_empty());
        assert!(top_n(&log, date(2024, 1, 1), 5).is_empty());
        assert!(daily_totals(&log, month(2024, 1)).is_empty());
        assert_eq!(day_total(&log, date(2024, 1, 1)), 0);
        assert_eq!(latest_day(&log, month(2024, 1)), None);
    }

    #[test]
    fn test_months_available_sorted_and_unique() {
        let mut log = UsageLog::new();
        for inserted in [
            date(2024, 3, 2),
            date(2023, 12, 30),
            date(2024, 3, 1),
            date(2024, 1, 15),
            date(2023, 12, 1),
        ] {
            log.record_tick(inserted, &"a".into());
        }

        let months = months_available(&log);

        assert_eq!(months, vec![month(2023, 12), month(2024, 1), month(2024, 3)]);
        assert!(months.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_daily_totals_only_for_month() {
        let log: UsageLog = [
            (date(2024, 1, 31), day(&[("a", 5)])),
            (date(2024, 2, 2), day(&[("a", 1), ("b", 2)])),
            (date(2024, 2, 1), day(&[("c", 100)])),
            (date(2024, 3, 1), day(&[("a", 9)])),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            daily_totals(&log, month(2024, 2)),
            vec![(date(2024, 2, 1), 100), (date(2024, 2, 2), 3)]
        );
        assert_eq!(latest_day(&log, month(2024, 2)), Some(date(2024, 2, 2)));
    }

    #[test]
    fn test_day_with_no_sampled_apps_has_zero_total() {
        let mut log = UsageLog::new();
        log.ensure_day(date(2024, 1, 1));

        assert_eq!(daily_totals(&log, month(2024, 1)), vec![(date(2024, 1, 1), 0)]);
        assert!(day_detail(&log, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_top_n_limits_and_orders() {
        let log: UsageLog = [(
            date(2024, 1, 1),
            day(&[
                ("a", 5),
                ("b", 50),
                ("c", 20),
                ("d", 20),
                ("e", 1),
                ("f", 70),
                ("g", 20),
            ]),
        )]
        .into_iter()
        .collect();

        let top = top_n(&log, date(2024, 1, 1), 5);

        assert_eq!(
            top,
            vec![
                AppUsage::new("f", 70),
                AppUsage::new("b", 50),
                AppUsage::new("c", 20),
                AppUsage::new("d", 20),
                AppUsage::new("g", 20),
            ]
        );
        assert!(top.windows(2).all(|pair| pair[0].seconds >= pair[1].seconds));
    }

    #[test]
    fn test_top_n_ties_keep_first_seen_order() {
        let mut log = UsageLog::new();
        let today = date(2024, 5, 5);
        for app in ["z", "y", "x", "w", "v", "u"] {
            log.record_tick(today, &app.into());
        }

        let top = top_n(&log, today, 5)
            .into_iter()
            .map(|v| v.app.to_string())
            .collect::<Vec<_>>();
        assert_eq!(top, vec!["z", "y", "x", "w", "v"]);
    }

    #[test]
    fn test_top_n_with_fewer_apps() {
        let log = simple_log();
        assert_eq!(top_n(&log, date(2024, 1, 1), 5).len(), 2);
        assert!(top_n(&log, date(2024, 1, 1), 0).is_empty());
    }
}
