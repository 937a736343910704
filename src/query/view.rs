use chrono::NaiveDate;

use crate::daemon::storage::entities::{MonthKey, UsageLog};

use super::{latest_day, months_available};

/// What a presentation layer is currently looking at: one month out of the known ones, and one
/// day of that month shown in detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    months: Vec<MonthKey>,
    current_month: Option<MonthKey>,
    selected_date: Option<NaiveDate>,
}

impl ViewState {
    /// Starts on the newest of `months`.
    pub fn new(mut months: Vec<MonthKey>) -> Self {
        months.sort();
        months.dedup();
        let current_month = months.last().copied();
        Self {
            months,
            current_month,
            selected_date: None,
        }
    }

    pub fn from_log(log: &UsageLog) -> Self {
        Self::new(months_available(log))
    }

    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn current_month(&self) -> Option<MonthKey> {
        self.current_month
    }

    /// Switches to `month`. Unknown months are ignored and `false` is returned.
    pub fn select_month(&mut self, month: MonthKey) -> bool {
        if !self.months.contains(&month) {
            return false;
        }
        if self.current_month != Some(month) {
            self.current_month = Some(month);
            self.selected_date = None;
        }
        true
    }

    fn current_index(&self) -> Option<usize> {
        let current = self.current_month?;
        self.months.iter().position(|month| *month == current)
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_index().is_some_and(|index| index > 0)
    }

    pub fn can_go_next(&self) -> bool {
        self.current_index()
            .is_some_and(|index| index + 1 < self.months.len())
    }

    pub fn previous_month(&mut self) -> bool {
        match self.current_index() {
            Some(index) if index > 0 => self.select_month(self.months[index - 1]),
            _ => false,
        }
    }

    pub fn next_month(&mut self) -> bool {
        match self.current_index() {
            Some(index) if index + 1 < self.months.len() => {
                self.select_month(self.months[index + 1])
            }
            _ => false,
        }
    }

    /// Picks the day shown in detail. Only days of the current month can be picked.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        match self.current_month {
            Some(month) if month.contains(date) => {
                self.selected_date = Some(date);
                true
            }
            _ => false,
        }
    }

    /// Day shown in detail: the picked one, otherwise the latest recorded day of the current
    /// month.
    pub fn detail_date(&self, log: &UsageLog) -> Option<NaiveDate> {
        self.selected_date
            .or_else(|| self.current_month.and_then(|month| latest_day(log, month)))
    }

    /// Applies an updated set of known months, as published by the tracker. When a month that
    /// wasn't known before appears, it becomes the current one.
    pub fn on_months_changed(&mut self, months: impl IntoIterator<Item = MonthKey>) {
        let mut months = months.into_iter().collect::<Vec<_>>();
        months.sort();
        months.dedup();

        let appeared = months
            .iter()
            .filter(|month| !self.months.contains(month))
            .max()
            .copied();
        self.months = months;

        match appeared {
            Some(month) => {
                self.select_month(month);
            }
            None => {
                if self.current_month.is_some_and(|month| !self.months.contains(&month)) {
                    self.current_month = self.months.last().copied();
                    self.selected_date = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::daemon::storage::entities::{MonthKey, UsageLog};

    use super::ViewState;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    fn log_with(days: &[NaiveDate]) -> UsageLog {
        let mut log = UsageLog::new();
        for day in days {
            log.record_tick(*day, &"a".into());
        }
        log
    }

    #[test]
    fn test_starts_on_newest_month_and_latest_day() {
        let log = log_with(&[date(2024, 1, 3), date(2024, 2, 1), date(2024, 2, 9)]);
        let view = ViewState::from_log(&log);

        assert_eq!(view.months(), &[month(2024, 1), month(2024, 2)]);
        assert_eq!(view.current_month(), Some(month(2024, 2)));
        assert_eq!(view.detail_date(&log), Some(date(2024, 2, 9)));
        assert!(view.can_go_previous());
        assert!(!view.can_go_next());
    }

    #[test]
    fn test_empty_view() {
        let log = UsageLog::new();
        let mut view = ViewState::from_log(&log);

        assert_eq!(view.current_month(), None);
        assert_eq!(view.detail_date(&log), None);
        assert!(!view.previous_month());
        assert!(!view.next_month());
        assert!(!view.select_date(date(2024, 1, 1)));
    }

    #[test]
    fn test_navigation_bounds() {
        let mut view = ViewState::new(vec![month(2024, 3), month(2024, 1), month(2024, 2)]);

        assert!(view.previous_month());
        assert!(view.previous_month());
        assert_eq!(view.current_month(), Some(month(2024, 1)));
        assert!(!view.previous_month());
        assert!(view.next_month());
        assert_eq!(view.current_month(), Some(month(2024, 2)));
        assert!(!view.select_month(month(2025, 1)));
        assert_eq!(view.current_month(), Some(month(2024, 2)));
    }

    #[test]
    fn test_selected_date_must_be_in_current_month() {
        let log = log_with(&[date(2024, 1, 3), date(2024, 1, 20), date(2024, 2, 1)]);
        let mut view = ViewState::from_log(&log);

        assert!(!view.select_date(date(2024, 1, 3)));
        assert!(view.previous_month());
        assert!(view.select_date(date(2024, 1, 3)));
        assert_eq!(view.detail_date(&log), Some(date(2024, 1, 3)));

        // Changing the month drops the selection.
        assert!(view.next_month());
        assert_eq!(view.detail_date(&log), Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_new_month_becomes_current() {
        let mut view = ViewState::new(vec![month(2024, 1), month(2024, 2)]);
        view.previous_month();

        view.on_months_changed([month(2024, 1), month(2024, 2)]);
        assert_eq!(view.current_month(), Some(month(2024, 1)));

        view.on_months_changed([month(2024, 1), month(2024, 2), month(2024, 3)]);
        assert_eq!(view.current_month(), Some(month(2024, 3)));
        assert_eq!(view.months().len(), 3);
    }
}
