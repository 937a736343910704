use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use anyhow::{anyhow, Context};
use chrono::{Datelike, NaiveDate};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Normalized executable name of an application, for example `firefox` or `explorer.exe`.
pub type AppId = Arc<str>;

/// Time spent in a single application.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct AppUsage {
    pub app: AppId,
    pub seconds: u64,
}

impl AppUsage {
    pub fn new(app: impl Into<AppId>, seconds: u64) -> Self {
        Self {
            app: app.into(),
            seconds,
        }
    }
}

/// Usage of every application during one day. Applications keep the order in which they were
/// first seen, which is later used to break ties between equal durations.
///
/// A day rarely has more than a few dozen applications, so a vector with linear lookup is
/// used instead of a map.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct DayRecord {
    apps: Vec<AppUsage>,
}

impl DayRecord {
    /// Attributes a single second to `app`.
    pub fn record_tick(&mut self, app: &AppId) {
        self.add(app, 1);
    }

    pub fn add(&mut self, app: &AppId, seconds: u64) {
        match self.apps.iter_mut().find(|usage| usage.app == *app) {
            Some(usage) => usage.seconds = usage.seconds.saturating_add(seconds),
            None => self.apps.push(AppUsage {
                app: app.clone(),
                seconds,
            }),
        }
    }

    /// Seconds spent in `app`. Applications that were never seen count as 0.
    pub fn seconds(&self, app: &str) -> u64 {
        self.apps
            .iter()
            .find(|usage| &*usage.app == app)
            .map_or(0, |usage| usage.seconds)
    }

    /// Sum of all applications. Saturates instead of overflowing on hand edited files.
    pub fn total(&self) -> u64 {
        self.apps
            .iter()
            .fold(0, |total, usage| total.saturating_add(usage.seconds))
    }

    /// Iterates applications in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &AppUsage> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn merge(&mut self, other: DayRecord) {
        for usage in other.apps {
            self.add(&usage.app, usage.seconds);
        }
    }
}

impl Serialize for DayRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.apps.len()))?;
        for usage in &self.apps {
            map.serialize_entry(&*usage.app, &usage.seconds)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DayRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DayRecordVisitor;

        impl<'de> Visitor<'de> for DayRecordVisitor {
            type Value = DayRecord;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from application name to seconds")
            }

            fn visit_map<A>(self, mut access: A) -> Result<DayRecord, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut record = DayRecord::default();
                while let Some((app, seconds)) = access.next_entry::<String, u64>()? {
                    record.add(&AppId::from(app), seconds);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(DayRecordVisitor)
    }
}

/// The whole usage history. Days are kept ordered by date, and serialized as
/// `{ "YYYY-MM-DD": { "<app>": <seconds> } }`.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLog {
    days: BTreeMap<NaiveDate, DayRecord>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    pub fn contains_day(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Returns the record for `date`, creating an empty one if needed.
    pub fn ensure_day(&mut self, date: NaiveDate) -> &mut DayRecord {
        self.days.entry(date).or_default()
    }

    /// Increments `log[date][app]` by one second.
    pub fn record_tick(&mut self, date: NaiveDate, app: &AppId) {
        self.ensure_day(date).record_tick(app);
    }

    /// Iterates all days in ascending order.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &DayRecord)> {
        self.days.iter().map(|(date, record)| (*date, record))
    }

    /// Iterates days of `month` in ascending order.
    pub fn days_in(&self, month: MonthKey) -> impl Iterator<Item = (NaiveDate, &DayRecord)> {
        self.days
            .range(month.first_day()..)
            .take_while(move |(date, _)| MonthKey::from(**date) == month)
            .map(|(date, record)| (*date, record))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Folds `other` into this log by summing seconds of the same (day, application) pairs.
    pub fn merge(&mut self, other: UsageLog) {
        for (date, record) in other.days {
            self.ensure_day(date).merge(record);
        }
    }
}

impl FromIterator<(NaiveDate, DayRecord)> for UsageLog {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, DayRecord)>>(iter: T) -> Self {
        let mut log = UsageLog::new();
        for (date, record) in iter {
            log.ensure_day(date).merge(record);
        }
        log
    }
}

impl FromIterator<AppUsage> for DayRecord {
    fn from_iter<T: IntoIterator<Item = AppUsage>>(iter: T) -> Self {
        let mut record = DayRecord::default();
        for usage in iter {
            record.add(&usage.app, usage.seconds);
        }
        record
    }
}

/// Calendar month used to group days, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        MonthKey::from(date) == *self
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self(date.with_day(1).expect("Every month has a first day"))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Expected a month formatted as YYYY-MM, got {s:?}"))?;
        let year = year
            .parse::<i32>()
            .with_context(|| format!("Invalid year in {s:?}"))?;
        let month = month
            .parse::<u32>()
            .with_context(|| format!("Invalid month in {s:?}"))?;
        MonthKey::new(year, month).ok_or_else(|| anyhow!("{s:?} is not a valid month"))
    }
}
