use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in screentime.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short label used when all days shown belong to the same month.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = seconds / 60 % 60;
    let seconds = seconds % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
