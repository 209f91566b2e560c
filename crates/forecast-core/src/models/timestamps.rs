//! Timestamp text format used in every table: RFC 3339, second precision, `Z` suffix.
//! Cutoffs are rendered the same way so string comparison in SQL is chronological.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Timestamp `days` before `now`.
pub fn cutoff_timestamp(now: DateTime<Utc>, days: u32) -> String {
    format_timestamp(now - Duration::days(i64::from(days)))
}

/// Date (`YYYY-MM-DD`) `days` before `now`, for the date-keyed fact tables.
pub fn cutoff_date(now: DateTime<Utc>, days: u32) -> String {
    (now - Duration::days(i64::from(days)))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day0(0).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_chronologically_as_text() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 1, 0, 0).unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
        assert_eq!(format_timestamp(earlier), "2024-01-09T23:00:00Z");
    }

    #[test]
    fn cutoff_date_counts_back_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(cutoff_date(now, 1), "2024-02-29");
    }

    #[test]
    fn month_start_truncates_day() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(month_start(d), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
