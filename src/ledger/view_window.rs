//! The selected reporting period and its navigation helpers.

use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::time_interval::Interval;
use crate::core::time::Clock;
use crate::errors::{EnvelopeError, Result};

/// A reporting bucket identified by its granularity and an anchor instant.
///
/// The anchor is always the last millisecond of its bucket, so two windows
/// over the same bucket compare equal regardless of how they were built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "WindowRecord")]
pub struct ViewWindow {
    interval: Interval,
    anchor: NaiveDateTime,
}

#[derive(Deserialize)]
struct WindowRecord {
    interval: Interval,
    anchor: NaiveDateTime,
}

impl From<WindowRecord> for ViewWindow {
    fn from(record: WindowRecord) -> Self {
        ViewWindow::new(record.interval, record.anchor)
    }
}

impl ViewWindow {
    /// Builds the window over the bucket containing `instant`.
    pub fn new(interval: Interval, instant: NaiveDateTime) -> Self {
        Self {
            interval,
            anchor: interval.bucket_end(instant),
        }
    }

    /// Window over the bucket containing the clock's current instant.
    pub fn current(interval: Interval, clock: &impl Clock) -> Self {
        Self::new(interval, clock.window_instant())
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn anchor(&self) -> NaiveDateTime {
        self.anchor
    }

    /// First instant of the window's bucket.
    pub fn bucket_start(&self) -> NaiveDateTime {
        self.interval.bucket_start(self.anchor)
    }

    /// Last instant of the window's bucket; identical to the anchor.
    pub fn bucket_end(&self) -> NaiveDateTime {
        self.anchor
    }

    /// Moves `steps` buckets forward.
    pub fn next(&self, steps: i32) -> Result<Self> {
        let steps = validate_steps(steps)?;
        self.shifted(steps)
    }

    /// Moves `steps` buckets backward.
    pub fn previous(&self, steps: i32) -> Result<Self> {
        let steps = validate_steps(steps)?;
        self.shifted(-steps)
    }

    /// Returns `true` when `date` falls in the same calendar bucket as the anchor.
    pub fn has(&self, date: NaiveDateTime) -> bool {
        if date.year() != self.anchor.year() {
            return false;
        }
        match self.interval {
            Interval::Year => true,
            Interval::Month => date.month() == self.anchor.month(),
        }
    }

    /// Number of whole buckets the anchor is ahead of the bucket containing `date`.
    ///
    /// Negative when `date` lies in a later bucket.
    pub fn span_from(&self, date: NaiveDateTime) -> i32 {
        self.interval.buckets_between(date, self.anchor)
    }

    /// Switches granularity, keeping the bucket that contains the current anchor.
    pub fn set_interval(&mut self, interval: Interval) {
        *self = Self::new(interval, self.anchor);
    }

    /// Owned variant of [`ViewWindow::set_interval`].
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.set_interval(interval);
        self
    }

    fn shifted(&self, steps: i32) -> Result<Self> {
        let start = self
            .interval
            .checked_shift_bucket_start(self.bucket_start(), steps)
            .ok_or_else(|| {
                EnvelopeError::InvalidArgument(format!(
                    "moving {steps} {}s from {self} leaves the supported calendar",
                    self.interval
                ))
            })?;
        Ok(Self::new(self.interval, start))
    }
}

impl fmt::Display for ViewWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interval {
            Interval::Month => write!(f, "{}", self.anchor.format("%Y-%m")),
            Interval::Year => write!(f, "{}", self.anchor.format("%Y")),
        }
    }
}

fn validate_steps(steps: i32) -> Result<i32> {
    if steps < 0 {
        return Err(EnvelopeError::InvalidArgument(format!(
            "navigation step must be a non-negative whole number, got {steps}"
        )));
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::core::time::FixedClock;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn end_of_march() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
    }

    #[test]
    fn anchor_is_normalized_to_bucket_end() {
        let window = ViewWindow::new(Interval::Month, at(2024, 3, 2));
        assert_eq!(window.anchor(), end_of_march());
        assert_eq!(window.bucket_start(), at(2024, 3, 1));

        let year = ViewWindow::new(Interval::Year, at(2024, 3, 2));
        assert_eq!(
            year.anchor(),
            NaiveDate::from_ymd_opt(2024, 12, 31)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );
    }

    #[test]
    fn has_matches_same_month_only() {
        let window = ViewWindow::new(Interval::Month, end_of_march());
        assert!(window.has(at(2024, 3, 15)));
        assert!(!window.has(at(2024, 2, 28)));
        assert!(!window.has(at(2023, 3, 15)));
    }

    #[test]
    fn has_matches_whole_year_for_year_interval() {
        let window = ViewWindow::new(Interval::Year, end_of_march());
        assert!(window.has(at(2024, 1, 1)));
        assert!(window.has(at(2024, 12, 31)));
        assert!(!window.has(at(2025, 1, 1)));
    }

    #[test]
    fn next_and_previous_shift_whole_buckets() {
        let window = ViewWindow::new(Interval::Month, at(2024, 1, 31));
        let next = window.next(1).unwrap();
        assert!(next.has(at(2024, 2, 1)));
        assert_eq!(next.anchor().day(), 29);

        let back = window.previous(2).unwrap();
        assert!(back.has(at(2023, 11, 15)));
        assert_eq!(window.next(0).unwrap(), window);
    }

    #[test]
    fn navigation_rejects_negative_steps() {
        let window = ViewWindow::new(Interval::Year, at(2024, 6, 1));
        assert!(matches!(
            window.next(-1),
            Err(EnvelopeError::InvalidArgument(_))
        ));
        assert!(matches!(
            window.previous(-3),
            Err(EnvelopeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn navigation_rejects_steps_beyond_the_calendar() {
        let monthly = ViewWindow::new(Interval::Month, at(2024, 3, 10));
        assert!(matches!(
            monthly.next(i32::MAX),
            Err(EnvelopeError::InvalidArgument(_))
        ));
        assert!(matches!(
            monthly.previous(i32::MAX),
            Err(EnvelopeError::InvalidArgument(_))
        ));

        let yearly = ViewWindow::new(Interval::Year, at(2024, 3, 10));
        let err = yearly.next(300_000).unwrap_err();
        assert!(err.to_string().contains("300000 years"), "{err}");
        assert!(yearly.previous(300_000).is_err());
    }

    #[test]
    fn far_navigation_keeps_bucket_end_and_round_trips() {
        let yearly = ViewWindow::new(Interval::Year, at(2024, 3, 10));
        let far = yearly.next(200_000).unwrap();
        assert_eq!(far.anchor().month(), 12);
        assert_eq!(far.anchor().day(), 31);
        assert_eq!(far.anchor(), Interval::Year.bucket_end(far.anchor()));
        assert_eq!(far.previous(200_000).unwrap(), yearly);

        let monthly = ViewWindow::new(Interval::Month, at(2024, 3, 10));
        let back = monthly.previous(1_000_000).unwrap();
        assert_eq!(back.next(1_000_000).unwrap(), monthly);
    }

    #[test]
    fn span_from_counts_months_across_years() {
        let window = ViewWindow::new(Interval::Month, at(2024, 3, 10));
        assert_eq!(window.span_from(at(2024, 1, 1)), 2);
        assert_eq!(window.span_from(at(2023, 12, 31)), 3);
        assert_eq!(window.span_from(at(2024, 3, 31)), 0);
        assert_eq!(window.span_from(at(2024, 5, 1)), -2);

        let yearly = window.with_interval(Interval::Year);
        assert_eq!(yearly.span_from(at(2021, 7, 4)), 3);
    }

    #[test]
    fn set_interval_keeps_containing_bucket() {
        let mut window = ViewWindow::new(Interval::Year, at(2024, 3, 10));
        window.set_interval(Interval::Month);
        assert!(window.has(at(2024, 12, 1)));
        assert_eq!(window.bucket_start(), at(2024, 12, 1));

        window.set_interval(Interval::Year);
        assert_eq!(window.bucket_start(), at(2024, 1, 1));
    }

    #[test]
    fn current_uses_clock() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 8, 14, 9, 0, 0).unwrap());
        let window = ViewWindow::current(Interval::Month, &clock);
        assert_eq!(window.bucket_start(), at(2025, 8, 1));
        assert_eq!(window.to_string(), "2025-08");
    }

    #[test]
    fn deserializing_normalizes_anchor() {
        let window: ViewWindow =
            serde_json::from_str(r#"{"interval":"month","anchor":"2024-03-02T08:00:00"}"#)
                .unwrap();
        assert_eq!(window.anchor(), end_of_march());
    }
}
