use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::EnvelopeError;

/// Reporting granularity of a [`ViewWindow`](super::ViewWindow).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Month,
    Year,
}

impl Interval {
    /// Number of buckets of this interval in one calendar year.
    pub fn units_per_year(self) -> i32 {
        match self {
            Interval::Month => 12,
            Interval::Year => 1,
        }
    }

    /// First instant of the bucket containing `instant`.
    pub fn bucket_start(self, instant: NaiveDateTime) -> NaiveDateTime {
        let date = instant.date();
        let first = match self {
            Interval::Month => date.with_day(1),
            Interval::Year => date.with_day(1).and_then(|day| day.with_month(1)),
        };
        first.unwrap_or(date).and_time(NaiveTime::MIN)
    }

    /// Last representable millisecond of the bucket containing `instant`.
    ///
    /// The final bucket of the calendar ends at [`NaiveDateTime::MAX`].
    pub fn bucket_end(self, instant: NaiveDateTime) -> NaiveDateTime {
        let start = self.bucket_start(instant);
        self.checked_shift_bucket_start(start, 1)
            .map(|next| next - Duration::milliseconds(1))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Moves a bucket start by `steps` whole buckets in either direction.
    ///
    /// Returns `None` when the target bucket lies outside the supported calendar.
    pub(crate) fn checked_shift_bucket_start(
        self,
        start: NaiveDateTime,
        steps: i32,
    ) -> Option<NaiveDateTime> {
        let (year, month) = match self {
            Interval::Month => {
                let index = month_index(start).checked_add(steps)?;
                (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
            }
            Interval::Year => (start.year().checked_add(steps)?, 1),
        };
        NaiveDate::from_ymd_opt(year, month, 1).map(|date| date.and_time(NaiveTime::MIN))
    }

    /// Signed count of buckets between the bucket of `earlier` and that of `later`.
    pub fn buckets_between(self, earlier: NaiveDateTime, later: NaiveDateTime) -> i32 {
        match self {
            Interval::Month => month_index(later) - month_index(earlier),
            Interval::Year => later.year() - earlier.year(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Interval::Month => "month",
            Interval::Year => "year",
        };
        f.write_str(label)
    }
}

impl FromStr for Interval {
    type Err = EnvelopeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(EnvelopeError::InvalidArgument(format!(
                "unknown interval `{other}` (expected `month` or `year`)"
            ))),
        }
    }
}

fn month_index(instant: NaiveDateTime) -> i32 {
    instant.year() * 12 + instant.month0() as i32
}
