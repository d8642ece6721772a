use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_interval::Interval;

/// A time-versioned allotment attached to a hierarchy node.
///
/// A capacity without `active_from` has been in force since the beginning of
/// time; otherwise it takes over from the previous version at `active_from`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Capacity {
    pub id: Uuid,
    pub month_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_from: Option<NaiveDateTime>,
}

impl Capacity {
    /// Zero-valued stand-in returned when no version is in force.
    pub const ZERO: Capacity = Capacity {
        id: Uuid::nil(),
        month_amount: 0.0,
        active_from: None,
    };

    pub fn new(month_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            month_amount,
            active_from: None,
        }
    }

    pub fn with_active_from(mut self, active_from: NaiveDateTime) -> Self {
        self.active_from = Some(active_from);
        self
    }

    pub fn year_amount(&self) -> f64 {
        self.month_amount * 12.0
    }

    /// Allotment for one bucket of `interval`.
    pub fn amount_for(&self, interval: Interval) -> f64 {
        match interval {
            Interval::Month => self.month_amount,
            Interval::Year => self.year_amount(),
        }
    }

    /// Unlimited envelopes carry an infinite amount, or a host-chosen finite
    /// sentinel magnitude.
    pub fn is_unlimited(&self, sentinel: Option<f64>) -> bool {
        self.month_amount.is_infinite()
            || sentinel.is_some_and(|value| self.month_amount.abs() == value.abs())
    }

    /// Allotment for one bucket of `interval`, with unlimited capacities
    /// contributing nothing.
    pub fn bounded_amount_for(&self, interval: Interval, sentinel: Option<f64>) -> f64 {
        if self.is_unlimited(sentinel) {
            0.0
        } else {
            self.amount_for(interval)
        }
    }
}
