//! Stateless services that compute over hierarchy snapshots.

pub mod services;
pub mod time;

pub use time::{Clock, FixedClock, SystemClock};
