#![doc(test(attr(deny(warnings))))]

//! Envelope Core computes budget-envelope usage for a three-level hierarchy
//! (budget, section, category) over a selected reporting window.
//!
//! The engine is a pure transform: it reads one immutable snapshot of ledger
//! entries, accounts and hierarchy nodes and returns a fresh hierarchy whose
//! computed fields are populated. Fetching, persisting and rendering data stay
//! with the host.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod utils;

pub use crate::core::services::{aggregate, AggregationInput, AggregationReport, Aggregator};
pub use errors::{EnvelopeError, Result};

/// Installs the crate's log subscriber unless the host already owns one.
pub fn init() {
    if utils::init_tracing() {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "envelope engine logging ready");
    }
}
