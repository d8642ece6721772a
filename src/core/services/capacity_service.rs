//! Resolves versioned capacities over time.

use chrono::NaiveDateTime;

use crate::ledger::{BudgetNode, Capacity, ViewWindow};

static ZERO_CAPACITY: Capacity = Capacity::ZERO;

/// Stateless lookups over a node's capacity versions.
pub struct CapacityService;

impl CapacityService {
    /// Returns the capacity in force at `date`.
    ///
    /// Falls back to a zero-valued capacity when no version has started yet,
    /// including for nodes without any capacity.
    pub fn active_capacity(node: &BudgetNode, date: NaiveDateTime) -> &Capacity {
        Self::find_active(node, date).unwrap_or(&ZERO_CAPACITY)
    }

    /// Like [`CapacityService::active_capacity`], without the zero fallback.
    pub fn find_active(node: &BudgetNode, date: NaiveDateTime) -> Option<&Capacity> {
        node.capacities
            .iter()
            .filter(|capacity| effective_start(capacity) <= date)
            .max_by_key(|capacity| effective_start(capacity))
    }

    /// Sums the allotments accrued from `start` up to the beginning of `window`.
    ///
    /// Each version contributes its per-bucket amount for every whole bucket
    /// it covers. Coverage ends where the next version starts, or at the
    /// window's bucket start, whichever comes first. Unlimited capacities
    /// accrue nothing.
    pub fn accumulated_capacity(
        node: &BudgetNode,
        start: NaiveDateTime,
        window: &ViewWindow,
        unlimited_sentinel: Option<f64>,
    ) -> f64 {
        let boundary = window.bucket_start();
        if start >= boundary {
            return 0.0;
        }

        let mut versions: Vec<&Capacity> = node.capacities.iter().collect();
        versions.sort_by_key(|capacity| effective_start(capacity));

        let interval = window.interval();
        let mut total = 0.0;
        for (position, capacity) in versions.iter().enumerate() {
            let covered_from = effective_start(capacity).max(start);
            let next_start = versions
                .get(position + 1)
                .map(|next| effective_start(next));
            let span = match next_start {
                // Count against the bucket where this version hands over, not
                // against the caller's window.
                Some(end) if end < boundary => {
                    ViewWindow::new(interval, end).span_from(covered_from)
                }
                _ => window.span_from(covered_from),
            };
            if span > 0 {
                total += capacity.bounded_amount_for(interval, unlimited_sentinel) * f64::from(span);
            }
        }
        total
    }
}

fn effective_start(capacity: &Capacity) -> NaiveDateTime {
    capacity.active_from.unwrap_or(NaiveDateTime::MIN)
}
