//! Hierarchy, ledger and reporting-window types consumed by the aggregator.

pub mod account;
pub mod capacity;
pub mod entry;
pub mod hierarchy;
pub mod node;
pub mod time_interval;
pub mod view_window;

pub use account::{Account, AccountLabel};
pub use capacity::Capacity;
pub use entry::{EntryLabel, LedgerEntry};
pub use hierarchy::{DanglingReference, Hierarchy};
pub use node::{BudgetNode, CapacityRollup, ComputedTotals, NodeKind, NodeTier};
pub use time_interval::Interval;
pub use view_window::ViewWindow;
