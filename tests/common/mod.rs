#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use envelope_core::ledger::{Account, BudgetNode, Capacity, Hierarchy, LedgerEntry};
use uuid::Uuid;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Builds hierarchies and ledgers for aggregation scenarios.
#[derive(Default)]
pub struct LedgerBuilder {
    pub hierarchy: Hierarchy,
    pub accounts: Vec<Account>,
    pub entries: Vec<LedgerEntry>,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn budget(&mut self, name: &str, month_amount: f64) -> Uuid {
        self.hierarchy
            .add_node(BudgetNode::budget(name, Capacity::new(month_amount)))
    }

    pub fn section(&mut self, name: &str, budget: Uuid, month_amount: f64) -> Uuid {
        self.hierarchy
            .add_node(BudgetNode::section(name, budget, Capacity::new(month_amount)))
    }

    pub fn category(&mut self, name: &str, section: Uuid, month_amount: f64) -> Uuid {
        self.hierarchy
            .add_node(BudgetNode::category(name, section, Capacity::new(month_amount)))
    }

    pub fn account(&mut self, default_budget: Option<Uuid>) -> Uuid {
        let mut account = Account::new("Checking");
        if let Some(budget) = default_budget {
            account = account.with_default_budget(budget);
        }
        let id = account.id;
        self.accounts.push(account);
        id
    }

    pub fn entry(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    pub fn node_mut(&mut self, id: Uuid) -> &mut BudgetNode {
        self.hierarchy
            .nodes
            .iter_mut()
            .find(|node| node.id == id)
            .expect("node registered with builder")
    }
}
