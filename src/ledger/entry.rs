use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Explicit attribution attached to a ledger entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

/// A signed movement of money on an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub date: NaiveDateTime,
    pub account_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub label: EntryLabel,
}

impl LedgerEntry {
    pub fn new(account_id: Uuid, date: NaiveDateTime, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            account_id,
            amount,
            label: EntryLabel::default(),
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.label.category_id = Some(category_id);
        self
    }

    pub fn in_budget(mut self, budget_id: Uuid) -> Self {
        self.label.budget_id = Some(budget_id);
        self
    }

    /// Labeled entries name a category explicitly.
    pub fn is_labeled(&self) -> bool {
        self.label.category_id.is_some()
    }
}
