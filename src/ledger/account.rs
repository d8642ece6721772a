use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default budget attribution carried by an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<Uuid>,
}

/// A funding account whose entries feed the ledger.
///
/// Hidden accounts are ignored entirely during aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub label: AccountLabel,
}

impl Account {
    /// Creates a visible account without a default budget.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hide: false,
            label: AccountLabel::default(),
        }
    }

    pub fn with_default_budget(mut self, budget_id: Uuid) -> Self {
        self.label.budget_id = Some(budget_id);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }
}
