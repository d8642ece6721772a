//! Budget, section and category nodes of the envelope hierarchy.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::capacity::Capacity;
use crate::errors::{EnvelopeError, Result};

/// Position of a node in the three-level hierarchy, with its parent link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Budget,
    Section { budget_id: Uuid },
    Category { section_id: Uuid },
}

/// Fieldless discriminator of [`NodeKind`], used to key per-tier indexes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NodeTier {
    Budget,
    Section,
    Category,
}

impl NodeKind {
    pub fn tier(&self) -> NodeTier {
        match self {
            NodeKind::Budget => NodeTier::Budget,
            NodeKind::Section { .. } => NodeTier::Section,
            NodeKind::Category { .. } => NodeTier::Category,
        }
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        match self {
            NodeKind::Budget => None,
            NodeKind::Section { budget_id } => Some(*budget_id),
            NodeKind::Category { section_id } => Some(*section_id),
        }
    }
}

impl NodeTier {
    /// Tier that owns nodes of this tier, if any.
    pub fn parent(self) -> Option<NodeTier> {
        match self {
            NodeTier::Budget => None,
            NodeTier::Section => Some(NodeTier::Budget),
            NodeTier::Category => Some(NodeTier::Section),
        }
    }
}

impl fmt::Display for NodeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeTier::Budget => "Budget",
            NodeTier::Section => "Section",
            NodeTier::Category => "Category",
        };
        f.write_str(label)
    }
}

/// Capacity sums contributed by descendants to one capacity version.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapacityRollup {
    pub children_total: f64,
    pub grand_children_total: f64,
}

/// Values derived by the aggregator. Reset on every run, never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedTotals {
    pub sorted_amount: f64,
    pub unsorted_amount: f64,
    pub number_of_unsorted_items: u32,
    pub rolled_over_amount: f64,
    pub children_total: f64,
    pub grand_children_total: f64,
    /// Rollups keyed by the id of the capacity version they were attributed to.
    pub capacity_rollups: BTreeMap<Uuid, CapacityRollup>,
}

/// A budget, section or category with its versioned capacities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetNode {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub capacities: Vec<Capacity>,
    #[serde(default)]
    pub roll_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_over_start_date: Option<NaiveDateTime>,
    #[serde(skip)]
    pub computed: ComputedTotals,
}

impl BudgetNode {
    pub fn new(name: impl Into<String>, kind: NodeKind, capacity: Capacity) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            capacities: vec![capacity],
            roll_over: false,
            roll_over_start_date: None,
            computed: ComputedTotals::default(),
        }
    }

    pub fn budget(name: impl Into<String>, capacity: Capacity) -> Self {
        Self::new(name, NodeKind::Budget, capacity)
    }

    pub fn section(name: impl Into<String>, budget_id: Uuid, capacity: Capacity) -> Self {
        Self::new(name, NodeKind::Section { budget_id }, capacity)
    }

    pub fn category(name: impl Into<String>, section_id: Uuid, capacity: Capacity) -> Self {
        Self::new(name, NodeKind::Category { section_id }, capacity)
    }

    pub fn tier(&self) -> NodeTier {
        self.kind.tier()
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.kind.parent_id()
    }

    /// Start date of roll-over accrual, when roll-over is enabled and dated.
    pub fn roll_over_start(&self) -> Option<NaiveDateTime> {
        if self.roll_over {
            self.roll_over_start_date
        } else {
            None
        }
    }

    /// Enables roll-over from `start`, or disables it when `start` is `None`.
    pub fn set_roll_over(&mut self, start: Option<NaiveDateTime>) {
        self.roll_over = start.is_some();
        self.roll_over_start_date = start;
    }

    pub fn capacity(&self, capacity_id: Uuid) -> Option<&Capacity> {
        self.capacities.iter().find(|capacity| capacity.id == capacity_id)
    }

    /// Adds a capacity version. `active_from` must be unique within the node.
    pub fn add_capacity(&mut self, capacity: Capacity) -> Result<Uuid> {
        self.ensure_unique_active_from(capacity.active_from, None)?;
        let id = capacity.id;
        self.capacities.push(capacity);
        Ok(id)
    }

    /// Replaces the amount and start of an existing capacity version.
    pub fn update_capacity(
        &mut self,
        capacity_id: Uuid,
        month_amount: f64,
        active_from: Option<NaiveDateTime>,
    ) -> Result<()> {
        self.ensure_unique_active_from(active_from, Some(capacity_id))?;
        let capacity = self
            .capacities
            .iter_mut()
            .find(|capacity| capacity.id == capacity_id)
            .ok_or(EnvelopeError::CapacityNotFound(capacity_id))?;
        capacity.month_amount = month_amount;
        capacity.active_from = active_from;
        Ok(())
    }

    /// Removes a capacity version, refusing to leave the node without one.
    pub fn remove_capacity(&mut self, capacity_id: Uuid) -> Result<Capacity> {
        let position = self
            .capacities
            .iter()
            .position(|capacity| capacity.id == capacity_id)
            .ok_or(EnvelopeError::CapacityNotFound(capacity_id))?;
        if self.capacities.len() == 1 {
            return Err(EnvelopeError::LastCapacity(self.id));
        }
        Ok(self.capacities.remove(position))
    }

    fn ensure_unique_active_from(
        &self,
        active_from: Option<NaiveDateTime>,
        ignore: Option<Uuid>,
    ) -> Result<()> {
        let clash = self
            .capacities
            .iter()
            .filter(|capacity| Some(capacity.id) != ignore)
            .any(|capacity| capacity.active_from == active_from);
        if clash {
            let label = active_from
                .map(|date| date.to_string())
                .unwrap_or_else(|| "the beginning".into());
            return Err(EnvelopeError::DuplicateActiveFrom(label));
        }
        Ok(())
    }
}
