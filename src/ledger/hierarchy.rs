use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::{BudgetNode, NodeTier};

/// The budget → section → category tree, stored as one tagged collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Hierarchy {
    #[serde(default)]
    pub nodes: Vec<BudgetNode>,
}

/// A node whose parent id does not resolve to a node of the parent tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingReference {
    pub node_id: Uuid,
    pub tier: NodeTier,
    pub missing_parent: Uuid,
}

impl Hierarchy {
    pub fn new(nodes: Vec<BudgetNode>) -> Self {
        Self { nodes }
    }

    pub fn add_node(&mut self, node: BudgetNode) -> Uuid {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn of_tier(&self, tier: NodeTier) -> impl Iterator<Item = &BudgetNode> {
        self.nodes.iter().filter(move |node| node.tier() == tier)
    }

    pub fn budgets(&self) -> impl Iterator<Item = &BudgetNode> {
        self.of_tier(NodeTier::Budget)
    }

    pub fn sections(&self) -> impl Iterator<Item = &BudgetNode> {
        self.of_tier(NodeTier::Section)
    }

    pub fn categories(&self) -> impl Iterator<Item = &BudgetNode> {
        self.of_tier(NodeTier::Category)
    }

    pub fn find(&self, tier: NodeTier, id: Uuid) -> Option<&BudgetNode> {
        self.nodes
            .iter()
            .find(|node| node.id == id && node.tier() == tier)
    }

    pub fn budget(&self, id: Uuid) -> Option<&BudgetNode> {
        self.find(NodeTier::Budget, id)
    }

    pub fn section(&self, id: Uuid) -> Option<&BudgetNode> {
        self.find(NodeTier::Section, id)
    }

    pub fn category(&self, id: Uuid) -> Option<&BudgetNode> {
        self.find(NodeTier::Category, id)
    }

    /// Direct children of the node with the given tier and id.
    pub fn children_of(&self, tier: NodeTier, id: Uuid) -> impl Iterator<Item = &BudgetNode> {
        self.nodes
            .iter()
            .filter(move |node| node.tier().parent() == Some(tier) && node.parent_id() == Some(id))
    }

    /// Sections and categories whose parent is missing from the snapshot.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let known: HashSet<(NodeTier, Uuid)> =
            self.nodes.iter().map(|node| (node.tier(), node.id)).collect();
        self.nodes
            .iter()
            .filter_map(|node| {
                let parent_tier = node.tier().parent()?;
                let parent_id = node.parent_id()?;
                if known.contains(&(parent_tier, parent_id)) {
                    None
                } else {
                    Some(DanglingReference {
                        node_id: node.id,
                        tier: node.tier(),
                        missing_parent: parent_id,
                    })
                }
            })
            .collect()
    }
}

impl FromIterator<BudgetNode> for Hierarchy {
    fn from_iter<I: IntoIterator<Item = BudgetNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::capacity::Capacity;

    #[test]
    fn lookups_respect_tier() {
        let budget = BudgetNode::budget("Household", Capacity::new(1000.0));
        let mut section = BudgetNode::section("Food", budget.id, Capacity::new(400.0));
        // Same id in a different tier must not alias the budget.
        section.id = budget.id;
        let hierarchy: Hierarchy = vec![budget.clone(), section].into_iter().collect();

        assert_eq!(hierarchy.budget(budget.id).unwrap().name, "Household");
        assert_eq!(hierarchy.section(budget.id).unwrap().name, "Food");
        assert!(hierarchy.category(budget.id).is_none());
    }

    #[test]
    fn children_are_filtered_by_parent_tier() {
        let mut hierarchy = Hierarchy::default();
        let budget = hierarchy.add_node(BudgetNode::budget("Household", Capacity::new(1000.0)));
        let food = hierarchy.add_node(BudgetNode::section("Food", budget, Capacity::new(400.0)));
        hierarchy.add_node(BudgetNode::section("Home", budget, Capacity::new(300.0)));
        hierarchy.add_node(BudgetNode::category("Groceries", food, Capacity::new(250.0)));

        assert_eq!(hierarchy.children_of(NodeTier::Budget, budget).count(), 2);
        assert_eq!(hierarchy.children_of(NodeTier::Section, food).count(), 1);
        assert_eq!(hierarchy.children_of(NodeTier::Section, budget).count(), 0);
        assert_eq!(hierarchy.sections().count(), 2);
        assert_eq!(hierarchy.len(), 4);
    }

    #[test]
    fn reports_dangling_parents() {
        let mut hierarchy = Hierarchy::default();
        let budget = hierarchy.add_node(BudgetNode::budget("Household", Capacity::new(1000.0)));
        hierarchy.add_node(BudgetNode::section("Food", budget, Capacity::new(400.0)));
        let orphan_parent = Uuid::new_v4();
        let orphan =
            hierarchy.add_node(BudgetNode::category("Gifts", orphan_parent, Capacity::new(50.0)));

        let dangling = hierarchy.dangling_references();
        assert_eq!(
            dangling,
            vec![DanglingReference {
                node_id: orphan,
                tier: NodeTier::Category,
                missing_parent: orphan_parent,
            }]
        );
    }
}
