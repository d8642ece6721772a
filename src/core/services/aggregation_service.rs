//! Recomputes envelope usage for a hierarchy snapshot.
//!
//! A run clones the incoming hierarchy, then executes three phases strictly in
//! order: reset (seeding roll-over accrual), bottom-up capacity rollup, and
//! ledger distribution. The stored hierarchy is never touched, so abandoning a
//! run leaves no partial state behind.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::debug;
use uuid::Uuid;

use super::capacity_service::CapacityService;
use crate::config::EngineSettings;
use crate::ledger::{
    Account, BudgetNode, ComputedTotals, Hierarchy, LedgerEntry, NodeTier, ViewWindow,
};

/// Borrowed snapshot consumed by one aggregation run.
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    pub entries: &'a [LedgerEntry],
    pub accounts: &'a [Account],
    pub hierarchy: &'a Hierarchy,
    pub window: &'a ViewWindow,
}

/// Counters describing what a run did with its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationReport {
    /// Entries applied to the window on at least one node.
    pub in_window_entries: usize,
    /// Entries applied to a roll-over balance on at least one node.
    pub rolled_over_entries: usize,
    /// Entries dropped because their account or target node did not resolve.
    pub skipped_entries: usize,
    /// Sections and categories excluded from a rollup tier by a missing parent.
    pub dangling_nodes: usize,
}

/// Stateless aggregation engine configured by [`EngineSettings`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    settings: EngineSettings,
}

/// Runs the aggregator with default settings.
pub fn aggregate(
    entries: &[LedgerEntry],
    accounts: &[Account],
    hierarchy: &Hierarchy,
    window: &ViewWindow,
) -> Hierarchy {
    Aggregator::default().run(&AggregationInput {
        entries,
        accounts,
        hierarchy,
        window,
    })
}

impl Aggregator {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Produces a new hierarchy with every computed field populated.
    pub fn run(&self, input: &AggregationInput<'_>) -> Hierarchy {
        self.run_with_report(input).0
    }

    pub fn run_with_report(&self, input: &AggregationInput<'_>) -> (Hierarchy, AggregationReport) {
        let mut report = AggregationReport::default();
        let mut snapshot = Snapshot::new(input.hierarchy);

        self.reset(&mut snapshot, input.window);
        self.roll_up_capacities(&mut snapshot, input.window, &mut report);
        distribute_entries(&mut snapshot, input, &mut report);

        debug!(
            window = %input.window,
            nodes = snapshot.nodes.len(),
            entries = input.entries.len(),
            in_window = report.in_window_entries,
            rolled_over = report.rolled_over_entries,
            skipped = report.skipped_entries,
            dangling = report.dangling_nodes,
            "aggregation run complete"
        );

        (Hierarchy::new(snapshot.nodes), report)
    }

    fn reset(&self, snapshot: &mut Snapshot, window: &ViewWindow) {
        for node in &mut snapshot.nodes {
            let mut computed = ComputedTotals::default();
            if let Some(start) = node.roll_over_start() {
                computed.rolled_over_amount = -CapacityService::accumulated_capacity(
                    node,
                    start,
                    window,
                    self.settings.unlimited_sentinel,
                );
            }
            node.computed = computed;
        }
    }

    fn roll_up_capacities(
        &self,
        snapshot: &mut Snapshot,
        window: &ViewWindow,
        report: &mut AggregationReport,
    ) {
        let interval = window.interval();
        let sentinel = self.settings.unlimited_sentinel;
        let mut contributions = Vec::new();

        for (position, node) in snapshot.nodes.iter().enumerate() {
            let (parent_field, grandparent_field) = match node.tier() {
                NodeTier::Budget => continue,
                NodeTier::Section => (RollupField::Children, None),
                NodeTier::Category => (RollupField::Children, Some(RollupField::GrandChildren)),
            };
            let Some(parent) = snapshot.parent_of(position) else {
                debug!(node = %node.id, tier = %node.tier(), "parent missing, excluded from rollup");
                report.dangling_nodes += 1;
                continue;
            };
            let grandparent = match grandparent_field {
                Some(field) => match snapshot.parent_of(parent) {
                    Some(index) => Some((index, field)),
                    None => {
                        debug!(node = %node.id, "grandparent missing, excluded from budget rollup");
                        report.dangling_nodes += 1;
                        None
                    }
                },
                None => None,
            };

            for capacity in &node.capacities {
                let amount = capacity.bounded_amount_for(interval, sentinel);
                let attributed_at = capacity.active_from.unwrap_or(NaiveDateTime::MIN);
                contributions.push(Contribution {
                    target: parent,
                    field: parent_field,
                    attributed_at,
                    amount,
                });
                if let Some((target, field)) = grandparent {
                    contributions.push(Contribution {
                        target,
                        field,
                        attributed_at,
                        amount,
                    });
                }
            }
        }

        for contribution in contributions {
            let node = &mut snapshot.nodes[contribution.target];
            let Some(version) = CapacityService::find_active(node, contribution.attributed_at)
            else {
                continue;
            };
            let rollup = node.computed.capacity_rollups.entry(version.id).or_default();
            match contribution.field {
                RollupField::Children => rollup.children_total += contribution.amount,
                RollupField::GrandChildren => rollup.grand_children_total += contribution.amount,
            }
        }

        for node in &mut snapshot.nodes {
            let active = CapacityService::active_capacity(node, window.anchor()).id;
            if let Some(rollup) = node.computed.capacity_rollups.get(&active).copied() {
                node.computed.children_total = rollup.children_total;
                node.computed.grand_children_total = rollup.grand_children_total;
            }
        }
    }
}

fn distribute_entries(
    snapshot: &mut Snapshot,
    input: &AggregationInput<'_>,
    report: &mut AggregationReport,
) {
    let accounts: HashMap<Uuid, &Account> = input
        .accounts
        .iter()
        .map(|account| (account.id, account))
        .collect();

    for entry in input.entries {
        let Some(account) = accounts.get(&entry.account_id).filter(|account| !account.hide)
        else {
            report.skipped_entries += 1;
            continue;
        };

        let targets: Vec<(usize, Bucket)> = match entry.label.category_id {
            Some(category_id) => {
                let Some(category) = snapshot.position(NodeTier::Category, category_id) else {
                    report.skipped_entries += 1;
                    continue;
                };
                snapshot
                    .lineage(category)
                    .into_iter()
                    .map(|index| (index, Bucket::Sorted))
                    .collect()
            }
            None => {
                let budget = entry
                    .label
                    .budget_id
                    .or(account.label.budget_id)
                    .and_then(|id| snapshot.position(NodeTier::Budget, id));
                let Some(budget) = budget else {
                    report.skipped_entries += 1;
                    continue;
                };
                vec![(budget, Bucket::Unsorted)]
            }
        };

        let mut placements = Vec::with_capacity(targets.len());
        for (index, bucket) in targets {
            placements.push(apply_entry(
                &mut snapshot.nodes[index],
                entry,
                bucket,
                input.window,
            ));
        }
        if placements.contains(&Placement::InWindow) {
            report.in_window_entries += 1;
        }
        if placements.contains(&Placement::RolledOver) {
            report.rolled_over_entries += 1;
        }
    }
}

fn apply_entry(
    node: &mut BudgetNode,
    entry: &LedgerEntry,
    bucket: Bucket,
    window: &ViewWindow,
) -> Placement {
    if window.has(entry.date) {
        match bucket {
            Bucket::Sorted => node.computed.sorted_amount += entry.amount,
            Bucket::Unsorted => {
                node.computed.unsorted_amount += entry.amount;
                node.computed.number_of_unsorted_items += 1;
            }
        }
        return Placement::InWindow;
    }
    match node.roll_over_start() {
        Some(start) if start <= entry.date && entry.date < window.bucket_start() => {
            node.computed.rolled_over_amount += entry.amount;
            Placement::RolledOver
        }
        _ => Placement::Ignored,
    }
}

/// Per-run working copy of the hierarchy with tier-scoped indexes.
struct Snapshot {
    nodes: Vec<BudgetNode>,
    index: HashMap<(NodeTier, Uuid), usize>,
}

impl Snapshot {
    fn new(hierarchy: &Hierarchy) -> Self {
        let nodes = hierarchy.nodes.clone();
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            // First record wins when a tier holds a duplicate id.
            index.entry((node.tier(), node.id)).or_insert(position);
        }
        Self { nodes, index }
    }

    fn position(&self, tier: NodeTier, id: Uuid) -> Option<usize> {
        self.index.get(&(tier, id)).copied()
    }

    fn parent_of(&self, position: usize) -> Option<usize> {
        let node = &self.nodes[position];
        self.position(node.tier().parent()?, node.parent_id()?)
    }

    /// The node followed by every ancestor that resolves.
    fn lineage(&self, position: usize) -> Vec<usize> {
        let mut chain = vec![position];
        let mut current = position;
        while let Some(parent) = self.parent_of(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }
}

#[derive(Debug, Clone, Copy)]
enum RollupField {
    Children,
    GrandChildren,
}

#[derive(Debug, Clone, Copy)]
struct Contribution {
    target: usize,
    field: RollupField,
    attributed_at: NaiveDateTime,
    amount: f64,
}

#[derive(Debug, Clone, Copy)]
enum Bucket {
    Sorted,
    Unsorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    InWindow,
    RolledOver,
    Ignored,
}
