//! Dependency roll-up.
//!
//! Computes the edges from one source element into a set of candidate
//! targets, any of which may be groups. Edges whose destination is not a
//! target are re-keyed to the nearest ancestor that is, and merged
//! additively. Nothing here mutates the matrix; every call builds fresh
//! aggregate edges.

use std::collections::{HashMap, HashSet};

use crate::model::{AggregateDependencyEdge, Edge, ElementId, ElementKind, Matrix};

/// Candidate destinations of an aggregation query
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    members: HashSet<ElementId>,
}

impl TargetSet {
    pub fn contains(&self, id: ElementId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<ElementId> for TargetSet {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a ElementId> for TargetSet {
    fn from_iter<I: IntoIterator<Item = &'a ElementId>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}

/// Nearest ancestor of `id` that is a target, walking upwards
pub fn nearest_target_ancestor(
    matrix: &Matrix,
    id: ElementId,
    targets: &TargetSet,
) -> Option<ElementId> {
    matrix.ancestors(id).find(|ancestor| targets.contains(*ancestor))
}

/// Edges keyed by destination, in first-seen order
struct EdgeAccumulator {
    source: ElementId,
    edges: Vec<Edge>,
    slots: HashMap<ElementId, usize>,
}

impl EdgeAccumulator {
    fn new(source: ElementId) -> Self {
        Self {
            source,
            edges: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Keep an edge whose destination is already a target
    fn keep(&mut self, edge: Edge) {
        match self.slots.get(&edge.destination()) {
            Some(&slot) => self.edges[slot].absorb(edge),
            None => self.push(edge),
        }
    }

    /// Merge an edge into the aggregate keyed by `key`
    fn merge_into(&mut self, key: ElementId, edge: Edge) {
        match self.slots.get(&key) {
            Some(&slot) => self.edges[slot].absorb(edge),
            None => {
                let mut aggregate = AggregateDependencyEdge::new(self.source, key);
                aggregate.merge(edge);
                self.push(Edge::Aggregate(aggregate));
            }
        }
    }

    fn push(&mut self, edge: Edge) {
        self.slots.insert(edge.destination(), self.edges.len());
        self.edges.push(edge);
    }

    fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

/// Edges from `source` into `targets`, merged per target.
///
/// A leaf keeps its stored edges unchanged when their destination is a
/// target. A group always reports aggregates whose source is the group.
pub fn aggregate_dependencies(matrix: &Matrix, source: ElementId, targets: &TargetSet) -> Vec<Edge> {
    let mut acc = EdgeAccumulator::new(source);
    match matrix.element(source).kind() {
        ElementKind::Leaf(leaf) => {
            for edge in leaf.edges() {
                let destination = edge.destination();
                if targets.contains(destination) {
                    acc.keep(Edge::Direct(edge.clone()));
                } else if let Some(ancestor) = nearest_target_ancestor(matrix, destination, targets)
                {
                    acc.merge_into(ancestor, Edge::Direct(edge.clone()));
                }
            }
        }
        ElementKind::Group(group) => {
            for &child in group.children() {
                for edge in aggregate_dependencies(matrix, child, targets) {
                    let destination = edge.destination();
                    let key = if targets.contains(destination) {
                        Some(destination)
                    } else {
                        nearest_target_ancestor(matrix, destination, targets)
                    };
                    match key {
                        Some(key) => acc.merge_into(key, edge),
                        None => log::debug!(
                            "dropping {} -> {} while aggregating {}: no target above destination",
                            matrix.full_name(child),
                            matrix.full_name(destination),
                            matrix.full_name(source)
                        ),
                    }
                }
            }
        }
    }
    acc.into_edges()
}

/// Total dependencies from `source` into `destination` under `targets`
pub fn dependencies_between(
    matrix: &Matrix,
    source: ElementId,
    destination: ElementId,
    targets: &TargetSet,
) -> u64 {
    aggregate_dependencies(matrix, source, targets)
        .iter()
        .filter(|edge| edge.destination() == destination)
        .map(Edge::total_dependencies)
        .sum()
}
