//! Dependency edges between elements.
//!
//! A [`DependencyEdge`] is stored on its source leaf. An
//! [`AggregateDependencyEdge`] is produced on demand when dependencies are
//! rolled up to group level and summarizes the finer-grained edges it merged.

use std::collections::BTreeMap;

use super::element::ElementId;
use crate::errors::{Error, Result};

/// A stored edge from one leaf to one destination element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    source: ElementId,
    destination: ElementId,
    dependencies: BTreeMap<String, u64>,
    co_changes: u64,
}

impl DependencyEdge {
    pub fn new(source: ElementId, destination: ElementId) -> Self {
        Self {
            source,
            destination,
            dependencies: BTreeMap::new(),
            co_changes: 0,
        }
    }

    pub fn source(&self) -> ElementId {
        self.source
    }

    pub fn destination(&self) -> ElementId {
        self.destination
    }

    /// Register the occurrence count of one dependency type.
    ///
    /// Stored edges are never merged, so a type can be registered once.
    pub fn add_dependency(&mut self, kind: impl Into<String>, count: u64) -> Result<()> {
        let kind = kind.into();
        if self.dependencies.contains_key(&kind) {
            return Err(Error::DuplicateDependencyType {
                kind,
                edge: format!("{} -> {}", self.source, self.destination),
            });
        }
        self.dependencies.insert(kind, count);
        Ok(())
    }

    pub fn dependency(&self, kind: &str) -> Option<u64> {
        self.dependencies.get(kind).copied()
    }

    pub fn dependencies(&self) -> &BTreeMap<String, u64> {
        &self.dependencies
    }

    pub fn total_dependencies(&self) -> u64 {
        self.dependencies.values().sum()
    }

    pub fn co_changes(&self) -> u64 {
        self.co_changes
    }

    pub fn add_co_changes(&mut self, count: u64) {
        self.co_changes += count;
    }
}

/// A derived edge summarizing several finer-grained edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDependencyEdge {
    source: ElementId,
    destination: ElementId,
    dependencies: BTreeMap<String, u64>,
    co_changes: u64,
    max_co_changes: u64,
    max_dependencies: u64,
    constituents: Vec<Edge>,
}

impl AggregateDependencyEdge {
    pub fn new(source: ElementId, destination: ElementId) -> Self {
        Self {
            source,
            destination,
            dependencies: BTreeMap::new(),
            co_changes: 0,
            max_co_changes: 0,
            max_dependencies: 0,
            constituents: Vec::new(),
        }
    }

    /// Fold a constituent edge into this aggregate.
    ///
    /// Type counts and co-changes are summed. The maxima track the single
    /// most intense constituent, looking through nested aggregates.
    pub fn merge(&mut self, edge: Edge) {
        for (kind, count) in edge.dependencies() {
            *self.dependencies.entry(kind.clone()).or_insert(0) += count;
        }
        self.co_changes += edge.co_changes();
        self.max_co_changes = self.max_co_changes.max(edge.max_co_changes());
        self.max_dependencies = self.max_dependencies.max(edge.max_dependencies());
        self.constituents.push(edge);
    }

    pub fn constituents(&self) -> &[Edge] {
        &self.constituents
    }

    pub fn max_co_changes(&self) -> u64 {
        self.max_co_changes
    }

    pub fn max_dependencies(&self) -> u64 {
        self.max_dependencies
    }
}

/// Either a stored edge or a derived aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Direct(DependencyEdge),
    Aggregate(AggregateDependencyEdge),
}

impl Edge {
    /// An edge with no traffic, used for empty projection cells
    pub fn empty(source: ElementId, destination: ElementId) -> Self {
        Edge::Aggregate(AggregateDependencyEdge::new(source, destination))
    }

    pub fn source(&self) -> ElementId {
        match self {
            Edge::Direct(edge) => edge.source,
            Edge::Aggregate(edge) => edge.source,
        }
    }

    pub fn destination(&self) -> ElementId {
        match self {
            Edge::Direct(edge) => edge.destination,
            Edge::Aggregate(edge) => edge.destination,
        }
    }

    pub fn dependencies(&self) -> &BTreeMap<String, u64> {
        match self {
            Edge::Direct(edge) => &edge.dependencies,
            Edge::Aggregate(edge) => &edge.dependencies,
        }
    }

    pub fn dependency(&self, kind: &str) -> Option<u64> {
        self.dependencies().get(kind).copied()
    }

    pub fn total_dependencies(&self) -> u64 {
        self.dependencies().values().sum()
    }

    pub fn co_changes(&self) -> u64 {
        match self {
            Edge::Direct(edge) => edge.co_changes,
            Edge::Aggregate(edge) => edge.co_changes,
        }
    }

    pub fn max_co_changes(&self) -> u64 {
        match self {
            Edge::Direct(edge) => edge.co_changes,
            Edge::Aggregate(edge) => edge.max_co_changes,
        }
    }

    pub fn max_dependencies(&self) -> u64 {
        match self {
            Edge::Direct(edge) => edge.total_dependencies(),
            Edge::Aggregate(edge) => edge.max_dependencies,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Edge::Aggregate(_))
    }

    /// Merge another edge into this one, promoting a direct edge to an
    /// aggregate keyed by the same endpoints first.
    pub fn absorb(&mut self, other: Edge) {
        let promoted = match self {
            Edge::Direct(direct) => {
                let mut aggregate =
                    AggregateDependencyEdge::new(direct.source, direct.destination);
                aggregate.merge(Edge::Direct(direct.clone()));
                Some(aggregate)
            }
            Edge::Aggregate(_) => None,
        };
        if let Some(aggregate) = promoted {
            *self = Edge::Aggregate(aggregate);
        }
        if let Edge::Aggregate(aggregate) = self {
            aggregate.merge(other);
        }
    }
}
