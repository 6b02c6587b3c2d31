//! Leaf and group elements.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::constraint::ElementConstraint;
use super::dependency::DependencyEdge;
use crate::errors::{Error, Result};

/// Index of an element in its matrix's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Method-level record attached to a leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMethod {
    pub name: String,
    pub size: u32,
    pub complexity: u32,
    pub parameters: u32,
}

/// Outcome of hotspot detection recorded on a leaf
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotspotData {
    pub times: usize,
    pub index: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Leaf {
    metrics: BTreeMap<String, i64>,
    derived: BTreeMap<String, i64>,
    edges: Vec<DependencyEdge>,
    methods: Vec<ElementMethod>,
    smells: BTreeSet<String>,
    hotspot: Option<HotspotData>,
    constraints: Vec<ElementConstraint>,
}

impl Leaf {
    pub fn stored_metric(&self, name: &str) -> Option<i64> {
        self.metrics.get(name).copied()
    }

    pub fn derived_metric(&self, name: &str) -> Option<i64> {
        self.derived.get(name).copied()
    }

    pub fn stored_metrics(&self) -> &BTreeMap<String, i64> {
        &self.metrics
    }

    pub(crate) fn add_stored(&mut self, name: &str, value: i64) {
        *self.metrics.entry(name.to_string()).or_insert(0) += value;
    }

    pub(crate) fn set_derived(&mut self, name: &str, value: i64) {
        self.derived.insert(name.to_string(), value);
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut Vec<DependencyEdge> {
        &mut self.edges
    }

    /// Methods ordered largest first
    pub fn methods(&self) -> &[ElementMethod] {
        &self.methods
    }

    pub fn add_method(&mut self, method: ElementMethod) {
        self.methods.push(method);
        self.methods.sort_by(|a, b| b.size.cmp(&a.size));
    }

    pub fn smells(&self) -> &BTreeSet<String> {
        &self.smells
    }

    pub fn add_smell(&mut self, smell: impl Into<String>) {
        self.smells.insert(smell.into());
    }

    pub fn hotspot(&self) -> Option<HotspotData> {
        self.hotspot
    }

    pub fn set_hotspot(&mut self, data: Option<HotspotData>) {
        self.hotspot = data;
    }

    pub fn constraints(&self) -> &[ElementConstraint] {
        &self.constraints
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut Vec<ElementConstraint> {
        &mut self.constraints
    }
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    children: Vec<ElementId>,
}

impl Group {
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Leaf(Leaf),
    Group(Group),
}

/// A node of the matrix hierarchy.
///
/// Groups own their children by id. The parent id is a back-reference used
/// only to walk up to ancestors.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    full_name: String,
    parent: Option<ElementId>,
    kind: ElementKind,
}

impl Element {
    pub(crate) fn leaf(id: ElementId, full_name: String) -> Self {
        Self {
            id,
            full_name,
            parent: None,
            kind: ElementKind::Leaf(Leaf::default()),
        }
    }

    pub(crate) fn group(id: ElementId, full_name: String) -> Self {
        Self {
            id,
            full_name,
            parent: None,
            kind: ElementKind::Group(Group::default()),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_group()
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match &self.kind {
            ElementKind::Leaf(leaf) => Some(leaf),
            ElementKind::Group(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match &mut self.kind {
            ElementKind::Leaf(leaf) => Some(leaf),
            ElementKind::Group(_) => None,
        }
    }

    /// Mutable leaf access for operations that are meaningless on groups
    pub fn leaf_mut(&mut self) -> Result<&mut Leaf> {
        match &mut self.kind {
            ElementKind::Leaf(leaf) => Ok(leaf),
            ElementKind::Group(_) => Err(Error::NotALeaf(self.full_name.clone())),
        }
    }

    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Group(group) => group.children(),
            ElementKind::Leaf(_) => &[],
        }
    }

    pub(crate) fn push_child(&mut self, child: ElementId) -> Result<()> {
        match &mut self.kind {
            ElementKind::Group(group) => {
                group.children.push(child);
                Ok(())
            }
            ElementKind::Leaf(_) => Err(Error::NotAGroup(self.full_name.clone())),
        }
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        self.as_leaf().map(Leaf::edges).unwrap_or(&[])
    }

    /// Edge from this element to `destination`, if stored
    pub fn edge_to(&self, destination: ElementId) -> Option<&DependencyEdge> {
        self.edges().iter().find(|e| e.destination() == destination)
    }

    /// Attach an edge whose declared source is this element
    pub fn attach_edge(&mut self, edge: DependencyEdge) -> Result<()> {
        let id = self.id;
        let name = self.full_name.clone();
        let leaf = self.leaf_mut()?;
        if edge.source() != id {
            return Err(Error::EdgeSourceMismatch {
                element: name,
                edge_source: edge.source().to_string(),
            });
        }
        if leaf.edges.iter().any(|e| e.destination() == edge.destination()) {
            return Err(Error::duplicate_edge(name, edge.destination().to_string()));
        }
        leaf.edges.push(edge);
        Ok(())
    }

    pub fn detach_edge(&mut self, destination: ElementId) -> Option<DependencyEdge> {
        let leaf = self.as_leaf_mut()?;
        let position = leaf
            .edges
            .iter()
            .position(|e| e.destination() == destination)?;
        Some(leaf.edges.remove(position))
    }

    /// Groups are never hotspots; their status is read from their leaves
    pub fn is_hotspot(&self) -> bool {
        self.as_leaf().is_some_and(|leaf| leaf.hotspot.is_some())
    }
}
