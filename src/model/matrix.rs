//! The matrix container: an arena of elements plus the hierarchy over them.

use std::collections::{BTreeMap, HashMap};

use super::constraint::{DependencyConstraint, ElementConstraint};
use super::dependency::DependencyEdge;
use super::element::{Element, ElementId};
use super::input::{IngestReport, MatrixInput, MetricRecord};
use super::metric::{DependencyMetric, Metric, MetricBounds};
use crate::errors::{Error, Result, ResultExt};

/// A design structure matrix for one snapshot of a codebase.
///
/// Leaves are registered first and are the authoritative element list.
/// Groups are layered on top afterwards (see [`crate::grouping`]); the name
/// lookup is rebuilt every time the installed hierarchy changes.
#[derive(Debug, Clone)]
pub struct Matrix {
    name: String,
    elements: Vec<Element>,
    leaves: Vec<ElementId>,
    root: Option<ElementId>,
    lookup: HashMap<String, ElementId>,
    dependency_constraints: Vec<DependencyConstraint>,
    bounds: HashMap<String, MetricBounds>,
    dependency_max: BTreeMap<DependencyMetric, u64>,
}

impl Matrix {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            leaves: Vec::new(),
            root: None,
            lookup: HashMap::new(),
            dependency_constraints: Vec::new(),
            bounds: HashMap::new(),
            dependency_max: BTreeMap::new(),
        }
    }

    /// Build a matrix from loader output
    pub fn from_input(input: MatrixInput) -> Result<Self> {
        let mut matrix = Matrix::new(input.name);
        let ids = input
            .elements
            .into_iter()
            .map(|name| matrix.add_leaf(name))
            .collect::<Result<Vec<_>>>()?;

        let resolve = |index: usize| {
            ids.get(index).copied().ok_or(Error::ElementIndex {
                index,
                len: ids.len(),
            })
        };
        for edge in input.edges {
            let source = resolve(edge.source)?;
            let destination = resolve(edge.destination)?;
            matrix
                .add_edge(source, destination, edge.dependencies)
                .context(format!("edge {} -> {}", edge.source, edge.destination))?;
        }
        Ok(matrix)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a leaf. Leaves cannot be added once groups exist.
    pub fn add_leaf(&mut self, full_name: impl Into<String>) -> Result<ElementId> {
        let full_name = full_name.into();
        if self.elements.len() != self.leaves.len() {
            return Err(Error::Hierarchy(format!(
                "cannot add leaf {} after groups were created",
                full_name
            )));
        }
        if self.lookup.contains_key(&full_name) {
            return Err(Error::DuplicateElement(full_name));
        }
        let id = ElementId(self.elements.len());
        self.elements.push(Element::leaf(id, full_name.clone()));
        self.leaves.push(id);
        self.lookup.insert(full_name, id);
        Ok(id)
    }

    pub fn add_group(&mut self, full_name: impl Into<String>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element::group(id, full_name.into()));
        id
    }

    /// Make `child` a child of `group`, recording the back-reference
    pub fn add_child(&mut self, group: ElementId, child: ElementId) -> Result<()> {
        if self.is_within(group, child) {
            return Err(Error::Hierarchy(format!(
                "{} cannot contain its own ancestor {}",
                self.full_name(group),
                self.full_name(child)
            )));
        }
        if let Some(parent) = self.element(child).parent() {
            return Err(Error::Hierarchy(format!(
                "{} already belongs to {}",
                self.full_name(child),
                self.full_name(parent)
            )));
        }
        self.elements[group.0].push_child(child)?;
        self.elements[child.0].set_parent(Some(group));
        if self.root.is_some() {
            self.rebuild_lookup();
        }
        Ok(())
    }

    /// Install the hierarchy root and rebuild the name lookup
    pub fn set_root(&mut self, root: ElementId) -> Result<()> {
        if !self.element(root).is_group() {
            return Err(Error::NotAGroup(self.full_name(root).to_string()));
        }
        self.root = Some(root);
        self.rebuild_lookup();
        Ok(())
    }

    /// Drop every group, leaving the flat leaf list
    pub fn clear_hierarchy(&mut self) {
        self.elements.truncate(self.leaves.len());
        for element in &mut self.elements {
            element.set_parent(None);
        }
        self.root = None;
        self.dependency_constraints
            .retain(|c| c.source.0 < self.leaves.len() && c.destination.0 < self.leaves.len());
        self.rebuild_lookup();
    }

    fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        for &leaf in &self.leaves {
            self.lookup
                .insert(self.elements[leaf.0].full_name().to_string(), leaf);
        }
        let groups = match self.root {
            Some(root) => std::iter::once(root)
                .chain(self.descendants(root))
                .filter(|id| self.element(*id).is_group())
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };
        for group in groups {
            let name = self.elements[group.0].full_name().to_string();
            if self.lookup.contains_key(&name) {
                log::warn!("group {} shadows a leaf of the same name; keeping the leaf", name);
                continue;
            }
            self.lookup.insert(name, group);
        }
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Panics on ids from another matrix
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn full_name(&self, id: ElementId) -> &str {
        self.element(id).full_name()
    }

    pub fn leaves(&self) -> &[ElementId] {
        &self.leaves
    }

    pub fn leaf_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves.iter().map(|id| self.full_name(*id))
    }

    /// Exact lookup over leaves and the installed hierarchy
    pub fn get_by_full_name(&self, name: &str) -> Option<ElementId> {
        self.lookup.get(name).copied()
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.element(id).parent(), |current| {
            self.element(*current).parent()
        })
    }

    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Depth-first, pre-order; `id` itself is excluded
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.element(id).children().iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.element(current).children().iter().rev().copied());
        }
        out
    }

    /// The leaf itself, or every leaf beneath a group
    pub fn leaves_under(&self, id: ElementId) -> Vec<ElementId> {
        if self.element(id).is_leaf() {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|d| self.element(*d).is_leaf())
            .collect()
    }

    /// Root children when a hierarchy exists, otherwise the leaves
    pub fn top_level(&self) -> Vec<ElementId> {
        match self.root {
            Some(root) => self.element(root).children().to_vec(),
            None => self.leaves.clone(),
        }
    }

    pub fn add_edge(
        &mut self,
        source: ElementId,
        destination: ElementId,
        dependencies: impl IntoIterator<Item = (String, u64)>,
    ) -> Result<()> {
        let mut edge = DependencyEdge::new(source, destination);
        for (kind, count) in dependencies {
            edge.add_dependency(kind, count)?;
        }
        self.element_mut(source).attach_edge(edge)
    }

    /// Add co-change occurrences, creating the edge when none exists
    pub fn record_co_changes(
        &mut self,
        source: ElementId,
        destination: ElementId,
        count: u64,
    ) -> Result<()> {
        let leaf = self.element_mut(source).leaf_mut()?;
        let edges = leaf.edges_mut();
        match edges.iter_mut().find(|e| e.destination() == destination) {
            Some(edge) => edge.add_co_changes(count),
            None => {
                let mut edge = DependencyEdge::new(source, destination);
                edge.add_co_changes(count);
                edges.push(edge);
            }
        }
        Ok(())
    }

    /// Stored or derived value; groups sum their children
    pub fn metric_value(&self, id: ElementId, metric: &Metric) -> Option<i64> {
        let element = self.element(id);
        match element.as_leaf() {
            Some(leaf) if metric.is_derived() => leaf.derived_metric(metric.name()),
            Some(leaf) => leaf.stored_metric(metric.name()),
            None => element
                .children()
                .iter()
                .filter_map(|child| self.metric_value(*child, metric))
                .fold(None, |total, value| Some(total.unwrap_or(0) + value)),
        }
    }

    /// Add to a stored metric of a leaf
    pub fn add_metric(&mut self, id: ElementId, metric: &Metric, value: i64) -> Result<()> {
        if metric.is_derived() {
            return Err(Error::DerivedMetric(metric.name().to_string()));
        }
        self.element_mut(id).leaf_mut()?.add_stored(metric.name(), value);
        Ok(())
    }

    pub(crate) fn set_derived_metric(&mut self, id: ElementId, metric: &Metric, value: i64) {
        debug_assert!(metric.is_derived());
        if let Some(leaf) = self.element_mut(id).as_leaf_mut() {
            leaf.set_derived(metric.name(), value);
        }
    }

    /// Apply metric records additively, collecting names that did not match.
    ///
    /// Every record is checked before any value is added, so a record aimed
    /// at a group or at a derived metric leaves the matrix untouched.
    pub fn ingest_metrics(
        &mut self,
        records: impl IntoIterator<Item = MetricRecord>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut accepted = Vec::new();
        for record in records {
            let Some(id) = self.get_by_full_name(&record.element) else {
                log::debug!(
                    "{}: no element named {} for metric {}",
                    self.name,
                    record.element,
                    record.metric
                );
                report.unmatched.push(record.element);
                continue;
            };
            let metric = Metric::from_name(&record.metric);
            if metric.is_derived() {
                return Err(Error::DerivedMetric(record.metric)
                    .with_context(format!("ingesting {}", record.element)));
            }
            if !self.element(id).is_leaf() {
                return Err(Error::NotALeaf(record.element.clone())
                    .with_context(format!("ingesting {}", record.element)));
            }
            accepted.push((id, metric, record.value));
        }

        for (id, metric, value) in accepted {
            self.add_metric(id, &metric, value)?;
            report.matched += 1;
        }
        Ok(report)
    }

    /// Recompute the extremes of `metric` over the leaves
    pub fn update_bounds(&mut self, metric: &Metric) -> Option<MetricBounds> {
        let bounds = MetricBounds::from_values(
            self.leaves
                .iter()
                .filter_map(|id| self.metric_value(*id, metric)),
        )?;
        self.bounds.insert(metric.name().to_string(), bounds);
        Some(bounds)
    }

    pub fn bounds(&self, metric: &Metric) -> Option<MetricBounds> {
        self.bounds.get(metric.name()).copied()
    }

    pub fn dependency_max(&self, kind: DependencyMetric) -> u64 {
        self.dependency_max.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn set_dependency_max(&mut self, kind: DependencyMetric, value: u64) {
        self.dependency_max.insert(kind, value);
    }

    pub fn add_dependency_constraint(
        &mut self,
        source: ElementId,
        destination: ElementId,
    ) -> Result<()> {
        let constraint = DependencyConstraint {
            source,
            destination,
        };
        if self.dependency_constraints.contains(&constraint) {
            return Err(Error::DuplicateDependencyConstraint {
                from: self.full_name(source).to_string(),
                to: self.full_name(destination).to_string(),
            });
        }
        self.dependency_constraints.push(constraint);
        Ok(())
    }

    pub fn remove_dependency_constraint(
        &mut self,
        source: ElementId,
        destination: ElementId,
    ) -> bool {
        let before = self.dependency_constraints.len();
        self.dependency_constraints
            .retain(|c| !(c.source == source && c.destination == destination));
        before != self.dependency_constraints.len()
    }

    pub fn dependency_constraints(&self) -> &[DependencyConstraint] {
        &self.dependency_constraints
    }

    /// One constraint per metric per leaf
    pub fn add_element_constraint(
        &mut self,
        id: ElementId,
        constraint: ElementConstraint,
    ) -> Result<()> {
        let name = self.full_name(id).to_string();
        let constraints = self.element_mut(id).leaf_mut()?.constraints_mut();
        if constraints.iter().any(|c| c.metric == constraint.metric) {
            return Err(Error::DuplicateElementConstraint {
                element: name,
                metric: constraint.metric,
            });
        }
        constraints.push(constraint);
        Ok(())
    }

    pub fn remove_element_constraint(
        &mut self,
        id: ElementId,
        metric: &str,
    ) -> Option<ElementConstraint> {
        let constraints = self.element_mut(id).as_leaf_mut()?.constraints_mut();
        let position = constraints.iter().position(|c| c.metric == metric)?;
        Some(constraints.remove(position))
    }
}
