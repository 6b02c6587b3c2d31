//! Matrix projections: dense views over a chosen subset of elements.
//!
//! A projection is built once from a matrix and a visible element list and
//! only recomputed when [`MatrixProjection::recalculate`] is called. Every
//! cell holds an edge, including empty ones, so constraints can be resolved
//! against cells without traffic.

use std::collections::{HashMap, HashSet};

use crate::aggregation::{aggregate_dependencies, TargetSet};
use crate::model::{DependencyMetric, Edge, ElementId, Matrix, Metric};

#[derive(Debug, Clone)]
pub struct MatrixProjection<'m> {
    matrix: &'m Matrix,
    elements: Vec<ElementId>,
    index: HashMap<ElementId, usize>,
    cells: Vec<Vec<Edge>>,
    max_dependencies: u64,
    max_co_changes: u64,
}

impl<'m> MatrixProjection<'m> {
    /// View over `elements`, in the given order
    pub fn new(matrix: &'m Matrix, elements: Vec<ElementId>) -> Self {
        let index = elements
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position))
            .collect();
        let mut projection = Self {
            matrix,
            elements,
            index,
            cells: Vec::new(),
            max_dependencies: 0,
            max_co_changes: 0,
        };
        projection.recalculate();
        projection
    }

    /// Every leaf of the matrix
    pub fn over_leaves(matrix: &'m Matrix) -> Self {
        Self::new(matrix, matrix.leaves().to_vec())
    }

    /// The first level of the hierarchy, or the leaves when there is none
    pub fn top_level(matrix: &'m Matrix) -> Self {
        Self::new(matrix, matrix.top_level())
    }

    /// Dependents, the element, then its dependees.
    ///
    /// Neighbors are computed at leaf level with the element's own subtree
    /// collapsed into the element.
    pub fn centered_on(matrix: &'m Matrix, element: ElementId) -> Self {
        let mut base: Vec<ElementId> = matrix
            .leaves()
            .iter()
            .copied()
            .filter(|leaf| !matrix.is_within(*leaf, element))
            .collect();
        base.push(element);
        let base = Self::new(matrix, base);

        let mut seen = HashSet::new();
        let view: Vec<ElementId> = base
            .dependents(element)
            .into_iter()
            .chain(std::iter::once(element))
            .chain(base.dependees(element))
            .filter(|id| seen.insert(*id))
            .collect();
        Self::new(matrix, view)
    }

    /// Rebuild every cell from the matrix
    pub fn recalculate(&mut self) {
        let targets: TargetSet = self.elements.iter().collect();
        let n = self.elements.len();
        let mut max_dependencies = 0;
        let mut max_co_changes = 0;
        let cells = self
            .elements
            .iter()
            .map(|&source| {
                let mut row: Vec<Edge> = self
                    .elements
                    .iter()
                    .map(|&destination| Edge::empty(source, destination))
                    .collect();
                for edge in aggregate_dependencies(self.matrix, source, &targets) {
                    if let Some(&column) = self.index.get(&edge.destination()) {
                        max_dependencies = max_dependencies.max(edge.total_dependencies());
                        max_co_changes = max_co_changes.max(edge.co_changes());
                        row[column] = edge;
                    }
                }
                debug_assert_eq!(row.len(), n);
                row
            })
            .collect();
        self.cells = cells;
        self.max_dependencies = max_dependencies;
        self.max_co_changes = max_co_changes;
    }

    pub fn matrix(&self) -> &'m Matrix {
        self.matrix
    }

    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index.contains_key(&id)
    }

    /// Cell at row `source`, column `destination`
    pub fn cell(&self, source: usize, destination: usize) -> &Edge {
        &self.cells[source][destination]
    }

    pub fn edge_between(&self, source: ElementId, destination: ElementId) -> Option<&Edge> {
        Some(self.cell(self.position(source)?, self.position(destination)?))
    }

    pub fn max_dependencies(&self) -> u64 {
        self.max_dependencies
    }

    pub fn max_co_changes(&self) -> u64 {
        self.max_co_changes
    }

    fn column(&self, id: ElementId) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        let column = self.position(id);
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(row, cells)| match column {
                Some(column) if row != column => Some((row, &cells[column])),
                _ => None,
            })
    }

    fn row(&self, id: ElementId) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        let row = self.position(id);
        row.into_iter().flat_map(move |row| {
            self.cells[row]
                .iter()
                .enumerate()
                .filter(move |(column, _)| *column != row)
        })
    }

    /// Visible elements with a dependency into `id`
    pub fn dependents(&self, id: ElementId) -> Vec<ElementId> {
        self.column(id)
            .filter(|(_, edge)| edge.total_dependencies() > 0)
            .map(|(row, _)| self.elements[row])
            .collect()
    }

    pub fn number_of_dependents(&self, id: ElementId) -> usize {
        self.dependents(id).len()
    }

    /// Visible elements `id` depends on
    pub fn dependees(&self, id: ElementId) -> Vec<ElementId> {
        self.row(id)
            .filter(|(_, edge)| edge.total_dependencies() > 0)
            .map(|(column, _)| self.elements[column])
            .collect()
    }

    pub fn number_of_dependees(&self, id: ElementId) -> usize {
        self.dependees(id).len()
    }

    pub fn incoming_dependencies(&self, id: ElementId) -> u64 {
        self.column(id).map(|(_, edge)| edge.total_dependencies()).sum()
    }

    pub fn outgoing_dependencies(&self, id: ElementId) -> u64 {
        self.row(id).map(|(_, edge)| edge.total_dependencies()).sum()
    }

    /// Visible elements `id` has co-changed with, read from its row
    pub fn co_change_partners(&self, id: ElementId) -> Vec<ElementId> {
        self.row(id)
            .filter(|(_, edge)| edge.co_changes() > 0)
            .map(|(column, _)| self.elements[column])
            .collect()
    }

    pub fn total_co_changes(&self, id: ElementId) -> u64 {
        self.row(id).map(|(_, edge)| edge.co_changes()).sum()
    }

    /// Visible elements standing in for `id`.
    ///
    /// `id` itself if visible, else its nearest visible ancestor, else every
    /// visible descendant.
    pub fn elements_in_view(&self, id: ElementId) -> Vec<ElementId> {
        if self.contains(id) {
            return vec![id];
        }
        if let Some(ancestor) = self.matrix.ancestors(id).find(|a| self.contains(*a)) {
            return vec![ancestor];
        }
        self.matrix
            .descendants(id)
            .into_iter()
            .filter(|d| self.contains(*d))
            .collect()
    }

    /// Cells covered by at least one of the matrix's dependency constraints
    pub fn constraint_grid(&self) -> Vec<Vec<bool>> {
        let n = self.len();
        let mut grid = vec![vec![false; n]; n];
        for constraint in self.matrix.dependency_constraints() {
            let sources = self.elements_in_view(constraint.source);
            let destinations = self.elements_in_view(constraint.destination);
            for source in &sources {
                for destination in &destinations {
                    if let (Some(row), Some(column)) =
                        (self.position(*source), self.position(*destination))
                    {
                        grid[row][column] = true;
                    }
                }
            }
        }
        grid
    }
}

/// Materialize the derived metrics on every leaf.
///
/// Values come from a leaf-level projection. Bounds for each derived metric
/// and the cell-level dependency maxima are refreshed as well.
pub fn derive_metrics(matrix: &mut Matrix) {
    let (values, max_dependencies, max_co_changes) = {
        let projection = MatrixProjection::over_leaves(matrix);
        let values: Vec<(ElementId, [i64; 4])> = matrix
            .leaves()
            .iter()
            .map(|&leaf| {
                let total =
                    projection.incoming_dependencies(leaf) + projection.outgoing_dependencies(leaf);
                (
                    leaf,
                    [
                        projection.number_of_dependents(leaf) as i64,
                        projection.number_of_dependees(leaf) as i64,
                        total as i64,
                        projection.co_change_partners(leaf).len() as i64,
                    ],
                )
            })
            .collect();
        (
            values,
            projection.max_dependencies(),
            projection.max_co_changes(),
        )
    };

    let metrics = [
        Metric::DEPENDENT_PARTNERS,
        Metric::DEPENDS_ON_PARTNERS,
        Metric::TOTAL_DEPENDENCIES,
        Metric::CO_CHANGE_PARTNERS,
    ];
    for (leaf, row) in values {
        for (metric, value) in metrics.iter().zip(row) {
            matrix.set_derived_metric(leaf, metric, value);
        }
    }
    for metric in &metrics {
        matrix.update_bounds(metric);
    }
    matrix.set_dependency_max(DependencyMetric::Dependencies, max_dependencies);
    matrix.set_dependency_max(DependencyMetric::CoChanges, max_co_changes);
    log::debug!(
        "{}: derived metrics for {} leaves",
        matrix.name(),
        matrix.leaves().len()
    );
}
