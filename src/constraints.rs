//! Constraint checking and constraint import/export.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::model::{DependencyConstraint, ElementConstraint, ElementId, Matrix, Metric};
use crate::projection::MatrixProjection;

/// A disallowed dependency that exists in a projection cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyViolation {
    pub constraint: DependencyConstraint,
    pub source: ElementId,
    pub destination: ElementId,
    pub dependencies: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementViolation {
    pub element: String,
    pub metric: String,
    pub threshold: i64,
    pub value: i64,
}

/// Resolve every dependency constraint against the projection's cells
pub fn dependency_violations(projection: &MatrixProjection<'_>) -> Vec<DependencyViolation> {
    let matrix = projection.matrix();
    let mut violations = Vec::new();
    for constraint in matrix.dependency_constraints() {
        let sources = projection.elements_in_view(constraint.source);
        let destinations = projection.elements_in_view(constraint.destination);
        for &source in &sources {
            for &destination in &destinations {
                let Some(edge) = projection.edge_between(source, destination) else {
                    continue;
                };
                let dependencies = edge.total_dependencies();
                if dependencies > 0 {
                    violations.push(DependencyViolation {
                        constraint: *constraint,
                        source,
                        destination,
                        dependencies,
                    });
                }
            }
        }
    }
    violations
}

/// Leaves whose value exceeds one of their thresholds
pub fn element_violations(matrix: &Matrix) -> Vec<ElementViolation> {
    matrix
        .leaves()
        .iter()
        .filter_map(|&id| matrix.element(id).as_leaf().map(|leaf| (id, leaf)))
        .flat_map(|(id, leaf)| {
            leaf.constraints().iter().filter_map(move |constraint| {
                let value = matrix.metric_value(id, &Metric::from_name(&constraint.metric))?;
                constraint.is_violated_by(value).then(|| ElementViolation {
                    element: matrix.full_name(id).to_string(),
                    metric: constraint.metric.clone(),
                    threshold: constraint.threshold,
                    value,
                })
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConstraintDto {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConstraintDto {
    pub element: String,
    pub metric: String,
    pub threshold: i64,
}

/// Name-based constraint set of one matrix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConstraintsDto {
    pub matrix: String,
    #[serde(default)]
    pub dependency_constraints: Vec<DependencyConstraintDto>,
    #[serde(default)]
    pub element_constraints: Vec<ElementConstraintDto>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintImport {
    pub applied: usize,
    pub skipped: usize,
}

pub fn export_constraints(matrix: &Matrix) -> MatrixConstraintsDto {
    let dependency_constraints = matrix
        .dependency_constraints()
        .iter()
        .map(|c| DependencyConstraintDto {
            source: matrix.full_name(c.source).to_string(),
            destination: matrix.full_name(c.destination).to_string(),
        })
        .collect();
    let element_constraints = matrix
        .leaves()
        .iter()
        .filter_map(|&id| matrix.element(id).as_leaf().map(|leaf| (id, leaf)))
        .flat_map(|(id, leaf)| {
            leaf.constraints().iter().map(move |c| ElementConstraintDto {
                element: matrix.full_name(id).to_string(),
                metric: c.metric.clone(),
                threshold: c.threshold,
            })
        })
        .collect();
    MatrixConstraintsDto {
        matrix: matrix.name().to_string(),
        dependency_constraints,
        element_constraints,
    }
}

/// Apply constraints by name; names missing from the matrix are skipped.
///
/// The whole set is checked before anything is attached: a duplicate or an
/// element constraint on a group fails the import and leaves the matrix as
/// it was.
pub fn import_constraints(matrix: &mut Matrix, dto: &MatrixConstraintsDto) -> Result<ConstraintImport> {
    let mut outcome = ConstraintImport::default();

    let mut dependencies: Vec<DependencyConstraint> = Vec::new();
    for constraint in &dto.dependency_constraints {
        let resolved = (
            matrix.get_by_full_name(&constraint.source),
            matrix.get_by_full_name(&constraint.destination),
        );
        let (Some(source), Some(destination)) = resolved else {
            log::warn!(
                "{}: skipping constraint {} -> {}, element not found",
                matrix.name(),
                constraint.source,
                constraint.destination
            );
            outcome.skipped += 1;
            continue;
        };
        let resolved = DependencyConstraint {
            source,
            destination,
        };
        if matrix.dependency_constraints().contains(&resolved) || dependencies.contains(&resolved) {
            return Err(Error::DuplicateDependencyConstraint {
                from: constraint.source.clone(),
                to: constraint.destination.clone(),
            });
        }
        dependencies.push(resolved);
    }

    let mut elements: Vec<(ElementId, ElementConstraint)> = Vec::new();
    for constraint in &dto.element_constraints {
        let Some(id) = matrix.get_by_full_name(&constraint.element) else {
            log::warn!(
                "{}: skipping {} constraint on unknown element {}",
                matrix.name(),
                constraint.metric,
                constraint.element
            );
            outcome.skipped += 1;
            continue;
        };
        let Some(leaf) = matrix.element(id).as_leaf() else {
            return Err(Error::NotALeaf(constraint.element.clone()));
        };
        let taken = leaf.constraints().iter().any(|c| c.metric == constraint.metric)
            || elements
                .iter()
                .any(|(other, c)| *other == id && c.metric == constraint.metric);
        if taken {
            return Err(Error::DuplicateElementConstraint {
                element: constraint.element.clone(),
                metric: constraint.metric.clone(),
            });
        }
        elements.push((
            id,
            ElementConstraint::new(constraint.metric.clone(), constraint.threshold),
        ));
    }

    for constraint in dependencies {
        matrix.add_dependency_constraint(constraint.source, constraint.destination)?;
        outcome.applied += 1;
    }
    for (id, constraint) in elements {
        matrix.add_element_constraint(id, constraint)?;
        outcome.applied += 1;
    }
    Ok(outcome)
}
