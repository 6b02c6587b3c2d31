//! Pairwise comparison of two snapshots.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::errors::Result;
use crate::identity::{ElementStatus, RenameTable};
use crate::model::{ElementId, Matrix, Metric};

/// Whether the other matrix is older or newer than the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffDirection {
    Older,
    Newer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Deleted,
    Renamed,
    ChangedIncrease,
    ChangedDecrease,
    Unchanged,
}

/// One metric compared across the two matrices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricChange {
    pub current: Option<i64>,
    pub other: Option<i64>,
    /// Newer value minus older value
    pub change: i64,
    pub status: ChangeStatus,
}

/// Comparison record of one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub element: String,
    pub direction: DiffDirection,
    pub counterpart: Option<String>,
    pub identity: ElementStatus,
    pub metrics: BTreeMap<String, MetricChange>,
}

impl Delta {
    pub fn change(&self, metric: &Metric) -> Option<&MetricChange> {
        self.metrics.get(metric.name())
    }
}

/// Lazily computed deltas between `current` and `other`, cached by name
pub struct ArchitecturalDiff<'a> {
    current: &'a Matrix,
    other: &'a Matrix,
    direction: DiffDirection,
    renames: &'a RenameTable,
    metrics: Vec<Metric>,
    cache: RefCell<HashMap<String, Rc<Delta>>>,
}

impl<'a> ArchitecturalDiff<'a> {
    pub fn new(
        current: &'a Matrix,
        other: &'a Matrix,
        direction: DiffDirection,
        renames: &'a RenameTable,
        metrics: Vec<Metric>,
    ) -> Self {
        Self {
            current,
            other,
            direction,
            renames,
            metrics,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn direction(&self) -> DiffDirection {
        self.direction
    }

    /// Delta of a current element; `None` if it is not in the current matrix
    pub fn delta(&self, name: &str) -> Option<Rc<Delta>> {
        if let Some(cached) = self.cache.borrow().get(name) {
            return Some(Rc::clone(cached));
        }
        let id = self.current.get_by_full_name(name)?;
        let delta = Rc::new(self.compute(name, id));
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&delta));
        Some(delta)
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn compute(&self, name: &str, id: ElementId) -> Delta {
        let (identity, counterpart) = self.renames.resolve_with_status(self.other, name);
        let metrics = self
            .metrics
            .iter()
            .map(|metric| {
                let current = self.current.metric_value(id, metric);
                let other = counterpart.and_then(|c| self.other.metric_value(c, metric));
                (metric.name().to_string(), self.metric_change(identity, current, other))
            })
            .collect();
        Delta {
            element: name.to_string(),
            direction: self.direction,
            counterpart: counterpart.map(|c| self.other.full_name(c).to_string()),
            identity,
            metrics,
        }
    }

    fn metric_change(
        &self,
        identity: ElementStatus,
        current: Option<i64>,
        other: Option<i64>,
    ) -> MetricChange {
        let (newer, older) = match self.direction {
            DiffDirection::Older => (current, other),
            DiffDirection::Newer => (other, current),
        };
        let change = newer.unwrap_or(0) - older.unwrap_or(0);
        let status = match (identity, self.direction) {
            (ElementStatus::NotPresent, DiffDirection::Older) => ChangeStatus::Added,
            (ElementStatus::NotPresent, DiffDirection::Newer) => ChangeStatus::Deleted,
            _ if change > 0 => ChangeStatus::ChangedIncrease,
            _ if change < 0 => ChangeStatus::ChangedDecrease,
            (ElementStatus::Renamed, _) => ChangeStatus::Renamed,
            _ => ChangeStatus::Unchanged,
        };
        MetricChange {
            current,
            other,
            change,
            status,
        }
    }
}

/// A matrix named `delta_<current>` whose leaves carry metric differences.
///
/// Leaves and edges are copied from `current`. Each metric value is the
/// current value minus the previous one; elements absent from `previous`
/// keep their full current value. Bounds are refreshed for every metric.
pub fn create_delta_matrix(
    current: &Matrix,
    previous: &Matrix,
    metrics: &[Metric],
    renames: &RenameTable,
) -> Result<Matrix> {
    let mut delta = Matrix::new(format!("delta_{}", current.name()));
    let mut ids = HashMap::new();
    for &leaf in current.leaves() {
        ids.insert(leaf, delta.add_leaf(current.full_name(leaf))?);
    }

    for &leaf in current.leaves() {
        let target = ids[&leaf];
        for edge in current.element(leaf).edges() {
            let Some(&destination) = ids.get(&edge.destination()) else {
                continue;
            };
            delta.add_edge(
                target,
                destination,
                edge.dependencies().iter().map(|(k, v)| (k.clone(), *v)),
            )?;
            if edge.co_changes() > 0 {
                delta.record_co_changes(target, destination, edge.co_changes())?;
            }
        }

        let before = renames.resolve(previous, current.full_name(leaf));
        for metric in metrics {
            let Some(now) = current.metric_value(leaf, metric) else {
                continue;
            };
            let then = before
                .and_then(|id| previous.metric_value(id, metric))
                .unwrap_or(0);
            if metric.is_derived() {
                delta.set_derived_metric(target, metric, now - then);
            } else {
                delta.add_metric(target, metric, now - then)?;
            }
        }
    }

    for metric in metrics {
        delta.update_bounds(metric);
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatrixInput;
    use pretty_assertions::assert_eq;

    fn snapshot(name: &str, sizes: &[(&str, i64)]) -> Matrix {
        let mut m = Matrix::from_input(MatrixInput {
            name: name.into(),
            elements: sizes.iter().map(|(n, _)| n.to_string()).collect(),
            edges: Vec::new(),
        })
        .unwrap();
        for (i, (_, size)) in sizes.iter().enumerate() {
            m.add_metric(ElementId(i), &Metric::SIZE, *size).unwrap();
        }
        m
    }

    #[test]
    fn statuses_against_an_older_snapshot() {
        let old = snapshot("v1", &[("a", 10), ("b", 10), ("r1", 5)]);
        let new = snapshot("v2", &[("a", 12), ("b", 7), ("r2", 5), ("n", 1)]);
        let renames = RenameTable::from_alias_groups(["r1,r2"]);
        let diff = ArchitecturalDiff::new(
            &new,
            &old,
            DiffDirection::Older,
            &renames,
            vec![Metric::SIZE],
        );

        let status = |name: &str| diff.delta(name).unwrap().change(&Metric::SIZE).unwrap().status;
        assert_eq!(status("a"), ChangeStatus::ChangedIncrease);
        assert_eq!(status("b"), ChangeStatus::ChangedDecrease);
        assert_eq!(status("r2"), ChangeStatus::Renamed);
        assert_eq!(status("n"), ChangeStatus::Added);
        assert!(diff.delta("missing").is_none());
        assert_eq!(diff.cached(), 4);

        let again = diff.delta("a").unwrap();
        assert_eq!(again.change(&Metric::SIZE).unwrap().change, 2);
        assert_eq!(diff.cached(), 4);
    }

    #[test]
    fn newer_direction_reports_deletions() {
        let old = snapshot("v1", &[("a", 10), ("gone", 4)]);
        let new = snapshot("v2", &[("a", 6)]);
        let renames = RenameTable::new();
        let diff = ArchitecturalDiff::new(
            &old,
            &new,
            DiffDirection::Newer,
            &renames,
            vec![Metric::SIZE],
        );
        let a = diff.delta("a").unwrap();
        assert_eq!(a.change(&Metric::SIZE).unwrap().change, -4);
        let gone = diff.delta("gone").unwrap();
        assert_eq!(gone.change(&Metric::SIZE).unwrap().status, ChangeStatus::Deleted);
        assert_eq!(gone.counterpart, None);
    }

    #[test]
    fn delta_matrix_holds_differences() {
        let mut old = snapshot("v1", &[("a", 10)]);
        old.add_metric(ElementId(0), &Metric::COMPLEXITY, 3).unwrap();
        let mut new = snapshot("v2", &[("a", 4), ("b", 9)]);
        new.add_edge(ElementId(1), ElementId(0), [("Call".to_string(), 1)])
            .unwrap();
        let renames = RenameTable::new();

        let delta =
            create_delta_matrix(&new, &old, &[Metric::SIZE, Metric::COMPLEXITY], &renames)
                .unwrap();
        assert_eq!(delta.name(), "delta_v2");
        let a = delta.get_by_full_name("a").unwrap();
        let b = delta.get_by_full_name("b").unwrap();
        assert_eq!(delta.metric_value(a, &Metric::SIZE), Some(-6));
        assert_eq!(delta.metric_value(b, &Metric::SIZE), Some(9));
        assert_eq!(delta.metric_value(a, &Metric::COMPLEXITY), None);
        assert_eq!(delta.element(b).edges().len(), 1);
        assert_eq!(delta.bounds(&Metric::SIZE).unwrap().min, -6);
    }
}
