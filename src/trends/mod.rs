//! Trend analysis over an ordered sequence of matrix snapshots.
//!
//! Snapshots are indexed oldest first: `snapshot(0)` is the oldest and
//! `snapshot(len() - 1)` the most recent. Rows are exactly the leaves of the
//! most recent snapshot; older snapshots only fill in values for those rows,
//! resolved through the run's [`RenameTable`]. An element deleted before the
//! most recent snapshot has no row.
//!
//! A row entry is *absent* when the element did not exist in that snapshot,
//! which is distinct from a zero value.

pub mod diff;
pub mod report;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use crate::config::TrendThresholds;
use crate::errors::{Error, Result};
use crate::identity::{ElementStatus, RenameTable};
use crate::model::{ElementId, Matrix, Metric};
use crate::stats::regression_slope;

/// Direction of a metric over time, from the regression slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    HighImproving,
    Improving,
    Stable,
    Degrading,
    HighDegrading,
    Unknown,
}

impl Trend {
    pub fn classify(slope: f64, thresholds: &TrendThresholds) -> Trend {
        if slope.is_nan() {
            Trend::Unknown
        } else if slope <= thresholds.high_improving {
            Trend::HighImproving
        } else if slope <= thresholds.improving {
            Trend::Improving
        } else if slope <= thresholds.stable {
            Trend::Stable
        } else if slope <= thresholds.degrading {
            Trend::Degrading
        } else {
            Trend::HighDegrading
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::HighImproving => "high improving",
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Degrading => "degrading",
            Trend::HighDegrading => "high degrading",
            Trend::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of an element at one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    New,
    Deleted,
    Renamed,
    Present,
}

/// Sums of negative and positive deltas at one transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTotals {
    /// Sum of the negative deltas, so never above zero
    pub decreases: i64,
    pub increases: i64,
}

pub struct TrendsAnalysis<'a> {
    snapshots: Vec<&'a Matrix>,
    renames: &'a RenameTable,
    names: Vec<String>,
    rows: Vec<Vec<Option<ElementId>>>,
    index: HashMap<String, usize>,
    thresholds: TrendThresholds,
}

impl<'a> TrendsAnalysis<'a> {
    /// Align `snapshots`, given oldest first
    pub fn new(snapshots: Vec<&'a Matrix>, renames: &'a RenameTable) -> Self {
        let n = snapshots.len();
        let mut names = Vec::new();
        let mut rows = Vec::new();
        let mut index = HashMap::new();

        if let Some(latest) = snapshots.last() {
            for &leaf in latest.leaves() {
                let name = latest.full_name(leaf).to_string();
                let mut row = vec![None; n];
                row[n - 1] = Some(leaf);

                // Walk backwards, following the name the element carried in
                // the newer snapshot
                let mut known = name.clone();
                for column in (0..n - 1).rev() {
                    let snapshot = snapshots[column];
                    let found = renames
                        .resolve(snapshot, &known)
                        .filter(|id| snapshot.element(*id).is_leaf());
                    if let Some(id) = found {
                        known = snapshot.full_name(id).to_string();
                    }
                    row[column] = found;
                }

                index.insert(name.clone(), rows.len());
                names.push(name);
                rows.push(row);
            }
        }

        Self {
            snapshots,
            renames,
            names,
            rows,
            index,
            thresholds: TrendThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: TrendThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &TrendThresholds {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// `snapshot(0)` is the oldest
    pub fn snapshot(&self, index: usize) -> Option<&'a Matrix> {
        self.snapshots.get(index).copied()
    }

    pub fn renames(&self) -> &'a RenameTable {
        self.renames
    }

    pub fn snapshot_names(&self) -> Vec<&str> {
        self.snapshots.iter().map(|s| s.name()).collect()
    }

    /// Row names: the most recent snapshot's leaves
    pub fn element_names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn row_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn row_entries(&self, row: usize) -> &[Option<ElementId>] {
        &self.rows[row]
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.snapshots.len() {
            return Err(Error::SnapshotOutOfRange {
                index,
                len: self.snapshots.len(),
            });
        }
        Ok(())
    }

    /// The row's element as it existed in snapshot `index`
    pub fn element_at(&self, name: &str, index: usize) -> Option<ElementId> {
        let row = self.row_of(name)?;
        self.rows[row].get(index).copied().flatten()
    }

    pub fn value(&self, name: &str, metric: &Metric, index: usize) -> Option<i64> {
        let id = self.element_at(name, index)?;
        self.snapshots[index].metric_value(id, metric)
    }

    /// One entry per snapshot; `None` for an unknown row
    pub fn values_across_snapshots(&self, name: &str, metric: &Metric) -> Option<Vec<Option<i64>>> {
        self.row_of(name)?;
        Some(
            (0..self.snapshots.len())
                .map(|index| self.value(name, metric, index))
                .collect(),
        )
    }

    /// Value of a present element, with a missing metric read as zero
    fn presence_value(&self, row: usize, metric: &Metric, index: usize) -> Option<i64> {
        self.rows[row][index]
            .map(|id| self.snapshots[index].metric_value(id, metric).unwrap_or(0))
    }

    pub(crate) fn row_delta(
        &self,
        row: usize,
        metric: &Metric,
        newer: usize,
        older: usize,
    ) -> Option<i64> {
        let newer_value = self.presence_value(row, metric, newer);
        // the oldest snapshot has nothing before it, so its values count as new
        if newer == 0 {
            return newer_value;
        }
        if newer == older {
            return newer_value.map(|_| 0);
        }
        match (newer_value, self.presence_value(row, metric, older)) {
            (None, None) => None,
            (Some(value), None) => Some(value),
            (None, Some(value)) => Some(-value),
            (Some(newer_value), Some(older_value)) => Some(newer_value - older_value),
        }
    }

    /// Change of `metric` from snapshot `older` to snapshot `newer`.
    ///
    /// Present only in the newer snapshot counts as entirely new, present
    /// only in the older as entirely removed, absent in both is `None`.
    /// `delta(_, _, 0, 0)` is the raw value of the oldest snapshot; equal
    /// later indices give zero.
    pub fn delta(
        &self,
        name: &str,
        metric: &Metric,
        newer: usize,
        older: usize,
    ) -> Result<Option<i64>> {
        self.check_index(newer)?;
        self.check_index(older)?;
        if newer < older {
            return Err(Error::DeltaOrder { newer, older });
        }
        Ok(self
            .row_of(name)
            .and_then(|row| self.row_delta(row, metric, newer, older)))
    }

    /// Smallest and largest transition delta over all rows
    pub fn delta_min_max(&self, metric: &Metric) -> Option<(i64, i64)> {
        (0..self.rows.len())
            .flat_map(|row| {
                (1..self.snapshots.len())
                    .filter_map(move |index| self.row_delta(row, metric, index, index - 1))
            })
            .fold(None, |bounds, delta| match bounds {
                None => Some((delta, delta)),
                Some((min, max)) => Some((min.min(delta), max.max(delta))),
            })
    }

    /// Decreases and increases from snapshot `index - 1` to `index`.
    ///
    /// At index 0 every value is new, so the totals hold the raw values.
    pub fn totals_for_snapshot(&self, metric: &Metric, index: usize) -> Result<SnapshotTotals> {
        self.check_index(index)?;
        let older = index.saturating_sub(1);
        Ok((0..self.rows.len())
            .filter_map(|row| self.row_delta(row, metric, index, older))
            .fold(SnapshotTotals::default(), |mut totals, delta| {
                if delta < 0 {
                    totals.decreases += delta;
                } else {
                    totals.increases += delta;
                }
                totals
            }))
    }

    /// Sum of the element's transition deltas
    pub fn total_across_snapshots(&self, name: &str, metric: &Metric) -> Option<i64> {
        let row = self.row_of(name)?;
        (1..self.snapshots.len())
            .filter_map(|index| self.row_delta(row, metric, index, index - 1))
            .fold(None, |total, delta| Some(total.unwrap_or(0) + delta))
    }

    pub fn maximum_value(&self, metric: &Metric) -> Option<i64> {
        self.names
            .iter()
            .flat_map(|name| {
                (0..self.snapshots.len()).filter_map(move |index| self.value(name, metric, index))
            })
            .max()
    }

    /// Regression trend over the span where the element has values
    pub fn trend(&self, name: &str, metric: &Metric) -> Trend {
        let Some(values) = self.values_across_snapshots(name, metric) else {
            return Trend::Unknown;
        };
        let start = values
            .iter()
            .rposition(Option::is_none)
            .map_or(0, |last_absent| last_absent + 1);
        let points: Vec<(f64, f64)> = values[start..]
            .iter()
            .enumerate()
            .filter_map(|(offset, value)| value.map(|v| ((start + offset) as f64, v as f64)))
            .collect();
        match regression_slope(&points) {
            Some(slope) => Trend::classify(slope, &self.thresholds),
            None => Trend::Unknown,
        }
    }

    fn status_in(&self, name: &str, index: usize) -> ElementStatus {
        self.renames.status(self.snapshots[index], name)
    }

    fn leaf_names_where(
        &self,
        index: usize,
        keep: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>> {
        self.check_index(index)?;
        Ok(self.snapshots[index]
            .leaf_names()
            .filter(|name| keep(*name))
            .map(str::to_string)
            .collect())
    }

    /// Leaves of snapshot `index` absent from the snapshot before it
    pub fn new_elements(&self, index: usize) -> Result<Vec<String>> {
        self.leaf_names_where(index, |name| {
            index == 0 || self.status_in(name, index - 1) == ElementStatus::NotPresent
        })
    }

    /// Leaves of snapshot `index` that carry another name in the next one
    pub fn renamed_elements(&self, index: usize) -> Result<Vec<String>> {
        self.leaf_names_where(index, |name| {
            index + 1 < self.snapshots.len()
                && self.status_in(name, index + 1) == ElementStatus::Renamed
        })
    }

    /// Leaves of snapshot `index` that no longer exist in the next one
    pub fn deleted_elements(&self, index: usize) -> Result<Vec<String>> {
        self.leaf_names_where(index, |name| {
            index + 1 < self.snapshots.len()
                && self.status_in(name, index + 1) == ElementStatus::NotPresent
        })
    }

    pub fn present_elements(&self, index: usize) -> Result<Vec<String>> {
        self.leaf_names_where(index, |_| true)
    }

    /// Status of a leaf of snapshot `index`; new wins over deleted, deleted
    /// over renamed
    pub fn classify_element(&self, name: &str, index: usize) -> Result<Option<SnapshotStatus>> {
        self.check_index(index)?;
        let snapshot = self.snapshots[index];
        let is_leaf = snapshot
            .get_by_full_name(name)
            .is_some_and(|id| snapshot.element(id).is_leaf());
        if !is_leaf {
            return Ok(None);
        }
        let has_next = index + 1 < self.snapshots.len();
        let status = if index == 0 || self.status_in(name, index - 1) == ElementStatus::NotPresent
        {
            SnapshotStatus::New
        } else if has_next && self.status_in(name, index + 1) == ElementStatus::NotPresent {
            SnapshotStatus::Deleted
        } else if has_next && self.status_in(name, index + 1) == ElementStatus::Renamed {
            SnapshotStatus::Renamed
        } else {
            SnapshotStatus::Present
        };
        Ok(Some(status))
    }
}
