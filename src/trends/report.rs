//! Tabular views of a trend analysis.
//!
//! These are plain serializable structs; rendering them as CSV, XML or
//! anything else is left to the caller.

use serde::{Deserialize, Serialize};

use super::{Trend, TrendsAnalysis};
use crate::errors::Result;
use crate::model::Metric;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTotals {
    pub metric: String,
    pub decreases: i64,
    pub increases: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub snapshot: String,
    pub new: usize,
    pub renamed: usize,
    pub deleted: usize,
    pub metrics: Vec<MetricTotals>,
}

/// Per-snapshot element churn and metric movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSummaryReport {
    pub snapshots: Vec<SnapshotSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub element: String,
    pub values: Vec<Option<i64>>,
    pub total_delta: Option<i64>,
    pub trend: Trend,
}

/// One metric across all snapshots, one row per current element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTableReport {
    pub metric: String,
    pub snapshots: Vec<String>,
    pub rows: Vec<MetricRow>,
}

impl MetricSummaryReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl MetricTableReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TrendsAnalysis<'_> {
    pub fn summary_report(&self, metrics: &[Metric]) -> Result<MetricSummaryReport> {
        let snapshots = (0..self.len())
            .map(|index| {
                let metrics = metrics
                    .iter()
                    .map(|metric| {
                        let totals = self.totals_for_snapshot(metric, index)?;
                        Ok(MetricTotals {
                            metric: metric.name().to_string(),
                            decreases: totals.decreases,
                            increases: totals.increases,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SnapshotSummary {
                    snapshot: self.snapshot_names()[index].to_string(),
                    new: self.new_elements(index)?.len(),
                    renamed: self.renamed_elements(index)?.len(),
                    deleted: self.deleted_elements(index)?.len(),
                    metrics,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MetricSummaryReport { snapshots })
    }

    pub fn metric_table(&self, metric: &Metric) -> MetricTableReport {
        let rows = self
            .element_names()
            .iter()
            .map(|name| MetricRow {
                element: name.clone(),
                values: self
                    .values_across_snapshots(name, metric)
                    .unwrap_or_default(),
                total_delta: self.total_across_snapshots(name, metric),
                trend: self.trend(name, metric),
            })
            .collect();
        MetricTableReport {
            metric: metric.name().to_string(),
            snapshots: self.snapshot_names().into_iter().map(str::to_string).collect(),
            rows,
        }
    }
}
