//! Statistical hotspot detection over a trend analysis.
//!
//! At every transition `i` (snapshot `i - 1` to `i`) the deltas of elements
//! present in both snapshots form the baseline. Elements whose delta lies at
//! least `min_deviations` sample standard deviations above the mean are
//! candidates at that transition. Elements that are candidates at
//! `min_snapshots` or more transitions are hotspots; their index is the sum
//! of `i * deviations` over those transitions.

pub mod refactoring;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::HotspotConfig;
use crate::errors::Result;
use crate::model::{ElementId, HotspotData, Matrix, Metric};
use crate::stats::{mean, sample_std_dev};
use crate::trends::TrendsAnalysis;

pub use refactoring::{find_refactoring_candidates, RefactoringCandidate, RefactoringSettings};

/// Compiled detection settings
#[derive(Debug, Clone)]
pub struct HotspotSettings {
    pub min_snapshots: usize,
    pub min_deviations: f64,
    /// Names matching this pattern are never reported
    pub exclude: Option<Regex>,
}

impl HotspotSettings {
    pub fn new(min_snapshots: usize, min_deviations: f64) -> Self {
        Self {
            min_snapshots,
            min_deviations,
            exclude: None,
        }
    }

    pub fn from_config(config: &HotspotConfig) -> Result<Self> {
        let exclude = if config.exclude_tests {
            Some(Regex::new(&config.test_pattern)?)
        } else {
            None
        };
        Ok(Self {
            min_snapshots: config.min_snapshots,
            min_deviations: config.min_deviations,
            exclude,
        })
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.as_ref().is_some_and(|pattern| pattern.is_match(name))
    }
}

impl Default for HotspotSettings {
    fn default() -> Self {
        let config = HotspotConfig::default();
        Self::new(config.min_snapshots, config.min_deviations)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Name in the most recent snapshot
    pub element: String,
    pub times: usize,
    pub index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotReport {
    pub metrics: Vec<String>,
    /// Ordered by descending index
    pub hotspots: Vec<Hotspot>,
}

impl HotspotReport {
    pub fn contains(&self, element: &str) -> bool {
        self.hotspots.iter().any(|h| h.element == element)
    }

    /// Reset every leaf's hotspot flag, then flag the reported elements
    pub fn mark(&self, matrix: &mut Matrix) {
        for leaf in matrix.leaves().to_vec() {
            if let Some(leaf) = matrix.element_mut(leaf).as_leaf_mut() {
                leaf.set_hotspot(None);
            }
        }
        for hotspot in &self.hotspots {
            let Some(id) = matrix.get_by_full_name(&hotspot.element) else {
                log::debug!("hotspot {} not found in {}", hotspot.element, matrix.name());
                continue;
            };
            if let Some(leaf) = matrix.element_mut(id).as_leaf_mut() {
                leaf.set_hotspot(Some(HotspotData {
                    times: hotspot.times,
                    index: hotspot.index,
                }));
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Candidate at one transition: row of the trend analysis and deviations
pub(crate) type Candidate = (usize, f64);

/// Outliers of `metric` between snapshot `index - 1` and `index`.
///
/// The baseline covers every leaf of snapshot `index` that resolves in
/// snapshot `index - 1`; only those with a row in the analysis can be
/// returned.
pub(crate) fn transition_candidates(
    trends: &TrendsAnalysis<'_>,
    metric: &Metric,
    index: usize,
    settings: &HotspotSettings,
) -> Vec<Candidate> {
    let (Some(before), Some(after)) = (trends.snapshot(index - 1), trends.snapshot(index)) else {
        return Vec::new();
    };
    let rows: HashMap<ElementId, usize> = (0..trends.element_names().len())
        .filter_map(|row| trends.row_entries(row)[index].map(|id| (id, row)))
        .collect();

    let deltas: Vec<(ElementId, f64)> = after
        .leaves()
        .iter()
        .filter_map(|&leaf| {
            let previous = trends.renames().resolve(before, after.full_name(leaf))?;
            let now = after.metric_value(leaf, metric).unwrap_or(0);
            let then = before.metric_value(previous, metric).unwrap_or(0);
            Some((leaf, (now - then) as f64))
        })
        .collect();

    let values: Vec<f64> = deltas.iter().map(|(_, delta)| *delta).collect();
    let (Some(mean), Some(sd)) = (mean(&values), sample_std_dev(&values)) else {
        return Vec::new();
    };
    if sd == 0.0 {
        return Vec::new();
    }

    deltas
        .into_iter()
        .filter_map(|(leaf, delta)| {
            let deviations = (delta - mean) / sd;
            if deviations < settings.min_deviations {
                return None;
            }
            let row = *rows.get(&leaf)?;
            (!settings.is_excluded(&trends.element_names()[row])).then_some((row, deviations))
        })
        .collect()
}

/// Accumulated (times, index) per row for one metric
fn metric_hotspots(
    trends: &TrendsAnalysis<'_>,
    metric: &Metric,
    settings: &HotspotSettings,
) -> HashMap<usize, (usize, f64)> {
    let mut accumulated: HashMap<usize, (usize, f64)> = HashMap::new();
    for index in 1..trends.len() {
        for (row, deviations) in transition_candidates(trends, metric, index, settings) {
            let entry = accumulated.entry(row).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += index as f64 * deviations;
        }
    }
    accumulated.retain(|_, (times, _)| *times >= settings.min_snapshots);
    accumulated
}

/// Hotspots for every metric at once.
///
/// An element must be a hotspot for each metric; its times is the smallest
/// per-metric count and its index the sum of per-metric indices.
pub fn find_hotspots(
    trends: &TrendsAnalysis<'_>,
    metrics: &[Metric],
    settings: &HotspotSettings,
) -> HotspotReport {
    let per_metric: Vec<HashMap<usize, (usize, f64)>> = metrics
        .par_iter()
        .map(|metric| metric_hotspots(trends, metric, settings))
        .collect();

    let mut hotspots: Vec<Hotspot> = match per_metric.split_first() {
        None => Vec::new(),
        Some((first, rest)) => first
            .iter()
            .filter_map(|(&row, &(times, index))| {
                rest.iter().try_fold((times, index), |(times, index), other| {
                    let (t, i) = other.get(&row)?;
                    Some((times.min(*t), index + i))
                })
                .map(|(times, index)| Hotspot {
                    element: trends.element_names()[row].clone(),
                    times,
                    index,
                })
            })
            .collect(),
    };
    hotspots.sort_by(|a, b| {
        b.index
            .total_cmp(&a.index)
            .then_with(|| a.element.cmp(&b.element))
    });

    log::debug!(
        "{} hotspots over {} snapshots for {} metrics",
        hotspots.len(),
        trends.len(),
        metrics.len()
    );
    HotspotReport {
        metrics: metrics.iter().map(|m| m.name().to_string()).collect(),
        hotspots,
    }
}
