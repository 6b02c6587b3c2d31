//! Decomposition refactor detection.
//!
//! A leaf that loses a large share of its size between two snapshots, while
//! gaining neighbors that did not exist before, has most likely had code
//! extracted into those neighbors.

use serde::{Deserialize, Serialize};

use crate::config::RefactoringConfig;
use crate::model::Metric;
use crate::projection::MatrixProjection;
use crate::trends::TrendsAnalysis;

#[derive(Debug, Clone, PartialEq)]
pub struct RefactoringSettings {
    pub size_metric: Metric,
    /// Minimum fraction of size lost, e.g. `0.3` for 30%
    pub size_reduction: f64,
}

impl RefactoringSettings {
    pub fn from_config(config: &RefactoringConfig) -> Self {
        Self {
            size_metric: Metric::from_name(&config.size_metric),
            size_reduction: config.size_reduction,
        }
    }
}

impl Default for RefactoringSettings {
    fn default() -> Self {
        Self::from_config(&RefactoringConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactoringCandidate {
    /// Name in the snapshot where the reduction was observed
    pub element: String,
    /// Index of the newer snapshot of the transition
    pub snapshot: usize,
    pub previous_size: i64,
    pub current_size: i64,
    pub reduction: f64,
    /// Dependents and dependees that did not exist in the previous snapshot
    pub extracted: Vec<String>,
}

/// Size reductions at every transition, with their likely extraction targets
pub fn find_refactoring_candidates(
    trends: &TrendsAnalysis<'_>,
    settings: &RefactoringSettings,
) -> Vec<RefactoringCandidate> {
    let renames = trends.renames();
    let mut candidates = Vec::new();

    for index in 1..trends.len() {
        let (Some(before), Some(after)) = (trends.snapshot(index - 1), trends.snapshot(index))
        else {
            continue;
        };
        for &leaf in after.leaves() {
            let name = after.full_name(leaf);
            let Some(previous) = renames.resolve(before, name) else {
                continue;
            };
            let previous_size = before
                .metric_value(previous, &settings.size_metric)
                .unwrap_or(0);
            let current_size = after
                .metric_value(leaf, &settings.size_metric)
                .unwrap_or(0);
            if previous_size <= 0 || current_size >= previous_size {
                continue;
            }
            let reduction = 1.0 - current_size as f64 / previous_size as f64;
            if reduction < settings.size_reduction {
                continue;
            }

            let neighborhood = MatrixProjection::centered_on(after, leaf);
            let extracted = neighborhood
                .elements()
                .iter()
                .filter(|id| **id != leaf)
                .map(|id| after.full_name(*id))
                .filter(|neighbor| renames.resolve(before, neighbor).is_none())
                .map(str::to_string)
                .collect();

            candidates.push(RefactoringCandidate {
                element: name.to_string(),
                snapshot: index,
                previous_size,
                current_size,
                reduction,
                extracted,
            });
        }
    }
    candidates
}
