use serde::{Deserialize, Serialize};

use super::element::ElementId;

/// A dependency from `source` to `destination` that must not exist.
///
/// Either end may be a group, in which case the rule covers every element
/// beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyConstraint {
    pub source: ElementId,
    pub destination: ElementId,
}

/// Upper bound on a leaf's metric value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConstraint {
    pub metric: String,
    pub threshold: i64,
}

impl ElementConstraint {
    pub fn new(metric: impl Into<String>, threshold: i64) -> Self {
        Self {
            metric: metric.into(),
            threshold,
        }
    }

    /// Strictly greater values violate the constraint
    pub fn is_violated_by(&self, value: i64) -> bool {
        value > self.threshold
    }
}
