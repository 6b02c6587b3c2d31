//! Metric identities and bounds.
//!
//! A metric is either *stored* (ingested per leaf, summed for groups) or
//! *derived* (recomputed from the dependency structure by
//! [`crate::projection::derive_metrics`]). The kind travels with the metric so
//! the two can never be confused at an assignment site.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Whether a metric is ingested or computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Stored,
    Derived,
}

static WELL_KNOWN: [Metric; 10] = [
    Metric::SIZE,
    Metric::COMPLEXITY,
    Metric::REVISIONS,
    Metric::CHURN,
    Metric::BUG_COMMITS,
    Metric::BUG_CHURN,
    Metric::DEPENDENT_PARTNERS,
    Metric::DEPENDS_ON_PARTNERS,
    Metric::TOTAL_DEPENDENCIES,
    Metric::CO_CHANGE_PARTNERS,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Metric {
    name: Cow<'static, str>,
    kind: MetricKind,
}

impl Metric {
    pub const SIZE: Metric = Metric::stored_static("DES_Size");
    pub const COMPLEXITY: Metric = Metric::stored_static("DES_Complexity");
    pub const REVISIONS: Metric = Metric::stored_static("ARCH_Revisions");
    pub const CHURN: Metric = Metric::stored_static("ARCH_Churn");
    pub const BUG_COMMITS: Metric = Metric::stored_static("ARCH_Bug Commits");
    pub const BUG_CHURN: Metric = Metric::stored_static("ARCH_Bug Churn");

    /// Number of visible elements depending on this one
    pub const DEPENDENT_PARTNERS: Metric = Metric::derived_static("ARCH_Dependent Partners");
    /// Number of visible elements this one depends on
    pub const DEPENDS_ON_PARTNERS: Metric = Metric::derived_static("ARCH_Depends on Partners");
    /// Incoming plus outgoing dependency occurrences
    pub const TOTAL_DEPENDENCIES: Metric = Metric::derived_static("ARCH_Total Dependencies");
    pub const CO_CHANGE_PARTNERS: Metric = Metric::derived_static("ARCH_CoChange Partners");

    const fn stored_static(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind: MetricKind::Stored,
        }
    }

    const fn derived_static(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind: MetricKind::Derived,
        }
    }

    /// A custom stored metric
    pub fn stored(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind: MetricKind::Stored,
        }
    }

    /// The derived metrics materialized by `derive_metrics`
    pub fn derived() -> &'static [Metric] {
        &WELL_KNOWN[6..]
    }

    pub fn well_known(name: &str) -> Option<Metric> {
        WELL_KNOWN.iter().find(|m| m.name() == name).cloned()
    }

    /// Resolve a metric name, treating unknown names as stored metrics
    pub fn from_name(name: &str) -> Metric {
        Self::well_known(name).unwrap_or_else(|| Self::stored(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn is_derived(&self) -> bool {
        self.kind == MetricKind::Derived
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Running extremes of a metric across a matrix's leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricBounds {
    pub max: i64,
    pub min: i64,
}

impl MetricBounds {
    pub fn from_values(values: impl IntoIterator<Item = i64>) -> Option<Self> {
        values.into_iter().fold(None, |bounds, value| match bounds {
            None => Some(Self {
                max: value,
                min: value,
            }),
            Some(b) => Some(Self {
                max: b.max.max(value),
                min: b.min.min(value),
            }),
        })
    }
}

/// Cell-level quantities tracked as matrix-wide maxima
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyMetric {
    CoChanges,
    Dependencies,
}
