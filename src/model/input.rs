//! In-memory shapes handed over by loaders.
//!
//! Loaders parse their own formats and apply any name rewriting; the engine
//! only sees these plain records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Leaf names plus index-based edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixInput {
    pub name: String,
    pub elements: Vec<String>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: usize,
    pub destination: usize,
    #[serde(default)]
    pub dependencies: BTreeMap<String, u64>,
}

/// One metric observation for one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub element: String,
    pub metric: String,
    pub value: i64,
}

impl MetricRecord {
    pub fn new(element: impl Into<String>, metric: impl Into<String>, value: i64) -> Self {
        Self {
            element: element.into(),
            metric: metric.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub matched: usize,
    /// Element names that did not resolve in the matrix
    pub unmatched: Vec<String>,
}
