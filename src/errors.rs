//! Shared error types for the engine

use thiserror::Error;

/// Main error type for archmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// An edge was attached to an element other than its declared source
    #[error("edge declared from {edge_source} cannot be attached to {element}")]
    EdgeSourceMismatch { element: String, edge_source: String },

    /// A leaf-only operation was applied to a group
    #[error("element {0} is a group")]
    NotALeaf(String),

    /// A group-only operation was applied to a leaf
    #[error("element {0} is not a group")]
    NotAGroup(String),

    /// Snapshot index outside the analysis
    #[error("snapshot index {index} out of range for {len} snapshots")]
    SnapshotOutOfRange { index: usize, len: usize },

    /// Delta requested with the snapshot indices reversed
    #[error("delta requires newer >= older (newer={newer}, older={older})")]
    DeltaOrder { newer: usize, older: usize },

    /// Derived metrics are computed, never assigned
    #[error("metric {0} is derived and cannot be assigned")]
    DerivedMetric(String),

    /// The same dependency type was registered twice on one edge
    #[error("dependency type {kind} already registered on {edge}")]
    DuplicateDependencyType { kind: String, edge: String },

    /// An element already carries a constraint for this metric
    #[error("element {element} already has a constraint on {metric}")]
    DuplicateElementConstraint { element: String, metric: String },

    /// The same dependency constraint was registered twice
    #[error("dependency constraint {from} -> {to} already registered")]
    DuplicateDependencyConstraint { from: String, to: String },

    /// Two leaves with the same full name
    #[error("element {0} already exists")]
    DuplicateElement(String),

    /// Two edges between the same pair of elements
    #[error("edge {from} -> {to} already exists")]
    DuplicateEdge { from: String, to: String },

    /// Construction input referenced an element index that does not exist
    #[error("element index {index} out of range for {len} elements")]
    ElementIndex { index: usize, len: usize },

    /// Hierarchy errors (reparenting, adding leaves after grouping)
    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub fn duplicate_edge(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::DuplicateEdge {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
