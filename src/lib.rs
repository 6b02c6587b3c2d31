//! archmap: a design structure matrix engine.
//!
//! Raw facts about a codebase (static dependencies, co-change counts, size
//! and complexity metrics) are loaded into a [`Matrix`]. On top of it the
//! crate rolls dependencies up to any level of a hierarchy, checks
//! architectural rules, aligns several snapshots into per-element time
//! series and flags statistical hotspots and decomposition refactors.

pub mod aggregation;
pub mod config;
pub mod constraints;
pub mod errors;
pub mod grouping;
pub mod hotspots;
pub mod identity;
pub mod model;
pub mod projection;
pub mod stats;
pub mod trends;

pub use crate::aggregation::{aggregate_dependencies, nearest_target_ancestor, TargetSet};
pub use crate::config::{load_config, ArchmapConfig};
pub use crate::constraints::{
    dependency_violations, element_violations, export_constraints, import_constraints,
    ConstraintImport, DependencyViolation, ElementViolation, MatrixConstraintsDto,
};
pub use crate::errors::{Error, Result};
pub use crate::grouping::{group_by_config, group_by_namespace};
pub use crate::hotspots::{
    find_hotspots, find_refactoring_candidates, Hotspot, HotspotReport, HotspotSettings,
    RefactoringCandidate, RefactoringSettings,
};
pub use crate::identity::{ElementStatus, RenameTable};
pub use crate::model::{
    AggregateDependencyEdge, DependencyConstraint, DependencyEdge, Edge, Element,
    ElementConstraint, ElementId, Matrix, MatrixInput, Metric, MetricKind, MetricRecord,
};
pub use crate::projection::{derive_metrics, MatrixProjection};
pub use crate::trends::diff::{create_delta_matrix, ArchitecturalDiff, ChangeStatus, DiffDirection};
pub use crate::trends::{SnapshotStatus, Trend, TrendThresholds, TrendsAnalysis};
