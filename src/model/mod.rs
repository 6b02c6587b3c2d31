//! Element model: the nodes, edges and metrics of a design structure matrix.

pub mod constraint;
pub mod dependency;
pub mod element;
pub mod input;
pub mod matrix;
pub mod metric;

pub use constraint::{DependencyConstraint, ElementConstraint};
pub use dependency::{AggregateDependencyEdge, DependencyEdge, Edge};
pub use element::{Element, ElementId, ElementKind, ElementMethod, Group, HotspotData, Leaf};
pub use input::{EdgeInput, IngestReport, MatrixInput, MetricRecord};
pub use matrix::Matrix;
pub use metric::{DependencyMetric, Metric, MetricBounds, MetricKind};
