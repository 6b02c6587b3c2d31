//! Analysis configuration, read from `.archmap.toml`.
//!
//! Every section is optional; missing keys take their defaults and invalid
//! sections are replaced by defaults with a warning.

mod detection;
mod loader;
mod thresholds;

pub use detection::{GroupingConfig, HotspotConfig, RefactoringConfig};
pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
pub use thresholds::TrendThresholds;

use serde::{Deserialize, Serialize};

/// Root configuration structure for archmap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchmapConfig {
    /// Regression slope boundaries
    #[serde(default)]
    pub trends: TrendThresholds,

    /// Outlier detection settings
    #[serde(default)]
    pub hotspots: HotspotConfig,

    /// Refactoring-candidate detection settings
    #[serde(default)]
    pub refactoring: RefactoringConfig,

    #[serde(default)]
    pub grouping: GroupingConfig,
}
