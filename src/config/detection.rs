use serde::{Deserialize, Serialize};

/// Outlier detection across snapshot transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotConfig {
    /// Transitions at which an element must be an outlier
    #[serde(default = "default_min_snapshots")]
    pub min_snapshots: usize,

    /// Standard deviations above the mean delta
    #[serde(default = "default_min_deviations")]
    pub min_deviations: f64,

    #[serde(default = "default_exclude_tests")]
    pub exclude_tests: bool,

    /// Regex matched against element names when `exclude_tests` is set
    #[serde(default = "default_test_pattern")]
    pub test_pattern: String,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            min_snapshots: default_min_snapshots(),
            min_deviations: default_min_deviations(),
            exclude_tests: default_exclude_tests(),
            test_pattern: default_test_pattern(),
        }
    }
}

impl HotspotConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_deviations.is_finite() {
            return Err("min_deviations must be a finite number".to_string());
        }
        if self.exclude_tests {
            regex::Regex::new(&self.test_pattern)
                .map_err(|e| format!("invalid test_pattern: {}", e))?;
        }
        Ok(())
    }
}

fn default_min_snapshots() -> usize {
    3
}
fn default_min_deviations() -> f64 {
    2.0
}
fn default_exclude_tests() -> bool {
    true
}
fn default_test_pattern() -> String {
    r"(^|[/.])(tests?|spec)([/.]|$)|_test\.|Test\.".to_string()
}

/// Size-reduction events treated as decomposition refactors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactoringConfig {
    /// Fraction of size lost between two snapshots, in (0, 1]
    #[serde(default = "default_size_reduction")]
    pub size_reduction: f64,

    #[serde(default = "default_size_metric")]
    pub size_metric: String,
}

impl Default for RefactoringConfig {
    fn default() -> Self {
        Self {
            size_reduction: default_size_reduction(),
            size_metric: default_size_metric(),
        }
    }
}

impl RefactoringConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.size_reduction > 0.0 && self.size_reduction <= 1.0) {
            return Err(format!(
                "size_reduction must be in (0, 1], got {}",
                self.size_reduction
            ));
        }
        Ok(())
    }
}

fn default_size_reduction() -> f64 {
    0.3
}
fn default_size_metric() -> String {
    "DES_Size".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.separator.is_empty() {
            return Err("grouping separator cannot be empty".to_string());
        }
        Ok(())
    }
}

fn default_separator() -> String {
    "/".to_string()
}
