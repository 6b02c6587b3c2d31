use serde::{Deserialize, Serialize};

/// Slope boundaries for trend classification.
///
/// A slope at or below `high_improving` is high improving, at or below
/// `improving` improving, at or below `stable` stable, at or below
/// `degrading` degrading, and anything above is high degrading. The defaults
/// are calibrated for size and complexity metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    #[serde(default = "default_high_improving")]
    pub high_improving: f64,

    #[serde(default = "default_improving")]
    pub improving: f64,

    #[serde(default = "default_stable")]
    pub stable: f64,

    #[serde(default = "default_degrading")]
    pub degrading: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            high_improving: default_high_improving(),
            improving: default_improving(),
            stable: default_stable(),
            degrading: default_degrading(),
        }
    }
}

impl TrendThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let ordered = self.high_improving < self.improving
            && self.improving < self.stable
            && self.stable < self.degrading;
        if !ordered {
            return Err(format!(
                "trend thresholds must be strictly increasing, got {} / {} / {} / {}",
                self.high_improving, self.improving, self.stable, self.degrading
            ));
        }
        Ok(())
    }
}

fn default_high_improving() -> f64 {
    -30.0
}
fn default_improving() -> f64 {
    -10.0
}
fn default_stable() -> f64 {
    10.0
}
fn default_degrading() -> f64 {
    30.0
}
