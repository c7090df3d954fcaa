//! Pipeline Configuration
//!
//! Tree shape and mining thresholds. Defaults reproduce the reference run;
//! callers override them at construction time, never per request.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, DEFAULT_RANDOM_SEED,
};
use crate::error::{PipelineError, PipelineResult};

/// Pipeline Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum decision tree depth
    pub max_depth: usize,

    /// Seed for the classifier's feature ordering
    pub random_seed: u64,

    /// Minimum itemset support (0.0 exclusive - 1.0)
    pub min_support: f64,

    /// Minimum rule confidence (0.0 - 1.0)
    pub min_confidence: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            random_seed: DEFAULT_RANDOM_SEED,
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl PipelineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn with_thresholds(mut self, min_support: f64, min_confidence: f64) -> Self {
        self.min_support = min_support.clamp(0.0, 1.0);
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Reject settings a run cannot use.
    ///
    /// Support must be strictly positive: a zero-support itemset would make
    /// every confidence ratio 0/0.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.max_depth == 0 {
            return Err(invalid("max_depth must be at least 1".to_string()));
        }
        if !self.min_support.is_finite() || self.min_support <= 0.0 || self.min_support > 1.0 {
            return Err(invalid(format!(
                "min_support must be in (0, 1], got {}",
                self.min_support
            )));
        }
        if !self.min_confidence.is_finite() || !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> PipelineError {
    PipelineError::InvalidConfig(msg)
}
