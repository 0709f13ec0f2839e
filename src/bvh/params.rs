//! Tunable constants of the tree builder.

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Number of SAH buckets for split evaluation.
pub const DEFAULT_BUCKET_COUNT: usize = 12;

/// Cost of visiting an internal node, relative to one triangle test.
pub const DEFAULT_TRAVERSAL_COST: f32 = 0.125;

/// Largest range split at the median instead of by SAH.
pub const DEFAULT_MEDIAN_SPLIT_MAX: usize = 4;

/// Builder parameters. Defaults give the standard 12-bucket SAH build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildParams {
    pub bucket_count: usize,
    pub traversal_cost: f32,
    pub median_split_max: usize,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            traversal_cost: DEFAULT_TRAVERSAL_COST,
            median_split_max: DEFAULT_MEDIAN_SPLIT_MAX,
        }
    }
}

impl BuildParams {
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count < 2 {
            return Err(Error::invalid_params(format!(
                "bucket_count must be at least 2, got {}",
                self.bucket_count
            )));
        }
        if !self.traversal_cost.is_finite() || self.traversal_cost < 0.0 {
            return Err(Error::invalid_params(format!(
                "traversal_cost must be finite and non-negative, got {}",
                self.traversal_cost
            )));
        }
        if self.median_split_max < 2 {
            return Err(Error::invalid_params(format!(
                "median_split_max must be at least 2, got {}",
                self.median_split_max
            )));
        }
        Ok(())
    }
}
