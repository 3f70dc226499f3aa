//! Parameter metadata for formation detectors
//!
//! This module provides metadata about detector parameters, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Automatic configuration UI generation
//!
//! Every tunable in this detector set is a lookback window, so parameters
//! are period-valued (positive bar counts).
//!
//! # Example
//!
//! ```rust
//! use formscan::params::{ParamMeta, ParameterizedDetector};
//! use formscan::prelude::*;
//!
//! // Get parameter metadata for a detector
//! let params = ThreeBlackCrowsDetector::param_meta();
//! for param in params {
//!     println!("{}: default {} ({})", param.name, param.default, param.description);
//! }
//! ```

use std::collections::HashMap;

use crate::{PatternError, Period, Result};

// ============================================================
// PARAMETER METADATA
// ============================================================

/// Metadata for a single period-valued detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "top_period")
  pub name: &'static str,
  /// Default value in bars
  pub default: usize,
  /// Range for optimization: (min, max, step); step must be > 0
  pub range: (usize, usize, usize),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a period parameter
  pub const fn period(
    name: &'static str,
    default: usize,
    range: (usize, usize, usize),
    description: &'static str,
  ) -> Self {
    Self { name, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<usize> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: usize) -> Result<()> {
    if value == 0 {
      return Err(PatternError::InvalidValue("Period must be > 0"));
    }
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    Ok(())
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that support parameterization
///
/// Implementing this trait enables:
/// - Discovery of available parameters
/// - Creation of detectors with custom parameter values
/// - Grid search optimization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, usize>) -> Result<Self>;

  /// Returns the formation ID string
  fn pattern_id_str() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, usize>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default);
  Period::new(value)
}

// ============================================================
// TESTS
// ============================================================
