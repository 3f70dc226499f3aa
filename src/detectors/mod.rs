//! Bulkowski formation detectors
//!
//! Five multi-bar formations, each with a documented historical accuracy
//! rate:
//!
//! - **Three line strike** (strict + simplified): bullish reversal, 83%
//! - **Two black gapping** (strict + simplified): bearish continuation, 68%
//! - **Three black crows**: bearish reversal, 78%
//!
//! The strict and simplified forms are separate detectors, not one detector
//! with a flag: their accuracy statistics differ and callers choose
//! deliberately between precision and recall.

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod crows;
pub mod gapping;
pub mod strike;

// Re-export all detectors for convenience
pub use crows::*;
pub use gapping::*;
pub use helpers::*;
pub use strike::*;
