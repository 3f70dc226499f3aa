//! Three black crows - bearish reversal
//!
//! Starts at or near the high of an uptrend: three black bars post lower
//! lows and close near their intrabar lows. The most bearish version starts
//! at a fresh high because it traps buyers entering momentum plays. Per
//! Bulkowski this pattern predicts lower prices with a 78% accuracy rate.

use std::collections::HashMap;

use super::helpers::{is_top, lower_lows, BarField};
use crate::{
    params::{get_period, ParamMeta, ParameterizedDetector},
    Direction, OHLCVExt, PatternDetector, PatternError, PatternId, PatternMatch, Period, Result,
    OHLCV,
};

/// Bars scanned backwards from `index - 3` for a local high
pub const DEFAULT_HIGH_RANGE: usize = 5;

/// Window for each candidate bar's high-extremum test
const TOP_PERIOD: usize = 5;

impl_with_defaults!(ThreeBlackCrowsDetector);

/// Does the three black crows formation end at `index`?
///
/// Uses the default high range of 5 bars.
pub fn three_black_crows<T: OHLCV>(bars: &[T], index: usize) -> bool {
    PatternDetector::detect(&ThreeBlackCrowsDetector::default(), bars, index).is_some()
}

/// Three Black Crows near a local high
#[derive(Debug, Clone, Copy)]
pub struct ThreeBlackCrowsDetector {
    /// How many bars ending at `index - 3` are tested as the local high
    pub high_range: Period,
}

impl Default for ThreeBlackCrowsDetector {
    fn default() -> Self {
        Self {
            high_range: Period::new_const(DEFAULT_HIGH_RANGE),
        }
    }
}

impl PatternDetector for ThreeBlackCrowsDetector {
    fn id(&self) -> PatternId {
        PatternId("THREE_BLACK_CROWS")
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        if index < 3 {
            return None;
        }
        let first = bars.get(index - 2)?;
        let second = bars.get(index - 1)?;
        let third = bars.get(index)?;

        // Any bar in the trailing high_range window ending at index - 3
        // sitting at a local high qualifies the formation as "near a high".
        // The scan stops at the series start instead of reaching before it.
        let anchor = index - 3;
        let mut near_high = false;
        for back in 0..self.high_range.get() {
            let Some(i) = anchor.checked_sub(back) else {
                break;
            };
            near_high |= is_top(bars, i, BarField::High, TOP_PERIOD);
        }
        if !near_high {
            return None;
        }

        if !first.is_bearish() || !second.is_bearish() || !third.is_bearish() {
            return None;
        }

        // The last pair posts lower lows
        if !lower_lows(bars, index - 1, index) {
            return None;
        }

        Some(PatternMatch {
            pattern_id: PatternDetector::id(self),
            direction: Direction::Bearish,
            start_index: index - 2,
            end_index: index,
        })
    }

    fn validate_config(&self) -> Result<()> {
        if self.high_range.get() == 0 {
            return Err(PatternError::InvalidValue("high_range must be > 0"));
        }
        Ok(())
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static THREE_BLACK_CROWS_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "high_range",
    default: DEFAULT_HIGH_RANGE,
    range: (1, 10, 1),
    description: "Bars scanned backwards from the formation start for a local high",
}];

impl ParameterizedDetector for ThreeBlackCrowsDetector {
    fn param_meta() -> &'static [ParamMeta] {
        THREE_BLACK_CROWS_PARAMS
    }

    fn with_params(params: &HashMap<&str, usize>) -> Result<Self> {
        Ok(Self {
            high_range: get_period(params, "high_range", DEFAULT_HIGH_RANGE)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "THREE_BLACK_CROWS"
    }
}
