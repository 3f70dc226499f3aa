//! Two black gapping - bearish continuation
//!
//! Appears after a notable top in an uptrend: a gap down yields two black
//! bars posting lower lows, predicting the decline continues. Per Bulkowski
//! this pattern predicts lower prices with a 68% accuracy rate.
//!
//! The simplified variant omits the gap requirement - many otherwise valid
//! formations open inside the prior bar's range.

use std::collections::HashMap;

use super::helpers::{gaps_down, is_top, lower_lows, BarField};
use crate::{
    params::{get_period, ParamMeta, ParameterizedDetector},
    Direction, OHLCVExt, PatternDetector, PatternError, PatternId, PatternMatch, Period, Result,
    OHLCV,
};

/// Trailing window for the close-extremum test at the top bar
pub const DEFAULT_TOP_PERIOD: usize = 7;

impl_with_defaults!(TwoBlackGappingDetector, TwoBlackGappingSimplifiedDetector);

/// Does the strict two black gapping formation end at `index`?
///
/// Uses the default top period of 7 bars.
pub fn two_black_gapping<T: OHLCV>(bars: &[T], index: usize) -> bool {
    PatternDetector::detect(&TwoBlackGappingDetector::default(), bars, index).is_some()
}

/// Does the simplified (gapless) two black gapping formation end at `index`?
pub fn two_black_gapping_simplified<T: OHLCV>(bars: &[T], index: usize) -> bool {
    PatternDetector::detect(&TwoBlackGappingSimplifiedDetector::default(), bars, index).is_some()
}

// ============================================================
// STRICT FORM
// ============================================================

/// Two Black Gapping per the strict definition (gap required)
#[derive(Debug, Clone, Copy)]
pub struct TwoBlackGappingDetector {
    /// Window for the close-extremum test at bar `index - 3`
    pub top_period: Period,
}

impl Default for TwoBlackGappingDetector {
    fn default() -> Self {
        Self {
            top_period: Period::new_const(DEFAULT_TOP_PERIOD),
        }
    }
}

impl PatternDetector for TwoBlackGappingDetector {
    fn id(&self) -> PatternId {
        PatternId("TWO_BLACK_GAPPING")
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

        // The bar before the black run sits at a local close maximum
        if !is_top(bars, index - 3, BarField::Close, self.top_period.get()) {
            return None;
        }

        if !first.is_bearish() || !second.is_bearish() || !third.is_bearish() {
            return None;
        }

        // Gap down into the second black bar
        if !gaps_down(bars, index - 1) {
            return None;
        }

        // The last pair posts lower lows
        if !lower_lows(bars, index - 1, index) {
            return None;
        }

        Some(PatternMatch {
            pattern_id: PatternDetector::id(self),
            direction: Direction::Bearish,
            start_index: index - 3,
            end_index: index,
        })
    }

    fn validate_config(&self) -> Result<()> {
        if self.top_period.get() == 0 {
            return Err(PatternError::InvalidValue("top_period must be > 0"));
        }
        Ok(())
    }
}

// ============================================================
// SIMPLIFIED FORM
// ============================================================

/// Two Black Gapping without the gap requirement
#[derive(Debug, Clone, Copy)]
pub struct TwoBlackGappingSimplifiedDetector {
    /// Window for the close-extremum test at bar `index - 3`
    pub top_period: Period,
}

impl Default for TwoBlackGappingSimplifiedDetector {
    fn default() -> Self {
        Self {
            top_period: Period::new_const(DEFAULT_TOP_PERIOD),
        }
    }
}

impl PatternDetector for TwoBlackGappingSimplifiedDetector {
    fn id(&self) -> PatternId {
        PatternId("TWO_BLACK_GAPPING_SIMPLIFIED")
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

        if !is_top(bars, index - 3, BarField::Close, self.top_period.get()) {
            return None;
        }

        if !first.is_bearish() || !second.is_bearish() || !third.is_bearish() {
            return None;
        }

        if !lower_lows(bars, index - 1, index) {
            return None;
        }

        Some(PatternMatch {
            pattern_id: PatternDetector::id(self),
            direction: Direction::Bearish,
            start_index: index - 3,
            end_index: index,
        })
    }

    fn validate_config(&self) -> Result<()> {
        if self.top_period.get() == 0 {
            return Err(PatternError::InvalidValue("top_period must be > 0"));
        }
        Ok(())
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static TWO_BLACK_GAPPING_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "top_period",
    default: DEFAULT_TOP_PERIOD,
    range: (3, 21, 1),
    description: "Trailing window for the close-extremum test at the top bar",
}];

impl ParameterizedDetector for TwoBlackGappingDetector {
    fn param_meta() -> &'static [ParamMeta] {
        TWO_BLACK_GAPPING_PARAMS
    }

    fn with_params(params: &HashMap<&str, usize>) -> Result<Self> {
        Ok(Self {
            top_period: get_period(params, "top_period", DEFAULT_TOP_PERIOD)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "TWO_BLACK_GAPPING"
    }
}

impl ParameterizedDetector for TwoBlackGappingSimplifiedDetector {
    fn param_meta() -> &'static [ParamMeta] {
        TWO_BLACK_GAPPING_PARAMS
    }

    fn with_params(params: &HashMap<&str, usize>) -> Result<Self> {
        Ok(Self {
            top_period: get_period(params, "top_period", DEFAULT_TOP_PERIOD)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "TWO_BLACK_GAPPING_SIMPLIFIED"
    }
}
