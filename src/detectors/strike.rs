//! Three line strike - bullish reversal
//!
//! Three black candles carve out a downtrend, each posting a lower low. The
//! fourth bar opens even lower but reverses in a wide-range outside bar that
//! closes above the high of the first candle in the series, with the opening
//! print marking the bar's low. Per Bulkowski this reversal predicts higher
//! prices with an 83% accuracy rate.
//!
//! The simplified variant keeps the color/low-sequence shape and the
//! close-above-first-high breakout but drops the two strictest checks
//! (prior close above the reversal open, open == low), trading precision
//! for recall.

use super::helpers::lower_lows;
use crate::{Direction, OHLCVExt, PatternDetector, PatternId, PatternMatch, OHLCV};

impl_with_defaults!(ThreeLineStrikeDetector, ThreeLineStrikeSimplifiedDetector);

/// Does the strict three line strike formation end at `index`?
pub fn three_line_strike<T: OHLCV>(bars: &[T], index: usize) -> bool {
    PatternDetector::detect(&ThreeLineStrikeDetector, bars, index).is_some()
}

/// Does the simplified three line strike formation end at `index`?
pub fn three_line_strike_simplified<T: OHLCV>(bars: &[T], index: usize) -> bool {
    PatternDetector::detect(&ThreeLineStrikeSimplifiedDetector, bars, index).is_some()
}

// ============================================================
// STRICT FORM
// ============================================================

/// Three Line Strike per the strict Bulkowski definition
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeLineStrikeDetector;

impl PatternDetector for ThreeLineStrikeDetector {
    fn id(&self) -> PatternId {
        PatternId("THREE_LINE_STRIKE")
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        if index < 3 {
            return None;
        }
        let first = bars.get(index - 3)?;
        let second = bars.get(index - 2)?;
        let third = bars.get(index - 1)?;
        let fourth = bars.get(index)?;

        // Three black candles, then a white reversal bar
        if !first.is_bearish() || !second.is_bearish() || !third.is_bearish() {
            return None;
        }
        if !fourth.is_bullish() {
            return None;
        }

        // Every bar posts a lower low, the reversal bar included
        if !lower_lows(bars, index - 3, index) {
            return None;
        }

        // Reversal bar opens below the last black close, marks its low at
        // the open, and closes above the first candle's high
        if third.close() <= fourth.open() {
            return None;
        }
        if fourth.close() <= first.high() {
            return None;
        }
        if fourth.open() != fourth.low() {
            return None;
        }

        Some(PatternMatch {
            pattern_id: PatternDetector::id(self),
            direction: Direction::Bullish,
            start_index: index - 3,
            end_index: index,
        })
    }
}

// ============================================================
// SIMPLIFIED FORM
// ============================================================

/// Three Line Strike, simplified: breakout close only
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeLineStrikeSimplifiedDetector;

impl PatternDetector for ThreeLineStrikeSimplifiedDetector {
    fn id(&self) -> PatternId {
        PatternId("THREE_LINE_STRIKE_SIMPLIFIED")
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        if index < 3 {
            return None;
        }
        let first = bars.get(index - 3)?;
        let second = bars.get(index - 2)?;
        let third = bars.get(index - 1)?;
        let fourth = bars.get(index)?;

        if !first.is_bearish() || !second.is_bearish() || !third.is_bearish() {
            return None;
        }
        if !fourth.is_bullish() {
            return None;
        }

        if !lower_lows(bars, index - 3, index) {
            return None;
        }

        // Breakout close above the first candle's high; no open/low checks
        if fourth.close() <= first.high() {
            return None;
        }

        Some(PatternMatch {
            pattern_id: PatternDetector::id(self),
            direction: Direction::Bullish,
            start_index: index - 3,
            end_index: index,
        })
    }
}
