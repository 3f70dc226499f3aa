//! # formscan - Multi-Bar Chart Formation Scanner
//!
//! Detection of Bulkowski-style multi-bar candlestick formations over OHLC bar series.
//!
//! ## Quick Start
//!
//! ```rust
//! use formscan::prelude::*;
//!
//! // Define your OHLC data
//! struct Bar { o: f64, h: f64, l: f64, c: f64 }
//!
//! impl OHLCV for Bar {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//! }
//!
//! // Create engine with all builtin formations
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! // Scan your data
//! let bars: Vec<Bar> = vec![];
//! let matches = engine.scan(&bars).unwrap();
//! ```
//!
//! Each detector answers a single question: does the named formation end at
//! this bar index? Detection is pure and stateless; insufficient history is
//! never an error, it simply yields no match.

pub mod detectors;
pub mod params;

pub mod prelude {
    pub use crate::{
        // Detectors
        detectors::*,
        // Parameters
        params::{get_period, ParamMeta, ParameterizedDetector},
        // Parallel
        scan_parallel,
        // Iterator
        BarPatterns,
        // Engine
        BuiltinDetector,
        Direction,
        // Core traits
        DynPatternDetector,
        EngineBuilder,
        OHLCVExt,
        PatternDetector,
        PatternEngine,
        // Errors
        PatternError,
        PatternId,
        PatternIterator,
        PatternMatch,
        Period,
        Result,
        ScanError,
        ScanResult,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur during configuration or data validation.
///
/// Detection itself never fails: a detector evaluated with insufficient
/// history returns no match rather than an error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("Invalid OHLC at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Lookback window length in bars (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    /// Create a Period from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLC data trait.
///
/// `volume` has a default implementation because no builtin formation
/// reads it; override it if a custom detector needs volume.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn volume(&self) -> f64 {
        0.0
    }

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Blanket impl for references to dyn OHLCV
impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> f64 {
        (*self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (*self).timestamp()
    }
}

/// Extension trait with computed properties for OHLC data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Close above open (white candle). A doji (close == open) is neither
    /// bullish nor bearish.
    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    /// Close below open (black candle).
    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        if self.high() < self.low() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.open().is_nan()
            || self.high().is_nan()
            || self.low().is_nan()
            || self.close().is_nan()
        {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if self.open().is_infinite()
            || self.high().is_infinite()
            || self.low().is_infinite()
            || self.close().is_infinite()
        {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

// ============================================================
// PATTERN MATCH - result of detection (Copy, no allocations)
// ============================================================

/// Unique identifier for a formation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Returns the documented direction of this formation.
    ///
    /// - `Some(Direction::Bullish)` - formation signals a bullish reversal
    /// - `Some(Direction::Bearish)` - formation signals a bearish move
    /// - `None` - unknown (custom) formation
    pub fn typical_direction(&self) -> Option<Direction> {
        match self.0 {
            "THREE_LINE_STRIKE" | "THREE_LINE_STRIKE_SIMPLIFIED" => Some(Direction::Bullish),
            "TWO_BLACK_GAPPING" | "TWO_BLACK_GAPPING_SIMPLIFIED" | "THREE_BLACK_CROWS" => {
                Some(Direction::Bearish)
            }
            _ => None,
        }
    }

    /// Returns true if this formation typically signals bullish moves
    pub fn is_typically_bullish(&self) -> bool {
        matches!(self.typical_direction(), Some(Direction::Bullish))
    }

    /// Returns true if this formation typically signals bearish moves
    pub fn is_typically_bearish(&self) -> bool {
        matches!(self.typical_direction(), Some(Direction::Bearish))
    }
}

impl serde::Serialize for PatternId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

/// Direction/bias of a formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// Result of formation detection - Copy, no allocations
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PatternMatch {
    pub pattern_id: PatternId,
    pub direction: Direction,
    /// Index of the first bar of the formation
    pub start_index: usize,
    /// Index of the last bar of the formation (the bar the detector was asked about)
    pub end_index: usize,
}

// ============================================================
// PATTERN DETECTOR TRAITS
// ============================================================

/// Generic formation detector trait - for concrete types
pub trait PatternDetector: Send + Sync {
    fn id(&self) -> PatternId;

    /// Minimum number of bars the formation spans
    fn min_bars(&self) -> usize;

    /// Does the formation end at `index`? Detection must be pure: no state,
    /// no side effects, and `None` (never a panic) when `index` leaves too
    /// little history.
    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

/// Object-safe formation detector trait - for custom detectors
pub trait DynPatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn min_bars(&self) -> usize;
    fn detect(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternMatch>;
    fn validate_config(&self) -> Result<()>;
}

impl<D: PatternDetector> DynPatternDetector for D {
    fn id(&self) -> PatternId {
        PatternDetector::id(self)
    }

    fn min_bars(&self) -> usize {
        PatternDetector::min_bars(self)
    }

    fn detect(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternMatch> {
        PatternDetector::detect(self, bars, index)
    }

    fn validate_config(&self) -> Result<()> {
        PatternDetector::validate_config(self)
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, bars, index)),*
                }
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => PatternDetector::id(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

// Apply macro - the five Bulkowski formations
define_builtin_detectors! {
    ThreeLineStrike(ThreeLineStrikeDetector),
    ThreeLineStrikeSimplified(ThreeLineStrikeSimplifiedDetector),
    TwoBlackGapping(TwoBlackGappingDetector),
    TwoBlackGappingSimplified(TwoBlackGappingSimplifiedDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<PatternId>>,
}

/// Main formation detection engine
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl PatternEngine {
    // ===========================================
    // MID-LEVEL: Single-bar / Range
    // ===========================================

    /// Detect formations ending at a single bar index.
    pub fn scan_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Vec<PatternMatch> {
        if self.custom.is_empty() {
            self.scan_at_internal(bars, &[], index)
        } else {
            let bar_refs: Vec<&dyn OHLCV> = bars.iter().map(|b| b as &dyn OHLCV).collect();
            self.scan_at_internal(bars, &bar_refs, index)
        }
    }

    /// Detect formations in a range of bar indices.
    pub fn scan_range<T: OHLCV>(
        &self,
        bars: &[T],
        range: std::ops::Range<usize>,
    ) -> Vec<PatternMatch> {
        let mut results = Vec::new();

        if self.custom.is_empty() {
            for i in range {
                results.extend(self.scan_at_internal(bars, &[], i));
            }
        } else {
            let bar_refs: Vec<&dyn OHLCV> = bars.iter().map(|b| b as &dyn OHLCV).collect();
            for i in range {
                results.extend(self.scan_at_internal(bars, &bar_refs, i));
            }
        }

        results
    }

    // ===========================================
    // HIGH-LEVEL: Batch processing
    // ===========================================

    /// Scan all bars and return flat list of matches.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternMatch>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        Ok(self.scan_range(bars, 0..bars.len()))
    }

    /// Scan and return matches grouped by bar index.
    pub fn scan_grouped<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<Vec<PatternMatch>>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        let mut grouped = vec![Vec::new(); bars.len()];

        if self.custom.is_empty() {
            for (i, slot) in grouped.iter_mut().enumerate() {
                *slot = self.scan_at_internal(bars, &[], i);
            }
        } else {
            let bar_refs: Vec<&dyn OHLCV> = bars.iter().map(|b| b as &dyn OHLCV).collect();
            for (i, slot) in grouped.iter_mut().enumerate() {
                *slot = self.scan_at_internal(bars, &bar_refs, i);
            }
        }

        Ok(grouped)
    }

    /// Create an iterator over bars with their matches.
    pub fn iter<'a, T: OHLCV>(&'a self, bars: &'a [T]) -> PatternIterator<'a, T> {
        PatternIterator::new(self, bars)
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn scan_at_internal<T: OHLCV>(
        &self,
        bars: &[T],
        bar_refs: &[&dyn OHLCV],
        index: usize,
    ) -> Vec<PatternMatch> {
        let mut results = Vec::new();

        // Fast path: builtin detectors (enum dispatch, no vtable)
        for detector in &self.builtin {
            if index + 1 >= detector.min_bars() {
                if let Some(m) = detector.detect(bars, index) {
                    if self.should_include(&m) {
                        results.push(m);
                    }
                }
            }
        }

        // Slow path: custom detectors (vtable)
        if !self.custom.is_empty() && !bar_refs.is_empty() {
            for detector in &self.custom {
                if index + 1 >= detector.min_bars() {
                    if let Some(m) = detector.detect(bar_refs, index) {
                        if self.should_include(&m) {
                            results.push(m);
                        }
                    }
                }
            }
        }

        results
    }

    fn should_include(&self, m: &PatternMatch) -> bool {
        if let Some(ref filter) = self.config.pattern_filter {
            if !filter.contains(&m.pattern_id) {
                return false;
            }
        }
        true
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                PatternError::InvalidOHLCV { reason, .. } => {
                    PatternError::InvalidOHLCV { index: i, reason }
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for d in &self.builtin {
            d.validate_config()?;
        }
        for d in &self.custom {
            d.validate_config()?;
        }
        Ok(())
    }
}

// ============================================================
// PATTERN ITERATOR
// ============================================================

/// Formations found at a specific bar
#[derive(Debug, Clone)]
pub struct BarPatterns {
    pub index: usize,
    pub patterns: Vec<PatternMatch>,
}

/// Iterator over bars with their formation matches
pub struct PatternIterator<'a, T: OHLCV> {
    engine: &'a PatternEngine,
    bars: &'a [T],
    bar_refs: Vec<&'a dyn OHLCV>,
    current: usize,
}

impl<'a, T: OHLCV> PatternIterator<'a, T> {
    fn new(engine: &'a PatternEngine, bars: &'a [T]) -> Self {
        let bar_refs = if engine.custom.is_empty() {
            Vec::new()
        } else {
            bars.iter().map(|b| b as &dyn OHLCV).collect()
        };

        Self {
            engine,
            bars,
            bar_refs,
            current: 0,
        }
    }
}

impl<'a, T: OHLCV> Iterator for PatternIterator<'a, T> {
    type Item = BarPatterns;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.bars.len() {
            return None;
        }

        let index = self.current;
        let patterns = self
            .engine
            .scan_at_internal(self.bars, &self.bar_refs, index);

        self.current += 1;

        Some(BarPatterns { index, patterns })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bars.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl<'a, T: OHLCV> ExactSizeIterator for PatternIterator<'a, T> {}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            builtin: Vec::new(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    /// Add all builtin formations with default configurations
    pub fn with_all_defaults(self) -> Self {
        self.with_strict_defaults().with_simplified_defaults()
    }

    /// Add the strict (Bulkowski-definition) formations with defaults.
    ///
    /// These carry the full set of equality/gap constraints and reject many
    /// visually valid formations in exchange for precision.
    pub fn with_strict_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            ThreeLineStrike,
            TwoBlackGapping,
            ThreeBlackCrows,
        ]);
        self
    }

    /// Add the simplified (relaxed) variants with defaults.
    ///
    /// Same shapes minus the strictest constraints; higher recall, lower
    /// precision, and a different documented accuracy rate - hence separate
    /// detectors rather than a flag.
    pub fn with_simplified_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            ThreeLineStrikeSimplified,
            TwoBlackGappingSimplified,
        ]);
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Add a custom detector (slow path)
    pub fn add_custom<D: DynPatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific formations only
    pub fn only_patterns(mut self, ids: impl IntoIterator<Item = PatternId>) -> Self {
        self.config.pattern_filter = Some(ids.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<PatternMatch>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments.
///
/// Safe because detection is pure: no call mutates the series or any shared
/// state, so independent instruments (and indices) evaluate with no
/// coordination.
pub fn scan_parallel<'a, T, I>(
    engine: &PatternEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test OHLC bar
    #[derive(Debug, Clone)]
    struct Bar {
        o: f64,
        h: f64,
        l: f64,
        c: f64,
    }

    impl Bar {
        fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
            Self { o, h, l, c }
        }
    }

    impl OHLCV for Bar {
        fn open(&self) -> f64 {
            self.o
        }

        fn high(&self) -> f64 {
            self.h
        }

        fn low(&self) -> f64 {
            self.l
        }

        fn close(&self) -> f64 {
            self.c
        }
    }

    fn make_downtrend_bars() -> Vec<Bar> {
        (0..20)
            .map(|i| {
                let base = 100.0 - i as f64 * 2.0;
                Bar::new(base, base + 1.0, base - 1.0, base - 0.5)
            })
            .collect()
    }

    fn make_uptrend_bars() -> Vec<Bar> {
        (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                Bar::new(base, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect()
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(100).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_ohlcv_ext() {
        let bar = Bar::new(100.0, 110.0, 90.0, 105.0);
        assert_eq!(bar.body(), 5.0);
        assert_eq!(bar.range(), 20.0);
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());
    }

    #[test]
    fn test_doji_is_neither_color() {
        let doji = Bar::new(100.0, 105.0, 95.0, 100.0);
        assert!(!doji.is_bullish());
        assert!(!doji.is_bearish());
    }

    #[test]
    fn test_typical_direction() {
        assert!(PatternId("THREE_LINE_STRIKE").is_typically_bullish());
        assert!(PatternId("THREE_LINE_STRIKE_SIMPLIFIED").is_typically_bullish());
        assert!(PatternId("TWO_BLACK_GAPPING").is_typically_bearish());
        assert!(PatternId("TWO_BLACK_GAPPING_SIMPLIFIED").is_typically_bearish());
        assert!(PatternId("THREE_BLACK_CROWS").is_typically_bearish());
        assert_eq!(PatternId("CUSTOM").typical_direction(), None);
    }

    #[test]
    fn test_engine_builder() {
        let engine = EngineBuilder::new().with_all_defaults().build();
        assert!(engine.is_ok());
    }

    #[test]
    fn test_strict_defaults_count() {
        let engine = EngineBuilder::new().with_strict_defaults().build().unwrap();
        assert_eq!(engine.builtin.len(), 3);
    }

    #[test]
    fn test_simplified_defaults_count() {
        let engine = EngineBuilder::new()
            .with_simplified_defaults()
            .build()
            .unwrap();
        assert_eq!(engine.builtin.len(), 2);
    }

    #[test]
    fn test_all_defaults_count() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        assert_eq!(engine.builtin.len(), 5);
    }

    #[test]
    fn test_empty_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars: Vec<Bar> = vec![];
        let patterns = engine.scan(&bars).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_trend_data_has_no_formations() {
        // Monotone trends with no gap, no fresh top, no color flip
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let patterns = engine.scan(&make_uptrend_bars()).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_validate_data_rejects_nan() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let bars = vec![Bar::new(100.0, f64::NAN, 90.0, 95.0)];
        assert!(engine.scan(&bars).is_err());
    }

    #[test]
    fn test_validate_data_reports_index() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let mut bars = make_downtrend_bars();
        bars.push(Bar::new(100.0, 90.0, 110.0, 95.0)); // high < low
        let err = engine.scan(&bars).unwrap_err();
        match err {
            PatternError::InvalidOHLCV { index, .. } => assert_eq!(index, 20),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pattern_filter() {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .only_patterns([PatternId("THREE_BLACK_CROWS")])
            .build()
            .unwrap();

        let bars = make_downtrend_bars();
        let patterns = engine.scan(&bars).unwrap();
        assert!(patterns
            .iter()
            .all(|p| p.pattern_id == PatternId("THREE_BLACK_CROWS")));
    }

    #[test]
    fn test_iterator_exact_size() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars = make_downtrend_bars();

        let iter = engine.iter(&bars);
        assert_eq!(iter.len(), 20);

        let results: Vec<_> = engine.iter(&bars).collect();
        assert_eq!(results.len(), bars.len());
        assert_eq!(results[7].index, 7);
    }

    #[test]
    fn test_scan_grouped_shape() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars = make_downtrend_bars();
        let grouped = engine.scan_grouped(&bars).unwrap();
        assert_eq!(grouped.len(), bars.len());
    }

    #[test]
    fn test_parallel_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

        let bars1 = make_downtrend_bars();
        let bars2 = make_uptrend_bars();

        let instruments: Vec<(&str, &[Bar])> = vec![("AAPL", &bars1), ("GOOGL", &bars2)];

        let (results, errors) = scan_parallel(&engine, instruments);
        assert_eq!(results.len(), 2);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_add_checked_rejects_bad_config() {
        let detector = BuiltinDetector::ThreeBlackCrows(ThreeBlackCrowsDetector {
            high_range: Period::new_const(0),
        });
        assert!(EngineBuilder::new().add_checked(detector).is_err());
    }

    /// Custom detector: fires whenever the bar is bearish
    struct AlwaysBearish;

    impl PatternDetector for AlwaysBearish {
        fn id(&self) -> PatternId {
            PatternId("ALWAYS_BEARISH")
        }

        fn min_bars(&self) -> usize {
            1
        }

        fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
            let bar = bars.get(index)?;
            bar.is_bearish().then_some(PatternMatch {
                pattern_id: PatternDetector::id(self),
                direction: Direction::Bearish,
                start_index: index,
                end_index: index,
            })
        }
    }

    #[test]
    fn test_custom_detector() {
        let engine = EngineBuilder::new()
            .add_custom(AlwaysBearish)
            .build()
            .unwrap();

        let bars = make_downtrend_bars();
        let patterns = engine.scan(&bars).unwrap();
        assert_eq!(patterns.len(), bars.len());
        assert!(patterns
            .iter()
            .all(|p| p.pattern_id == PatternId("ALWAYS_BEARISH")));
    }
}
