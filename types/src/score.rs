//! Bounded score type.
//!
//! Every verification signal (NDVI, IoT, audit check, final score) is a
//! floating-point fraction in [0, 1]. `Score` makes that range part of the
//! type instead of a convention scattered across call sites.

use crate::error::TypeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A verification score constrained to the [0, 1] range.
///
/// Deserialization clamps, because remote services own the final clamping
/// semantics and the client must not reject a report it only displays.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Self::clamped(raw))
    }
}

impl Score {
    pub const ZERO: Self = Self(0.0);
    pub const MAX: Self = Self(1.0);

    /// Construct a score, rejecting non-finite and out-of-range values.
    pub fn new(value: f64) -> Result<Self, TypeError> {
        if !value.is_finite() {
            return Err(TypeError::ScoreNotFinite);
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(TypeError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Construct a score, saturating out-of-range values to the nearest bound.
    /// Non-finite input saturates to zero.
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_bounds() {
        assert_eq!(Score::new(0.0).unwrap(), Score::ZERO);
        assert_eq!(Score::new(1.0).unwrap(), Score::MAX);
        assert!((Score::new(0.742).unwrap().value() - 0.742).abs() < f64::EPSILON);
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(matches!(
            Score::new(1.01),
            Err(TypeError::ScoreOutOfRange(_))
        ));
        assert!(matches!(
            Score::new(-0.1),
            Err(TypeError::ScoreOutOfRange(_))
        ));
    }

    #[test]
    fn new_rejects_non_finite() {
        assert!(matches!(
            Score::new(f64::NAN),
            Err(TypeError::ScoreNotFinite)
        ));
        assert!(matches!(
            Score::new(f64::INFINITY),
            Err(TypeError::ScoreNotFinite)
        ));
    }

    #[test]
    fn clamped_saturates() {
        assert_eq!(Score::clamped(1.5), Score::MAX);
        assert_eq!(Score::clamped(-3.0), Score::ZERO);
        assert_eq!(Score::clamped(f64::NAN), Score::ZERO);
    }

    #[test]
    fn serde_is_transparent() {
        let s = Score::new(0.658).unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "0.658");
        let back: Score = serde_json::from_str("0.658").unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn deserialize_clamps_out_of_range() {
        let s: Score = serde_json::from_str("1.7").unwrap();
        assert_eq!(s, Score::MAX);
        let s: Score = serde_json::from_str("-0.3").unwrap();
        assert_eq!(s, Score::ZERO);
    }
}
