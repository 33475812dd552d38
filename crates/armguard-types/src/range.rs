//! [`Bound`] and [`JointRange`] – soft motion limits for a single joint.
//!
//! A bound is either a concrete position or [`Bound::Unconstrained`], which
//! tells the actuator to fall back to its factory hard limit.  Merge logic
//! only ever compares concrete bounds; an unconstrained bound never wins a
//! comparison.
//!
//! # Example
//!
//! ```rust
//! use armguard_types::{Bound, JointRange};
//!
//! let from_floor = JointRange::at_least(0.1);
//! let from_ceiling = JointRange::at_most(0.9);
//!
//! let merged = from_floor.intersect(&from_ceiling);
//! assert_eq!(merged, JointRange::bounded(0.1, 0.9));
//! assert_eq!(merged.to_options(), (Some(0.1), Some(0.9)));
//! assert_eq!(JointRange::UNCONSTRAINED.lower, Bound::Unconstrained);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

// ────────────────────────────────────────────────────────────────────────────
// Bound
// ────────────────────────────────────────────────────────────────────────────

/// One side of a [`JointRange`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Defer to the actuator's factory hard limit.
    #[default]
    Unconstrained,
    /// A concrete position in the joint's native unit (m or rad).
    Concrete(f64),
}

impl Bound {
    /// The concrete value, or `None` when unconstrained.
    pub fn value(self) -> Option<f64> {
        match self {
            Bound::Concrete(v) => Some(v),
            Bound::Unconstrained => None,
        }
    }

    pub fn is_concrete(self) -> bool {
        matches!(self, Bound::Concrete(_))
    }

    /// The more restrictive of two lower bounds (the larger concrete value).
    pub fn tighter_lower(self, other: Self) -> Self {
        match (self, other) {
            (Bound::Concrete(a), Bound::Concrete(b)) => Bound::Concrete(a.max(b)),
            (Bound::Concrete(_), Bound::Unconstrained) => self,
            (Bound::Unconstrained, _) => other,
        }
    }

    /// The more restrictive of two upper bounds (the smaller concrete value).
    pub fn tighter_upper(self, other: Self) -> Self {
        match (self, other) {
            (Bound::Concrete(a), Bound::Concrete(b)) => Bound::Concrete(a.min(b)),
            (Bound::Concrete(_), Bound::Unconstrained) => self,
            (Bound::Unconstrained, _) => other,
        }
    }
}

impl From<Option<f64>> for Bound {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Bound::Unconstrained, Bound::Concrete)
    }
}

impl From<Bound> for Option<f64> {
    fn from(bound: Bound) -> Self {
        bound.value()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JointRange
// ────────────────────────────────────────────────────────────────────────────

/// Permissible `[lower, upper]` motion range for one joint.
///
/// Constructors do not validate; call [`JointRange::validate`] before
/// trusting a range produced by a collision model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointRange {
    #[serde(default)]
    pub lower: Bound,
    #[serde(default)]
    pub upper: Bound,
}

impl JointRange {
    /// Both bounds deferred to the factory hard limit.
    pub const UNCONSTRAINED: Self = Self {
        lower: Bound::Unconstrained,
        upper: Bound::Unconstrained,
    };

    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    /// Both bounds concrete.
    pub fn bounded(lower: f64, upper: f64) -> Self {
        Self::new(Bound::Concrete(lower), Bound::Concrete(upper))
    }

    /// Only the lower bound concrete.
    pub fn at_least(lower: f64) -> Self {
        Self::new(Bound::Concrete(lower), Bound::Unconstrained)
    }

    /// Only the upper bound concrete.
    pub fn at_most(upper: f64) -> Self {
        Self::new(Bound::Unconstrained, Bound::Concrete(upper))
    }

    pub fn is_unconstrained(&self) -> bool {
        !self.lower.is_concrete() && !self.upper.is_concrete()
    }

    /// `true` when both bounds are concrete and `lower > upper`.
    pub fn is_inverted(&self) -> bool {
        matches!(
            (self.lower, self.upper),
            (Bound::Concrete(lo), Bound::Concrete(hi)) if lo > hi
        )
    }

    /// Check that every concrete bound is finite and that the range is not
    /// inverted.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidRange`] naming `joint` otherwise.
    pub fn validate(&self, joint: &str) -> Result<(), GuardError> {
        for bound in [self.lower, self.upper] {
            if let Bound::Concrete(v) = bound {
                if !v.is_finite() {
                    return Err(GuardError::InvalidRange {
                        joint: joint.to_string(),
                        details: format!("bound {v} is not finite"),
                    });
                }
            }
        }
        if let (Bound::Concrete(lo), Bound::Concrete(hi)) = (self.lower, self.upper) {
            if lo > hi {
                return Err(GuardError::InvalidRange {
                    joint: joint.to_string(),
                    details: format!("lower {lo} > upper {hi}"),
                });
            }
        }
        Ok(())
    }

    /// Conservative intersection: the larger lower bound and the smaller
    /// upper bound.  The result may be inverted; callers decide how to resolve
    /// that.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.tighter_lower(other.lower),
            upper: self.upper.tighter_upper(other.upper),
        }
    }

    /// `true` when `position` lies inside the range.  Unconstrained bounds
    /// accept everything on their side.
    pub fn contains(&self, position: f64) -> bool {
        let above = self.lower.value().is_none_or(|lo| position >= lo);
        let below = self.upper.value().is_none_or(|hi| position <= hi);
        above && below
    }

    /// The `(lower, upper)` pair in the form actuator sinks accept.
    pub fn to_options(&self) -> (Option<f64>, Option<f64>) {
        (self.lower.value(), self.upper.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_never_wins_a_lower_comparison() {
        let b = Bound::Concrete(-5.0);
        assert_eq!(b.tighter_lower(Bound::Unconstrained), b);
        assert_eq!(Bound::Unconstrained.tighter_lower(b), b);
        assert_eq!(
            Bound::Unconstrained.tighter_lower(Bound::Unconstrained),
            Bound::Unconstrained
        );
    }

    #[test]
    fn tighter_bounds_pick_max_lower_and_min_upper() {
        assert_eq!(
            Bound::Concrete(0.2).tighter_lower(Bound::Concrete(0.3)),
            Bound::Concrete(0.3)
        );
        assert_eq!(
            Bound::Concrete(0.5).tighter_upper(Bound::Concrete(0.4)),
            Bound::Concrete(0.4)
        );
    }

    #[test]
    fn intersect_half_open_ranges() {
        let merged = JointRange::at_least(0.1).intersect(&JointRange::at_most(0.9));
        assert_eq!(merged, JointRange::bounded(0.1, 0.9));
    }

    #[test]
    fn intersect_with_unconstrained_is_identity() {
        let r = JointRange::bounded(0.2, 0.5);
        assert_eq!(r.intersect(&JointRange::UNCONSTRAINED), r);
        assert_eq!(JointRange::UNCONSTRAINED.intersect(&r), r);
    }

    #[test]
    fn intersect_can_produce_inverted_range() {
        let merged = JointRange::bounded(0.6, 1.0).intersect(&JointRange::bounded(0.0, 0.4));
        assert!(merged.is_inverted());
        assert!(merged.validate("arm").is_err());
    }

    #[test]
    fn validate_rejects_non_finite_bounds() {
        let r = JointRange::at_least(f64::NAN);
        assert!(matches!(
            r.validate("lift"),
            Err(GuardError::InvalidRange { ref joint, .. }) if joint == "lift"
        ));
        assert!(JointRange::at_most(f64::INFINITY).validate("lift").is_err());
    }

    #[test]
    fn validate_accepts_degenerate_range() {
        assert!(JointRange::bounded(0.6, 0.6).validate("arm").is_ok());
        assert!(JointRange::UNCONSTRAINED.validate("arm").is_ok());
    }

    #[test]
    fn contains_respects_open_sides() {
        let r = JointRange::at_least(0.1);
        assert!(r.contains(100.0));
        assert!(!r.contains(0.0));
        assert!(JointRange::UNCONSTRAINED.contains(-1e9));
        assert!(JointRange::bounded(0.2, 0.4).contains(0.4));
    }

    #[test]
    fn option_conversions() {
        assert_eq!(Bound::from(None), Bound::Unconstrained);
        assert_eq!(Bound::from(Some(1.5)), Bound::Concrete(1.5));
        assert_eq!(JointRange::at_most(0.9).to_options(), (None, Some(0.9)));
    }

    #[test]
    fn range_serialization_roundtrip() {
        let r = JointRange::at_least(0.25);
        let json = serde_json::to_string(&r).unwrap();
        let back: JointRange = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
