//! [`ConflictPolicy`] – what to install when merged bounds cross.
//!
//! Two models can each be individually sane and still jointly demand
//! `lower > upper` for the same joint.  The merged table is then
//! unsatisfiable and the manager applies the configured policy to produce a
//! deterministic range.  Every resolution is reported as a [`JointConflict`].

use std::fmt;
use std::str::FromStr;

use armguard_types::{GuardError, JointId, JointLimitTable, JointRange};
use serde::{Deserialize, Serialize};

/// Deterministic resolution for an inverted merged range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Collapse to `[lower, lower]`: the joint may not move below the
    /// strongest lower demand and may not move above it either.
    #[default]
    Clamp,
    /// Drop both bounds and fall back to the actuator's factory hard limits.
    HardwareDefault,
}

impl ConflictPolicy {
    /// Resolve an inverted range.  Ranges that are not inverted are returned
    /// unchanged.
    pub fn resolve(self, range: JointRange) -> JointRange {
        if !range.is_inverted() {
            return range;
        }
        match self {
            ConflictPolicy::Clamp => JointRange::new(range.lower, range.lower),
            ConflictPolicy::HardwareDefault => JointRange::UNCONSTRAINED,
        }
    }

    /// Resolve every inverted entry of `table` in place and return what was
    /// changed.
    pub fn apply(self, table: &mut JointLimitTable) -> Vec<JointConflict> {
        table
            .inverted()
            .into_iter()
            .map(|joint| {
                let merged = table.get(joint.as_str());
                let resolved = self.resolve(merged);
                table.set(joint.clone(), resolved);
                JointConflict {
                    joint,
                    merged,
                    resolved,
                    policy: self,
                }
            })
            .collect()
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictPolicy::Clamp => "clamp",
            ConflictPolicy::HardwareDefault => "hardware_default",
        })
    }
}

impl FromStr for ConflictPolicy {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clamp" => Ok(ConflictPolicy::Clamp),
            "hardware_default" => Ok(ConflictPolicy::HardwareDefault),
            other => Err(GuardError::Config(format!(
                "unknown conflict policy `{other}` (expected `clamp` or `hardware_default`)"
            ))),
        }
    }
}

/// One inverted merged range and how it was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConflict {
    pub joint: JointId,
    /// The unsatisfiable merge result.
    pub merged: JointRange,
    /// What was actually installed.
    pub resolved: JointRange,
    pub policy: ConflictPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_collapses_to_lower() {
        let resolved = ConflictPolicy::Clamp.resolve(JointRange::bounded(0.6, 0.4));
        assert_eq!(resolved, JointRange::bounded(0.6, 0.6));
    }

    #[test]
    fn hardware_default_drops_both_bounds() {
        let resolved = ConflictPolicy::HardwareDefault.resolve(JointRange::bounded(0.6, 0.4));
        assert!(resolved.is_unconstrained());
    }

    #[test]
    fn consistent_ranges_pass_through() {
        for policy in [ConflictPolicy::Clamp, ConflictPolicy::HardwareDefault] {
            let range = JointRange::bounded(0.1, 0.9);
            assert_eq!(policy.resolve(range), range);
            assert_eq!(policy.resolve(JointRange::at_least(3.0)), JointRange::at_least(3.0));
        }
    }

    #[test]
    fn apply_reports_only_inverted_joints() {
        let mut table = JointLimitTable::new()
            .with("arm", JointRange::bounded(0.6, 0.4))
            .with("lift", JointRange::bounded(0.1, 0.9));

        let conflicts = ConflictPolicy::Clamp.apply(&mut table);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].joint.as_str(), "arm");
        assert_eq!(conflicts[0].merged, JointRange::bounded(0.6, 0.4));
        assert_eq!(table.get("arm"), JointRange::bounded(0.6, 0.6));
        assert_eq!(table.get("lift"), JointRange::bounded(0.1, 0.9));
        assert!(table.inverted().is_empty());
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!("clamp".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Clamp);
        assert_eq!(
            ConflictPolicy::HardwareDefault.to_string().parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::HardwareDefault
        );
        assert!(matches!("loosest".parse::<ConflictPolicy>(), Err(GuardError::Config(_))));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ConflictPolicy::HardwareDefault).unwrap();
        assert_eq!(json, "\"hardware_default\"");
    }
}
