//! [`CollisionModel`] – the pluggable collision-rule contract.
//!
//! A model looks at the cycle's [`RobotStatus`] and proposes a
//! [`JointLimitTable`] for the joints it cares about.  Omitting a joint and
//! returning it unconstrained mean the same thing.  Models never touch
//! actuators themselves; the
//! [`CollisionManager`][crate::manager::CollisionManager] merges every
//! proposal and installs the result.
//!
//! # Writing a model
//!
//! ```rust
//! use armguard_kernel::model::CollisionModel;
//! use armguard_types::{GuardError, JointLimitTable, JointRange, RobotStatus};
//!
//! /// Keeps the arm retracted while the lift is low.
//! struct RetractWhenLow {
//!     name: String,
//! }
//!
//! impl CollisionModel for RetractWhenLow {
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//!
//!     fn step(&mut self, status: &RobotStatus) -> Result<JointLimitTable, GuardError> {
//!         let mut table = JointLimitTable::new();
//!         if status.position("lift").is_some_and(|lift| lift < 0.3) {
//!             table.set("arm", JointRange::at_most(0.05));
//!         }
//!         Ok(table)
//!     }
//! }
//!
//! let mut model = RetractWhenLow { name: "retract".into() };
//! let table = model.step(&RobotStatus::new().with_joint("lift", 0.2)).unwrap();
//! assert_eq!(table.get("arm"), JointRange::at_most(0.05));
//! ```

use std::sync::Arc;

use armguard_kinematics::KinematicTree;
use armguard_types::{GuardError, JointId, JointLimitTable, JointRange, ModelEntry, RobotStatus, joints};

// ────────────────────────────────────────────────────────────────────────────
// Contract
// ────────────────────────────────────────────────────────────────────────────

/// A collision rule evaluated once per arbitration cycle.
pub trait CollisionModel: Send {
    /// Instance name used in logs and fault records.
    fn name(&self) -> &str;

    /// Propose soft limits for the given snapshot.
    ///
    /// Must be deterministic for a given snapshot and internal state, and must
    /// finish well within the control period.
    ///
    /// # Errors
    ///
    /// Any error is treated as a model fault: the manager discards this
    /// model's contribution for the cycle and reports the fault.
    fn step(&mut self, status: &RobotStatus) -> Result<JointLimitTable, GuardError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Construction context
// ────────────────────────────────────────────────────────────────────────────

/// Everything a model factory may draw on when instantiating a model.
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    /// The configuration entry being instantiated.
    pub entry: &'a ModelEntry,
    /// Every joint the manager arbitrates (static plus end-of-arm).
    pub joints: &'a [JointId],
    /// Shared kinematic tree, when the integrator supplied one.
    pub kinematics: Option<&'a Arc<KinematicTree>>,
}

impl ModelContext<'_> {
    /// Instance name of the model being built.
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// The shared kinematic tree, or an instantiation error naming this model.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::ModelInstantiation`] when no tree was supplied.
    pub fn require_kinematics(&self) -> Result<Arc<KinematicTree>, GuardError> {
        self.kinematics
            .cloned()
            .ok_or_else(|| self.instantiation_error("a kinematic tree is required but none was supplied"))
    }

    /// Build a [`GuardError::ModelInstantiation`] for this model.
    pub fn instantiation_error(&self, details: impl Into<String>) -> GuardError {
        GuardError::ModelInstantiation {
            model: self.entry.name.clone(),
            details: details.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reference model
// ────────────────────────────────────────────────────────────────────────────

/// Reference model that constrains nothing.
///
/// Returns an unconstrained range for `head_pan`, `head_tilt`, `lift`, `arm`
/// and `wrist_yaw` every cycle.  Useful as a safe default and as the template
/// for custom models.
#[derive(Debug, Clone)]
pub struct OpenModel {
    name: String,
}

impl OpenModel {
    /// Registry identifier.
    pub const KIND: &'static str = "open";

    /// Joints the open model reports on.
    pub const JOINTS: [&'static str; 5] = [
        joints::HEAD_PAN,
        joints::HEAD_TILT,
        joints::LIFT,
        joints::ARM,
        joints::WRIST_YAW,
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Registry factory.  The open model takes no parameters.
    pub fn factory(ctx: &ModelContext<'_>) -> Result<Box<dyn CollisionModel>, GuardError> {
        ctx.entry.check_params(&[])?;
        Ok(Box::new(Self::new(ctx.name())))
    }
}

impl CollisionModel for OpenModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, _status: &RobotStatus) -> Result<JointLimitTable, GuardError> {
        Ok(Self::JOINTS
            .iter()
            .map(|&j| (j, JointRange::UNCONSTRAINED))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armguard_types::ParamValue;

    #[test]
    fn open_model_reports_documented_joints_unconstrained() {
        let mut model = OpenModel::new("open");
        let table = model.step(&RobotStatus::new()).unwrap();
        assert_eq!(table.len(), 5);
        for joint in OpenModel::JOINTS {
            assert!(table.contains(joint));
            assert!(table.get(joint).is_unconstrained());
        }
    }

    #[test]
    fn open_model_ignores_status() {
        let mut model = OpenModel::new("open");
        let a = model.step(&RobotStatus::new()).unwrap();
        let b = model
            .step(&RobotStatus::new().with_joint("lift", 1.1).with_joint("arm", 0.5))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn open_model_rejects_parameters() {
        let entry = ModelEntry::new("open").with_param("clearance", ParamValue::Number(0.1));
        let ctx = ModelContext {
            entry: &entry,
            joints: &[],
            kinematics: None,
        };
        assert!(matches!(
            OpenModel::factory(&ctx),
            Err(GuardError::ModelInstantiation { ref details, .. }) if details.contains("clearance")
        ));
    }

    #[test]
    fn context_without_tree_fails_require_kinematics() {
        let entry = ModelEntry::new("keep_out");
        let ctx = ModelContext {
            entry: &entry,
            joints: &[],
            kinematics: None,
        };
        assert!(matches!(
            ctx.require_kinematics(),
            Err(GuardError::ModelInstantiation { ref model, .. }) if model == "keep_out"
        ));
    }
}
