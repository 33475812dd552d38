//! [`EndOfArmKeepOut`] – keeps the tool tip above a clearance height.
//!
//! The tool hangs off the arm, and the arm rides on the lift.  Lowering the
//! lift while the tool points down can drive the tip into the base or the
//! floor.  Each cycle this model locates the configured tool link in the
//! tree's reference link (the first arm cuff) using the current end-of-arm
//! joint positions, reads the tip's height along the configured up axis, and
//! raises the lift's lower bound so that
//!
//! ```text
//! lift + reference_height + tip_height >= clearance
//! ```
//!
//! If the solver cannot relate the tool link to the reference link the model
//! contributes nothing for that cycle.
//!
//! # Parameters
//!
//! | Key | Type | Default | Meaning |
//! |---|---|---|---|
//! | `tool_link` | text | required | Link whose origin is the tool tip. |
//! | `clearance` | number | `0.05` | Minimum tip height above the lift zero plane (m). |
//! | `reference_height` | number | `0.0` | Height of the reference link when the lift is at zero (m). |
//! | `up_axis` | text | `"y"` | Axis of the reference frame that points up. |
//! | `lift_joint` | text | `"lift"` | Joint that receives the lower bound. |
//!
//! Unknown keys, values of the wrong type and a `lift_joint` the manager does
//! not know are rejected when the model is built.

use armguard_kinematics::ChainSolver;
use armguard_types::{GuardError, JointLimitTable, JointRange, RobotStatus, joints};
use tracing::debug;

use crate::model::{CollisionModel, ModelContext};

const DEFAULT_CLEARANCE: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct EndOfArmKeepOut {
    name: String,
    solver: ChainSolver,
    tool_link: String,
    lift_joint: String,
    up_axis: usize,
    clearance: f64,
    reference_height: f64,
}

impl EndOfArmKeepOut {
    /// Registry identifier.
    pub const KIND: &'static str = "end_of_arm_keep_out";

    /// Parameter keys this model accepts.
    pub const PARAMS: [&'static str; 5] = ["tool_link", "clearance", "reference_height", "up_axis", "lift_joint"];

    /// Registry factory.
    ///
    /// Defaults apply only to absent keys; any other parameter problem is
    /// fatal.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::ModelInstantiation`] when
    ///
    /// - no kinematic tree was supplied;
    /// - a parameter key is not one of [`Self::PARAMS`];
    /// - a parameter holds the wrong type or a non-finite number;
    /// - `tool_link` is missing or unknown to the tree;
    /// - `up_axis` is not one of `x`, `y`, `z`;
    /// - `lift_joint` is not a joint the manager installs limits on.
    pub fn factory(ctx: &ModelContext<'_>) -> Result<Box<dyn CollisionModel>, GuardError> {
        let tree = ctx.require_kinematics()?;
        let entry = ctx.entry;
        entry.check_params(&Self::PARAMS)?;

        let tool_link = entry.require_text("tool_link")?;
        if !tree.has_link(tool_link) {
            return Err(ctx.instantiation_error(format!(
                "tool link `{tool_link}` is not part of the kinematic tree"
            )));
        }

        let up_axis = match entry.text_or("up_axis", "y")? {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            other => {
                return Err(ctx.instantiation_error(format!(
                    "`up_axis` must be x, y or z, got `{other}`"
                )));
            }
        };

        let lift_joint = entry.text_or("lift_joint", joints::LIFT)?;
        if !ctx.joints.iter().any(|j| j.as_str() == lift_joint) {
            return Err(ctx.instantiation_error(format!(
                "lift joint `{lift_joint}` is not a known joint"
            )));
        }

        Ok(Box::new(Self {
            name: ctx.name().to_string(),
            solver: ChainSolver::new(tree),
            tool_link: tool_link.to_string(),
            lift_joint: lift_joint.to_string(),
            up_axis,
            clearance: entry.number_or("clearance", DEFAULT_CLEARANCE)?,
            reference_height: entry.number_or("reference_height", 0.0)?,
        }))
    }

    /// Lowest lift position that keeps the tip at `clearance` for the given
    /// snapshot, or `None` when the tip cannot be located.
    pub fn minimum_lift(&self, status: &RobotStatus) -> Option<f64> {
        let config = self.solver.config_from_status(status);
        let pose = self.solver.transform_to_reference(&config, &self.tool_link)?;
        let tip_height = pose.translation()[self.up_axis];
        Some(self.clearance - self.reference_height - tip_height)
    }
}

impl CollisionModel for EndOfArmKeepOut {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, status: &RobotStatus) -> Result<JointLimitTable, GuardError> {
        let mut table = JointLimitTable::new();
        match self.minimum_lift(status) {
            Some(min_lift) => table.set(self.lift_joint.as_str(), JointRange::at_least(min_lift)),
            None => debug!(
                model = %self.name,
                tool_link = %self.tool_link,
                "tool link not reachable from reference link; no constraint"
            ),
        }
        Ok(table)
    }
}
