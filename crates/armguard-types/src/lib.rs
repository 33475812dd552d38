//! `armguard-types` – shared data model for the ArmGuard arbitration stack.
//!
//! Every other crate in the workspace speaks in terms of these types: a
//! collision model returns a [`JointLimitTable`], the manager reads a
//! [`RobotStatus`], and actuator sinks receive the bounds of a
//! [`JointRange`].
//!
//! # Modules
//!
//! - [`range`] – [`Bound`] and [`JointRange`]: an explicit tagged union for
//!   "concrete value or defer to the factory hard limit".
//! - [`table`] – [`JointLimitTable`]: per-joint ranges plus the conservative
//!   merge used to combine model outputs.
//! - [`status`] – [`RobotStatus`]: the read-only snapshot a cycle runs on.
//! - [`model`] – [`ModelEntry`]: configuration record for one collision model.
//! - [`fault`] – [`ModelFault`]: observability record for a model that failed
//!   during a cycle.
//! - [`error`] – [`GuardError`]: the single error type of the workspace.

pub mod error;
pub mod fault;
pub mod model;
pub mod range;
pub mod status;
pub mod table;

pub use error::GuardError;
pub use fault::ModelFault;
pub use model::{ModelEntry, ParamValue};
pub use range::{Bound, JointRange};
pub use status::{JointState, RobotStatus};
pub use table::{JointId, JointLimitTable};

/// Well-known joint identifiers of the mobile manipulator.
pub mod joints {
    pub const LIFT: &str = "lift";
    pub const ARM: &str = "arm";
    pub const HEAD_PAN: &str = "head_pan";
    pub const HEAD_TILT: &str = "head_tilt";
    pub const WRIST_YAW: &str = "wrist_yaw";

    /// Joints present on every robot regardless of the attached end-of-arm
    /// tool.
    pub const STATIC: [&str; 4] = [HEAD_PAN, HEAD_TILT, LIFT, ARM];
}
