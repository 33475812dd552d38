//! `armguard-kernel` – Collision Arbitration
//!
//! The safety core of ArmGuard.  It does not plan motion; it decides, once per
//! control cycle, how far every joint may travel.
//!
//! # Modules
//!
//! - [`model`] – [`CollisionModel`][model::CollisionModel]: the pluggable
//!   contract every collision rule implements, plus the reference
//!   [`OpenModel`][model::OpenModel] that constrains nothing.
//! - [`keep_out`] – [`EndOfArmKeepOut`][keep_out::EndOfArmKeepOut]: uses the
//!   kinematic chain solver to keep the tool tip above a clearance height.
//! - [`registry`] – [`ModelRegistry`][registry::ModelRegistry]: maps
//!   configured model kinds to factory functions.
//! - [`conflict`] – [`ConflictPolicy`][conflict::ConflictPolicy]: the
//!   deterministic resolution applied when merged bounds cross.
//! - [`manager`] – [`CollisionManager`][manager::CollisionManager]: loads the
//!   enabled models and drives the snapshot → models → merge → actuator cycle.

pub mod conflict;
pub mod keep_out;
pub mod manager;
pub mod model;
pub mod registry;

pub use conflict::{ConflictPolicy, JointConflict};
pub use keep_out::EndOfArmKeepOut;
pub use manager::{CollisionManager, CycleReport, ManagerState};
pub use model::{CollisionModel, ModelContext, OpenModel};
pub use registry::{ModelFactory, ModelRegistry};
