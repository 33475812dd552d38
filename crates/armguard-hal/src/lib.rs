//! `armguard-hal` – hardware-facing seams of the arbitration core.
//!
//! The core never talks to a serial port or a motor controller directly.  It
//! reads a [`RobotStatus`][armguard_types::RobotStatus] through a
//! [`StatusSource`] and writes soft limits through per-joint
//! [`SoftLimitSink`]s collected in an [`ActuatorRegistry`].  Real drivers
//! implement these traits; [`sim::SimRobot`] provides in-process stubs for
//! tests and CI.
//!
//! # Modules
//!
//! - [`limits`] – [`SoftLimitSink`]: `set_soft_limits(lower, upper)`.
//! - [`status`] – [`StatusSource`]: synchronous status snapshot read.
//! - [`registry`] – [`ActuatorRegistry`]: joint → sink routing.
//! - [`sim`] – [`SimRobot`][sim::SimRobot]: stub status source and sinks
//!   backed by shared state that tests can inspect.

pub mod limits;
pub mod registry;
pub mod sim;
pub mod status;

pub use limits::SoftLimitSink;
pub use registry::ActuatorRegistry;
pub use sim::SimRobot;
pub use status::StatusSource;
