//! [`SimRobot`] – in-process simulated robot for tests and CI.
//!
//! Builds a [`StatusSource`] and an [`ActuatorRegistry`] whose every sink is
//! a stub writing into shared state.  The same [`SimRobot`] handle lets a
//! test move joints between cycles and read back the soft limits the manager
//! installed, without any physical hardware.
//!
//! # Stub behaviour
//!
//! | Seam | Stub behaviour |
//! |---|---|
//! | [`StatusSource`] | Returns a fresh snapshot of the simulated joint positions; fails with [`GuardError::Status`] while offline. |
//! | [`SoftLimitSink`] | Stores the last `(lower, upper)` pair and counts pushes. |
//!
//! # Example
//!
//! ```rust
//! use armguard_hal::SimRobot;
//! use armguard_types::JointRange;
//!
//! let robot = SimRobot::builder()
//!     .with_joint("lift", 0.6)
//!     .with_joint("arm", 0.1)
//!     .build();
//!
//! let mut actuators = robot.actuators();
//! actuators.push("lift", JointRange::at_least(0.2));
//! assert_eq!(robot.soft_limits("lift"), Some((Some(0.2), None)));
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use armguard_types::{GuardError, JointState, RobotStatus};

use crate::limits::SoftLimitSink;
use crate::registry::ActuatorRegistry;
use crate::status::StatusSource;

type Limits = (Option<f64>, Option<f64>);

#[derive(Debug, Default)]
struct SimState {
    joints: BTreeMap<String, JointState>,
    limits: BTreeMap<String, Limits>,
    pushes: BTreeMap<String, usize>,
    offline: bool,
}

/// Shared handle to a simulated robot.  Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SimRobot {
    state: Arc<Mutex<SimState>>,
}

impl SimRobot {
    /// Create a new builder with no joints.
    pub fn builder() -> SimRobotBuilder {
        SimRobotBuilder::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Status source reading this robot's joints.
    pub fn status_source(&self) -> Box<dyn StatusSource> {
        Box::new(StubStatus { robot: self.clone() })
    }

    /// Registry with one stub sink per simulated joint.
    pub fn actuators(&self) -> ActuatorRegistry {
        let mut registry = ActuatorRegistry::new();
        let joints: Vec<String> = self.lock().joints.keys().cloned().collect();
        for joint in joints {
            registry.register(Box::new(StubSink {
                joint,
                robot: self.clone(),
            }));
        }
        registry
    }

    /// Move `joint` to `position`, adding it if unknown.
    pub fn set_position(&self, joint: &str, position: f64) {
        self.lock()
            .joints
            .entry(joint.to_string())
            .or_default()
            .position = position;
    }

    /// Make the status source fail (`true`) or recover (`false`).
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Last soft limits installed on `joint`, if any were pushed.
    pub fn soft_limits(&self, joint: &str) -> Option<Limits> {
        self.lock().limits.get(joint).copied()
    }

    /// Number of times limits were pushed to `joint`.
    pub fn push_count(&self, joint: &str) -> usize {
        self.lock().pushes.get(joint).copied().unwrap_or(0)
    }
}

/// Builder for [`SimRobot`].
#[derive(Debug, Default)]
pub struct SimRobotBuilder {
    joints: BTreeMap<String, JointState>,
}

impl SimRobotBuilder {
    /// Add a simulated joint at `position`.
    pub fn with_joint(mut self, joint: impl Into<String>, position: f64) -> Self {
        self.joints.insert(joint.into(), JointState::at(position));
        self
    }

    /// Add every joint in `joints` at position zero.
    pub fn with_joints<I, S>(mut self, joints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for joint in joints {
            self.joints.entry(joint.into()).or_default();
        }
        self
    }

    pub fn build(self) -> SimRobot {
        SimRobot {
            state: Arc::new(Mutex::new(SimState {
                joints: self.joints,
                ..SimState::default()
            })),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stubs
// ─────────────────────────────────────────────────────────────────────────────

struct StubStatus {
    robot: SimRobot,
}

impl StatusSource for StubStatus {
    fn status(&self) -> Result<RobotStatus, GuardError> {
        let state = self.robot.lock();
        if state.offline {
            return Err(GuardError::Status("simulated robot is offline".into()));
        }
        Ok(state
            .joints
            .iter()
            .fold(RobotStatus::new(), |status, (joint, js)| {
                status.with_joint_state(joint.as_str(), *js)
            }))
    }
}

struct StubSink {
    joint: String,
    robot: SimRobot,
}

impl SoftLimitSink for StubSink {
    fn joint(&self) -> &str {
        &self.joint
    }

    fn set_soft_limits(&mut self, lower: Option<f64>, upper: Option<f64>) {
        let mut state = self.robot.lock();
        state.limits.insert(self.joint.clone(), (lower, upper));
        *state.pushes.entry(self.joint.clone()).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armguard_types::{JointLimitTable, JointRange};

    #[test]
    fn status_reflects_position_updates() {
        let robot = SimRobot::builder().with_joint("lift", 0.2).build();
        let source = robot.status_source();
        assert_eq!(source.status().unwrap().position("lift"), Some(0.2));

        robot.set_position("lift", 0.9);
        assert_eq!(source.status().unwrap().position("lift"), Some(0.9));
    }

    #[test]
    fn offline_robot_fails_status_read() {
        let robot = SimRobot::builder().with_joint("lift", 0.2).build();
        let source = robot.status_source();
        robot.set_offline(true);
        assert!(matches!(source.status(), Err(GuardError::Status(_))));
        robot.set_offline(false);
        assert!(source.status().is_ok());
    }

    #[test]
    fn sinks_record_limits_and_counts() {
        let robot = SimRobot::builder()
            .with_joints(["head_pan", "head_tilt"])
            .build();
        let mut actuators = robot.actuators();
        let table = JointLimitTable::seeded(["head_pan", "head_tilt"])
            .with("head_tilt", JointRange::bounded(-0.5, 0.2));

        actuators.apply(&table);
        actuators.apply(&table);

        assert_eq!(robot.soft_limits("head_pan"), Some((None, None)));
        assert_eq!(robot.soft_limits("head_tilt"), Some((Some(-0.5), Some(0.2))));
        assert_eq!(robot.push_count("head_tilt"), 2);
        assert_eq!(robot.soft_limits("arm"), None);
    }
}
