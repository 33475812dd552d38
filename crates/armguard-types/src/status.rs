//! [`RobotStatus`] – immutable snapshot of every joint at the start of a
//! cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::JointId;

/// Position (and optionally velocity) of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointState {
    pub position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
}

impl JointState {
    pub fn at(position: f64) -> Self {
        Self {
            position,
            velocity: None,
        }
    }
}

/// Robot status snapshot read once per arbitration cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotStatus {
    pub timestamp: DateTime<Utc>,
    joints: BTreeMap<JointId, JointState>,
}

impl Default for RobotStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotStatus {
    /// An empty snapshot stamped with the current time.
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            joints: BTreeMap::new(),
        }
    }

    /// Builder: record `joint` at `position` with unknown velocity.
    pub fn with_joint(self, joint: impl Into<JointId>, position: f64) -> Self {
        self.with_joint_state(joint, JointState::at(position))
    }

    pub fn with_joint_state(mut self, joint: impl Into<JointId>, state: JointState) -> Self {
        self.joints.insert(joint.into(), state);
        self
    }

    pub fn joint(&self, joint: &str) -> Option<&JointState> {
        self.joints.get(joint)
    }

    pub fn position(&self, joint: &str) -> Option<f64> {
        self.joint(joint).map(|s| s.position)
    }

    pub fn velocity(&self, joint: &str) -> Option<f64> {
        self.joint(joint).and_then(|s| s.velocity)
    }

    pub fn joints(&self) -> impl Iterator<Item = (&JointId, &JointState)> {
        self.joints.iter()
    }
}
