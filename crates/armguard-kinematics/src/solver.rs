//! [`ChainSolver`] – forward kinematics that stops at a reference link.
//!
//! Walks the precomputed path from a target link toward the root, composing
//! each joint's child pose on the left, and returns as soon as the parent of
//! the last traversed joint is the reference link.  Stopping early keeps the
//! computation local to the part of the arm a collision model cares about
//! (e.g. the wrist relative to the first arm cuff) instead of the whole tree.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use armguard_kinematics::{ChainSolver, JointConfig, JointKind, JointSpec, KinematicTree, Topology};
//!
//! let topology = Topology {
//!     links: vec!["arm".into(), "wrist".into()],
//!     joints: vec![
//!         JointSpec::fixed("wrist_yaw", "arm", "wrist")
//!             .with_kind(JointKind::Revolute, [0.0, 0.0, 1.0])
//!             .with_origin([0.2, 0.0, 0.0], [0.0, 0.0, 0.0]),
//!     ],
//!     reference_link: "arm".into(),
//! };
//! let solver = ChainSolver::new(Arc::new(KinematicTree::build(&topology).unwrap()));
//!
//! let pose = solver.transform_to_reference(&JointConfig::new(), "wrist").unwrap();
//! assert_eq!(pose.translation(), [0.2, 0.0, 0.0]);
//! assert!(solver.transform(&JointConfig::new(), "arm", "wrist").is_none());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use armguard_types::RobotStatus;

use crate::transform::Transform;
use crate::tree::KinematicTree;

/// Partial joint configuration; joints absent from the map sit at their
/// nominal value of zero.
pub type JointConfig = BTreeMap<String, f64>;

/// Forward-kinematics solver over a shared, immutable [`KinematicTree`].
#[derive(Debug, Clone)]
pub struct ChainSolver {
    tree: Arc<KinematicTree>,
}

impl ChainSolver {
    pub fn new(tree: Arc<KinematicTree>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &KinematicTree {
        &self.tree
    }

    /// Pose of `target_link` expressed in `reference_link`.
    ///
    /// Returns `None` when either link is unknown or `reference_link` is not
    /// an ancestor of `target_link`.  A link is its own reference at the
    /// identity transform.
    pub fn transform(
        &self,
        config: &JointConfig,
        target_link: &str,
        reference_link: &str,
    ) -> Option<Transform> {
        let target = self.tree.link_id(target_link)?;
        let reference = self.tree.link_id(reference_link)?;
        self.walk(config, target, reference)
    }

    /// Pose of `target_link` in the tree's designated reference link.
    pub fn transform_to_reference(&self, config: &JointConfig, target_link: &str) -> Option<Transform> {
        let target = self.tree.link_id(target_link)?;
        self.walk(config, target, self.tree.reference_id())
    }

    /// Build a configuration from every status joint whose name matches a
    /// joint of the tree.
    pub fn config_from_status(&self, status: &RobotStatus) -> JointConfig {
        status
            .joints()
            .filter(|(id, _)| self.tree.joint(id.as_str()).is_some())
            .map(|(id, state)| (id.to_string(), state.position))
            .collect()
    }

    fn walk(&self, config: &JointConfig, target: usize, reference: usize) -> Option<Transform> {
        if target == reference {
            return Some(Transform::identity());
        }
        let mut pose = Transform::identity();
        for joint in self.tree.path_joints(target) {
            let value = config.get(joint.name()).copied().unwrap_or(0.0);
            pose = joint.child_pose(value) * pose;
            if joint.parent == reference {
                return Some(pose);
            }
        }
        None
    }
}
