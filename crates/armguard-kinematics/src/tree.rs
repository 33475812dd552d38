//! [`KinematicTree`] – immutable, index-addressed link/joint graph.
//!
//! Built once from a [`Topology`] and never mutated afterwards, so it can be
//! shared between collision models behind an `Arc` without locking.  Links
//! and joints are stored in vectors and addressed by small integer indices;
//! every link's path to the root is precomputed at build time.

use std::collections::HashMap;

use armguard_types::GuardError;
use tracing::debug;

use crate::topology::{JointKind, Topology};
use crate::transform::Transform;

#[derive(Debug, Clone)]
struct Link {
    name: String,
    /// Index of the joint whose child is this link; `None` for the root.
    parent_joint: Option<usize>,
}

/// A joint edge with its static origin and unit motion axis.
#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    kind: JointKind,
    pub(crate) parent: usize,
    origin: Transform,
    axis: [f64; 3],
}

impl Joint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    /// Pose of the child link in the parent link frame at joint value
    /// `value` (rad for rotational joints, m for prismatic ones).  Fixed
    /// joints ignore the value.
    pub fn child_pose(&self, value: f64) -> Transform {
        match self.kind {
            JointKind::Fixed => self.origin,
            JointKind::Revolute | JointKind::Continuous => {
                self.origin * Transform::from_axis_angle(self.axis, value)
            }
            JointKind::Prismatic => {
                let [x, y, z] = self.axis;
                self.origin * Transform::from_translation([x * value, y * value, z * value])
            }
        }
    }
}

/// Validated kinematic tree with precomputed paths to the root.
#[derive(Debug, Clone)]
pub struct KinematicTree {
    links: Vec<Link>,
    joints: Vec<Joint>,
    link_index: HashMap<String, usize>,
    joint_index: HashMap<String, usize>,
    root: usize,
    reference: usize,
    /// `paths[link]` = joint indices from `link` up to the root.
    paths: Vec<Vec<usize>>,
}

impl KinematicTree {
    /// Validate `topology` and build the indexed tree.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Topology`] when link names repeat, a joint
    /// references an unknown link, a link has two parent joints, the graph
    /// has zero or several roots or contains a cycle, or the reference link
    /// is unknown.
    pub fn build(topology: &Topology) -> Result<Self, GuardError> {
        let mut links = Vec::with_capacity(topology.links.len());
        let mut link_index = HashMap::with_capacity(topology.links.len());
        for name in &topology.links {
            if link_index.insert(name.clone(), links.len()).is_some() {
                return Err(GuardError::Topology(format!("duplicate link `{name}`")));
            }
            links.push(Link {
                name: name.clone(),
                parent_joint: None,
            });
        }

        let lookup = |name: &str, joint: &str| {
            link_index.get(name).copied().ok_or_else(|| {
                GuardError::Topology(format!("joint `{joint}` references unknown link `{name}`"))
            })
        };

        let mut joints = Vec::with_capacity(topology.joints.len());
        let mut joint_index = HashMap::with_capacity(topology.joints.len());
        for spec in &topology.joints {
            let parent = lookup(&spec.parent, &spec.name)?;
            let child = lookup(&spec.child, &spec.name)?;
            if joint_index.insert(spec.name.clone(), joints.len()).is_some() {
                return Err(GuardError::Topology(format!("duplicate joint `{}`", spec.name)));
            }
            if links[child].parent_joint.is_some() {
                return Err(GuardError::Topology(format!(
                    "link `{}` has more than one parent joint",
                    spec.child
                )));
            }
            let axis = match spec.kind {
                JointKind::Fixed => spec.axis,
                _ => unit_axis(spec.axis).ok_or_else(|| {
                    GuardError::Topology(format!("joint `{}` has a zero-length axis", spec.name))
                })?,
            };
            links[child].parent_joint = Some(joints.len());
            joints.push(Joint {
                name: spec.name.clone(),
                kind: spec.kind,
                parent,
                origin: spec.origin.to_transform(),
                axis,
            });
        }

        let roots: Vec<usize> = (0..links.len())
            .filter(|&i| links[i].parent_joint.is_none())
            .collect();
        let root = match roots.as_slice() {
            [root] => *root,
            [] => return Err(GuardError::Topology("topology has no root link".into())),
            many => {
                let names: Vec<&str> = many.iter().map(|&i| links[i].name.as_str()).collect();
                return Err(GuardError::Topology(format!(
                    "topology has several root links: {}",
                    names.join(", ")
                )));
            }
        };

        let reference = link_index.get(&topology.reference_link).copied().ok_or_else(|| {
            GuardError::Topology(format!(
                "reference link `{}` is not part of the topology",
                topology.reference_link
            ))
        })?;

        let mut paths = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            let mut path = Vec::new();
            let mut current = i;
            while let Some(j) = links[current].parent_joint {
                if path.len() >= joints.len() {
                    return Err(GuardError::Topology(format!(
                        "cycle detected above link `{}`",
                        link.name
                    )));
                }
                path.push(j);
                current = joints[j].parent;
            }
            paths.push(path);
        }

        debug!(
            links = links.len(),
            joints = joints.len(),
            root = %links[root].name,
            reference = %topology.reference_link,
            "kinematic tree built"
        );

        Ok(Self {
            links,
            joints,
            link_index,
            joint_index,
            root,
            reference,
            paths,
        })
    }

    pub fn root_link(&self) -> &str {
        &self.links[self.root].name
    }

    /// The designated link chain computations stop at by default.
    pub fn reference_link(&self) -> &str {
        &self.links[self.reference].name
    }

    pub fn has_link(&self, name: &str) -> bool {
        self.link_index.contains_key(name)
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joint_index.get(name).map(|&i| &self.joints[i])
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|j| j.name.as_str())
    }

    /// Names of the joints traversed from `link` up to the root.
    pub fn path_to_root(&self, link: &str) -> Option<Vec<&str>> {
        let &i = self.link_index.get(link)?;
        Some(self.paths[i].iter().map(|&j| self.joints[j].name.as_str()).collect())
    }

    pub(crate) fn link_id(&self, name: &str) -> Option<usize> {
        self.link_index.get(name).copied()
    }

    pub(crate) fn path_joints(&self, link: usize) -> impl Iterator<Item = &Joint> {
        self.paths[link].iter().map(|&j| &self.joints[j])
    }

    pub(crate) fn reference_id(&self) -> usize {
        self.reference
    }
}

fn unit_axis([x, y, z]: [f64; 3]) -> Option<[f64; 3]> {
    let n = (x * x + y * y + z * z).sqrt();
    (n > f64::EPSILON).then(|| [x / n, y / n, z / n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::JointSpec;

    fn topology(links: &[&str], joints: Vec<JointSpec>, reference: &str) -> Topology {
        Topology {
            links: links.iter().map(|s| s.to_string()).collect(),
            joints,
            reference_link: reference.to_string(),
        }
    }

    fn chain() -> Topology {
        topology(
            &["base", "mast", "arm", "tip"],
            vec![
                JointSpec::fixed("base_to_mast", "base", "mast"),
                JointSpec::fixed("lift", "mast", "arm")
                    .with_kind(JointKind::Prismatic, [0.0, 0.0, 1.0]),
                JointSpec::fixed("wrist", "arm", "tip")
                    .with_kind(JointKind::Revolute, [0.0, 0.0, 2.0]),
            ],
            "mast",
        )
    }

    #[test]
    fn builds_paths_to_root() {
        let tree = KinematicTree::build(&chain()).unwrap();
        assert_eq!(tree.root_link(), "base");
        assert_eq!(tree.reference_link(), "mast");
        assert_eq!(
            tree.path_to_root("tip").unwrap(),
            vec!["wrist", "lift", "base_to_mast"]
        );
        assert!(tree.path_to_root("base").unwrap().is_empty());
        assert!(tree.path_to_root("ghost").is_none());
    }

    #[test]
    fn prismatic_child_pose_moves_along_axis() {
        let tree = KinematicTree::build(&chain()).unwrap();
        let pose = tree.joint("lift").unwrap().child_pose(0.4);
        assert_eq!(pose.translation(), [0.0, 0.0, 0.4]);
    }

    #[test]
    fn fixed_joint_ignores_value() {
        let tree = KinematicTree::build(&chain()).unwrap();
        let j = tree.joint("base_to_mast").unwrap();
        assert_eq!(j.child_pose(5.0), j.child_pose(0.0));
    }

    #[test]
    fn duplicate_link_rejected() {
        let err = KinematicTree::build(&topology(&["a", "a"], vec![], "a")).unwrap_err();
        assert!(err.to_string().contains("duplicate link"));
    }

    #[test]
    fn unknown_link_in_joint_rejected() {
        let topo = topology(&["a"], vec![JointSpec::fixed("j", "a", "ghost")], "a");
        assert!(KinematicTree::build(&topo).unwrap_err().to_string().contains("ghost"));
    }

    #[test]
    fn second_parent_rejected() {
        let topo = topology(
            &["a", "b", "c"],
            vec![JointSpec::fixed("j1", "a", "c"), JointSpec::fixed("j2", "b", "c")],
            "a",
        );
        assert!(KinematicTree::build(&topo).is_err());
    }

    #[test]
    fn several_roots_rejected() {
        let topo = topology(&["a", "b"], vec![], "a");
        assert!(
            KinematicTree::build(&topo)
                .unwrap_err()
                .to_string()
                .contains("several root")
        );
    }

    #[test]
    fn cycle_rejected() {
        let topo = topology(
            &["a", "b", "c"],
            vec![JointSpec::fixed("bc", "b", "c"), JointSpec::fixed("cb", "c", "b")],
            "a",
        );
        assert!(KinematicTree::build(&topo).unwrap_err().to_string().contains("cycle"));
    }

    #[test]
    fn unknown_reference_rejected() {
        let mut topo = chain();
        topo.reference_link = "nowhere".into();
        assert!(KinematicTree::build(&topo).is_err());
    }

    #[test]
    fn zero_axis_on_moving_joint_rejected() {
        let topo = topology(
            &["a", "b"],
            vec![JointSpec::fixed("j", "a", "b").with_kind(JointKind::Revolute, [0.0; 3])],
            "a",
        );
        assert!(KinematicTree::build(&topo).is_err());
    }
}
