//! Already-parsed kinematic topology and the providers that supply it.
//!
//! A [`Topology`] is a flat list of link names and [`JointSpec`]s plus the
//! name of the reference link chain computations stop at.  It is input only:
//! [`KinematicTree::build`][crate::tree::KinematicTree::build] validates it
//! and turns it into the indexed tree the solver walks.
//!
//! Topologies reach the core through a [`TopologyProvider`].  The
//! [`FileTopologyProvider`] reads the TOML form from an explicit path:
//!
//! ```toml
//! links = ["base_link", "link_arm_l0", "link_wrist"]
//! reference_link = "link_arm_l0"
//!
//! [[joints]]
//! name = "wrist_yaw"
//! parent = "link_arm_l0"
//! child = "link_wrist"
//! kind = "revolute"
//! axis = [0.0, 0.0, 1.0]
//! origin = { xyz = [0.1, 0.0, 0.0], rpy = [0.0, 0.0, 0.0] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use armguard_types::GuardError;
use serde::{Deserialize, Serialize};

use crate::transform::Transform;

/// How a joint moves its child link relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    #[default]
    Fixed,
    /// Bounded rotation about `axis`.
    Revolute,
    /// Unbounded rotation about `axis`.
    Continuous,
    /// Translation along `axis`.
    Prismatic,
}

/// Static placement of a joint frame in its parent link frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl Origin {
    pub fn to_transform(self) -> Transform {
        Transform::from_origin(self.xyz, self.rpy)
    }
}

fn default_axis() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

/// One edge of the kinematic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,
    pub parent: String,
    pub child: String,
    #[serde(default)]
    pub kind: JointKind,
    #[serde(default)]
    pub origin: Origin,
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
}

impl JointSpec {
    /// A fixed joint with identity origin; adjust with the builder methods.
    pub fn fixed(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            child: child.into(),
            kind: JointKind::Fixed,
            origin: Origin::default(),
            axis: default_axis(),
        }
    }

    pub fn with_kind(mut self, kind: JointKind, axis: [f64; 3]) -> Self {
        self.kind = kind;
        self.axis = axis;
        self
    }

    pub fn with_origin(mut self, xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        self.origin = Origin { xyz, rpy };
        self
    }
}

/// A parsed link/joint graph with its designated reference link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub links: Vec<String>,
    #[serde(default)]
    pub joints: Vec<JointSpec>,
    pub reference_link: String,
}

impl Topology {
    /// Parse the TOML form.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Topology`] when the document is malformed.
    pub fn from_toml_str(raw: &str) -> Result<Self, GuardError> {
        toml::from_str(raw).map_err(|e| GuardError::Topology(format!("failed to parse topology: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Providers
// ────────────────────────────────────────────────────────────────────────────

/// Supplies the parsed topology at construction time.
pub trait TopologyProvider {
    /// # Errors
    ///
    /// Returns [`GuardError::Topology`] when no topology can be produced.
    fn topology(&self) -> Result<Topology, GuardError>;
}

/// An in-memory topology is its own provider.
impl TopologyProvider for Topology {
    fn topology(&self) -> Result<Topology, GuardError> {
        Ok(self.clone())
    }
}

/// Reads a TOML topology from an explicitly configured path.
#[derive(Debug, Clone)]
pub struct FileTopologyProvider {
    path: PathBuf,
}

impl FileTopologyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TopologyProvider for FileTopologyProvider {
    fn topology(&self) -> Result<Topology, GuardError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            GuardError::Topology(format!("failed to read {}: {e}", self.path.display()))
        })?;
        Topology::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WRIST: &str = r#"
        links = ["link_arm_l0", "link_wrist"]
        reference_link = "link_arm_l0"

        [[joints]]
        name = "wrist_yaw"
        parent = "link_arm_l0"
        child = "link_wrist"
        kind = "revolute"
        axis = [0.0, 0.0, 1.0]
        origin = { xyz = [0.1, 0.0, 0.0] }
    "#;

    #[test]
    fn parses_toml_with_defaults() {
        let topo = Topology::from_toml_str(WRIST).unwrap();
        assert_eq!(topo.reference_link, "link_arm_l0");
        let joint = &topo.joints[0];
        assert_eq!(joint.kind, JointKind::Revolute);
        assert_eq!(joint.origin.xyz, [0.1, 0.0, 0.0]);
        assert_eq!(joint.origin.rpy, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_kind_defaults_to_fixed() {
        let topo = Topology::from_toml_str(
            r#"
            links = ["a", "b"]
            reference_link = "a"
            [[joints]]
            name = "a_to_b"
            parent = "a"
            child = "b"
            "#,
        )
        .unwrap();
        assert_eq!(topo.joints[0].kind, JointKind::Fixed);
        assert_eq!(topo.joints[0].axis, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn malformed_toml_is_topology_error() {
        let err = Topology::from_toml_str("links = 3").unwrap_err();
        assert!(matches!(err, GuardError::Topology(_)));
    }

    #[test]
    fn file_provider_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(WRIST.as_bytes()).unwrap();
        let provider = FileTopologyProvider::new(file.path());
        let topo = provider.topology().unwrap();
        assert_eq!(topo.links.len(), 2);
    }

    #[test]
    fn file_provider_missing_file_is_error() {
        let provider = FileTopologyProvider::new("/nonexistent/armguard/topology.toml");
        assert!(matches!(provider.topology(), Err(GuardError::Topology(_))));
    }
}
