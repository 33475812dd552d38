//! `armguard-kinematics` – minimal kinematic tree and chain solver.
//!
//! Collision models use this crate to reason about tool-tip geometry.  It
//! deliberately supports only what arbitration needs: an immutable tree built
//! from an already-parsed topology, and forward kinematics that can halt at an
//! intermediate reference link.
//!
//! # Modules
//!
//! - [`transform`] – [`Transform`]: 4×4 homogeneous rigid transform.
//! - [`topology`] – [`Topology`] input description and the
//!   [`TopologyProvider`] seam, including [`FileTopologyProvider`].
//! - [`tree`] – [`KinematicTree`]: validated, index-addressed link/joint graph
//!   with precomputed paths to the root.
//! - [`solver`] – [`ChainSolver`]: `transform(config, target, reference)`.

pub mod solver;
pub mod topology;
pub mod transform;
pub mod tree;

pub use solver::{ChainSolver, JointConfig};
pub use topology::{FileTopologyProvider, JointKind, JointSpec, Origin, Topology, TopologyProvider};
pub use transform::Transform;
pub use tree::{Joint, KinematicTree};

use std::sync::Arc;

use armguard_types::GuardError;

/// Fetch a topology from `provider` and build a shareable tree from it.
///
/// # Errors
///
/// Propagates provider failures and topology validation errors.
pub fn load_tree(provider: &dyn TopologyProvider) -> Result<Arc<KinematicTree>, GuardError> {
    let topology = provider.topology()?;
    Ok(Arc::new(KinematicTree::build(&topology)?))
}
