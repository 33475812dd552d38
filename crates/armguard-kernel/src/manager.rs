//! [`CollisionManager`] – owns the enabled models and drives arbitration.
//!
//! One call to [`CollisionManager::step`] is one arbitration cycle:
//!
//! 1. Read a [`RobotStatus`] from the [`StatusSource`].
//! 2. Seed a table with every known joint unconstrained.
//! 3. Run every model on the snapshot.  A model that errors, panics, or
//!    returns an invalid table is faulted for this cycle and its output is
//!    discarded.
//! 4. Intersect the surviving outputs joint by joint.
//! 5. Resolve inverted ranges with the configured [`ConflictPolicy`].
//! 6. Push every joint's range to its [`SoftLimitSink`][armguard_hal::SoftLimitSink].
//!
//! Models never see each other's output, so evaluation order does not affect
//! the result.
//!
//! Panics are caught with [`std::panic::catch_unwind`], which does not
//! silence the process panic hook: with the default hook a model that panics
//! every cycle also writes to stderr every cycle.  Processes should install a
//! hook that logs through `tracing` (`armguard_runtime::install_panic_hook`
//! does this).
//!
//! # Example
//!
//! ```rust
//! use armguard_hal::SimRobot;
//! use armguard_kernel::{CollisionManager, ModelRegistry};
//! use armguard_types::{ModelEntry, joints};
//!
//! let robot = SimRobot::builder().with_joints(joints::STATIC).build();
//! let mut manager = CollisionManager::new(robot.status_source(), robot.actuators());
//! manager.load(&[ModelEntry::new("open")], &ModelRegistry::builtin()).unwrap();
//!
//! let report = manager.step().unwrap();
//! assert_eq!(report.cycle, 1);
//! assert!(report.faults.is_empty());
//! assert_eq!(robot.soft_limits("lift"), Some((None, None)));
//! ```

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use armguard_hal::{ActuatorRegistry, StatusSource};
use armguard_kinematics::KinematicTree;
use armguard_types::{
    GuardError, JointId, JointLimitTable, ModelEntry, ModelFault, RobotStatus, joints,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::conflict::{ConflictPolicy, JointConflict};
use crate::model::{CollisionModel, ModelContext};
use crate::registry::ModelRegistry;

/// Most recent faults kept by [`CollisionManager::faults`].
const FAULT_LOG_CAPACITY: usize = 256;

// ────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// Manager lifecycle: `Unstarted` → `Running` (after a successful load) →
/// `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerState {
    Unstarted,
    Running,
    Stopped,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ManagerState::Unstarted => "unstarted",
            ManagerState::Running => "running",
            ManagerState::Stopped => "stopped",
        })
    }
}

/// Outcome of one arbitration cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 1-based cycle counter.
    pub cycle: u64,
    /// Capture time of the snapshot the cycle ran on.
    pub timestamp: DateTime<Utc>,
    /// Merged and conflict-resolved limits, one entry per known joint.
    pub limits: JointLimitTable,
    pub faults: Vec<ModelFault>,
    pub conflicts: Vec<JointConflict>,
    /// Number of sinks that received limits.
    pub installed: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// CollisionManager
// ────────────────────────────────────────────────────────────────────────────

/// Loads the configured collision models and arbitrates their proposals into
/// the soft limits installed on the actuators.
pub struct CollisionManager {
    state: ManagerState,
    status_source: Box<dyn StatusSource>,
    actuators: ActuatorRegistry,
    static_joints: Vec<JointId>,
    end_of_arm_joints: Vec<JointId>,
    policy: ConflictPolicy,
    kinematics: Option<Arc<KinematicTree>>,
    models: Vec<Box<dyn CollisionModel>>,
    cycle: u64,
    faults: VecDeque<ModelFault>,
}

impl CollisionManager {
    /// A manager over the default static joints, with no end-of-arm joints,
    /// the [`ConflictPolicy::Clamp`] policy and no kinematic tree.
    pub fn new(status_source: Box<dyn StatusSource>, actuators: ActuatorRegistry) -> Self {
        Self {
            state: ManagerState::Unstarted,
            status_source,
            actuators,
            static_joints: joints::STATIC.iter().map(|&j| JointId::from(j)).collect(),
            end_of_arm_joints: Vec::new(),
            policy: ConflictPolicy::default(),
            kinematics: None,
            models: Vec::new(),
            cycle: 0,
            faults: VecDeque::new(),
        }
    }

    /// Replace the static joint set.
    pub fn with_static_joints<I, J>(mut self, joints: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: Into<JointId>,
    {
        self.static_joints = joints.into_iter().map(Into::into).collect();
        self
    }

    /// Joints contributed by the attached end-of-arm tool.
    pub fn with_end_of_arm_joints<I, J>(mut self, joints: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: Into<JointId>,
    {
        self.end_of_arm_joints = joints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a kinematic tree with every model built by [`Self::load`].
    pub fn with_kinematics(mut self, tree: Arc<KinematicTree>) -> Self {
        self.kinematics = Some(tree);
        self
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Number of completed cycles.
    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// Instance names of the loaded models, in load order.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// Static joints followed by end-of-arm joints, without repeats.
    pub fn known_joints(&self) -> Vec<JointId> {
        let mut seen = HashSet::new();
        self.static_joints
            .iter()
            .chain(&self.end_of_arm_joints)
            .filter(|j| seen.insert(j.as_str()))
            .cloned()
            .collect()
    }

    /// Most recent model faults, oldest first.
    pub fn faults(&self) -> impl Iterator<Item = &ModelFault> {
        self.faults.iter()
    }

    /// Take every recorded fault, leaving the log empty.
    pub fn drain_faults(&mut self) -> Vec<ModelFault> {
        self.faults.drain(..).collect()
    }

    fn expect_state(&self, expected: ManagerState) -> Result<(), GuardError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GuardError::InvalidState {
                expected: expected.to_string(),
                actual: self.state.to_string(),
            })
        }
    }

    /// Instantiate every enabled entry and move to `Running`.
    ///
    /// `entries` is the base model list followed by the end-of-arm tool's
    /// models.  Loading is all-or-nothing: on error the manager stays
    /// `Unstarted` with no models.
    ///
    /// # Errors
    ///
    /// - [`GuardError::InvalidState`] – the manager is not `Unstarted`.
    /// - [`GuardError::DuplicateModel`] – two enabled entries share a name.
    /// - [`GuardError::UnknownModel`] – an entry's kind is not registered.
    /// - [`GuardError::ModelInstantiation`] – a factory rejected its entry.
    pub fn load(&mut self, entries: &[ModelEntry], registry: &ModelRegistry) -> Result<(), GuardError> {
        self.expect_state(ManagerState::Unstarted)?;

        let joints = self.known_joints();
        let mut names = HashSet::new();
        let mut models = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.enabled {
                debug!(model = %entry.name, "model disabled; skipping");
                continue;
            }
            if !names.insert(entry.name.as_str()) {
                return Err(GuardError::DuplicateModel(entry.name.clone()));
            }
            let ctx = ModelContext {
                entry,
                joints: &joints,
                kinematics: self.kinematics.as_ref(),
            };
            let model = registry.instantiate(&ctx).map_err(|e| match e {
                GuardError::UnknownModel { .. } | GuardError::ModelInstantiation { .. } => e,
                other => ctx.instantiation_error(other.to_string()),
            })?;
            debug!(model = %entry.name, kind = entry.kind(), "model instantiated");
            models.push(model);
        }

        self.models = models;
        self.state = ManagerState::Running;
        info!(
            models = self.models.len(),
            joints = joints.len(),
            policy = %self.policy,
            "collision manager running"
        );
        Ok(())
    }

    /// Run one arbitration cycle and install the result.
    ///
    /// Model faults never surface here; they are reported in the returned
    /// [`CycleReport`] and the fault log.  A panicking model still triggers
    /// the process panic hook; see the module docs.
    ///
    /// # Errors
    ///
    /// - [`GuardError::InvalidState`] – the manager is not `Running`.
    /// - [`GuardError::Status`] (or whatever the source returns) – no snapshot
    ///   could be read; no limits are pushed for this cycle.
    #[instrument(skip(self), fields(cycle = self.cycle + 1))]
    pub fn step(&mut self) -> Result<CycleReport, GuardError> {
        self.expect_state(ManagerState::Running)?;
        let status = self.status_source.status()?;
        self.cycle += 1;
        let cycle = self.cycle;

        let mut limits = JointLimitTable::seeded(self.known_joints());
        let mut faults = Vec::new();
        for model in &mut self.models {
            match run_model(model.as_mut(), &status) {
                Ok(table) => {
                    for (joint, range) in &table {
                        if limits.contains(joint.as_str()) {
                            limits.constrain(joint, *range);
                        } else {
                            debug!(model = model.name(), joint = %joint, "ignoring limits for unknown joint");
                        }
                    }
                }
                Err(message) => {
                    let fault = ModelFault::new(cycle, model.name(), message);
                    warn!(
                        model = %fault.model,
                        fault_id = %fault.id,
                        message = %fault.message,
                        "collision model faulted; contribution discarded"
                    );
                    faults.push(fault);
                }
            }
        }

        let conflicts = self.policy.apply(&mut limits);
        for conflict in &conflicts {
            error!(
                joint = %conflict.joint,
                merged = ?conflict.merged,
                resolved = ?conflict.resolved,
                policy = %conflict.policy,
                "merged soft limits conflict"
            );
        }

        let installed = self.actuators.apply(&limits);

        for fault in &faults {
            if self.faults.len() == FAULT_LOG_CAPACITY {
                self.faults.pop_front();
            }
            self.faults.push_back(fault.clone());
        }

        Ok(CycleReport {
            cycle,
            timestamp: status.timestamp,
            limits,
            faults,
            conflicts,
            installed,
        })
    }

    /// Move to `Stopped`.  Calling it again has no effect.
    pub fn stop(&mut self) {
        if self.state != ManagerState::Stopped {
            info!(cycles = self.cycle, previous = %self.state, "collision manager stopped");
            self.state = ManagerState::Stopped;
        }
    }
}

impl fmt::Debug for CollisionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionManager")
            .field("state", &self.state)
            .field("models", &self.model_names())
            .field("joints", &self.known_joints())
            .field("policy", &self.policy)
            .field("cycle", &self.cycle)
            .finish()
    }
}

/// Run one model, turning every failure mode into a fault message.
fn run_model(model: &mut dyn CollisionModel, status: &RobotStatus) -> Result<JointLimitTable, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| model.step(status))) {
        Ok(Ok(table)) => {
            table.validate().map_err(|e| e.to_string())?;
            Ok(table)
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
