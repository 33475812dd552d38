//! [`GuardConfig`] – the TOML file that describes one ArmGuard deployment.
//!
//! ```toml
//! period_ms = 50
//! conflict_policy = "clamp"
//! topology_path = "/etc/armguard/topology.toml"
//!
//! [[models]]
//! name = "open"
//!
//! [end_of_arm]
//! joints = ["wrist_yaw", "stretch_gripper"]
//!
//! [[end_of_arm.collision_models]]
//! name = "tip_keep_out"
//! kind = "end_of_arm_keep_out"
//! params = { tool_link = "link_grasp_center", clearance = 0.05 }
//! ```
//!
//! Every field is optional.  The topology is only read when
//! `topology_path` is set; nothing is derived from the environment except
//! the overrides listed on [`GuardConfig::apply_env_overrides`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use armguard_hal::{ActuatorRegistry, StatusSource};
use armguard_kernel::{CollisionManager, ConflictPolicy, ModelRegistry};
use armguard_kinematics::{FileTopologyProvider, load_tree};
use armguard_types::{GuardError, ModelEntry, joints};
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_period_ms() -> u64 {
    50
}

fn default_static_joints() -> Vec<String> {
    joints::STATIC.iter().map(|j| j.to_string()).collect()
}

/// The attached end-of-arm tool: its joints and its own collision models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndOfArmConfig {
    #[serde(default)]
    pub joints: Vec<String>,
    #[serde(default)]
    pub collision_models: Vec<ModelEntry>,
}

/// Deployment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Control period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    #[serde(default = "default_static_joints")]
    pub static_joints: Vec<String>,

    /// Kinematic topology file (TOML).  Required by models that use the
    /// chain solver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_path: Option<PathBuf>,

    /// Base collision models.
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    #[serde(default)]
    pub end_of_arm: EndOfArmConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            conflict_policy: ConflictPolicy::default(),
            static_joints: default_static_joints(),
            topology_path: None,
            models: Vec::new(),
            end_of_arm: EndOfArmConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Parse and validate a TOML document.  No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Config`] when the document is malformed or
    /// fails [`Self::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, GuardError> {
        let cfg: Self =
            toml::from_str(raw).map_err(|e| GuardError::Config(format!("failed to parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read `path`, parse it, apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Config`] when the file cannot be read or is
    /// invalid.
    pub fn load_from(path: &Path) -> Result<Self, GuardError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| GuardError::Config(format!("failed to read config at {}: {e}", path.display())))?;
        let mut cfg: Self =
            toml::from_str(&raw).map_err(|e| GuardError::Config(format!("failed to parse config: {e}")))?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `ARMGUARD_*` environment overrides.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `ARMGUARD_PERIOD_MS` | `period_ms` |
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ms) = lookup("ARMGUARD_PERIOD_MS").and_then(|v| v.trim().parse().ok()) {
            self.period_ms = ms;
        }
    }

    /// # Errors
    ///
    /// Returns [`GuardError::Config`] for a zero period or an empty joint
    /// name.
    pub fn validate(&self) -> Result<(), GuardError> {
        if self.period_ms == 0 {
            return Err(GuardError::Config("period_ms must be greater than zero".into()));
        }
        if self
            .static_joints
            .iter()
            .chain(&self.end_of_arm.joints)
            .any(|j| j.trim().is_empty())
        {
            return Err(GuardError::Config("joint names must not be empty".into()));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Base models followed by the end-of-arm tool's models.
    pub fn model_entries(&self) -> Vec<ModelEntry> {
        self.models
            .iter()
            .chain(&self.end_of_arm.collision_models)
            .cloned()
            .collect()
    }

    /// Static joints followed by end-of-arm joints.
    pub fn joints(&self) -> impl Iterator<Item = &str> {
        self.static_joints
            .iter()
            .chain(&self.end_of_arm.joints)
            .map(String::as_str)
    }

    /// Build a running [`CollisionManager`] from this configuration.
    ///
    /// # Errors
    ///
    /// Propagates topology and model load errors.
    pub fn assemble(
        &self,
        status_source: Box<dyn StatusSource>,
        actuators: ActuatorRegistry,
        registry: &ModelRegistry,
    ) -> Result<CollisionManager, GuardError> {
        let mut manager = CollisionManager::new(status_source, actuators)
            .with_static_joints(self.static_joints.iter().map(String::as_str))
            .with_end_of_arm_joints(self.end_of_arm.joints.iter().map(String::as_str))
            .with_conflict_policy(self.conflict_policy);

        if let Some(path) = &self.topology_path {
            let tree = load_tree(&FileTopologyProvider::new(path))?;
            info!(
                path = %path.display(),
                links = tree.link_count(),
                reference = tree.reference_link(),
                "kinematic topology loaded"
            );
            manager = manager.with_kinematics(tree);
        }

        manager.load(&self.model_entries(), registry)?;
        Ok(manager)
    }
}
