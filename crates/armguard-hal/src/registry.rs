//! [`ActuatorRegistry`] – routes merged soft limits to per-joint sinks.
//!
//! The registry stores every registered [`SoftLimitSink`] by joint name.
//! After each arbitration cycle the manager hands it the merged
//! [`JointLimitTable`] and the registry pushes each entry to the matching
//! sink.  Entries without a sink are logged and skipped so that one missing
//! driver cannot stop limits reaching the others.

use std::collections::BTreeMap;

use armguard_types::{JointLimitTable, JointRange};
use tracing::{trace, warn};

use crate::limits::SoftLimitSink;

/// Joint-name → [`SoftLimitSink`] dispatcher.
#[derive(Default)]
pub struct ActuatorRegistry {
    sinks: BTreeMap<String, Box<dyn SoftLimitSink>>,
}

impl ActuatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink.  Any previously registered sink for the same joint is
    /// replaced.
    pub fn register(&mut self, sink: Box<dyn SoftLimitSink>) {
        self.sinks.insert(sink.joint().to_string(), sink);
    }

    pub fn contains(&self, joint: &str) -> bool {
        self.sinks.contains_key(joint)
    }

    pub fn joints(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }

    /// Push one range to the sink for `joint`.  Returns `false` when no sink
    /// is registered for it.
    pub fn push(&mut self, joint: &str, range: JointRange) -> bool {
        match self.sinks.get_mut(joint) {
            Some(sink) => {
                let (lower, upper) = range.to_options();
                trace!(joint, ?lower, ?upper, "installing soft limits");
                sink.set_soft_limits(lower, upper);
                true
            }
            None => {
                warn!(joint, "no soft-limit sink registered; limits not installed");
                false
            }
        }
    }

    /// Push every entry of `table`.  Returns the number of sinks updated.
    pub fn apply(&mut self, table: &JointLimitTable) -> usize {
        table
            .iter()
            .filter(|(joint, range)| self.push(joint.as_str(), **range))
            .count()
    }
}

impl std::fmt::Debug for ActuatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorRegistry")
            .field("joints", &self.sinks.keys().collect::<Vec<_>>())
            .finish()
    }
}
