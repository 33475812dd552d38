use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a collision model that failed during a cycle.  The model's
/// contribution was discarded for that cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFault {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Arbitration cycle the fault occurred in.
    pub cycle: u64,
    /// Instance name of the faulting model.
    pub model: String,
    pub message: String,
}

impl ModelFault {
    pub fn new(cycle: u64, model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            cycle,
            model: model.into(),
            message: message.into(),
        }
    }
}
