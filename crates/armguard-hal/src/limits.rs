//! Generic `SoftLimitSink` trait for any actuator that enforces a soft motion
//! range.
//!
//! Drivers implement this trait and register themselves with an
//! [`ActuatorRegistry`][crate::registry::ActuatorRegistry].  `None` on either
//! side means "fall back to the factory hard limit".

/// Per-joint soft-limit interface of a motion controller.
pub trait SoftLimitSink: Send {
    /// Joint this sink controls, e.g. `"lift"` or `"wrist_yaw"`.
    fn joint(&self) -> &str;

    /// Install the soft motion range.  Idempotent and fire-and-forget: the
    /// caller consumes no result.
    fn set_soft_limits(&mut self, lower: Option<f64>, upper: Option<f64>);
}
