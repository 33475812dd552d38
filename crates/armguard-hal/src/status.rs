//! [`StatusSource`] – where each arbitration cycle gets its snapshot.

use armguard_types::{GuardError, RobotStatus};

/// Synchronous read of the current robot status.
///
/// Implementations must return positions for every joint the manager knows
/// about, including end-of-arm joints, and must not block beyond the control
/// period.
pub trait StatusSource: Send {
    /// # Errors
    ///
    /// Returns [`GuardError::Status`] when no snapshot can be produced.
    fn status(&self) -> Result<RobotStatus, GuardError>;
}

impl<F> StatusSource for F
where
    F: Fn() -> Result<RobotStatus, GuardError> + Send,
{
    fn status(&self) -> Result<RobotStatus, GuardError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_status_sources() {
        let source =
            || -> Result<RobotStatus, GuardError> { Ok(RobotStatus::new().with_joint("lift", 0.4)) };
        let status = StatusSource::status(&source).unwrap();
        assert_eq!(status.position("lift"), Some(0.4));
    }

    #[test]
    fn failing_source_propagates_error() {
        let source =
            || -> Result<RobotStatus, GuardError> { Err(GuardError::Status("serial link down".into())) };
        assert!(matches!(
            StatusSource::status(&source),
            Err(GuardError::Status(_))
        ));
    }
}
