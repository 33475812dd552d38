//! [`ControlLoop`] – runs arbitration cycles at a fixed period.
//!
//! The loop owns the [`CollisionManager`] and calls
//! [`step`][CollisionManager::step] on the calling thread once per period,
//! sleeping for whatever is left of the period afterwards.  It exits when the
//! shared stop flag is raised or the optional cycle budget runs out, and
//! always stops the manager on the way out.
//!
//! A failed status read skips that cycle and the loop carries on; any other
//! error from the manager ends the loop.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use armguard_hal::SimRobot;
//! use armguard_kernel::{CollisionManager, ManagerState, ModelRegistry};
//! use armguard_runtime::ControlLoop;
//! use armguard_types::{ModelEntry, joints};
//!
//! let robot = SimRobot::builder().with_joints(joints::STATIC).build();
//! let mut manager = CollisionManager::new(robot.status_source(), robot.actuators());
//! manager.load(&[ModelEntry::new("open")], &ModelRegistry::builtin()).unwrap();
//!
//! let mut control = ControlLoop::new(manager, Duration::from_millis(1)).with_max_cycles(3);
//! let summary = control.run().unwrap();
//! assert_eq!(summary.cycles, 3);
//! assert_eq!(control.manager().state(), ManagerState::Stopped);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use armguard_kernel::{CollisionManager, CycleReport};
use armguard_types::GuardError;
use tracing::{debug, info, warn};

/// Counters gathered over one [`ControlLoop::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Cycles that completed and installed limits.
    pub cycles: u64,
    /// Cycles skipped because the status could not be read.
    pub status_errors: u64,
    /// Cycles that took longer than the period.
    pub overruns: u64,
    pub faults: u64,
    pub conflicts: u64,
}

/// Periodic driver for a [`CollisionManager`].
#[derive(Debug)]
pub struct ControlLoop {
    manager: CollisionManager,
    period: Duration,
    stop: Arc<AtomicBool>,
    max_cycles: Option<u64>,
}

impl ControlLoop {
    pub fn new(manager: CollisionManager, period: Duration) -> Self {
        Self {
            manager,
            period,
            stop: Arc::new(AtomicBool::new(false)),
            max_cycles: None,
        }
    }

    /// Stop after `cycles` iterations, counting skipped ones.
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Use an externally owned stop flag, e.g. one raised by a signal handler.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Flag that ends the loop at the next cycle boundary when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn manager(&self) -> &CollisionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut CollisionManager {
        &mut self.manager
    }

    /// Run until stopped.
    ///
    /// # Errors
    ///
    /// Returns the first manager error other than a status read failure.
    pub fn run(&mut self) -> Result<LoopSummary, GuardError> {
        self.run_with(|_| {})
    }

    /// Run until stopped, handing every cycle report to `on_report`.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn run_with<F>(&mut self, mut on_report: F) -> Result<LoopSummary, GuardError>
    where
        F: FnMut(&CycleReport),
    {
        info!(period_ms = saturating_u64(self.period.as_millis()), max_cycles = ?self.max_cycles, "control loop started");
        let mut summary = LoopSummary::default();
        let mut iterations = 0u64;
        let outcome = loop {
            if self.stop.load(Ordering::SeqCst) {
                debug!("stop flag raised");
                break Ok(summary);
            }
            if self.max_cycles.is_some_and(|max| iterations >= max) {
                debug!(iterations, "cycle budget exhausted");
                break Ok(summary);
            }
            iterations += 1;

            let started = Instant::now();
            match self.manager.step() {
                Ok(report) => {
                    summary.cycles += 1;
                    summary.faults += saturating_u64(report.faults.len());
                    summary.conflicts += saturating_u64(report.conflicts.len());
                    on_report(&report);
                }
                Err(GuardError::Status(details)) => {
                    summary.status_errors += 1;
                    warn!(%details, "status unavailable; cycle skipped");
                }
                Err(e) => break Err(e),
            }

            let elapsed = started.elapsed();
            match self.period.checked_sub(elapsed) {
                Some(rest) => {
                    let last = self.max_cycles.is_some_and(|max| iterations >= max);
                    if !last && !rest.is_zero() {
                        thread::sleep(rest);
                    }
                }
                None => {
                    summary.overruns += 1;
                    warn!(
                        elapsed_us = saturating_u64(elapsed.as_micros()),
                        period_us = saturating_u64(self.period.as_micros()),
                        "arbitration cycle overran its period"
                    );
                }
            }
        };

        self.manager.stop();
        info!(
            cycles = summary.cycles,
            status_errors = summary.status_errors,
            overruns = summary.overruns,
            faults = summary.faults,
            conflicts = summary.conflicts,
            "control loop finished"
        );
        outcome
    }
}

/// Counter conversion that saturates instead of truncating.
fn saturating_u64(count: impl TryInto<u64>) -> u64 {
    count.try_into().unwrap_or(u64::MAX)
}
