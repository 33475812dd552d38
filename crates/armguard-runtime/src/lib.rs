//! `armguard-runtime` – process-level plumbing around the arbitration kernel.
//!
//! # Modules
//!
//! - [`config`] – [`GuardConfig`]: TOML deployment configuration and the
//!   assembly of a running [`CollisionManager`][armguard_kernel::CollisionManager].
//! - [`control_loop`] – [`ControlLoop`]: fixed-period driver with a stop flag
//!   and an optional cycle budget.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: `tracing`
//!   subscriber with optional OTLP span export, and a panic hook that logs
//!   through it.

pub mod config;
pub mod control_loop;
pub mod telemetry;

pub use config::{EndOfArmConfig, GuardConfig};
pub use control_loop::{ControlLoop, LoopSummary};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing, install_panic_hook};
