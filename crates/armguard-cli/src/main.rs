//! `armguard` – run collision arbitration against the simulated robot.
//!
//! ```text
//! armguard <CONFIG> [CYCLES]
//! ```
//!
//! Loads the deployment configuration (and the kinematic topology it points
//! to), builds a simulated robot exposing every configured joint, and drives
//! the control loop until the cycle budget is spent or Ctrl-C is pressed.
//! Cycles with model faults or merge conflicts are printed as they happen;
//! the installed soft limits are printed on exit.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use colored::Colorize;
use tracing::warn;

use armguard_hal::SimRobot;
use armguard_kernel::{CycleReport, ModelRegistry};
use armguard_runtime::{ControlLoop, GuardConfig, LoopSummary};
use armguard_types::{Bound, GuardError};

/// Run collision arbitration against the simulated robot.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "armguard", version)]
struct Args {
    /// Deployment configuration (TOML)
    config: PathBuf,

    /// Stop after this many cycles; run until Ctrl-C when omitted
    cycles: Option<u64>,
}

fn main() -> ExitCode {
    let _guard = armguard_runtime::init_tracing("armguard");
    armguard_runtime::install_panic_hook();

    let args = Args::parse();

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after the current cycle …".yellow().bold());
        flag.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; only the cycle budget will stop the loop");
    }

    match run(&args, stop) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, stop: Arc<AtomicBool>) -> Result<LoopSummary, GuardError> {
    let cfg = GuardConfig::load_from(&args.config)?;
    println!(
        "  {} {} ({} ms period, {} policy)",
        "armguard".bold().cyan(),
        args.config.display().to_string().bold(),
        cfg.period_ms,
        cfg.conflict_policy
    );

    let robot = SimRobot::builder().with_joints(cfg.joints()).build();
    let manager = cfg.assemble(robot.status_source(), robot.actuators(), &ModelRegistry::builtin())?;
    println!("  models: {}", manager.model_names().join(", ").dimmed());

    let mut control = ControlLoop::new(manager, cfg.period()).with_stop_flag(stop);
    if let Some(cycles) = args.cycles {
        control = control.with_max_cycles(cycles);
    }
    let summary = control.run_with(print_incidents)?;

    println!();
    println!("  {}", "installed soft limits".bold());
    for joint in cfg.joints() {
        let text = match robot.soft_limits(joint) {
            Some((lower, upper)) => format!("[{}, {}]", show(lower), show(upper)),
            None => "never installed".to_string(),
        };
        println!("    {joint:<18} {text}");
    }
    Ok(summary)
}

fn print_incidents(report: &CycleReport) {
    for fault in &report.faults {
        println!(
            "  {} cycle {}: model `{}` faulted: {}",
            "fault".yellow().bold(),
            report.cycle,
            fault.model,
            fault.message
        );
    }
    for conflict in &report.conflicts {
        println!(
            "  {} cycle {}: `{}` merged to {} → {} ({})",
            "conflict".red().bold(),
            report.cycle,
            conflict.joint,
            range_text(conflict.merged.lower, conflict.merged.upper),
            range_text(conflict.resolved.lower, conflict.resolved.upper),
            conflict.policy
        );
    }
}

fn print_summary(summary: &LoopSummary) {
    println!();
    println!(
        "  {} {} cycles, {} skipped, {} overruns, {} faults, {} conflicts",
        "✓".green().bold(),
        summary.cycles,
        summary.status_errors,
        summary.overruns,
        summary.faults,
        summary.conflicts
    );
}

fn range_text(lower: Bound, upper: Bound) -> String {
    format!("[{}, {}]", show(lower.value()), show(upper.value()))
}

fn show(bound: Option<f64>) -> String {
    bound.map_or_else(|| "∅".to_string(), |v| format!("{v:.3}"))
}
