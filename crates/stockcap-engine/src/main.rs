//! Hauling simulation binary for stockpile quantity limits.
//!
//! Wires the limit registry, the in-memory world and the transfer guard
//! together and drives a fixed number of hauling steps, so the capacity
//! rules can be watched end to end.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `stockcap-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Restore saved limits and build the starting world
//! 4. Run the hauling loop
//! 5. Audit every configured limit and log the summary
//! 6. Save the limit snapshot

mod error;
mod hauling;
mod setup;

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use stockcap_core::config::StockcapConfig;
use stockcap_limits::LimitEdit;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::hauling::HaulingRun;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, setup, the run itself, or saving the
/// snapshot fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    let edit = LimitEdit::new(config.limits.max_editable_limit);
    info!(
        seed = config.simulation.seed,
        steps = config.simulation.steps,
        agents = config.simulation.agents,
        max_carry = config.simulation.max_carry,
        max_editable_limit = edit.max_limit(),
        "stockcap-engine starting"
    );

    // 3. Restore saved limits, then build the starting world.
    let snapshot_path = Path::new(&config.limits.snapshot_path);
    let saved = setup::restore_limits(snapshot_path)?;
    let mut rng = StdRng::seed_from_u64(config.simulation.seed);
    let state = setup::build(&config.simulation, edit, saved, &mut rng)?;

    // 4. Run.
    let mut run = HaulingRun::new(state, config.simulation.max_carry);
    run.run(config.simulation.steps)?;

    // 5. Audit and summarize.
    let violations = run.audit();
    for violation in &violations {
        warn!(
            location = %violation.location,
            kind = %violation.kind,
            occupied = violation.occupied,
            limit = violation.limit,
            "quantity limit exceeded"
        );
    }
    run.log_summary();

    // 6. Save limits for the next run.
    run.snapshot().save(snapshot_path)?;

    info!(
        violations = violations.len(),
        steps = run.stats().steps,
        loose_stacks = run.world().ground_items().len(),
        "stockcap-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `stockcap-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<StockcapConfig, EngineError> {
    let config_path = Path::new("stockcap-config.yaml");
    if config_path.exists() {
        Ok(StockcapConfig::from_file(config_path)?)
    } else {
        // Logging is not up yet.
        eprintln!("stockcap-config.yaml not found, using defaults");
        Ok(StockcapConfig::parse("")?)
    }
}
