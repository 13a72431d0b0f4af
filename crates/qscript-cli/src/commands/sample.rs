//! Sample command implementation.

use anyhow::Result;
use console::style;
use serde_json::json;

use qscript_adapter_sim::SimulatorBackend;
use qscript_hal::{Backend, ExecutionResult};
use qscript_ir::Circuit;

use crate::config::SamplingSettings;
use crate::output::{OutputFormat, print_counts, print_json};

/// Run `id; h; measure` on one qubit of the local simulator.
pub async fn sample(settings: &SamplingSettings) -> Result<ExecutionResult> {
    let backend = match settings.seed {
        Some(seed) => SimulatorBackend::new().with_seed(seed),
        None => SimulatorBackend::new(),
    };
    let circuit = Circuit::coin_flip()?;
    Ok(backend.run(&circuit, settings.shots).await?)
}

/// Execute the sample command.
pub async fn execute(settings: &SamplingSettings, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Text {
        println!(
            "{} Sampling {} on {} ({} shots)",
            style("→").cyan().bold(),
            style("coin_flip").green(),
            style("simulator").yellow(),
            settings.shots
        );
    }

    let result = sample(settings).await?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "shots": result.shots,
            "counts": result.counts.to_ordered(),
        }))?,
        OutputFormat::Text => print_counts(&result),
    }
    Ok(())
}
