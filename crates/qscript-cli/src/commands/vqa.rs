//! Vqa command implementation.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use indicatif::ProgressBar;
use tracing::info;

use qscript_adapter_sim::SimulatorBackend;
use qscript_vqa::{
    CostFunction, EstimationMode, GradientDescent, OptimizationResult, VariationalCircuit,
};

use super::progress_bar;
use crate::config::VqaSettings;
use crate::output::{OutputFormat, print_json};

/// Minimise ⟨Z⟩ of RX(θ₀)·RY(θ₁)|0⟩ on the local simulator.
pub async fn optimize(settings: &VqaSettings, show_progress: bool) -> Result<OptimizationResult> {
    let mode = EstimationMode::from_shots(settings.shots);
    let backend = Arc::new(SimulatorBackend::new());
    let cost = CostFunction::pauli_z(VariationalCircuit::single_qubit()?, mode.estimator(backend));
    let optimizer = GradientDescent::new(settings.step_size, settings.iterations)?
        .with_gradient(settings.gradient.build());
    info!(?mode, gradient = %settings.gradient, "starting optimization");

    let bar = if show_progress {
        progress_bar(settings.iterations as u64, "steps")
    } else {
        ProgressBar::hidden()
    };
    let result = optimizer
        .minimize_with(&cost, &settings.initial_params, |report| {
            bar.set_position(report.iteration as u64);
            bar.set_message(format!("cost {:+.6}", report.cost));
        })
        .await;
    bar.finish_and_clear();
    Ok(result?)
}

/// Execute the vqa command.
pub async fn execute(settings: &VqaSettings, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Text {
        println!(
            "{} Minimising {} with step {} for {} iterations ({})",
            style("→").cyan().bold(),
            style("⟨Z⟩").green(),
            settings.step_size,
            settings.iterations,
            style(settings.gradient).yellow()
        );
    }

    let result = optimize(settings, format == OutputFormat::Text).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => {
            println!(
                "  Parameters: [{}]",
                result
                    .params
                    .iter()
                    .map(|p| format!("{p:.6}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Evaluations: {}", result.evaluations);
            println!("Final result: {}", result.cost);
        }
    }
    Ok(())
}
