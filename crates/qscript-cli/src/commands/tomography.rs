//! Tomography command implementation.

use anyhow::Result;
use console::style;
use tracing::info;

use qscript_adapter_sim::{SimulatorBackend, Statevector};
use qscript_hal::Backend;
use qscript_ir::Circuit;
use qscript_tomography::{TomographyError, TomographyOutcome, run_tomography};

#[cfg(feature = "braket")]
use qscript_adapter_braket::{BraketBackend, BraketConfig};
#[cfg(feature = "braket")]
use qscript_hal::WaitPolicy;

use super::progress_bar;
use crate::config::{BraketSettings, TomographySettings};
use crate::output::{OutputFormat, print_json};

/// Open the backend tomography runs on.
pub async fn connect(
    settings: &TomographySettings,
    braket: &BraketSettings,
    local: bool,
) -> Result<Box<dyn Backend>> {
    if local {
        return Ok(Box::new(SimulatorBackend::new()));
    }
    connect_braket(settings, braket).await
}

#[cfg(feature = "braket")]
async fn connect_braket(
    settings: &TomographySettings,
    braket: &BraketSettings,
) -> Result<Box<dyn Backend>> {
    use std::time::Duration;

    let bucket = braket.s3_bucket.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "Braket needs an S3 bucket for results. Set braket.s3_bucket or QSCRIPT_BRAKET_S3_BUCKET, or pass --local."
        )
    })?;
    let config = BraketConfig::new(bucket)
        .with_prefix(&braket.s3_prefix)
        .with_region(&braket.region)
        .with_wait(WaitPolicy::new(
            Duration::from_millis(settings.poll_interval_ms),
            Duration::from_secs(settings.wait_timeout_secs),
        ));

    match BraketBackend::connect_with(&settings.device_arn, config).await {
        Ok(backend) => Ok(Box::new(backend)),
        Err(e) => anyhow::bail!(
            "Failed to connect to AWS Braket: {e}. Configure AWS credentials for the device region."
        ),
    }
}

#[cfg(not(feature = "braket"))]
async fn connect_braket(
    _settings: &TomographySettings,
    _braket: &BraketSettings,
) -> Result<Box<dyn Backend>> {
    anyhow::bail!("Braket backend not available. Rebuild with --features braket, or pass --local")
}

/// Tomography of `circuit` on `backend`.
pub async fn reconstruct(
    backend: &dyn Backend,
    circuit: &Circuit,
    settings: &TomographySettings,
    show_progress: bool,
) -> Result<TomographyOutcome> {
    let availability = backend.availability().await?;
    if !availability.is_available {
        anyhow::bail!(
            "Backend '{}' is not available{}",
            backend.name(),
            availability
                .status_message
                .map(|m| format!(": {m}"))
                .unwrap_or_default()
        );
    }
    if let Some(depth) = availability.queue_depth.filter(|d| *d > 0) {
        info!(queue_depth = depth, "jobs ahead in the device queue");
    }

    let jobs = settings.mode.job_count(circuit.num_qubits()) as u64;
    let bar = if show_progress {
        progress_bar(jobs, "jobs")
    } else {
        indicatif::ProgressBar::hidden()
    };
    let outcome = run_tomography(
        settings.mode,
        backend,
        circuit,
        settings.shots,
        |done, _| bar.set_position(done as u64),
    )
    .await;
    bar.finish_and_clear();
    outcome.map_err(|e| {
        let incomplete = matches!(&e, TomographyError::Execution(hal) if hal.is_job_outcome());
        let err = anyhow::Error::from(e);
        if incomplete {
            err.context("a tomography job did not complete; nothing was reconstructed")
        } else {
            err
        }
    })
}

/// Execute the tomography command.
pub async fn execute(
    settings: &TomographySettings,
    braket: &BraketSettings,
    local: bool,
    format: OutputFormat,
) -> Result<()> {
    let backend = connect(settings, braket, local).await?;
    let circuit = Circuit::bell_pair()?;

    if format == OutputFormat::Text {
        println!(
            "{} {} tomography of {} on {} ({} shots per setting, {} jobs)",
            style("→").cyan().bold(),
            settings.mode,
            style("bell_pair").green(),
            style(backend.name()).yellow(),
            settings.shots,
            settings.mode.job_count(circuit.num_qubits())
        );
    }

    let outcome = reconstruct(
        backend.as_ref(),
        &circuit,
        settings,
        format == OutputFormat::Text,
    )
    .await?;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => print_outcome(&outcome)?,
    }
    Ok(())
}

fn print_outcome(outcome: &TomographyOutcome) -> Result<()> {
    let rho = outcome.matrix();
    let title = match outcome {
        TomographyOutcome::State(_) => "Density matrix",
        TomographyOutcome::Process(_) => "Choi matrix / 2^n",
    };
    println!(
        "\n{} {} ({} qubits, {} jobs):",
        style("✓").green().bold(),
        title,
        rho.num_qubits(),
        outcome.jobs()
    );
    print!("{rho:.3}");

    let eigenvalues = rho.eigenvalues()?;
    println!();
    println!("  Trace:  {:.6}", rho.trace().re);
    println!("  Purity: {:.6}", rho.purity());
    println!(
        "  Min eigenvalue: {:.3e}",
        eigenvalues.first().copied().unwrap_or_default()
    );
    if let TomographyOutcome::State(_) = outcome {
        let ideal = Statevector::from_circuit(&Circuit::bell_pair()?)?;
        let fidelity = rho.fidelity_with_pure(ideal.amplitudes())?;
        println!("  Fidelity with |Φ+⟩: {}", style(format!("{fidelity:.4}")).yellow());
    }
    Ok(())
}
