//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - variational optimization, sampling and tomography on Braket",
        style("qscript").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qscript-ir          Circuits and Pauli observables");
    println!("  qscript-hal         Backend trait and job lifecycle");
    println!("  qscript-vqa         Parameter-shift gradient descent");
    println!("  qscript-tomography  State and process tomography");
    println!("  qscript-cli         Command-line interface");
    println!();
    println!("Backends:");
    println!("  simulator           Local statevector simulator");
    if cfg!(feature = "braket") {
        println!("  braket              AWS Braket (OpenQASM 3)");
    } else {
        println!(
            "  braket              {}",
            style("not built; rebuild with --features braket").dim()
        );
    }
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
