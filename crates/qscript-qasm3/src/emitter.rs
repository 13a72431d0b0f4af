//! OpenQASM 3 emitter.

use std::f64::consts::PI;

use qscript_ir::{
    Circuit, ClbitId, Instruction, InstructionKind, ParameterExpression, QubitId, StandardGate,
};

use crate::error::{Qasm3Error, Qasm3Result};

/// Spelling rules for the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Standard library names (`cx`, `id`, `sdg`). Free symbols become
    /// `input float[64]` declarations.
    #[default]
    OpenQasm3,
    /// Amazon Braket's built-in gate names (`cnot`, `i`, `si`). Every
    /// parameter must be bound.
    Braket,
}

impl Dialect {
    fn label(self) -> &'static str {
        match self {
            Dialect::OpenQasm3 => "OpenQASM 3",
            Dialect::Braket => "Amazon Braket",
        }
    }
}

/// Emit a circuit as standard OpenQASM 3.0 source.
pub fn emit(circuit: &Circuit) -> Qasm3Result<String> {
    emit_with(circuit, Dialect::OpenQasm3)
}

/// Emit a circuit in the given dialect.
pub fn emit_with(circuit: &Circuit, dialect: Dialect) -> Qasm3Result<String> {
    Emitter::new(dialect).emit_circuit(circuit)
}

struct Emitter {
    dialect: Dialect,
    output: String,
}

impl Emitter {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            output: String::new(),
        }
    }

    fn emit_circuit(mut self, circuit: &Circuit) -> Qasm3Result<String> {
        self.writeln("OPENQASM 3.0;");

        let symbols = circuit.parameters();
        if let Some(name) = symbols.iter().next() {
            if self.dialect == Dialect::Braket {
                return Err(Qasm3Error::UnboundParameter(
                    name.clone(),
                    self.dialect.label(),
                ));
            }
        }
        for name in &symbols {
            self.writeln(&format!("input float[64] {name};"));
        }

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 {
            self.writeln(&format!("qubit[{num_qubits}] q;"));
        }
        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            self.writeln(&format!("bit[{num_clbits}] c;"));
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }

        Ok(self.output)
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> Qasm3Result<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let name = self.gate_name(gate);
                let qubits = qubit_list(&instruction.qubits);
                match gate.parameter() {
                    Some(p) => {
                        let param = emit_param(p);
                        self.writeln(&format!("{name}({param}) {qubits};"));
                    }
                    None => self.writeln(&format!("{name} {qubits};")),
                }
            }
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    self.writeln(&format!("{} = measure {};", clbit(*c), qubit(*q)));
                }
            }
            InstructionKind::Barrier => {
                if self.dialect == Dialect::Braket {
                    // Braket programs without verbatim boxes reject barriers.
                    return Ok(());
                }
                self.writeln(&format!("barrier {};", qubit_list(&instruction.qubits)));
            }
        }
        Ok(())
    }

    fn gate_name(&self, gate: &StandardGate) -> &'static str {
        match (self.dialect, gate) {
            (Dialect::Braket, StandardGate::I) => "i",
            (Dialect::Braket, StandardGate::Sdg) => "si",
            (Dialect::Braket, StandardGate::CX) => "cnot",
            (_, g) => g.name(),
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn emit_param(param: &ParameterExpression) -> String {
    match param {
        ParameterExpression::Constant(v) => format_angle(*v),
        ParameterExpression::Symbol(name) => name.clone(),
        ParameterExpression::Neg(e) => format!("-({})", emit_param(e)),
        ParameterExpression::Add(a, b) => format!("({} + {})", emit_param(a), emit_param(b)),
        ParameterExpression::Mul(a, b) => format!("({} * {})", emit_param(a), emit_param(b)),
    }
}

fn format_angle(v: f64) -> String {
    const FRACTIONS: [(f64, &str); 6] = [
        (PI, "pi"),
        (-PI, "-pi"),
        (PI / 2.0, "pi/2"),
        (-PI / 2.0, "-pi/2"),
        (PI / 4.0, "pi/4"),
        (-PI / 4.0, "-pi/4"),
    ];
    FRACTIONS
        .iter()
        .find(|(f, _)| (v - f).abs() < 1e-10)
        .map_or_else(|| format!("{v:.10}"), |(_, s)| (*s).to_string())
}

fn qubit(q: QubitId) -> String {
    format!("q[{}]", q.0)
}

fn clbit(c: ClbitId) -> String {
    format!("c[{}]", c.0)
}

fn qubit_list(qubits: &[QubitId]) -> String {
    qubits.iter().map(|q| qubit(*q)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use qscript_ir::Circuit;

    #[test]
    fn test_emit_bell_pair() {
        let mut circuit = Circuit::bell_pair().unwrap();
        circuit.measure_all().unwrap();
        let qasm = emit(&circuit).unwrap();

        assert!(qasm.starts_with("OPENQASM 3.0;\n"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("bit[2] c;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0], q[1];"));
        assert!(qasm.contains("c[1] = measure q[1];"));
    }

    #[test]
    fn test_braket_spelling() {
        let mut circuit = Circuit::coin_flip().unwrap();
        circuit.sdg(QubitId(0)).unwrap();
        let qasm = emit_with(&circuit, Dialect::Braket).unwrap();
        assert!(qasm.contains("i q[0];"));
        assert!(qasm.contains("si q[0];"));
        assert!(!qasm.contains("id q[0];"));

        let bell = Circuit::bell_pair().unwrap();
        let qasm = emit_with(&bell, Dialect::Braket).unwrap();
        assert!(qasm.contains("cnot q[0], q[1];"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(!qasm.lines().any(|l| l.starts_with("bit[")));
    }

    #[test]
    fn test_angles() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit
            .rx(PI / 2.0, QubitId(0))
            .unwrap()
            .ry(0.125, QubitId(0))
            .unwrap();
        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("rx(pi/2) q[0];"));
        assert!(qasm.contains("ry(0.1250000000) q[0];"));
    }

    #[test]
    fn test_free_parameters() {
        let mut circuit = Circuit::with_size("ansatz", 1, 0);
        circuit
            .rx(ParameterExpression::symbol("theta_0"), QubitId(0))
            .unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("input float[64] theta_0;"));
        assert!(qasm.contains("rx(theta_0) q[0];"));

        assert!(matches!(
            emit_with(&circuit, Dialect::Braket),
            Err(Qasm3Error::UnboundParameter(name, _)) if name == "theta_0"
        ));
    }

    #[test]
    fn test_barrier_dropped_for_braket() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap().barrier_all().unwrap();
        assert!(emit(&circuit).unwrap().contains("barrier q[0], q[1];"));
        assert!(!emit_with(&circuit, Dialect::Braket).unwrap().contains("barrier"));
    }
}
