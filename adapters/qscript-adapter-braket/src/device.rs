//! Braket device ARNs and capability presets.
//!
//! Known ARNs map to fixed [`Capabilities`]; anything else is described
//! from the `GetDevice` response at connect time.

use qscript_hal::Capabilities;

use crate::error::{BraketError, BraketResult};

// ──────────────────────────────────────────────────────────────────────
// Known device ARNs
// ──────────────────────────────────────────────────────────────────────

/// Rigetti Aspen-9 (32 qubits, superconducting). The default hardware
/// target of `qscript tomography`.
pub const RIGETTI_ASPEN_9: &str = "arn:aws:braket:::device/qpu/rigetti/Aspen-9";

/// Rigetti Ankaa-3 (84 qubits, superconducting).
pub const RIGETTI_ANKAA_3: &str = "arn:aws:braket:us-west-1::device/qpu/rigetti/Ankaa-3";

/// IonQ Aria (25 qubits, trapped-ion).
pub const IONQ_ARIA: &str = "arn:aws:braket:us-east-1::device/qpu/ionq/Aria-1";

/// IonQ Forte (36 qubits, trapped-ion).
pub const IONQ_FORTE: &str = "arn:aws:braket:us-east-1::device/qpu/ionq/Forte-1";

/// SV1 state vector simulator.
pub const SV1: &str = "arn:aws:braket:::device/quantum-simulator/amazon/sv1";

/// DM1 density matrix simulator.
pub const DM1: &str = "arn:aws:braket:::device/quantum-simulator/amazon/dm1";

/// Capabilities for a known device ARN, `None` for anything else.
pub fn capabilities_for_device(device_arn: &str) -> Option<Capabilities> {
    match device_arn {
        RIGETTI_ASPEN_9 => Some(Capabilities::braket_rigetti("Rigetti Aspen-9", 32)),
        RIGETTI_ANKAA_3 => Some(Capabilities::braket_rigetti("Rigetti Ankaa-3", 84)),
        IONQ_ARIA => Some(Capabilities::braket_ionq("IonQ Aria", 25)),
        IONQ_FORTE => Some(Capabilities::braket_ionq("IonQ Forte", 36)),
        SV1 => Some(Capabilities::braket_simulator("Amazon SV1", 34)),
        DM1 => Some(Capabilities::braket_simulator("Amazon DM1", 17)),
        _ => None,
    }
}

/// Map a friendly device name to its ARN.
pub fn arn_for_name(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "aspen-9" | "aspen9" => Some(RIGETTI_ASPEN_9),
        "rigetti" | "ankaa" | "ankaa-3" | "ankaa3" => Some(RIGETTI_ANKAA_3),
        "ionq" | "aria" | "aria-1" => Some(IONQ_ARIA),
        "forte" | "forte-1" => Some(IONQ_FORTE),
        "sv1" | "braket-sv1" => Some(SV1),
        "dm1" | "braket-dm1" => Some(DM1),
        _ => None,
    }
}

/// Accept either a full device ARN or a friendly name.
pub fn resolve_device(name_or_arn: &str) -> BraketResult<String> {
    if name_or_arn.starts_with("arn:") {
        if !name_or_arn.starts_with("arn:aws:braket:") || !name_or_arn.contains(":device/") {
            return Err(BraketError::InvalidDeviceArn(name_or_arn.to_string()));
        }
        return Ok(name_or_arn.to_string());
    }
    arn_for_name(name_or_arn)
        .map(str::to_string)
        .ok_or_else(|| BraketError::UnknownDevice(name_or_arn.to_string()))
}

/// Provider segment of a device ARN.
pub fn provider_from_arn(device_arn: &str) -> &str {
    // arn:aws:braket:<region>::device/<type>/<provider>/<device>
    device_arn.split('/').nth(2).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_capabilities() {
        let caps = capabilities_for_device(RIGETTI_ASPEN_9).unwrap();
        assert_eq!(caps.num_qubits, 32);
        assert!(!caps.is_simulator);
        assert!(caps.gate_set.contains("h"));
        assert!(caps.gate_set.contains("cx"));
        assert!(caps.gate_set.is_native("cz"));
    }

    #[test]
    fn test_simulator_capabilities() {
        let caps = capabilities_for_device(SV1).unwrap();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 34);
    }

    #[test]
    fn test_unknown_device() {
        assert!(capabilities_for_device("arn:aws:braket:::device/qpu/unknown/foo").is_none());
    }

    #[test]
    fn test_resolve_device() {
        assert_eq!(resolve_device("Aspen-9").unwrap(), RIGETTI_ASPEN_9);
        assert_eq!(resolve_device("sv1").unwrap(), SV1);
        assert_eq!(resolve_device(IONQ_FORTE).unwrap(), IONQ_FORTE);
        assert!(matches!(
            resolve_device("nonexistent"),
            Err(BraketError::UnknownDevice(_))
        ));
        assert!(matches!(
            resolve_device("arn:aws:s3:::bucket"),
            Err(BraketError::InvalidDeviceArn(_))
        ));
    }

    #[test]
    fn test_provider_from_arn() {
        assert_eq!(provider_from_arn(RIGETTI_ASPEN_9), "rigetti");
        assert_eq!(provider_from_arn(IONQ_ARIA), "ionq");
        assert_eq!(provider_from_arn(SV1), "amazon");
    }
}
