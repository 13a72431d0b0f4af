//! Calls into the Braket and S3 SDKs.
//!
//! Everything the backend needs from AWS goes through [`BraketClient`]:
//! `GetDevice`, `CreateQuantumTask`, `GetQuantumTask`,
//! `CancelQuantumTask`, and the `results.json` object Braket writes to S3.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use aws_sdk_braket::types as sdk;
use serde::Deserialize;
use tracing::debug;

use crate::config::BraketConfig;
use crate::error::{BraketError, BraketResult};

const OPERATION_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BraketClient {
    braket: aws_sdk_braket::Client,
    s3: aws_sdk_s3::Client,
    config: BraketConfig,
}

impl fmt::Debug for BraketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraketClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BraketClient {
    /// SDK clients for `config.region`, authenticated through the default
    /// AWS credential chain.
    pub async fn new(config: &BraketConfig) -> Self {
        let timeouts = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(OPERATION_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build();
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .timeout_config(timeouts)
            .load()
            .await;

        Self {
            braket: aws_sdk_braket::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::new(&sdk_config),
            config: config.clone(),
        }
    }

    pub async fn get_device(&self, device_arn: &str) -> BraketResult<DeviceInfo> {
        let device = self
            .braket
            .get_device()
            .device_arn(device_arn)
            .send()
            .await
            .map_err(|e| BraketError::BraketApi(e.to_string()))?;

        Ok(DeviceInfo {
            device_name: device.device_name().to_string(),
            device_type: device.device_type().into(),
            status: device.device_status().into(),
            provider_name: device.provider_name().to_string(),
            capabilities_json: device.device_capabilities().to_string(),
        })
    }

    /// Start `qasm` on `device_arn`; the returned ARN names the task.
    pub async fn create_task(&self, device_arn: &str, qasm: &str, shots: u32) -> BraketResult<String> {
        let created = self
            .braket
            .create_quantum_task()
            .device_arn(device_arn)
            .action(openqasm_action(qasm))
            .shots(i64::from(shots))
            .output_s3_bucket(&self.config.s3_bucket)
            .output_s3_key_prefix(&self.config.s3_prefix)
            .send()
            .await
            .map_err(|e| BraketError::BraketApi(e.to_string()))?;
        Ok(created.quantum_task_arn().to_string())
    }

    pub async fn get_task_status(&self, task_arn: &str) -> BraketResult<TaskStatus> {
        let task = self
            .braket
            .get_quantum_task()
            .quantum_task_arn(task_arn)
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.contains("ResourceNotFoundException") {
                    BraketError::TaskNotFound(task_arn.to_string())
                } else {
                    BraketError::BraketApi(message)
                }
            })?;
        Ok(TaskStatus::from_sdk(task.status(), task.failure_reason()))
    }

    pub async fn cancel_task(&self, task_arn: &str) -> BraketResult<()> {
        self.braket
            .cancel_quantum_task()
            .quantum_task_arn(task_arn)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| BraketError::BraketApi(e.to_string()))
    }

    pub async fn get_task_result(&self, task_arn: &str) -> BraketResult<TaskResult> {
        let key = result_key(&self.config.s3_prefix, task_arn)?;
        debug!(bucket = %self.config.s3_bucket, %key, "fetching task result");

        let object = self
            .s3
            .get_object()
            .bucket(&self.config.s3_bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| BraketError::S3Error(e.to_string()))?;
        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| BraketError::S3Error(e.to_string()))?
            .into_bytes();

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// `CreateQuantumTask` action document for an OpenQASM 3 program.
fn openqasm_action(qasm: &str) -> String {
    serde_json::json!({
        "braketSchemaHeader": {
            "name": "braket.ir.openqasm.program",
            "version": "1"
        },
        "source": qasm
    })
    .to_string()
}

/// S3 key of a task's result document: `{prefix}/{task id}/results.json`,
/// the id being the last segment of
/// `arn:aws:braket:<region>:<account>:quantum-task/<id>`.
fn result_key(prefix: &str, task_arn: &str) -> BraketResult<String> {
    match task_arn.rsplit_once('/') {
        Some((_, id)) if !id.is_empty() => Ok(format!("{prefix}/{id}/results.json")),
        _ => Err(BraketError::TaskNotFound(task_arn.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceType {
    Qpu,
    Simulator,
}

impl From<&sdk::DeviceType> for DeviceType {
    fn from(value: &sdk::DeviceType) -> Self {
        match value {
            sdk::DeviceType::Qpu => DeviceType::Qpu,
            _ => DeviceType::Simulator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Online,
    Offline,
    Retired,
}

impl From<&sdk::DeviceStatus> for DeviceStatus {
    fn from(value: &sdk::DeviceStatus) -> Self {
        match value {
            sdk::DeviceStatus::Online => DeviceStatus::Online,
            sdk::DeviceStatus::Retired => DeviceStatus::Retired,
            _ => DeviceStatus::Offline,
        }
    }
}

/// `GetDevice` response, reduced to what capability discovery needs.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub device_name: String,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    /// e.g. "Rigetti", "IonQ".
    pub provider_name: String,
    /// Raw capabilities document.
    pub capabilities_json: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Created,
    Queued,
    Running,
    Completed,
    Failed(String),
    Cancelling,
    Cancelled,
}

impl TaskStatus {
    fn from_sdk(status: &sdk::QuantumTaskStatus, failure_reason: Option<&str>) -> Self {
        match status {
            sdk::QuantumTaskStatus::Created => TaskStatus::Created,
            sdk::QuantumTaskStatus::Queued => TaskStatus::Queued,
            sdk::QuantumTaskStatus::Running => TaskStatus::Running,
            sdk::QuantumTaskStatus::Completed => TaskStatus::Completed,
            sdk::QuantumTaskStatus::Failed => {
                TaskStatus::Failed(failure_reason.unwrap_or("no failure reason given").to_string())
            }
            sdk::QuantumTaskStatus::Cancelling => TaskStatus::Cancelling,
            sdk::QuantumTaskStatus::Cancelled => TaskStatus::Cancelled,
            other => TaskStatus::Failed(format!("unrecognised task status {}", other.as_str())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed(_) | TaskStatus::Cancelled
        )
    }
}

/// `results.json` as written by Braket.
///
/// Devices fill in one of counts, per-shot rows or probabilities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    #[serde(default)]
    pub measurement_counts: Option<HashMap<String, u64>>,
    #[serde(default)]
    pub measurement_probabilities: Option<HashMap<String, f64>>,
    /// One row per shot, one entry per measured qubit.
    #[serde(default)]
    pub measurements: Option<Vec<Vec<u8>>>,
    #[serde(default)]
    pub measured_qubits: Option<Vec<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_from_sdk() {
        assert_eq!(
            TaskStatus::from_sdk(&sdk::QuantumTaskStatus::Queued, None),
            TaskStatus::Queued
        );
        assert_eq!(
            TaskStatus::from_sdk(&sdk::QuantumTaskStatus::Failed, Some("device offline")),
            TaskStatus::Failed("device offline".into())
        );
        assert_eq!(
            TaskStatus::from_sdk(&sdk::QuantumTaskStatus::Cancelling, None),
            TaskStatus::Cancelling
        );
        assert!(!TaskStatus::Cancelling.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(TaskStatus::Failed(String::new()).is_terminal());
    }

    #[test]
    fn test_device_enums_from_sdk() {
        assert_eq!(DeviceType::from(&sdk::DeviceType::Qpu), DeviceType::Qpu);
        assert_eq!(DeviceType::from(&sdk::DeviceType::Simulator), DeviceType::Simulator);
        assert_eq!(DeviceStatus::from(&sdk::DeviceStatus::Online), DeviceStatus::Online);
        assert_eq!(DeviceStatus::from(&sdk::DeviceStatus::Offline), DeviceStatus::Offline);
    }

    #[test]
    fn test_openqasm_action() {
        let action: serde_json::Value =
            serde_json::from_str(&openqasm_action("OPENQASM 3.0;")).unwrap();
        assert_eq!(action["braketSchemaHeader"]["name"], "braket.ir.openqasm.program");
        assert_eq!(action["source"], "OPENQASM 3.0;");
    }

    #[test]
    fn test_result_key() {
        let arn = "arn:aws:braket:us-east-1:123456789012:quantum-task/5e2b7c1a";
        assert_eq!(
            result_key("qscript-results", arn).unwrap(),
            "qscript-results/5e2b7c1a/results.json"
        );
        assert!(matches!(
            result_key("p", "not-an-arn"),
            Err(BraketError::TaskNotFound(_))
        ));
        assert!(result_key("p", "arn:aws:braket:::quantum-task/").is_err());
    }

    #[test]
    fn test_task_result_deserialize_counts() {
        let json = r#"{
            "braketSchemaHeader": {"name": "braket.task_result.gate_model_task_result", "version": "1"},
            "measurementCounts": {"00": 500, "11": 500},
            "measuredQubits": [0, 1]
        }"#;
        let result: TaskResult = serde_json::from_str(json).unwrap();
        let counts = result.measurement_counts.unwrap();
        assert_eq!(counts.get("00"), Some(&500));
        assert_eq!(counts.get("11"), Some(&500));
        assert_eq!(result.measured_qubits, Some(vec![0, 1]));
    }

    #[test]
    fn test_task_result_deserialize_measurements() {
        let json = r#"{
            "measurements": [[0, 0], [1, 1], [0, 0], [1, 1]],
            "measuredQubits": [0, 1]
        }"#;
        let result: TaskResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.measurements.as_ref().map(Vec::len), Some(4));
        assert!(result.measurement_counts.is_none());
        assert!(result.measurement_probabilities.is_none());
    }
}
