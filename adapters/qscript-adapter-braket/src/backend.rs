//! AWS Braket backend implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use qscript_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, WaitPolicy,
};
use qscript_ir::Circuit;
use qscript_qasm3::{Dialect, emit_with};

use crate::api::{BraketClient, DeviceInfo, DeviceStatus, DeviceType, TaskResult, TaskStatus};
use crate::config::BraketConfig;
use crate::device::{capabilities_for_device, provider_from_arn, resolve_device};
use crate::error::{BraketError, BraketResult};

/// Terminal entries are evicted once the cache reaches this size.
const MAX_CACHED_JOBS: usize = 10_000;

const DEVICE_INFO_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedJob {
    status: JobStatus,
    result: Option<ExecutionResult>,
    /// Denominator when only `measurementProbabilities` come back.
    shots: u32,
}

/// A QPU or managed simulator reached through Amazon Braket.
///
/// Tasks are submitted as OpenQASM 3 in the Braket dialect and their
/// results are read back from S3.
pub struct BraketBackend {
    client: Arc<BraketClient>,
    device_arn: String,
    capabilities: Capabilities,
    wait: WaitPolicy,
    jobs: Arc<Mutex<FxHashMap<String, CachedJob>>>,
    device_info: Arc<RwLock<Option<(DeviceInfo, Instant)>>>,
}

impl BraketBackend {
    /// Connect using [`BraketConfig::from_env`].
    pub async fn connect(device: &str) -> BraketResult<Self> {
        Self::connect_with(device, BraketConfig::from_env()?).await
    }

    /// Connect to `device`, a full ARN or a name such as `"aspen-9"`.
    pub async fn connect_with(device: &str, config: BraketConfig) -> BraketResult<Self> {
        let device_arn = resolve_device(device)?;
        let client = BraketClient::new(&config).await;

        let capabilities = match capabilities_for_device(&device_arn) {
            Some(caps) => caps,
            None => build_capabilities_from_info(&client.get_device(&device_arn).await?),
        };
        info!(
            device = %device_arn,
            provider = provider_from_arn(&device_arn),
            qubits = capabilities.num_qubits,
            "connected to Braket"
        );

        Ok(Self {
            client: Arc::new(client),
            device_arn,
            capabilities,
            wait: config.wait,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            device_info: Arc::new(RwLock::new(None)),
        })
    }

    pub fn device_arn(&self) -> &str {
        &self.device_arn
    }

    async fn get_device_info(&self) -> BraketResult<DeviceInfo> {
        {
            let cached = self.device_info.read().await;
            if let Some((ref info, fetched_at)) = *cached {
                if fetched_at.elapsed() < DEVICE_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_device(&self.device_arn).await?;
        *self.device_info.write().await = Some((info.clone(), Instant::now()));
        Ok(info)
    }
}

/// Counts from a Braket result document.
///
/// Prefers `measurementCounts`, then per-shot `measurements`, then
/// `measurementProbabilities` scaled by the submitted shot count.
pub(crate) fn parse_result(result: &TaskResult, submitted_shots: u32) -> BraketResult<Counts> {
    if let Some(measurement_counts) = &result.measurement_counts {
        return Ok(measurement_counts
            .iter()
            .map(|(bits, &n)| (bits.clone(), n))
            .collect());
    }

    if let Some(measurements) = &result.measurements {
        let width = result.measured_qubits.as_ref().map(Vec::len);
        let mut counts = Counts::new();
        for row in measurements {
            if width.is_some_and(|w| w != row.len()) {
                return Err(BraketError::ResultParseError(format!(
                    "measurement row of width {} for {} measured qubits",
                    row.len(),
                    width.unwrap_or_default()
                )));
            }
            let bitstring: String = row.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect();
            counts.insert(bitstring, 1);
        }
        return Ok(counts);
    }

    if let Some(probs) = &result.measurement_probabilities {
        if submitted_shots == 0 {
            return Err(BraketError::ResultParseError(
                "probabilities without a known shot count".into(),
            ));
        }
        let mut counts = Counts::new();
        for (bitstring, &prob) in probs {
            let count = (prob * f64::from(submitted_shots)).max(0.0).round() as u64;
            if count > 0 {
                counts.insert(bitstring.clone(), count);
            }
        }
        return Ok(counts);
    }

    Err(BraketError::ResultParseError(
        "no measurement data in result".into(),
    ))
}

pub(crate) fn job_status(task: TaskStatus) -> JobStatus {
    match task {
        TaskStatus::Created | TaskStatus::Queued => JobStatus::Queued,
        TaskStatus::Running => JobStatus::Running,
        TaskStatus::Completed => JobStatus::Completed,
        TaskStatus::Failed(msg) => JobStatus::Failed(msg),
        TaskStatus::Cancelling | TaskStatus::Cancelled => JobStatus::Cancelled,
    }
}

/// Capabilities for a device with no preset.
fn build_capabilities_from_info(info: &DeviceInfo) -> Capabilities {
    let is_simulator = info.device_type == DeviceType::Simulator;
    let num_qubits =
        extract_qubit_count(&info.capabilities_json).unwrap_or(if is_simulator { 34 } else { 20 });

    if is_simulator {
        Capabilities::braket_simulator(&info.device_name, num_qubits)
    } else if info.provider_name.eq_ignore_ascii_case("ionq") {
        Capabilities::braket_ionq(&info.device_name, num_qubits)
    } else {
        Capabilities::braket_rigetti(&info.device_name, num_qubits)
    }
}

/// `paradigm.qubitCount` from a capabilities document.
fn extract_qubit_count(capabilities_json: &str) -> Option<u32> {
    let val: serde_json::Value = serde_json::from_str(capabilities_json).ok()?;
    val.get("paradigm")
        .and_then(|p| p.get("qubitCount"))
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

#[async_trait]
impl Backend for BraketBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.get_device_info().await {
            Ok(info) if info.status == DeviceStatus::Online => Ok(BackendAvailability {
                is_available: true,
                queue_depth: None,
                status_message: Some(format!("{} ({})", info.device_name, info.provider_name)),
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(format!(
                "{} is {:?}",
                info.device_name, info.status
            ))),
            Err(e) => Ok(BackendAvailability::unavailable(format!(
                "failed to query device: {e}"
            ))),
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name(), device = %self.device_arn))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.capabilities.check_shots(shots)?;
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit requires {} qubits but device only has {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }

        let qasm = emit_with(circuit, Dialect::Braket).map_err(BraketError::from)?;
        debug!(%qasm, "emitted program");

        let task_arn = self
            .client
            .create_task(&self.device_arn, &qasm, shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;
        info!(task = %task_arn, shots, "task created");

        let mut jobs = self.jobs.lock().await;
        if jobs.len() >= MAX_CACHED_JOBS {
            jobs.retain(|_, j| !j.status.is_terminal());
        }
        jobs.insert(
            task_arn.clone(),
            CachedJob {
                status: JobStatus::Queued,
                result: None,
                shots,
            },
        );

        Ok(JobId(task_arn))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = job_status(self.client.get_task_status(&job_id.0).await?);

        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.status = status.clone();
        }
        Ok(status)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        if let Some(result) = self
            .jobs
            .lock()
            .await
            .get(&job_id.0)
            .and_then(|cached| cached.result.clone())
        {
            return Ok(result);
        }

        match self.client.get_task_status(&job_id.0).await? {
            TaskStatus::Completed => {}
            TaskStatus::Failed(msg) => return Err(BraketError::TaskFailed(msg).into()),
            TaskStatus::Cancelled | TaskStatus::Cancelling => {
                return Err(BraketError::TaskCancelled(job_id.0.clone()).into());
            }
            TaskStatus::Created | TaskStatus::Queued | TaskStatus::Running => {
                return Err(HalError::JobNotReady(job_id.0.clone()));
            }
        }

        let task_result = self.client.get_task_result(&job_id.0).await?;
        let submitted_shots = self
            .jobs
            .lock()
            .await
            .get(&job_id.0)
            .map_or(0, |j| j.shots);

        let counts = parse_result(&task_result, submitted_shots)?;
        let total_shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);
        let result = ExecutionResult::new(counts, total_shots);

        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.result = Some(result.clone());
            cached.status = JobStatus::Completed;
        }
        Ok(result)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_task(&job_id.0).await?;
        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.status = JobStatus::Cancelled;
        }
        Ok(())
    }

    fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }
}
