//! Connection settings.

use std::time::Duration;

use qscript_hal::WaitPolicy;

use crate::error::{BraketError, BraketResult};

pub const DEFAULT_S3_PREFIX: &str = "qscript-results";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Where task results land and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BraketConfig {
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub region: String,
    /// Hardware queues can hold a task for hours.
    pub wait: WaitPolicy,
}

impl BraketConfig {
    pub fn new(s3_bucket: impl Into<String>) -> Self {
        Self {
            s3_bucket: s3_bucket.into(),
            s3_prefix: DEFAULT_S3_PREFIX.to_string(),
            region: DEFAULT_REGION.to_string(),
            wait: WaitPolicy::new(Duration::from_secs(1), Duration::from_secs(24 * 60 * 60)),
        }
    }

    /// Read the process environment:
    /// - `QSCRIPT_BRAKET_S3_BUCKET` (required)
    /// - `QSCRIPT_BRAKET_S3_PREFIX` (default `"qscript-results"`)
    /// - `AWS_REGION` (default `"us-east-1"`)
    pub fn from_env() -> BraketResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BraketResult<Self> {
        let bucket = lookup("QSCRIPT_BRAKET_S3_BUCKET")
            .filter(|b| !b.is_empty())
            .ok_or(BraketError::MissingS3Bucket)?;
        let mut config = Self::new(bucket);
        if let Some(prefix) = lookup("QSCRIPT_BRAKET_S3_PREFIX") {
            config.s3_prefix = prefix;
        }
        if let Some(region) = lookup("AWS_REGION") {
            config.region = region;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.s3_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }
}
