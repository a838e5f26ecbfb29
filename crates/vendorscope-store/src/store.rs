//! Persistence traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vendorscope_core::{ClassificationResult, ConfidenceLevel, Error, Result, Status};

/// Cache of classification results keyed by internal record id
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Cached result for `record_id` if it was checked less than `ttl` ago
    async fn load_fresh(
        &self,
        record_id: &str,
        ttl: chrono::Duration,
    ) -> Result<Option<ClassificationResult>>;

    /// Insert or replace the cached result for `record_id`
    async fn upsert(&self, record_id: &str, result: &ClassificationResult) -> Result<()>;
}

/// Denormalized status fields on downstream records
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Status on the company record
    async fn update_company_status(&self, record_id: &str, update: &StatusUpdate) -> Result<()>;

    /// Status on the analysis-result record linked by tax id
    async fn update_analysis_status(&self, tax_id: &str, update: &StatusUpdate) -> Result<()>;
}

/// Status fields copied from a result onto downstream records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: Status,
    pub confidence_level: ConfidenceLevel,
    pub confidence_percent: u8,
    pub checked_at: DateTime<Utc>,
}

impl From<&ClassificationResult> for StatusUpdate {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            status: result.status,
            confidence_level: result.confidence_level,
            confidence_percent: result.confidence_percent,
            checked_at: result.checked_at,
        }
    }
}

/// Reject record ids that cannot safely name a file
pub(crate) fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid && !key.contains("..") {
        Ok(())
    } else {
        Err(Error::store(format!("Invalid record key: {:?}", key)))
    }
}
