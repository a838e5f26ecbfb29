//! File-backed result store
//!
//! Layout under the configured directory:
//! - `checks/<record_id>.json`: the latest result per record, replaced atomically
//! - `company_status.jsonl`, `analysis_status.jsonl`: append-only status updates

use crate::store::{check_key, ResultStore, StatusSink, StatusUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use vendorscope_core::{ClassificationResult, Error, Result};

const CHECKS_DIR: &str = "checks";
const COMPANY_STATUS_FILE: &str = "company_status.jsonl";
const ANALYSIS_STATUS_FILE: &str = "analysis_status.jsonl";

/// Configuration for file persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Directory holding the cache and status files
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// One line of a status file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub key: String,
    #[serde(flatten)]
    pub update: StatusUpdate,
    pub recorded_at: DateTime<Utc>,
}

/// Which status file to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Company,
    Analysis,
}

impl StatusKind {
    fn file_name(self) -> &'static str {
        match self {
            Self::Company => COMPANY_STATUS_FILE,
            Self::Analysis => ANALYSIS_STATUS_FILE,
        }
    }
}

/// JSON files on local disk
#[derive(Debug, Clone)]
pub struct FileStore {
    config: FileStoreConfig,
}

impl FileStore {
    /// Create the store, creating its directories if needed
    pub async fn open(config: FileStoreConfig) -> Result<Self> {
        tokio::fs::create_dir_all(config.dir.join(CHECKS_DIR)).await?;
        debug!(dir = %config.dir.display(), "File store opened");
        Ok(Self { config })
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    fn check_path(&self, record_id: &str) -> PathBuf {
        self.config
            .dir
            .join(CHECKS_DIR)
            .join(format!("{}.json", record_id))
    }

    async fn append_status(&self, kind: StatusKind, key: &str, update: &StatusUpdate) -> Result<()> {
        let record = StatusRecord {
            key: key.to_string(),
            update: update.clone(),
            recorded_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let path = self.config.dir.join(kind.file_name());
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Most recent status written for `key`
    pub async fn latest_status(&self, kind: StatusKind, key: &str) -> Result<Option<StatusRecord>> {
        let path = self.config.dir.join(kind.file_name());
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest = None;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<StatusRecord>(line) {
                Ok(record) if record.key == key => latest = Some(record),
                Ok(_) => {}
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping malformed status line"),
            }
        }
        Ok(latest)
    }
}

#[async_trait]
impl ResultStore for FileStore {
    async fn load_fresh(
        &self,
        record_id: &str,
        ttl: chrono::Duration,
    ) -> Result<Option<ClassificationResult>> {
        check_key(record_id)?;
        let path = self.check_path(record_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let result: ClassificationResult = serde_json::from_str(&content)
            .map_err(|e| Error::store(format!("Corrupt cache entry {}: {}", path.display(), e)))?;

        if result.is_fresh(Utc::now(), ttl) {
            Ok(Some(result))
        } else {
            debug!(record_id = %record_id, checked_at = %result.checked_at, "Cache entry expired");
            Ok(None)
        }
    }

    async fn upsert(&self, record_id: &str, result: &ClassificationResult) -> Result<()> {
        check_key(record_id)?;
        let path = self.check_path(record_id);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(result)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl StatusSink for FileStore {
    async fn update_company_status(&self, record_id: &str, update: &StatusUpdate) -> Result<()> {
        self.append_status(StatusKind::Company, record_id, update).await
    }

    async fn update_analysis_status(&self, tax_id: &str, update: &StatusUpdate) -> Result<()> {
        self.append_status(StatusKind::Analysis, tax_id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vendorscope_core::{ConfidenceLevel, Methodology, Status};

    fn result(checked_at: DateTime<Utc>) -> ClassificationResult {
        ClassificationResult {
            status: Status::NoGo,
            confidence_level: ConfidenceLevel::Medium,
            confidence_percent: 50,
            total_weight: 75,
            triple_count: 0,
            double_count: 1,
            single_count: 0,
            evidences: Vec::new(),
            methodology: Methodology::default(),
            segment: None,
            checked_at,
            from_cache: false,
        }
    }

    async fn store(dir: &TempDir) -> FileStore {
        FileStore::open(FileStoreConfig {
            dir: dir.path().to_path_buf(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_then_load_fresh() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let saved = result(Utc::now());

        store.upsert("company-1", &saved).await.unwrap();
        let loaded = store
            .load_fresh("company-1", chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn test_expired_entry_is_not_returned() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        store
            .upsert("company-1", &result(Utc::now() - chrono::Duration::hours(25)))
            .await
            .unwrap();
        let loaded = store
            .load_fresh("company-1", chrono::Duration::hours(24))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let loaded = store
            .load_fresh("unknown", chrono::Duration::hours(24))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let err = store.upsert("../escape", &result(Utc::now())).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_status_lines_latest_wins() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        let first = StatusUpdate::from(&result(Utc::now()));
        let mut second = first.clone();
        second.status = Status::Go;
        second.confidence_percent = 95;

        store.update_company_status("company-1", &first).await.unwrap();
        store.update_company_status("company-2", &first).await.unwrap();
        store.update_company_status("company-1", &second).await.unwrap();
        store
            .update_analysis_status("12.345.678/0001-90", &first)
            .await
            .unwrap();

        let latest = store
            .latest_status(StatusKind::Company, "company-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.update, second);

        let analysis = store
            .latest_status(StatusKind::Analysis, "12.345.678/0001-90")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.update.confidence_percent, 50);
        assert!(store
            .latest_status(StatusKind::Analysis, "company-1")
            .await
            .unwrap()
            .is_none());
    }
}
