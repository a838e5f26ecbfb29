//! In-memory store

use crate::store::{ResultStore, StatusSink, StatusUpdate};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use vendorscope_core::{ClassificationResult, Result};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: RwLock<HashMap<String, ClassificationResult>>,
    company_status: RwLock<HashMap<String, StatusUpdate>>,
    analysis_status: RwLock<HashMap<String, StatusUpdate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored result regardless of age
    pub fn result(&self, record_id: &str) -> Option<ClassificationResult> {
        self.results.read().get(record_id).cloned()
    }

    pub fn company_status(&self, record_id: &str) -> Option<StatusUpdate> {
        self.company_status.read().get(record_id).cloned()
    }

    pub fn analysis_status(&self, tax_id: &str) -> Option<StatusUpdate> {
        self.analysis_status.read().get(tax_id).cloned()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn load_fresh(
        &self,
        record_id: &str,
        ttl: chrono::Duration,
    ) -> Result<Option<ClassificationResult>> {
        Ok(self
            .results
            .read()
            .get(record_id)
            .filter(|r| r.is_fresh(Utc::now(), ttl))
            .cloned())
    }

    async fn upsert(&self, record_id: &str, result: &ClassificationResult) -> Result<()> {
        self.results
            .write()
            .insert(record_id.to_string(), result.clone());
        Ok(())
    }
}

#[async_trait]
impl StatusSink for MemoryStore {
    async fn update_company_status(&self, record_id: &str, update: &StatusUpdate) -> Result<()> {
        self.company_status
            .write()
            .insert(record_id.to_string(), update.clone());
        Ok(())
    }

    async fn update_analysis_status(&self, tax_id: &str, update: &StatusUpdate) -> Result<()> {
        self.analysis_status
            .write()
            .insert(tax_id.to_string(), update.clone());
        Ok(())
    }
}
