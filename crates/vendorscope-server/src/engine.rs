//! Run orchestration
//!
//! A run checks the cache, searches every planned phase in order, validates
//! each hit and classifies what was accepted. Whatever the outcome, the
//! result built from the evidence gathered so far is persisted before the
//! run returns.

use crate::config::RunConfig;
use crate::search::SearchClient;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;
use vendorscope_classifiers::{
    CompanyMatcher, DeepContext, EvidenceValidator, FetchBudget, Lexicon, Verdict,
};
use vendorscope_core::{ClassificationResult, CompanyIdentity, Evidence, Methodology};
use vendorscope_policy::{EnginePolicy, Phase, QueryGenerator};
use vendorscope_store::{ResultStore, StatusSink, StatusUpdate};

/// Limits applied to each run
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub query_delay: Duration,
    pub run_timeout: Duration,
    pub max_url_fetches: u32,
    pub cache_ttl: chrono::Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for EngineSettings {
    fn from(config: &RunConfig) -> Self {
        Self {
            query_delay: Duration::from_millis(config.query_delay_ms),
            run_timeout: Duration::from_secs(config.timeout_secs),
            max_url_fetches: config.max_url_fetches,
            cache_ttl: chrono::Duration::hours(config.cache_ttl_hours),
        }
    }
}

/// Why a run did not produce a complete result
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Config(String),

    /// The run hit its time limit; `partial` was persisted
    #[error("run timed out")]
    Timeout { partial: Box<ClassificationResult> },

    /// Unexpected failure; `partial` was persisted
    #[error("run failed: {message}")]
    Failed {
        message: String,
        partial: Box<ClassificationResult>,
    },
}

impl RunError {
    fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config_error",
            Self::Timeout { .. } => "timeout",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Mutable state of one run, kept outside the timed future so a timeout
/// leaves it readable
struct RunState {
    evidences: Vec<Evidence>,
    methodology: Methodology,
    budget: FetchBudget,
    seen_urls: HashSet<String>,
}

impl RunState {
    fn new(max_url_fetches: u32) -> Self {
        Self {
            evidences: Vec::new(),
            methodology: Methodology::default(),
            budget: FetchBudget::new(max_url_fetches),
            seen_urls: HashSet::new(),
        }
    }
}

/// Vendor-usage check engine
pub struct UsageEngine {
    lexicon: Arc<Lexicon>,
    policy: Arc<EnginePolicy>,
    validator: EvidenceValidator,
    search: Option<Arc<dyn SearchClient>>,
    results: Arc<dyn ResultStore>,
    statuses: Arc<dyn StatusSink>,
    settings: EngineSettings,
}

impl UsageEngine {
    /// Engine without a search client and with basic validation only
    pub fn new(
        lexicon: Arc<Lexicon>,
        policy: Arc<EnginePolicy>,
        results: Arc<dyn ResultStore>,
        statuses: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            validator: EvidenceValidator::new(lexicon.clone()),
            lexicon,
            policy,
            search: None,
            results,
            statuses,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_deep_context(mut self, deep: DeepContext) -> Self {
        self.validator = EvidenceValidator::new(self.lexicon.clone()).with_deep_context(deep);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Check one company
    pub async fn run(&self, company: &CompanyIdentity) -> Result<ClassificationResult, RunError> {
        let span = info_span!(
            "usage_check",
            run_id = %Uuid::new_v4(),
            company = %company.display_name(),
        );

        let started = Instant::now();
        let outcome = self.run_inner(company, started).instrument(span).await;

        metrics::histogram!("vendorscope_run_duration_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        let label = match &outcome {
            Ok(result) if result.from_cache => "cache_hit",
            Ok(_) => "completed",
            Err(e) => e.outcome(),
        };
        metrics::counter!("vendorscope_runs_total", "outcome" => label).increment(1);

        outcome
    }

    async fn run_inner(
        &self,
        company: &CompanyIdentity,
        started: Instant,
    ) -> Result<ClassificationResult, RunError> {
        company
            .validate()
            .map_err(|e| RunError::InvalidInput(e.to_string()))?;

        if let Some(cached) = self.cached(company).await {
            return Ok(cached);
        }

        let search = self.search.as_ref().ok_or_else(|| {
            error!("Search provider API key is not configured");
            RunError::Config("search provider API key is not configured".to_string())
        })?;

        let segment = self
            .policy
            .segment_keywords
            .detect(company.display_name(), company.industry.as_deref());
        let phases = QueryGenerator::new(self.lexicon.profile()).plan(
            &self.policy.pools,
            company,
            self.lexicon.normalizer(),
        );
        info!(phases = phases.len(), segment = ?segment, "Run started");

        let mut state = RunState::new(self.settings.max_url_fetches);
        let outcome = match CompanyMatcher::new(company, &self.lexicon) {
            Ok(matcher) => {
                tokio::time::timeout(
                    self.settings.run_timeout,
                    self.collect(search.as_ref(), &phases, &matcher, &mut state),
                )
                .await
            }
            Err(e) => Ok(Err(e)),
        };

        state.methodology.partial = !matches!(outcome, Ok(Ok(())));
        state.methodology.elapsed_ms = started.elapsed().as_millis() as u64;

        let result = self.policy.classify(
            self.lexicon.profile(),
            state.evidences,
            segment,
            state.methodology,
            Utc::now(),
        );
        self.finalize(company, &result).await;

        match outcome {
            Ok(Ok(())) => {
                info!(
                    status = %result.status,
                    percent = result.confidence_percent,
                    evidences = result.evidences.len(),
                    queries = result.methodology.total_queries,
                    elapsed_ms = result.methodology.elapsed_ms,
                    "Run complete"
                );
                Ok(result)
            }
            Err(_) => {
                warn!(
                    evidences = result.evidences.len(),
                    timeout_secs = self.settings.run_timeout.as_secs(),
                    "Run timed out, partial results saved"
                );
                Err(RunError::Timeout {
                    partial: Box::new(result),
                })
            }
            Ok(Err(e)) => {
                error!(error = %e, evidences = result.evidences.len(), "Run failed, partial results saved");
                Err(RunError::Failed {
                    message: e.to_string(),
                    partial: Box::new(result),
                })
            }
        }
    }

    /// Fresh cached result for the company's record, marked as such
    async fn cached(&self, company: &CompanyIdentity) -> Option<ClassificationResult> {
        let record_id = company.record_id.as_deref()?;
        match self.results.load_fresh(record_id, self.settings.cache_ttl).await {
            Ok(Some(cached)) if cached.methodology.partial => {
                debug!(record_id = %record_id, "Cached result is partial, running fresh");
                None
            }
            Ok(Some(mut cached)) => {
                cached.from_cache = true;
                metrics::counter!("vendorscope_cache_hits_total").increment(1);
                info!(record_id = %record_id, checked_at = %cached.checked_at, "Returning cached result");
                Some(cached)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(record_id = %record_id, error = %e, "Cache read failed, running fresh");
                None
            }
        }
    }

    /// Search and validate phase by phase, appending to `state` as it goes
    async fn collect(
        &self,
        search: &dyn SearchClient,
        phases: &[Phase],
        matcher: &CompanyMatcher,
        state: &mut RunState,
    ) -> vendorscope_core::Result<()> {
        let mut first = true;

        for phase in phases {
            let before = state.evidences.len();
            info!(phase = %phase.source_type, queries = phase.queries.len(), "Phase started");

            for query in &phase.queries {
                if !first && !self.settings.query_delay.is_zero() {
                    tokio::time::sleep(self.settings.query_delay).await;
                }
                first = false;

                state.methodology.total_queries += 1;
                metrics::counter!("vendorscope_queries_total").increment(1);

                let results = match search.search(query).await {
                    Ok(results) => results,
                    Err(e) if e.is_recoverable() => {
                        warn!(source = %query.source_name(), error = %e, "Source unavailable, skipping");
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                state.methodology.sources_consulted += 1;
                *state
                    .methodology
                    .sources_by_type
                    .entry(query.source_type)
                    .or_insert(0) += 1;

                for result in &results {
                    if !result.url.is_empty() && state.seen_urls.contains(&result.url) {
                        debug!(url = %result.url, "Already accepted, skipping");
                        continue;
                    }

                    match self
                        .validator
                        .validate(result, query, matcher, &mut state.budget)
                        .await
                    {
                        Verdict::Accepted(evidence) => {
                            info!(
                                source = %evidence.source_name,
                                match_type = evidence.match_type.as_str(),
                                method = ?evidence.validation_method,
                                url = %evidence.url,
                                "Evidence accepted"
                            );
                            metrics::counter!(
                                "vendorscope_evidence_total",
                                "match_type" => evidence.match_type.as_str()
                            )
                            .increment(1);
                            if !evidence.url.is_empty() {
                                state.seen_urls.insert(evidence.url.clone());
                            }
                            state.evidences.push(evidence);
                        }
                        Verdict::Rejected(reason) => {
                            metrics::counter!(
                                "vendorscope_rejections_total",
                                "reason" => reason.as_str()
                            )
                            .increment(1);
                        }
                    }
                }
            }

            info!(
                phase = %phase.source_type,
                accepted = state.evidences.len() - before,
                fetches_used = state.budget.used(),
                "Phase complete"
            );
        }

        // Zero evidence only means "go" if sources actually answered
        if state.methodology.total_queries > 0 && state.methodology.sources_consulted == 0 {
            return Err(vendorscope_core::Error::search(format!(
                "all {} search queries failed",
                state.methodology.total_queries
            )));
        }

        Ok(())
    }

    /// Persist the result and copy its status downstream. Each write is
    /// independent and failures are only logged. A run that consulted no
    /// source and found nothing has no status worth copying.
    async fn finalize(&self, company: &CompanyIdentity, result: &ClassificationResult) {
        let update = StatusUpdate::from(result);
        let publish = result.methodology.sources_consulted > 0 || !result.evidences.is_empty();

        if let Some(record_id) = company.record_id.as_deref() {
            if let Err(e) = self.results.upsert(record_id, result).await {
                warn!(record_id = %record_id, error = %e, "Failed to cache result");
            }
        }

        if !publish {
            warn!("No source was consulted, status records left unchanged");
            return;
        }

        if let Some(record_id) = company.record_id.as_deref() {
            if let Err(e) = self.statuses.update_company_status(record_id, &update).await {
                warn!(record_id = %record_id, error = %e, "Failed to update company status");
            }
        }

        if let Some(tax_id) = company.tax_id() {
            if let Err(e) = self.statuses.update_analysis_status(tax_id, &update).await {
                warn!(tax_id = %tax_id, error = %e, "Failed to update analysis status");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_run_config() {
        let settings = EngineSettings::from(&RunConfig {
            query_delay_ms: 0,
            timeout_secs: 30,
            max_url_fetches: 5,
            cache_ttl_hours: 12,
        });
        assert!(settings.query_delay.is_zero());
        assert_eq!(settings.run_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_url_fetches, 5);
        assert_eq!(settings.cache_ttl, chrono::Duration::hours(12));
    }

    #[test]
    fn test_run_error_outcomes() {
        assert_eq!(RunError::Config("x".into()).outcome(), "config_error");
        assert_eq!(RunError::InvalidInput("x".into()).outcome(), "invalid_input");
    }
}
