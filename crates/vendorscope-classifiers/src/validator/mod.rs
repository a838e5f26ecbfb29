//! Evidence validation
//!
//! A search hit passes through three stages:
//! - a screening [`RuleChain`] that rejects false positives and locates the
//!   company/vendor co-occurrence
//! - optional deep-context verification of the hit's URL, bounded by a
//!   per-run [`FetchBudget`]
//! - a tier [`RuleChain`] that assigns triple or double, or rejects
//!
//! Both chains are plain rule lists; new heuristics are added by inserting
//! a rule, not by editing the driver.

pub mod company;
pub mod rules;
pub mod screening;
pub mod tier;

pub use company::CompanyMatcher;
pub use rules::{RejectReason, RuleChain, RuleContext, RuleOutcome, ValidationRule};

use crate::lexicon::Lexicon;
use crate::verifier::{DeepContext, FetchBudget};
use std::sync::Arc;
use tracing::{debug, warn};
use vendorscope_core::{Evidence, MatchType, SearchQuery, SearchResult, ValidationMethod};

/// Outcome of validating one search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(Evidence),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn evidence(&self) -> Option<&Evidence> {
        match self {
            Self::Accepted(evidence) => Some(evidence),
            Self::Rejected(_) => None,
        }
    }

    pub fn into_evidence(self) -> Option<Evidence> {
        match self {
            Self::Accepted(evidence) => Some(evidence),
            Self::Rejected(_) => None,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            Self::Accepted(evidence) => evidence.match_type,
            Self::Rejected(_) => MatchType::Rejected,
        }
    }
}

/// Screening rules in evaluation order
pub fn default_screening_chain() -> RuleChain {
    RuleChain::new()
        .with_rule(screening::VendorJobRule)
        .with_rule(screening::FormerEmployeeRule)
        .with_rule(screening::CrossMentionRule)
        .with_rule(screening::GenericListRule)
        .with_rule(screening::VendorPresenceRule)
        .with_rule(screening::CompanyPresenceRule)
        .with_rule(screening::ProximityRule)
        .with_rule(screening::ProductDetectionRule)
}

/// Tier rules in evaluation order
pub fn default_tier_chain() -> RuleChain {
    RuleChain::new()
        .with_rule(tier::TripleMatchRule)
        .with_rule(tier::VendorDoubleRule)
        .with_rule(tier::ProductUseDoubleRule)
}

/// Decides whether a search hit is usable evidence of vendor usage
#[derive(Clone)]
pub struct EvidenceValidator {
    lexicon: Arc<Lexicon>,
    deep: DeepContext,
    screening: RuleChain,
    tiering: RuleChain,
}

impl EvidenceValidator {
    /// Validator with the default rule chains and no deep verification
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            deep: DeepContext::disabled(),
            screening: default_screening_chain(),
            tiering: default_tier_chain(),
        }
    }

    /// Use this fetcher/verifier pair for deep-context verification
    pub fn with_deep_context(mut self, deep: DeepContext) -> Self {
        self.deep = deep;
        self
    }

    /// Replace the screening chain
    pub fn with_screening(mut self, chain: RuleChain) -> Self {
        self.screening = chain;
        self
    }

    /// Replace the tier chain
    pub fn with_tiering(mut self, chain: RuleChain) -> Self {
        self.tiering = chain;
        self
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Validate one hit produced by `query`.
    ///
    /// Deterministic for identical inputs, identical fetcher/verifier
    /// answers and an identical budget state.
    pub async fn validate(
        &self,
        result: &SearchResult,
        query: &SearchQuery,
        company: &CompanyMatcher,
        budget: &mut FetchBudget,
    ) -> Verdict {
        let mut ctx = RuleContext::new(&self.lexicon, company, query.source_type, result);

        if let RuleOutcome::Reject(reason) = self.screening.evaluate(&mut ctx) {
            debug!(
                company = %company.name(),
                source = %query.source_name(),
                reason = %reason,
                title = %result.title,
                "Evidence rejected"
            );
            return Verdict::Rejected(reason);
        }

        let method = match self.deep_verify(&mut ctx, &result.url, company, budget).await {
            Ok(method) => method,
            Err(reason) => {
                debug!(company = %company.name(), url = %result.url, reason = %reason, "Evidence rejected");
                return Verdict::Rejected(reason);
            }
        };

        let match_type = match self.tiering.evaluate(&mut ctx) {
            RuleOutcome::Tier(tier) => tier,
            RuleOutcome::Reject(reason) => return Verdict::Rejected(reason),
            RuleOutcome::Continue => {
                debug!(company = %company.name(), title = %result.title, "No qualifying tier");
                return Verdict::Rejected(RejectReason::NoQualifyingTier);
            }
        };

        let intent_keywords = self.lexicon.intent_keywords_in(&ctx.text);

        Verdict::Accepted(Evidence {
            source_type: query.source_type,
            source_name: query.source_name(),
            weight: query.weight,
            match_type,
            detected_products: ctx.products,
            has_purchase_intent: !intent_keywords.is_empty(),
            intent_keywords,
            url: result.url.clone(),
            title: result.title.clone(),
            snippet: result.snippet.clone(),
            validation_method: method,
        })
    }

    /// Fetch and classify the hit's page while the budget lasts.
    ///
    /// Fetch or classifier failures fall back to the basic verdict; only an
    /// explicit negative answer rejects.
    async fn deep_verify(
        &self,
        ctx: &mut RuleContext<'_>,
        url: &str,
        company: &CompanyMatcher,
        budget: &mut FetchBudget,
    ) -> std::result::Result<ValidationMethod, RejectReason> {
        if url.is_empty() {
            return Ok(ValidationMethod::Basic);
        }
        if !budget.try_acquire() {
            debug!(url = %url, "Fetch budget exhausted, using basic validation");
            return Ok(ValidationMethod::Basic);
        }

        let page = match self.deep.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Page fetch failed, using basic validation");
                return Ok(ValidationMethod::Basic);
            }
        };
        let page_text = page.combined();

        match self.deep.verifier.confirm(company.name(), &page_text).await {
            Ok(true) => {
                ctx.products
                    .extend(self.lexicon.detector().detect(&page_text));
                Ok(self.deep.verifier.method())
            }
            Ok(false) => Err(RejectReason::NoBusinessContext),
            Err(e) => {
                warn!(url = %url, error = %e, "Context verification failed, using basic validation");
                Ok(ValidationMethod::Basic)
            }
        }
    }
}
