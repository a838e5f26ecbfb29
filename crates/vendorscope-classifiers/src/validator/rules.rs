//! Rule trait, evaluation context and chain driver

use super::company::CompanyMatcher;
use crate::lexicon::Lexicon;
use crate::text::window_around;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use vendorscope_core::{MatchType, SearchResult, SourceType};

/// Why a search hit was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    VendorJob,
    FormerEmployee,
    CrossMention,
    GenericList,
    JointMention,
    VendorAbsent,
    CompanyAbsent,
    OutOfWindow,
    NoBusinessContext,
    NoQualifyingTier,
}

impl RejectReason {
    /// Stable label used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VendorJob => "vendor_job",
            Self::FormerEmployee => "former_employee",
            Self::CrossMention => "cross_mention",
            Self::GenericList => "generic_list",
            Self::JointMention => "joint_mention",
            Self::VendorAbsent => "vendor_absent",
            Self::CompanyAbsent => "company_absent",
            Self::OutOfWindow => "out_of_window",
            Self::NoBusinessContext => "no_business_context",
            Self::NoQualifyingTier => "no_qualifying_tier",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Hand over to the next rule
    Continue,
    /// Discard the hit
    Reject(RejectReason),
    /// Stop and classify the hit with this tier
    Tier(MatchType),
}

/// State shared by the rules evaluating one search hit.
///
/// `title` and `text` are lowercase; `text` is title and snippet joined.
/// Later rules read what earlier rules recorded.
pub struct RuleContext<'a> {
    pub lexicon: &'a Lexicon,
    pub company: &'a CompanyMatcher,
    pub source_type: SourceType,
    pub title: String,
    pub text: String,
    /// Byte span of the first company mention in `text`
    pub company_span: Option<(usize, usize)>,
    pub vendor_in_window: bool,
    pub products_in_window: bool,
    pub products: BTreeSet<String>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        lexicon: &'a Lexicon,
        company: &'a CompanyMatcher,
        source_type: SourceType,
        result: &SearchResult,
    ) -> Self {
        let title = result.title.to_lowercase();
        let text = format!("{} {}", result.title, result.snippet).to_lowercase();
        Self {
            lexicon,
            company,
            source_type,
            title,
            text,
            company_span: None,
            vendor_in_window: false,
            products_in_window: false,
            products: BTreeSet::new(),
        }
    }

    /// Proximity window around the company mention, or the empty string
    /// before the mention has been located
    pub fn window(&self) -> &str {
        match self.company_span {
            Some((start, end)) => {
                window_around(&self.text, start, end, self.lexicon.window_radius())
            }
            None => "",
        }
    }
}

/// One step of evidence validation
pub trait ValidationRule: Send + Sync {
    /// Rule name for logging
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome;
}

/// Ordered rules evaluated until one rejects or assigns a tier
#[derive(Clone, Default)]
pub struct RuleChain {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Insert a rule before the one named `before`, or append if absent
    pub fn insert_before(mut self, before: &str, rule: impl ValidationRule + 'static) -> Self {
        let index = self
            .rules
            .iter()
            .position(|r| r.name() == before)
            .unwrap_or(self.rules.len());
        self.rules.insert(index, Arc::new(rule));
        self
    }

    /// Names of the rules in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run the rules in order. `Continue` means every rule passed.
    pub fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        for rule in &self.rules {
            match rule.evaluate(ctx) {
                RuleOutcome::Continue => continue,
                outcome => {
                    tracing::trace!(rule = rule.name(), outcome = ?outcome, "Rule decided");
                    return outcome;
                }
            }
        }
        RuleOutcome::Continue
    }
}
