//! Tier assignment rules
//!
//! Evaluated after screening and deep-context verification. A hit that no
//! rule classifies is rejected, never downgraded to single.

use super::rules::{RuleContext, RuleOutcome, ValidationRule};
use vendorscope_core::MatchType;

/// Company, vendor and product co-occur around the company mention
pub struct TripleMatchRule;

impl ValidationRule for TripleMatchRule {
    fn name(&self) -> &'static str {
        "triple_match"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        if !ctx.products.is_empty() && (ctx.vendor_in_window || ctx.products_in_window) {
            RuleOutcome::Tier(MatchType::Triple)
        } else {
            RuleOutcome::Continue
        }
    }
}

/// Company and vendor co-occur without a product
pub struct VendorDoubleRule;

impl ValidationRule for VendorDoubleRule {
    fn name(&self) -> &'static str {
        "vendor_double"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        if ctx.vendor_in_window {
            RuleOutcome::Tier(MatchType::Double)
        } else {
            RuleOutcome::Continue
        }
    }
}

/// A product under job, skills or implementation language
pub struct ProductUseDoubleRule;

impl ValidationRule for ProductUseDoubleRule {
    fn name(&self) -> &'static str {
        "product_use_double"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        if !ctx.products.is_empty() && ctx.lexicon.has_valid_use_context(&ctx.text) {
            RuleOutcome::Tier(MatchType::Double)
        } else {
            RuleOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Lexicon, VendorProfile};
    use crate::validator::company::CompanyMatcher;
    use vendorscope_core::{CompanyIdentity, SearchResult, SourceType};

    fn ctx_outcome(
        rule: &dyn ValidationRule,
        snippet: &str,
        setup: impl FnOnce(&mut RuleContext<'_>),
    ) -> RuleOutcome {
        let lexicon = Lexicon::new(VendorProfile::default()).unwrap();
        let company = CompanyMatcher::new(&CompanyIdentity::new("Acme"), &lexicon).unwrap();
        let result = SearchResult::new("Acme", snippet, "");
        let mut ctx = RuleContext::new(&lexicon, &company, SourceType::PremiumNews, &result);
        setup(&mut ctx);
        rule.evaluate(&mut ctx)
    }

    #[test]
    fn test_triple_requires_product_and_window_hit() {
        let outcome = ctx_outcome(&TripleMatchRule, "", |ctx| {
            ctx.products.insert("Protheus".into());
            ctx.vendor_in_window = true;
        });
        assert_eq!(outcome, RuleOutcome::Tier(MatchType::Triple));

        let outcome = ctx_outcome(&TripleMatchRule, "", |ctx| {
            ctx.products.insert("Protheus".into());
        });
        assert_eq!(outcome, RuleOutcome::Continue);
    }

    #[test]
    fn test_vendor_double() {
        let outcome = ctx_outcome(&VendorDoubleRule, "", |ctx| ctx.vendor_in_window = true);
        assert_eq!(outcome, RuleOutcome::Tier(MatchType::Double));
    }

    #[test]
    fn test_product_use_double() {
        let outcome = ctx_outcome(&ProductUseDoubleRule, "vaga de analista", |ctx| {
            ctx.products.insert("Protheus".into());
        });
        assert_eq!(outcome, RuleOutcome::Tier(MatchType::Double));

        let outcome = ctx_outcome(&ProductUseDoubleRule, "evento anual", |ctx| {
            ctx.products.insert("Protheus".into());
        });
        assert_eq!(outcome, RuleOutcome::Continue);
    }
}
