//! Screening rules: false-positive rejection and co-occurrence checks

use super::rules::{RejectReason, RuleContext, RuleOutcome, ValidationRule};
use crate::text::contains_word;

/// Job openings at the vendor itself: the vendor is the employer
pub struct VendorJobRule;

impl ValidationRule for VendorJobRule {
    fn name(&self) -> &'static str {
        "vendor_job"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        let hit = ctx
            .lexicon
            .profile()
            .job_patterns
            .iter()
            .any(|p| ctx.text.contains(&p.to_lowercase()));
        if hit {
            RuleOutcome::Reject(RejectReason::VendorJob)
        } else {
            RuleOutcome::Continue
        }
    }
}

/// Job-board posts describing past rather than current employment
pub struct FormerEmployeeRule;

impl ValidationRule for FormerEmployeeRule {
    fn name(&self) -> &'static str {
        "former_employee"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        if !ctx.source_type.is_job_board() {
            return RuleOutcome::Continue;
        }
        let hit = ctx
            .lexicon
            .profile()
            .former_employee_terms
            .iter()
            .any(|t| ctx.text.contains(&t.to_lowercase()));
        if hit {
            RuleOutcome::Reject(RejectReason::FormerEmployee)
        } else {
            RuleOutcome::Continue
        }
    }
}

/// Titles naming a peer company but not the investigated one
pub struct CrossMentionRule;

impl ValidationRule for CrossMentionRule {
    fn name(&self) -> &'static str {
        "cross_mention"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        let peer_in_title = ctx
            .lexicon
            .profile()
            .peer_companies
            .iter()
            .find(|peer| contains_word(&ctx.title, &peer.to_lowercase()) && !ctx.company.is_own_name(peer));

        match peer_in_title {
            Some(_) if !ctx.company.mentioned_in(&ctx.title) => {
                RuleOutcome::Reject(RejectReason::CrossMention)
            }
            _ => RuleOutcome::Continue,
        }
    }
}

/// Stock-ticker lists, rankings and joint mentions without a direct relationship
pub struct GenericListRule;

impl ValidationRule for GenericListRule {
    fn name(&self) -> &'static str {
        "generic_list"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        if ctx.lexicon.is_generic_list(&ctx.text) {
            return RuleOutcome::Reject(RejectReason::GenericList);
        }
        if ctx.company.is_joint_mention(&ctx.text) {
            return RuleOutcome::Reject(RejectReason::JointMention);
        }
        RuleOutcome::Continue
    }
}

/// The vendor must be mentioned somewhere in title or snippet
pub struct VendorPresenceRule;

impl ValidationRule for VendorPresenceRule {
    fn name(&self) -> &'static str {
        "vendor_presence"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        if ctx.lexicon.mentions_vendor(&ctx.text) {
            RuleOutcome::Continue
        } else {
            RuleOutcome::Reject(RejectReason::VendorAbsent)
        }
    }
}

/// The company must be mentioned; records where
pub struct CompanyPresenceRule;

impl ValidationRule for CompanyPresenceRule {
    fn name(&self) -> &'static str {
        "company_presence"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        match ctx.company.find_in(&ctx.text) {
            Some(span) => {
                ctx.company_span = Some(span);
                RuleOutcome::Continue
            }
            None => RuleOutcome::Reject(RejectReason::CompanyAbsent),
        }
    }
}

/// Vendor or a product must fall inside the window around the company
pub struct ProximityRule;

impl ValidationRule for ProximityRule {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        let window = ctx.window();
        let vendor_in_window = ctx.lexicon.mentions_vendor(window);
        let window_products = ctx.lexicon.detector().detect(window);

        ctx.vendor_in_window = vendor_in_window;
        ctx.products_in_window = !window_products.is_empty();
        ctx.products.extend(window_products);

        if ctx.vendor_in_window || ctx.products_in_window {
            RuleOutcome::Continue
        } else {
            RuleOutcome::Reject(RejectReason::OutOfWindow)
        }
    }
}

/// Collects products from the whole text
pub struct ProductDetectionRule;

impl ValidationRule for ProductDetectionRule {
    fn name(&self) -> &'static str {
        "product_detection"
    }

    fn evaluate(&self, ctx: &mut RuleContext<'_>) -> RuleOutcome {
        let found = ctx.lexicon.detector().detect(&ctx.text);
        ctx.products.extend(found);
        RuleOutcome::Continue
    }
}
