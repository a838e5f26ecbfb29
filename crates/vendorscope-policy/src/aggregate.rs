//! Evidence aggregation

use vendorscope_classifiers::{SegmentMatrix, VendorProfile};
use vendorscope_core::{Evidence, MatchType, Segment};

/// Folded view of the accepted evidence of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total_weight: u32,
    pub triple_count: u32,
    pub double_count: u32,
    pub single_count: u32,
    /// Any evidence from a decisive official source
    pub has_official: bool,
}

/// Folds evidence into a [`Tally`] with segment boosts and the intent bonus
pub struct Aggregator<'a> {
    profile: &'a VendorProfile,
    matrix: &'a SegmentMatrix,
    intent_bonus: u32,
}

impl<'a> Aggregator<'a> {
    pub fn new(profile: &'a VendorProfile, matrix: &'a SegmentMatrix, intent_bonus: u32) -> Self {
        Self {
            profile,
            matrix,
            intent_bonus,
        }
    }

    /// Score of a single evidence item
    pub fn score(&self, evidence: &Evidence, segment: Option<Segment>) -> u32 {
        let boost: u32 = evidence
            .detected_products
            .iter()
            .map(|product| self.matrix.boost(self.profile.category_of(product), segment))
            .sum();
        let intent = if evidence.has_purchase_intent {
            self.intent_bonus
        } else {
            0
        };
        evidence.weight + boost + intent
    }

    pub fn fold(&self, evidences: &[Evidence], segment: Option<Segment>) -> Tally {
        evidences.iter().fold(Tally::default(), |mut tally, evidence| {
            tally.total_weight += self.score(evidence, segment);
            match evidence.match_type {
                MatchType::Triple => tally.triple_count += 1,
                MatchType::Double => tally.double_count += 1,
                MatchType::Single => tally.single_count += 1,
                MatchType::Rejected => {}
            }
            tally.has_official |= evidence.source_type.is_official();
            tally
        })
    }
}
