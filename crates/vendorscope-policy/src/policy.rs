//! Engine policy: the tunable tables of a run

use crate::aggregate::Aggregator;
use crate::sources::{default_pools, SourcePool};
use crate::threshold::ThresholdTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use vendorscope_classifiers::{SegmentKeywords, SegmentMatrix, VendorProfile};
use vendorscope_core::{ClassificationResult, Error, Evidence, Methodology, Result, Segment};

/// Source pools, thresholds and scoring constants.
///
/// Loaded once at startup; missing fields take the built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicy {
    /// Pools searched, in order
    pub pools: Vec<SourcePool>,

    pub thresholds: ThresholdTable,

    pub segment_matrix: SegmentMatrix,

    pub segment_keywords: SegmentKeywords,

    /// Points added per evidence item carrying purchase intent
    pub intent_bonus: u32,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            pools: default_pools(),
            thresholds: ThresholdTable::default(),
            segment_matrix: SegmentMatrix::default(),
            segment_keywords: SegmentKeywords::default(),
            intent_bonus: 20,
        }
    }
}

impl EnginePolicy {
    /// Load a policy from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse engine policy: {}", e)))
    }

    /// Load a policy from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Classify a run's accepted evidence.
    ///
    /// A pure function of its arguments: the same evidence list always
    /// yields the same result.
    pub fn classify(
        &self,
        profile: &VendorProfile,
        evidences: Vec<Evidence>,
        segment: Option<Segment>,
        methodology: Methodology,
        checked_at: DateTime<Utc>,
    ) -> ClassificationResult {
        let tally = Aggregator::new(profile, &self.segment_matrix, self.intent_bonus)
            .fold(&evidences, segment);
        let decision = self.thresholds.decide(&tally);

        debug!(
            status = %decision.status,
            percent = decision.percent,
            triple = tally.triple_count,
            double = tally.double_count,
            official = tally.has_official,
            total_weight = tally.total_weight,
            "Evidence classified"
        );

        ClassificationResult {
            status: decision.status,
            confidence_level: decision.confidence,
            confidence_percent: decision.percent,
            total_weight: tally.total_weight,
            triple_count: tally.triple_count,
            double_count: tally.double_count,
            single_count: tally.single_count,
            evidences,
            methodology,
            segment,
            checked_at,
            from_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use vendorscope_core::{ConfidenceLevel, MatchType, SourceType, Status, ValidationMethod};

    fn evidence(source_type: SourceType, match_type: MatchType) -> Evidence {
        Evidence {
            source_type,
            source_name: source_type.as_str().to_string(),
            weight: 85,
            match_type,
            detected_products: BTreeSet::new(),
            has_purchase_intent: false,
            intent_keywords: Vec::new(),
            url: "https://example.com".into(),
            title: "title".into(),
            snippet: "snippet".into(),
            validation_method: ValidationMethod::Basic,
        }
    }

    fn checked_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn classify(evidences: Vec<Evidence>) -> ClassificationResult {
        EnginePolicy::default().classify(
            &VendorProfile::default(),
            evidences,
            None,
            Methodology::default(),
            checked_at(),
        )
    }

    #[test]
    fn test_no_evidence_is_go() {
        let result = classify(Vec::new());
        assert_eq!(result.status, Status::Go);
        assert_eq!(result.confidence_level, ConfidenceLevel::High);
        assert_eq!(result.confidence_percent, 95);
        assert!(result.evidences.is_empty());
    }

    #[test]
    fn test_single_official_evidence_is_decisive() {
        let result = classify(vec![evidence(SourceType::OfficialDocs, MatchType::Double)]);
        assert_eq!(result.status, Status::NoGo);
        assert_eq!(result.confidence_percent, 100);
    }

    #[test]
    fn test_three_triples() {
        let result = classify(vec![evidence(SourceType::PremiumNews, MatchType::Triple); 3]);
        assert_eq!(result.status, Status::NoGo);
        assert_eq!(result.confidence_percent, 90);
        assert_eq!(result.triple_count, 3);
    }

    #[test]
    fn test_one_double() {
        let result = classify(vec![evidence(SourceType::JobPortals, MatchType::Double)]);
        assert_eq!(result.status, Status::NoGo);
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(result.confidence_percent, 50);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let evidences = vec![
            evidence(SourceType::PremiumNews, MatchType::Triple),
            evidence(SourceType::JobPortals, MatchType::Double),
        ];
        assert_eq!(classify(evidences.clone()), classify(evidences));
    }

    #[test]
    fn test_policy_yaml_overrides() {
        let yaml = r#"
intent_bonus: 30
thresholds:
  - condition:
      type: always
    status: go
    confidence: low
    percent: 60
"#;
        let policy = EnginePolicy::from_yaml(yaml).unwrap();
        assert_eq!(policy.intent_bonus, 30);
        assert_eq!(policy.thresholds.0.len(), 1);
        assert_eq!(policy.pools, default_pools());
        assert_eq!(policy.segment_matrix.primary_boost, 25);
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let err = EnginePolicy::from_yaml("intent_bonus: [1, 2]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    fn source_type() -> impl Strategy<Value = SourceType> {
        prop_oneof![
            Just(SourceType::JobPortals),
            Just(SourceType::PremiumNews),
            Just(SourceType::OfficialDocs),
            Just(SourceType::JudicialRecords),
            Just(SourceType::TaxIdSearch),
        ]
    }

    fn match_type() -> impl Strategy<Value = MatchType> {
        prop_oneof![Just(MatchType::Triple), Just(MatchType::Double)]
    }

    // Holds once any evidence exists; the empty set is a go at 95.
    proptest! {
        #[test]
        fn prop_extra_triple_never_lowers_percent(
            items in prop::collection::vec((source_type(), match_type()), 1..12),
            extra_source in source_type(),
        ) {
            let evidences: Vec<Evidence> =
                items.iter().map(|(s, m)| evidence(*s, *m)).collect();
            let before = classify(evidences.clone()).confidence_percent;

            let mut more = evidences;
            more.push(evidence(extra_source, MatchType::Triple));
            let after = classify(more).confidence_percent;

            prop_assert!(after >= before, "before={} after={}", before, after);
        }

        #[test]
        fn prop_official_forces_no_go(
            items in prop::collection::vec((source_type(), match_type()), 0..8),
        ) {
            let mut evidences: Vec<Evidence> =
                items.iter().map(|(s, m)| evidence(*s, *m)).collect();
            evidences.push(evidence(SourceType::JudicialRecords, MatchType::Double));
            let result = classify(evidences);
            prop_assert_eq!(result.status, Status::NoGo);
            prop_assert_eq!(result.confidence_percent, 100);
        }
    }
}
