//! Core types for vendorscope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Error, Result};

/// Identity of the company under investigation. Immutable input to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    /// Internal record id used for caching and persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Legal or trade name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tax identifier (CNPJ)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    /// Web domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Free-form industry hint used for segment detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl CompanyIdentity {
    /// Create an identity from a company name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the internal record id
    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    /// Set the tax identifier
    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    /// Set the web domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the industry hint
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Reject identities that carry neither a name nor a tax identifier
    pub fn validate(&self) -> Result<()> {
        if non_blank(&self.name).is_none() && non_blank(&self.tax_id).is_none() {
            return Err(Error::invalid_input("company_name or tax_id is required"));
        }
        Ok(())
    }

    /// Name used for searching and matching; falls back to the tax id
    pub fn display_name(&self) -> &str {
        non_blank(&self.name)
            .or_else(|| non_blank(&self.tax_id))
            .unwrap_or_default()
    }

    /// Tax identifier, if present and not blank
    pub fn tax_id(&self) -> Option<&str> {
        non_blank(&self.tax_id)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Category of a public source. Drives query construction and trust weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    JobPortals,
    VendorCases,
    OfficialDocs,
    JudicialRecords,
    PremiumNews,
    TechPortals,
    VideoContent,
    SocialMedia,
    VendorPartners,
    GeneralNews,
    Agreements,
    TaxIdSearch,
}

impl SourceType {
    /// Regulatory filings, stock-exchange disclosures and court records.
    /// Evidence from these is decisive by itself.
    pub fn is_official(self) -> bool {
        matches!(self, Self::OfficialDocs | Self::JudicialRecords)
    }

    /// Whether results describe job openings
    pub fn is_job_board(self) -> bool {
        matches!(self, Self::JobPortals)
    }

    /// Stable identifier, identical to the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JobPortals => "job_portals",
            Self::VendorCases => "vendor_cases",
            Self::OfficialDocs => "official_docs",
            Self::JudicialRecords => "judicial_records",
            Self::PremiumNews => "premium_news",
            Self::TechPortals => "tech_portals",
            Self::VideoContent => "video_content",
            Self::SocialMedia => "social_media",
            Self::VendorPartners => "vendor_partners",
            Self::GeneralNews => "general_news",
            Self::Agreements => "agreements",
            Self::TaxIdSearch => "tax_id_search",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search vertical offered by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchVertical {
    #[default]
    Web,
    News,
}

/// One query to the search provider. Derived and disposable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub source_type: SourceType,
    /// Site the query is restricted to, if any
    pub domain: Option<String>,
    pub text: String,
    /// Recency restriction in years
    pub lookback_years: u8,
    pub vertical: SearchVertical,
    /// Trust weight given to evidence produced by this query
    pub weight: u32,
}

impl SearchQuery {
    /// Label used in evidence and logs: the domain, or the source type
    pub fn source_name(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| self.source_type.to_string())
    }
}

/// Raw, untrusted hit returned by the search provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub url: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

/// Evidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Triple,
    Double,
    Single,
    Rejected,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triple => "triple",
            Self::Double => "double",
            Self::Single => "single",
            Self::Rejected => "rejected",
        }
    }
}

/// How an evidence item was confirmed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMethod {
    #[default]
    Basic,
    Ai,
}

/// Industry vertical of the investigated company
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Agro,
    Construcao,
    Distribuicao,
    Educacional,
    Financial,
    Hotelaria,
    Juridico,
    Logistica,
    Manufatura,
    Servicos,
    Saude,
    Varejo,
}

/// One validated search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub source_type: SourceType,
    pub source_name: String,
    pub weight: u32,
    pub match_type: MatchType,
    pub detected_products: BTreeSet<String>,
    pub has_purchase_intent: bool,
    #[serde(default)]
    pub intent_keywords: Vec<String>,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub validation_method: ValidationMethod,
}

impl Evidence {
    /// Whether this item may be retained in a result
    pub fn is_accepted(&self) -> bool {
        self.match_type != MatchType::Rejected
    }
}

/// Sales-qualification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "no-go")]
    NoGo,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::NoGo => "no-go",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// What a run consulted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub sources_consulted: u32,
    pub total_queries: u32,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub sources_by_type: BTreeMap<SourceType, u32>,
    /// True when the run was cut short and the evidence list is incomplete
    #[serde(default)]
    pub partial: bool,
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub status: Status,
    pub confidence_level: ConfidenceLevel,
    pub confidence_percent: u8,
    pub total_weight: u32,
    pub triple_count: u32,
    pub double_count: u32,
    pub single_count: u32,
    pub evidences: Vec<Evidence>,
    pub methodology: Methodology,
    #[serde(default)]
    pub segment: Option<Segment>,
    pub checked_at: DateTime<Utc>,
    #[serde(default)]
    pub from_cache: bool,
}

impl ClassificationResult {
    /// Whether the result is still within its cache lifetime at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now.signed_duration_since(self.checked_at) < ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_requires_name_or_tax_id() {
        assert!(CompanyIdentity::default().validate().is_err());
        assert!(CompanyIdentity::new("   ").validate().is_err());
        assert!(CompanyIdentity::new("Acme").validate().is_ok());

        let by_tax = CompanyIdentity {
            tax_id: Some("12.345.678/0001-90".into()),
            ..Default::default()
        };
        assert!(by_tax.validate().is_ok());
        assert_eq!(by_tax.display_name(), "12.345.678/0001-90");
    }

    #[test]
    fn test_official_sources() {
        assert!(SourceType::OfficialDocs.is_official());
        assert!(SourceType::JudicialRecords.is_official());
        assert!(!SourceType::TaxIdSearch.is_official());
        assert!(!SourceType::PremiumNews.is_official());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Status::NoGo).unwrap(), "\"no-go\"");
        assert_eq!(
            serde_json::to_string(&SourceType::OfficialDocs).unwrap(),
            "\"official_docs\""
        );
        assert_eq!(serde_json::to_string(&MatchType::Triple).unwrap(), "\"triple\"");
        assert_eq!(serde_json::to_string(&ValidationMethod::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn test_freshness() {
        let checked_at = Utc::now() - chrono::Duration::hours(23);
        let result = ClassificationResult {
            status: Status::Go,
            confidence_level: ConfidenceLevel::High,
            confidence_percent: 95,
            total_weight: 0,
            triple_count: 0,
            double_count: 0,
            single_count: 0,
            evidences: vec![],
            methodology: Methodology::default(),
            segment: None,
            checked_at,
            from_cache: false,
        };
        assert!(result.is_fresh(Utc::now(), chrono::Duration::hours(24)));
        assert!(!result.is_fresh(Utc::now(), chrono::Duration::hours(12)));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["confidencePercent"], 95);
        assert_eq!(json["fromCache"], false);
    }
}
