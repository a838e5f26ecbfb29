//! Evidence validator tests with mock deep-context collaborators
//!
//! Provides configurable mock implementations of the PageFetcher and
//! ContextVerifier traits for exercising the full validation pipeline.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use vendorscope_classifiers::{
    CompanyMatcher, ContextVerifier, DeepContext, EvidenceValidator, FetchBudget, Lexicon,
    PageFetcher, PageText, RejectReason, VendorProfile, Verdict,
};
use vendorscope_core::{
    CompanyIdentity, Error, MatchType, Result, SearchQuery, SearchResult, SearchVertical,
    SourceType, ValidationMethod,
};

/// A page fetcher returning a fixed page
pub struct MockFetcher {
    page: PageText,
    fail: bool,
    call_count: AtomicU32,
}

impl MockFetcher {
    pub fn new(body: &str) -> Self {
        Self {
            page: PageText {
                title: String::new(),
                description: String::new(),
                body: body.to_string(),
            },
            fail: false,
            call_count: AtomicU32::new(0),
        }
    }

    /// Make every fetch fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<PageText> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(Error::fetch(format!("connection reset: {}", url)));
        }
        Ok(self.page.clone())
    }
}

/// A verifier with a fixed answer
pub struct MockVerifier {
    answer: bool,
    call_count: AtomicU32,
}

impl MockVerifier {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContextVerifier for MockVerifier {
    async fn confirm(&self, _company_name: &str, _page_text: &str) -> Result<bool> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.answer)
    }

    fn method(&self) -> ValidationMethod {
        ValidationMethod::Ai
    }
}

fn lexicon() -> Arc<Lexicon> {
    Arc::new(Lexicon::new(VendorProfile::default()).unwrap())
}

fn query(source_type: SourceType, weight: u32) -> SearchQuery {
    SearchQuery {
        source_type,
        domain: Some("news.example.com".into()),
        text: "site:news.example.com \"Acme Alimentos\" (\"TOTVS\")".into(),
        lookback_years: 5,
        vertical: SearchVertical::Web,
        weight,
    }
}

fn company(lexicon: &Lexicon, name: &str) -> CompanyMatcher {
    CompanyMatcher::new(&CompanyIdentity::new(name), lexicon).unwrap()
}

fn triple_hit(url: &str) -> SearchResult {
    SearchResult::new(
        "Acme Alimentos implanta TOTVS Protheus",
        "A Acme Alimentos concluiu a migração para o ERP.",
        url,
    )
}

#[tokio::test]
async fn test_triple_match() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone());
    let company = company(&lexicon, "Acme Alimentos");
    let mut budget = FetchBudget::new(10);

    let verdict = validator
        .validate(&triple_hit(""), &query(SourceType::PremiumNews, 85), &company, &mut budget)
        .await;

    let evidence = verdict.into_evidence().expect("accepted");
    assert_eq!(evidence.match_type, MatchType::Triple);
    assert!(evidence.detected_products.contains("Protheus"));
    assert_eq!(evidence.weight, 85);
    assert_eq!(evidence.source_name, "news.example.com");
    assert_eq!(evidence.validation_method, ValidationMethod::Basic);
    assert_eq!(budget.used(), 0);
}

#[tokio::test]
async fn test_vendor_only_double_with_intent() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone());
    let company = company(&lexicon, "Acme Alimentos");
    let hit = SearchResult::new(
        "Acme Alimentos fecha contrato com a TOTVS",
        "Acordo prevê modernização da gestão.",
        "",
    );

    let verdict = validator
        .validate(&hit, &query(SourceType::PremiumNews, 85), &company, &mut FetchBudget::new(0))
        .await;

    let evidence = verdict.into_evidence().expect("accepted");
    assert_eq!(evidence.match_type, MatchType::Double);
    assert!(evidence.detected_products.is_empty());
    assert!(evidence.has_purchase_intent);
    assert!(evidence.intent_keywords.contains(&"contrato com".to_string()));
    assert!(evidence.intent_keywords.contains(&"modernização".to_string()));
}

#[tokio::test]
async fn test_peer_companies_in_title_rejected() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone());
    let company = company(&lexicon, "Acme Papel");
    let hit = SearchResult::new(
        "Suzano e Klabin ampliam parceria com TOTVS",
        "A TOTVS anunciou novos contratos no setor de papel e celulose com a Acme Papel.",
        "https://news.example.com/papel",
    );

    let verdict = validator
        .validate(&hit, &query(SourceType::PremiumNews, 85), &company, &mut FetchBudget::new(10))
        .await;

    assert_eq!(verdict, Verdict::Rejected(RejectReason::CrossMention));
    assert_eq!(verdict.match_type(), MatchType::Rejected);
}

#[tokio::test]
async fn test_former_employee_on_job_board_rejected() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone());
    let company = company(&lexicon, "Acme Alimentos");
    let hit = SearchResult::new(
        "Analista de sistemas",
        "Profissional com experiência anterior na Acme Alimentos usando TOTVS Protheus",
        "",
    );

    let verdict = validator
        .validate(&hit, &query(SourceType::JobPortals, 75), &company, &mut FetchBudget::new(0))
        .await;
    assert_eq!(verdict, Verdict::Rejected(RejectReason::FormerEmployee));
}

#[tokio::test]
async fn test_missing_company_or_vendor_rejected() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone());
    let company = company(&lexicon, "Acme Alimentos");
    let q = query(SourceType::PremiumNews, 85);

    let no_vendor = SearchResult::new("Acme Alimentos cresce 10%", "Resultado trimestral", "");
    let verdict = validator.validate(&no_vendor, &q, &company, &mut FetchBudget::new(0)).await;
    assert_eq!(verdict, Verdict::Rejected(RejectReason::VendorAbsent));

    let no_company = SearchResult::new("TOTVS lança Protheus 13", "Novidades do ERP", "");
    let verdict = validator.validate(&no_company, &q, &company, &mut FetchBudget::new(0)).await;
    assert_eq!(verdict, Verdict::Rejected(RejectReason::CompanyAbsent));
}

#[tokio::test]
async fn test_negative_verifier_rejects() {
    let lexicon = lexicon();
    let fetcher = Arc::new(MockFetcher::new("Ranking de empresas do setor"));
    let verifier = Arc::new(MockVerifier::new(false));
    let validator = EvidenceValidator::new(lexicon.clone())
        .with_deep_context(DeepContext::new(fetcher.clone(), verifier.clone()));
    let company = company(&lexicon, "Acme Alimentos");
    let mut budget = FetchBudget::new(1);

    let verdict = validator
        .validate(
            &triple_hit("https://news.example.com/acme"),
            &query(SourceType::PremiumNews, 85),
            &company,
            &mut budget,
        )
        .await;

    assert_eq!(verdict, Verdict::Rejected(RejectReason::NoBusinessContext));
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(verifier.call_count(), 1);
    assert!(budget.is_exhausted());
}

#[tokio::test]
async fn test_positive_verifier_merges_page_products() {
    let lexicon = lexicon();
    let fetcher = Arc::new(MockFetcher::new("A Acme Alimentos adotou o Fluig em 2023"));
    let verifier = Arc::new(MockVerifier::new(true));
    let validator = EvidenceValidator::new(lexicon.clone())
        .with_deep_context(DeepContext::new(fetcher.clone(), verifier.clone()));
    let company = company(&lexicon, "Acme Alimentos");

    let verdict = validator
        .validate(
            &triple_hit("https://news.example.com/acme"),
            &query(SourceType::PremiumNews, 85),
            &company,
            &mut FetchBudget::new(5),
        )
        .await;

    let evidence = verdict.into_evidence().expect("accepted");
    assert_eq!(evidence.validation_method, ValidationMethod::Ai);
    assert!(evidence.detected_products.contains("Fluig"));
    assert!(evidence.detected_products.contains("Protheus"));
}

#[tokio::test]
async fn test_exhausted_budget_falls_back_to_basic() {
    let lexicon = lexicon();
    let fetcher = Arc::new(MockFetcher::new("irrelevant"));
    let verifier = Arc::new(MockVerifier::new(false));
    let validator = EvidenceValidator::new(lexicon.clone())
        .with_deep_context(DeepContext::new(fetcher.clone(), verifier.clone()));
    let company = company(&lexicon, "Acme Alimentos");

    let verdict = validator
        .validate(
            &triple_hit("https://news.example.com/acme"),
            &query(SourceType::PremiumNews, 85),
            &company,
            &mut FetchBudget::new(0),
        )
        .await;

    let evidence = verdict.into_evidence().expect("accepted");
    assert_eq!(evidence.validation_method, ValidationMethod::Basic);
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(verifier.call_count(), 0);
}

#[tokio::test]
async fn test_fetch_failure_falls_back_to_basic() {
    let lexicon = lexicon();
    let fetcher = Arc::new(MockFetcher::failing());
    let verifier = Arc::new(MockVerifier::new(false));
    let validator = EvidenceValidator::new(lexicon.clone())
        .with_deep_context(DeepContext::new(fetcher.clone(), verifier.clone()));
    let company = company(&lexicon, "Acme Alimentos");

    let verdict = validator
        .validate(
            &triple_hit("https://news.example.com/acme"),
            &query(SourceType::PremiumNews, 85),
            &company,
            &mut FetchBudget::new(3),
        )
        .await;

    assert_eq!(verdict.match_type(), MatchType::Triple);
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(verifier.call_count(), 0);
}

#[tokio::test]
async fn test_validation_is_deterministic() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone())
        .with_deep_context(DeepContext::new(
            Arc::new(MockFetcher::new("Acme Alimentos usa Datasul")),
            Arc::new(MockVerifier::new(true)),
        ));
    let company = company(&lexicon, "Acme Alimentos");
    let hit = triple_hit("https://news.example.com/acme");
    let q = query(SourceType::PremiumNews, 85);

    let first = validator.validate(&hit, &q, &company, &mut FetchBudget::new(2)).await;
    let second = validator.validate(&hit, &q, &company, &mut FetchBudget::new(2)).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_accepted_evidence_is_triple_or_double() {
    let lexicon = lexicon();
    let validator = EvidenceValidator::new(lexicon.clone());
    let company = company(&lexicon, "Acme Alimentos");
    let q = query(SourceType::TechPortals, 85);
    let hits = [
        triple_hit(""),
        SearchResult::new("Acme Alimentos e TOTVS", "parceria", ""),
        SearchResult::new("Vaga na TOTVS", "Acme Alimentos", ""),
        SearchResult::new("Acme Alimentos", "Protheus", ""),
        SearchResult::new("TOTVS", "sem empresa", ""),
    ];

    for hit in &hits {
        let verdict = validator.validate(hit, &q, &company, &mut FetchBudget::new(0)).await;
        if let Some(evidence) = verdict.evidence() {
            assert!(matches!(
                evidence.match_type,
                MatchType::Triple | MatchType::Double
            ));
        }
    }
}
