//! Query generation
//!
//! One query per (pool, domain) pair, with a keyword clause chosen by the
//! pool's source type.

use crate::sources::SourcePool;
use vendorscope_classifiers::{NameNormalizer, VendorProfile};
use vendorscope_core::{CompanyIdentity, SearchQuery, SourceType};

/// Queries of one pool, issued back to back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub source_type: SourceType,
    pub queries: Vec<SearchQuery>,
}

/// Builds source-specific search queries for a company
#[derive(Debug, Clone)]
pub struct QueryGenerator {
    vendor: String,
    products: String,
}

impl QueryGenerator {
    pub fn new(profile: &VendorProfile) -> Self {
        Self {
            vendor: profile.name.clone(),
            products: profile.query_products.join(" OR "),
        }
    }

    /// Query text for one site of a pool
    pub fn text(&self, source_type: SourceType, domain: Option<&str>, company: &str) -> String {
        let vendor = &self.vendor;
        let products = &self.products;
        let clause = match source_type {
            SourceType::JobPortals | SourceType::VideoContent | SourceType::SocialMedia => {
                format!("\"{company}\" ({products})")
            }
            SourceType::VendorCases => {
                format!("(\"case\" OR \"cliente\" OR \"depoimento\") \"{company}\"")
            }
            SourceType::PremiumNews => format!(
                "\"{company}\" (\"{vendor}\" OR \"ERP\" OR \"implementação\" OR \"migração\" OR \"sistema\" OR {products})"
            ),
            SourceType::OfficialDocs | SourceType::JudicialRecords => format!(
                "\"{company}\" (\"{vendor}\" OR \"contrato\" OR \"licitação\" OR {products})"
            ),
            SourceType::VendorPartners => {
                format!("(\"clientes\" OR \"portfolio\" OR \"cases\") \"{company}\"")
            }
            SourceType::TechPortals => {
                format!("\"{company}\" (\"{vendor}\" OR \"ERP\" OR {products})")
            }
            SourceType::GeneralNews => format!("\"{company}\" {vendor}"),
            SourceType::Agreements => format!(
                "\"{company}\" {vendor} (\"memorando de intenção\" OR \"acordo de intenção\" OR \"contrato\" OR \"parceria\")"
            ),
            SourceType::TaxIdSearch => format!("\"{company}\" {vendor}"),
        };
        match domain {
            Some(domain) => format!("site:{domain} {clause}"),
            None => clause,
        }
    }

    /// Queries for one pool. `search_term` is the short company name, or the
    /// tax id for the tax-id pool.
    pub fn phase(&self, pool: &SourcePool, search_term: &str) -> Phase {
        let query = |domain: Option<&str>| SearchQuery {
            source_type: pool.source_type,
            domain: domain.map(str::to_string),
            text: self.text(pool.source_type, domain, search_term),
            lookback_years: pool.lookback_years,
            vertical: pool.vertical,
            weight: pool.base_weight,
        };

        let queries = if pool.domains.is_empty() {
            vec![query(None)]
        } else {
            pool.domains.iter().map(|d| query(Some(d))).collect()
        };

        Phase {
            source_type: pool.source_type,
            queries,
        }
    }

    /// Every phase for a company, in pool order.
    ///
    /// The tax-id pool is planned only when a tax id is present and differs
    /// from the name being searched.
    pub fn plan(
        &self,
        pools: &[SourcePool],
        company: &CompanyIdentity,
        normalizer: &NameNormalizer,
    ) -> Vec<Phase> {
        let search_name = search_term(company, normalizer);
        let tax_id = company.tax_id().filter(|id| *id != search_name);

        pools
            .iter()
            .filter_map(|pool| match pool.source_type {
                SourceType::TaxIdSearch => tax_id.map(|id| self.phase(pool, id)),
                _ => Some(self.phase(pool, &search_name)),
            })
            .collect()
    }
}

/// Short name used in queries, falling back to the full display name
pub fn search_term(company: &CompanyIdentity, normalizer: &NameNormalizer) -> String {
    let name = company.display_name();
    let short = normalizer.search_name(name);
    if short.trim().is_empty() {
        name.to_string()
    } else {
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::default_pools;
    use vendorscope_core::SearchVertical;

    fn generator() -> QueryGenerator {
        QueryGenerator::new(&VendorProfile::default())
    }

    #[test]
    fn test_job_portal_query_lists_products() {
        let text = generator().text(SourceType::JobPortals, Some("portal.gupy.io"), "Acme");
        assert!(text.starts_with("site:portal.gupy.io \"Acme\" ("));
        assert!(text.contains("Protheus OR RM OR Datasul"));
    }

    #[test]
    fn test_case_and_partner_queries() {
        let g = generator();
        assert_eq!(
            g.text(SourceType::VendorCases, Some("totvs.com/cases"), "Acme"),
            "site:totvs.com/cases (\"case\" OR \"cliente\" OR \"depoimento\") \"Acme\""
        );
        assert_eq!(
            g.text(SourceType::VendorPartners, Some("fusionbynstech.com.br"), "Acme"),
            "site:fusionbynstech.com.br (\"clientes\" OR \"portfolio\" OR \"cases\") \"Acme\""
        );
    }

    #[test]
    fn test_official_query_mentions_contracts() {
        let text = generator().text(SourceType::OfficialDocs, Some("cvm.gov.br"), "Acme");
        assert!(text.contains("\"TOTVS\" OR \"contrato\" OR \"licitação\""));
    }

    #[test]
    fn test_unrestricted_phases() {
        let g = generator();
        assert_eq!(g.text(SourceType::GeneralNews, None, "Acme"), "\"Acme\" TOTVS");
        assert!(g
            .text(SourceType::Agreements, None, "Acme")
            .contains("\"memorando de intenção\""));
    }

    #[test]
    fn test_phase_per_domain() {
        let pools = default_pools();
        let phase = generator().phase(&pools[0], "Acme");
        assert_eq!(phase.queries.len(), pools[0].domains.len());
        assert!(phase.queries.iter().all(|q| q.weight == 75 && q.domain.is_some()));
    }

    #[test]
    fn test_plan_uses_short_name_and_skips_missing_tax_id() {
        let normalizer = NameNormalizer::default();
        let company = CompanyIdentity::new("Acme Indústria e Comércio Ltda");
        let phases = generator().plan(&default_pools(), &company, &normalizer);

        assert!(phases.iter().all(|p| p.source_type != SourceType::TaxIdSearch));
        let news = phases
            .iter()
            .find(|p| p.source_type == SourceType::GeneralNews)
            .unwrap();
        assert_eq!(news.queries.len(), 1);
        assert_eq!(news.queries[0].vertical, SearchVertical::News);
        assert!(!news.queries[0].text.contains("Ltda"));
    }

    #[test]
    fn test_plan_adds_tax_id_phase() {
        let normalizer = NameNormalizer::default();
        let company = CompanyIdentity::new("Acme").with_tax_id("12.345.678/0001-90");
        let phases = generator().plan(&default_pools(), &company, &normalizer);

        let tax = phases.last().unwrap();
        assert_eq!(tax.source_type, SourceType::TaxIdSearch);
        assert_eq!(tax.queries[0].text, "\"12.345.678/0001-90\" TOTVS");
    }

    #[test]
    fn test_plan_skips_tax_id_equal_to_name() {
        let normalizer = NameNormalizer::default();
        let company = CompanyIdentity {
            tax_id: Some("12345678000190".into()),
            ..Default::default()
        };
        let phases = generator().plan(&default_pools(), &company, &normalizer);
        assert!(phases.iter().all(|p| p.source_type != SourceType::TaxIdSearch));
    }
}
