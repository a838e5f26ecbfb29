//! Source pool registry
//!
//! Pools are categorized, weighted lists of sites searched in order. A pool
//! without domains issues a single unrestricted query.

use serde::{Deserialize, Serialize};
use vendorscope_core::{SearchVertical, SourceType};

/// One category of public sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePool {
    /// Category, drives the query template and evidence labelling
    pub source_type: SourceType,

    /// Trust weight of evidence found in this pool
    pub base_weight: u32,

    /// Recency restriction in years, 0 for none
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u8,

    #[serde(default)]
    pub vertical: SearchVertical,

    /// Sites searched with `site:`; empty means one unrestricted query
    #[serde(default)]
    pub domains: Vec<String>,
}

fn default_lookback_years() -> u8 {
    5
}

impl SourcePool {
    pub fn new(source_type: SourceType, base_weight: u32) -> Self {
        Self {
            source_type,
            base_weight,
            lookback_years: default_lookback_years(),
            vertical: SearchVertical::Web,
            domains: Vec::new(),
        }
    }

    pub fn with_lookback_years(mut self, years: u8) -> Self {
        self.lookback_years = years;
        self
    }

    pub fn with_vertical(mut self, vertical: SearchVertical) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn with_domains(mut self, domains: &[&str]) -> Self {
        self.domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Whether this pool is a decisive official source
    pub fn is_official(&self) -> bool {
        self.source_type.is_official()
    }
}

/// Built-in pools in search order
pub fn default_pools() -> Vec<SourcePool> {
    vec![
        SourcePool::new(SourceType::JobPortals, 75).with_domains(&[
            "br.linkedin.com/jobs",
            "br.linkedin.com/posts",
            "portal.gupy.io",
            "br.indeed.com",
        ]),
        SourcePool::new(SourceType::VendorCases, 80).with_domains(&[
            "totvs.com/blog",
            "totvs.com/cases",
            "totvs.com/noticias",
        ]),
        SourcePool::new(SourceType::OfficialDocs, 100)
            .with_lookback_years(6)
            .with_domains(&[
                "cvm.gov.br",
                "rad.cvm.gov.br",
                "b3.com.br",
                "investidor.b3.com.br",
                "imprensaoficial.com.br",
                "in.gov.br",
            ]),
        SourcePool::new(SourceType::JudicialRecords, 100)
            .with_lookback_years(6)
            .with_domains(&[
                "esaj.tjsp.jus.br",
                "tjrj.jus.br",
                "cnj.jus.br",
                "jusbrasil.com.br",
            ]),
        SourcePool::new(SourceType::PremiumNews, 85).with_domains(&[
            "valor.globo.com",
            "exame.com",
            "estadao.com.br/economia",
            "infomoney.com.br",
            "folha.uol.com.br/mercado",
            "bloomberg.com.br",
            "br.investing.com",
            "braziljournal.com",
            "startse.com",
            "convergenciadigital.com.br",
            "itforum.com.br",
            "canaltech.com.br",
        ]),
        SourcePool::new(SourceType::TechPortals, 85).with_domains(&[
            "baguete.com.br",
            "cioadv.com.br",
            "mercadoeconsumo.com.br",
            "connectabil.com.br",
            "tiinside.com.br",
            "crn.com.br",
            "computerworld.com.br",
        ]),
        SourcePool::new(SourceType::VideoContent, 75).with_domains(&["youtube.com", "vimeo.com"]),
        SourcePool::new(SourceType::SocialMedia, 70)
            .with_lookback_years(3)
            .with_domains(&["instagram.com", "facebook.com", "linkedin.com/posts"]),
        SourcePool::new(SourceType::VendorPartners, 80).with_domains(&["fusionbynstech.com.br"]),
        SourcePool::new(SourceType::GeneralNews, 60)
            .with_vertical(SearchVertical::News)
            .with_lookback_years(0),
        SourcePool::new(SourceType::Agreements, 70).with_lookback_years(3),
        SourcePool::new(SourceType::TaxIdSearch, 100),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pools_order_and_weights() {
        let pools = default_pools();
        assert_eq!(pools[0].source_type, SourceType::JobPortals);
        assert_eq!(pools.last().unwrap().source_type, SourceType::TaxIdSearch);

        let official: Vec<_> = pools.iter().filter(|p| p.is_official()).collect();
        assert_eq!(official.len(), 2);
        assert!(official.iter().all(|p| p.base_weight == 100 && p.lookback_years == 6));
    }

    #[test]
    fn test_tax_id_pool_is_not_official() {
        let pools = default_pools();
        let tax = pools
            .iter()
            .find(|p| p.source_type == SourceType::TaxIdSearch)
            .unwrap();
        assert_eq!(tax.base_weight, 100);
        assert!(!tax.is_official());
    }

    #[test]
    fn test_pool_deserialization_defaults() {
        let yaml = r#"
source_type: premium_news
base_weight: 85
domains: [valor.globo.com]
"#;
        let pool: SourcePool = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pool.lookback_years, 5);
        assert_eq!(pool.vertical, SearchVertical::Web);
        assert_eq!(pool.domains, vec!["valor.globo.com"]);
    }
}
