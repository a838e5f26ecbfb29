//! Industry segment detection and product×segment relevance

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use vendorscope_core::Segment;

/// How central a product category is to a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Primary,
    Relevant,
    Optional,
}

/// Keyword cues per segment, scanned in order; first match wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentKeywords(pub Vec<(Segment, Vec<String>)>);

impl SegmentKeywords {
    /// Detect the segment of a company from its name and an optional industry hint
    pub fn detect(&self, name: &str, industry_hint: Option<&str>) -> Option<Segment> {
        let text = format!("{} {}", name, industry_hint.unwrap_or_default()).to_lowercase();
        for (segment, keywords) in &self.0 {
            if let Some(keyword) = keywords.iter().find(|k| text.contains(k.as_str())) {
                debug!(segment = ?segment, keyword = %keyword, "Segment detected");
                return Some(*segment);
            }
        }
        None
    }
}

impl Default for SegmentKeywords {
    fn default() -> Self {
        let table: [(Segment, &[&str]); 12] = [
            (Segment::Agro, &["agro", "agronegócio", "agropecuária", "agricultura", "pecuária", "rural"]),
            (Segment::Construcao, &["construção", "construtora", "obras", "engenharia", "imóveis"]),
            (Segment::Distribuicao, &["distribuição", "distribuidor", "atacado", "atacadista", "logística"]),
            (Segment::Educacional, &["educação", "educacional", "ensino", "universidade", "faculdade", "escola"]),
            (Segment::Financial, &["financeiro", "financial services", "banco", "fintech", "crédito", "seguros"]),
            (Segment::Hotelaria, &["hotel", "hotelaria", "hospitalidade", "turismo", "pousada"]),
            (Segment::Juridico, &["jurídico", "advocacia", "escritório de advocacia", "legal"]),
            (Segment::Logistica, &["logística", "transporte", "transportadora", "armazenagem"]),
            (Segment::Manufatura, &["manufatura", "indústria", "industrial", "fábrica", "fabricante"]),
            (Segment::Servicos, &["serviços", "prestador de serviços", "consultoria", "terceirização"]),
            (Segment::Saude, &["saúde", "hospital", "clínica", "laboratório", "medicina"]),
            (Segment::Varejo, &["varejo", "loja", "comércio", "supermercado", "e-commerce"]),
        ];
        Self(
            table
                .iter()
                .map(|(segment, words)| (*segment, words.iter().map(|w| w.to_string()).collect()))
                .collect(),
        )
    }
}

/// Static product-category × segment relevance table with boost magnitudes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMatrix {
    #[serde(default = "default_primary_boost")]
    pub primary_boost: u32,

    #[serde(default = "default_relevant_boost")]
    pub relevant_boost: u32,

    /// Category → segment → relevance. Unlisted pairs are optional.
    pub rows: BTreeMap<String, BTreeMap<Segment, Relevance>>,
}

fn default_primary_boost() -> u32 {
    25
}

fn default_relevant_boost() -> u32 {
    10
}

impl SegmentMatrix {
    /// Points added for one detected product of `category` in `segment`
    pub fn boost(&self, category: Option<&str>, segment: Option<Segment>) -> u32 {
        let (Some(category), Some(segment)) = (category, segment) else {
            return 0;
        };
        match self.rows.get(category).and_then(|row| row.get(&segment)) {
            Some(Relevance::Primary) => self.primary_boost,
            Some(Relevance::Relevant) => self.relevant_boost,
            Some(Relevance::Optional) | None => 0,
        }
    }
}

const ALL_SEGMENTS: [Segment; 12] = [
    Segment::Agro,
    Segment::Construcao,
    Segment::Distribuicao,
    Segment::Educacional,
    Segment::Financial,
    Segment::Hotelaria,
    Segment::Juridico,
    Segment::Logistica,
    Segment::Manufatura,
    Segment::Servicos,
    Segment::Saude,
    Segment::Varejo,
];

/// Row given in `ALL_SEGMENTS` order using `p`/`r`/`o`
fn row(spec: &str) -> BTreeMap<Segment, Relevance> {
    ALL_SEGMENTS
        .iter()
        .zip(spec.chars())
        .filter_map(|(segment, c)| {
            let relevance = match c {
                'p' => Relevance::Primary,
                'r' => Relevance::Relevant,
                _ => return None,
            };
            Some((*segment, relevance))
        })
        .collect()
}

fn sparse(entries: &[(Segment, Relevance)]) -> BTreeMap<Segment, Relevance> {
    entries.iter().copied().collect()
}

impl Default for SegmentMatrix {
    fn default() -> Self {
        use Relevance::*;
        use Segment::*;

        // agro construcao distribuicao educacional financial hotelaria
        // juridico logistica manufatura servicos saude varejo
        let rows = [
            ("IA", row("rrrrrrrrrrrr")),
            ("ERP", row("pppppprppppp")),
            ("Analytics", row("rrrrrrrrrrrr")),
            ("Assinatura Eletrônica", row("rrrrrrrrrrrr")),
            ("Chatbot", row("oorprprroppp")),
            ("Cloud", row("rrrrrrrrrrrr")),
            ("Crédito", row("roprproorprp")),
            ("CRM", row("roprrrorrprr")),
            ("Fluig", row("rrrrrrrrrrrr")),
            ("IPAAS", row("rrrrrrrrrrrr")),
            ("Marketing Digital", row("oorprpoooprp")),
            ("Pagamentos", row("rorprpooorrp")),
            ("RH", row("pppppppppppp")),
            ("PCP", sparse(&[(Manufatura, Primary)])),
            ("MRP", sparse(&[(Manufatura, Primary)])),
            ("APS", sparse(&[(Manufatura, Primary)])),
            ("MES", sparse(&[(Manufatura, Primary)])),
            ("OEE", sparse(&[(Manufatura, Primary)])),
            ("RMS", sparse(&[(Varejo, Primary)])),
            (
                "WMS",
                sparse(&[(Distribuicao, Primary), (Logistica, Primary), (Varejo, Relevant)]),
            ),
            ("PDV", sparse(&[(Varejo, Primary)])),
        ];

        Self {
            primary_boost: default_primary_boost(),
            relevant_boost: default_relevant_boost(),
            rows: rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}
