//! Reference-vendor profile
//!
//! Everything the validator knows about the vendor being searched for: its
//! name patterns, product lexicon, peer companies and rejection phrases.
//! Loaded once at startup (built-in default or YAML) and shared read-only.

use crate::detector::ProductDetector;
use crate::normalizer::NameNormalizer;
use crate::text::contains_word;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vendorscope_core::{Error, Result};

/// Characters either side of a company mention searched for the vendor
pub const DEFAULT_WINDOW_RADIUS: usize = 250;

/// How a lexicon entry is recognised in text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductMatch {
    /// Unambiguous name, matched as a whole word
    Plain,

    /// Ambiguous short code, matched only through its own regex
    Pattern { pattern: String },

    /// Ordinary word, accepted only directly next to the vendor name
    AdjacentToVendor,

    /// Generic phrase, accepted only when the text has usage language
    UsageContext,
}

/// One product of the reference vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    /// Identifier reported in evidence
    pub name: String,

    /// Row of the segment matrix this product counts towards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default = "default_match", rename = "match")]
    pub matcher: ProductMatch,
}

fn default_match() -> ProductMatch {
    ProductMatch::Plain
}

impl ProductSpec {
    fn plain(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: Some(category.to_string()),
            matcher: ProductMatch::Plain,
        }
    }

    fn pattern(name: &str, category: Option<&str>, pattern: String) -> Self {
        Self {
            name: name.to_string(),
            category: category.map(str::to_string),
            matcher: ProductMatch::Pattern { pattern },
        }
    }

    fn guarded(name: &str, category: &str, matcher: ProductMatch) -> Self {
        Self {
            name: name.to_string(),
            category: Some(category.to_string()),
            matcher,
        }
    }
}

/// Vendor-specific vocabulary used by detection and rejection rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorProfile {
    /// Display name of the reference vendor
    pub name: String,

    /// Regexes that count as a mention of the vendor
    pub presence_patterns: Vec<String>,

    /// Flagship product names included in search queries
    pub query_products: Vec<String>,

    pub products: Vec<ProductSpec>,

    /// Verbs that make a generic "system"/"software" phrase count
    pub usage_verbs: Vec<String>,

    /// Phrases describing a job opening at the vendor itself
    pub job_patterns: Vec<String>,

    /// Phrases describing past employment on job boards
    pub former_employee_terms: Vec<String>,

    /// Known companies of the same industry as typical prospects
    pub peer_companies: Vec<String>,

    /// Regexes for stock-ticker and ranking-list snippets
    pub generic_list_patterns: Vec<String>,

    /// Regex templates around `{company}` for group, competition and
    /// shareholder constructions
    pub joint_mention_patterns: Vec<String>,

    /// Words that make a product mention without the vendor name count
    pub valid_use_contexts: Vec<String>,

    pub intent_keywords: Vec<String>,
}

impl VendorProfile {
    /// Parse a profile from YAML. Missing fields take the built-in values.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse vendor profile: {}", e)))
    }

    /// Load a profile from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Lowercase vendor name
    pub fn vendor_lower(&self) -> String {
        self.name.to_lowercase()
    }

    /// Segment-matrix row for a detected product
    pub fn category_of(&self, product: &str) -> Option<&str> {
        self.products
            .iter()
            .find(|p| p.name == product)
            .and_then(|p| p.category.as_deref())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Short code that only counts next to the vendor name or a flagship line
fn vendor_adjacent(code: &str, extra: &[&str]) -> String {
    let mut alternatives = vec![
        format!(r"totvs\s+{code}"),
        format!(r"{code}\s+(da\s+)?totvs"),
        format!(r"(protheus|datasul|logix|fluig)\s+{code}"),
        format!(r"{code}\s+(protheus|datasul|logix|fluig)"),
    ];
    alternatives.extend(extra.iter().map(|s| s.to_string()));
    format!(r"(?i)\b({})\b", alternatives.join("|"))
}

impl Default for VendorProfile {
    fn default() -> Self {
        let mut products = vec![
            ProductSpec::plain("Protheus", "ERP"),
            ProductSpec::plain("Datasul", "ERP"),
            ProductSpec::plain("Logix", "ERP"),
            ProductSpec::plain("Microsiga", "ERP"),
            ProductSpec::plain("Winthor", "ERP"),
            ProductSpec::plain("ADVPL", "ERP"),
            ProductSpec::plain("TLPP", "ERP"),
            ProductSpec::plain("ERP TOTVS", "ERP"),
            ProductSpec::plain("TOTVS Educacional", "ERP"),
            ProductSpec::plain("TOTVS Saúde", "ERP"),
            ProductSpec::plain("TOTVS Construção", "ERP"),
            ProductSpec::plain("Meu RH", "RH"),
            ProductSpec::plain("Folha de Pagamento RM", "RH"),
            ProductSpec::plain("Folha de Pagamento Datasul", "RH"),
            ProductSpec::plain("TOTVS RH Atração de Talentos", "RH"),
            ProductSpec::plain("Fluig", "Fluig"),
            ProductSpec::plain("TOTVS IPAAS", "IPAAS"),
            ProductSpec::plain("TOTVS Cloud", "Cloud"),
            ProductSpec::plain("TOTVS Analytics", "Analytics"),
            ProductSpec::plain("Fast Analytics", "Analytics"),
            ProductSpec::plain("Smart View", "Analytics"),
            ProductSpec::plain("Techfin", "Crédito"),
            ProductSpec::plain("Crédito TOTVS", "Crédito"),
            ProductSpec::plain("Pagamentos TOTVS", "Pagamentos"),
            ProductSpec::plain("Marketing Digital TOTVS", "Marketing Digital"),
            ProductSpec::plain("Chatbot TOTVS", "Chatbot"),
            ProductSpec::plain("Assinatura Eletrônica TOTVS", "Assinatura Eletrônica"),
            ProductSpec::plain("TOTVS Varejo PDV Omni", "PDV"),
            ProductSpec::plain("TOTVS Varejo Lojas", "PDV"),
            ProductSpec::guarded("Caixa", "PDV", ProductMatch::AdjacentToVendor),
            ProductSpec::guarded("Cotações", "ERP", ProductMatch::AdjacentToVendor),
            ProductSpec::guarded("Carol", "IA", ProductMatch::AdjacentToVendor),
            ProductSpec::guarded("Sistema TOTVS", "ERP", ProductMatch::UsageContext),
            ProductSpec::guarded("Software TOTVS", "ERP", ProductMatch::UsageContext),
            ProductSpec::guarded("Solução TOTVS", "ERP", ProductMatch::UsageContext),
        ];

        products.extend([
            ProductSpec::pattern(
                "RM",
                Some("ERP"),
                vendor_adjacent("rm", &[r"sistema\s+rm", r"erp\s+rm", r"módulo\s+rm", r"linha\s+rm"]),
            ),
            ProductSpec::pattern(
                "RH",
                Some("RH"),
                vendor_adjacent("rh", &[r"recursos\s+humanos\s+totvs"]),
            ),
            ProductSpec::pattern(
                "IA",
                Some("IA"),
                vendor_adjacent("ia", &[r"inteligência\s+artificial\s+(da\s+)?totvs"]),
            ),
            ProductSpec::pattern("SFA", Some("CRM"), vendor_adjacent("sfa", &[])),
            ProductSpec::pattern("CRM", Some("CRM"), vendor_adjacent("crm", &[])),
            ProductSpec::pattern("PCP", Some("PCP"), vendor_adjacent("pcp", &[])),
            ProductSpec::pattern("MRP", Some("MRP"), vendor_adjacent("mrp", &[])),
            ProductSpec::pattern("APS", Some("APS"), vendor_adjacent("aps", &[])),
            ProductSpec::pattern("MES", Some("MES"), vendor_adjacent("mes", &[])),
            ProductSpec::pattern("WMS", Some("WMS"), vendor_adjacent("wms", &[])),
            ProductSpec::pattern("OEE", Some("OEE"), vendor_adjacent("oee", &[])),
            ProductSpec::pattern("RMS", Some("RMS"), vendor_adjacent("rms", &[])),
            ProductSpec::pattern("BI", Some("Analytics"), vendor_adjacent("bi", &[])),
            ProductSpec::pattern("ECM", Some("Fluig"), vendor_adjacent("ecm", &[])),
            ProductSpec::pattern("BPM", Some("Fluig"), vendor_adjacent("bpm", &[])),
            ProductSpec::pattern("PDV", Some("PDV"), vendor_adjacent("pdv", &[])),
            ProductSpec::pattern("DPR", None, vendor_adjacent("dpr", &[])),
            ProductSpec::pattern("SFC", None, vendor_adjacent("sfc", &[])),
            ProductSpec::pattern("ACD", None, vendor_adjacent("acd", &[])),
            ProductSpec::pattern("SGA", None, vendor_adjacent("sga", &[])),
        ]);

        Self {
            name: "TOTVS".to_string(),
            presence_patterns: strings(&[
                r"(?i)\btotvs\b",
                r"(?i)totvs\.com\.br",
                r"(?i)\btotvs\s+(rm|protheus|datasul|logix|fluig|carol|techfin|winthor|microsiga)",
                r"(?i)\btotsa\b",
            ]),
            query_products: strings(&[
                "Protheus", "RM", "Datasul", "Winthor", "Logix", "TOTVS", "ADVPL", "TLPP",
                "Microsiga",
            ]),
            products,
            usage_verbs: strings(&["implementou", "implantou", "contratou", "usa", "utiliza", "migrou"]),
            job_patterns: strings(&[
                "totvs contratou",
                "vaga na totvs",
                "trabalhar na totvs",
                "oportunidade na totvs",
                "junte-se à totvs",
                "totvs está contratando",
                "carreira na totvs",
            ]),
            former_employee_terms: strings(&[
                "experiência anterior",
                "trabalhou na",
                "ex-funcionário",
                "ex-colaborador",
                "atuou na",
                "passou pela",
                "trabalhou anteriormente",
            ]),
            peer_companies: strings(&[
                "ibema", "suzano", "klabin", "eldorado", "fibria", "eucatex", "duratex", "riocell",
                "cemig",
            ]),
            generic_list_patterns: strings(&[
                r"(?i)vale,?\s+suzano,?\s+.*totvs,?\s+.*a[cç][iõ]o",
                r"(?i)a[cç][õo]es\s+(da|de|na)\s+bolsa",
                r"(?i)totvs,?\s+.*vale,?\s+suzano",
                r"(?i)cota[çc][õo]es?\s+e\s+pre[cç]os?\s+de\s+a[cç][õo]es",
                r"(?i)a[cç][õo]es?\s+para\s+acompanhar",
                r"(?i)mercados?.*vale.*suzano.*totvs",
            ]),
            joint_mention_patterns: strings(&[
                r"grupo\s+\w+,?\s+(e\s+)?{company}\b",
                r"\b{company},?\s+(e\s+)?grupo\s+\w+",
                r"(concorrência|concorrentes|mercado).*\b{company}\b.*\be\s+\w+",
                r"\b{company},?\s+(e\s+)?(ibema|suzano|klabin|eldorado|fibria).*setor",
                r"(acionista|holding|participações)\b.*\b{company}\b",
            ]),
            valid_use_contexts: strings(&[
                "vaga", "vagas", "emprego", "trabalho", "cargo", "função", "requisito",
                "requisitos", "experiência", "conhecimento", "desenvolvedor", "analista",
                "consultor", "implantador", "implementação", "implantação", "migração", "sistema",
                "utiliza", "usa", "usando", "trabalha", "trabalhando",
            ]),
            intent_keywords: strings(&[
                "implementou",
                "implantou",
                "adotou",
                "contratou",
                "migrou para",
                "substituiu",
                "escolheu",
                "firmou parceria",
                "acordo com",
                "contrato com",
                "investimento em",
                "modernização",
                "transformação digital",
                "memorando de intenção",
                "acordo de intenção",
            ]),
        }
    }
}

/// A vendor profile compiled for matching. Built once, shared read-only.
pub struct Lexicon {
    profile: VendorProfile,
    detector: ProductDetector,
    normalizer: NameNormalizer,
    presence: Vec<Regex>,
    generic_lists: Vec<Regex>,
    window_radius: usize,
}

impl Lexicon {
    /// Compile `profile`; invalid patterns are configuration errors
    pub fn new(profile: VendorProfile) -> Result<Self> {
        let presence = compile_all(&profile.presence_patterns, "presence")?;
        let generic_lists = compile_all(&profile.generic_list_patterns, "generic list")?;
        Ok(Self {
            detector: ProductDetector::new(&profile)?,
            normalizer: NameNormalizer::new()?,
            presence,
            generic_lists,
            window_radius: DEFAULT_WINDOW_RADIUS,
            profile,
        })
    }

    /// Override the proximity window radius
    pub fn with_window_radius(mut self, radius: usize) -> Self {
        self.window_radius = radius;
        self
    }

    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    pub fn detector(&self) -> &ProductDetector {
        &self.detector
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    pub fn window_radius(&self) -> usize {
        self.window_radius
    }

    /// Whether the vendor (or a close variant) is mentioned in `text`
    pub fn mentions_vendor(&self, text: &str) -> bool {
        self.presence.iter().any(|r| r.is_match(text))
    }

    /// Whether `text` looks like a stock-ticker or ranking list
    pub fn is_generic_list(&self, text: &str) -> bool {
        self.generic_lists.iter().any(|r| r.is_match(text))
    }

    /// Purchase-intent phrases present in lowercase `text`
    pub fn intent_keywords_in(&self, text: &str) -> Vec<String> {
        self.profile
            .intent_keywords
            .iter()
            .filter(|k| contains_word(text, &k.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Whether lowercase `text` has language of a legitimate product use
    pub fn has_valid_use_context(&self, text: &str) -> bool {
        self.profile
            .valid_use_contexts
            .iter()
            .any(|c| contains_word(text, &c.to_lowercase()))
    }
}

fn compile_all(patterns: &[String], what: &str) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| Error::config(format!("Invalid {} pattern {:?}: {}", what, p, e)))
        })
        .collect()
}
