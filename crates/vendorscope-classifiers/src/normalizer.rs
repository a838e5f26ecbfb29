//! Company name normalization
//!
//! Produces the list of spellings under which a company may appear in
//! free text, and the short name used to build search queries.

use crate::text::capitalize;
use regex::Regex;
use vendorscope_core::{Error, Result};

/// Generates search-safe variations of company names
pub struct NameNormalizer {
    trailing_suffix: Regex,
    noise_word: Regex,
    search_cut: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuffixFamily {
    SociedadeAnonima,
    Limitada,
    Other,
}

impl SuffixFamily {
    fn of(suffix: &str) -> Self {
        let s = suffix.to_lowercase();
        if s.starts_with("ltda") {
            Self::Limitada
        } else if s.starts_with('s') {
            Self::SociedadeAnonima
        } else {
            Self::Other
        }
    }

    fn spellings(self, matched: &str) -> Vec<String> {
        match self {
            Self::SociedadeAnonima => ["S.A.", "S/A", "SA", "S.A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            Self::Limitada => ["LTDA", "Ltda.", "Ltda"].iter().map(|s| s.to_string()).collect(),
            Self::Other => vec![matched.to_uppercase(), matched.to_lowercase()],
        }
    }
}

impl NameNormalizer {
    /// Create a new normalizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            trailing_suffix: Regex::new(r"(?i)\s+(s\.?\s?a\.?|s/a|ltda\.?|eireli|epp|me)$")
                .map_err(|e| Error::internal(format!("Failed to compile suffix regex: {}", e)))?,
            noise_word: Regex::new(
                r"(?i)\s+(s\.?a\.?|s/a|ltda\.?|eireli|epp|me|indústrias?|comércio|serviços|participações|holdings?|transportes?|logística)(\s|$)",
            )
            .map_err(|e| Error::internal(format!("Failed to compile noise regex: {}", e)))?,
            search_cut: Regex::new(
                r"(?i)\s+(s\.a\.|s/a|sa|ltda|eireli|epp|me|indústrias?|comércio|serviços|participações|holdings)(\s|$|\.|,)",
            )
            .map_err(|e| Error::internal(format!("Failed to compile search-name regex: {}", e)))?,
        })
    }

    /// Ordered, de-duplicated spellings of `name`. The original is always first.
    pub fn variations(&self, name: &str) -> Vec<String> {
        let mut out = vec![name.to_string()];
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return out;
        }

        let (base, suffix) = match self.trailing_suffix.captures(trimmed) {
            Some(caps) => {
                let whole = caps.get(0).map_or(trimmed.len(), |m| m.start());
                let suffix = caps.get(1).map(|m| m.as_str().to_string());
                (trimmed[..whole].trim().to_string(), suffix)
            }
            None => (trimmed.to_string(), None),
        };

        out.push(base.to_lowercase());
        out.push(base.to_uppercase());
        out.push(capitalize(&base));

        if let Some(suffix) = suffix {
            for spelling in SuffixFamily::of(&suffix).spellings(&suffix) {
                out.push(format!("{} {}", base, spelling));
                out.push(format!("{} {}", base, spelling).to_lowercase());
            }
        }

        let clean = self.strip_noise(trimmed);
        if clean != trimmed && clean.chars().count() >= 3 {
            out.push(clean.clone());
            out.push(clean.to_lowercase());
            out.push(clean.to_uppercase());
        }

        let words: Vec<&str> = clean.split_whitespace().collect();
        if words.len() > 2 {
            let first_two = words[..2].join(" ");
            out.push(first_two.to_lowercase());
            out.push(first_two);
        }
        if let Some(first) = words.first() {
            if first.chars().count() >= 5 {
                out.push(first.to_string());
            }
        }

        dedup_in_order(out)
    }

    /// Name used in search queries: everything from the first corporate
    /// suffix onwards is dropped.
    pub fn search_name(&self, name: &str) -> String {
        let trimmed = name.trim();
        let short = match self.search_cut.find(trimmed) {
            Some(m) => trimmed[..m.start()].trim(),
            None => trimmed,
        };
        let short = short.trim_end_matches([',', '-', '.']).trim();
        if short.is_empty() {
            trimmed.to_string()
        } else {
            short.to_string()
        }
    }

    fn strip_noise(&self, name: &str) -> String {
        let mut clean = name.to_string();
        loop {
            let next = self.noise_word.replace_all(&clean, " ").trim().to_string();
            if next == clean {
                return clean;
            }
            clean = next;
        }
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new().expect("Failed to create name normalizer")
    }
}

fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| (!item.is_empty() || seen.is_empty()) && seen.insert(item.clone()))
        .collect()
}
