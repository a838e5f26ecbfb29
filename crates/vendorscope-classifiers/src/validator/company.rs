//! Company mention matching

use crate::lexicon::Lexicon;
use regex::Regex;
use vendorscope_core::{CompanyIdentity, Error, Result};

/// Spellings and joint-mention patterns of the investigated company,
/// built once per run
#[derive(Debug, Clone)]
pub struct CompanyMatcher {
    name: String,
    search_name: String,
    /// Lowercase variants in normalizer order
    variants: Vec<String>,
    joint_mentions: Vec<Regex>,
}

impl CompanyMatcher {
    pub fn new(identity: &CompanyIdentity, lexicon: &Lexicon) -> Result<Self> {
        let name = identity.display_name().to_string();
        let normalizer = lexicon.normalizer();
        let search_name = normalizer.search_name(&name);

        let mut variants: Vec<String> = Vec::new();
        for variant in normalizer.variations(&name) {
            let lower = variant.trim().to_lowercase();
            if !lower.is_empty() && !variants.contains(&lower) {
                variants.push(lower);
            }
        }

        let escaped = regex::escape(&search_name.to_lowercase());
        let joint_mentions = lexicon
            .profile()
            .joint_mention_patterns
            .iter()
            .map(|template| {
                let pattern = template.replace("{company}", &escaped);
                Regex::new(&pattern).map_err(|e| {
                    Error::config(format!("Invalid joint-mention pattern {:?}: {}", template, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            search_name,
            variants,
            joint_mentions,
        })
    }

    /// Name as given in the identity
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name used in queries
    pub fn search_name(&self) -> &str {
        &self.search_name
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Span of the first variant (in normalizer order) found in lowercase `text`
    pub fn find_in(&self, text: &str) -> Option<(usize, usize)> {
        self.variants
            .iter()
            .find_map(|v| text.find(v.as_str()).map(|start| (start, start + v.len())))
    }

    pub fn mentioned_in(&self, text: &str) -> bool {
        self.find_in(text).is_some()
    }

    /// Whether `word` is one of the company's own spellings
    pub fn is_own_name(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.variants.iter().any(|v| *v == word)
    }

    /// Whether lowercase `text` mentions the company only as part of a
    /// group, competition or shareholder construction
    pub fn is_joint_mention(&self, text: &str) -> bool {
        self.joint_mentions.iter().any(|r| r.is_match(text))
    }
}
