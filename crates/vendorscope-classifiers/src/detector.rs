//! Product detection
//!
//! Two passes over lowercase text: ambiguous short codes through their own
//! regexes, everything else through one Aho-Corasick automaton with
//! word-boundary checks and per-entry guards.

use crate::lexicon::{ProductMatch, VendorProfile};
use crate::text::{contains_word, is_word_bounded};
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use std::collections::BTreeSet;
use vendorscope_core::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Guard {
    None,
    AdjacentToVendor,
    UsageContext,
}

/// Compiled product lexicon of one vendor
pub struct ProductDetector {
    automaton: AhoCorasick,
    /// Product name and guard per automaton pattern
    entries: Vec<(String, Guard)>,
    short_codes: Vec<(String, Regex)>,
    vendor: String,
    usage_verbs: Vec<String>,
}

impl ProductDetector {
    /// Compile the lexicon of `profile`
    pub fn new(profile: &VendorProfile) -> Result<Self> {
        let mut needles = Vec::new();
        let mut entries = Vec::new();
        let mut short_codes = Vec::new();

        for product in &profile.products {
            let guard = match &product.matcher {
                ProductMatch::Pattern { pattern } => {
                    let regex = Regex::new(pattern).map_err(|e| {
                        Error::config(format!("Invalid pattern for product {}: {}", product.name, e))
                    })?;
                    short_codes.push((product.name.clone(), regex));
                    continue;
                }
                ProductMatch::Plain => Guard::None,
                ProductMatch::AdjacentToVendor => Guard::AdjacentToVendor,
                ProductMatch::UsageContext => Guard::UsageContext,
            };
            needles.push(product.name.to_lowercase());
            entries.push((product.name.clone(), guard));
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&needles)
            .map_err(|e| Error::config(format!("Failed to build product matcher: {}", e)))?;

        Ok(Self {
            automaton,
            entries,
            short_codes,
            vendor: profile.vendor_lower(),
            usage_verbs: profile.usage_verbs.iter().map(|v| v.to_lowercase()).collect(),
        })
    }

    /// Products mentioned in `text`
    pub fn detect(&self, text: &str) -> BTreeSet<String> {
        let lower = text.to_lowercase();
        let mut found = BTreeSet::new();

        for (name, regex) in &self.short_codes {
            if regex.is_match(&lower) {
                found.insert(name.clone());
            }
        }

        for m in self.automaton.find_iter(&lower) {
            if !is_word_bounded(&lower, m.start(), m.end()) {
                continue;
            }
            let (name, guard) = &self.entries[m.pattern().as_usize()];
            let accepted = match guard {
                Guard::None => true,
                Guard::AdjacentToVendor => self.next_to_vendor(&lower, m.start(), m.end()),
                Guard::UsageContext => self.usage_verbs.iter().any(|v| contains_word(&lower, v)),
            };
            if accepted {
                found.insert(name.clone());
            }
        }

        found
    }

    fn next_to_vendor(&self, lower: &str, start: usize, end: usize) -> bool {
        let before = lower[..start].trim_end();
        let after = lower[end..].trim_start();
        before.ends_with(&self.vendor) || after.starts_with(&self.vendor)
    }
}
