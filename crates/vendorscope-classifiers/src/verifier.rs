//! Deep-context verification capability
//!
//! A bounded number of candidate URLs per run may be fetched and handed to
//! a context verifier that confirms a genuine business relationship between
//! the company and the vendor.

use async_trait::async_trait;
use std::sync::Arc;
use vendorscope_core::{Result, ValidationMethod};

/// Text extracted from a fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub description: String,
    pub body: String,
}

impl PageText {
    /// Title, description and body joined for classification
    pub fn combined(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.body)
            .trim()
            .to_string()
    }
}

/// Fetches and extracts the readable text of a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageText>;
}

/// Decides whether a page describes a direct business relationship
#[async_trait]
pub trait ContextVerifier: Send + Sync {
    /// `true` when the page confirms that `company_name` is a customer,
    /// partner or contracting party of the vendor
    async fn confirm(&self, company_name: &str, page_text: &str) -> Result<bool>;

    /// Method recorded on evidence confirmed by this verifier
    fn method(&self) -> ValidationMethod;
}

/// Verifier used when no classifier is configured: always confirms
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVerifier;

#[async_trait]
impl ContextVerifier for NoopVerifier {
    async fn confirm(&self, _company_name: &str, _page_text: &str) -> Result<bool> {
        Ok(true)
    }

    fn method(&self) -> ValidationMethod {
        ValidationMethod::Basic
    }
}

/// Fetcher used when deep verification is disabled: returns an empty page
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFetcher;

#[async_trait]
impl PageFetcher for NoopFetcher {
    async fn fetch(&self, _url: &str) -> Result<PageText> {
        Ok(PageText::default())
    }
}

/// Fetcher and verifier pair used by the validator
#[derive(Clone)]
pub struct DeepContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub verifier: Arc<dyn ContextVerifier>,
}

impl DeepContext {
    pub fn new(fetcher: Arc<dyn PageFetcher>, verifier: Arc<dyn ContextVerifier>) -> Self {
        Self { fetcher, verifier }
    }

    /// Pass-through pair: nothing is fetched, everything is confirmed
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopFetcher), Arc::new(NoopVerifier))
    }
}

impl Default for DeepContext {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Per-run cap on deep-context fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBudget {
    used: u32,
    max: u32,
}

impl FetchBudget {
    pub fn new(max: u32) -> Self {
        Self { used: 0, max }
    }

    /// Consume one fetch if any remain
    pub fn try_acquire(&mut self) -> bool {
        if self.used >= self.max {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }
}
