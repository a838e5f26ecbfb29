//! vendorscope Classifiers
//!
//! Text classification for vendor-usage evidence.
//!
//! - [`normalizer`]: company name variations and the short search name
//! - [`lexicon`] / [`detector`]: reference-vendor profile and product detection
//! - [`segment`]: industry segment detection and product×segment boosts
//! - [`validator`]: the rule chains deciding whether a search hit is evidence
//! - [`verifier`]: deep-context verification capability and fetch budget

pub mod detector;
pub mod lexicon;
pub mod normalizer;
pub mod segment;
pub mod text;
pub mod validator;
pub mod verifier;

pub use detector::ProductDetector;
pub use lexicon::{Lexicon, ProductMatch, ProductSpec, VendorProfile, DEFAULT_WINDOW_RADIUS};
pub use normalizer::NameNormalizer;
pub use segment::{Relevance, SegmentKeywords, SegmentMatrix};
pub use validator::{
    CompanyMatcher, EvidenceValidator, RejectReason, RuleChain, RuleContext, RuleOutcome,
    ValidationRule, Verdict,
};
pub use verifier::{
    ContextVerifier, DeepContext, FetchBudget, NoopFetcher, NoopVerifier, PageFetcher, PageText,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::lexicon::{Lexicon, VendorProfile};
    pub use crate::segment::{SegmentKeywords, SegmentMatrix};
    pub use crate::validator::{CompanyMatcher, EvidenceValidator, Verdict};
    pub use crate::verifier::{ContextVerifier, DeepContext, FetchBudget, PageFetcher};
}
