//! vendorscope Core
//!
//! Core types and errors shared across vendorscope components.
//!
//! This crate provides:
//! - The data model of a vendor-usage run (identity, queries, evidence, results)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    ClassificationResult, CompanyIdentity, ConfidenceLevel, Evidence, MatchType, Methodology,
    SearchQuery, SearchResult, SearchVertical, Segment, SourceType, Status, ValidationMethod,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        ClassificationResult, CompanyIdentity, ConfidenceLevel, Evidence, MatchType,
        Methodology, SearchQuery, SearchResult, SearchVertical, Segment, SourceType, Status,
        ValidationMethod,
    };
}
