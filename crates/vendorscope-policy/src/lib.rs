//! vendorscope Policy
//!
//! What to search and how to score what was found.
//!
//! - [`sources`]: categorized, weighted source pools
//! - [`query`]: source-specific query generation
//! - [`aggregate`]: folding accepted evidence into tier counts and a score
//! - [`threshold`]: the ordered status/confidence table
//! - [`policy`]: [`EnginePolicy`], the YAML-loadable bundle of the above
//!
//! ## Example policy
//!
//! ```yaml
//! intent_bonus: 20
//! pools:
//!   - source_type: premium_news
//!     base_weight: 85
//!     domains: [valor.globo.com, exame.com]
//!   - source_type: general_news
//!     base_weight: 60
//!     vertical: news
//!     lookback_years: 0
//! thresholds:
//!   - condition: { type: official_source }
//!     status: no-go
//!     confidence: high
//!     percent: 100
//!   - condition: { type: triple_at_least, n: 1 }
//!     status: no-go
//!     confidence: medium
//!     percent: 80
//!   - condition: { type: always }
//!     status: go
//!     confidence: high
//!     percent: 95
//! ```

pub mod aggregate;
pub mod policy;
pub mod query;
pub mod sources;
pub mod threshold;

pub use aggregate::{Aggregator, Tally};
pub use policy::EnginePolicy;
pub use query::{search_term, Phase, QueryGenerator};
pub use sources::{default_pools, SourcePool};
pub use threshold::{Condition, Decision, ThresholdRow, ThresholdTable};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::policy::EnginePolicy;
    pub use crate::query::{Phase, QueryGenerator};
    pub use crate::sources::SourcePool;
    pub use crate::threshold::ThresholdTable;
}
