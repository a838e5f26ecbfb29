//! Ordered classification threshold table

use crate::aggregate::Tally;
use serde::{Deserialize, Serialize};
use vendorscope_core::{ConfidenceLevel, Status};

/// Condition of a threshold row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Any evidence from an official source
    OfficialSource,

    /// At least `n` triple-tier items
    TripleAtLeast { n: u32 },

    /// At least `n` double-tier items
    DoubleAtLeast { n: u32 },

    /// Matches unconditionally
    Always,
}

impl Condition {
    pub fn matches(&self, tally: &Tally) -> bool {
        match self {
            Self::OfficialSource => tally.has_official,
            Self::TripleAtLeast { n } => tally.triple_count >= *n,
            Self::DoubleAtLeast { n } => tally.double_count >= *n,
            Self::Always => true,
        }
    }
}

/// Status and confidence assigned by a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: Status,
    pub confidence: ConfidenceLevel,
    pub percent: u8,
}

impl Decision {
    /// Nothing found: safe to pursue
    pub fn clear() -> Self {
        Self {
            status: Status::Go,
            confidence: ConfidenceLevel::High,
            percent: 95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRow {
    pub condition: Condition,
    #[serde(flatten)]
    pub decision: Decision,
}

impl ThresholdRow {
    fn new(condition: Condition, status: Status, confidence: ConfidenceLevel, percent: u8) -> Self {
        Self {
            condition,
            decision: Decision {
                status,
                confidence,
                percent,
            },
        }
    }
}

/// Rows evaluated in order; the first matching row decides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable(pub Vec<ThresholdRow>);

impl ThresholdTable {
    /// Decide the outcome for a tally. A table with no matching row yields
    /// [`Decision::clear`].
    pub fn decide(&self, tally: &Tally) -> Decision {
        self.0
            .iter()
            .find(|row| row.condition.matches(tally))
            .map(|row| row.decision)
            .unwrap_or_else(Decision::clear)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        use Condition::*;
        use ConfidenceLevel::{High, Medium};
        use Status::{Go, NoGo};

        Self(vec![
            ThresholdRow::new(OfficialSource, NoGo, High, 100),
            ThresholdRow::new(TripleAtLeast { n: 5 }, NoGo, High, 100),
            ThresholdRow::new(TripleAtLeast { n: 3 }, NoGo, High, 90),
            ThresholdRow::new(TripleAtLeast { n: 2 }, NoGo, High, 85),
            ThresholdRow::new(TripleAtLeast { n: 1 }, NoGo, Medium, 80),
            ThresholdRow::new(DoubleAtLeast { n: 3 }, NoGo, Medium, 70),
            ThresholdRow::new(DoubleAtLeast { n: 2 }, NoGo, Medium, 60),
            ThresholdRow::new(DoubleAtLeast { n: 1 }, NoGo, Medium, 50),
            ThresholdRow::new(Always, Go, High, 95),
        ])
    }
}
