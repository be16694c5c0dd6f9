//! Consequence classification (RCM decision logic)
//!
//! Two questions, always asked in this order:
//!
//! 1. Will the loss of function become evident to operators under normal
//!    circumstances? A "no" means the failure is hidden, which only happens
//!    for protective functions.
//! 2. Given the answer to (1), what are the consequences: safety or
//!    environmental, operational, or non-operational (repair cost only)?
//!    For hidden failures this is asked about the multiple failure, i.e.
//!    the protected function failing while the protective device is down.

use serde::{Deserialize, Serialize};

/// Answer to the consequence branch question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceBranch {
    Safety,
    Operational,
    NonOperational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConsequenceCategory {
    #[serde(rename = "Hidden (Safety/Environmental)")]
    HiddenSafety,
    #[serde(rename = "Hidden (Operational)")]
    HiddenOperational,
    #[serde(rename = "Hidden (Non-operational)")]
    HiddenNonOperational,
    #[serde(rename = "Evident (Safety/Environmental)")]
    EvidentSafety,
    #[serde(rename = "Evident (Operational)")]
    EvidentOperational,
    #[serde(rename = "Evident (Non-operational)")]
    EvidentNonOperational,
}

impl ConsequenceCategory {
    pub const ALL: [ConsequenceCategory; 6] = [
        ConsequenceCategory::HiddenSafety,
        ConsequenceCategory::HiddenOperational,
        ConsequenceCategory::HiddenNonOperational,
        ConsequenceCategory::EvidentSafety,
        ConsequenceCategory::EvidentOperational,
        ConsequenceCategory::EvidentNonOperational,
    ];

    pub fn is_hidden(self) -> bool {
        matches!(
            self,
            ConsequenceCategory::HiddenSafety
                | ConsequenceCategory::HiddenOperational
                | ConsequenceCategory::HiddenNonOperational
        )
    }

    pub fn is_evident(self) -> bool {
        !self.is_hidden()
    }

    pub fn branch(self) -> ConsequenceBranch {
        match self {
            ConsequenceCategory::HiddenSafety | ConsequenceCategory::EvidentSafety => {
                ConsequenceBranch::Safety
            }
            ConsequenceCategory::HiddenOperational | ConsequenceCategory::EvidentOperational => {
                ConsequenceBranch::Operational
            }
            ConsequenceCategory::HiddenNonOperational
            | ConsequenceCategory::EvidentNonOperational => ConsequenceBranch::NonOperational,
        }
    }

    /// Safety/environmental categories require a risk assessment.
    pub fn is_safety(self) -> bool {
        self.branch() == ConsequenceBranch::Safety
    }

    pub fn label(self) -> &'static str {
        match self {
            ConsequenceCategory::HiddenSafety => "Hidden (Safety/Environmental)",
            ConsequenceCategory::HiddenOperational => "Hidden (Operational)",
            ConsequenceCategory::HiddenNonOperational => "Hidden (Non-operational)",
            ConsequenceCategory::EvidentSafety => "Evident (Safety/Environmental)",
            ConsequenceCategory::EvidentOperational => "Evident (Operational)",
            ConsequenceCategory::EvidentNonOperational => "Evident (Non-operational)",
        }
    }
}

impl std::fmt::Display for ConsequenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify_consequence(is_evident: bool, branch: ConsequenceBranch) -> ConsequenceCategory {
    if is_evident {
        match branch {
            ConsequenceBranch::Safety => ConsequenceCategory::EvidentSafety,
            ConsequenceBranch::Operational => ConsequenceCategory::EvidentOperational,
            ConsequenceBranch::NonOperational => ConsequenceCategory::EvidentNonOperational,
        }
    } else {
        match branch {
            ConsequenceBranch::Safety => ConsequenceCategory::HiddenSafety,
            ConsequenceBranch::Operational => ConsequenceCategory::HiddenOperational,
            ConsequenceBranch::NonOperational => ConsequenceCategory::HiddenNonOperational,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const BRANCHES: [ConsequenceBranch; 3] = [
        ConsequenceBranch::Safety,
        ConsequenceBranch::Operational,
        ConsequenceBranch::NonOperational,
    ];

    #[test]
    fn test_hidden_safety_label() {
        let category = classify_consequence(false, ConsequenceBranch::Safety);
        assert_eq!(category, ConsequenceCategory::HiddenSafety);
        assert_eq!(category.to_string(), "Hidden (Safety/Environmental)");
    }

    #[test]
    fn test_all_six_combinations_distinct() {
        let mut seen = HashSet::new();
        for evident in [true, false] {
            for branch in BRANCHES {
                let category = classify_consequence(evident, branch);
                assert_eq!(category.is_evident(), evident);
                assert_eq!(category.branch(), branch);
                assert!(seen.insert(category), "duplicate category {}", category);
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_safety_detection() {
        for category in ConsequenceCategory::ALL {
            assert_eq!(category.is_safety(), category.label().contains("Safety"));
        }
    }

    #[test]
    fn test_serde_uses_report_labels() {
        for category in ConsequenceCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
            let back: ConsequenceCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }
}
