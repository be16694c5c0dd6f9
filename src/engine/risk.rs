//! Risk classification from two ordinal ratings
//!
//! A failure mode with safety or environmental consequences gets a risk
//! score: consequence severity (1-5) plus likelihood (1-5), giving 2-10.
//! The score is banded against administrator-configured thresholds:
//!
//! | Score | Level (default thresholds 6/8) |
//! |-------|-------------------------------|
//! | 2-5   | Low                           |
//! | 6-7   | Moderate                      |
//! | 8-10  | High                          |

use crate::error::{RcmError, Result};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MIN_SCORE: u8 = MIN_RATING * 2;
pub const MAX_SCORE: u8 = MAX_RATING * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    #[serde(alias = "Medium")]
    Moderate,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Consequence severity picker values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "1-Insignificant")]
    Insignificant,
    #[serde(rename = "2-Minor")]
    Minor,
    #[serde(rename = "3-Moderate")]
    Moderate,
    #[serde(rename = "4-High")]
    High,
    #[serde(rename = "5-Catastrophic")]
    Catastrophic,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Insignificant,
        Severity::Minor,
        Severity::Moderate,
        Severity::High,
        Severity::Catastrophic,
    ];

    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_value(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value).wrapping_sub(1))
            .copied()
            .ok_or(RcmError::InvalidRating {
                field: "consequence",
                value,
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Insignificant => "1-Insignificant",
            Severity::Minor => "2-Minor",
            Severity::Moderate => "3-Moderate",
            Severity::High => "4-High",
            Severity::Catastrophic => "5-Catastrophic",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Likelihood picker values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Likelihood {
    #[serde(rename = "1-Rare")]
    Rare,
    #[serde(rename = "2-Unlikely")]
    Unlikely,
    #[serde(rename = "3-Occasional")]
    Occasional,
    #[serde(rename = "4-Likely")]
    Likely,
    #[serde(rename = "5-Almost Certain")]
    AlmostCertain,
}

impl Likelihood {
    pub const ALL: [Likelihood; 5] = [
        Likelihood::Rare,
        Likelihood::Unlikely,
        Likelihood::Occasional,
        Likelihood::Likely,
        Likelihood::AlmostCertain,
    ];

    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_value(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value).wrapping_sub(1))
            .copied()
            .ok_or(RcmError::InvalidRating {
                field: "likelihood",
                value,
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            Likelihood::Rare => "1-Rare",
            Likelihood::Unlikely => "2-Unlikely",
            Likelihood::Occasional => "3-Occasional",
            Likelihood::Likely => "4-Likely",
            Likelihood::AlmostCertain => "5-Almost Certain",
        }
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Score bands used for every risk evaluation in a session.
///
/// Invariant: both bounds lie in 2-10 and `high_min > moderate_min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub moderate_min: u8,
    pub high_min: u8,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            moderate_min: 6,
            high_min: 8,
        }
    }
}

impl RiskThresholds {
    pub fn new(moderate_min: u8, high_min: u8) -> Result<Self> {
        let thresholds = Self {
            moderate_min,
            high_min,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |v: u8| (MIN_SCORE..=MAX_SCORE).contains(&v);
        if !in_range(self.moderate_min) || !in_range(self.high_min) {
            return Err(RcmError::validation(format!(
                "risk thresholds must lie in {}-{} (got moderate={}, high={})",
                MIN_SCORE, MAX_SCORE, self.moderate_min, self.high_min
            )));
        }
        if self.high_min <= self.moderate_min {
            return Err(RcmError::validation(format!(
                "high threshold ({}) must be greater than moderate threshold ({})",
                self.high_min, self.moderate_min
            )));
        }
        Ok(())
    }

    pub fn level_for(&self, score: u8) -> RiskLevel {
        if score >= self.high_min {
            RiskLevel::High
        } else if score >= self.moderate_min {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Classify a (consequence, likelihood) pair. Returns the level and the
/// additive score.
pub fn classify_risk(
    consequence: u8,
    likelihood: u8,
    thresholds: &RiskThresholds,
) -> Result<(RiskLevel, u8)> {
    let severity = Severity::from_value(consequence)?;
    let likelihood = Likelihood::from_value(likelihood)?;
    let score = severity.value() + likelihood.value();
    Ok((thresholds.level_for(score), score))
}

/// A stored risk evaluation. `risk_score` and `risk_level` are derived,
/// kept in the record so exported documents are self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub consequence: Severity,
    pub likelihood: Likelihood,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    pub fn assess(consequence: Severity, likelihood: Likelihood, thresholds: &RiskThresholds) -> Self {
        let risk_score = consequence.value() + likelihood.value();
        Self {
            consequence,
            likelihood,
            risk_score,
            risk_level: thresholds.level_for(risk_score),
        }
    }

    pub fn from_ratings(consequence: u8, likelihood: u8, thresholds: &RiskThresholds) -> Result<Self> {
        Ok(Self::assess(
            Severity::from_value(consequence)?,
            Likelihood::from_value(likelihood)?,
            thresholds,
        ))
    }

    /// Re-derive score and level. Returns true if the level changed.
    pub fn reclassify(&mut self, thresholds: &RiskThresholds) -> bool {
        let fresh = Self::assess(self.consequence, self.likelihood, thresholds);
        let changed = fresh.risk_level != self.risk_level;
        *self = fresh;
        changed
    }

    /// Recompute the score from the ratings, leaving the level alone.
    /// Returns true if the stored score was wrong.
    pub fn rescore(&mut self) -> bool {
        let score = self.consequence.value() + self.likelihood.value();
        let stale = score != self.risk_score;
        self.risk_score = score;
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // CLASSIFICATION TESTS
    // ==========================================================================
    //
    // Default thresholds (6, 8): 2-5 Low, 6-7 Moderate, 8-10 High.
    // ==========================================================================

    #[test]
    fn test_default_thresholds() {
        let t = RiskThresholds::default();
        assert_eq!(t.moderate_min, 6);
        assert_eq!(t.high_min, 8);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_band_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(classify_risk(2, 3, &t).unwrap(), (RiskLevel::Low, 5));
        assert_eq!(classify_risk(3, 3, &t).unwrap(), (RiskLevel::Moderate, 6));
        assert_eq!(classify_risk(4, 3, &t).unwrap(), (RiskLevel::Moderate, 7));
        assert_eq!(classify_risk(4, 4, &t).unwrap(), (RiskLevel::High, 8));
        assert_eq!(classify_risk(5, 5, &t).unwrap(), (RiskLevel::High, 10));
        assert_eq!(classify_risk(1, 1, &t).unwrap(), (RiskLevel::Low, 2));
    }

    #[test]
    fn test_custom_thresholds() {
        let t = RiskThresholds::new(4, 9).unwrap();
        assert_eq!(classify_risk(1, 2, &t).unwrap().0, RiskLevel::Low);
        assert_eq!(classify_risk(2, 2, &t).unwrap().0, RiskLevel::Moderate);
        assert_eq!(classify_risk(4, 4, &t).unwrap().0, RiskLevel::Moderate);
        assert_eq!(classify_risk(4, 5, &t).unwrap().0, RiskLevel::High);
    }

    #[test]
    fn test_out_of_range_ratings_rejected() {
        let t = RiskThresholds::default();
        assert!(matches!(
            classify_risk(0, 3, &t),
            Err(RcmError::InvalidRating { field: "consequence", value: 0 })
        ));
        assert!(matches!(
            classify_risk(3, 6, &t),
            Err(RcmError::InvalidRating { field: "likelihood", value: 6 })
        ));
    }

    // ==========================================================================
    // THRESHOLD VALIDATION TESTS
    // ==========================================================================

    #[test]
    fn test_thresholds_must_be_ordered() {
        assert!(RiskThresholds::new(8, 8).is_err());
        assert!(RiskThresholds::new(8, 6).is_err());
        assert!(RiskThresholds::new(2, 3).is_ok());
    }

    #[test]
    fn test_thresholds_must_be_in_score_range() {
        assert!(RiskThresholds::new(1, 5).is_err());
        assert!(RiskThresholds::new(6, 11).is_err());
        assert!(RiskThresholds::new(9, 10).is_ok());
    }

    // ==========================================================================
    // RATING LABEL TESTS
    // ==========================================================================

    #[test]
    fn test_rating_values_roundtrip() {
        for v in 1..=5 {
            assert_eq!(Severity::from_value(v).unwrap().value(), v);
            assert_eq!(Likelihood::from_value(v).unwrap().value(), v);
        }
    }

    #[test]
    fn test_rating_labels_serialize_as_picker_text() {
        let json = serde_json::to_string(&Likelihood::AlmostCertain).unwrap();
        assert_eq!(json, "\"5-Almost Certain\"");
        let sev: Severity = serde_json::from_str("\"4-High\"").unwrap();
        assert_eq!(sev, Severity::High);
    }

    #[test]
    fn test_legacy_medium_label_accepted() {
        let level: RiskLevel = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(level, RiskLevel::Moderate);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"Moderate\"");
    }

    #[test]
    fn test_reclassify_after_threshold_change() {
        let mut assessment =
            RiskAssessment::assess(Severity::High, Likelihood::Occasional, &RiskThresholds::default());
        assert_eq!(assessment.risk_score, 7);
        assert_eq!(assessment.risk_level, RiskLevel::Moderate);

        let stricter = RiskThresholds::new(5, 7).unwrap();
        assert!(assessment.reclassify(&stricter));
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(!assessment.reclassify(&stricter));
    }
}
