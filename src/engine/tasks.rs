//! Failure management task selection
//!
//! Which task types are legal depends on the consequence category:
//!
//! - CBM, FTM and Redesign are always candidates.
//! - Failure-finding (FF) only applies to hidden failures; an evident
//!   failure is already found by the operators.
//! - Operate-to-failure (OTF) is never acceptable when safety or
//!   environmental consequences are in play.
//!
//! A task is only recorded when it is both technically feasible and worth
//! doing. Each task type carries its own sub-schema ([`TaskDetails`]).

use crate::engine::consequence::ConsequenceCategory;
use crate::engine::risk::{Likelihood, RiskAssessment, RiskThresholds, Severity};
use crate::error::{RcmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "CBM - Condition Based Maintenance", alias = "CBM")]
    Cbm,
    #[serde(rename = "FTM - Fixed Time Maintenance", alias = "FTM")]
    Ftm,
    #[serde(rename = "FF - Failure Finding", alias = "FF")]
    Ff,
    #[serde(rename = "Redesign")]
    Redesign,
    #[serde(rename = "OTF - Operate to Failure", alias = "OTF")]
    Otf,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Cbm,
        TaskType::Ftm,
        TaskType::Ff,
        TaskType::Redesign,
        TaskType::Otf,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TaskType::Cbm => "CBM",
            TaskType::Ftm => "FTM",
            TaskType::Ff => "FF",
            TaskType::Redesign => "Redesign",
            TaskType::Otf => "OTF",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskType::Cbm => "CBM - Condition Based Maintenance",
            TaskType::Ftm => "FTM - Fixed Time Maintenance",
            TaskType::Ff => "FF - Failure Finding",
            TaskType::Redesign => "Redesign",
            TaskType::Otf => "OTF - Operate to Failure",
        }
    }

    /// Recurring tasks that count toward annual maintenance cost.
    pub fn is_scheduled(self) -> bool {
        matches!(self, TaskType::Cbm | TaskType::Ftm | TaskType::Ff)
    }

    /// Only permanent engineering changes plausibly shift inherent risk.
    pub fn allows_residual_risk(self) -> bool {
        matches!(self, TaskType::Ftm | TaskType::Redesign)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TaskType {
    type Err = RcmError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        TaskType::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(wanted) || t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RcmError::validation(format!("unknown task type '{}'", s)))
    }
}

pub fn eligible_task_types(category: ConsequenceCategory) -> BTreeSet<TaskType> {
    let mut eligible: BTreeSet<TaskType> = [TaskType::Cbm, TaskType::Ftm, TaskType::Redesign]
        .into_iter()
        .collect();
    if category.is_hidden() {
        eligible.insert(TaskType::Ff);
    }
    if !category.is_safety() {
        eligible.insert(TaskType::Otf);
    }
    eligible
}

pub fn is_eligible(task_type: TaskType, category: ConsequenceCategory) -> bool {
    eligible_task_types(category).contains(&task_type)
}

/// Yes/No picker answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
    #[serde(rename = "operating hours")]
    OperatingHours,
    Cycles,
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
            IntervalUnit::Weeks => "weeks",
            IntervalUnit::Months => "months",
            IntervalUnit::Years => "years",
            IntervalUnit::OperatingHours => "operating hours",
            IntervalUnit::Cycles => "cycles",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedesignType {
    #[serde(rename = "Equipment modification")]
    EquipmentModification,
    #[serde(rename = "Process change")]
    ProcessChange,
    #[serde(rename = "Procedure update")]
    ProcedureUpdate,
    #[serde(rename = "Training")]
    Training,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtfReason {
    #[serde(rename = "No effective proactive task available")]
    NoEffectiveTask,
    #[serde(rename = "Cost of proactive maintenance exceeds cost of failure")]
    NotCostEffective,
    #[serde(rename = "Low consequence failure")]
    LowConsequence,
}

impl std::fmt::Display for OtfReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OtfReason::NoEffectiveTask => "No effective proactive task available",
            OtfReason::NotCostEffective => "Cost of proactive maintenance exceeds cost of failure",
            OtfReason::LowConsequence => "Low consequence failure",
        };
        f.write_str(s)
    }
}

/// Required availability of a protective device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "99.99%")]
    P99_99,
    #[serde(rename = "99.95%")]
    P99_95,
    #[serde(rename = "99.9%")]
    P99_9,
    #[serde(rename = "99.5%")]
    P99_5,
    #[serde(rename = "99%")]
    P99,
    #[serde(rename = "98%")]
    P98,
    #[serde(rename = "95%")]
    P95,
}

impl Availability {
    /// Failure-finding interval as a fraction of the protective device MTBF.
    /// Industry-standard approximation table; do not tune.
    pub fn ffi_fraction(self) -> f64 {
        match self {
            Availability::P99_99 => 0.0002,
            Availability::P99_95 => 0.001,
            Availability::P99_9 => 0.002,
            Availability::P99_5 => 0.01,
            Availability::P99 => 0.02,
            Availability::P98 => 0.04,
            Availability::P95 => 0.10,
        }
    }
}

pub fn failure_finding_interval_days(mtbf_years: f64, availability: Availability) -> f64 {
    mtbf_years * DAYS_PER_YEAR * availability.ffi_fraction()
}

/// Per-task-type sub-schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskDetails {
    Cbm {
        potential_failure: String,
        pf_interval: f64,
        inspection_method: String,
        inspection_frequency: f64,
    },
    Ftm {
        action: String,
        interval: f64,
        interval_unit: IntervalUnit,
        useful_life: f64,
    },
    Ff {
        test_method: String,
        mtbf_protective_years: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mtbf_protected_years: Option<f64>,
        required_availability: Availability,
        /// Derived from the MTBF and availability when the task is built.
        #[serde(default)]
        ffi_days: f64,
    },
    Redesign {
        redesign_type: RedesignType,
        change_description: String,
    },
    Otf {
        reason: OtfReason,
    },
}

impl TaskDetails {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskDetails::Cbm { .. } => TaskType::Cbm,
            TaskDetails::Ftm { .. } => TaskType::Ftm,
            TaskDetails::Ff { .. } => TaskType::Ff,
            TaskDetails::Redesign { .. } => TaskType::Redesign,
            TaskDetails::Otf { .. } => TaskType::Otf,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            TaskDetails::Cbm {
                potential_failure,
                pf_interval,
                inspection_method,
                inspection_frequency,
            } => {
                require_text("potential failure condition", potential_failure)?;
                require_text("inspection method", inspection_method)?;
                require_non_negative("P-F interval", *pf_interval)?;
                require_non_negative("inspection frequency", *inspection_frequency)
            }
            TaskDetails::Ftm {
                action,
                interval,
                useful_life,
                ..
            } => {
                require_text("task action", action)?;
                require_non_negative("interval", *interval)?;
                require_non_negative("useful life", *useful_life)
            }
            TaskDetails::Ff {
                test_method,
                mtbf_protective_years,
                mtbf_protected_years,
                ..
            } => {
                require_text("test method", test_method)?;
                require_non_negative("protective device MTBF", *mtbf_protective_years)?;
                if let Some(protected) = mtbf_protected_years {
                    require_non_negative("protected device MTBF", *protected)?;
                }
                Ok(())
            }
            TaskDetails::Redesign {
                change_description, ..
            } => require_text("redesign description", change_description),
            TaskDetails::Otf { .. } => Ok(()),
        }
    }

    /// Fill in derived fields (the FF interval).
    fn finalize(mut self) -> Self {
        if let TaskDetails::Ff {
            mtbf_protective_years,
            required_availability,
            ffi_days,
            ..
        } = &mut self
        {
            *ffi_days = failure_finding_interval_days(*mtbf_protective_years, *required_availability);
        }
        self
    }

    pub fn default_description(&self) -> String {
        match self {
            TaskDetails::Cbm {
                potential_failure,
                inspection_method,
                inspection_frequency,
                ..
            } => format!(
                "Monitor {} every {} days/hours. Action when {}",
                inspection_method, inspection_frequency, potential_failure
            ),
            TaskDetails::Ftm {
                action,
                interval,
                interval_unit,
                ..
            } => format!("{} every {} {}", action, interval, interval_unit),
            TaskDetails::Ff {
                test_method,
                ffi_days,
                ..
            } => format!("Test {} every {:.2} days", test_method, ffi_days),
            TaskDetails::Redesign {
                change_description, ..
            } => change_description.clone(),
            TaskDetails::Otf { reason } => format!("Operate to failure. Reason: {}", reason),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RcmError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RcmError::validation(format!(
            "{} must be a non-negative number (got {})",
            field, value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub labour: f64,
    #[serde(default)]
    pub parts: f64,
    #[serde(default)]
    pub other: f64,
}

impl CostBreakdown {
    pub fn new(labour: f64, parts: f64, other: f64) -> Self {
        Self { labour, parts, other }
    }

    pub fn total(&self) -> f64 {
        self.labour + self.parts + self.other
    }

    fn validate(&self, what: &str) -> Result<()> {
        require_non_negative(&format!("{} labour cost", what), self.labour)?;
        require_non_negative(&format!("{} parts cost", what), self.parts)?;
        require_non_negative(&format!("{} other cost", what), self.other)
    }
}

/// Ratings for the residual risk expected once the task is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualRiskDraft {
    pub consequence: Severity,
    pub likelihood: Likelihood,
}

/// User input for a management task, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub details: TaskDetails,
    #[serde(default)]
    pub description: Option<String>,
    pub technically_feasible: Answer,
    pub worth_doing: Answer,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub task_costs: Option<CostBreakdown>,
    #[serde(default)]
    pub failure_costs: Option<CostBreakdown>,
    #[serde(default)]
    pub residual_risk: Option<ResidualRiskDraft>,
}

impl TaskDraft {
    pub fn new(details: TaskDetails) -> Self {
        Self {
            details,
            description: None,
            technically_feasible: Answer::Yes,
            worth_doing: Answer::Yes,
            justification: String::new(),
            task_costs: None,
            failure_costs: None,
            residual_risk: None,
        }
    }

    pub fn with_costs(mut self, task: CostBreakdown, failure: CostBreakdown) -> Self {
        self.task_costs = Some(task);
        self.failure_costs = Some(failure);
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    pub fn with_residual_risk(mut self, consequence: Severity, likelihood: Likelihood) -> Self {
        self.residual_risk = Some(ResidualRiskDraft {
            consequence,
            likelihood,
        });
        self
    }
}

/// A validated failure management task recorded on a failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementTask {
    pub task_type: TaskType,
    pub description: String,
    pub technically_feasible: Answer,
    pub worth_doing: Answer,
    #[serde(default)]
    pub justification: String,
    /// Absent on documents written before sub-schemas were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<TaskDetails>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub failure_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_breakdown: Option<CostBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_cost_breakdown: Option<CostBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_risk_assessment: Option<RiskAssessment>,
}

impl ManagementTask {
    /// Validate a draft against the consequence category and build the task.
    pub fn build(
        draft: TaskDraft,
        category: ConsequenceCategory,
        thresholds: &RiskThresholds,
    ) -> Result<Self> {
        let task_type = draft.details.task_type();
        if !is_eligible(task_type, category) {
            return Err(RcmError::validation(format!(
                "{} is not an eligible task type for {} consequences",
                task_type.code(),
                category
            )));
        }

        if !(draft.technically_feasible.is_yes() && draft.worth_doing.is_yes()) {
            return Err(RcmError::validation(
                "Task must be both technically feasible and worth doing; choose a different task type or redesign",
            ));
        }

        draft.details.validate()?;
        let details = draft.details.finalize();

        // Deciding not to act proactively has no task cost to weigh.
        let (cost_breakdown, failure_cost_breakdown) = if task_type == TaskType::Otf {
            (None, None)
        } else {
            if let Some(costs) = &draft.task_costs {
                costs.validate("task")?;
            }
            if let Some(costs) = &draft.failure_costs {
                costs.validate("failure")?;
            }
            (draft.task_costs, draft.failure_costs)
        };

        let post_risk_assessment = match draft.residual_risk {
            Some(residual) => {
                if !(task_type.allows_residual_risk() && category.is_safety()) {
                    return Err(RcmError::validation(format!(
                        "residual risk only applies to FTM or Redesign tasks on safety/environmental consequences (got {} on {})",
                        task_type.code(),
                        category
                    )));
                }
                Some(RiskAssessment::assess(
                    residual.consequence,
                    residual.likelihood,
                    thresholds,
                ))
            }
            None => None,
        };

        let description = match draft.description {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => details.default_description(),
        };

        Ok(Self {
            task_type,
            description,
            technically_feasible: draft.technically_feasible,
            worth_doing: draft.worth_doing,
            justification: draft.justification,
            details: Some(details),
            cost: cost_breakdown.map(|c| c.total()).unwrap_or(0.0),
            failure_cost: failure_cost_breakdown.map(|c| c.total()).unwrap_or(0.0),
            cost_breakdown,
            failure_cost_breakdown,
            post_risk_assessment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConsequenceCategory::*;

    fn ftm_details() -> TaskDetails {
        TaskDetails::Ftm {
            action: "Grease bearing".to_string(),
            interval: 3.0,
            interval_unit: IntervalUnit::Months,
            useful_life: 10.0,
        }
    }

    fn otf_details() -> TaskDetails {
        TaskDetails::Otf {
            reason: OtfReason::LowConsequence,
        }
    }

    // ==========================================================================
    // ELIGIBILITY TESTS
    // ==========================================================================
    //
    // FF iff hidden; OTF iff not safety/environmental; CBM/FTM/Redesign always.
    // ==========================================================================

    #[test]
    fn test_eligibility_matrix() {
        for category in ConsequenceCategory::ALL {
            let eligible = eligible_task_types(category);
            assert!(eligible.contains(&TaskType::Cbm));
            assert!(eligible.contains(&TaskType::Ftm));
            assert!(eligible.contains(&TaskType::Redesign));
            assert_eq!(eligible.contains(&TaskType::Ff), category.is_hidden(), "{}", category);
            assert_eq!(eligible.contains(&TaskType::Otf), !category.is_safety(), "{}", category);
        }
    }

    #[test]
    fn test_hidden_non_operational_allows_everything() {
        assert_eq!(eligible_task_types(HiddenNonOperational).len(), 5);
    }

    #[test]
    fn test_evident_safety_is_most_restricted() {
        let eligible: Vec<_> = eligible_task_types(EvidentSafety).into_iter().collect();
        assert_eq!(eligible, vec![TaskType::Cbm, TaskType::Ftm, TaskType::Redesign]);
    }

    #[test]
    fn test_task_type_parse() {
        assert_eq!("ftm".parse::<TaskType>().unwrap(), TaskType::Ftm);
        assert_eq!("OTF - Operate to Failure".parse::<TaskType>().unwrap(), TaskType::Otf);
        assert!("weekly".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_task_type_accepts_short_code_in_json() {
        let t: TaskType = serde_json::from_str("\"CBM\"").unwrap();
        assert_eq!(t, TaskType::Cbm);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"CBM - Condition Based Maintenance\"");
    }

    // ==========================================================================
    // FAILURE-FINDING INTERVAL TESTS
    // ==========================================================================

    #[test]
    fn test_ffi_lookup_table() {
        assert_eq!(Availability::P99_99.ffi_fraction(), 0.0002);
        assert_eq!(Availability::P99_95.ffi_fraction(), 0.001);
        assert_eq!(Availability::P99_9.ffi_fraction(), 0.002);
        assert_eq!(Availability::P99_5.ffi_fraction(), 0.01);
        assert_eq!(Availability::P99.ffi_fraction(), 0.02);
        assert_eq!(Availability::P98.ffi_fraction(), 0.04);
        assert_eq!(Availability::P95.ffi_fraction(), 0.10);
    }

    #[test]
    fn test_ffi_days_ten_year_mtbf() {
        let days = failure_finding_interval_days(10.0, Availability::P99);
        assert!((days - 73.05).abs() < 1e-9, "got {}", days);
    }

    #[test]
    fn test_ff_task_derives_interval() {
        let draft = TaskDraft::new(TaskDetails::Ff {
            test_method: "Trip test pressure switch".to_string(),
            mtbf_protective_years: 10.0,
            mtbf_protected_years: None,
            required_availability: Availability::P99,
            ffi_days: 0.0,
        });
        let task = ManagementTask::build(draft, HiddenOperational, &RiskThresholds::default()).unwrap();
        match task.details {
            Some(TaskDetails::Ff { ffi_days, .. }) => assert!((ffi_days - 73.05).abs() < 1e-9),
            other => panic!("unexpected details {:?}", other),
        }
        assert_eq!(task.description, "Test Trip test pressure switch every 73.05 days");
    }

    // ==========================================================================
    // TASK VALIDATION TESTS
    // ==========================================================================

    #[test]
    fn test_ineligible_task_rejected() {
        let err = ManagementTask::build(
            TaskDraft::new(otf_details()),
            EvidentSafety,
            &RiskThresholds::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RcmError::Validation(_)));
    }

    #[test]
    fn test_ff_rejected_for_evident_failure() {
        let draft = TaskDraft::new(TaskDetails::Ff {
            test_method: "Test".to_string(),
            mtbf_protective_years: 5.0,
            mtbf_protected_years: None,
            required_availability: Availability::P95,
            ffi_days: 0.0,
        });
        assert!(ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).is_err());
    }

    #[test]
    fn test_infeasible_or_not_worth_doing_rejected() {
        let mut draft = TaskDraft::new(ftm_details());
        draft.technically_feasible = Answer::No;
        assert!(ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).is_err());

        let mut draft = TaskDraft::new(ftm_details());
        draft.worth_doing = Answer::No;
        let err = ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).unwrap_err();
        assert!(err.to_string().contains("technically feasible and worth doing"));
    }

    #[test]
    fn test_sub_schema_required_fields() {
        let draft = TaskDraft::new(TaskDetails::Cbm {
            potential_failure: "  ".to_string(),
            pf_interval: 30.0,
            inspection_method: "Vibration analysis".to_string(),
            inspection_frequency: 7.0,
        });
        assert!(ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).is_err());

        let draft = TaskDraft::new(TaskDetails::Ftm {
            action: "Replace seal".to_string(),
            interval: -1.0,
            interval_unit: IntervalUnit::Years,
            useful_life: 5.0,
        });
        assert!(ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).is_err());
    }

    // ==========================================================================
    // COST MODEL TESTS
    // ==========================================================================

    #[test]
    fn test_costs_are_summed() {
        let draft = TaskDraft::new(ftm_details()).with_costs(
            CostBreakdown::new(100.0, 50.0, 25.0),
            CostBreakdown::new(1000.0, 2000.0, 0.0),
        );
        let task = ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).unwrap();
        assert_eq!(task.cost, 175.0);
        assert_eq!(task.failure_cost, 3000.0);
        assert_eq!(task.description, "Grease bearing every 3 months");
    }

    #[test]
    fn test_otf_has_no_cost() {
        let draft = TaskDraft::new(otf_details())
            .with_costs(CostBreakdown::new(10.0, 10.0, 10.0), CostBreakdown::new(5.0, 0.0, 0.0));
        let task = ManagementTask::build(draft, EvidentNonOperational, &RiskThresholds::default()).unwrap();
        assert_eq!(task.cost, 0.0);
        assert_eq!(task.failure_cost, 0.0);
        assert!(task.cost_breakdown.is_none());
        assert_eq!(task.description, "Operate to failure. Reason: Low consequence failure");
    }

    #[test]
    fn test_safety_without_costs_is_zero() {
        let task = ManagementTask::build(
            TaskDraft::new(ftm_details()),
            EvidentSafety,
            &RiskThresholds::default(),
        )
        .unwrap();
        assert_eq!(task.cost, 0.0);
    }

    #[test]
    fn test_negative_cost_rejected() {
        let draft = TaskDraft::new(ftm_details())
            .with_costs(CostBreakdown::new(-5.0, 0.0, 0.0), CostBreakdown::default());
        assert!(ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).is_err());
    }

    // ==========================================================================
    // RESIDUAL RISK TESTS
    // ==========================================================================

    #[test]
    fn test_residual_risk_for_ftm_on_safety() {
        let draft = TaskDraft::new(ftm_details()).with_residual_risk(Severity::High, Likelihood::Rare);
        let task = ManagementTask::build(draft, EvidentSafety, &RiskThresholds::default()).unwrap();
        let post = task.post_risk_assessment.unwrap();
        assert_eq!(post.risk_score, 5);
        assert_eq!(post.risk_level, crate::engine::risk::RiskLevel::Low);
    }

    #[test]
    fn test_residual_risk_rejected_for_cbm() {
        let draft = TaskDraft::new(TaskDetails::Cbm {
            potential_failure: "Vibration above 7 mm/s".to_string(),
            pf_interval: 30.0,
            inspection_method: "Vibration analysis".to_string(),
            inspection_frequency: 7.0,
        })
        .with_residual_risk(Severity::Minor, Likelihood::Rare);
        assert!(ManagementTask::build(draft, EvidentSafety, &RiskThresholds::default()).is_err());
    }

    #[test]
    fn test_residual_risk_rejected_on_operational() {
        let draft = TaskDraft::new(ftm_details()).with_residual_risk(Severity::Minor, Likelihood::Rare);
        assert!(ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).is_err());
    }

    #[test]
    fn test_explicit_description_wins() {
        let mut draft = TaskDraft::new(ftm_details());
        draft.description = Some("Quarterly greasing per OEM manual".to_string());
        let task = ManagementTask::build(draft, EvidentOperational, &RiskThresholds::default()).unwrap();
        assert_eq!(task.description, "Quarterly greasing per OEM manual");
    }
}
