//! RCM decision engine
//!
//! Pure functions, no session state:
//!
//! - [`risk`]: consequence x likelihood scoring against configurable thresholds
//! - [`consequence`]: the evident/hidden decision tree
//! - [`tasks`]: which task types are legal for a consequence, and task validation

pub mod consequence;
pub mod risk;
pub mod tasks;

pub use consequence::{classify_consequence, ConsequenceBranch, ConsequenceCategory};
pub use risk::{classify_risk, Likelihood, RiskAssessment, RiskLevel, RiskThresholds, Severity};
pub use tasks::{
    eligible_task_types, failure_finding_interval_days, Answer, Availability, CostBreakdown,
    IntervalUnit, ManagementTask, OtfReason, RedesignType, TaskDetails, TaskDraft, TaskType,
};
