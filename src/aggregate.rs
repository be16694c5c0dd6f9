//! Analysis aggregator
//!
//! Read-side rollups over assets and projects. Everything here tolerates
//! partially analysed failure modes: a mode without a consequence counts
//! as uncategorized, a mode without a task contributes no result row and
//! no cost.
//!
//! "Annual" cost only covers the recurring task types (CBM, FTM, FF).
//! Redesign costs are one-off and reported separately; OTF has no task
//! cost at all.

use crate::engine::{ConsequenceCategory, TaskType};
use crate::model::{AnalysisResult, Asset, AssetClass, AssetId, Project};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fixed implementation checklist shown with every plan.
pub const IMPLEMENTATION_CHECKLIST: [&str; 12] = [
    "Review and approve all identified tasks",
    "Update CMMS with new maintenance tasks",
    "Schedule initial execution dates",
    "Assign resources and responsibilities",
    "Order necessary parts and materials",
    "Update standard operating procedures",
    "Conduct training for operations and maintenance staff",
    "Set up condition monitoring systems (for CBM tasks)",
    "Establish spare parts inventory",
    "Create job plans and work instructions",
    "Set up performance tracking and KPIs",
    "Schedule first review date for continuous improvement",
];

pub fn count_by_task_type(results: &[AnalysisResult]) -> BTreeMap<TaskType, usize> {
    let mut counts = BTreeMap::new();
    for r in results {
        *counts.entry(r.task_type).or_insert(0) += 1;
    }
    counts
}

/// Sum of task costs over CBM, FTM and FF rows.
pub fn total_annual_cost(results: &[AnalysisResult]) -> f64 {
    results
        .iter()
        .filter(|r| r.task_type.is_scheduled())
        .map(|r| r.cost)
        .sum()
}

/// Sum of Redesign task costs.
pub fn one_off_cost(results: &[AnalysisResult]) -> f64 {
    results
        .iter()
        .filter(|r| r.task_type == TaskType::Redesign)
        .map(|r| r.cost)
        .sum()
}

/// Histogram of consequence categories across failure modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsequenceBreakdown {
    pub by_category: BTreeMap<ConsequenceCategory, usize>,
    /// Failure modes with no consequence recorded yet.
    pub uncategorized: usize,
}

impl ConsequenceBreakdown {
    pub fn total(&self) -> usize {
        self.by_category.values().sum::<usize>() + self.uncategorized
    }

    pub fn count(&self, category: ConsequenceCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    fn merge(&mut self, other: &ConsequenceBreakdown) {
        for (category, n) in &other.by_category {
            *self.by_category.entry(*category).or_insert(0) += n;
        }
        self.uncategorized += other.uncategorized;
    }
}

pub fn consequence_breakdown(asset: &Asset) -> ConsequenceBreakdown {
    let mut breakdown = ConsequenceBreakdown::default();
    for mode in &asset.failure_modes {
        match mode.consequence_category {
            Some(category) => *breakdown.by_category.entry(category).or_insert(0) += 1,
            None => breakdown.uncategorized += 1,
        }
    }
    breakdown
}

/// Statistics for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetSummary {
    pub asset_id: AssetId,
    pub name: String,
    pub class: AssetClass,
    pub components: usize,
    pub functions: usize,
    pub functional_failures: usize,
    pub failure_modes: usize,
    pub management_tasks: usize,
    pub task_counts: BTreeMap<TaskType, usize>,
    pub consequences: ConsequenceBreakdown,
    pub annual_cost: f64,
    pub one_off_cost: f64,
}

impl AssetSummary {
    pub fn from_asset(asset: &Asset) -> Self {
        let results = asset.analysis_results();
        Self {
            asset_id: asset.id,
            name: asset.name.clone(),
            class: asset.class,
            components: asset.components.len(),
            functions: asset.functions.len(),
            functional_failures: asset.functional_failures.len(),
            failure_modes: asset.failure_modes.len(),
            management_tasks: results.len(),
            task_counts: count_by_task_type(&results),
            consequences: consequence_breakdown(asset),
            annual_cost: total_annual_cost(&results),
            one_off_cost: one_off_cost(&results),
        }
    }

    /// Share of failure modes that have a management task, 0-100.
    pub fn completion_pct(&self) -> f64 {
        if self.failure_modes == 0 {
            return 0.0;
        }
        self.management_tasks as f64 / self.failure_modes as f64 * 100.0
    }
}

/// Per-asset summaries plus project totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRollup {
    pub project_no: String,
    pub assets: Vec<AssetSummary>,
    pub failure_modes: usize,
    pub management_tasks: usize,
    pub task_counts: BTreeMap<TaskType, usize>,
    pub consequences: ConsequenceBreakdown,
    pub annual_cost: f64,
    pub one_off_cost: f64,
}

pub fn project_rollup(project: &Project) -> ProjectRollup {
    let assets: Vec<AssetSummary> = project.assets().map(AssetSummary::from_asset).collect();

    let mut rollup = ProjectRollup {
        project_no: project.project_no().to_string(),
        assets: Vec::new(),
        failure_modes: 0,
        management_tasks: 0,
        task_counts: BTreeMap::new(),
        consequences: ConsequenceBreakdown::default(),
        annual_cost: 0.0,
        one_off_cost: 0.0,
    };
    for summary in &assets {
        rollup.failure_modes += summary.failure_modes;
        rollup.management_tasks += summary.management_tasks;
        for (task_type, n) in &summary.task_counts {
            *rollup.task_counts.entry(*task_type).or_insert(0) += n;
        }
        rollup.consequences.merge(&summary.consequences);
        rollup.annual_cost += summary.annual_cost;
        rollup.one_off_cost += summary.one_off_cost;
    }
    rollup.assets = assets;
    rollup
}

// ============================================================================
// Implementation plan
// ============================================================================

/// Maintenance schedule, one-off changes and checklist for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationPlan {
    pub asset_id: AssetId,
    pub asset_name: String,
    /// CBM, FTM and FF rows.
    pub schedule: Vec<AnalysisResult>,
    pub schedule_counts: BTreeMap<TaskType, usize>,
    pub annual_cost: f64,
    /// Redesign rows.
    pub one_off_changes: Vec<AnalysisResult>,
    pub one_off_cost: f64,
    pub checklist: Vec<&'static str>,
}

impl ImplementationPlan {
    pub fn for_asset(asset: &Asset) -> Self {
        let (schedule, rest): (Vec<_>, Vec<_>) = asset
            .analysis_results()
            .into_iter()
            .partition(|r| r.task_type.is_scheduled());
        let one_off_changes: Vec<AnalysisResult> = rest
            .into_iter()
            .filter(|r| r.task_type == TaskType::Redesign)
            .collect();

        let mut schedule_counts: BTreeMap<TaskType, usize> = [TaskType::Cbm, TaskType::Ftm, TaskType::Ff]
            .into_iter()
            .map(|t| (t, 0))
            .collect();
        schedule_counts.extend(count_by_task_type(&schedule));

        Self {
            asset_id: asset.id,
            asset_name: asset.name.clone(),
            annual_cost: total_annual_cost(&schedule),
            one_off_cost: one_off_cost(&one_off_changes),
            schedule,
            schedule_counts,
            one_off_changes,
            checklist: IMPLEMENTATION_CHECKLIST.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty() && self.one_off_changes.is_empty()
    }
}
