//! Report generation for FMECA analyses
//!
//! Every failure mode becomes one flattened [`FmecaRow`]; stages that have
//! not been recorded yet render as `N/A` / `Not categorized` / 0. Writers:
//!
//! - **HTML**: Self-contained report with summary cards and the FMECA table
//! - **JSON**: Rows plus the project rollup and implementation plans
//! - **CSV**: One line per failure mode for spreadsheets
//!
//! # Usage
//!
//! ```ignore
//! use rcmkit::report;
//!
//! // Automatically picks format based on extension
//! report::generate("fmeca.html", &project)?;  // HTML
//! report::generate("fmeca.json", &project)?;  // JSON
//! report::generate("fmeca.csv", &project)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::engine::RiskLevel;
use crate::model::{Asset, FailureMode, Project};
use serde::Serialize;
use std::io;
use std::path::Path;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_CATEGORIZED: &str = "Not categorized";

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, project: &Project) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, project),
        "json" => json::write(&mut file, project),
        _ => csv::write(&mut file, project),
    }
}

/// One failure mode, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FmecaRow {
    pub asset: String,
    pub function: String,
    pub functional_failure_id: String,
    pub functional_failure: String,
    pub failure_mode_id: String,
    pub component: String,
    pub failure_mode: String,
    pub cause: String,
    pub safety_impact: String,
    pub operational_impact: String,
    pub downtime_hrs: f64,
    pub consequence_category: String,
    pub risk_score: u8,
    pub risk_level: String,
    pub task_type: String,
    pub task_description: String,
    pub annual_cost: f64,
    pub failure_cost: f64,
    pub residual_risk_level: String,
}

impl FmecaRow {
    pub fn from_failure_mode(asset: &Asset, mode: &FailureMode) -> Self {
        let ff = asset.functional_failure(&mode.functional_failure_id);
        let function = ff.and_then(|ff| asset.function(ff.function_id));
        let effects = mode.effects.as_ref();
        let risk = mode.risk_assessment.as_ref();
        let task = mode.management_task.as_ref();

        Self {
            asset: asset.name.clone(),
            function: function
                .map(|f| f.full_statement.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            functional_failure_id: mode.functional_failure_id.clone(),
            functional_failure: ff
                .map(|ff| ff.description.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            failure_mode_id: mode.id.clone(),
            component: mode.component.clone(),
            failure_mode: mode.description.clone(),
            cause: mode.category.label().to_string(),
            safety_impact: effects
                .map(|e| or_none(&e.safety_impact))
                .unwrap_or_else(|| "None".to_string()),
            operational_impact: effects
                .map(|e| or_none(&e.operational_impact))
                .unwrap_or_else(|| "None".to_string()),
            downtime_hrs: effects.map(|e| e.downtime).unwrap_or(0.0),
            consequence_category: mode
                .consequence_category
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| NOT_CATEGORIZED.to_string()),
            risk_score: risk.map(|r| r.risk_score).unwrap_or(0),
            risk_level: level_label(risk.map(|r| r.risk_level)),
            task_type: task
                .map(|t| t.task_type.code().to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            task_description: task
                .map(|t| t.description.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            annual_cost: task.map(|t| t.cost).unwrap_or(0.0),
            failure_cost: task.map(|t| t.failure_cost).unwrap_or(0.0),
            residual_risk_level: level_label(
                task.and_then(|t| t.post_risk_assessment.as_ref())
                    .map(|r| r.risk_level),
            ),
        }
    }
}

fn or_none(s: &str) -> String {
    if s.trim().is_empty() {
        "None".to_string()
    } else {
        s.to_string()
    }
}

fn level_label(level: Option<RiskLevel>) -> String {
    match level {
        Some(RiskLevel::Low) => "Low".to_string(),
        Some(RiskLevel::Moderate) => "Moderate".to_string(),
        Some(RiskLevel::High) => "High".to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// All failure modes of a project, asset by asset.
pub fn fmeca_rows(project: &Project) -> Vec<FmecaRow> {
    project
        .assets()
        .flat_map(|asset| {
            asset
                .failure_modes
                .iter()
                .map(move |mode| FmecaRow::from_failure_mode(asset, mode))
        })
        .collect()
}

/// Analysis progress over a batch of rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub categorized: usize,
    pub with_task: usize,
    pub high_risk: usize,
    pub annual_cost: f64,
}

impl Summary {
    pub fn from_rows(rows: &[FmecaRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Self::default()
        };

        for r in rows {
            if r.consequence_category != NOT_CATEGORIZED {
                summary.categorized += 1;
            }
            if r.task_type != NOT_AVAILABLE {
                summary.with_task += 1;
                if matches!(r.task_type.as_str(), "CBM" | "FTM" | "FF") {
                    summary.annual_cost += r.annual_cost;
                }
            }
            if r.risk_level == "High" {
                summary.high_risk += 1;
            }
        }

        summary
    }
}
