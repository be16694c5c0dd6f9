//! Typed RCM data model
//!
//! Project → Asset → {Component, Function → FunctionalFailure → FailureMode}.
//! A failure mode accumulates its analysis in strict order: effects, then
//! consequence category (plus a risk assessment for safety/environmental
//! consequences), then a management task. Each stage is an explicit
//! `Option` so "not yet populated" is a state, not a missing key.
//!
//! Mutation goes through [`crate::session::AnalysisSession`], which owns the
//! referential-integrity rules. The types here only carry data, derived
//! views, and id formatting.

use crate::engine::{ConsequenceCategory, ManagementTask, RiskAssessment, RiskThresholds, TaskType};
use crate::error::{RcmError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable asset identifier, never reused within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A{}", self.0)
    }
}

impl std::str::FromStr for AssetId {
    type Err = RcmError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches(['A', 'a']);
        digits
            .parse::<u64>()
            .map(AssetId)
            .map_err(|_| RcmError::validation(format!("invalid asset id '{}'", s)))
    }
}

pub fn functional_failure_id(function_id: u32, seq: u32) -> String {
    format!("FF-{}.{}", function_id, seq)
}

pub fn failure_mode_id(functional_failure_id: &str, seq: u32) -> String {
    format!("FM-{}-{}", functional_failure_id, seq)
}

/// Trailing sequence number of a scoped id (`FF-1.3` → 3, `FM-FF-1.3-2` → 2).
fn trailing_seq(id: &str, separator: char) -> Option<u32> {
    id.rsplit(separator).next().and_then(|s| s.parse().ok())
}

// ============================================================================
// Enumerated pickers
// ============================================================================

/// Placeholder shown by pickers before a choice is made.
fn is_unselected(label: &str) -> bool {
    label.is_empty() || label.eq_ignore_ascii_case("Select...")
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, what = $what:literal $(, unselected = $unselected:ident)? {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = RcmError;

            fn from_str(value: &str) -> Result<Self> {
                let wanted = value.trim();
                if let Some(found) = Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                {
                    return Ok(found);
                }
                $(
                    if is_unselected(wanted) {
                        return Ok($name::$unselected);
                    }
                )?
                Err(RcmError::validation(format!("unknown {} '{}'", $what, value)))
            }
        }

        impl TryFrom<String> for $name {
            type Error = RcmError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum! {
    AssetClass, what = "asset class", unselected = Other {
        PumpStation => "Pump Station",
        WaterTreatmentPlant => "Water Treatment Plant",
        PipelineSystem => "Pipeline System",
        StorageTank => "Storage Tank",
        DistributionNetwork => "Distribution Network",
        ControlSystem => "Control System",
        Other => "Other",
    }
}

labelled_enum! {
    FunctionType, what = "function type" {
        Primary => "Primary Function",
        EnvironmentalIntegrity => "Environmental Integrity",
        SafetyStructuralIntegrity => "Safety/Structural Integrity",
        ControlContainmentComfort => "Control/Containment/Comfort",
        Appearance => "Appearance",
        Protection => "Protection",
        EconomyEfficiency => "Economy/Efficiency",
    }
}

labelled_enum! {
    /// How the function is lost.
    FailureCategory, what = "functional failure category" {
        CompleteLoss => "Complete loss of function",
        PartialLoss => "Partial loss of function",
        ExceedsUpperLimit => "Exceeds upper limit",
        BelowLowerLimit => "Below lower limit",
    }
}

labelled_enum! {
    /// Failure cause category of a failure mode.
    FailureCause, what = "failure cause", unselected = Other {
        Deterioration => "Deterioration (wear, corrosion, fatigue)",
        Lubrication => "Lubrication failure",
        Contamination => "Dirt/contamination",
        Disassembly => "Disassembly (loose connections)",
        HumanError => "Human error",
        Overloading => "Overloading",
        Other => "Other",
    }
}

// ============================================================================
// Project and Asset
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_no: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub next_asset_id: u64,
}

/// A project exclusively owns its assets.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub info: ProjectInfo,
    assets: BTreeMap<AssetId, Asset>,
}

impl Project {
    pub fn new(project_no: &str, description: &str) -> Result<Self> {
        let project_no = project_no.trim();
        if project_no.is_empty() {
            return Err(RcmError::validation("project number is required"));
        }
        let now = Utc::now();
        Ok(Self {
            info: ProjectInfo {
                project_no: project_no.to_string(),
                description: description.trim().to_string(),
                created_date: now,
                last_modified: now,
                next_asset_id: 1,
            },
            assets: BTreeMap::new(),
        })
    }

    /// Rebuild a project from stored parts, repairing id counters.
    pub fn from_parts(mut info: ProjectInfo, assets: Vec<Asset>) -> Result<Self> {
        if info.project_no.trim().is_empty() {
            return Err(RcmError::validation("project number is required"));
        }
        let mut map = BTreeMap::new();
        for mut asset in assets {
            asset.normalize_counters();
            for risk in asset.risk_assessments_mut() {
                risk.rescore();
            }
            if map.insert(asset.id, asset).is_some() {
                return Err(RcmError::validation("duplicate asset id in document"));
            }
        }
        let max_id = map.keys().map(|id| id.0).max().unwrap_or(0);
        info.next_asset_id = info.next_asset_id.max(max_id + 1);
        Ok(Self { info, assets: map })
    }

    pub fn project_no(&self) -> &str {
        &self.info.project_no
    }

    /// Re-derive every stored risk against `thresholds`. Returns how many
    /// levels changed.
    pub(crate) fn reclassify_risks(&mut self, thresholds: &RiskThresholds) -> usize {
        self.assets
            .values_mut()
            .flat_map(Asset::risk_assessments_mut)
            .map(|risk| usize::from(risk.reclassify(thresholds)))
            .sum()
    }

    /// Assets in creation order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn find_asset_by_name(&self, name: &str) -> Option<&Asset> {
        self.assets.values().find(|a| a.name == name)
    }

    pub(crate) fn asset_mut(&mut self, id: AssetId) -> Option<&mut Asset> {
        self.assets.get_mut(&id)
    }

    pub(crate) fn allocate_asset_id(&mut self) -> AssetId {
        let id = AssetId(self.info.next_asset_id.max(1));
        self.info.next_asset_id = id.0 + 1;
        id
    }

    pub(crate) fn insert_asset(&mut self, asset: Asset) {
        self.assets.insert(asset.id, asset);
    }

    pub(crate) fn remove_asset(&mut self, id: AssetId) -> Option<Asset> {
        self.assets.remove(&id)
    }

    pub(crate) fn touch(&mut self) {
        self.info.last_modified = Utc::now();
    }
}

/// Descriptive fields of an asset, as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDraft {
    pub name: String,
    pub class: AssetClass,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub site_location: String,
}

impl AssetDraft {
    pub fn new(name: &str, class: AssetClass) -> Self {
        Self {
            name: name.to_string(),
            class,
            asset_type: String::new(),
            site_location: String::new(),
        }
    }
}

/// Free-form notes about the circumstances in which an asset operates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatingContext(BTreeMap<String, String>);

impl OperatingContext {
    pub const REDUNDANCY: &'static str = "redundancy";
    pub const UTILIZATION: &'static str = "utilization";
    pub const QUALITY_STANDARDS: &'static str = "quality_standards";
    pub const SEASONAL_DEMANDS: &'static str = "seasonal_demands";
    pub const SKILLS_AVAILABILITY: &'static str = "skills_availability";
    pub const SPARES_AVAILABILITY: &'static str = "spares_availability";
    pub const LOGISTICS: &'static str = "logistics";
    pub const OPERATING_ENVIRONMENT: &'static str = "operating_environment";
    pub const SAFETY_STANDARDS: &'static str = "safety_standards";
    pub const ENVIRONMENTAL_STANDARDS: &'static str = "environmental_standards";

    pub const STANDARD_KEYS: [&'static str; 10] = [
        Self::REDUNDANCY,
        Self::UTILIZATION,
        Self::QUALITY_STANDARDS,
        Self::SEASONAL_DEMANDS,
        Self::SKILLS_AVAILABILITY,
        Self::SPARES_AVAILABILITY,
        Self::LOGISTICS,
        Self::OPERATING_ENVIRONMENT,
        Self::SAFETY_STANDARDS,
        Self::ENVIRONMENTAL_STANDARDS,
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub class: AssetClass,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub site_location: String,
    /// Component names, unique, in insertion order.
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub operating_context: OperatingContext,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub functional_failures: Vec<FunctionalFailure>,
    #[serde(default)]
    pub failure_modes: Vec<FailureMode>,
    #[serde(default)]
    pub next_function_id: u32,
}

impl Asset {
    pub(crate) fn from_draft(id: AssetId, draft: AssetDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            class: draft.class,
            asset_type: draft.asset_type,
            site_location: draft.site_location,
            components: Vec::new(),
            operating_context: OperatingContext::default(),
            functions: Vec::new(),
            functional_failures: Vec::new(),
            failure_modes: Vec::new(),
            next_function_id: 1,
        }
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c == name)
    }

    pub fn function(&self, id: u32) -> Option<&Function> {
        self.functions.iter().find(|f| f.id == id)
    }

    pub fn functional_failure(&self, id: &str) -> Option<&FunctionalFailure> {
        self.functional_failures.iter().find(|f| f.id == id)
    }

    pub fn failure_mode(&self, id: &str) -> Option<&FailureMode> {
        self.failure_modes.iter().find(|m| m.id == id)
    }

    pub(crate) fn failure_mode_mut(&mut self, id: &str) -> Option<&mut FailureMode> {
        self.failure_modes.iter_mut().find(|m| m.id == id)
    }

    /// Pre- and post-task risk assessments of every failure mode.
    pub(crate) fn risk_assessments_mut(&mut self) -> impl Iterator<Item = &mut RiskAssessment> {
        self.failure_modes.iter_mut().flat_map(|mode| {
            let post = mode
                .management_task
                .as_mut()
                .and_then(|task| task.post_risk_assessment.as_mut());
            mode.risk_assessment.as_mut().into_iter().chain(post)
        })
    }

    pub fn failure_modes_for(&self, functional_failure_id: &str) -> impl Iterator<Item = &FailureMode> {
        let ffid = functional_failure_id.to_string();
        self.failure_modes
            .iter()
            .filter(move |m| m.functional_failure_id == ffid)
    }

    pub fn failure_modes_for_component<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = &'a FailureMode> + 'a {
        self.failure_modes.iter().filter(move |m| m.component == component)
    }

    pub fn functional_failures_for(&self, function_id: u32) -> impl Iterator<Item = &FunctionalFailure> {
        self.functional_failures
            .iter()
            .filter(move |f| f.function_id == function_id)
    }

    /// One row per failure mode with a recorded task, derived on demand.
    pub fn analysis_results(&self) -> Vec<AnalysisResult> {
        self.failure_modes
            .iter()
            .filter_map(AnalysisResult::from_failure_mode)
            .collect()
    }

    /// Make sure no counter would hand out an id that already exists.
    pub(crate) fn normalize_counters(&mut self) {
        let max_fn = self.functions.iter().map(|f| f.id).max().unwrap_or(0);
        self.next_function_id = self.next_function_id.max(max_fn + 1);

        for function in &mut self.functions {
            let max_seq = self
                .functional_failures
                .iter()
                .filter(|ff| ff.function_id == function.id)
                .filter_map(|ff| trailing_seq(&ff.id, '.'))
                .max()
                .unwrap_or(0);
            function.next_failure_seq = function.next_failure_seq.max(max_seq + 1);
        }

        for ff in &mut self.functional_failures {
            let max_seq = self
                .failure_modes
                .iter()
                .filter(|m| m.functional_failure_id == ff.id)
                .filter_map(|m| trailing_seq(&m.id, '-'))
                .max()
                .unwrap_or(0);
            ff.next_mode_seq = ff.next_mode_seq.max(max_seq + 1);
        }
    }
}

// ============================================================================
// Functions and failures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDraft {
    pub function_type: FunctionType,
    pub verb: String,
    pub object: String,
    #[serde(default)]
    pub performance_standard: String,
}

impl FunctionDraft {
    pub fn new(function_type: FunctionType, verb: &str, object: &str, standard: &str) -> Self {
        Self {
            function_type,
            verb: verb.to_string(),
            object: object.to_string(),
            performance_standard: standard.to_string(),
        }
    }

    pub fn full_statement(&self) -> String {
        format!("{} {} {}", self.verb.trim(), self.object.trim(), self.performance_standard.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub id: u32,
    #[serde(rename = "type")]
    pub function_type: FunctionType,
    pub verb: String,
    pub object: String,
    #[serde(default)]
    pub performance_standard: String,
    #[serde(default)]
    pub full_statement: String,
    #[serde(default)]
    pub next_failure_seq: u32,
}

impl Function {
    pub(crate) fn from_draft(id: u32, draft: FunctionDraft) -> Self {
        let full_statement = draft.full_statement();
        Self {
            id,
            function_type: draft.function_type,
            verb: draft.verb.trim().to_string(),
            object: draft.object.trim().to_string(),
            performance_standard: draft.performance_standard.trim().to_string(),
            full_statement,
            next_failure_seq: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalFailure {
    pub id: String,
    pub function_id: u32,
    #[serde(default)]
    pub function_statement: String,
    pub description: String,
    pub category: FailureCategory,
    #[serde(default)]
    pub next_mode_seq: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureModeDraft {
    pub functional_failure_id: String,
    pub component: String,
    pub description: String,
    pub category: FailureCause,
}

/// Consequences of a failure mode. Recorded as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub safety_impact: String,
    #[serde(default)]
    pub operational_impact: String,
    #[serde(default)]
    pub physical_damage: String,
    #[serde(default)]
    pub repair_action: String,
    /// Hours.
    #[serde(default)]
    pub repair_time: f64,
    /// Hours.
    #[serde(default)]
    pub downtime: f64,
}

impl Effects {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("repair time", self.repair_time), ("downtime", self.downtime)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RcmError::validation(format!(
                    "{} must be a non-negative number of hours (got {})",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    pub id: String,
    pub functional_failure_id: String,
    /// Name of a component of the owning asset.
    pub component: String,
    pub description: String,
    pub category: FailureCause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Effects>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequence_category: Option<ConsequenceCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_task: Option<ManagementTask>,
}

// ============================================================================
// Derived views
// ============================================================================

/// Flattened projection of a failure mode with a recorded task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub failure_mode_id: String,
    pub component: String,
    pub failure_mode: String,
    pub consequence: String,
    pub task_type: TaskType,
    pub task_description: String,
    pub cost: f64,
}

impl AnalysisResult {
    pub fn from_failure_mode(mode: &FailureMode) -> Option<Self> {
        let task = mode.management_task.as_ref()?;
        Some(Self {
            failure_mode_id: mode.id.clone(),
            component: mode.component.clone(),
            failure_mode: mode.description.clone(),
            consequence: mode
                .consequence_category
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            task_type: task.task_type,
            task_description: task.description.clone(),
            cost: task.cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_id_format() {
        assert_eq!(functional_failure_id(1, 1), "FF-1.1");
        assert_eq!(failure_mode_id("FF-1.1", 1), "FM-FF-1.1-1");
        assert_eq!(trailing_seq("FF-12.7", '.'), Some(7));
        assert_eq!(trailing_seq("FM-FF-1.1-3", '-'), Some(3));
        assert_eq!(trailing_seq("garbage", '-'), None);
    }

    #[test]
    fn test_asset_id_parse() {
        assert_eq!("A7".parse::<AssetId>().unwrap(), AssetId(7));
        assert_eq!("7".parse::<AssetId>().unwrap(), AssetId(7));
        assert!("pump".parse::<AssetId>().is_err());
        assert_eq!(AssetId(3).to_string(), "A3");
    }

    #[test]
    fn test_labelled_enum_serde() {
        let json = serde_json::to_string(&AssetClass::PumpStation).unwrap();
        assert_eq!(json, "\"Pump Station\"");
        let class: AssetClass = serde_json::from_str("\"Select...\"").unwrap();
        assert_eq!(class, AssetClass::Other);
        let cause: FailureCause = serde_json::from_str("\"Lubrication failure\"").unwrap();
        assert_eq!(cause, FailureCause::Lubrication);
        let cause: FailureCause = serde_json::from_str("\"\"").unwrap();
        assert_eq!(cause, FailureCause::Other);
    }

    #[test]
    fn test_unknown_labels_rejected() {
        assert!(serde_json::from_str::<FailureCategory>("\"Intermittent loss\"").is_err());
        assert!(serde_json::from_str::<FunctionType>("\"Secondary Function\"").is_err());
        assert!(serde_json::from_str::<AssetClass>("\"Reservoir\"").is_err());
        assert!(serde_json::from_str::<FunctionType>("\"Select...\"").is_err());

        let err = "Intermittent loss".parse::<FailureCategory>().unwrap_err();
        assert!(matches!(err, RcmError::Validation(_)));
        assert_eq!(
            " partial LOSS of function ".parse::<FailureCategory>().unwrap(),
            FailureCategory::PartialLoss
        );
    }

    #[test]
    fn test_full_statement_joins_parts() {
        let draft = FunctionDraft::new(FunctionType::Primary, "To pump", "water", "at 250 L/s");
        assert_eq!(draft.full_statement(), "To pump water at 250 L/s");
        let draft = FunctionDraft::new(FunctionType::Protection, "To contain", "pressure", "");
        assert_eq!(draft.full_statement(), "To contain pressure");
    }

    #[test]
    fn test_project_requires_number() {
        assert!(Project::new("  ", "x").is_err());
        let p = Project::new("P-001", "Irrigation pumps").unwrap();
        assert_eq!(p.project_no(), "P-001");
        assert_eq!(p.asset_count(), 0);
    }

    #[test]
    fn test_effects_reject_negative_hours() {
        let effects = Effects {
            evidence: String::new(),
            safety_impact: String::new(),
            operational_impact: String::new(),
            physical_damage: String::new(),
            repair_action: String::new(),
            repair_time: -1.0,
            downtime: 2.0,
        };
        assert!(effects.validate().is_err());
    }

    #[test]
    fn test_normalize_counters_from_existing_ids() {
        let mut asset = Asset::from_draft(AssetId(1), AssetDraft::new("Pump A", AssetClass::PumpStation));
        asset.next_function_id = 0;
        asset.functions.push(Function::from_draft(
            4,
            FunctionDraft::new(FunctionType::Primary, "To pump", "water", ""),
        ));
        asset.functions[0].next_failure_seq = 0;
        asset.functional_failures.push(FunctionalFailure {
            id: "FF-4.2".to_string(),
            function_id: 4,
            function_statement: String::new(),
            description: "No flow".to_string(),
            category: FailureCategory::CompleteLoss,
            next_mode_seq: 0,
        });

        asset.normalize_counters();

        assert_eq!(asset.next_function_id, 5);
        assert_eq!(asset.functions[0].next_failure_seq, 3);
        assert_eq!(asset.functional_failures[0].next_mode_seq, 1);
    }
}
