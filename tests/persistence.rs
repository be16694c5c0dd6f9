//! Document round trips and autosave behaviour.

use pretty_assertions::assert_eq;
use rcmkit::engine::{CostBreakdown, IntervalUnit, RedesignType, TaskDetails};
use rcmkit::model::{
    AssetClass, AssetDraft, Effects, FailureCategory, FailureCause, FailureModeDraft, FunctionDraft,
    FunctionType, OperatingContext,
};
use rcmkit::persist::{self, ApplicationInfo};
use rcmkit::{
    AnalysisSession, ConsequenceBranch, ConsequenceInput, FileAutosave, Likelihood, Project,
    RiskLevel, RiskThresholds, Severity, TaskDraft,
};
use tempfile::TempDir;

fn effects(downtime: f64) -> Effects {
    Effects {
        evidence: "Alarm at SCADA".to_string(),
        safety_impact: "Spill risk near walkway".to_string(),
        operational_impact: "Reduced delivery".to_string(),
        physical_damage: String::new(),
        repair_action: "Replace seal kit".to_string(),
        repair_time: 4.5,
        downtime,
    }
}

/// Two failure modes: one with a residual risk, one redesigned.
fn analysed_project() -> Project {
    let project = Project::new("P-200", "Treatment works \"B\", stage 2").unwrap();
    let mut s = AnalysisSession::new(project, RiskThresholds::default());

    let mut draft = AssetDraft::new("Dosing Pump 3", AssetClass::WaterTreatmentPlant);
    draft.site_location = "Leeton".to_string();
    let asset = s.add_asset(draft).unwrap();
    s.set_operating_context(
        asset,
        OperatingContext::new()
            .with(OperatingContext::REDUNDANCY, "Duty/standby")
            .with(OperatingContext::UTILIZATION, "24/7"),
    )
    .unwrap();
    s.add_component(asset, "Mechanical seal").unwrap();
    s.add_component(asset, "Motor").unwrap();

    let f = s
        .add_function(
            asset,
            FunctionDraft::new(FunctionType::Primary, "To dose", "chlorine", "at 0.1-0.3 mg/L"),
        )
        .unwrap();
    let ff = s
        .add_functional_failure(asset, f, "Doses below 0.1 mg/L", FailureCategory::BelowLowerLimit)
        .unwrap();

    let seal = s
        .add_failure_mode(
            asset,
            FailureModeDraft {
                functional_failure_id: ff.clone(),
                component: "Mechanical seal".to_string(),
                description: "Seal face worn".to_string(),
                category: FailureCause::Deterioration,
            },
        )
        .unwrap();
    s.set_effects(asset, &seal, effects(8.25)).unwrap();
    s.set_consequence(
        asset,
        &seal,
        ConsequenceInput::new(true, ConsequenceBranch::Safety)
            .with_ratings(Severity::Catastrophic, Likelihood::Likely),
    )
    .unwrap();
    s.set_management_task(
        asset,
        &seal,
        TaskDraft::new(TaskDetails::Ftm {
            action: "Replace seal".to_string(),
            interval: 0.5,
            interval_unit: IntervalUnit::Years,
            useful_life: 2.0,
        })
        .with_costs(
            CostBreakdown::new(210.1, 333.3, 0.7),
            CostBreakdown::new(4000.0, 900.0, 0.1),
        )
        .with_residual_risk(Severity::Catastrophic, Likelihood::Rare),
    )
    .unwrap();

    let motor = s
        .add_failure_mode(
            asset,
            FailureModeDraft {
                functional_failure_id: ff,
                component: "Motor".to_string(),
                description: "Winding insulation breakdown".to_string(),
                category: FailureCause::Overloading,
            },
        )
        .unwrap();
    s.set_effects(asset, &motor, effects(24.0)).unwrap();
    s.set_consequence(asset, &motor, ConsequenceInput::new(false, ConsequenceBranch::Operational))
        .unwrap();
    s.set_management_task(
        asset,
        &motor,
        TaskDraft::new(TaskDetails::Redesign {
            redesign_type: RedesignType::EquipmentModification,
            change_description: "Fit motor protection relay".to_string(),
        })
        .with_costs(CostBreakdown::new(800.0, 2200.0, 0.0), CostBreakdown::new(0.0, 0.0, 0.0)),
    )
    .unwrap();

    s.into_project()
}

// ==========================================================================
// ROUND TRIP TESTS
// ==========================================================================

#[test]
fn test_round_trip_preserves_everything() {
    let project = analysed_project();
    let app = ApplicationInfo {
        name: "RCM Analysis Tool".to_string(),
        version: "1.0".to_string(),
        authority: "Murrumbidgee Irrigation".to_string(),
        department: "Asset Management".to_string(),
    };

    let json = persist::serialize(&project, Some(&app)).unwrap();
    let restored = persist::deserialize(&json).unwrap();
    assert_eq!(restored, project);

    let asset = restored.assets().next().unwrap();
    let seal = asset.failure_mode("FM-FF-1.1-1").unwrap();
    let residual = seal
        .management_task
        .as_ref()
        .and_then(|t| t.post_risk_assessment.as_ref())
        .unwrap();
    assert_eq!(residual.risk_score, 6);
    assert_eq!(residual.risk_level, RiskLevel::Moderate);
    assert_eq!(
        seal.risk_assessment.as_ref().unwrap().risk_level,
        RiskLevel::High
    );
}

#[test]
fn test_serialized_document_carries_results_and_legacy_keys() {
    let json = persist::serialize(&analysed_project(), None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["asset_information"]["asset_name"], "Dosing Pump 3");
    assert_eq!(value["analysis_results"].as_array().unwrap().len(), 2);
    assert!(value["export_date"].is_string());
}

#[test]
fn test_export_then_import_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("p200.json");
    let project = analysed_project();

    persist::export_to_path(&path, &project, None).unwrap();
    let imported = persist::import_from_path(&path).unwrap();
    assert_eq!(imported, project);
}

#[test]
fn test_ids_continue_after_reload() {
    let json = persist::serialize(&analysed_project(), None).unwrap();
    let project = persist::deserialize(&json).unwrap();
    let asset = project.assets().next().unwrap().id;

    let mut s = AnalysisSession::new(project, RiskThresholds::default());
    let id = s
        .add_failure_mode(
            asset,
            FailureModeDraft {
                functional_failure_id: "FF-1.1".to_string(),
                component: "Motor".to_string(),
                description: "Bearing noise".to_string(),
                category: FailureCause::Lubrication,
            },
        )
        .unwrap();
    assert_eq!(id, "FM-FF-1.1-3");
}

#[test]
fn test_malformed_document_is_rejected() {
    assert!(persist::deserialize("{ not json").is_err());
    assert!(persist::deserialize("\"just a string\"").is_err());
}

// ==========================================================================
// AUTOSAVE TESTS
// ==========================================================================

#[test]
fn test_autosave_restores_into_empty_session_only() {
    let dir = TempDir::new().unwrap();
    let autosave = FileAutosave::new(dir.path().join("autosave.json"));

    let empty = Project::new("P-200", "").unwrap();
    assert!(autosave.restore(&empty).unwrap().is_none());

    let mut s = AnalysisSession::new(empty.clone(), RiskThresholds::default())
        .with_autosave(Box::new(autosave.clone()));
    s.add_asset(AssetDraft::new("Pump A", AssetClass::PumpStation)).unwrap();
    assert!(autosave.path().exists());

    let restored = autosave.restore(&empty).unwrap().unwrap();
    assert_eq!(restored.asset_count(), 1);
    assert!(autosave.restore(s.project()).unwrap().is_none());

    autosave.clear().unwrap();
    assert!(!autosave.path().exists());
    autosave.clear().unwrap();
}

#[test]
fn test_autosave_failure_does_not_block_mutation() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes every write fail.
    let blocked = dir.path().join("blocked");
    std::fs::create_dir_all(blocked.join("autosave.json")).unwrap();

    let project = Project::new("P-300", "").unwrap();
    let mut s = AnalysisSession::new(project, RiskThresholds::default())
        .with_autosave(Box::new(FileAutosave::new(blocked.join("autosave.json"))));
    let id = s.add_asset(AssetDraft::new("Pump A", AssetClass::PumpStation)).unwrap();
    assert!(s.asset(id).is_ok());
}
