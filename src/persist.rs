//! JSON analysis document
//!
//! The document is the only interchange format. Shape:
//!
//! ```text
//! {
//!   "application_info":    { name, version, authority, department },
//!   "project_information": { project_no, description, created_date, ... },
//!   "assets":              [ Asset, ... ],
//!   "asset_information":   { asset_name, asset_class, asset_type, site_location },
//!   "operating_context":   { ... },
//!   "components":          [ ... ],
//!   "functions":           [ ... ],
//!   "functional_failures": [ ... ],
//!   "failure_modes":       [ ... ],
//!   "analysis_results":    [ ... ],
//!   "export_date":         "2024-..."
//! }
//! ```
//!
//! `assets` is authoritative. The single-asset keys (`asset_information`
//! through `failure_modes`) mirror the first asset so older single-asset
//! readers still work, and a document that only has them imports as a
//! one-asset project. `analysis_results` is written for consumers but
//! recomputed on import. Unknown keys are ignored.

use crate::error::{RcmError, Result};
use crate::model::{
    AnalysisResult, Asset, AssetClass, AssetId, FailureMode, Function, FunctionalFailure,
    OperatingContext, Project, ProjectInfo,
};
use crate::session::AutosaveSink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Project number given to imported documents that carry none.
pub const LEGACY_PROJECT_NO: &str = "IMPORTED";

/// Identifies the application and organisation that wrote a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub authority: String,
    #[serde(default)]
    pub department: String,
}

/// Single-asset descriptor used by the flat document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LegacyAssetInfo {
    #[serde(default)]
    asset_name: String,
    #[serde(default = "default_class")]
    asset_class: AssetClass,
    #[serde(default)]
    asset_type: String,
    #[serde(default)]
    site_location: String,
}

fn default_class() -> AssetClass {
    AssetClass::Other
}

impl From<&Asset> for LegacyAssetInfo {
    fn from(asset: &Asset) -> Self {
        Self {
            asset_name: asset.name.clone(),
            asset_class: asset.class,
            asset_type: asset.asset_type.clone(),
            site_location: asset.site_location.clone(),
        }
    }
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    application_info: Option<&'a ApplicationInfo>,
    project_information: &'a ProjectInfo,
    assets: Vec<&'a Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_information: Option<LegacyAssetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operating_context: Option<&'a OperatingContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<&'a [Function]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functional_failures: Option<&'a [FunctionalFailure]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_modes: Option<&'a [FailureMode]>,
    analysis_results: Vec<AnalysisResult>,
    export_date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct DocumentIn {
    #[serde(default)]
    project_information: Option<ProjectInfo>,
    #[serde(default)]
    assets: Option<Vec<Asset>>,
    #[serde(default)]
    asset_information: Option<LegacyAssetInfo>,
    #[serde(default)]
    operating_context: OperatingContext,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    functions: Vec<Function>,
    #[serde(default)]
    functional_failures: Vec<FunctionalFailure>,
    #[serde(default)]
    failure_modes: Vec<FailureMode>,
    #[serde(default)]
    export_date: Option<DateTime<Utc>>,
}

/// Serialize a project to the document layout (pretty-printed).
pub fn serialize(project: &Project, app: Option<&ApplicationInfo>) -> Result<String> {
    let first = project.assets().next();
    let analysis_results: Vec<AnalysisResult> =
        project.assets().flat_map(Asset::analysis_results).collect();

    let doc = DocumentOut {
        application_info: app,
        project_information: &project.info,
        assets: project.assets().collect(),
        asset_information: first.map(LegacyAssetInfo::from),
        operating_context: first.map(|a| &a.operating_context),
        components: first.map(|a| a.components.as_slice()),
        functions: first.map(|a| a.functions.as_slice()),
        functional_failures: first.map(|a| a.functional_failures.as_slice()),
        failure_modes: first.map(|a| a.failure_modes.as_slice()),
        analysis_results,
        export_date: Utc::now(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a document. Malformed JSON is a `Serialization` error and
/// produces no project.
pub fn deserialize(json: &str) -> Result<Project> {
    let doc: DocumentIn = serde_json::from_str(json)?;

    let info = match doc.project_information {
        Some(info) => info,
        None => {
            let stamp = doc.export_date.unwrap_or_else(Utc::now);
            ProjectInfo {
                project_no: LEGACY_PROJECT_NO.to_string(),
                description: String::new(),
                created_date: stamp,
                last_modified: stamp,
                next_asset_id: 1,
            }
        }
    };

    let assets = match doc.assets {
        Some(assets) => assets,
        None => match doc.asset_information {
            Some(legacy) if !legacy.asset_name.trim().is_empty() => {
                debug!(asset = %legacy.asset_name, "importing single-asset document");
                vec![Asset {
                    id: AssetId(1),
                    name: legacy.asset_name.trim().to_string(),
                    class: legacy.asset_class,
                    asset_type: legacy.asset_type,
                    site_location: legacy.site_location,
                    components: doc.components,
                    operating_context: doc.operating_context,
                    functions: doc.functions,
                    functional_failures: doc.functional_failures,
                    failure_modes: doc.failure_modes,
                    next_function_id: 0,
                }]
            }
            _ => Vec::new(),
        },
    };

    Project::from_parts(info, assets)
}

pub fn export_to_path(path: &Path, project: &Project, app: Option<&ApplicationInfo>) -> Result<()> {
    let json = serialize(project, app)?;
    write_atomic(path, &json)?;
    info!(path = %path.display(), assets = project.asset_count(), "exported analysis document");
    Ok(())
}

pub fn import_from_path(path: &Path) -> Result<Project> {
    let json = fs::read_to_string(path)?;
    let project = deserialize(&json)?;
    info!(path = %path.display(), assets = project.asset_count(), "imported analysis document");
    Ok(project)
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

// ============================================================================
// Autosave
// ============================================================================

/// Autosave into a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileAutosave {
    path: PathBuf,
    app: Option<ApplicationInfo>,
}

impl FileAutosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            app: None,
        }
    }

    pub fn with_application_info(mut self, app: ApplicationInfo) -> Self {
        self.app = Some(app);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the autosaved project, but only when `current` holds no assets.
    /// Returns `None` if there is nothing to restore.
    pub fn restore(&self, current: &Project) -> Result<Option<Project>> {
        if current.asset_count() > 0 {
            debug!("session already holds assets, not restoring autosave");
            return Ok(None);
        }
        if !self.path.exists() {
            return Ok(None);
        }
        let project = import_from_path(&self.path)?;
        Ok(Some(project))
    }

    /// Remove the autosave file. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared autosave");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RcmError::Persistence(e)),
        }
    }
}

impl AutosaveSink for FileAutosave {
    /// Skips projects with no assets; there is nothing worth keeping yet.
    fn save(&self, project: &Project) -> Result<()> {
        if project.asset_count() == 0 {
            return Ok(());
        }
        let json = serialize(project, self.app.as_ref())?;
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), "autosaved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RiskLevel;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    const LEGACY_DOC: &str = r#"{
        "application_info": {"name": "RCM Tool", "version": "1.0"},
        "asset_information": {
            "asset_name": "Pump A",
            "asset_class": "Pump Station",
            "asset_type": "Centrifugal",
            "site_location": "PS1"
        },
        "operating_context": {"redundancy": "Duty/Standby"},
        "components": ["Bearing", "Seal"],
        "functions": [
            {"id": 1, "type": "Primary Function", "verb": "To pump", "object": "water",
             "performance_standard": "at 250 L/s", "full_statement": "To pump water at 250 L/s"}
        ],
        "functional_failures": [
            {"id": "FF-1.1", "function_id": 1, "function_statement": "To pump water at 250 L/s",
             "description": "Pumps at <250 L/s", "category": "Partial loss of function"}
        ],
        "failure_modes": [
            {"id": "FM-FF-1.1-1", "functional_failure_id": "FF-1.1", "component": "Bearing",
             "description": "Seized", "category": "Lubrication failure",
             "consequence_category": "Evident (Safety/Environmental)",
             "risk_assessment": {"consequence": "4-High", "likelihood": "3-Occasional",
                                 "risk_score": 7, "risk_level": "Medium"}}
        ],
        "analysis_results": [{"failure_mode_id": "stale", "frequency": "x"}],
        "current_stage": 2,
        "autosave_date": "2024-05-01T10:00:00"
    }"#;

    // ==========================================================================
    // IMPORT TESTS
    // ==========================================================================

    #[test]
    fn test_legacy_single_asset_import() {
        let project = deserialize(LEGACY_DOC).unwrap();
        assert_eq!(project.project_no(), LEGACY_PROJECT_NO);
        assert_eq!(project.asset_count(), 1);

        let asset = project.assets().next().unwrap();
        assert_eq!(asset.name, "Pump A");
        assert_eq!(asset.class, AssetClass::PumpStation);
        assert_eq!(asset.components, vec!["Bearing", "Seal"]);
        assert_eq!(asset.operating_context.get("redundancy"), Some("Duty/Standby"));

        let mode = asset.failure_mode("FM-FF-1.1-1").unwrap();
        let risk = mode.risk_assessment.as_ref().unwrap();
        assert_eq!(risk.risk_level, RiskLevel::Moderate);
        assert!(mode.management_task.is_none());
    }

    #[test]
    fn test_legacy_import_rebuilds_counters() {
        let project = deserialize(LEGACY_DOC).unwrap();
        let asset = project.assets().next().unwrap();
        assert_eq!(asset.next_function_id, 2);
        assert_eq!(asset.function(1).unwrap().next_failure_seq, 2);
        assert_eq!(asset.functional_failure("FF-1.1").unwrap().next_mode_seq, 2);
    }

    #[test]
    fn test_stale_analysis_results_ignored() {
        let project = deserialize(LEGACY_DOC).unwrap();
        let asset = project.assets().next().unwrap();
        assert!(asset.analysis_results().is_empty());
    }

    #[test]
    fn test_import_recomputes_tampered_score() {
        let doc = LEGACY_DOC.replace("\"risk_score\": 7", "\"risk_score\": 2");
        let project = deserialize(&doc).unwrap();
        let mode = project.assets().next().unwrap().failure_mode("FM-FF-1.1-1").unwrap();
        assert_eq!(mode.risk_assessment.as_ref().unwrap().risk_score, 7);
    }

    #[test]
    fn test_project_information_without_dates_imports() {
        let doc = r#"{
            "project_information": {"project_no": "P-7", "description": "Reservoirs"},
            "assets": []
        }"#;
        let project = deserialize(doc).unwrap();
        assert_eq!(project.project_no(), "P-7");
        assert_eq!(project.info.description, "Reservoirs");
        assert!(project.info.created_date <= Utc::now());
    }

    #[test]
    fn test_unknown_picker_label_rejected() {
        let doc = LEGACY_DOC.replace("Partial loss of function", "Intermittent loss");
        let err = deserialize(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = deserialize("{ not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_empty_document_gives_empty_project() {
        let project = deserialize("{}").unwrap();
        assert_eq!(project.asset_count(), 0);
    }

    // ==========================================================================
    // EXPORT TESTS
    // ==========================================================================

    #[test]
    fn test_export_mirrors_first_asset() {
        let project = deserialize(LEGACY_DOC).unwrap();
        let app = ApplicationInfo {
            name: "rcmkit".to_string(),
            version: "0.1.0".to_string(),
            authority: "Water Authority".to_string(),
            department: "Asset Management".to_string(),
        };
        let json = serialize(&project, Some(&app)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["application_info"]["authority"], "Water Authority");
        assert_eq!(value["asset_information"]["asset_name"], "Pump A");
        assert_eq!(value["assets"].as_array().unwrap().len(), 1);
        assert_eq!(value["components"][1], "Seal");
        assert!(value["export_date"].is_string());
        assert!(value["analysis_results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_export_empty_project_has_no_legacy_block() {
        let project = Project::new("P-1", "").unwrap();
        let json = serialize(&project, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("asset_information").is_none());
        assert!(value.get("application_info").is_none());
    }

    // ==========================================================================
    // AUTOSAVE TESTS
    // ==========================================================================

    #[test]
    fn test_autosave_skips_empty_project() {
        let dir = TempDir::new().unwrap();
        let sink = FileAutosave::new(dir.path().join("autosave.json"));
        sink.save(&Project::new("P-1", "").unwrap()).unwrap();
        assert!(!sink.path().exists());
    }

    #[test]
    fn test_autosave_restore_and_clear() {
        let dir = TempDir::new().unwrap();
        let sink = FileAutosave::new(dir.path().join("nested").join("autosave.json"));
        let project = deserialize(LEGACY_DOC).unwrap();
        sink.save(&project).unwrap();
        assert!(sink.path().exists());

        let empty = Project::new("P-2", "").unwrap();
        let restored = sink.restore(&empty).unwrap().unwrap();
        assert_eq!(restored, project);

        assert!(sink.restore(&project).unwrap().is_none());

        sink.clear().unwrap();
        assert!(!sink.path().exists());
        sink.clear().unwrap();
        assert!(sink.restore(&empty).unwrap().is_none());
    }
}
