//! rcmkit - Reliability Centred Maintenance and FMECA decision engine
//!
//! rcmkit walks an asset through an RCM analysis: describe the asset and
//! its operating context, state its functions and the ways they fail,
//! record the failure modes of each component, then decide how every
//! failure mode should be managed.
//!
//! # Overview
//!
//! Each failure mode moves through a fixed workflow:
//!
//! 1. **Effects**: what happens when it fails (evidence, safety and
//!    operational impact, repair time, downtime).
//! 2. **Consequence**: evident or hidden, then safety/environmental,
//!    operational or non-operational. Safety consequences also carry a
//!    risk assessment.
//! 3. **Management task**: one of CBM, FTM, FF, Redesign or OTF, limited
//!    to the task types eligible for the consequence category.
//!
//! Deleting or renaming an entity cascades to everything that depends on
//! it, or is refused while dependents exist.
//!
//! # Quick Start
//!
//! ```no_run
//! use rcmkit::model::{AssetClass, AssetDraft, Project};
//! use rcmkit::{AnalysisSession, RiskThresholds};
//!
//! let project = Project::new("P-100", "Pump stations").unwrap();
//! let mut session = AnalysisSession::new(project, RiskThresholds::default());
//!
//! let asset = session
//!     .add_asset(AssetDraft::new("Pump A", AssetClass::PumpStation))
//!     .unwrap();
//! session.add_component(asset, "Bearing").unwrap();
//!
//! for row in session.analysis_results(asset).unwrap() {
//!     println!("{} {:?} ${:.2}", row.failure_mode_id, row.task_type, row.cost);
//! }
//! ```
//!
//! # Risk Scoring
//!
//! The risk score is consequence plus likelihood, each rated 1-5:
//!
//! | Score | Level (default thresholds) |
//! |-------|----------------------------|
//! | 2-5 | Low |
//! | 6-7 | Moderate |
//! | 8-10 | High |
//!
//! # Modules
//!
//! - [`engine`]: Risk, consequence and task eligibility rules
//! - [`model`]: Projects, assets, functions and failure modes
//! - [`session`]: Validated mutations with cascades and autosave
//! - [`aggregate`]: Counts, costs and implementation plans
//! - [`persist`]: JSON documents and the autosave file
//! - [`report`]: Output formatters (HTML, JSON, CSV)
//! - [`db`]: SQLite catalogue of thresholds, projects and activity

pub mod aggregate;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;
pub mod persist;
pub mod report;
pub mod schema;
pub mod session;

pub use config::AppConfig;
pub use db::{ActivityRecord, Database, ProjectRecord, Role, ThresholdRecord, User};
pub use engine::{
    ConsequenceBranch, ConsequenceCategory, Likelihood, RiskAssessment, RiskLevel, RiskThresholds,
    Severity, TaskDraft, TaskType,
};
pub use error::{ErrorKind, RcmError, Result};
pub use model::{AnalysisResult, Asset, AssetId, Project};
pub use persist::FileAutosave;
pub use session::{AnalysisSession, AutosaveSink, ConsequenceInput};
