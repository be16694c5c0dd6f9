//! Entity graph manager
//!
//! [`AnalysisSession`] owns one [`Project`] and every mutation of it. Each
//! public operation is a complete read-modify-write: all checks run before
//! anything is written, so an `Err` always leaves the graph unchanged.
//!
//! Referential rules enforced here:
//!
//! - an asset cannot be deleted while it owns components;
//! - a component cannot be deleted while failure modes reference it, and a
//!   rename is carried through to those failure modes;
//! - deleting a function or functional failure cascades to its dependents;
//! - failure mode analysis follows effects → consequence → task.
//!
//! After every successful mutation the project's `last_modified` stamp is
//! bumped and the optional autosave sink is invoked. Autosave is best
//! effort: a failing sink is logged and never undoes or fails the mutation.

use crate::engine::{
    classify_consequence, eligible_task_types, ConsequenceBranch, ConsequenceCategory, Likelihood,
    ManagementTask, RiskAssessment, RiskThresholds, Severity, TaskDraft,
};
use crate::error::{RcmError, Result, WorkflowStep};
use crate::model::{
    failure_mode_id, functional_failure_id, AnalysisResult, Asset, AssetDraft, AssetId, Effects,
    FailureCategory, FailureCause, FailureMode, FailureModeDraft, Function, FunctionDraft,
    FunctionalFailure, OperatingContext, Project,
};
use tracing::{debug, info, warn};

/// Receives the project after each successful mutation.
pub trait AutosaveSink {
    fn save(&self, project: &Project) -> Result<()>;
}

/// Answers to the consequence decision tree, plus ratings when the result
/// turns out to be a safety/environmental category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsequenceInput {
    pub is_evident: bool,
    pub branch: ConsequenceBranch,
    pub ratings: Option<(Severity, Likelihood)>,
}

impl ConsequenceInput {
    pub fn new(is_evident: bool, branch: ConsequenceBranch) -> Self {
        Self {
            is_evident,
            branch,
            ratings: None,
        }
    }

    pub fn with_ratings(mut self, consequence: Severity, likelihood: Likelihood) -> Self {
        self.ratings = Some((consequence, likelihood));
        self
    }
}

/// What a cascading delete removed (or would remove).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub functional_failures: usize,
    pub failure_modes: usize,
}

pub struct AnalysisSession {
    project: Project,
    thresholds: RiskThresholds,
    autosave: Option<Box<dyn AutosaveSink>>,
}

impl AnalysisSession {
    /// Open a session. Stored assessments are reconciled with `thresholds`
    /// so levels saved under older thresholds never leak through.
    pub fn new(mut project: Project, thresholds: RiskThresholds) -> Self {
        let changed = project.reclassify_risks(&thresholds);
        if changed > 0 {
            debug!(
                project = %project.project_no(),
                changed, "reclassified stored risk levels on open"
            );
        }
        Self {
            project,
            thresholds,
            autosave: None,
        }
    }

    pub fn with_autosave(mut self, sink: Box<dyn AutosaveSink>) -> Self {
        self.autosave = Some(sink);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    pub fn asset(&self, id: AssetId) -> Result<&Asset> {
        self.project
            .asset(id)
            .ok_or_else(|| RcmError::not_found("Asset", id))
    }

    fn asset_mut(&mut self, id: AssetId) -> Result<&mut Asset> {
        self.project
            .asset_mut(id)
            .ok_or_else(|| RcmError::not_found("Asset", id))
    }

    fn commit(&mut self, action: &str) {
        self.project.touch();
        info!(project = %self.project.project_no(), "{}", action);
        if let Some(sink) = &self.autosave {
            if let Err(e) = sink.save(&self.project) {
                warn!(error = %e, "autosave failed, continuing");
            }
        }
    }

    // ========================================================================
    // Thresholds
    // ========================================================================

    /// Replace the live thresholds and reclassify every stored assessment.
    /// Returns the number of assessments whose level changed.
    pub fn set_thresholds(&mut self, thresholds: RiskThresholds) -> Result<usize> {
        thresholds.validate()?;
        self.thresholds = thresholds;

        let changed = self.project.reclassify_risks(&thresholds);
        self.commit(&format!(
            "risk thresholds set to moderate>={} high>={} ({} reclassified)",
            thresholds.moderate_min, thresholds.high_min, changed
        ));
        Ok(changed)
    }

    // ========================================================================
    // Assets
    // ========================================================================

    pub fn add_asset(&mut self, draft: AssetDraft) -> Result<AssetId> {
        validate_asset_draft(&draft)?;
        let id = self.project.allocate_asset_id();
        let name = draft.name.trim().to_string();
        self.project.insert_asset(Asset::from_draft(id, draft));
        self.commit(&format!("added asset {} '{}'", id, name));
        Ok(id)
    }

    pub fn update_asset(&mut self, id: AssetId, draft: AssetDraft) -> Result<()> {
        validate_asset_draft(&draft)?;
        let asset = self.asset_mut(id)?;
        asset.name = draft.name.trim().to_string();
        asset.class = draft.class;
        asset.asset_type = draft.asset_type;
        asset.site_location = draft.site_location;
        self.commit(&format!("updated asset {}", id));
        Ok(())
    }

    /// Blocked while the asset still owns components.
    pub fn delete_asset(&mut self, id: AssetId) -> Result<Asset> {
        let asset = self.asset(id)?;
        if !asset.components.is_empty() {
            return Err(RcmError::HasComponents {
                asset: asset.name.clone(),
                components: asset.components.clone(),
            });
        }
        let removed = self
            .project
            .remove_asset(id)
            .ok_or_else(|| RcmError::not_found("Asset", id))?;
        self.commit(&format!("deleted asset {} '{}'", id, removed.name));
        Ok(removed)
    }

    pub fn set_operating_context(&mut self, id: AssetId, context: OperatingContext) -> Result<()> {
        self.asset_mut(id)?.operating_context = context;
        self.commit(&format!("saved operating context for {}", id));
        Ok(())
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Returns false (and changes nothing) if the component already exists.
    pub fn add_component(&mut self, id: AssetId, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RcmError::validation("component name is required"));
        }
        let asset = self.asset_mut(id)?;
        if asset.has_component(name) {
            debug!(asset = %id, component = name, "component already present");
            return Ok(false);
        }
        asset.components.push(name.to_string());
        self.commit(&format!("added component '{}' to {}", name, id));
        Ok(true)
    }

    /// Rename a component and every failure mode reference to it. Returns
    /// the number of failure modes updated.
    pub fn rename_component(&mut self, id: AssetId, old: &str, new: &str) -> Result<usize> {
        let new = new.trim();
        if new.is_empty() {
            return Err(RcmError::validation("component name is required"));
        }
        let asset = self.asset_mut(id)?;
        let position = asset
            .components
            .iter()
            .position(|c| c == old)
            .ok_or_else(|| RcmError::not_found("Component", old))?;
        if old == new {
            return Ok(0);
        }
        if asset.has_component(new) {
            return Err(RcmError::validation(format!(
                "component '{}' already exists on {}",
                new, asset.name
            )));
        }

        asset.components[position] = new.to_string();
        let mut updated = 0;
        for mode in asset.failure_modes.iter_mut().filter(|m| m.component == old) {
            mode.component = new.to_string();
            updated += 1;
        }
        debug!(asset = %id, old, new, updated, "component rename cascaded");
        self.commit(&format!("renamed component '{}' to '{}' on {}", old, new, id));
        Ok(updated)
    }

    /// Blocked while failure modes reference the component.
    pub fn delete_component(&mut self, id: AssetId, name: &str) -> Result<()> {
        let asset = self.asset_mut(id)?;
        let position = asset
            .components
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| RcmError::not_found("Component", name))?;
        let dependents: Vec<String> = asset
            .failure_modes_for_component(name)
            .map(|m| m.id.clone())
            .collect();
        if !dependents.is_empty() {
            return Err(RcmError::ReferentialIntegrity {
                entity: format!("Component '{}'", name),
                dependents,
            });
        }
        asset.components.remove(position);
        self.commit(&format!("deleted component '{}' from {}", name, id));
        Ok(())
    }

    // ========================================================================
    // Functions
    // ========================================================================

    pub fn add_function(&mut self, id: AssetId, draft: FunctionDraft) -> Result<u32> {
        validate_function_draft(&draft)?;
        let asset = self.asset_mut(id)?;
        let function_id = asset.next_function_id.max(1);
        asset.next_function_id = function_id + 1;
        let function = Function::from_draft(function_id, draft);
        debug!(asset = %id, function_id, statement = %function.full_statement, "assigned function id");
        asset.functions.push(function);
        self.commit(&format!("added function {} to {}", function_id, id));
        Ok(function_id)
    }

    pub fn update_function(&mut self, id: AssetId, function_id: u32, draft: FunctionDraft) -> Result<()> {
        validate_function_draft(&draft)?;
        let asset = self.asset_mut(id)?;
        let function = asset
            .functions
            .iter_mut()
            .find(|f| f.id == function_id)
            .ok_or_else(|| RcmError::not_found("Function", function_id))?;
        let next_failure_seq = function.next_failure_seq;
        *function = Function::from_draft(function_id, draft);
        function.next_failure_seq = next_failure_seq;
        let statement = function.full_statement.clone();
        for ff in asset
            .functional_failures
            .iter_mut()
            .filter(|ff| ff.function_id == function_id)
        {
            ff.function_statement = statement.clone();
        }
        self.commit(&format!("updated function {} on {}", function_id, id));
        Ok(())
    }

    /// What deleting a function would remove.
    pub fn function_dependents(&self, id: AssetId, function_id: u32) -> Result<CascadeSummary> {
        let asset = self.asset(id)?;
        asset
            .function(function_id)
            .ok_or_else(|| RcmError::not_found("Function", function_id))?;
        let ff_ids: Vec<&str> = asset
            .functional_failures_for(function_id)
            .map(|ff| ff.id.as_str())
            .collect();
        let failure_modes = asset
            .failure_modes
            .iter()
            .filter(|m| ff_ids.contains(&m.functional_failure_id.as_str()))
            .count();
        Ok(CascadeSummary {
            functional_failures: ff_ids.len(),
            failure_modes,
        })
    }

    /// Deletes the function with its functional failures and their failure modes.
    pub fn delete_function(&mut self, id: AssetId, function_id: u32) -> Result<CascadeSummary> {
        let summary = self.function_dependents(id, function_id)?;
        let asset = self.asset_mut(id)?;
        let ff_ids: Vec<String> = asset
            .functional_failures_for(function_id)
            .map(|ff| ff.id.clone())
            .collect();
        asset
            .failure_modes
            .retain(|m| !ff_ids.contains(&m.functional_failure_id));
        asset.functional_failures.retain(|ff| ff.function_id != function_id);
        asset.functions.retain(|f| f.id != function_id);
        debug!(asset = %id, function_id, ?summary, "function delete cascaded");
        self.commit(&format!("deleted function {} from {}", function_id, id));
        Ok(summary)
    }

    // ========================================================================
    // Functional failures
    // ========================================================================

    pub fn add_functional_failure(
        &mut self,
        id: AssetId,
        function_id: u32,
        description: &str,
        category: FailureCategory,
    ) -> Result<String> {
        let description = require_text("functional failure description", description)?;
        let asset = self.asset_mut(id)?;
        let function = asset
            .functions
            .iter_mut()
            .find(|f| f.id == function_id)
            .ok_or_else(|| RcmError::not_found("Function", function_id))?;
        let seq = function.next_failure_seq.max(1);
        function.next_failure_seq = seq + 1;
        let ff = FunctionalFailure {
            id: functional_failure_id(function_id, seq),
            function_id,
            function_statement: function.full_statement.clone(),
            description,
            category,
            next_mode_seq: 1,
        };
        let ff_id = ff.id.clone();
        asset.functional_failures.push(ff);
        self.commit(&format!("added functional failure {} to {}", ff_id, id));
        Ok(ff_id)
    }

    pub fn update_functional_failure(
        &mut self,
        id: AssetId,
        ff_id: &str,
        description: &str,
        category: FailureCategory,
    ) -> Result<()> {
        let description = require_text("functional failure description", description)?;
        let asset = self.asset_mut(id)?;
        let ff = asset
            .functional_failures
            .iter_mut()
            .find(|f| f.id == ff_id)
            .ok_or_else(|| RcmError::not_found("Functional failure", ff_id))?;
        ff.description = description;
        ff.category = category;
        self.commit(&format!("updated functional failure {} on {}", ff_id, id));
        Ok(())
    }

    /// Number of failure modes a delete would remove, for confirmation.
    pub fn functional_failure_dependents(&self, id: AssetId, ff_id: &str) -> Result<usize> {
        let asset = self.asset(id)?;
        asset
            .functional_failure(ff_id)
            .ok_or_else(|| RcmError::not_found("Functional failure", ff_id))?;
        Ok(asset.failure_modes_for(ff_id).count())
    }

    /// Deletes the functional failure and all of its failure modes. Returns
    /// the number of failure modes removed.
    pub fn delete_functional_failure(&mut self, id: AssetId, ff_id: &str) -> Result<usize> {
        let removed = self.functional_failure_dependents(id, ff_id)?;
        let asset = self.asset_mut(id)?;
        asset.failure_modes.retain(|m| m.functional_failure_id != ff_id);
        asset.functional_failures.retain(|f| f.id != ff_id);
        debug!(asset = %id, ff_id, removed, "functional failure delete cascaded");
        self.commit(&format!(
            "deleted functional failure {} and {} failure mode(s) from {}",
            ff_id, removed, id
        ));
        Ok(removed)
    }

    // ========================================================================
    // Failure modes
    // ========================================================================

    pub fn add_failure_mode(&mut self, id: AssetId, draft: FailureModeDraft) -> Result<String> {
        let description = require_text("failure mode description", &draft.description)?;
        let component = draft.component.trim().to_string();
        if component.is_empty() {
            return Err(RcmError::validation("a component must be selected"));
        }
        let asset = self.asset_mut(id)?;
        check_component(asset, &component)?;
        let ff = asset
            .functional_failures
            .iter_mut()
            .find(|f| f.id == draft.functional_failure_id)
            .ok_or_else(|| RcmError::not_found("Functional failure", &draft.functional_failure_id))?;
        let seq = ff.next_mode_seq.max(1);
        ff.next_mode_seq = seq + 1;
        let mode = FailureMode {
            id: failure_mode_id(&ff.id, seq),
            functional_failure_id: ff.id.clone(),
            component,
            description,
            category: draft.category,
            effects: None,
            consequence_category: None,
            risk_assessment: None,
            management_task: None,
        };
        let mode_id = mode.id.clone();
        asset.failure_modes.push(mode);
        self.commit(&format!("added failure mode {} to {}", mode_id, id));
        Ok(mode_id)
    }

    pub fn update_failure_mode(
        &mut self,
        id: AssetId,
        mode_id: &str,
        component: &str,
        description: &str,
        category: FailureCause,
    ) -> Result<()> {
        let description = require_text("failure mode description", description)?;
        let component = component.trim();
        let asset = self.asset_mut(id)?;
        check_component(asset, component)?;
        let mode = find_mode(asset, mode_id)?;
        mode.component = component.to_string();
        mode.description = description;
        mode.category = category;
        self.commit(&format!("updated failure mode {} on {}", mode_id, id));
        Ok(())
    }

    pub fn delete_failure_mode(&mut self, id: AssetId, mode_id: &str) -> Result<FailureMode> {
        let asset = self.asset_mut(id)?;
        let position = asset
            .failure_modes
            .iter()
            .position(|m| m.id == mode_id)
            .ok_or_else(|| RcmError::not_found("Failure mode", mode_id))?;
        let removed = asset.failure_modes.remove(position);
        self.commit(&format!("deleted failure mode {} from {}", mode_id, id));
        Ok(removed)
    }

    // ========================================================================
    // Effects
    // ========================================================================

    pub fn set_effects(&mut self, id: AssetId, mode_id: &str, effects: Effects) -> Result<()> {
        effects.validate()?;
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.effects.is_some() {
            return Err(already_recorded(mode_id, WorkflowStep::Effects));
        }
        mode.effects = Some(effects);
        self.commit(&format!("recorded effects for {}", mode_id));
        Ok(())
    }

    pub fn update_effects(&mut self, id: AssetId, mode_id: &str, effects: Effects) -> Result<()> {
        effects.validate()?;
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.effects.is_none() {
            return Err(missing(mode_id, WorkflowStep::Effects));
        }
        mode.effects = Some(effects);
        self.commit(&format!("updated effects for {}", mode_id));
        Ok(())
    }

    /// Removes the effects and everything recorded after them.
    pub fn delete_effects(&mut self, id: AssetId, mode_id: &str) -> Result<()> {
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.effects.take().is_none() {
            return Err(missing(mode_id, WorkflowStep::Effects));
        }
        mode.consequence_category = None;
        mode.risk_assessment = None;
        mode.management_task = None;
        self.commit(&format!("deleted effects for {}", mode_id));
        Ok(())
    }

    // ========================================================================
    // Consequence
    // ========================================================================

    pub fn set_consequence(
        &mut self,
        id: AssetId,
        mode_id: &str,
        input: ConsequenceInput,
    ) -> Result<ConsequenceCategory> {
        let thresholds = self.thresholds;
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.effects.is_none() {
            return Err(missing(mode_id, WorkflowStep::Effects));
        }
        if mode.consequence_category.is_some() {
            return Err(already_recorded(mode_id, WorkflowStep::Consequence));
        }
        let (category, risk) = evaluate_consequence(mode_id, input, &thresholds)?;
        mode.consequence_category = Some(category);
        mode.risk_assessment = risk;
        self.commit(&format!("classified {} as {}", mode_id, category));
        Ok(category)
    }

    /// Reclassify. Rejected if a recorded task would become ineligible.
    pub fn update_consequence(
        &mut self,
        id: AssetId,
        mode_id: &str,
        input: ConsequenceInput,
    ) -> Result<ConsequenceCategory> {
        let thresholds = self.thresholds;
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.consequence_category.is_none() {
            return Err(missing(mode_id, WorkflowStep::Consequence));
        }
        let (category, risk) = evaluate_consequence(mode_id, input, &thresholds)?;
        if let Some(task) = &mode.management_task {
            if !eligible_task_types(category).contains(&task.task_type) {
                return Err(RcmError::validation(format!(
                    "{}: recorded {} task is not eligible for {}; delete the task first",
                    mode_id,
                    task.task_type.code(),
                    category
                )));
            }
            if task.post_risk_assessment.is_some() && !category.is_safety() {
                return Err(RcmError::validation(format!(
                    "{}: recorded task carries a residual risk assessment, which requires a safety/environmental category",
                    mode_id
                )));
            }
        }
        mode.consequence_category = Some(category);
        mode.risk_assessment = risk;
        self.commit(&format!("reclassified {} as {}", mode_id, category));
        Ok(category)
    }

    /// Removes the consequence, its risk assessment, and any task.
    pub fn delete_consequence(&mut self, id: AssetId, mode_id: &str) -> Result<()> {
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.consequence_category.take().is_none() {
            return Err(missing(mode_id, WorkflowStep::Consequence));
        }
        mode.risk_assessment = None;
        mode.management_task = None;
        self.commit(&format!("deleted consequence for {}", mode_id));
        Ok(())
    }

    // ========================================================================
    // Management task
    // ========================================================================

    pub fn set_management_task(
        &mut self,
        id: AssetId,
        mode_id: &str,
        draft: TaskDraft,
    ) -> Result<AnalysisResult> {
        let thresholds = self.thresholds;
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        let category = mode
            .consequence_category
            .ok_or_else(|| missing(mode_id, WorkflowStep::Consequence))?;
        if mode.management_task.is_some() {
            return Err(already_recorded(mode_id, WorkflowStep::ManagementTask));
        }
        let task = ManagementTask::build(draft, category, &thresholds)?;
        let task_type = task.task_type;
        mode.management_task = Some(task);
        let result = analysis_row(mode)?;
        self.commit(&format!("saved {} task for {}", task_type.code(), mode_id));
        Ok(result)
    }

    pub fn update_management_task(
        &mut self,
        id: AssetId,
        mode_id: &str,
        draft: TaskDraft,
    ) -> Result<AnalysisResult> {
        let thresholds = self.thresholds;
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        let category = mode
            .consequence_category
            .ok_or_else(|| missing(mode_id, WorkflowStep::Consequence))?;
        if mode.management_task.is_none() {
            return Err(missing(mode_id, WorkflowStep::ManagementTask));
        }
        let task = ManagementTask::build(draft, category, &thresholds)?;
        mode.management_task = Some(task);
        let result = analysis_row(mode)?;
        self.commit(&format!("updated task for {}", mode_id));
        Ok(result)
    }

    pub fn delete_management_task(&mut self, id: AssetId, mode_id: &str) -> Result<()> {
        let mode = find_mode(self.asset_mut(id)?, mode_id)?;
        if mode.management_task.take().is_none() {
            return Err(missing(mode_id, WorkflowStep::ManagementTask));
        }
        self.commit(&format!("deleted task for {}", mode_id));
        Ok(())
    }

    pub fn analysis_results(&self, id: AssetId) -> Result<Vec<AnalysisResult>> {
        Ok(self.asset(id)?.analysis_results())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RcmError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn validate_asset_draft(draft: &AssetDraft) -> Result<()> {
    require_text("asset name", &draft.name).map(|_| ())
}

fn validate_function_draft(draft: &FunctionDraft) -> Result<()> {
    require_text("function verb", &draft.verb)?;
    require_text("function object", &draft.object)?;
    Ok(())
}

fn check_component(asset: &Asset, component: &str) -> Result<()> {
    if component.is_empty() {
        return Err(RcmError::validation("a component must be selected"));
    }
    if !asset.has_component(component) {
        return Err(RcmError::ReferentialIntegrity {
            entity: format!("Failure mode component '{}'", component),
            dependents: vec![format!("not a component of asset '{}'", asset.name)],
        });
    }
    Ok(())
}

fn find_mode<'a>(asset: &'a mut Asset, mode_id: &str) -> Result<&'a mut FailureMode> {
    asset
        .failure_mode_mut(mode_id)
        .ok_or_else(|| RcmError::not_found("Failure mode", mode_id))
}

fn missing(mode_id: &str, step: WorkflowStep) -> RcmError {
    RcmError::PrecursorMissing {
        failure_mode: mode_id.to_string(),
        missing: step,
    }
}

fn already_recorded(mode_id: &str, step: WorkflowStep) -> RcmError {
    RcmError::validation(format!("{}: {} already recorded, use update", mode_id, step))
}

fn evaluate_consequence(
    mode_id: &str,
    input: ConsequenceInput,
    thresholds: &RiskThresholds,
) -> Result<(ConsequenceCategory, Option<RiskAssessment>)> {
    let category = classify_consequence(input.is_evident, input.branch);
    let risk = if category.is_safety() {
        let (consequence, likelihood) = input.ratings.ok_or_else(|| {
            RcmError::validation(format!(
                "{}: {} consequences require consequence and likelihood ratings",
                mode_id, category
            ))
        })?;
        Some(RiskAssessment::assess(consequence, likelihood, thresholds))
    } else {
        if input.ratings.is_some() {
            debug!(mode_id, %category, "ignoring risk ratings for non-safety consequence");
        }
        None
    };
    Ok((category, risk))
}

fn analysis_row(mode: &FailureMode) -> Result<AnalysisResult> {
    AnalysisResult::from_failure_mode(mode)
        .ok_or_else(|| missing(&mode.id, WorkflowStep::ManagementTask))
}
