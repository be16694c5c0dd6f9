use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rcmkit::aggregate::{project_rollup, ImplementationPlan};
use rcmkit::model::{AssetClass, AssetDraft, Effects, FailureCategory, FailureCause, FailureModeDraft, FunctionDraft, FunctionType};
use rcmkit::{
    persist, report, AnalysisSession, AppConfig, AssetId, ConsequenceBranch, ConsequenceInput,
    Database, FileAutosave, Likelihood, Project, RiskThresholds, Severity, TaskDraft, User,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rcmkit")]
#[command(author, version, about = "Reliability Centred Maintenance and FMECA analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file
    #[arg(short, long, default_value = rcmkit::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Working document (overrides [session] document)
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// User recorded in the activity log; checked against [admin] users
    #[arg(short, long, env = "RCMKIT_USER", default_value = "analyst")]
    user: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new project document
    Init {
        project_no: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Asset register
    Asset {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Components of an asset
    Component {
        #[command(subcommand)]
        action: ComponentAction,
    },

    /// Operating context notes
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Functions of an asset
    Function {
        #[command(subcommand)]
        action: FunctionAction,
    },

    /// Functional failures
    Failure {
        #[command(subcommand)]
        action: FailureAction,
    },

    /// Failure modes
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },

    /// Effects of a failure mode
    Effects {
        #[command(subcommand)]
        action: EffectsAction,
    },

    /// Consequence classification and risk
    Consequence {
        #[command(subcommand)]
        action: ConsequenceAction,
    },

    /// Failure management task
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Risk thresholds
    Thresholds {
        #[command(subcommand)]
        action: ThresholdAction,
    },

    /// Analysis results for an asset
    Results { asset: AssetId },

    /// Project rollup of counts and costs
    Summary,

    /// Implementation plan for an asset
    Plan { asset: AssetId },

    /// Write a report (.html, .json, .csv)
    Report {
        /// Output path (default: timestamped HTML in [session] report_dir)
        output: Option<PathBuf>,

        /// Open the report when done
        #[arg(long = "open")]
        open_report: bool,
    },

    /// Export the working document to another file
    Export { output: PathBuf },

    /// Replace the working document with an imported one
    Import {
        input: PathBuf,

        /// Replace a document that already holds assets
        #[arg(long)]
        force: bool,
    },

    /// Restore the autosave into an empty working document
    Restore,

    /// Delete the autosave file
    ClearAutosave,

    /// Registered projects
    Projects,

    /// Recent activity
    Log {
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Show all projects, not only the current one
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AssetAction {
    Add(AssetArgs),
    Update {
        id: AssetId,
        #[command(flatten)]
        fields: AssetArgs,
    },
    Delete { id: AssetId },
    List,
}

#[derive(Args, Debug)]
struct AssetArgs {
    name: String,

    /// Asset class, e.g. "Pump Station"
    #[arg(short, long, default_value = "Other")]
    class: AssetClass,

    #[arg(short = 't', long, default_value = "")]
    asset_type: String,

    #[arg(short, long, default_value = "")]
    site: String,
}

impl AssetArgs {
    fn draft(&self) -> AssetDraft {
        AssetDraft {
            name: self.name.clone(),
            class: self.class,
            asset_type: self.asset_type.clone(),
            site_location: self.site.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ComponentAction {
    Add { asset: AssetId, name: String },
    Rename { asset: AssetId, old: String, new: String },
    Delete { asset: AssetId, name: String },
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    Set { asset: AssetId, key: String, value: String },
    Show { asset: AssetId },
}

#[derive(Subcommand, Debug)]
enum FunctionAction {
    Add {
        asset: AssetId,
        #[command(flatten)]
        fields: FunctionArgs,
    },
    Update {
        asset: AssetId,
        id: u32,
        #[command(flatten)]
        fields: FunctionArgs,
    },
    Delete { asset: AssetId, id: u32 },
}

#[derive(Args, Debug)]
struct FunctionArgs {
    verb: String,
    object: String,

    #[arg(short, long, default_value = "")]
    standard: String,

    /// Function type, e.g. "Primary Function"
    #[arg(short = 't', long = "type", default_value = "Primary Function")]
    function_type: FunctionType,
}

impl FunctionArgs {
    fn draft(&self) -> FunctionDraft {
        FunctionDraft::new(
            self.function_type,
            &self.verb,
            &self.object,
            &self.standard,
        )
    }
}

#[derive(Subcommand, Debug)]
enum FailureAction {
    Add {
        asset: AssetId,
        function: u32,
        description: String,
        #[arg(short, long, default_value = "Complete loss of function")]
        category: FailureCategory,
    },
    Update {
        asset: AssetId,
        id: String,
        description: String,
        #[arg(short, long, default_value = "Complete loss of function")]
        category: FailureCategory,
    },
    Delete { asset: AssetId, id: String },
}

#[derive(Subcommand, Debug)]
enum ModeAction {
    Add {
        asset: AssetId,
        functional_failure: String,
        component: String,
        description: String,
        #[arg(short, long, default_value = "Other")]
        cause: FailureCause,
    },
    Update {
        asset: AssetId,
        id: String,
        component: String,
        description: String,
        #[arg(short, long, default_value = "Other")]
        cause: FailureCause,
    },
    Delete { asset: AssetId, id: String },
}

#[derive(Subcommand, Debug)]
enum EffectsAction {
    Set {
        asset: AssetId,
        mode: String,
        #[command(flatten)]
        fields: EffectsArgs,
    },
    Update {
        asset: AssetId,
        mode: String,
        #[command(flatten)]
        fields: EffectsArgs,
    },
    Delete { asset: AssetId, mode: String },
}

#[derive(Args, Debug)]
struct EffectsArgs {
    #[arg(long, default_value = "")]
    evidence: String,
    #[arg(long, default_value = "")]
    safety_impact: String,
    #[arg(long, default_value = "")]
    operational_impact: String,
    #[arg(long, default_value = "")]
    physical_damage: String,
    #[arg(long, default_value = "")]
    repair_action: String,
    /// Hours
    #[arg(long, default_value_t = 0.0)]
    repair_time: f64,
    /// Hours
    #[arg(long, default_value_t = 0.0)]
    downtime: f64,
}

impl EffectsArgs {
    fn effects(&self) -> Effects {
        Effects {
            evidence: self.evidence.clone(),
            safety_impact: self.safety_impact.clone(),
            operational_impact: self.operational_impact.clone(),
            physical_damage: self.physical_damage.clone(),
            repair_action: self.repair_action.clone(),
            repair_time: self.repair_time,
            downtime: self.downtime,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConsequenceAction {
    Set {
        asset: AssetId,
        mode: String,
        #[command(flatten)]
        fields: ConsequenceArgs,
    },
    Update {
        asset: AssetId,
        mode: String,
        #[command(flatten)]
        fields: ConsequenceArgs,
    },
    Delete { asset: AssetId, mode: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BranchArg {
    Safety,
    Operational,
    NonOperational,
}

impl From<BranchArg> for ConsequenceBranch {
    fn from(arg: BranchArg) -> Self {
        match arg {
            BranchArg::Safety => ConsequenceBranch::Safety,
            BranchArg::Operational => ConsequenceBranch::Operational,
            BranchArg::NonOperational => ConsequenceBranch::NonOperational,
        }
    }
}

#[derive(Args, Debug)]
struct ConsequenceArgs {
    /// The failure is not evident to operators under normal conditions
    #[arg(long)]
    hidden: bool,

    #[arg(short, long, value_enum)]
    branch: BranchArg,

    /// Consequence rating 1-5 (safety branch)
    #[arg(long, requires = "likelihood")]
    severity: Option<u8>,

    /// Likelihood rating 1-5 (safety branch)
    #[arg(long, requires = "severity")]
    likelihood: Option<u8>,
}

impl ConsequenceArgs {
    fn input(&self) -> rcmkit::Result<ConsequenceInput> {
        let input = ConsequenceInput::new(!self.hidden, self.branch.into());
        match (self.severity, self.likelihood) {
            (Some(s), Some(l)) => Ok(input.with_ratings(Severity::from_value(s)?, Likelihood::from_value(l)?)),
            _ => Ok(input),
        }
    }
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    /// Record a task from a JSON task draft
    Set { asset: AssetId, mode: String, draft: PathBuf },
    Update { asset: AssetId, mode: String, draft: PathBuf },
    Delete { asset: AssetId, mode: String },
}

#[derive(Subcommand, Debug)]
enum ThresholdAction {
    Show,
    /// Administer new thresholds (admin only)
    Set { moderate_min: u8, high_min: u8 },
    History {
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

/// Config, catalogue and working document for one invocation.
struct Workspace {
    config: AppConfig,
    db: Database,
    user: User,
    document: PathBuf,
}

impl Workspace {
    fn open(cli: &Cli) -> Result<Self> {
        let config = AppConfig::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?;
        let db = Database::open_at(&config.session.database)
            .with_context(|| format!("opening {}", config.session.database.display()))?;
        let user = User::from_config(&cli.user, &config);
        let document = cli
            .document
            .clone()
            .unwrap_or_else(|| config.session.document.clone());
        Ok(Self { config, db, user, document })
    }

    fn autosave(&self) -> FileAutosave {
        FileAutosave::new(self.document.with_extension("autosave.json"))
            .with_application_info(self.config.application_info())
    }

    fn load_project(&self) -> Result<Project> {
        if !self.document.exists() {
            bail!(
                "no project document at {}; run `rcmkit init <PROJECT_NO>` first",
                self.document.display()
            );
        }
        persist::import_from_path(&self.document)
            .with_context(|| format!("reading {}", self.document.display()))
    }

    fn session(&self) -> Result<AnalysisSession> {
        let project = self.load_project()?;
        let thresholds = self.db.effective_thresholds(&self.config)?;
        Ok(AnalysisSession::new(project, thresholds).with_autosave(Box::new(self.autosave())))
    }

    fn save(&self, project: &Project) -> Result<()> {
        let app = self.config.application_info();
        persist::export_to_path(&self.document, project, Some(&app))
            .with_context(|| format!("writing {}", self.document.display()))?;
        let path = self.document.to_string_lossy().into_owned();
        self.db
            .register_project(project.project_no(), &project.info.description, Some(path.as_str()))?;
        Ok(())
    }

    /// Save the document, then record the action. Logging is best-effort.
    fn commit(&self, session: &AnalysisSession, action: &str) -> Result<()> {
        self.save(session.project())?;
        if let Err(e) = self
            .db
            .log_activity(session.project().project_no(), Some(&self.user.name), action)
        {
            warn!("failed to log activity: {}", e);
        }
        println!("{}", action);
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rcmkit={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let ws = Workspace::open(&cli)?;

    match cli.command {
        Command::Init { project_no, description, force } => {
            if ws.document.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", ws.document.display());
            }
            let project = Project::new(&project_no, &description)?;
            ws.save(&project)?;
            println!("Created project {} at {}", project.project_no(), ws.document.display());
        }

        Command::Asset { action } => handle_asset(&ws, action)?,
        Command::Component { action } => handle_component(&ws, action)?,
        Command::Context { action } => handle_context(&ws, action)?,
        Command::Function { action } => handle_function(&ws, action)?,
        Command::Failure { action } => handle_failure(&ws, action)?,
        Command::Mode { action } => handle_mode(&ws, action)?,
        Command::Effects { action } => handle_effects(&ws, action)?,
        Command::Consequence { action } => handle_consequence(&ws, action)?,
        Command::Task { action } => handle_task(&ws, action)?,
        Command::Thresholds { action } => handle_thresholds(&ws, action)?,

        Command::Results { asset } => {
            let session = ws.session()?;
            let rows = session.analysis_results(asset)?;
            if rows.is_empty() {
                println!("No management tasks recorded.");
            } else {
                println!("{:<16} {:<14} {:<9} {:>12}  {}", "ID", "COMPONENT", "TASK", "COST", "DESCRIPTION");
                println!("{}", "-".repeat(80));
                for r in rows {
                    println!(
                        "{:<16} {:<14} {:<9} {:>12.2}  {}",
                        r.failure_mode_id,
                        truncate(&r.component, 14),
                        r.task_type.code(),
                        r.cost,
                        truncate(&r.task_description, 40)
                    );
                }
            }
        }

        Command::Summary => {
            let project = ws.session()?.into_project();
            let rollup = project_rollup(&project);
            println!("\x1b[1m{}\x1b[0m {}", rollup.project_no, project.info.description);
            println!("{}", "─".repeat(70));
            for a in &rollup.assets {
                println!(
                    "{:<5} {:<24} {:>3} FM  {:>3} tasks  {:>5.1}%  ${:.2}/yr",
                    a.asset_id.to_string(),
                    truncate(&a.name, 24),
                    a.failure_modes,
                    a.management_tasks,
                    a.completion_pct(),
                    a.annual_cost
                );
            }
            println!("{}", "─".repeat(70));
            println!("Failure modes:     {}", rollup.failure_modes);
            println!("Management tasks:  {}", rollup.management_tasks);
            for (task_type, n) in &rollup.task_counts {
                println!("  {:<32} {}", task_type.label(), n);
            }
            println!("Not categorized:   {}", rollup.consequences.uncategorized);
            println!("Annual cost:       ${:.2}", rollup.annual_cost);
            println!("One-off cost:      ${:.2}", rollup.one_off_cost);
        }

        Command::Plan { asset } => {
            let session = ws.session()?;
            let plan = ImplementationPlan::for_asset(session.asset(asset)?);
            println!("\x1b[1mImplementation plan: {}\x1b[0m", plan.asset_name);
            for (task_type, n) in &plan.schedule_counts {
                println!("  {:<4} {}", task_type.code(), n);
            }
            println!("Annual maintenance cost: ${:.2}", plan.annual_cost);
            if !plan.one_off_changes.is_empty() {
                println!("One-off changes (${:.2}):", plan.one_off_cost);
                for r in &plan.one_off_changes {
                    println!("  {} {}: {}", r.failure_mode_id, r.component, r.task_description);
                }
            }
            println!("\nChecklist:");
            for item in &plan.checklist {
                println!("  [ ] {}", item);
            }
        }

        Command::Report { output, open_report } => {
            let project = ws.session()?.into_project();
            let path = match output {
                Some(p) => p,
                None => {
                    let dir = &ws.config.session.report_dir;
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("creating report directory {}", dir.display()))?;
                    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                    ws.config
                        .session
                        .report_dir
                        .join(format!("fmeca_{}_{}.html", project.project_no(), timestamp))
                }
            };
            report::generate(&path, &project)
                .with_context(|| format!("writing report {}", path.display()))?;
            eprintln!("\x1b[32mReport saved: {}\x1b[0m", path.display());
            if open_report {
                if let Err(e) = open::that(&path) {
                    eprintln!("Failed to open report: {}", e);
                }
            }
        }

        Command::Export { output } => {
            let project = ws.session()?.into_project();
            let app = ws.config.application_info();
            persist::export_to_path(&output, &project, Some(&app))?;
            println!("Exported {} to {}", project.project_no(), output.display());
        }

        Command::Import { input, force } => {
            let imported = persist::import_from_path(&input)
                .with_context(|| format!("importing {}", input.display()))?;
            if ws.document.exists() && !force {
                let current = ws.load_project()?;
                if current.asset_count() > 0 {
                    bail!(
                        "{} already holds {} asset(s) (use --force to replace)",
                        ws.document.display(),
                        current.asset_count()
                    );
                }
            }
            ws.save(&imported)?;
            println!(
                "Imported {} ({} asset(s)) from {}",
                imported.project_no(),
                imported.asset_count(),
                input.display()
            );
        }

        Command::Restore => {
            let current = ws.load_project()?;
            let autosave = ws.autosave();
            match autosave.restore(&current)? {
                Some(project) => {
                    ws.save(&project)?;
                    println!(
                        "Restored {} asset(s) from {}",
                        project.asset_count(),
                        autosave.path().display()
                    );
                }
                None => println!("Nothing to restore."),
            }
        }

        Command::ClearAutosave => {
            let autosave = ws.autosave();
            autosave.clear()?;
            println!("Cleared {}", autosave.path().display());
        }

        Command::Projects => {
            let projects = ws.db.list_projects()?;
            if projects.is_empty() {
                println!("No projects registered.");
            } else {
                println!("{:<14} {:<26} {:<30} {}", "PROJECT", "UPDATED", "DESCRIPTION", "DOCUMENT");
                println!("{}", "-".repeat(90));
                for p in projects {
                    println!(
                        "{:<14} {:<26} {:<30} {}",
                        p.project_no,
                        p.updated_at,
                        truncate(&p.description, 30),
                        p.document_path.unwrap_or_default()
                    );
                }
            }
        }

        Command::Log { limit, all } => {
            let project_no = if all {
                None
            } else {
                Some(ws.load_project()?.info.project_no)
            };
            let entries = ws.db.recent_activity(project_no.as_deref(), limit)?;
            if entries.is_empty() {
                println!("No activity logged.");
            }
            for e in entries {
                println!(
                    "[{}] {} {}: {}",
                    e.logged_at,
                    e.project_no,
                    e.user_name.unwrap_or_else(|| "-".to_string()),
                    e.action
                );
            }
        }
    }

    Ok(())
}

fn handle_asset(ws: &Workspace, action: AssetAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        AssetAction::Add(fields) => {
            let id = session.add_asset(fields.draft())?;
            ws.commit(&session, &format!("Added asset {} ({})", id, fields.name.trim()))?;
        }
        AssetAction::Update { id, fields } => {
            session.update_asset(id, fields.draft())?;
            ws.commit(&session, &format!("Updated asset {}", id))?;
        }
        AssetAction::Delete { id } => {
            let removed = session.delete_asset(id)?;
            ws.commit(&session, &format!("Deleted asset {} ({})", id, removed.name))?;
        }
        AssetAction::List => {
            let project = session.project();
            if project.asset_count() == 0 {
                println!("No assets.");
                return Ok(());
            }
            println!("{:<5} {:<24} {:<22} {:>5} {:>5}", "ID", "NAME", "CLASS", "COMP", "FM");
            println!("{}", "-".repeat(66));
            for a in project.assets() {
                println!(
                    "{:<5} {:<24} {:<22} {:>5} {:>5}",
                    a.id.to_string(),
                    truncate(&a.name, 24),
                    a.class.label(),
                    a.components.len(),
                    a.failure_modes.len()
                );
            }
        }
    }
    Ok(())
}

fn handle_component(ws: &Workspace, action: ComponentAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        ComponentAction::Add { asset, name } => {
            if session.add_component(asset, &name)? {
                ws.commit(&session, &format!("Added component '{}' to {}", name.trim(), asset))?;
            } else {
                println!("Component '{}' already exists on {}", name.trim(), asset);
            }
        }
        ComponentAction::Rename { asset, old, new } => {
            let updated = session.rename_component(asset, &old, &new)?;
            ws.commit(
                &session,
                &format!("Renamed component '{}' to '{}' on {} ({} failure mode(s) updated)", old, new.trim(), asset, updated),
            )?;
        }
        ComponentAction::Delete { asset, name } => {
            session.delete_component(asset, &name)?;
            ws.commit(&session, &format!("Deleted component '{}' from {}", name, asset))?;
        }
    }
    Ok(())
}

fn handle_context(ws: &Workspace, action: ContextAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        ContextAction::Set { asset, key, value } => {
            let mut context = session.asset(asset)?.operating_context.clone();
            context.set(&key, &value);
            session.set_operating_context(asset, context)?;
            ws.commit(&session, &format!("Set operating context '{}' on {}", key, asset))?;
        }
        ContextAction::Show { asset } => {
            let context = &session.asset(asset)?.operating_context;
            if context.is_empty() {
                println!("No operating context recorded.");
            }
            for (key, value) in context.iter() {
                println!("{:<24} {}", key, value);
            }
        }
    }
    Ok(())
}

fn handle_function(ws: &Workspace, action: FunctionAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        FunctionAction::Add { asset, fields } => {
            let id = session.add_function(asset, fields.draft())?;
            ws.commit(&session, &format!("Added function {} to {}: {}", id, asset, fields.draft().full_statement()))?;
        }
        FunctionAction::Update { asset, id, fields } => {
            session.update_function(asset, id, fields.draft())?;
            ws.commit(&session, &format!("Updated function {} on {}", id, asset))?;
        }
        FunctionAction::Delete { asset, id } => {
            let dependents = session.function_dependents(asset, id)?;
            if (dependents.functional_failures > 0 || dependents.failure_modes > 0) && !confirm(&format!(
                "Function {} has {} functional failure(s) and {} failure mode(s). Delete them all?",
                id, dependents.functional_failures, dependents.failure_modes
            )) {
                println!("Cancelled.");
                return Ok(());
            }
            let removed = session.delete_function(asset, id)?;
            ws.commit(
                &session,
                &format!(
                    "Deleted function {} from {} ({} functional failure(s), {} failure mode(s))",
                    id, asset, removed.functional_failures, removed.failure_modes
                ),
            )?;
        }
    }
    Ok(())
}

fn handle_failure(ws: &Workspace, action: FailureAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        FailureAction::Add { asset, function, description, category } => {
            let id = session.add_functional_failure(asset, function, &description, category)?;
            ws.commit(&session, &format!("Added functional failure {} to {}", id, asset))?;
        }
        FailureAction::Update { asset, id, description, category } => {
            session.update_functional_failure(asset, &id, &description, category)?;
            ws.commit(&session, &format!("Updated functional failure {} on {}", id, asset))?;
        }
        FailureAction::Delete { asset, id } => {
            let dependents = session.functional_failure_dependents(asset, &id)?;
            if dependents > 0
                && !confirm(&format!("{} has {} failure mode(s). Delete them all?", id, dependents))
            {
                println!("Cancelled.");
                return Ok(());
            }
            let removed = session.delete_functional_failure(asset, &id)?;
            ws.commit(
                &session,
                &format!("Deleted functional failure {} from {} ({} failure mode(s))", id, asset, removed),
            )?;
        }
    }
    Ok(())
}

fn handle_mode(ws: &Workspace, action: ModeAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        ModeAction::Add { asset, functional_failure, component, description, cause } => {
            let draft = FailureModeDraft {
                functional_failure_id: functional_failure,
                component,
                description,
                category: cause,
            };
            let id = session.add_failure_mode(asset, draft)?;
            ws.commit(&session, &format!("Added failure mode {} to {}", id, asset))?;
        }
        ModeAction::Update { asset, id, component, description, cause } => {
            session.update_failure_mode(asset, &id, &component, &description, cause)?;
            ws.commit(&session, &format!("Updated failure mode {} on {}", id, asset))?;
        }
        ModeAction::Delete { asset, id } => {
            session.delete_failure_mode(asset, &id)?;
            ws.commit(&session, &format!("Deleted failure mode {} from {}", id, asset))?;
        }
    }
    Ok(())
}

fn handle_effects(ws: &Workspace, action: EffectsAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        EffectsAction::Set { asset, mode, fields } => {
            session.set_effects(asset, &mode, fields.effects())?;
            ws.commit(&session, &format!("Recorded effects for {}", mode))?;
        }
        EffectsAction::Update { asset, mode, fields } => {
            session.update_effects(asset, &mode, fields.effects())?;
            ws.commit(&session, &format!("Updated effects for {}", mode))?;
        }
        EffectsAction::Delete { asset, mode } => {
            session.delete_effects(asset, &mode)?;
            ws.commit(&session, &format!("Deleted effects for {}", mode))?;
        }
    }
    Ok(())
}

fn handle_consequence(ws: &Workspace, action: ConsequenceAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        ConsequenceAction::Set { asset, mode, fields } => {
            let category = session.set_consequence(asset, &mode, fields.input()?)?;
            ws.commit(&session, &format!("Classified {} as {}", mode, category.label()))?;
            print_risk(&session, asset, &mode)?;
        }
        ConsequenceAction::Update { asset, mode, fields } => {
            let category = session.update_consequence(asset, &mode, fields.input()?)?;
            ws.commit(&session, &format!("Reclassified {} as {}", mode, category.label()))?;
            print_risk(&session, asset, &mode)?;
        }
        ConsequenceAction::Delete { asset, mode } => {
            session.delete_consequence(asset, &mode)?;
            ws.commit(&session, &format!("Deleted consequence for {}", mode))?;
        }
    }
    Ok(())
}

fn print_risk(session: &AnalysisSession, asset: AssetId, mode_id: &str) -> Result<()> {
    let mode = session
        .asset(asset)?
        .failure_mode(mode_id)
        .context("failure mode vanished after classification")?;
    if let Some(risk) = &mode.risk_assessment {
        println!("  Risk score {} ({:?})", risk.risk_score, risk.risk_level);
    }
    if let Some(category) = mode.consequence_category {
        let eligible: Vec<&str> = rcmkit::engine::eligible_task_types(category)
            .into_iter()
            .map(|t| t.code())
            .collect();
        println!("  Eligible tasks: {}", eligible.join(", "));
    }
    Ok(())
}

fn handle_task(ws: &Workspace, action: TaskAction) -> Result<()> {
    let mut session = ws.session()?;
    match action {
        TaskAction::Set { asset, mode, draft } => {
            let result = session.set_management_task(asset, &mode, read_task_draft(&draft)?)?;
            ws.commit(
                &session,
                &format!("Saved {} task for {} (${:.2})", result.task_type.code(), mode, result.cost),
            )?;
        }
        TaskAction::Update { asset, mode, draft } => {
            let result = session.update_management_task(asset, &mode, read_task_draft(&draft)?)?;
            ws.commit(
                &session,
                &format!("Updated task for {} to {} (${:.2})", mode, result.task_type.code(), result.cost),
            )?;
        }
        TaskAction::Delete { asset, mode } => {
            session.delete_management_task(asset, &mode)?;
            ws.commit(&session, &format!("Deleted task for {}", mode))?;
        }
    }
    Ok(())
}

fn read_task_draft(path: &Path) -> Result<TaskDraft> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing task draft {}", path.display()))
}

fn handle_thresholds(ws: &Workspace, action: ThresholdAction) -> Result<()> {
    match action {
        ThresholdAction::Show => {
            let t = ws.db.effective_thresholds(&ws.config)?;
            println!("Low:      score < {}", t.moderate_min);
            println!("Moderate: {} <= score < {}", t.moderate_min, t.high_min);
            println!("High:     score >= {}", t.high_min);
        }
        ThresholdAction::Set { moderate_min, high_min } => {
            let thresholds = RiskThresholds::new(moderate_min, high_min)?;
            ws.db.set_thresholds(&ws.user, thresholds)?;
            println!("Thresholds set to {}/{} by {}", moderate_min, high_min, ws.user.name);

            if ws.document.exists() {
                let mut session = ws.session()?;
                let changed = session.set_thresholds(thresholds)?;
                ws.commit(
                    &session,
                    &format!("Applied thresholds {}/{} ({} assessment(s) changed level)", moderate_min, high_min, changed),
                )?;
            }
        }
        ThresholdAction::History { limit } => {
            let history = ws.db.threshold_history(limit)?;
            if history.is_empty() {
                println!("No thresholds administered; using configured defaults.");
            }
            for h in history {
                println!("[{}] {}/{} by {}", h.set_at, h.moderate_min, h.high_min, h.set_by);
            }
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
