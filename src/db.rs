//! SQLite catalogue with Diesel ORM
//!
//! Stores the administered risk thresholds (full history, latest wins),
//! a registry of known projects and their working documents, and an
//! activity log of session mutations. Analysis data itself lives in the
//! JSON document, not here.

use crate::config::AppConfig;
use crate::engine::RiskThresholds;
use crate::error::RcmError;
use crate::schema::*;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::path::Path;
use tracing::info;

// ============================================================================
// Diesel Models
// ============================================================================

#[derive(Insertable)]
#[diesel(table_name = risk_thresholds)]
pub struct NewThresholds<'a> {
    pub moderate_min: i32,
    pub high_min: i32,
    pub set_by: &'a str,
    pub set_at: &'a str,
}

/// One administered threshold change
#[derive(Queryable, Selectable, Debug, Clone, serde::Serialize)]
#[diesel(table_name = risk_thresholds)]
pub struct ThresholdRecord {
    pub id: i32,
    pub moderate_min: i32,
    pub high_min: i32,
    pub set_by: String,
    pub set_at: String,
}

impl ThresholdRecord {
    pub fn thresholds(&self) -> Result<RiskThresholds> {
        let moderate = u8::try_from(self.moderate_min).map_err(|_| self.corrupt())?;
        let high = u8::try_from(self.high_min).map_err(|_| self.corrupt())?;
        RiskThresholds::new(moderate, high).map_err(|_| self.corrupt())
    }

    fn corrupt(&self) -> DbError {
        DbError::Corrupt(format!(
            "risk_thresholds row {} holds invalid bounds {}/{}",
            self.id, self.moderate_min, self.high_min
        ))
    }
}

#[derive(Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject<'a> {
    pub project_no: &'a str,
    pub description: &'a str,
    pub document_path: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Registered project
#[derive(Queryable, Selectable, Debug, Clone, serde::Serialize)]
#[diesel(table_name = projects)]
pub struct ProjectRecord {
    pub id: i32,
    pub project_no: String,
    pub description: String,
    pub document_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivity<'a> {
    pub project_no: &'a str,
    pub user_name: Option<&'a str>,
    pub action: &'a str,
    pub logged_at: &'a str,
}

/// Activity log entry
#[derive(Queryable, Selectable, Debug, Clone, serde::Serialize)]
#[diesel(table_name = activity_log)]
pub struct ActivityRecord {
    pub id: i32,
    pub project_no: String,
    pub user_name: Option<String>,
    pub action: String,
    pub logged_at: String,
}

// ============================================================================
// Roles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Analyst,
}

/// The user on whose behalf catalogue changes are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub role: Role,
}

impl User {
    /// Resolve a user's role from the `[admin]` list.
    pub fn from_config(name: &str, config: &AppConfig) -> Self {
        let role = if config.is_admin(name) {
            Role::Admin
        } else {
            Role::Analyst
        };
        Self {
            name: name.to_string(),
            role,
        }
    }
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Database connection wrapper with connection pool
pub struct Database {
    pool: DbPool,
}

/// Error type for database operations
#[derive(Debug)]
pub enum DbError {
    Connection(String),
    Query(diesel::result::Error),
    Corrupt(String),
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Connection(msg) => write!(f, "Connection error: {}", msg),
            DbError::Query(e) => write!(f, "Query error: {}", e),
            DbError::Corrupt(msg) => write!(f, "Corrupt record: {}", msg),
        }
    }
}

impl std::error::Error for DbError {}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        DbError::Query(e)
    }
}

impl From<DbError> for RcmError {
    fn from(e: DbError) -> Self {
        RcmError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

impl Database {
    /// Open database at specified path, creating tables as needed
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| DbError::Connection(e.to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(r#"
            CREATE TABLE IF NOT EXISTS risk_thresholds (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                moderate_min INTEGER NOT NULL,
                high_min INTEGER NOT NULL,
                set_by TEXT NOT NULL,
                set_at TEXT NOT NULL
            )
        "#).execute(&mut conn)?;

        diesel::sql_query(r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                project_no TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                document_path TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#).execute(&mut conn)?;

        diesel::sql_query(r#"
            CREATE TABLE IF NOT EXISTS activity_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                project_no TEXT NOT NULL,
                user_name TEXT,
                action TEXT NOT NULL,
                logged_at TEXT NOT NULL
            )
        "#).execute(&mut conn)?;

        diesel::sql_query(
            "CREATE INDEX IF NOT EXISTS idx_activity_project ON activity_log(project_no)",
        )
        .execute(&mut conn)?;

        Ok(())
    }

    fn last_insert_id(conn: &mut DbConn) -> Result<i32> {
        let id: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("last_insert_rowid()"))
            .first(conn)?;
        Ok(id)
    }

    // ========================================================================
    // Risk Thresholds
    // ========================================================================

    /// Record new thresholds. Only administrators may change them.
    pub fn set_thresholds(&self, user: &User, thresholds: RiskThresholds) -> crate::error::Result<i32> {
        if user.role != Role::Admin {
            return Err(RcmError::Forbidden(format!(
                "user '{}' is not permitted to change risk thresholds",
                user.name
            )));
        }
        thresholds.validate()?;

        let mut conn = self.get_conn()?;
        let now = chrono::Utc::now().to_rfc3339();
        let row = NewThresholds {
            moderate_min: i32::from(thresholds.moderate_min),
            high_min: i32::from(thresholds.high_min),
            set_by: &user.name,
            set_at: &now,
        };
        diesel::insert_into(risk_thresholds::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(DbError::from)?;
        let id = Self::last_insert_id(&mut conn)?;

        info!(
            user = %user.name,
            moderate_min = thresholds.moderate_min,
            high_min = thresholds.high_min,
            "risk thresholds administered"
        );
        Ok(id)
    }

    /// Latest administered thresholds, if any.
    pub fn current_thresholds(&self) -> Result<Option<RiskThresholds>> {
        let mut conn = self.get_conn()?;
        let latest = risk_thresholds::table
            .order(risk_thresholds::id.desc())
            .select(ThresholdRecord::as_select())
            .first::<ThresholdRecord>(&mut conn)
            .optional()?;
        latest.map(|r| r.thresholds()).transpose()
    }

    /// Administered thresholds, falling back to the configured defaults.
    pub fn effective_thresholds(&self, config: &AppConfig) -> Result<RiskThresholds> {
        Ok(self
            .current_thresholds()?
            .unwrap_or_else(|| config.default_thresholds()))
    }

    pub fn threshold_history(&self, limit: i64) -> Result<Vec<ThresholdRecord>> {
        let mut conn = self.get_conn()?;
        let rows = risk_thresholds::table
            .order(risk_thresholds::id.desc())
            .limit(limit)
            .load::<ThresholdRecord>(&mut conn)?;
        Ok(rows)
    }

    // ========================================================================
    // Project Registry
    // ========================================================================

    /// Insert or refresh a project registration.
    pub fn register_project(
        &self,
        project_no: &str,
        description: &str,
        document_path: Option<&str>,
    ) -> Result<i32> {
        let mut conn = self.get_conn()?;
        let now = chrono::Utc::now().to_rfc3339();

        let existing: Option<i32> = projects::table
            .filter(projects::project_no.eq(project_no))
            .select(projects::id)
            .first(&mut conn)
            .optional()?;

        match existing {
            Some(id) => {
                diesel::update(projects::table.filter(projects::id.eq(id)))
                    .set((
                        projects::description.eq(description),
                        projects::document_path.eq(document_path),
                        projects::updated_at.eq(&now),
                    ))
                    .execute(&mut conn)?;
                Ok(id)
            }
            None => {
                let row = NewProject {
                    project_no,
                    description,
                    document_path,
                    created_at: &now,
                    updated_at: &now,
                };
                diesel::insert_into(projects::table)
                    .values(&row)
                    .execute(&mut conn)?;
                Self::last_insert_id(&mut conn)
            }
        }
    }

    pub fn get_project(&self, project_no: &str) -> Result<Option<ProjectRecord>> {
        let mut conn = self.get_conn()?;
        let record = projects::table
            .filter(projects::project_no.eq(project_no))
            .first::<ProjectRecord>(&mut conn)
            .optional()?;
        Ok(record)
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let mut conn = self.get_conn()?;
        let records = projects::table
            .order(projects::project_no.asc())
            .load::<ProjectRecord>(&mut conn)?;
        Ok(records)
    }

    // ========================================================================
    // Activity Log
    // ========================================================================

    pub fn log_activity(&self, project_no: &str, user: Option<&str>, action: &str) -> Result<i32> {
        let mut conn = self.get_conn()?;
        let now = chrono::Utc::now().to_rfc3339();

        let row = NewActivity {
            project_no,
            user_name: user,
            action,
            logged_at: &now,
        };
        diesel::insert_into(activity_log::table)
            .values(&row)
            .execute(&mut conn)?;
        Self::last_insert_id(&mut conn)
    }

    /// Most recent entries first
    pub fn recent_activity(&self, project_no: Option<&str>, limit: i64) -> Result<Vec<ActivityRecord>> {
        let mut conn = self.get_conn()?;
        let mut query = activity_log::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(project_no) = project_no {
            query = query.filter(activity_log::project_no.eq(project_no));
        }
        let rows = query
            .order(activity_log::id.desc())
            .limit(limit)
            .load::<ActivityRecord>(&mut conn)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn open() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open_at(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn admin() -> User {
        User { name: "alice".to_string(), role: Role::Admin }
    }

    // ==========================================================================
    // THRESHOLD TESTS
    // ==========================================================================

    #[test]
    fn test_no_thresholds_falls_back_to_config() {
        let (_dir, db) = open();
        assert_eq!(db.current_thresholds().unwrap(), None);
        let config = AppConfig::default();
        assert_eq!(db.effective_thresholds(&config).unwrap(), RiskThresholds::default());
    }

    #[test]
    fn test_latest_thresholds_win() {
        let (_dir, db) = open();
        db.set_thresholds(&admin(), RiskThresholds::new(5, 7).unwrap()).unwrap();
        db.set_thresholds(&admin(), RiskThresholds::new(4, 9).unwrap()).unwrap();
        assert_eq!(db.current_thresholds().unwrap(), Some(RiskThresholds::new(4, 9).unwrap()));
        assert_eq!(db.threshold_history(10).unwrap().len(), 2);
    }

    #[test]
    fn test_analyst_cannot_set_thresholds() {
        let (_dir, db) = open();
        let analyst = User { name: "bob".to_string(), role: Role::Analyst };
        let err = db.set_thresholds(&analyst, RiskThresholds::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(db.threshold_history(10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_thresholds_not_stored() {
        let (_dir, db) = open();
        let bad = RiskThresholds { moderate_min: 9, high_min: 3 };
        assert!(db.set_thresholds(&admin(), bad).is_err());
        assert_eq!(db.current_thresholds().unwrap(), None);
    }

    #[test]
    fn test_role_from_config() {
        let config = AppConfig::parse("[admin]\nusers = [\"alice\"]\n").unwrap();
        assert_eq!(User::from_config("alice", &config).role, Role::Admin);
        assert_eq!(User::from_config("bob", &config).role, Role::Analyst);
    }

    // ==========================================================================
    // REGISTRY AND ACTIVITY TESTS
    // ==========================================================================

    #[test]
    fn test_register_project_is_upsert() {
        let (_dir, db) = open();
        let id = db.register_project("P-100", "Pumps", Some("p100.json")).unwrap();
        let again = db.register_project("P-100", "Pump stations", Some("p100.json")).unwrap();
        assert_eq!(id, again);
        let record = db.get_project("P-100").unwrap().unwrap();
        assert_eq!(record.description, "Pump stations");
        assert_eq!(db.list_projects().unwrap().len(), 1);
        assert!(db.get_project("P-999").unwrap().is_none());
    }

    #[test]
    fn test_activity_log_filters_by_project() {
        let (_dir, db) = open();
        db.log_activity("P-1", Some("alice"), "added asset A1").unwrap();
        db.log_activity("P-2", None, "added asset A1").unwrap();
        db.log_activity("P-1", Some("alice"), "added component 'Bearing' to A1").unwrap();

        let p1 = db.recent_activity(Some("P-1"), 10).unwrap();
        assert_eq!(p1.len(), 2);
        assert!(p1[0].action.contains("Bearing"));
        assert_eq!(db.recent_activity(None, 10).unwrap().len(), 3);
    }
}
