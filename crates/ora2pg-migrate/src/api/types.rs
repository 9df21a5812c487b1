//! Request and response bodies of the migration server.
//!
//! Field names follow the server's camelCase JSON. Types shared with the
//! grid (projects, mappings, connections) live in [`crate::core`].

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::SourceTable;
use crate::ddl::SchemaObject;
use crate::session::{User, UserRole};

// =============================================================================
// Auth
// =============================================================================

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of a successful login or registration.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    pub id: String,
}

impl AuthResponse {
    /// Split into the bearer token and the user it identifies.
    pub fn into_parts(self) -> (String, User) {
        let user = User {
            id: self.id,
            email: self.email,
            name: self.name,
            avatar: None,
            role: self.role,
            created_at: None,
        };
        (self.token, user)
    }
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Shape of the server's error bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

// =============================================================================
// Connections and discovery
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    pub database_version: Option<String>,
    pub connection_time_ms: Option<i64>,
    pub connection_string: Option<String>,
    pub is_connected: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DiscoverTablesRequest<'a> {
    pub connection: &'a crate::core::ConnectionConfig,
    pub schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name_filter: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AutoMapRequest<'a> {
    pub source_tables: &'a [SourceTable],
    pub target_schema: &'a str,
}

// =============================================================================
// Migration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Error,
}

impl MigrationStatus {
    /// Completed and error are final; the server will not change them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationStatus::Completed | MigrationStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Idle => "idle",
            MigrationStatus::Running => "running",
            MigrationStatus::Paused => "paused",
            MigrationStatus::Completed => "completed",
            MigrationStatus::Error => "error",
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationLog {
    pub id: String,
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side state of one project's data migration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationProgress {
    pub project_id: String,
    pub total_tables: u32,
    pub completed_tables: u32,
    pub total_rows: i64,
    pub migrated_rows: i64,
    pub current_table: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub estimated_end_time: Option<NaiveDateTime>,
    pub status: MigrationStatus,
    pub logs: Vec<MigrationLog>,
}

impl MigrationProgress {
    /// Migrated rows as a percentage, 0 when the total is unknown.
    pub fn percent(&self) -> f64 {
        if self.total_rows <= 0 {
            return 0.0;
        }
        (self.migrated_rows as f64 / self.total_rows as f64 * 100.0).min(100.0)
    }
}

/// Log export formats offered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogExportFormat {
    Csv,
    Excel,
}

impl LogExportFormat {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            LogExportFormat::Csv => "csv",
            LogExportFormat::Excel => "excel",
        }
    }

    /// File extension for the downloaded bytes.
    pub fn extension(&self) -> &'static str {
        match self {
            LogExportFormat::Csv => "csv",
            LogExportFormat::Excel => "xlsx",
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Server-wide migration settings. Every field is optional so partial
/// updates round-trip unchanged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_jobs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_interval: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_from_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_error: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_to_file: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate_target: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_constraints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_sequences: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_commit: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name_filter: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("parallel_jobs", &self.parallel_jobs)
            .field("batch_size", &self.batch_size)
            .field("commit_interval", &self.commit_interval)
            .field("smtp_enabled", &self.smtp_enabled)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field(
                "smtp_password",
                &self.smtp_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_level", &self.log_level)
            .field("truncate_target", &self.truncate_target)
            .field("disable_constraints", &self.disable_constraints)
            .field("skip_errors", &self.skip_errors)
            .field("max_errors", &self.max_errors)
            .field("table_name_filter", &self.table_name_filter)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Schema DDL
// =============================================================================

/// Which object kinds the server should generate DDL for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMigrationRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,
    pub include_indexes: bool,
    pub include_constraints: bool,
    pub include_sequences: bool,
    pub include_views: bool,
    pub include_functions: bool,
    pub include_procedures: bool,
    pub include_triggers: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_names: Vec<String>,
}

impl SchemaMigrationRequest {
    /// Indexes, constraints, sequences and views for every mapped table.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            target_schema: None,
            include_indexes: true,
            include_constraints: true,
            include_sequences: true,
            include_views: true,
            include_functions: false,
            include_procedures: false,
            include_triggers: false,
            table_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateAllResponse {
    pub objects: Vec<SchemaObject>,
    #[serde(rename = "allDDL")]
    pub all_ddl: String,
    pub count: usize,
}

// =============================================================================
// Validation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowCountResult {
    pub table: String,
    pub source_schema: Option<String>,
    pub target_schema: Option<String>,
    pub source_count: Option<i64>,
    pub target_count: Option<i64>,
    #[serde(rename = "match")]
    pub is_match: bool,
    pub difference: Option<i64>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecksumResult {
    pub table: String,
    pub source_schema: Option<String>,
    pub target_schema: Option<String>,
    pub source_checksum: Option<String>,
    pub target_checksum: Option<String>,
    #[serde(rename = "match")]
    pub is_match: bool,
    pub algorithm: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub row_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DryRunResult {
    pub table: String,
    pub source_schema: Option<String>,
    pub target_schema: Option<String>,
    pub row_count: Option<i64>,
    pub estimated_size: Option<String>,
    pub estimated_time: Option<String>,
    pub issues: Vec<String>,
    pub ddl_preview: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Table selection for row-count and dry-run validation. Empty means all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableNamesRequest<'a> {
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub table_names: &'a [String],
}

/// Options for checksum validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub table_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns_to_include: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub table_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns_to_include: Vec<String>,
    pub include_dry_run: bool,
}

/// Combined result of `/validation/all`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationReport {
    pub row_count: Vec<RowCountResult>,
    pub checksum: Vec<ChecksumResult>,
    pub dry_run: Vec<DryRunResult>,
}

impl ValidationReport {
    /// Tables whose row counts or checksums disagree.
    pub fn mismatched_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self
            .row_count
            .iter()
            .filter(|r| !r.is_match)
            .map(|r| r.table.as_str())
            .chain(
                self.checksum
                    .iter()
                    .filter(|c| !c.is_match)
                    .map(|c| c.table.as_str()),
            )
            .collect();
        tables.sort_unstable();
        tables.dedup();
        tables
    }
}

// =============================================================================
// PostgreSQL-to-PostgreSQL pipelines
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineStep {
    pub id: Option<String>,
    pub order: u32,
    pub source_schema: String,
    pub source_table: String,
    pub target_schema: String,
    pub target_table: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub filter_enabled: bool,
    pub filter_where_clause: Option<String>,
    pub filter_description: Option<String>,
    pub disable_triggers: bool,
    pub disable_constraints: bool,
    pub pipeline_id: Option<String>,
    /// Column mappings are passed through untouched.
    pub column_mappings: Vec<serde_json::Value>,
}

impl PipelineStep {
    /// A new step copying `source_schema.source_table` into
    /// `target_schema.target_table`.
    pub fn new(
        order: u32,
        source_schema: impl Into<String>,
        source_table: impl Into<String>,
        target_schema: impl Into<String>,
        target_table: impl Into<String>,
    ) -> Self {
        Self {
            order,
            source_schema: source_schema.into(),
            source_table: source_table.into(),
            target_schema: target_schema.into(),
            target_table: target_table.into(),
            ..Default::default()
        }
    }
}

/// Which end of a pipeline a connection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineConnectionSide {
    Source,
    Target,
}

impl PipelineConnectionSide {
    /// Path segment used by the pipeline connection endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineConnectionSide::Source => "source",
            PipelineConnectionSide::Target => "target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub steps: Vec<PipelineStep>,
    pub source_connection: Option<serde_json::Value>,
    pub target_connection: Option<serde_json::Value>,
    pub total_runs: Option<u32>,
    pub last_run_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineLog {
    pub id: String,
    pub pipeline_id: String,
    pub execution_id: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub level: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub step_id: Option<String>,
}

/// One run of a pipeline. Kept loose; the server adds fields over time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineExecution {
    pub id: String,
    pub pipeline_id: String,
    pub status: Option<String>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopResponse {
    pub pipeline_id: String,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_deserialize_partial() {
        let json = r#"{
            "projectId": "p1",
            "totalTables": 4,
            "completedTables": 1,
            "totalRows": 200,
            "migratedRows": 50,
            "currentTable": "EMPLOYEES",
            "status": "running",
            "logs": [{"id": "l1", "level": "warning", "message": "slow"}]
        }"#;
        let progress: MigrationProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.status, MigrationStatus::Running);
        assert!(!progress.status.is_terminal());
        assert_eq!(progress.logs[0].level, LogLevel::Warning);
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);

        let empty: MigrationProgress = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.status, MigrationStatus::Idle);
        assert_eq!(empty.percent(), 0.0);
    }

    #[test]
    fn test_auth_response_into_parts() {
        let json = r#"{"token":"t","email":"a@b.c","name":"A","role":"admin","id":"u1"}"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(!format!("{:?}", response).contains("\"t\""));
        let (token, user) = response.into_parts();
        assert_eq!(token, "t");
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn test_settings_skip_unset_and_redact() {
        let settings = AppSettings {
            batch_size: Some(1000),
            smtp_password: Some("hunter2".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["batchSize"], 1000);
        assert!(json.get("parallelJobs").is_none());
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn test_validation_report_mismatches() {
        let json = r#"{
            "rowCount": [
                {"table": "A", "match": true, "status": "ok"},
                {"table": "B", "match": false, "status": "mismatch"}
            ],
            "checksum": [
                {"table": "B", "match": false, "status": "mismatch"},
                {"table": "C", "match": false, "status": "mismatch"}
            ]
        }"#;
        let report: ValidationReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.mismatched_tables(), vec!["B", "C"]);
        assert!(report.dry_run.is_empty());
    }

    #[test]
    fn test_schema_request_defaults() {
        let request = SchemaMigrationRequest::new("p1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["includeSequences"], true);
        assert_eq!(json["includeTriggers"], false);
        assert!(json.get("tableNames").is_none());
    }
}
