//! HTTP client for the migration server.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::types::*;
use crate::config::ApiConfig;
use crate::core::{ConnectionConfig, DatabaseType, Project, ProjectDraft, SourceTable, TableMapping};
use crate::ddl::SchemaObject;
use crate::error::{MigrateError, Result};
use crate::grid::MappingBackend;
use crate::progress::ProgressSource;
use crate::session::{Session, User};
use crate::typemap::DataTypeMappingRule;

/// Client for the migration server's REST API.
///
/// Cloning is cheap; clones share the connection pool and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client for `config.base_url` that authenticates with `session`.
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ora2pg-migrate/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and turn non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the session token; logging out");
            self.session.clear()?;
            return Err(MigrateError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::POST, path)).await?;
        Ok(response.json().await?)
    }

    async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in and store the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.post("/auth/login", &request).await?;
        self.adopt_auth(response)
    }

    /// Create an account and store the session.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let response: AuthResponse = self.post("/auth/register", &request).await?;
        self.adopt_auth(response)
    }

    /// Forget the local session. The server keeps no logout state.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    fn adopt_auth(&self, response: AuthResponse) -> Result<User> {
        let (token, user) = response.into_parts();
        self.session.establish(token, user.clone())?;
        info!("Logged in as {}", user.email);
        Ok(user)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("/projects").await
    }

    pub async fn get_project(&self, id: &str) -> Result<Project> {
        not_found_as(self.get(&format!("/projects/{}", id)).await, "project", id)
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project> {
        self.post("/projects", draft).await
    }

    pub async fn update_project(&self, project: &Project) -> Result<Project> {
        self.put(&format!("/projects/{}", project.id), project).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.delete(&format!("/projects/{}", id)).await
    }

    /// Store the source (Oracle) or target (PostgreSQL) connection of a project.
    pub async fn save_connection(
        &self,
        project_id: &str,
        connection: &ConnectionConfig,
    ) -> Result<Project> {
        let side = connection.db_type.side();
        self.post(&format!("/projects/{}/connections/{}", project_id, side), connection)
            .await
    }

    /// Replace the project's table mappings; returns the updated project.
    pub async fn save_project_mappings(
        &self,
        project_id: &str,
        mappings: &[TableMapping],
    ) -> Result<Project> {
        self.put(&format!("/projects/{}/table-mappings", project_id), mappings)
            .await
    }

    // =========================================================================
    // Connections and discovery
    // =========================================================================

    pub async fn test_connection(&self, connection: &ConnectionConfig) -> Result<ConnectionTestResult> {
        self.post("/connections/test", connection).await
    }

    pub async fn discover(
        &self,
        connection: &ConnectionConfig,
        schema: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<SourceTable>> {
        if connection.db_type != DatabaseType::Oracle {
            return Err(MigrateError::Config(
                "Table discovery needs an Oracle source connection".into(),
            ));
        }
        let request = DiscoverTablesRequest {
            connection,
            schema,
            table_name_filter: name_filter.filter(|f| !f.trim().is_empty()),
        };
        self.post("/database/discover-tables", &request).await
    }

    pub async fn server_auto_map(
        &self,
        source_tables: &[SourceTable],
        target_schema: &str,
    ) -> Result<Vec<TableMapping>> {
        let request = AutoMapRequest {
            source_tables,
            target_schema,
        };
        self.post("/database/auto-map", &request).await
    }

    // =========================================================================
    // Migration
    // =========================================================================

    /// Start the data migration. Without settings the server uses its defaults.
    pub async fn start_migration(
        &self,
        project_id: &str,
        settings: Option<&AppSettings>,
    ) -> Result<MigrationProgress> {
        let path = format!("/migration/start/{}", project_id);
        match settings {
            Some(settings) => self.post(&path, settings).await,
            None => self.post_empty(&path).await,
        }
    }

    pub async fn migration_progress(&self, project_id: &str) -> Result<MigrationProgress> {
        self.get(&format!("/migration/progress/{}", project_id)).await
    }

    pub async fn pause_migration(&self, project_id: &str) -> Result<MigrationProgress> {
        self.post_empty(&format!("/migration/pause/{}", project_id)).await
    }

    pub async fn resume_migration(&self, project_id: &str) -> Result<MigrationProgress> {
        self.post_empty(&format!("/migration/resume/{}", project_id)).await
    }

    /// Download the migration log as CSV or XLSX.
    pub async fn export_logs(&self, project_id: &str, format: LogExportFormat) -> Result<Vec<u8>> {
        let path = format!("/migration/logs/{}/export/{}", project_id, format.path_segment());
        let response = self.send(self.request(Method::GET, &path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub async fn settings(&self) -> Result<AppSettings> {
        self.get("/settings").await
    }

    pub async fn update_settings(&self, settings: &AppSettings) -> Result<AppSettings> {
        self.put("/settings", settings).await
    }

    // =========================================================================
    // Data type rules
    // =========================================================================

    pub async fn rules(&self) -> Result<Vec<DataTypeMappingRule>> {
        self.get("/data-type-rules").await
    }

    pub async fn custom_rules(&self) -> Result<Vec<DataTypeMappingRule>> {
        self.get("/data-type-rules/custom").await
    }

    pub async fn default_rules(&self) -> Result<Vec<DataTypeMappingRule>> {
        self.get("/data-type-rules/defaults").await
    }

    pub async fn create_rule(&self, rule: &DataTypeMappingRule) -> Result<DataTypeMappingRule> {
        self.post("/data-type-rules", rule).await
    }

    pub async fn update_rule(
        &self,
        id: &str,
        rule: &DataTypeMappingRule,
    ) -> Result<DataTypeMappingRule> {
        self.put(&format!("/data-type-rules/{}", id), rule).await
    }

    pub async fn delete_rule(&self, id: &str) -> Result<()> {
        self.delete(&format!("/data-type-rules/{}", id)).await
    }

    // =========================================================================
    // Schema DDL
    // =========================================================================

    pub async fn generate_ddl(&self, request: &SchemaMigrationRequest) -> Result<Vec<SchemaObject>> {
        self.post("/schema/generate-ddl", request).await
    }

    /// Generate every object plus the server's concatenated script.
    pub async fn generate_all_ddl(&self, request: &SchemaMigrationRequest) -> Result<GenerateAllResponse> {
        self.post("/schema/generate-ddl/all", request).await
    }

    // =========================================================================
    // Validation
    // =========================================================================

    pub async fn validate_row_counts(
        &self,
        project_id: &str,
        table_names: &[String],
    ) -> Result<Vec<RowCountResult>> {
        let request = TableNamesRequest { table_names };
        self.post(&format!("/validation/row-count/{}", project_id), &request)
            .await
    }

    pub async fn validate_checksums(
        &self,
        project_id: &str,
        request: &ChecksumRequest,
    ) -> Result<Vec<ChecksumResult>> {
        self.post(&format!("/validation/checksum/{}", project_id), request)
            .await
    }

    pub async fn dry_run(&self, project_id: &str, table_names: &[String]) -> Result<Vec<DryRunResult>> {
        let request = TableNamesRequest { table_names };
        self.post(&format!("/validation/dry-run/{}", project_id), &request)
            .await
    }

    pub async fn validate_all(&self, request: &ValidationRequest) -> Result<ValidationReport> {
        self.post(&format!("/validation/all/{}", request.project_id), request)
            .await
    }

    // =========================================================================
    // Pipelines
    // =========================================================================

    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        self.get("/pg2pg/pipelines").await
    }

    pub async fn get_pipeline(&self, id: &str) -> Result<Pipeline> {
        not_found_as(self.get(&format!("/pg2pg/pipelines/{}", id)).await, "pipeline", id)
    }

    pub async fn create_pipeline(&self, draft: &PipelineDraft) -> Result<Pipeline> {
        self.post("/pg2pg/pipelines", draft).await
    }

    pub async fn delete_pipeline(&self, id: &str) -> Result<()> {
        self.delete(&format!("/pg2pg/pipelines/{}", id)).await
    }

    /// Save a pipeline's name, description and status.
    pub async fn update_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline> {
        let path = format!("/pg2pg/pipelines/{}", pipeline.id);
        not_found_as(self.put(&path, pipeline).await, "pipeline", &pipeline.id)
    }

    /// Append a step to a pipeline; returns the step with its server id.
    pub async fn add_pipeline_step(
        &self,
        pipeline_id: &str,
        step: &PipelineStep,
    ) -> Result<PipelineStep> {
        let path = format!("/pg2pg/pipelines/{}/steps", pipeline_id);
        not_found_as(self.post(&path, step).await, "pipeline", pipeline_id)
    }

    pub async fn update_pipeline_step(
        &self,
        step_id: &str,
        step: &PipelineStep,
    ) -> Result<PipelineStep> {
        let path = format!("/pg2pg/pipelines/steps/{}", step_id);
        not_found_as(self.put(&path, step).await, "pipeline step", step_id)
    }

    pub async fn delete_pipeline_step(&self, step_id: &str) -> Result<()> {
        let path = format!("/pg2pg/pipelines/steps/{}", step_id);
        not_found_as(self.delete(&path).await, "pipeline step", step_id)
    }

    /// Store the source or target PostgreSQL connection of a pipeline,
    /// replacing any previous one on that side.
    pub async fn save_pipeline_connection(
        &self,
        pipeline_id: &str,
        side: PipelineConnectionSide,
        connection: &ConnectionConfig,
    ) -> Result<Pipeline> {
        let path = format!("/pg2pg/pipelines/{}/connections/{}", pipeline_id, side.as_str());
        not_found_as(self.post(&path, connection).await, "pipeline", pipeline_id)
    }

    pub async fn start_pipeline(&self, id: &str) -> Result<PipelineExecution> {
        self.post_empty(&format!("/pg2pg/pipelines/{}/start", id)).await
    }

    pub async fn stop_pipeline(&self, id: &str) -> Result<StopResponse> {
        self.post_empty(&format!("/pg2pg/pipelines/{}/stop", id)).await
    }

    /// Pipeline logs, optionally for one execution only.
    pub async fn pipeline_logs(&self, id: &str, execution_id: Option<&str>) -> Result<Vec<PipelineLog>> {
        let mut path = format!("/pg2pg/pipelines/{}/logs", id);
        if let Some(execution_id) = execution_id {
            path.push_str("?executionId=");
            path.push_str(execution_id);
        }
        self.get(&path).await
    }

    pub async fn pipeline_executions(&self, id: &str) -> Result<Vec<PipelineExecution>> {
        self.get(&format!("/pg2pg/pipelines/{}/executions", id)).await
    }
}

#[async_trait]
impl MappingBackend for ApiClient {
    async fn save_table_mappings(
        &self,
        project_id: &str,
        mappings: &[TableMapping],
    ) -> Result<Vec<TableMapping>> {
        let project = self.save_project_mappings(project_id, mappings).await?;
        Ok(project.table_mappings)
    }

    async fn discover_tables(
        &self,
        connection: &ConnectionConfig,
        schema: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<SourceTable>> {
        self.discover(connection, schema, name_filter).await
    }

    async fn auto_map(
        &self,
        source_tables: &[SourceTable],
        target_schema: &str,
    ) -> Result<Vec<TableMapping>> {
        self.server_auto_map(source_tables, target_schema).await
    }

    fn backend_type(&self) -> &'static str {
        "http"
    }
}

#[async_trait]
impl ProgressSource for ApiClient {
    async fn progress(&self, project_id: &str) -> Result<MigrationProgress> {
        self.migration_progress(project_id).await
    }
}

/// Join a base URL and an absolute API path without doubling slashes.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turn a 404 from the server into [`MigrateError::NotFound`].
fn not_found_as<T>(result: Result<T>, kind: &'static str, id: &str) -> Result<T> {
    match result {
        Err(MigrateError::Api { status: 404, .. }) => Err(MigrateError::not_found(kind, id)),
        other => other,
    }
}

/// Error for a non-success, non-401 response.
///
/// Uses the body's `error` field when it is JSON, else `HTTP <status>`.
fn api_error(status: StatusCode, body: &str) -> MigrateError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    MigrateError::Api {
        status: status.as_u16(),
        message,
    }
}
