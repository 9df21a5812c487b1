//! ora2pg-migrate CLI - Oracle to PostgreSQL mapping and migration control.

mod wizard;

use clap::{Parser, Subcommand};
use ora2pg_migrate::api::MigrationProgress;
use ora2pg_migrate::config::load_rules_file;
use ora2pg_migrate::core::{SourceTable, TableMapping};
use ora2pg_migrate::ddl::{assemble_export, table_ddl, SchemaObject};
use ora2pg_migrate::grid::{auto_map_tables, filter_mappings, page, total_pages, DEFAULT_PER_PAGE};
use ora2pg_migrate::typemap::{parse_data_type, RuleSet};
use ora2pg_migrate::{
    poll_progress, ApiClient, Config, MappingGrid, MigrateError, MigrationStatus, NamingStrategy,
    Session,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Config file used when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "ora2pg.yaml";

#[derive(Parser)]
#[command(name = "ora2pg-migrate")]
#[command(about = "Oracle to PostgreSQL mapping and migration control")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file [default: ora2pg.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map an Oracle data type to PostgreSQL
    MapType {
        /// Oracle type, e.g. VARCHAR2 or NUMBER(10,2)
        data_type: String,

        /// Character length
        #[arg(long)]
        length: Option<u32>,

        /// Numeric precision
        #[arg(long)]
        precision: Option<u32>,

        /// Numeric scale
        #[arg(long)]
        scale: Option<u32>,
    },

    /// Split a PostgreSQL type into base type and parameters
    ParseType {
        /// PostgreSQL type, e.g. NUMERIC(10,2)
        data_type: String,
    },

    /// List the effective type mapping rules
    Rules {
        /// JSON file with custom rules (overrides mapping.custom_rules_file)
        #[arg(long)]
        custom: Option<PathBuf>,
    },

    /// Build table mappings from discovered Oracle tables
    AutoMap {
        /// JSON array of source tables
        #[arg(short, long)]
        input: PathBuf,

        /// Target PostgreSQL schema (overrides mapping.default_target_schema)
        #[arg(long)]
        target_schema: Option<String>,

        /// Column naming: lowercase, uppercase, original, camelCase, snake_case, pascalCase
        #[arg(long)]
        naming: Option<String>,

        /// Write mappings here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search table mappings by table or column name
    Search {
        /// JSON array of table mappings
        #[arg(short, long)]
        input: PathBuf,

        /// Case-insensitive search term
        term: String,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },

    /// Assemble schema objects into one ordered DDL script
    ExportDdl {
        /// JSON array of schema objects
        #[arg(short, long)]
        input: PathBuf,

        /// Leave out sequences
        #[arg(long)]
        no_sequences: bool,

        /// Leave out indexes
        #[arg(long)]
        no_indexes: bool,

        /// Leave out constraints
        #[arg(long)]
        no_constraints: bool,

        /// Leave out views
        #[arg(long)]
        no_views: bool,

        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate CREATE TABLE statements for enabled table mappings
    TableDdl {
        /// JSON array of table mappings
        #[arg(short, long)]
        input: PathBuf,

        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Log in to the migration server
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "ORA2PG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Discover the Oracle tables of a project and save pending mappings
    Discover {
        /// Project id
        #[arg(long)]
        project: String,

        /// Table name LIKE pattern, e.g. EMP%
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show migration progress of a project
    Progress {
        /// Project id
        #[arg(long)]
        project: String,

        /// Keep polling until the migration completes or fails
        #[arg(long)]
        follow: bool,
    },

    /// Create or edit a configuration file interactively
    Init {
        /// Output path for configuration file [default: ora2pg.yaml]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite existing file without confirmation
        #[arg(long, short)]
        force: bool,
    },
}

impl Commands {
    /// Commands that talk to the server need a config file.
    fn needs_server(&self) -> bool {
        matches!(
            self,
            Commands::Login { .. }
                | Commands::Logout
                | Commands::Whoami
                | Commands::Discover { .. }
                | Commands::Progress { .. }
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    // Handle init command separately (doesn't need existing config)
    if let Commands::Init { output, force } = cli.command {
        // No logging setup for wizard - keeps terminal clean for interactive prompts
        let output_path = output.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        wizard::run_wizard(&output_path, force)
            .await
            .map_err(|e| match e {
                wizard::WizardError::Cancelled => MigrateError::Cancelled,
                other => MigrateError::Config(other.to_string()),
            })?;
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let (config, config_path) = load_config(cli.config.as_deref(), cli.command.needs_server())?;
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    match cli.command {
        Commands::Init { .. } => unreachable!(), // Handled above

        Commands::MapType {
            data_type,
            length,
            precision,
            scale,
        } => {
            let resolver = config.type_resolver()?;
            let mapping = resolver.resolve(&data_type, length, precision, scale)?;
            if cli.output_json {
                let out = json!({
                    "oracleType": data_type,
                    "postgresType": mapping.target_type,
                    "isLossy": mapping.is_lossy,
                    "warning": mapping.warning,
                    "hint": mapping.hint,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", mapping.target_type);
                if let Some(warning) = &mapping.warning {
                    eprintln!("warning: {}", warning);
                }
                if let Some(hint) = &mapping.hint {
                    eprintln!("hint: {}", hint);
                }
            }
        }

        Commands::ParseType { data_type } => {
            let parsed = parse_data_type(&data_type);
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                println!("Base type: {}", parsed.base_type);
                if let Some(n) = parsed.length {
                    println!("Length:    {}", n);
                }
                if let Some(n) = parsed.precision {
                    println!("Precision: {}", n);
                }
                if let Some(n) = parsed.scale {
                    println!("Scale:     {}", n);
                }
            }
        }

        Commands::Rules { custom } => {
            let rules = match custom {
                Some(path) => RuleSet::new().with_custom(load_rules_file(&path)?)?,
                None => config.type_resolver()?.rules().clone(),
            };
            let all = rules.all();
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                for rule in &all {
                    let marker = if rule.is_custom() { "  [custom]" } else { "" };
                    println!("{:<32} -> {}{}", rule.oracle_type, rule.postgres_type, marker);
                }
                println!("\n{} rule(s), {} custom", all.len(), rules.custom().len());
            }
        }

        Commands::AutoMap {
            input,
            target_schema,
            naming,
            output,
        } => {
            let tables: Vec<SourceTable> = read_json(&input)?;
            let target_schema =
                target_schema.unwrap_or_else(|| config.mapping.default_target_schema.clone());
            let naming = naming
                .map(|n| NamingStrategy::from_name(&n))
                .unwrap_or(config.mapping.naming_strategy);
            let resolver = config.type_resolver()?;

            let mappings = auto_map_tables(&tables, &target_schema, &resolver, naming)?;
            info!("Mapped {} table(s) into {}", mappings.len(), target_schema);
            write_output(output.as_deref(), &serde_json::to_string_pretty(&mappings)?)?;
        }

        Commands::Search {
            input,
            term,
            page: page_no,
            per_page,
        } => {
            let mappings: Vec<TableMapping> = read_json(&input)?;
            let matches = filter_mappings(&mappings, &term);
            let rows = page(&matches, page_no, per_page);

            if cli.output_json {
                let out = json!({
                    "total": matches.len(),
                    "page": page_no,
                    "totalPages": total_pages(matches.len(), per_page),
                    "mappings": rows,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for mapping in rows {
                    println!(
                        "{} {:<40} -> {:<40} {}",
                        if mapping.enabled { "[x]" } else { "[ ]" },
                        mapping.source_full_name(),
                        mapping.target_full_name(),
                        mapping.status.as_str()
                    );
                }
                println!(
                    "\nPage {} of {} ({} match(es))",
                    page_no,
                    total_pages(matches.len(), per_page),
                    matches.len()
                );
            }
        }

        Commands::ExportDdl {
            input,
            no_sequences,
            no_indexes,
            no_constraints,
            no_views,
            output,
        } => {
            let objects: Vec<SchemaObject> = read_json(&input)?;
            let mut options = config.export;
            options.include_sequences &= !no_sequences;
            options.include_indexes &= !no_indexes;
            options.include_constraints &= !no_constraints;
            options.include_views &= !no_views;

            let script = assemble_export(&objects, &options);
            write_output(output.as_deref(), &script)?;
        }

        Commands::TableDdl { input, output } => {
            let mappings: Vec<TableMapping> = read_json(&input)?;
            let statements = mappings
                .iter()
                .filter(|m| m.enabled)
                .map(table_ddl)
                .collect::<Result<Vec<_>, _>>()?;
            let mut script = statements.join("\n\n");
            if !script.is_empty() {
                script.push('\n');
            }
            write_output(output.as_deref(), &script)?;
        }

        Commands::Login { email, password } => {
            let api = api_client(&config, &config_dir)?;
            let password = match password {
                Some(p) => p,
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()
                    .map_err(|e| MigrateError::Config(e.to_string()))?,
            };
            let user = api.login(&email, &password).await?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("Logged in as {} <{}>", user.name, user.email);
            }
        }

        Commands::Logout => {
            let api = api_client(&config, &config_dir)?;
            api.logout()?;
            println!("Logged out");
        }

        Commands::Whoami => {
            let session = Session::hydrate(config.session_path(&config_dir));
            let user = session.user().ok_or(MigrateError::Unauthorized)?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("{} <{}> ({:?})", user.name, user.email, user.role);
            }
        }

        Commands::Discover { project, filter } => {
            let api = Arc::new(api_client(&config, &config_dir)?);
            let project = api.get_project(&project).await?;
            let connection = project.source_connection.clone().ok_or_else(|| {
                MigrateError::Config(format!("Project {} has no source connection", project.id))
            })?;
            let schema = project
                .source_schema()
                .map(str::to_string)
                .unwrap_or_else(|| connection.username.to_uppercase());

            let mut grid = MappingGrid::new(
                project.id.clone(),
                project.target_schema().to_string(),
                project.table_mappings.clone(),
                api,
            );
            let count = grid
                .discover_tables(&connection, &schema, filter.as_deref())
                .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(grid.tables())?);
            } else {
                println!("Discovered {} table(s) in {}", count, schema);
            }
        }

        Commands::Progress { project, follow } => {
            let api = api_client(&config, &config_dir)?;
            let output_json = cli.output_json;
            let progress = if follow {
                let cancel_token = setup_signal_handler().await?;
                poll_progress(&api, &project, cancel_token, |p| {
                    print_progress(p, output_json)
                })
                .await?
            } else {
                let p = api.migration_progress(&project).await?;
                print_progress(&p, output_json);
                p
            };
            if progress.status == MigrationStatus::Error {
                eprintln!("Migration of project {} failed", project);
            }
        }
    }

    Ok(())
}

/// Load the config file.
///
/// Without `--config`, offline commands fall back to built-in defaults when
/// the default file does not exist. An explicit path must exist.
fn load_config(path: Option<&Path>, required: bool) -> Result<(Config, PathBuf), MigrateError> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !explicit && !required && !path.exists() {
        return Ok((Config::default(), path));
    }

    let config = Config::load(&path)?;
    info!("Loaded configuration from {:?}", path);
    Ok((config, path))
}

fn api_client(config: &Config, config_dir: &Path) -> Result<ApiClient, MigrateError> {
    let session = Arc::new(Session::hydrate(config.session_path(config_dir)));
    ApiClient::new(&config.api, session)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MigrateError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), MigrateError> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn print_progress(progress: &MigrationProgress, output_json: bool) {
    if output_json {
        if let Ok(line) = serde_json::to_string(progress) {
            println!("{}", line);
        }
        return;
    }
    println!(
        "[{}] {}/{} tables, {}/{} rows ({:.1}%){}",
        progress.status,
        progress.completed_tables,
        progress.total_tables,
        progress.migrated_rows,
        progress.total_rows,
        progress.percent(),
        progress
            .current_table
            .as_deref()
            .map(|t| format!(" - {}", t))
            .unwrap_or_default()
    );
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity '{}'", other)),
    };

    // Logs go to stderr so command output on stdout stays pipeable.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Unknown log format '{}'", other)),
    }

    Ok(())
}

/// Setup signal handlers for graceful shutdown.
/// Handles both SIGINT (Ctrl-C) and SIGTERM.
/// Returns a CancellationToken that will be cancelled when a signal is received.
#[cfg(unix)]
async fn setup_signal_handler() -> Result<CancellationToken, MigrateError> {
    let cancel_token = CancellationToken::new();

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let token_int = cancel_token.clone();
    tokio::spawn(async move {
        sigint.recv().await;
        eprintln!("\nReceived SIGINT. Stopping...");
        token_int.cancel();
    });

    let token_term = cancel_token.clone();
    tokio::spawn(async move {
        sigterm.recv().await;
        eprintln!("\nReceived SIGTERM. Stopping...");
        token_term.cancel();
    });

    Ok(cancel_token)
}

/// Setup signal handler for Windows (only Ctrl-C)
#[cfg(not(unix))]
async fn setup_signal_handler() -> Result<CancellationToken, MigrateError> {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl-C. Stopping...");
            token.cancel();
        }
    });

    Ok(cancel_token)
}
