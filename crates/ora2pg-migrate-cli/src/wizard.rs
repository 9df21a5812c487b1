//! Interactive configuration wizard for creating/editing config files.

use dialoguer::{Confirm, Input, Password, Select};
use ora2pg_migrate::config::{ApiConfig, MappingConfig, SessionConfig};
use ora2pg_migrate::ddl::ExportOptions;
use ora2pg_migrate::typemap::UnmappedTypePolicy;
use ora2pg_migrate::{ApiClient, Config, NamingStrategy, Session};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result type for wizard operations.
pub type WizardResult<T> = Result<T, WizardError>;

/// Errors that can occur during wizard execution.
#[derive(Debug)]
pub enum WizardError {
    /// User cancelled the wizard.
    Cancelled,
    /// IO error (file read/write).
    Io(std::io::Error),
    /// Config serialization error.
    Config(String),
    /// Validation error.
    Validation(String),
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Configuration cancelled"),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for WizardError {}

impl From<std::io::Error> for WizardError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<dialoguer::Error> for WizardError {
    fn from(e: dialoguer::Error) -> Self {
        Self::Io(std::io::Error::other(e.to_string()))
    }
}

/// Action to take when config file already exists.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExistingFileAction {
    Edit,
    Overwrite,
    Abort,
}

const NAMING_STRATEGIES: [NamingStrategy; 6] = [
    NamingStrategy::Lowercase,
    NamingStrategy::Uppercase,
    NamingStrategy::Original,
    NamingStrategy::CamelCase,
    NamingStrategy::SnakeCase,
    NamingStrategy::PascalCase,
];

const NAMING_LABELS: [&str; 6] = [
    "lowercase",
    "UPPERCASE",
    "Original",
    "camelCase",
    "snake_case",
    "PascalCase",
];

/// Run the configuration wizard.
pub async fn run_wizard(output: &Path, force: bool) -> WizardResult<()> {
    println!();
    println!("Oracle to PostgreSQL Migration - Configuration Wizard");
    println!("======================================================");
    println!();

    let existing_config = if output.exists() && !force {
        match prompt_existing_file_action(output)? {
            ExistingFileAction::Edit => {
                println!("Loading existing configuration...");
                match Config::load(output) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        println!("Warning: Could not parse existing file: {}", e);
                        println!("Starting with fresh configuration.\n");
                        None
                    }
                }
            }
            ExistingFileAction::Overwrite => {
                println!("Starting with fresh configuration.\n");
                None
            }
            ExistingFileAction::Abort => {
                return Err(WizardError::Cancelled);
            }
        }
    } else {
        None
    };
    let existing = existing_config.unwrap_or_default();

    let api = prompt_api_config(&existing.api)?;
    let session = prompt_session_config(&existing.session)?;
    let mapping = prompt_mapping_config(&existing.mapping)?;
    let export = prompt_export_options(&existing.export)?;

    let config = Config {
        api,
        session,
        mapping,
        export,
    };

    if let Err(e) = config.validate() {
        return Err(WizardError::Validation(e.to_string()));
    }

    print_summary(&config);

    if prompt_login_test()? {
        test_login(&config, output).await?;
    }

    if !prompt_save_confirm(output)? {
        return Err(WizardError::Cancelled);
    }

    write_config(&config, output)?;

    println!("\nConfiguration saved to {}", output.display());
    println!("Run 'ora2pg-migrate login --email <EMAIL>' to sign in.");

    Ok(())
}

fn prompt_existing_file_action(path: &Path) -> WizardResult<ExistingFileAction> {
    println!("File already exists: {}\n", path.display());

    let options = &["Edit existing configuration", "Overwrite with new", "Abort"];
    let selection = Select::new()
        .with_prompt("What would you like to do?")
        .items(options)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => ExistingFileAction::Edit,
        1 => ExistingFileAction::Overwrite,
        _ => ExistingFileAction::Abort,
    })
}

fn prompt_api_config(existing: &ApiConfig) -> WizardResult<ApiConfig> {
    println!("Migration Server");
    println!("----------------");

    let base_url: String = Input::new()
        .with_prompt("  API base URL")
        .default(existing.base_url.clone())
        .interact_text()?;

    let timeout_secs: u64 = Input::new()
        .with_prompt("  Request timeout (seconds)")
        .default(existing.timeout_secs)
        .interact_text()?;

    println!();
    Ok(ApiConfig {
        base_url: base_url.trim().trim_end_matches('/').to_string(),
        timeout_secs,
    })
}

fn prompt_session_config(existing: &SessionConfig) -> WizardResult<SessionConfig> {
    println!("Session");
    println!("-------");

    let default_path = existing
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let input: String = Input::new()
        .with_prompt("  Session file (blank for default)")
        .default(default_path)
        .allow_empty(true)
        .interact_text()?;

    println!();
    Ok(SessionConfig {
        path: non_empty_path(&input),
    })
}

fn prompt_mapping_config(existing: &MappingConfig) -> WizardResult<MappingConfig> {
    println!("Mapping Settings");
    println!("----------------");

    let default_target_schema: String = Input::new()
        .with_prompt("  Default target schema")
        .default(existing.default_target_schema.clone())
        .interact_text()?;

    let naming_idx = Select::new()
        .with_prompt("  Column naming strategy")
        .items(&NAMING_LABELS)
        .default(naming_index(existing.naming_strategy))
        .interact()?;

    let policies = &[
        "Map to TEXT and warn",
        "Fail on unmapped types",
    ];
    let policy_default = match existing.unmapped_type_policy {
        UnmappedTypePolicy::Text => 0,
        UnmappedTypePolicy::Error => 1,
    };
    let policy_idx = Select::new()
        .with_prompt("  Unmapped Oracle types")
        .items(policies)
        .default(policy_default)
        .interact()?;

    let rules_default = existing
        .custom_rules_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let rules_input: String = Input::new()
        .with_prompt("  Custom rules file (blank for none)")
        .default(rules_default)
        .allow_empty(true)
        .interact_text()?;

    println!();
    Ok(MappingConfig {
        default_target_schema: default_target_schema.trim().to_string(),
        naming_strategy: NAMING_STRATEGIES[naming_idx],
        unmapped_type_policy: if policy_idx == 1 {
            UnmappedTypePolicy::Error
        } else {
            UnmappedTypePolicy::Text
        },
        custom_rules_file: non_empty_path(&rules_input),
    })
}

fn prompt_export_options(existing: &ExportOptions) -> WizardResult<ExportOptions> {
    println!("DDL Export");
    println!("----------");

    let include_sequences = Confirm::new()
        .with_prompt("  Include sequences")
        .default(existing.include_sequences)
        .interact()?;
    let include_indexes = Confirm::new()
        .with_prompt("  Include indexes")
        .default(existing.include_indexes)
        .interact()?;
    let include_constraints = Confirm::new()
        .with_prompt("  Include constraints")
        .default(existing.include_constraints)
        .interact()?;
    let include_views = Confirm::new()
        .with_prompt("  Include views")
        .default(existing.include_views)
        .interact()?;

    println!();
    Ok(ExportOptions {
        include_sequences,
        include_indexes,
        include_constraints,
        include_views,
    })
}

fn naming_index(strategy: NamingStrategy) -> usize {
    NAMING_STRATEGIES
        .iter()
        .position(|&s| s == strategy)
        .unwrap_or(0)
}

fn non_empty_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

fn print_summary(config: &Config) {
    println!("Configuration Summary");
    println!("---------------------");
    println!(
        "  Server: {} (timeout {}s)",
        config.api.base_url, config.api.timeout_secs
    );
    if let Some(path) = &config.session.path {
        println!("  Session file: {}", path.display());
    }
    println!(
        "  Target schema: {} (naming: {:?}, unmapped: {:?})",
        config.mapping.default_target_schema,
        config.mapping.naming_strategy,
        config.mapping.unmapped_type_policy
    );
    if let Some(path) = &config.mapping.custom_rules_file {
        println!("  Custom rules: {}", path.display());
    }

    let mut sections = Vec::new();
    if config.export.include_sequences {
        sections.push("sequences");
    }
    if config.export.include_indexes {
        sections.push("indexes");
    }
    if config.export.include_constraints {
        sections.push("constraints");
    }
    if config.export.include_views {
        sections.push("views");
    }
    if !sections.is_empty() {
        println!("  Export: {}", sections.join(", "));
    }

    println!();
}

fn prompt_login_test() -> WizardResult<bool> {
    Ok(Confirm::new()
        .with_prompt("Log in to the server now?")
        .default(false)
        .interact()?)
}

async fn test_login(config: &Config, output: &Path) -> WizardResult<()> {
    let email: String = Input::new().with_prompt("  Email").interact_text()?;
    let password: String = Password::new().with_prompt("  Password").interact()?;

    let config_dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let session = Arc::new(Session::hydrate(config.session_path(config_dir)));

    println!("\nLogging in...");
    let api = match ApiClient::new(&config.api, session) {
        Ok(api) => api,
        Err(e) => {
            println!("  Failed to create client: {}", e);
            println!();
            return Ok(());
        }
    };

    match api.login(&email, &password).await {
        Ok(user) => println!("  Logged in as {} <{}>", user.name, user.email),
        Err(e) => println!("  Login failed: {}", e),
    }

    println!();
    Ok(())
}

fn prompt_save_confirm(path: &Path) -> WizardResult<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Save to {}?", path.display()))
        .default(true)
        .interact()?)
}

fn write_config(config: &Config, path: &Path) -> WizardResult<()> {
    let header = r#"# Oracle to PostgreSQL Migration Configuration
# Generated by ora2pg-migrate init

"#;

    let yaml = config.to_yaml().map_err(|e| WizardError::Config(e.to_string()))?;

    std::fs::write(path, format!("{}{}", header, yaml))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_naming_tables_line_up() {
        for (i, strategy) in NAMING_STRATEGIES.iter().enumerate() {
            assert_eq!(naming_index(*strategy), i);
            assert_eq!(NamingStrategy::from_name(NAMING_LABELS[i]), *strategy);
        }
    }

    #[test]
    fn test_non_empty_path() {
        assert_eq!(non_empty_path("   "), None);
        assert_eq!(non_empty_path(" rules.json "), Some(PathBuf::from("rules.json")));
    }

    #[test]
    fn test_written_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ora2pg.yaml");
        let mut config = Config::default();
        config.mapping.default_target_schema = "hr".into();
        config.mapping.naming_strategy = NamingStrategy::SnakeCase;
        config.export.include_views = false;

        write_config(&config, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Oracle to PostgreSQL Migration Configuration"));

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.mapping, config.mapping);
        assert_eq!(loaded.export, config.export);
    }
}
