//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TabmaskConfig;
use crate::domain::errors::TabmaskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`TabmaskConfig`]
/// 4. Applies environment variable overrides (`TABMASK_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`TabmaskError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use tabmask::config::loader::load_config;
///
/// let config = load_config("tabmask.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TabmaskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TabmaskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TabmaskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TabmaskConfig = toml::from_str(&contents)
        .map_err(|e| TabmaskError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    finish(config)
}

/// Loads configuration from `path`, or defaults plus environment overrides
/// when the file does not exist
///
/// A file that exists but is invalid is still an error.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<TabmaskConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = TabmaskConfig::default();
    apply_env_overrides(&mut config)?;
    finish(config)
}

fn finish(config: TabmaskConfig) -> Result<TabmaskConfig> {
    config.validate().map_err(|e| {
        TabmaskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid"))
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TabmaskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `TABMASK_*` prefix
///
/// Variables follow the pattern `TABMASK_<SECTION>_<KEY>`, for example
/// `TABMASK_MASKING_SEED` or `TABMASK_IO_CSV_DELIMITER`.
fn apply_env_overrides(config: &mut TabmaskConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("TABMASK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("TABMASK_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Masking overrides
    if let Ok(val) = std::env::var("TABMASK_MASKING_SEED") {
        let seed = val.trim().parse().map_err(|_| {
            TabmaskError::Configuration(format!(
                "TABMASK_MASKING_SEED must be an unsigned integer, got '{val}'"
            ))
        })?;
        config.masking.seed = Some(seed);
    }
    if let Ok(val) = std::env::var("TABMASK_MASKING_REVERSE_MAPPING_PATH") {
        config.masking.reverse_mapping_path = Some(val);
    }

    // I/O overrides
    if let Ok(val) = std::env::var("TABMASK_IO_CSV_DELIMITER") {
        let mut chars = val.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => config.io.csv_delimiter = c,
            _ => {
                return Err(TabmaskError::Configuration(format!(
                    "TABMASK_IO_CSV_DELIMITER must be a single character, got '{val}'"
                )))
            }
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("TABMASK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("TABMASK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
