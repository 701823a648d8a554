//! Configuration schema types
//!
//! Every section and every key is optional; an empty file yields the
//! defaults.

use serde::{Deserialize, Serialize};

/// Main tabmask configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabmaskConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Masking run settings
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Table file settings
    #[serde(default)]
    pub io: IoConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TabmaskConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.masking.validate()?;
        self.io.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (mask and report, but write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Masking run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskingConfig {
    /// Seed for fake data and number noise; unset means a fresh seed per run
    #[serde(default)]
    pub seed: Option<u64>,

    /// Where to export the reverse mapping after a run
    #[serde(default)]
    pub reverse_mapping_path: Option<String>,

    /// Log a progress line after every field
    #[serde(default = "default_true")]
    pub progress_log: bool,
}

impl MaskingConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.reverse_mapping_path {
            if path.trim().is_empty() {
                return Err("masking.reverse_mapping_path cannot be empty when set".to_string());
            }
        }
        Ok(())
    }
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            reverse_mapping_path: None,
            progress_log: true,
        }
    }
}

/// Table file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoConfig {
    /// Field delimiter for delimited text files
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
}

impl IoConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.csv_delimiter.is_ascii() || self.csv_delimiter.is_ascii_alphanumeric() {
            return Err(format!(
                "Invalid io.csv_delimiter '{}'. Must be a single ASCII punctuation or whitespace character",
                self.csv_delimiter
            ));
        }
        if matches!(self.csv_delimiter, '"' | '\n' | '\r') {
            return Err("io.csv_delimiter cannot be a quote or line break".to_string());
        }
        Ok(())
    }

    /// Delimiter as a byte for the CSV reader/writer
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.csv_delimiter).unwrap_or(b',')
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_csv_delimiter() -> char {
    ','
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: TabmaskConfig = toml::from_str("").unwrap();
        assert_eq!(config, TabmaskConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.io.delimiter_byte(), b',');
        assert!(config.masking.progress_log);
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_io_delimiter_validation() {
        let mut config = IoConfig { csv_delimiter: ';' };
        assert!(config.validate().is_ok());
        assert_eq!(config.delimiter_byte(), b';');

        config.csv_delimiter = '\t';
        assert!(config.validate().is_ok());

        config.csv_delimiter = 'x';
        assert!(config.validate().is_err());

        config.csv_delimiter = '"';
        assert!(config.validate().is_err());

        config.csv_delimiter = '§';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut config = LoggingConfig::default();
        config.local_rotation = "hourly".to_string();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("daily, hourly, never"));
    }

    #[test]
    fn test_masking_section_parses() {
        let config: TabmaskConfig = toml::from_str(
            r#"
[masking]
seed = 42
reverse_mapping_path = "out/reverse.json"
progress_log = false
"#,
        )
        .unwrap();
        assert_eq!(config.masking.seed, Some(42));
        assert_eq!(
            config.masking.reverse_mapping_path.as_deref(),
            Some("out/reverse.json")
        );
        assert!(!config.masking.progress_log);
    }

    #[test]
    fn test_blank_reverse_path_rejected() {
        let mut config = TabmaskConfig::default();
        config.masking.reverse_mapping_path = Some("  ".to_string());
        assert!(config.validate().is_err());
    }
}
