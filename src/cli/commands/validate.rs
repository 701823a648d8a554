//! Validate command implementation
//!
//! This module implements the `validate` command: check a policy document
//! and, when an input table is given, report declared fields the table
//! does not have.

use crate::adapters::load_table;
use crate::cli::{EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS};
use crate::config::load_config_or_default;
use crate::masking::MaskingPolicy;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Policy document to validate
    #[arg(short, long)]
    pub policy: PathBuf,

    /// Table to check the policy's fields against
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(policy = %self.policy.display(), "Validating policy");

        println!("🔍 Validating policy: {}", self.policy.display());
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIG);
        }

        let policy = match MaskingPolicy::load(&self.policy) {
            Ok(p) => {
                println!("✅ Policy is valid ({} rules)", p.len());
                p
            }
            Err(e) => {
                println!("❌ Policy validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!();
        println!("Rules:");
        for (field, rule) in &policy {
            let marker = if rule.strategy().is_reversible() {
                " (reversible)"
            } else {
                ""
            };
            println!("  {field}: {rule}{marker}");
        }

        if let Some(input) = &self.input {
            let table = match load_table(input, &config.io) {
                Ok(t) => t,
                Err(e) => {
                    println!();
                    println!("❌ Failed to load table {}", input.display());
                    println!("   Error: {e}");
                    return Ok(EXIT_IO);
                }
            };

            let missing = missing_fields(&policy, &table.column_names());
            println!();
            if missing.is_empty() {
                println!(
                    "✅ All {} fields present in {} ({} rows)",
                    policy.len(),
                    input.display(),
                    table.row_count()
                );
            } else {
                tracing::warn!(missing = missing.len(), "Policy fields absent from table");
                println!("⚠️  Fields not present in {} (will be skipped):", input.display());
                for field in &missing {
                    println!("  • {field}");
                }
            }
        }

        println!();
        Ok(EXIT_SUCCESS)
    }
}

/// Declared fields that are not column names, in policy order
pub fn missing_fields<'a>(policy: &'a MaskingPolicy, columns: &[&str]) -> Vec<&'a str> {
    policy
        .fields()
        .filter(|field| !columns.contains(field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masking::MaskingRule;

    #[test]
    fn test_missing_fields_in_policy_order() {
        let mut policy = MaskingPolicy::new();
        policy.set_rule("phone", MaskingRule::PhoneMask).unwrap();
        policy.set_rule("email", MaskingRule::EmailMask).unwrap();
        policy.set_rule("ssn", MaskingRule::SsnMask).unwrap();

        assert_eq!(missing_fields(&policy, &["email"]), vec!["phone", "ssn"]);
        assert!(missing_fields(&policy, &["ssn", "email", "phone"]).is_empty());
    }
}
