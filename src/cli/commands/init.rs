//! Init command implementation
//!
//! This module implements the `init` command for generating a starter
//! configuration file and masking policy.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use crate::domain::RuleError;
use crate::masking::{EncryptionKey, MaskingPolicy, MaskingRule, RuleDocument};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tabmask.toml")]
    pub output: String,

    /// Path where to create the starter policy
    #[arg(short, long, default_value = "masking_rules.json")]
    pub policy: String,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, policy = %self.policy, "Initializing tabmask files");

        println!("📝 Initializing tabmask configuration");
        println!();

        for path in [&self.output, &self.policy] {
            if Path::new(path).exists() && !self.force {
                println!("❌ File already exists: {path}");
                println!("   Use --force to overwrite");
                return Ok(EXIT_CONFIG);
            }
        }

        if let Err(e) = fs::write(&self.output, Self::generate_config()) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(EXIT_FATAL);
        }
        println!("✅ Configuration file created: {}", self.output);

        let policy = Self::starter_policy(EncryptionKey::generate())?;
        if let Err(e) = policy.save(&self.policy) {
            println!("❌ Failed to write policy");
            println!("   Error: {e}");
            return Ok(EXIT_FATAL);
        }
        println!("✅ Starter policy created: {}", self.policy);

        println!();
        println!("⚠️  {} contains a freshly generated encryption key.", self.policy);
        println!("   Anyone holding it can decrypt the 'ssn' column; store it like a password.");
        println!();
        println!("Next steps:");
        println!("  1. Edit {} to match your table's columns", self.policy);
        println!("  2. Try it on sample data: tabmask sample --output employees.csv");
        println!(
            "  3. Validate: tabmask validate --policy {} --input employees.csv",
            self.policy
        );
        println!(
            "  4. Mask: tabmask mask --input employees.csv --policy {} --output masked.csv",
            self.policy
        );
        println!();
        Ok(EXIT_SUCCESS)
    }

    /// Starter configuration with every setting at its default
    fn generate_config() -> String {
        r#"# Tabmask Configuration File
# Every setting is optional; shown values are the defaults.

[application]
log_level = "info"
dry_run = false

[masking]
# Fixed seed for reproducible fake data and number noise
# seed = 42
# Export masked -> original lookups for encrypted fields
# reverse_mapping_path = "${TABMASK_OUTPUT_DIR}/reverse_mapping.json"
progress_log = true

[io]
csv_delimiter = ","

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }

    /// Policy matching the columns of the sample employee table
    fn starter_policy(key: EncryptionKey) -> Result<MaskingPolicy, RuleError> {
        let mut policy = MaskingPolicy::new();
        policy.set_rule("first_name", MaskingRule::FakeReplace)?;
        policy.set_rule("last_name", MaskingRule::FakeReplace)?;
        policy.set_rule("email", MaskingRule::EmailMask)?;
        policy.set_rule("phone", MaskingRule::PhoneMask)?;
        policy.set_rule("ssn", MaskingRule::ReversibleEncrypt { key })?;
        policy.set_rule("salary", MaskingRule::NumberRandomize)?;
        policy.set_rule_document(
            "date_of_birth",
            &RuleDocument::new("date_shift").with_option("shift_days", 30),
        )?;
        policy.set_rule_document(
            "address",
            &RuleDocument::new("partial_mask")
                .with_option("keep_first", 4)
                .with_option("keep_last", 0),
        )?;
        Ok(policy)
    }
}
