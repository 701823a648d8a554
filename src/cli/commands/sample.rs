//! Sample command implementation

use crate::adapters::{generate_employee_table, save_table};
use crate::cli::{EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS};
use crate::config::load_config_or_default;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Arguments for the sample command
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Where to write the table (.csv, .json or .xlsx)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of employees
    #[arg(short, long, default_value_t = 50)]
    pub rows: usize,

    /// Seed for reproducible data
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SampleArgs {
    /// Execute the sample command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut rng = match self.seed.or(config.masking.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let table = generate_employee_table(self.rows, &mut rng);

        if let Err(e) = save_table(&table, &self.output, &config.io) {
            tracing::error!(error = %e, "Failed to write sample table");
            eprintln!("Failed to write sample table: {e}");
            return Ok(EXIT_IO);
        }

        tracing::info!(rows = self.rows, output = %self.output.display(), "Sample table written");
        println!(
            "✅ Wrote {} sample employees to {}",
            self.rows,
            self.output.display()
        );
        Ok(EXIT_SUCCESS)
    }
}
