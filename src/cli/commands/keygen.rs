//! Keygen command implementation

use crate::cli::EXIT_SUCCESS;
use crate::masking::generate_key;
use clap::Args;

/// Arguments for the keygen command
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Number of keys to print
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,
}

impl KeygenArgs {
    /// Execute the keygen command
    ///
    /// Keys go to stdout one per line and nothing else does, so the output
    /// can be piped straight into a policy or a secret store.
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::debug!(count = self.count, "Generating encryption keys");
        for key in self.keys() {
            println!("{key}");
        }
        Ok(EXIT_SUCCESS)
    }

    fn keys(&self) -> Vec<String> {
        (0..self.count).map(|_| generate_key()).collect()
    }
}
