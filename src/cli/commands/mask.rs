//! Mask command implementation
//!
//! This module implements the `mask` command: load a table, apply a policy,
//! write the masked table and optionally the reverse mapping.
//!
//! The masked table is first written next to its destination and only moved
//! into place once the reverse mapping (if any) has been exported, so a
//! failed run never leaves a masked table behind.

use crate::adapters::{format_for_path, load_table, save_table};
use crate::cli::{exit_code, EXIT_CANCELLED, EXIT_SUCCESS};
use crate::config::{load_config_or_default, IoConfig};
use crate::domain::{Table, TabmaskError};
use crate::masking::{
    LoggingProgress, MaskingEngine, MaskingPolicy, NoProgress, ProgressSink, ReversibleStore,
};
use crate::{log_error_with_context, log_masking_complete, log_masking_start};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

const PREVIEW_CELL_WIDTH: usize = 20;
const STAGING_PREFIX: &str = ".tabmask-partial-";

/// Arguments for the mask command
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Table to mask (.csv, .json or .xlsx)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Policy document (JSON)
    #[arg(short, long)]
    pub policy: PathBuf,

    /// Where to write the masked table (.csv, .json or .xlsx)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Export the reverse mapping of encrypted values to this file
    #[arg(long, value_name = "PATH")]
    pub reverse_mapping: Option<PathBuf>,

    /// Seed for fake data and number noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Mask and report without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json_summary: bool,

    /// Print the first ROWS rows before and after masking
    #[arg(long, value_name = "ROWS", num_args = 0..=1, default_missing_value = "20")]
    pub preview: Option<usize>,
}

/// Everything a run needs once configuration, policy and input are loaded
struct PreparedRun {
    table: Table,
    policy: MaskingPolicy,
    io: IoConfig,
    reverse_path: Option<PathBuf>,
    seed: Option<u64>,
    dry_run: bool,
    progress_log: bool,
}

impl MaskArgs {
    /// Execute the mask command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting mask command");

        let run = match self.prepare(config_path) {
            Ok(run) => run,
            Err(e) => return Ok(report_failure(&e, "Preparing mask run")),
        };

        if run.dry_run {
            tracing::info!("Dry run mode enabled - no files will be written");
            println!("🔍 DRY RUN MODE - No files will be written");
            println!();
        }

        log_masking_start!(self.input.display(), run.policy.len());
        println!(
            "🚀 Masking {} rows with {} rules...",
            run.table.row_count(),
            run.policy.len()
        );

        let table = Arc::new(run.table);
        let policy = run.policy;
        let store = Arc::new(ReversibleStore::new());
        let task_table = Arc::clone(&table);
        let task_store = Arc::clone(&store);
        let (seed, progress_log) = (run.seed, run.progress_log);

        let result = tokio::task::spawn_blocking(move || {
            let mut engine = MaskingEngine::from_seed(seed);
            let mut progress: Box<dyn ProgressSink + Send> = if progress_log {
                Box::new(LoggingProgress)
            } else {
                Box::new(NoProgress)
            };
            engine.apply_with_shutdown(
                &task_table,
                &policy,
                &task_store,
                progress.as_mut(),
                &shutdown_signal,
            )
        })
        .await?;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => return Ok(report_failure(&TabmaskError::from(e), "Applying policy")),
        };

        if let Some(rows) = self.preview {
            println!();
            println!("{}", format_preview("Original", &table, rows));
            println!("{}", format_preview("Masked", &outcome.table, rows));
        }

        if !run.dry_run {
            if let Err(e) =
                self.write_outputs(&outcome.table, &store, run.reverse_path.as_deref(), &run.io)
            {
                return Ok(report_failure(&e, "Writing masked table"));
            }
        }

        log_masking_complete!(
            outcome.summary.rows,
            outcome.summary.fields.len(),
            outcome.summary.duration
        );

        println!();
        if self.json_summary {
            println!("{}", outcome.summary.format_json()?);
        } else {
            println!("{}", outcome.summary.format_console());
        }

        Ok(EXIT_SUCCESS)
    }

    fn prepare(&self, config_path: &str) -> Result<PreparedRun, TabmaskError> {
        let config = load_config_or_default(config_path)?;
        let policy = MaskingPolicy::load(&self.policy)?;
        format_for_path(&self.output)?;
        let table = load_table(&self.input, &config.io)?;

        Ok(PreparedRun {
            table,
            policy,
            reverse_path: self
                .reverse_mapping
                .clone()
                .or_else(|| config.masking.reverse_mapping_path.as_ref().map(PathBuf::from)),
            seed: self.seed.or(config.masking.seed),
            dry_run: self.dry_run || config.application.dry_run,
            progress_log: config.masking.progress_log,
            io: config.io,
        })
    }

    /// Stage the table, export the reverse mapping, then move the table into place
    fn write_outputs(
        &self,
        table: &Table,
        store: &ReversibleStore,
        reverse_path: Option<&Path>,
        io: &IoConfig,
    ) -> Result<(), TabmaskError> {
        let staging = staging_path(&self.output);

        if let Err(e) = save_table(table, &staging, io) {
            discard(&staging);
            return Err(e.into());
        }

        let exported = match reverse_path {
            Some(path) if !store.is_empty() => {
                if let Err(e) = store.export_to_file(path) {
                    discard(&staging);
                    return Err(TabmaskError::Io(format!(
                        "failed to write reverse mapping {}: {e}",
                        path.display()
                    )));
                }
                Some(path)
            }
            Some(_) => {
                tracing::info!("No reversible values produced, reverse mapping not written");
                None
            }
            None => None,
        };

        if let Err(e) = fs::rename(&staging, &self.output) {
            discard(&staging);
            return Err(TabmaskError::Io(format!(
                "failed to move masked table into {}: {e}",
                self.output.display()
            )));
        }

        println!("✅ Masked table written to {}", self.output.display());
        if let Some(path) = exported {
            println!("🔑 Reverse mapping written to {}", path.display());
        }
        Ok(())
    }
}

/// Log a failed run and pick its exit code
fn report_failure(error: &TabmaskError, context: &str) -> i32 {
    let code = exit_code(error);
    if code == EXIT_CANCELLED {
        tracing::warn!(error = %error, "Masking cancelled");
        println!("⚠️  {error}; nothing was written");
    } else {
        log_error_with_context!(error, context);
        eprintln!("❌ {error}");
    }
    code
}

/// Sibling of `output` that keeps its extension
fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{STAGING_PREFIX}{name}"))
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Could not remove staged table");
        }
    }
}

/// Render the first `limit` rows of `table` as an aligned text grid
///
/// Long cells are cut to a fixed width; nulls are blank.
pub fn format_preview(title: &str, table: &Table, limit: usize) -> String {
    let shown = limit.min(table.row_count());

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(shown + 1);
    grid.push(table.column_names().into_iter().map(fit_cell).collect());
    for row in table.rows().take(shown) {
        grid.push(row.into_iter().map(|value| fit_cell(&value.to_string())).collect());
    }

    let widths: Vec<usize> = (0..table.column_count())
        .map(|i| grid.iter().map(|r| r[i].chars().count()).max().unwrap_or(0))
        .collect();

    let mut output = format!(
        "  {title} (first {shown} of {} rows)\n",
        table.row_count()
    );
    for (index, row) in grid.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        output.push_str("  ");
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
        if index == 0 {
            let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            output.push_str(&format!("  {}\n", "─".repeat(rule)));
        }
    }
    output
}

fn fit_cell(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CELL_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, Scalar};

    fn customers() -> Table {
        Table::new(vec![
            Column::new("id", vec![Scalar::from(1_i64), Scalar::from(2_i64), Scalar::from(3_i64)]),
            Column::new(
                "email",
                vec![
                    Scalar::from("alice@example.com"),
                    Scalar::Null,
                    Scalar::from("carol@example.com"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_mask_args_debug() {
        let args = MaskArgs {
            input: PathBuf::from("in.csv"),
            policy: PathBuf::from("rules.json"),
            output: PathBuf::from("out.csv"),
            reverse_mapping: None,
            seed: Some(1),
            dry_run: true,
            json_summary: false,
            preview: None,
        };
        assert!(format!("{args:?}").contains("in.csv"));
    }

    #[test]
    fn test_preview_shows_leading_rows_only() {
        let preview = format_preview("Original", &customers(), 2);
        assert_eq!(
            preview,
            "  Original (first 2 of 3 rows)\n\
             \x20 id  email\n\
             \x20 ─────────────────────\n\
             \x20 1   alice@example.com\n\
             \x20 2\n"
        );
        assert!(!preview.contains("carol"));
    }

    #[test]
    fn test_preview_limit_larger_than_table() {
        let preview = format_preview("Masked", &customers(), 20);
        assert!(preview.starts_with("  Masked (first 3 of 3 rows)\n"));
        assert!(preview.contains("carol@example.com"));
    }

    #[test]
    fn test_long_cells_are_cut() {
        let cell = fit_cell("a-very-long-street-address-line");
        assert_eq!(cell.chars().count(), PREVIEW_CELL_WIDTH);
        assert!(cell.ends_with('…'));
        assert_eq!(fit_cell("short"), "short");
    }

    #[test]
    fn test_staging_path_keeps_extension() {
        assert_eq!(
            staging_path(Path::new("out/masked.xlsx")),
            PathBuf::from("out/.tabmask-partial-masked.xlsx")
        );
        assert_eq!(
            staging_path(Path::new("masked.csv")),
            PathBuf::from(".tabmask-partial-masked.csv")
        );
    }
}
