//! Masking engine
//!
//! [`MaskingEngine`] applies a [`MaskingPolicy`] to a [`Table`] and returns a
//! new table; the input is never modified.
//!
//! # Behavior
//!
//! 1. Rules run in policy order. A declared field missing from the table is
//!    skipped without error.
//! 2. Each present field is transformed value by value, in row order.
//! 3. A progress event follows every declared field, present or not.
//! 4. The first transform failure aborts the run; no partial table is
//!    returned and the reverse store is left untouched.
//! 5. Reverse entries are staged during the run and committed to the
//!    [`ReversibleStore`] only once every field has succeeded.
//!
//! # Examples
//!
//! ```
//! use tabmask::domain::{Column, Scalar, Table};
//! use tabmask::masking::{MaskingEngine, MaskingPolicy, MaskingRule, NoProgress, ReversibleStore};
//!
//! # fn example() -> anyhow::Result<()> {
//! let table = Table::new(vec![Column::new(
//!     "email",
//!     vec![Scalar::from("alice@example.com")],
//! )])?;
//!
//! let mut policy = MaskingPolicy::new();
//! policy.set_rule("email", MaskingRule::EmailMask)?;
//!
//! let store = ReversibleStore::new();
//! let outcome = MaskingEngine::with_seed(7).apply(&table, &policy, &store, &mut NoProgress)?;
//!
//! assert_eq!(
//!     outcome.table.column("email").unwrap().values()[0],
//!     Scalar::from("a***e@example.com")
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use super::policy::MaskingPolicy;
use super::report::{FieldReport, MaskingSummary};
use super::rule::MaskingRule;
use super::store::ReversibleStore;
use super::transform::{TransformOutcome, ValueTransformer};
use crate::domain::{Column, MaskingError, Scalar, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tokio::sync::watch;

/// Progress after one declared field
#[derive(Debug, Clone, PartialEq)]
pub struct MaskingProgress {
    /// Field just processed (or skipped)
    pub field: String,

    /// Declared fields processed so far, including this one
    pub fields_done: usize,

    /// Declared fields in the policy
    pub total_fields: usize,

    /// `fields_done / total_fields`
    pub fraction: f64,
}

/// Receives progress events from the engine
pub trait ProgressSink {
    fn on_progress(&mut self, progress: &MaskingProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&MaskingProgress),
{
    fn on_progress(&mut self, progress: &MaskingProgress) {
        self(progress)
    }
}

/// Discards progress events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: &MaskingProgress) {}
}

/// Emits every progress event as a log line
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProgress;

impl ProgressSink for LoggingProgress {
    fn on_progress(&mut self, progress: &MaskingProgress) {
        tracing::info!(
            field = %progress.field,
            fields_done = progress.fields_done,
            total_fields = progress.total_fields,
            percent = (progress.fraction * 100.0).round() as u64,
            "Masking progress"
        );
    }
}

/// Masked table and run summary
#[derive(Debug, Clone)]
pub struct MaskingOutcome {
    pub table: Table,
    pub summary: MaskingSummary,
}

/// Applies masking policies to tables
///
/// The engine owns the random generator used by `fake_replace` and
/// `number_randomize`; seed it for reproducible output.
pub struct MaskingEngine {
    rng: StdRng,
}

impl MaskingEngine {
    /// Engine seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Engine with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fixed seed when given, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::with_seed).unwrap_or_default()
    }

    /// Apply `policy` to `table`
    ///
    /// # Errors
    ///
    /// Returns [`MaskingError::Failure`] naming the field whose transform
    /// failed.
    pub fn apply<P>(
        &mut self,
        table: &Table,
        policy: &MaskingPolicy,
        store: &ReversibleStore,
        progress: &mut P,
    ) -> Result<MaskingOutcome, MaskingError>
    where
        P: ProgressSink + ?Sized,
    {
        self.run(table, policy, store, progress, None)
    }

    /// Apply `policy` to `table`, checking `shutdown` between fields
    ///
    /// # Errors
    ///
    /// In addition to [`apply`](Self::apply)'s errors, returns
    /// [`MaskingError::Cancelled`] once the shutdown flag is set.
    pub fn apply_with_shutdown<P>(
        &mut self,
        table: &Table,
        policy: &MaskingPolicy,
        store: &ReversibleStore,
        progress: &mut P,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<MaskingOutcome, MaskingError>
    where
        P: ProgressSink + ?Sized,
    {
        self.run(table, policy, store, progress, Some(shutdown))
    }

    fn run<P>(
        &mut self,
        table: &Table,
        policy: &MaskingPolicy,
        store: &ReversibleStore,
        progress: &mut P,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<MaskingOutcome, MaskingError>
    where
        P: ProgressSink + ?Sized,
    {
        let start = Instant::now();
        let rows = table.row_count();
        let total_fields = policy.len();
        let mut summary = MaskingSummary::new(rows);

        if policy.is_empty() {
            tracing::debug!(rows, "Empty policy, table returned unchanged");
            summary.duration = start.elapsed();
            return Ok(MaskingOutcome {
                table: table.clone(),
                summary,
            });
        }

        tracing::info!(rows, fields = total_fields, "Starting masking run");

        let mut columns: Vec<Column> = table.columns().to_vec();
        let mut staged: Vec<(String, Vec<(String, String)>)> = Vec::new();

        for (index, (field, rule)) in policy.rules().enumerate() {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                tracing::warn!(
                    fields_done = index,
                    total_fields,
                    "Shutdown requested, masking run abandoned"
                );
                return Err(MaskingError::Cancelled {
                    fields_done: index,
                    total_fields,
                });
            }

            match columns.iter_mut().find(|c| c.name() == field) {
                Some(column) => {
                    let masked = self.mask_column(field, rule, column.values())?;
                    column.replace_values(masked.values);
                    if !masked.reverse.is_empty() {
                        staged.push((field.to_string(), masked.reverse));
                    }
                    summary.fields.push(masked.report);
                }
                None => {
                    tracing::debug!(field, "Field not present in table, skipped");
                    summary.skipped_fields.push(field.to_string());
                }
            }

            let fields_done = index + 1;
            progress.on_progress(&MaskingProgress {
                field: field.to_string(),
                fields_done,
                total_fields,
                fraction: fields_done as f64 / total_fields as f64,
            });
        }

        for (field, entries) in staged {
            summary.reverse_entries += entries.len();
            store.commit(&field, entries);
        }

        summary.duration = start.elapsed();
        tracing::info!(
            rows,
            fields_masked = summary.fields.len(),
            fields_skipped = summary.skipped_fields.len(),
            values_masked = summary.total_masked(),
            reverse_entries = summary.reverse_entries,
            duration_ms = summary.duration.as_millis() as u64,
            "Masking run complete"
        );

        Ok(MaskingOutcome {
            table: Table::from_derived(columns, rows),
            summary,
        })
    }

    fn mask_column(
        &mut self,
        field: &str,
        rule: &MaskingRule,
        values: &[Scalar],
    ) -> Result<MaskedColumn, MaskingError> {
        let mut transformer = ValueTransformer::new(field, rule);
        let mut report = FieldReport::new(field, rule.strategy());
        let mut reverse = Vec::new();
        let mut masked = Vec::with_capacity(values.len());

        for value in values {
            let transformed = transformer
                .transform(value, &mut self.rng, &mut reverse)
                .map_err(|source| {
                    tracing::error!(
                        field,
                        strategy = %rule.strategy(),
                        error = %source,
                        "Masking failed, run aborted"
                    );
                    MaskingError::Failure {
                        field: field.to_string(),
                        source,
                    }
                })?;

            match transformed.outcome {
                TransformOutcome::Masked => report.values_masked += 1,
                TransformOutcome::NullSkipped => report.nulls_skipped += 1,
                TransformOutcome::ParseFallback => report.parse_fallbacks += 1,
            }
            masked.push(transformed.value);
        }

        if report.parse_fallbacks > 0 {
            tracing::debug!(
                field,
                strategy = %rule.strategy(),
                count = report.parse_fallbacks,
                "Unparsable values kept unchanged"
            );
        }

        Ok(MaskedColumn {
            values: masked,
            report,
            reverse,
        })
    }
}

impl Default for MaskingEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct MaskedColumn {
    values: Vec<Scalar>,
    report: FieldReport,
    reverse: Vec<(String, String)>,
}
