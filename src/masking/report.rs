//! Masking run summaries
//!
//! A [`MaskingSummary`] is produced by every successful `apply()` and records
//! what happened per field. It never contains original or masked values.

use super::rule::MaskingStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for one masked field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    /// Field name
    pub field: String,

    /// Strategy applied
    pub strategy: MaskingStrategy,

    /// Values replaced by the strategy
    pub values_masked: usize,

    /// Null values passed through
    pub nulls_skipped: usize,

    /// Values kept because they did not parse as a date or number
    pub parse_fallbacks: usize,
}

impl FieldReport {
    /// Create a report with zeroed counters
    pub fn new(field: impl Into<String>, strategy: MaskingStrategy) -> Self {
        Self {
            field: field.into(),
            strategy,
            values_masked: 0,
            nulls_skipped: 0,
            parse_fallbacks: 0,
        }
    }
}

/// Result summary of one masking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskingSummary {
    /// Rows in the table
    pub rows: usize,

    /// Fields masked, in policy order
    pub fields: Vec<FieldReport>,

    /// Declared fields that were absent from the table
    pub skipped_fields: Vec<String>,

    /// Reverse-mapping entries recorded
    pub reverse_entries: usize,

    /// Wall-clock duration of the run
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl MaskingSummary {
    /// Create an empty summary for a table of `rows` rows
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            fields: Vec::new(),
            skipped_fields: Vec::new(),
            reverse_entries: 0,
            duration: Duration::ZERO,
        }
    }

    /// Report for `field`, if it was masked
    pub fn field(&self, field: &str) -> Option<&FieldReport> {
        self.fields.iter().find(|r| r.field == field)
    }

    /// Values replaced across all fields
    pub fn total_masked(&self) -> usize {
        self.fields.iter().map(|r| r.values_masked).sum()
    }

    /// Parse fallbacks across all fields
    pub fn total_parse_fallbacks(&self) -> usize {
        self.fields.iter().map(|r| r.parse_fallbacks).sum()
    }

    /// Format for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                       MASKING SUMMARY                         \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!("  Rows:                {}\n", self.rows));
        output.push_str(&format!("  Fields masked:       {}\n", self.fields.len()));
        output.push_str(&format!("  Values masked:       {}\n", self.total_masked()));
        output.push_str(&format!(
            "  Parse fallbacks:     {}\n",
            self.total_parse_fallbacks()
        ));
        output.push_str(&format!("  Reverse entries:     {}\n", self.reverse_entries));
        output.push_str(&format!(
            "  Duration:            {:.2}s\n",
            self.duration.as_secs_f64()
        ));

        if !self.fields.is_empty() {
            output.push('\n');
            output.push_str("  FIELD                          STRATEGY                  MASKED  NULLS  KEPT\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for report in &self.fields {
                output.push_str(&format!(
                    "  {:30} {:25} {:>6} {:>6} {:>5}\n",
                    report.field,
                    report.strategy.as_str(),
                    report.values_masked,
                    report.nulls_skipped,
                    report.parse_fallbacks
                ));
            }
        }

        if !self.skipped_fields.is_empty() {
            output.push('\n');
            output.push_str("⚠️  Fields not present in table (skipped):\n");
            for field in &self.skipped_fields {
                output.push_str(&format!("  • {field}\n"));
            }
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format as pretty JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> MaskingSummary {
        let mut summary = MaskingSummary::new(3);
        let mut email = FieldReport::new("email", MaskingStrategy::EmailMask);
        email.values_masked = 2;
        email.nulls_skipped = 1;
        let mut dob = FieldReport::new("dob", MaskingStrategy::DateShift);
        dob.values_masked = 2;
        dob.parse_fallbacks = 1;
        summary.fields = vec![email, dob];
        summary.skipped_fields = vec!["fax".to_string()];
        summary
    }

    #[test]
    fn test_totals() {
        let summary = summary();
        assert_eq!(summary.total_masked(), 4);
        assert_eq!(summary.total_parse_fallbacks(), 1);
        assert_eq!(summary.field("email").map(|r| r.nulls_skipped), Some(1));
        assert!(summary.field("ssn").is_none());
    }

    #[test]
    fn test_format_console() {
        let output = summary().format_console();
        assert!(output.contains("MASKING SUMMARY"));
        assert!(output.contains("Rows:                3"));
        assert!(output.contains("email_mask"));
        assert!(output.contains("• fax"));
    }

    #[test]
    fn test_format_json() {
        let json = summary().format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fields"][1]["strategy"], "date_shift");
        assert_eq!(value["duration"], 0);
    }
}
