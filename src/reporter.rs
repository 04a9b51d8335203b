use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    converter::{ConversionOutcome, EntityStats, RelationStats, ENTITIES_FILE, RELATIONS_FILE},
    schema::SchemaVariant,
};

/// Reporter for summarizing a conversion run in various formats
pub struct ConversionReporter {
    output_format: ReportFormat,
}

/// Available output formats for conversion reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Yaml,
}

/// Outcome of one conversion phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary<T> {
    pub output: String,
    pub succeeded: bool,
    pub stats: Option<T>,
    pub error: Option<String>,
}

/// Summary of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub schema: SchemaVariant,
    pub entities: PhaseSummary<EntityStats>,
    pub relations: PhaseSummary<RelationStats>,
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        self.entities.succeeded && self.relations.succeeded
    }
}

impl ConversionReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Console,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Build a report from the outcome of a run into `output_dir`
    pub fn generate_report(
        &self,
        schema: SchemaVariant,
        output_dir: &Path,
        outcome: &ConversionOutcome,
    ) -> ConversionReport {
        ConversionReport {
            schema,
            entities: phase_summary(output_dir, ENTITIES_FILE, &outcome.entities),
            relations: phase_summary(output_dir, RELATIONS_FILE, &outcome.relations),
        }
    }

    /// Format the report according to the configured output format
    pub fn format_report(&self, report: &ConversionReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Console => Ok(self.format_console_report(report)),
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| ReportError::SerializationError(e.to_string())),
            ReportFormat::Yaml => serde_yaml::to_string(report)
                .map_err(|e| ReportError::SerializationError(e.to_string())),
        }
    }

    fn format_console_report(&self, report: &ConversionReport) -> String {
        let mut output = String::new();

        output.push_str("\n=== Conversion Report ===\n");
        output.push_str(&format!("Schema: MovieLens {}\n\n", report.schema));

        match (&report.entities.stats, &report.entities.error) {
            (Some(stats), _) => {
                output.push_str(&format!("  ✓ Entities: {}\n", report.entities.output));
                output.push_str(&format!(
                    "    users: {}, movies: {}, skipped rows: {}\n",
                    stats.users, stats.movies, stats.skipped
                ));
            }
            (None, error) => output.push_str(&format!(
                "  ✗ Entities failed: {}\n",
                error.as_deref().unwrap_or("unknown error")
            )),
        }

        match (&report.relations.stats, &report.relations.error) {
            (Some(stats), _) => {
                output.push_str(&format!("  ✓ Relations: {}\n", report.relations.output));
                output.push_str(&format!(
                    "    relations: {}, skipped rows: {}\n",
                    stats.relations, stats.skipped
                ));
            }
            (None, error) => output.push_str(&format!(
                "  ✗ Relations failed: {}\n",
                error.as_deref().unwrap_or("unknown error")
            )),
        }

        if report.is_success() {
            output.push_str("\nThe convert process is finished!\n");
        }

        output
    }
}

impl Default for ConversionReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_summary<T: Copy, E: std::fmt::Display>(
    output_dir: &Path,
    file_name: &str,
    result: &Result<T, E>,
) -> PhaseSummary<T> {
    PhaseSummary {
        output: output_dir.join(file_name).display().to_string(),
        succeeded: result.is_ok(),
        stats: result.as_ref().ok().copied(),
        error: result.as_ref().err().map(|e| e.to_string()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
