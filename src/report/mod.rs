//! CSV report generation for flattened violations
//!
//! CDD Principle: Anti-Corruption Layer - the writer translates domain
//! violations to the external tabular format
//! - Column order is part of the external contract and never changes
//! - The schema variant selects which columns a row carries
//! - Domain values are written verbatim; no quoting or coercion beyond what
//!   the CSV encoding itself requires

use crate::domain::records::{ReportResult, SchemaVariant, Violation};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header row for the full six-column report, in contract order
const FULL_COLUMNS: &[&str] = &[
    "Node Name",
    "Rule Name",
    "Config Block Match",
    "Pattern Text",
    "In Violation",
    "Line Number",
];

/// Header row for the minimal interface-only report
const INTERFACE_COLUMNS: &[&str] = &["Node Name", "Interface Name"];

/// Column headers for the given schema variant
pub fn csv_columns(variant: SchemaVariant) -> &'static [&'static str] {
    match variant {
        SchemaVariant::Full => FULL_COLUMNS,
        SchemaVariant::InterfaceOnly => INTERFACE_COLUMNS,
    }
}

/// Write a header row and one data row per violation to the given writer.
///
/// Rows are written in the order given; the flattener already established the
/// record/block/pattern ordering and this writer never re-sorts.
pub fn write_violations<W: Write>(
    writer: W,
    violations: &[Violation],
    variant: SchemaVariant,
) -> ReportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(csv_columns(variant))?;

    for violation in violations {
        match variant {
            SchemaVariant::Full => {
                csv_writer.write_record([
                    violation.node_name.as_str(),
                    violation.rule_name.as_str(),
                    violation.config_block_match.as_str(),
                    violation.pattern_text.as_str(),
                    violation.in_violation.as_str(),
                    violation.found_line_number.as_str(),
                ])?;
            }
            SchemaVariant::InterfaceOnly => {
                csv_writer.write_record([
                    violation.node_name.as_str(),
                    violation.config_block_match.as_str(),
                ])?;
            }
        }
    }

    csv_writer.flush()?;

    Ok(())
}

/// Write the report to a file path, creating or truncating it.
pub fn write_violations_to_file<P: AsRef<Path>>(
    path: P,
    violations: &[Violation],
    variant: SchemaVariant,
) -> ReportResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_violations(file, violations, variant)?;

    tracing::info!(path = %path.as_ref().display(), rows = violations.len(), "wrote report");

    Ok(())
}

/// Default output path: a timestamped file in the current directory.
///
/// The timestamp has minute precision, matching the report naming convention
/// downstream consumers expect (`Compliance-Report_YYYYMMDDHHMM.csv`).
pub fn default_output_path() -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M");
    PathBuf::from(format!("Compliance-Report_{stamp}.csv"))
}
