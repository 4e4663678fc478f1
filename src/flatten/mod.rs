//! Flattening of embedded compliance detail into violation rows
//!
//! Architecture: the detail schema is closed and known, so it is modeled as
//! an explicit typed tree of three fixed node kinds (config block, pattern,
//! found line) rather than a generic document type
//! - The walk is depth-first in document order: blocks, then patterns
//! - Parent context (node caption, rule name, block label) is carried into
//!   every emitted leaf
//! - One malformed detail payload fails the whole batch; silently dropping a
//!   device would misrepresent the compliance posture of the cluster

use crate::domain::records::{
    ComplianceRecord, ReportError, ReportResult, SchemaVariant, Violation,
};
use serde::Deserialize;

/// The literal found-match indicator used by the source schema.
///
/// The flag is compared as a string, never parsed to a boolean: the source
/// spelling must be matched exactly and echoed verbatim in the output.
const FOUND_MATCH_TRUE: &str = "True";

/// Parsed form of one record's embedded XML detail.
///
/// Nesting depth is fixed at exactly three levels: CB -> Ps/P -> L.
#[derive(Debug, Deserialize)]
struct ComplianceDetail {
    #[serde(rename = "CB", default)]
    config_blocks: Vec<ConfigBlock>,
}

#[derive(Debug, Deserialize)]
struct ConfigBlock {
    /// Which configuration block of the device this is
    #[serde(rename = "@L", default)]
    match_label: String,
    #[serde(rename = "Ps", default)]
    pattern_block: PatternBlock,
}

#[derive(Debug, Default, Deserialize)]
struct PatternBlock {
    #[serde(rename = "P", default)]
    patterns: Vec<Pattern>,
}

#[derive(Debug, Deserialize)]
struct Pattern {
    /// Boolean-as-string found-match flag, preserved verbatim
    #[serde(rename = "@FM", default)]
    found_match: String,
    #[serde(rename = "@PT", default)]
    pattern_text: String,
    /// Present only when a match was found
    #[serde(rename = "L")]
    found_line: Option<FoundLine>,
}

#[derive(Debug, Deserialize)]
struct FoundLine {
    /// Matched configuration line text; carried by the schema, not reported
    #[serde(rename = "@FL", default)]
    #[allow(dead_code)]
    line_match: String,
    #[serde(rename = "@FLN", default)]
    line_number: String,
}

/// Flatten one record's detail document into violation rows.
///
/// Rows are emitted in document order: outer block order, then inner pattern
/// order. The line number is read from the nested found-line node if and only
/// if the found-match flag equals the literal truthy indicator; otherwise the
/// emitted line number is empty, and the possibly-absent node is never read.
pub fn flatten_record(
    record: &ComplianceRecord,
    variant: SchemaVariant,
) -> ReportResult<Vec<Violation>> {
    let detail: ComplianceDetail = quick_xml::de::from_str(&record.raw_detail)
        .map_err(|e| ReportError::detail_parse(&record.node_caption, e.to_string()))?;

    let mut violations = Vec::new();

    for block in &detail.config_blocks {
        match variant {
            SchemaVariant::Full => {
                for pattern in &block.pattern_block.patterns {
                    let found_line_number = if pattern.found_match == FOUND_MATCH_TRUE {
                        pattern
                            .found_line
                            .as_ref()
                            .map(|line| line.line_number.clone())
                            .unwrap_or_default()
                    } else {
                        String::new()
                    };

                    violations.push(Violation {
                        node_name: record.node_caption.clone(),
                        rule_name: record.rule_name.clone(),
                        config_block_match: block.match_label.clone(),
                        pattern_text: pattern.pattern_text.clone(),
                        in_violation: pattern.found_match.clone(),
                        found_line_number,
                    });
                }
            }
            SchemaVariant::InterfaceOnly => {
                // The block's match label is the leaf unit in this variant
                violations.push(Violation {
                    node_name: record.node_caption.clone(),
                    rule_name: String::new(),
                    config_block_match: block.match_label.clone(),
                    pattern_text: String::new(),
                    in_violation: String::new(),
                    found_line_number: String::new(),
                });
            }
        }
    }

    Ok(violations)
}

/// Flatten a batch of records, concatenating per-record output in input order.
///
/// Total output order is record order, then block order, then pattern order.
/// The first record whose detail fails to parse aborts the entire batch with
/// no partial output.
pub fn flatten_all(
    records: &[ComplianceRecord],
    variant: SchemaVariant,
) -> ReportResult<Vec<Violation>> {
    let mut violations = Vec::new();

    for record in records {
        violations.extend(flatten_record(record, variant)?);
    }

    tracing::debug!(count = violations.len(), "flattened violations");

    Ok(violations)
}
