//! Core domain models for compliance records and flattened violations
//!
//! Architecture: Rich Domain Models - the whole model is build-once,
//! flatten-once, serialize-once per run
//! - ComplianceRecord is decoded from the envelope and consumed exactly once
//! - Violation is the flat output row; ownership passes to the report writer
//! - No entity has an update path; everything is immutable after construction

use serde::{Deserialize, Serialize};

/// One device's rule-evaluation result as decoded from the envelope.
///
/// Field names mirror the upstream query columns exactly so the envelope
/// decodes without a translation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// Opaque node identifier assigned by the data source
    #[serde(rename = "NodeID")]
    pub node_id: String,
    /// Human-readable device name
    #[serde(rename = "NodeCaption")]
    pub node_caption: String,
    /// Embedded XML compliance detail, sanitized of transport artifacts
    #[serde(rename = "XMLResults")]
    pub raw_detail: String,
    /// Name of the compliance rule evaluated; absent in interface-only queries
    #[serde(rename = "RuleName", default)]
    pub rule_name: String,
}

/// Which record schema the flattening walk targets.
///
/// The full variant emits one row per pattern with all six columns; the
/// interface-only variant treats each config block's match label as the leaf
/// unit and emits two columns. Both are configurations of the same walk, not
/// separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVariant {
    /// Six-column output: one row per pattern
    #[default]
    Full,
    /// Two-column output: one row per config block (Node Name, Interface Name)
    InterfaceOnly,
}

/// One flattened output row combining device, rule, block, and pattern context.
///
/// All fields are plain strings to match the external reporting convention:
/// the found-match flag is carried verbatim rather than coerced to a boolean,
/// and `found_line_number` is empty when the pattern was not matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Device name, inherited from the owning record
    pub node_name: String,
    /// Rule name, inherited from the owning record
    pub rule_name: String,
    /// Match label of the enclosing config block
    pub config_block_match: String,
    /// The rule pattern description
    pub pattern_text: String,
    /// Raw found-match flag, preserved as-is from the source document
    pub in_violation: String,
    /// Line number where the pattern matched; empty when no match
    pub found_line_number: String,
}

/// Error types that can occur while producing a compliance report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The envelope bytes do not conform to the expected record encoding
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// One record's embedded detail payload does not conform to the schema.
    /// Fatal to the entire batch; no partial output is emitted.
    #[error("Detail parse error for node {node}: {message}")]
    DetailParse { node: String, message: String },

    /// File could not be read or written
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// CSV serialization failed
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// The upstream data source query failed
    #[error("Source error: {message}")]
    Source { message: String },

    /// Required configuration (credentials, options) is missing or invalid
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ReportError {
    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a detail parse error for a specific node
    pub fn detail_parse(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DetailParse {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_decodes_source_field_names() {
        let json = r#"{
            "NodeID": "17",
            "NodeCaption": "RTR-1",
            "XMLResults": "<Results/>",
            "RuleName": "Rule-X"
        }"#;

        let record: ComplianceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.node_id, "17");
        assert_eq!(record.node_caption, "RTR-1");
        assert_eq!(record.raw_detail, "<Results/>");
        assert_eq!(record.rule_name, "Rule-X");
    }

    #[test]
    fn test_rule_name_is_optional() {
        let json = r#"{
            "NodeID": "17",
            "NodeCaption": "RTR-1",
            "XMLResults": "<Results/>"
        }"#;

        let record: ComplianceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.rule_name, "");
    }

    #[test]
    fn test_error_display_names_failing_node() {
        let err = ReportError::detail_parse("RTR-1", "unexpected end of document");
        assert!(err.to_string().contains("RTR-1"));
    }

    #[test]
    fn test_default_schema_variant_is_full() {
        assert_eq!(SchemaVariant::default(), SchemaVariant::Full);
    }
}
