//! NCM Report - flattens network-device compliance violations into tabular rows
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure domain logic (decode, flatten) separated from infrastructure concerns
//! - The envelope source and the CSV writer are collaborators at the edges
//! - One linear batch pass: bytes in, ordered violation rows out

pub mod decode;
pub mod domain;
pub mod flatten;
pub mod report;
pub mod source;

// Re-export main types for convenient access
pub use domain::records::{
    ComplianceRecord, ReportError, ReportResult, SchemaVariant, Violation,
};

pub use decode::{decode_records, sanitize};

pub use flatten::{flatten_all, flatten_record};

pub use report::{csv_columns, default_output_path, write_violations, write_violations_to_file};

pub use source::{read_envelope_file, SwisClient, SwisConfig};

/// Decode an envelope and flatten every record it carries, in one pass.
///
/// Output order is record order, then block order, then pattern order. A
/// malformed envelope or a single malformed detail payload fails the whole
/// run; no partial violation list is ever returned.
pub fn run_report(bytes: &[u8], variant: SchemaVariant) -> ReportResult<Vec<Violation>> {
    let records = decode_records(bytes)?;
    flatten_all(&records, variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"[{
        "NodeID": "17",
        "NodeCaption": "RTR-1",
        "RuleName": "Rule-X",
        "XMLResults": "<Results><CB L=\"intf\"><Ps><P FM=\"True\" PT=\"no shutdown\"><L FL=\"no shutdown\" FLN=\"42\"/></P></Ps></CB><CB L=\"bgp\"><Ps><P FM=\"False\" PT=\"neighbor filter\"/></Ps></CB></Results>"
    }]"#;

    #[test]
    fn test_end_to_end_two_block_scenario() {
        let violations = run_report(ENVELOPE.as_bytes(), SchemaVariant::Full).unwrap();

        assert_eq!(violations.len(), 2);
        assert_eq!(
            (
                violations[0].node_name.as_str(),
                violations[0].rule_name.as_str(),
                violations[0].config_block_match.as_str(),
                violations[0].pattern_text.as_str(),
                violations[0].in_violation.as_str(),
                violations[0].found_line_number.as_str(),
            ),
            ("RTR-1", "Rule-X", "intf", "no shutdown", "True", "42")
        );
        assert_eq!(
            (
                violations[1].config_block_match.as_str(),
                violations[1].pattern_text.as_str(),
                violations[1].in_violation.as_str(),
                violations[1].found_line_number.as_str(),
            ),
            ("bgp", "neighbor filter", "False", "")
        );
    }

    #[test]
    fn test_empty_envelope_end_to_end() {
        let violations = run_report(b"[]", SchemaVariant::Full).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_decode_failure_names_decode_stage() {
        let err = run_report(b"not json", SchemaVariant::Full).unwrap_err();
        assert!(matches!(err, ReportError::Decode { .. }));
    }

    #[test]
    fn test_flatten_failure_is_fatal_end_to_end() {
        let envelope = r#"[
            {"NodeID":"1","NodeCaption":"RTR-1","RuleName":"R","XMLResults":"<Results/>"},
            {"NodeID":"2","NodeCaption":"RTR-2","RuleName":"R","XMLResults":"<broken"}
        ]"#;

        let err = run_report(envelope.as_bytes(), SchemaVariant::Full).unwrap_err();
        assert!(matches!(err, ReportError::DetailParse { .. }));
    }

    #[test]
    fn test_envelope_wide_sanitization_end_to_end() {
        let envelope = r#"[{
            "NodeID": "1",
            "NodeCaption": "RTR-1",
            "RuleName": "R",
            "XMLResults": "<Results><CB L=\"Gi0/1&#xD;\"><Ps><P FM=\"False\" PT=\"p\"/></Ps></CB></Results>"
        }]"#;

        let violations = run_report(envelope.as_bytes(), SchemaVariant::Full).unwrap();
        assert_eq!(violations[0].config_block_match, "Gi0/1");
    }
}
