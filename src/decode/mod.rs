//! Envelope decoding for compliance result records
//!
//! Architecture: Anti-Corruption Layer - the decoder translates the raw
//! upstream envelope into clean domain records
//! - Sanitization happens on the whole buffer before structural decoding
//! - Decoding is pure and deterministic; same bytes always yield the same records
//! - Source order is preserved; nothing downstream re-sorts

use crate::domain::records::{ComplianceRecord, ReportError, ReportResult};
use std::borrow::Cow;

/// Escaped carriage returns left at the end of interface names because the
/// detail was pulled from raw device configuration text.
const CR_ARTIFACT: &str = "&#xD;";

/// Strip the escaped-carriage-return transport artifact from the buffer.
///
/// This is a global pre-pass over the entire envelope rather than a per-field
/// cleanup, so any string field containing the sequence is affected. Applying
/// it to already-clean input is a no-op and borrows instead of allocating.
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    if raw.contains(CR_ARTIFACT) {
        Cow::Owned(raw.replace(CR_ARTIFACT, ""))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Decode envelope bytes into an ordered sequence of compliance records.
///
/// The envelope is a JSON array of objects carrying at minimum `NodeID`,
/// `NodeCaption`, and `XMLResults`; `RuleName` is optional depending on the
/// caller's query mode. An empty-but-well-formed array yields an empty
/// sequence, not an error.
pub fn decode_records(bytes: &[u8]) -> ReportResult<Vec<ComplianceRecord>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ReportError::decode(format!("envelope is not valid UTF-8: {e}")))?;

    let sanitized = sanitize(text);

    let records: Vec<ComplianceRecord> = serde_json::from_str(&sanitized)
        .map_err(|e| ReportError::decode(e.to_string()))?;

    tracing::debug!(count = records.len(), "decoded compliance records");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(records: &str) -> String {
        format!("[{records}]")
    }

    fn record_json(caption: &str, detail: &str) -> String {
        format!(
            r#"{{"NodeID":"1","NodeCaption":"{caption}","XMLResults":"{detail}","RuleName":"Rule-X"}}"#
        )
    }

    #[test]
    fn test_empty_envelope_yields_no_records() {
        let records = decode_records(b"[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_preserves_source_order() {
        let body = envelope(&format!(
            "{},{},{}",
            record_json("RTR-1", ""),
            record_json("RTR-2", ""),
            record_json("RTR-3", "")
        ));

        let records = decode_records(body.as_bytes()).unwrap();
        let captions: Vec<_> = records.iter().map(|r| r.node_caption.as_str()).collect();
        assert_eq!(captions, ["RTR-1", "RTR-2", "RTR-3"]);
    }

    #[test]
    fn test_sanitize_strips_carriage_return_artifact() {
        assert_eq!(sanitize("Gi0/1&#xD;"), "Gi0/1");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize("Gi0/1&#xD;\nGi0/2&#xD;").into_owned();
        let twice = sanitize(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_borrows_clean_input() {
        assert!(matches!(sanitize("Gi0/1"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_applies_to_all_fields() {
        // The pre-pass is buffer-wide, not limited to the detail payload
        let body = envelope(&record_json("RTR-1&#xD;", "detail&#xD;"));
        let records = decode_records(body.as_bytes()).unwrap();
        assert_eq!(records[0].node_caption, "RTR-1");
        assert_eq!(records[0].raw_detail, "detail");
    }

    #[test]
    fn test_malformed_envelope_is_a_decode_error() {
        let err = decode_records(b"{ not json ").unwrap_err();
        assert!(matches!(err, ReportError::Decode { .. }));
    }

    #[test]
    fn test_missing_required_field_is_a_decode_error() {
        let err = decode_records(br#"[{"NodeID":"1"}]"#).unwrap_err();
        assert!(matches!(err, ReportError::Decode { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_error() {
        let err = decode_records(&[0x5b, 0xff, 0xfe, 0x5d]).unwrap_err();
        assert!(matches!(err, ReportError::Decode { .. }));
    }
}
