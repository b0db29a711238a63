//! Aggregation of probe results for the TLS endpoint section.

use crate::fields::{first_present, lookup, text, text_at};
use serde_json::Value;

/// One table row per probe record. Absent fields display as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsRow {
    pub target: String,
    pub success: bool,
    pub protocol: String,
    pub cipher_suite: String,
    pub cert_not_after: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSummary {
    pub total: usize,
    pub succeeded: usize,
    pub rows: Vec<TlsRow>,
}

impl TlsSummary {
    /// Derived, so it can never disagree with `total` or go negative.
    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.succeeded)
    }
}

pub fn summarize_tls(records: &[Value]) -> TlsSummary {
    let rows: Vec<TlsRow> = records.iter().map(row_for).collect();
    let succeeded = rows.iter().filter(|r| r.success).count();
    TlsSummary { total: records.len(), succeeded, rows }
}

fn row_for(record: &Value) -> TlsRow {
    let cert_not_after = lookup(record, &["certificate"])
        .and_then(|cert| first_present(cert, &["not_after", "notAfter"]));
    TlsRow {
        target: format!("{}:{}", text_at(record, &["host"]), text_at(record, &["port"])),
        // Only a literal `true` counts; "yes", 1 and friends do not.
        success: matches!(record.get("success"), Some(Value::Bool(true))),
        protocol: text_at(record, &["protocol"]),
        cipher_suite: text_at(record, &["cipher_suite"]),
        cert_not_after: text(cert_not_after),
        error: text_at(record, &["error"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_only_literal_true() {
        let records = vec![
            json!({"host": "a", "port": 443, "success": true}),
            json!({"host": "b", "port": 443, "success": "true"}),
            json!({"host": "c", "port": 443, "success": 1}),
            json!({"host": "d", "port": 443}),
            json!({"host": "e", "port": 443, "success": false, "error": "timed out after 5000 ms"}),
        ];
        let s = summarize_tls(&records);
        assert_eq!((s.total, s.succeeded, s.failed()), (5, 1, 4));
        assert_eq!(s.succeeded + s.failed(), s.total);
    }

    #[test]
    fn rows_default_missing_fields() {
        let records = vec![json!({}), json!("garbage"), json!(null)];
        let s = summarize_tls(&records);
        assert_eq!(s.rows.len(), 3);
        assert_eq!(s.rows[0], TlsRow { target: ":".into(), ..TlsRow::default() });
        assert_eq!(s.failed(), 3);
    }

    #[test]
    fn cert_expiry_falls_back_to_legacy_key() {
        let records = vec![
            json!({"host": "a", "port": 443, "success": true, "protocol": "TLSv1.3", "cipher_suite": "TLS13_AES_128_GCM_SHA256",
                   "certificate": {"not_after": "2026-01-01T00:00:00Z", "notAfter": "ignored"}}),
            json!({"host": "b", "port": 8443, "success": true, "certificate": {"not_after": null, "notAfter": "Jan  1 00:00:00 2026 GMT"}}),
            json!({"host": "c", "port": 443, "success": true, "certificate": null}),
        ];
        let s = summarize_tls(&records);
        assert_eq!(s.rows[0].cert_not_after, "2026-01-01T00:00:00Z");
        assert_eq!(s.rows[0].protocol, "TLSv1.3");
        assert_eq!(s.rows[1].cert_not_after, "Jan  1 00:00:00 2026 GMT");
        assert_eq!(s.rows[1].target, "b:8443");
        assert_eq!(s.rows[2].cert_not_after, "");
    }

    #[test]
    fn empty_results_are_all_zero() {
        let s = summarize_tls(&[]);
        assert_eq!((s.total, s.succeeded, s.failed()), (0, 0, 0));
    }
}
