use crate::ProbeError;
use pqc_core::Target;
use serde::Serialize;

/// One record per probed target. Serialises either the negotiated fields or `error`, never both.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub host: String,
    pub port: u16,
    pub timestamp: String,
    pub success: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Negotiated(Handshake),
    Failed { error: String },
}

/// Parameters negotiated by a completed handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handshake {
    pub protocol: String,
    pub cipher_suite: String,
    pub key_exchange: Option<String>,
    pub cipher_bits: Option<u16>,
    pub certificate: CertificateInfo,
}

/// Leaf certificate fields as presented by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub not_before: String,
    pub not_after: String,
    pub serial_number: String,
    pub signature_algorithm: String,
}

impl ProbeResult {
    pub fn negotiated(target: &Target, timestamp: String, handshake: Handshake) -> Self {
        ProbeResult {
            host: target.host.clone(),
            port: target.port,
            timestamp,
            success: true,
            outcome: Outcome::Negotiated(handshake),
        }
    }

    pub fn failed(target: &Target, timestamp: String, error: &ProbeError) -> Self {
        ProbeResult {
            host: target.host.clone(),
            port: target.port,
            timestamp,
            success: false,
            outcome: Outcome::Failed { error: error.to_string() },
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            Outcome::Negotiated(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_handshake() -> Handshake {
        Handshake {
            protocol: "TLSv1.3".into(),
            cipher_suite: "TLS13_AES_256_GCM_SHA384".into(),
            key_exchange: None,
            cipher_bits: Some(256),
            certificate: CertificateInfo {
                subject: "CN=example.com".into(),
                issuer: "CN=Example CA".into(),
                not_before: "2025-01-01T00:00:00Z".into(),
                not_after: "2026-01-01T00:00:00Z".into(),
                serial_number: "0A1B".into(),
                signature_algorithm: "sha256WithRSAEncryption".into(),
            },
        }
    }

    #[test]
    fn negotiated_serialises_flat_without_error() {
        let r = ProbeResult::negotiated(&Target::new("example.com", 443), "2025-06-01T00:00:00Z".into(), sample_handshake());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["protocol"], "TLSv1.3");
        assert_eq!(v["cipher_bits"], 256);
        assert!(v["key_exchange"].is_null());
        assert!(v.as_object().unwrap().contains_key("key_exchange"));
        assert_eq!(v["certificate"]["not_after"], "2026-01-01T00:00:00Z");
        assert!(v.get("error").is_none());
        assert!(r.error().is_none());
    }

    #[test]
    fn failure_serialises_only_error() {
        let r = ProbeResult::failed(
            &Target::new("example.invalid", 443),
            "2025-06-01T00:00:00Z".into(),
            &ProbeError::Timeout(Duration::from_millis(1500)),
        );
        let v = serde_json::to_value(&r).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "timed out after 1500 ms");
        for key in ["protocol", "cipher_suite", "key_exchange", "cipher_bits", "certificate"] {
            assert!(!obj.contains_key(key), "unexpected key {key}");
        }
        assert!(matches!(r.outcome, Outcome::Failed { .. }));
    }
}
