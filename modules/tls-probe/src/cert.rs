use crate::{CertificateInfo, Handshake, ProbeError};
use rustls::{ClientConnection, ProtocolVersion};
use time::format_description::well_known::Rfc3339;
use x509_parser::certificate::X509Certificate;
use x509_parser::objects::{oid2sn, oid_registry};
use x509_parser::prelude::FromDer;
use x509_parser::time::ASN1Time;

/// Collect negotiated parameters and leaf certificate fields from a finished handshake.
pub(crate) fn describe(conn: &ClientConnection) -> Result<Handshake, ProbeError> {
    let protocol = conn.protocol_version().map(protocol_name).unwrap_or_default();
    let cipher_suite = conn
        .negotiated_cipher_suite()
        .map(|s| format!("{:?}", s.suite()))
        .unwrap_or_default();
    let key_exchange = conn.negotiated_key_exchange_group().map(|g| format!("{:?}", g.name()));
    let cipher_bits = cipher_bits(&cipher_suite);
    let leaf = conn
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| ProbeError::Certificate("no peer certificate presented".into()))?;
    let certificate = leaf_info(leaf.as_ref())?;
    Ok(Handshake { protocol, cipher_suite, key_exchange, cipher_bits, certificate })
}

fn protocol_name(v: ProtocolVersion) -> String {
    match v {
        ProtocolVersion::TLSv1_2 => "TLSv1.2".into(),
        ProtocolVersion::TLSv1_3 => "TLSv1.3".into(),
        other => format!("{:?}", other),
    }
}

/// Bulk cipher key size, read off the suite name.
pub(crate) fn cipher_bits(suite: &str) -> Option<u16> {
    if suite.contains("AES_256") || suite.contains("CHACHA20") {
        Some(256)
    } else if suite.contains("AES_128") {
        Some(128)
    } else {
        None
    }
}

pub(crate) fn leaf_info(der: &[u8]) -> Result<CertificateInfo, ProbeError> {
    let (_, x509) = X509Certificate::from_der(der).map_err(|e| ProbeError::Certificate(e.to_string()))?;
    let validity = x509.validity();
    let sig_oid = &x509.signature_algorithm.algorithm;
    Ok(CertificateInfo {
        subject: x509.subject().to_string(),
        issuer: x509.issuer().to_string(),
        not_before: asn1_rfc3339(&validity.not_before),
        not_after: asn1_rfc3339(&validity.not_after),
        serial_number: x509.raw_serial().iter().map(|b| format!("{:02X}", b)).collect(),
        signature_algorithm: oid2sn(sig_oid, oid_registry())
            .map(str::to_owned)
            .unwrap_or_else(|_| sig_oid.to_id_string()),
    })
}

fn asn1_rfc3339(t: &ASN1Time) -> String {
    t.to_datetime().format(&Rfc3339).unwrap_or_else(|_| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_from_suite_names() {
        assert_eq!(cipher_bits("TLS13_AES_256_GCM_SHA384"), Some(256));
        assert_eq!(cipher_bits("TLS13_CHACHA20_POLY1305_SHA256"), Some(256));
        assert_eq!(cipher_bits("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"), Some(128));
        assert_eq!(cipher_bits("Unknown(0x1234)"), None);
    }

    #[test]
    fn protocol_names_match_openssl_style() {
        assert_eq!(protocol_name(ProtocolVersion::TLSv1_3), "TLSv1.3");
        assert_eq!(protocol_name(ProtocolVersion::TLSv1_2), "TLSv1.2");
    }

    #[test]
    fn leaf_fields_are_extracted() {
        let info = leaf_info(include_bytes!("../testdata/leaf.der")).unwrap();
        assert_eq!(info.subject, "CN=leaf.example, O=Example Org");
        assert_eq!(info.issuer, "CN=Example Test CA");
        assert_eq!(info.not_before, "2025-01-01T00:00:00Z");
        assert_eq!(info.not_after, "2026-01-01T12:30:45Z");
        assert_eq!(info.serial_number, "0A1B2C");
        assert_eq!(info.signature_algorithm, "sha256WithRSAEncryption");
    }

    #[test]
    fn garbage_der_is_a_certificate_error() {
        let err = leaf_info(b"not a certificate").unwrap_err();
        assert!(matches!(err, ProbeError::Certificate(_)));
        assert!(err.to_string().starts_with("peer certificate could not be decoded"));
    }
}
