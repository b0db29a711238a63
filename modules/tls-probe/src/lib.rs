//! Read-only TLS endpoint probe.
//!
//! One handshake per target with the default trust policy. Negotiated protocol, cipher and
//! leaf certificate metadata are recorded; nothing is sent after the handshake.

mod cert;
mod error;
mod result;

pub use error::ProbeError;
pub use result::{CertificateInfo, Handshake, Outcome, ProbeResult};

use pqc_core::{now_rfc3339, InputError, Target};
use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;

/// Shared TLS client configuration. Cheap to clone.
#[derive(Clone)]
pub struct Prober {
    connector: TlsConnector,
}

impl Prober {
    /// Client config with the ring provider, safe protocol versions and the Mozilla root store.
    pub fn new() -> Result<Self, ProbeError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(root_store)
            .with_no_client_auth();
        Ok(Prober { connector: TlsConnector::from(Arc::new(config)) })
    }

    /// Probe one target. Resolution, connect and handshake together are bounded by `limit`.
    /// Never fails: every fault is captured in the returned record.
    pub async fn probe(&self, target: &Target, limit: Duration) -> ProbeResult {
        let timestamp = now_rfc3339();
        let outcome = match timeout(limit, self.handshake(target)).await {
            Ok(res) => res,
            Err(_) => Err(ProbeError::Timeout(limit)),
        };
        match outcome {
            Ok(handshake) => {
                tracing::debug!(%target, protocol = %handshake.protocol, cipher = %handshake.cipher_suite, "handshake complete");
                ProbeResult::negotiated(target, timestamp, handshake)
            }
            Err(e) => {
                tracing::debug!(%target, error = %e, "probe failed");
                ProbeResult::failed(target, timestamp, &e)
            }
        }
    }

    // The stream lives only inside this future, so it is closed on return, on error and when
    // the surrounding timeout drops the future.
    async fn handshake(&self, target: &Target) -> Result<Handshake, ProbeError> {
        let server_name = server_name(&target.host)?;
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((target.host.as_str(), target.port))
            .await
            .map_err(|source| ProbeError::Resolve { host: target.host.clone(), source })?
            .collect();
        if addrs.is_empty() {
            return Err(ProbeError::NoAddress(target.host.clone()));
        }
        let stream = connect_first(&addrs).await?;
        let tls = self.connector.connect(server_name, stream).await.map_err(ProbeError::Handshake)?;
        cert::describe(tls.get_ref().1)
    }
}

/// Connect to each address in turn and keep the first that answers.
/// The last connect error is reported when none do.
async fn connect_first(addrs: &[SocketAddr]) -> Result<TcpStream, ProbeError> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "connect failed; trying next address");
                last_err = Some(e);
            }
        }
    }
    Err(ProbeError::Connect(
        last_err.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses to connect to")),
    ))
}

fn server_name(host: &str) -> Result<ServerName<'static>, ProbeError> {
    match host.parse::<IpAddr>() {
        Ok(ip) => Ok(ServerName::IpAddress(ip.into())),
        Err(_) => ServerName::try_from(host.to_owned()).map_err(|_| ProbeError::ServerName(host.to_owned())),
    }
}

/// Probe every target with a non-blank host, at most `concurrency` at a time.
///
/// Returns exactly one result per probed target, in input order.
pub async fn probe_many(prober: &Prober, targets: Vec<Target>, limit: Duration, concurrency: usize) -> Vec<ProbeResult> {
    let sem = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::new();
    for target in targets {
        if target.host.trim().is_empty() {
            continue;
        }
        let prober = prober.clone();
        let sem = sem.clone();
        let t = target.clone();
        let handle = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok();
            prober.probe(&t, limit).await
        });
        handles.push((target, handle));
    }
    let mut out = Vec::with_capacity(handles.len());
    for (target, handle) in handles {
        match handle.await {
            Ok(r) => out.push(r),
            Err(e) => {
                tracing::warn!(%target, error = %e, "probe task aborted");
                out.push(ProbeResult::failed(&target, now_rfc3339(), &ProbeError::Task(e.to_string())));
            }
        }
    }
    let ok = out.iter().filter(|r| r.success).count();
    tracing::info!(total = out.len(), succeeded = ok, failed = out.len() - ok, "probe run finished");
    out
}

/// Write results as a pretty-printed JSON array.
pub fn write_results(path: &Path, results: &[ProbeResult]) -> Result<(), InputError> {
    let mut body = serde_json::to_string_pretty(results)
        .map_err(|source| InputError::Json { path: path.to_path_buf(), source })?;
    body.push('\n');
    std::fs::write(path, body).map_err(|source| InputError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn prober() -> Prober {
        Prober::new().unwrap()
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn unresolvable_host_fails_without_certificate() {
        let r = prober().probe(&Target::new("example.invalid", 443), Duration::from_secs(3)).await;
        assert!(!r.success);
        assert!(!r.error().unwrap_or("").is_empty());
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("certificate").is_none());
        assert_eq!(v["host"], "example.invalid");
        assert_eq!(v["port"], 443);
    }

    #[tokio::test]
    async fn refused_connection_is_captured() {
        let port = closed_port().await;
        let r = prober().probe(&Target::new("127.0.0.1", port), Duration::from_secs(2)).await;
        assert!(!r.success);
        assert!(r.error().unwrap().starts_with("connection failed"), "{:?}", r.error());
    }

    #[tokio::test]
    async fn connect_falls_through_to_next_address() {
        let refused: SocketAddr = format!("127.0.0.1:{}", closed_port().await).parse().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live = listener.local_addr().unwrap();
        let stream = connect_first(&[refused, live]).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), live);
    }

    #[tokio::test]
    async fn connect_reports_last_error_when_all_fail() {
        let a: SocketAddr = format!("127.0.0.1:{}", closed_port().await).parse().unwrap();
        let b: SocketAddr = format!("127.0.0.1:{}", closed_port().await).parse().unwrap();
        let err = connect_first(&[a, b]).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connect(_)));
        assert!(err.to_string().starts_with("connection failed"));
    }

    #[tokio::test]
    async fn peer_hanging_up_is_a_handshake_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((sock, _)) = listener.accept().await {
                drop(sock);
            }
        });
        let r = prober().probe(&Target::new("127.0.0.1", port), Duration::from_secs(2)).await;
        assert!(!r.success);
        assert!(r.error().unwrap().starts_with("tls handshake failed"), "{:?}", r.error());
    }

    #[tokio::test]
    async fn silent_peer_hits_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((_sock, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
        });
        let r = prober().probe(&Target::new("127.0.0.1", port), Duration::from_millis(200)).await;
        assert!(!r.success);
        assert_eq!(r.error(), Some("timed out after 200 ms"));
    }

    #[tokio::test]
    async fn probe_many_skips_blank_hosts_and_keeps_one_per_target() {
        let port = closed_port().await;
        let targets = vec![
            Target::new("", 443),
            Target::new("127.0.0.1", port),
            Target::new("   ", 443),
            Target::new("example.invalid", 443),
        ];
        let results = probe_many(&prober(), targets, Duration::from_secs(3), 4).await;
        let hosts: Vec<_> = results.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, vec!["127.0.0.1", "example.invalid"]);
        assert!(results.iter().all(|r| !r.success && r.error().is_some()));
    }

    #[test]
    fn ip_hosts_use_ip_server_names() {
        assert!(matches!(server_name("192.0.2.1").unwrap(), ServerName::IpAddress(_)));
        assert!(matches!(server_name("example.com").unwrap(), ServerName::DnsName(_)));
        assert!(server_name("bad host!").is_err());
    }

    #[test]
    fn results_written_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tls_scan.json");
        let r = ProbeResult::failed(&Target::new("a.example", 443), "t".into(), &ProbeError::NoAddress("a.example".into()));
        write_results(&path, &[r]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
        assert_eq!(v[0]["success"], false);
    }
}
