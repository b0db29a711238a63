use crate::{read_json, InputError};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TLS_PORT: u16 = 443;

/// A TLS endpoint to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Target { host: host.into(), port }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid target '{0}': expected host[:port]")]
pub struct TargetSpecError(String);

/// Parses `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 literal.
impl FromStr for Target {
    type Err = TargetSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let err = || TargetSpecError(s.to_string());
        if spec.is_empty() {
            return Err(err());
        }
        if let Some(rest) = spec.strip_prefix('[') {
            let (host, after) = rest.split_once(']').ok_or_else(err)?;
            let port = match after {
                "" => DEFAULT_TLS_PORT,
                p => p.strip_prefix(':').and_then(parse_port).ok_or_else(err)?,
            };
            if host.is_empty() {
                return Err(err());
            }
            return Ok(Target::new(host, port));
        }
        match spec.split_once(':') {
            None => Ok(Target::new(spec, DEFAULT_TLS_PORT)),
            // More than one colon: an unbracketed IPv6 literal.
            Some((_, rest)) if rest.contains(':') => Ok(Target::new(spec, DEFAULT_TLS_PORT)),
            Some((host, port)) => {
                let port = parse_port(port).ok_or_else(err)?;
                if host.is_empty() {
                    return Err(err());
                }
                Ok(Target::new(host, port))
            }
        }
    }
}

fn parse_port(s: &str) -> Option<u16> {
    s.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

fn port_value(v: &Value) -> Option<u16> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()).filter(|p| *p != 0),
        Value::String(s) => parse_port(s),
        _ => None,
    }
}

/// Interpret a targets document: a JSON array of `{host, port}` objects.
///
/// Entries without a usable host are skipped. A missing port means 443.
pub fn parse_targets(path: &Path, doc: &Value) -> Result<Vec<Target>, InputError> {
    let entries = doc
        .as_array()
        .ok_or_else(|| InputError::invalid(path, "targets document must be a JSON array"))?;
    let mut targets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let host = entry.get("host").and_then(Value::as_str).map(str::trim).unwrap_or("");
        if host.is_empty() {
            tracing::debug!(index, "skipping target entry without host");
            continue;
        }
        let port = match entry.get("port") {
            None | Some(Value::Null) => DEFAULT_TLS_PORT,
            Some(v) => port_value(v).ok_or_else(|| {
                InputError::invalid(path, format!("entry {index} ({host}): invalid port {v}"))
            })?,
        };
        targets.push(Target::new(host, port));
    }
    Ok(targets)
}

/// Read and interpret a targets document from disk.
pub fn load_targets(path: &Path) -> Result<Vec<Target>, InputError> {
    let doc = read_json("targets", path)?;
    parse_targets(path, &doc)
}
