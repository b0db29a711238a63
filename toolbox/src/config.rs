use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "pqc-toolbox.yaml";

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub out_dir: Option<PathBuf>,
    pub findings: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub probe: Option<ProbeConfig>,
    pub report: Option<ReportConfig>,
}

impl Config {
    pub fn probe(&self) -> ProbeConfig {
        self.probe.clone().unwrap_or_default()
    }

    pub fn report(&self) -> ReportConfig {
        self.report.clone().unwrap_or_default()
    }
}

/// Load `path`, or `./pqc-toolbox.yaml` when no path is given and it exists.
/// An unreadable or malformed file is reported and otherwise ignored.
pub fn load_config(path: Option<&Path>) -> Config {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return Config::default(); }
        }
    };
    let s = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config file unreadable; using defaults");
            return Config::default();
        }
    };
    parse_config(&s).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "config file invalid; using defaults");
        Config::default()
    })
}

fn parse_config(s: &str) -> Result<Config, serde_yaml::Error> {
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_sections() {
        let cfg = parse_config("probe:\n  timeout_ms: 2500\n  out: tls.json\nreport:\n  out_dir: out\n").unwrap();
        assert_eq!(cfg.probe().timeout_ms, Some(2500));
        assert_eq!(cfg.probe().concurrency, None);
        assert_eq!(cfg.probe().out, Some(PathBuf::from("tls.json")));
        assert_eq!(cfg.report().out_dir, Some(PathBuf::from("out")));
        assert_eq!(cfg.report().findings, None);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
        assert_eq!(parse_config("  \n").unwrap(), Config::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"probe: [unterminated").unwrap();
        assert_eq!(load_config(Some(f.path())), Config::default());
    }

    #[test]
    fn missing_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(Some(&dir.path().join("absent.yaml"))), Config::default());
    }
}
