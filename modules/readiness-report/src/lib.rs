//! PQC readiness report: correlates a certificate inventory with optional TLS probe results
//! and an optional findings CSV into `report.html` and `report_summary.csv`.
//!
//! Only missing or undecodable input documents are errors. Every per-record problem degrades
//! the output instead.

pub mod fields;
pub mod findings;
pub mod html;
pub mod inventory;
pub mod summary;
pub mod tls;

use pqc_core::{open_bom_tolerant, read_json, InputError};
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub use findings::{FindingRow, FindingsPreview};
pub use inventory::{CertificateSummary, HostInfo};
pub use tls::{TlsRow, TlsSummary};

pub const REPORT_HTML: &str = "report.html";
pub const SUMMARY_CSV: &str = "report_summary.csv";

/// Where to read the inputs from. `None` omits that section.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub inventory: PathBuf,
    pub tls_scan: Option<PathBuf>,
    pub findings: Option<PathBuf>,
}

/// Inputs as loaded from disk, before any aggregation.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub inventory: Value,
    pub tls_results: Option<Vec<Value>>,
    pub findings: Option<FindingsPreview>,
}

impl ReportInputs {
    pub fn load(paths: &ReportPaths) -> Result<Self, InputError> {
        let inventory = read_json("inventory", &paths.inventory)?;
        if !inventory.is_object() {
            return Err(InputError::invalid(&paths.inventory, "inventory document must be a JSON object"));
        }
        let tls_results = paths.tls_scan.as_deref().map(load_tls_results).transpose()?;
        let findings = paths.findings.as_deref().map(load_findings).transpose()?;
        Ok(ReportInputs { inventory, tls_results, findings })
    }
}

fn load_tls_results(path: &Path) -> Result<Vec<Value>, InputError> {
    match read_json("TLS scan", path)? {
        Value::Array(items) => Ok(items),
        _ => Err(InputError::invalid(path, "TLS scan document must be a JSON array")),
    }
}

fn load_findings(path: &Path) -> Result<FindingsPreview, InputError> {
    let reader = open_bom_tolerant("findings", path)?;
    findings::read_preview(reader, findings::PREVIEW_ROWS)
        .map_err(|e| InputError::invalid(path, format!("unreadable findings CSV: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub host: HostInfo,
    pub certificates: CertificateSummary,
    pub tls: Option<TlsSummary>,
    pub findings: Option<FindingsPreview>,
}

impl Report {
    pub fn html(&self) -> String {
        html::render_html(self)
    }

    pub fn summary(&self) -> Vec<(String, String)> {
        summary::summary_rows(self)
    }
}

/// Aggregate loaded inputs. `now` is the capture time certificate expiry is judged against.
pub fn build_report(inputs: &ReportInputs, now: OffsetDateTime) -> Report {
    let certificates = inventory::summarize_certificates(&inputs.inventory, now);
    tracing::info!(
        total = certificates.total,
        expired = certificates.expired,
        expiring = certificates.expiring,
        undated = certificates.undated,
        "certificates aggregated"
    );
    let tls = inputs.tls_results.as_deref().map(tls::summarize_tls);
    if let Some(t) = &tls {
        tracing::info!(total = t.total, succeeded = t.succeeded, failed = t.failed(), "tls results aggregated");
    }
    Report {
        host: HostInfo::from_inventory(&inputs.inventory),
        certificates,
        tls,
        findings: inputs.findings.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub html: PathBuf,
    pub summary_csv: PathBuf,
}

/// Write `report.html` and `report_summary.csv` into `out_dir`, creating it if needed.
pub fn write_report(report: &Report, out_dir: &Path) -> Result<ReportFiles, InputError> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| InputError::Write { path, source }
    };
    std::fs::create_dir_all(out_dir).map_err(write_err(out_dir))?;

    let html_path = out_dir.join(REPORT_HTML);
    std::fs::write(&html_path, report.html()).map_err(write_err(&html_path))?;

    let csv_path = out_dir.join(SUMMARY_CSV);
    let file = File::create(&csv_path).map_err(write_err(&csv_path))?;
    summary::write_summary_csv(file, &report.summary())
        .map_err(|e| InputError::Write { path: csv_path.clone(), source: e.into() })?;

    Ok(ReportFiles { html: html_path, summary_csv: csv_path })
}
