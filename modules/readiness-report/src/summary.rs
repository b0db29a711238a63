//! Flat `Metric,Value` table for spreadsheet and ticketing ingestion.

use crate::inventory::UNKNOWN_ALGORITHM;
use crate::Report;
use std::cmp::Ordering;
use std::io::Write;

fn flag(b: bool) -> String {
    if b { "true".into() } else { "false".into() }
}

/// Case-insensitive by name; the `Unknown` bucket (null algorithms) sorts last.
fn algorithm_order(a: &str, b: &str) -> Ordering {
    (a == UNKNOWN_ALGORITHM)
        .cmp(&(b == UNKNOWN_ALGORITHM))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

pub fn summary_rows(report: &Report) -> Vec<(String, String)> {
    let host = &report.host;
    let certs = &report.certificates;
    let mut rows: Vec<(String, String)> = vec![
        ("GeneratedAtUtc".into(), host.generated_at.clone()),
        ("Host.ComputerName".into(), host.computer_name.clone()),
        ("Host.OSCaption".into(), host.os_caption.clone()),
        ("Host.OSVersion".into(), host.os_version.clone()),
        ("Certificates.Total".into(), certs.total.to_string()),
        ("Certificates.Expired".into(), certs.expired.to_string()),
        ("Certificates.Expiring30".into(), certs.expiring.to_string()),
    ];

    let mut algorithms: Vec<&(String, usize)> = certs.by_algorithm.iter().collect();
    algorithms.sort_by(|a, b| algorithm_order(&a.0, &b.0));
    rows.extend(algorithms.into_iter().map(|(name, n)| (format!("Certificates.Algorithm.{name}"), n.to_string())));

    let (tls_total, tls_ok, tls_failed) = report
        .tls
        .as_ref()
        .map_or((0, 0, 0), |t| (t.total, t.succeeded, t.failed()));
    rows.push(("TLS.Provided".into(), flag(report.tls.is_some())));
    rows.push(("TLS.Total".into(), tls_total.to_string()));
    rows.push(("TLS.Success".into(), tls_ok.to_string()));
    rows.push(("TLS.Failure".into(), tls_failed.to_string()));

    rows.push(("FindingsCSV.Provided".into(), flag(report.findings.is_some())));
    let embedded = report.findings.as_ref().map_or(0, |f| f.rows.len());
    rows.push(("FindingsCSV.TopRowsEmbedded".into(), embedded.to_string()));
    rows
}

pub fn write_summary_csv<W: Write>(writer: W, rows: &[(String, String)]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Metric", "Value"])?;
    for (metric, value) in rows {
        wtr.write_record([metric, value])?;
    }
    wtr.flush()?;
    Ok(())
}
