//! Self-contained HTML rendering of a [`Report`].

use crate::findings::FindingsPreview;
use crate::tls::TlsSummary;
use crate::Report;

/// Escape the three characters that would break table markup. Not a general sanitiser.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>PQC Readiness Summary</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 40px; }
    h1, h2 { color: #333; }
    table { border-collapse: collapse; margin-top: 10px; }
    th, td { border: 1px solid #ccc; padding: 6px 10px; vertical-align: top; }
    th { background-color: #f4f4f4; }
  </style>
</head>
<body>

<h1>PQC Readiness Summary</h1>
"#;

const TAIL: &str = r#"
<p>This report is a high-level summary. Per-metric values are in report_summary.csv; full detail stays in the source documents.</p>

</body>
</html>
"#;

pub fn render_html(report: &Report) -> String {
    let mut out = String::from(HEAD);
    let host = &report.host;
    let os = if host.os_version.is_empty() {
        escape_html(&host.os_caption)
    } else {
        format!("{} ({})", escape_html(&host.os_caption), escape_html(&host.os_version))
    };
    out.push_str(&format!(
        "\n<p><strong>Generated:</strong> {}</p>\n<p><strong>Host:</strong> {}</p>\n<p><strong>OS:</strong> {}</p>\n",
        escape_html(&host.generated_at),
        escape_html(&host.computer_name),
        os,
    ));

    let certs = &report.certificates;
    out.push_str("\n<h2>Certificate Inventory Overview</h2>\n\n<table>\n  <tr><th>Public Key Algorithm</th><th>Count</th></tr>\n");
    for (algorithm, count) in &certs.by_algorithm {
        out.push_str(&format!("  <tr><td>{}</td><td>{}</td></tr>\n", escape_html(algorithm), count));
    }
    out.push_str("</table>\n");

    out.push_str(&format!(
        "\n<h2>Hygiene Signals</h2>\n\n<ul>\n  <li>Total certificates: {}</li>\n  <li>Expired certificates: {}</li>\n  <li>Certificates expiring within 30 days: {}</li>\n</ul>\n",
        certs.total, certs.expired, certs.expiring,
    ));

    if let Some(tls) = &report.tls {
        render_tls(&mut out, tls);
    }
    if let Some(findings) = &report.findings {
        render_findings(&mut out, findings);
    }

    out.push_str(TAIL);
    out
}

fn render_tls(out: &mut String, tls: &TlsSummary) {
    out.push_str(&format!(
        "\n<h2>TLS Endpoint Summary</h2>\n\n<p>Endpoints probed: {}, succeeded: {}, failed: {}</p>\n\n",
        tls.total,
        tls.succeeded,
        tls.failed(),
    ));
    out.push_str("<table>\n  <tr><th>Target</th><th>Success</th><th>Protocol</th><th>Cipher Suite</th><th>Cert Not After</th><th>Error</th></tr>\n");
    for row in &tls.rows {
        out.push_str(&format!(
            "  <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.target),
            row.success,
            escape_html(&row.protocol),
            escape_html(&row.cipher_suite),
            escape_html(&row.cert_not_after),
            escape_html(&row.error),
        ));
    }
    out.push_str("</table>\n");
}

fn render_findings(out: &mut String, findings: &FindingsPreview) {
    out.push_str("\n<h2>Findings</h2>\n\n");
    if findings.rows.is_empty() {
        out.push_str("<p>No findings were reported.</p>\n");
        return;
    }
    out.push_str(&format!("<p>Showing the first {} row(s) of the findings document.</p>\n\n<table>\n  <tr>", findings.rows.len()));
    for col in &findings.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(col)));
    }
    out.push_str("</tr>\n");
    for row in &findings.rows {
        out.push_str("  <tr>");
        for col in &findings.columns {
            out.push_str(&format!("<td>{}</td>", escape_html(row.get(col).unwrap_or(""))));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_structural_characters_only() {
        assert_eq!(escape_html("<b>R&D</b> \"q\" 'a'"), "&lt;b&gt;R&amp;D&lt;/b&gt; \"q\" 'a'");
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }
}
