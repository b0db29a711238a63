use anyhow::Result;
#[cfg(any(feature = "probe", feature = "report"))]
use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
#[cfg(feature = "probe")]
use pqc_core::Target;
use std::path::PathBuf;
#[cfg(feature = "report")]
use time::format_description::well_known::Rfc3339;
#[cfg(feature = "report")]
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

mod config;

#[cfg(feature = "probe")]
const DEFAULT_TIMEOUT_MS: u64 = 5000;
#[cfg(feature = "probe")]
const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Parser)]
#[command(name = "pqc-toolbox", version, about = "PQC readiness inventory: TLS endpoint probe and readiness report")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./pqc-toolbox.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Handshake with TLS endpoints and record negotiated parameters and the leaf certificate
    #[cfg(feature = "probe")]
    Probe {
        /// Ad-hoc targets as host[:port] (IPv6 as [addr]:port)
        #[arg(conflicts_with = "targets")]
        target: Vec<Target>,
        /// JSON targets document: [{"host": "...", "port": 443}, ...]
        #[arg(long, value_name = "FILE")]
        targets: Option<PathBuf>,
        /// Results file (JSON array, overwritten)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Per-target budget for resolve, connect and handshake, in milliseconds [default: 5000]
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Max concurrent probes [default: 16]
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Correlate inventory, probe results and findings into report.html and report_summary.csv
    #[cfg(feature = "report")]
    Report {
        /// Certificate inventory (JSON object)
        #[arg(long, value_name = "FILE")]
        inventory: PathBuf,
        /// Probe results written by `probe`
        #[arg(long, value_name = "FILE")]
        tls_scan: Option<PathBuf>,
        /// Findings CSV
        #[arg(long, value_name = "FILE")]
        findings: Option<PathBuf>,
        /// Output directory, created if missing
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Judge certificate expiry at this RFC 3339 instant instead of now
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<OffsetDateTime>,
    },
}

#[cfg(feature = "report")]
fn parse_as_of(s: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    #[cfg(any(feature = "probe", feature = "report"))]
    let loaded_cfg = config::load_config(cli.config.as_deref());
    #[cfg(not(any(feature = "probe", feature = "report")))]
    let _ = config::load_config(cli.config.as_deref());
    match cli.command {
        Commands::Version => {
            println!("pqc-toolbox {} (core {})", env!("CARGO_PKG_VERSION"), pqc_core::version());
        }
        #[cfg(feature = "probe")]
        Commands::Probe { target, targets, out, timeout_ms, concurrency } => {
            let cfg = loaded_cfg.probe();
            let out = out
                .or(cfg.out)
                .ok_or_else(|| anyhow!("provide --out <FILE> (or probe.out in the config)"))?;
            let timeout_ms = timeout_ms.or(cfg.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
            let concurrency = concurrency.or(cfg.concurrency).unwrap_or(DEFAULT_CONCURRENCY);
            if concurrency == 0 {
                return Err(anyhow!("--concurrency must be > 0"));
            }

            let targets_list = match targets {
                Some(path) => pqc_core::load_targets(&path)?,
                None if !target.is_empty() => target,
                None => return Err(anyhow!("provide a target or --targets <FILE>")),
            };
            tracing::info!(targets = targets_list.len(), timeout_ms, concurrency, "probing");

            let prober = tls_probe::Prober::new()?;
            let rt = tokio::runtime::Runtime::new()?;
            let results = rt.block_on(tls_probe::probe_many(
                &prober,
                targets_list,
                std::time::Duration::from_millis(timeout_ms),
                concurrency,
            ));
            tls_probe::write_results(&out, &results)?;
            println!("Wrote: {}", out.display());
        }
        #[cfg(feature = "report")]
        Commands::Report { inventory, tls_scan, findings, out_dir, as_of } => {
            let cfg = loaded_cfg.report();
            let out_dir = out_dir
                .or(cfg.out_dir)
                .ok_or_else(|| anyhow!("provide --out-dir <DIR> (or report.out_dir in the config)"))?;
            let paths = readiness_report::ReportPaths { inventory, tls_scan, findings: findings.or(cfg.findings) };
            let inputs = readiness_report::ReportInputs::load(&paths)?;
            let now = as_of.unwrap_or_else(OffsetDateTime::now_utc);
            let report = readiness_report::build_report(&inputs, now);
            let files = readiness_report::write_report(&report, &out_dir)?;
            println!("Wrote: {}", files.html.display());
            println!("Wrote: {}", files.summary_csv.display());
        }
    }
    Ok(())
}
