use anyhow::Result;
use clap::Parser;
use oa_medline::{run, Config};
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,oa_medline=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) parse options ────────────────────────────────────────────
    let config = Config::parse();
    info!(?config, "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    match run(&config).await {
        Ok(report) => {
            println!(
                "{} of {} DOAJ journals are indexed in MEDLINE ({} MEDLINE journals checked)",
                report.matched, report.after_prefilter, report.medline_journals
            );
            for path in &report.outputs {
                println!("wrote {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("oa_medline error: {:#}", e);
            process::exit(1);
        }
    }
}
