use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::core::clients;
use crate::core::clients::cost_explorer::CostExplorerApi;
use crate::core::clients::s3::S3Store;
use crate::core::config::AppConfig;
use crate::core::models::envelope::ResponseEnvelope;
use crate::core::report;

/// Which report pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Per-account HTML dashboard.
    Dashboard,
    /// Per-service JSON snapshot.
    Snapshot,
}

/// Wire up the real AWS clients, run the selected pipeline once, and emit
/// the resulting envelope.
pub async fn run(kind: ReportKind, opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();

    let aws = clients::load_aws_config(config.report.region.clone()).await;
    let cost = CostExplorerApi::new(&aws);
    let store = S3Store::new(&aws);

    let today = Local::now().date_naive();
    let envelope = match kind {
        ReportKind::Dashboard => {
            report::dashboard::run(&cost, &store, &config.report, today).await
        }
        ReportKind::Snapshot => report::snapshot::run(&cost, &store, &config.report, today).await,
    };

    emit(&envelope, opts)?;

    if !envelope.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the envelope: JSON mode emits the whole envelope in the hosting
/// platform's shape, text mode prints just the body.
fn emit(envelope: &ResponseEnvelope, opts: &OutputOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{}", envelope.body);
            if opts.verbose {
                eprintln!("status: {}", envelope.status_code);
                for (name, value) in &envelope.headers {
                    eprintln!("{}: {}", name, value);
                }
            }
            if !envelope.is_success() {
                let msg = format!("report failed with status {}", envelope.status_code);
                if opts.use_color {
                    colored::control::set_override(true);
                    eprintln!("{}", msg.red());
                } else {
                    eprintln!("{}", msg);
                }
            }
        }
    }
    Ok(())
}
