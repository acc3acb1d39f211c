use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::core::clients::{CostApi, GroupDimension, ObjectStore};
use crate::core::config::ReportConfig;
use crate::core::error::ReportError;
use crate::core::models::envelope::ResponseEnvelope;
use crate::core::models::record::BillingReport;
use crate::core::transform;
use crate::core::window::CostQueryWindow;

/// JSON document published for the per-service snapshot.
#[derive(Debug, Serialize)]
struct SnapshotDocument {
    billing_data: Vec<MonthEntry>,
    summary: SnapshotSummary,
}

#[derive(Debug, Serialize)]
struct MonthEntry {
    month: String,
    services: Vec<ServiceCost>,
    monthly_total: f64,
}

#[derive(Debug, Serialize)]
struct ServiceCost {
    service: String,
    cost_usd: f64,
}

#[derive(Debug, Serialize)]
struct SnapshotSummary {
    total_cost: f64,
    start_date: String,
    end_date: String,
}

/// Build the per-service cost snapshot for the trailing year and publish it
/// to object storage.
///
/// The upload is best-effort: a failed write is logged and the document is
/// still returned to the caller. Every other failure becomes a 500 envelope.
pub async fn run(
    cost: &dyn CostApi,
    store: &dyn ObjectStore,
    config: &ReportConfig,
    today: NaiveDate,
) -> ResponseEnvelope {
    let (bucket, body) = match build(cost, config, today).await {
        Ok(output) => output,
        Err(err) => {
            error!(error = %err, "snapshot pipeline failed");
            return err.into_envelope();
        }
    };

    if let Err(err) = store
        .put_object(
            &bucket,
            &config.snapshot_key,
            body.clone().into_bytes(),
            "application/json",
        )
        .await
    {
        warn!(
            bucket = %bucket,
            key = %config.snapshot_key,
            error = %format!("{err:#}"),
            "snapshot upload failed; returning document anyway"
        );
    }

    ResponseEnvelope::success(body, "application/json")
}

async fn build(
    cost: &dyn CostApi,
    config: &ReportConfig,
    today: NaiveDate,
) -> Result<(String, String), ReportError> {
    let bucket = config.snapshot_bucket().map_err(ReportError::Config)?;

    let window = CostQueryWindow::trailing_year(today, false);
    info!(start = %window.start_str(), end = %window.end_str(), "querying service costs");

    let page = cost
        .query_monthly_cost(&window, GroupDimension::Service)
        .await
        .map_err(ReportError::CostQuery)?;
    let report = transform::build_report(&page, config.usd_to_inr)?;

    let body = serde_json::to_string(&document(&report, &window))
        .context("failed to serialize snapshot document")
        .map_err(ReportError::Other)?;
    Ok((bucket, body))
}

fn document(report: &BillingReport, window: &CostQueryWindow) -> SnapshotDocument {
    let billing_data = report
        .monthly_totals
        .iter()
        .map(|month| MonthEntry {
            month: month.month_period.clone(),
            services: report
                .records
                .iter()
                .filter(|r| r.month_period == month.month_period)
                .map(|r| ServiceCost {
                    service: r.group_key.clone(),
                    cost_usd: r.cost_usd,
                })
                .collect(),
            monthly_total: month.total_usd,
        })
        .collect();

    SnapshotDocument {
        billing_data,
        summary: SnapshotSummary {
            total_cost: report.total_usd,
            start_date: window.start_str(),
            end_date: window.end_str(),
        },
    }
}
