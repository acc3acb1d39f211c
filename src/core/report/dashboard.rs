use anyhow::Context;
use chrono::NaiveDate;
use tracing::{error, info};

use crate::core::clients::{CostApi, GroupDimension, ObjectStore};
use crate::core::config::ReportConfig;
use crate::core::error::ReportError;
use crate::core::models::envelope::ResponseEnvelope;
use crate::core::models::record::CostRecord;
use crate::core::template;
use crate::core::transform;
use crate::core::window::CostQueryWindow;

/// Render the per-account billing dashboard for the trailing year.
///
/// Fetches the HTML template from object storage, queries monthly unblended
/// cost grouped by linked account, and substitutes the table rows and grand
/// totals into the template. Never returns an error: every failure becomes a
/// 500 envelope.
pub async fn run(
    cost: &dyn CostApi,
    store: &dyn ObjectStore,
    config: &ReportConfig,
    today: NaiveDate,
) -> ResponseEnvelope {
    match build(cost, store, config, today).await {
        Ok(html) => ResponseEnvelope::success(html, "text/html"),
        Err(err) => {
            error!(error = %err, "dashboard pipeline failed");
            err.into_envelope()
        }
    }
}

async fn build(
    cost: &dyn CostApi,
    store: &dyn ObjectStore,
    config: &ReportConfig,
    today: NaiveDate,
) -> Result<String, ReportError> {
    let bucket = config.dashboard_bucket();

    // The template is fetched first; a missing template means no cost query
    // is ever issued.
    let raw = store
        .get_object(&bucket, &config.template_key)
        .await
        .map_err(ReportError::TemplateFetch)?;
    let html_template = String::from_utf8(raw)
        .context("template is not valid UTF-8")
        .map_err(ReportError::TemplateFetch)?;

    let window = CostQueryWindow::trailing_year(today, true);
    info!(start = %window.start_str(), end = %window.end_str(), "querying account costs");

    let page = cost
        .query_monthly_cost(&window, GroupDimension::LinkedAccount)
        .await
        .map_err(ReportError::CostQuery)?;
    let report = transform::build_report(&page, config.usd_to_inr)?;

    Ok(template::render(
        &html_template,
        &[
            ("tableRows", table_rows(&report.records)),
            ("totalCostUSD", format!("${:.2}", report.total_usd)),
            ("totalCostINR", format!("₹{:.2}", report.total_inr)),
        ],
    ))
}

fn table_rows(records: &[CostRecord]) -> String {
    let mut rows = String::new();
    for record in records {
        rows.push_str(&format!(
            "<tr>\n    <td>{}</td>\n    <td>{}</td>\n    <td>{}</td>\n    <td>${:.2}</td>\n    <td>₹{:.2}</td>\n</tr>\n",
            record.sl_no, record.group_key, record.month_period, record.cost_usd, record.cost_inr
        ));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clients::{CostPage, GroupCost, MonthBucket};
    use anyhow::{anyhow, bail, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    const TEMPLATE: &str =
        "<html><table>{{tableRows}}</table><p>{{totalCostUSD}} / {{totalCostINR}}</p></html>";

    struct FakeCost {
        page: CostPage,
        called: AtomicBool,
    }

    impl FakeCost {
        fn with_month(amounts: &[(&str, &str)]) -> Self {
            Self {
                page: CostPage {
                    buckets: vec![MonthBucket {
                        start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                        groups: amounts
                            .iter()
                            .map(|(key, amount)| GroupCost {
                                key: key.to_string(),
                                amount: amount.to_string(),
                            })
                            .collect(),
                    }],
                },
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl CostApi for FakeCost {
        async fn query_monthly_cost(
            &self,
            _window: &CostQueryWindow,
            _dimension: GroupDimension,
        ) -> Result<CostPage> {
            self.called.store(true, Ordering::SeqCst);
            Ok(self.page.clone())
        }
    }

    struct FailingCost;

    #[async_trait]
    impl CostApi for FailingCost {
        async fn query_monthly_cost(
            &self,
            _window: &CostQueryWindow,
            _dimension: GroupDimension,
        ) -> Result<CostPage> {
            bail!("connection refused")
        }
    }

    struct FakeStore {
        template: Option<String>,
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Vec<u8>> {
            match &self.template {
                Some(t) => Ok(t.clone().into_bytes()),
                None => Err(anyhow!("NoSuchKey: index.html")),
            }
        }

        async fn put_object(
            &self,
            _bucket: &str,
            _key: &str,
            _body: Vec<u8>,
            _content_type: &str,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 8).unwrap()
    }

    #[tokio::test]
    async fn renders_rows_and_totals_into_the_template() {
        let cost = FakeCost::with_month(&[("111122223333", "100.00")]);
        let store = FakeStore {
            template: Some(TEMPLATE.to_string()),
        };
        let config = ReportConfig::default();

        let envelope = run(&cost, &store, &config, today()).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers.get("Content-Type").unwrap(), "text/html");
        assert_eq!(envelope.headers.get("Cache-Control").unwrap(), "no-cache");
        assert!(envelope.body.contains("<td>1</td>"));
        assert!(envelope.body.contains("<td>111122223333</td>"));
        assert!(envelope.body.contains("<td>January 2025</td>"));
        assert!(envelope.body.contains("$100.00"));
        assert!(envelope.body.contains("₹8300.00"));
        assert!(!envelope.body.contains("{{tableRows}}"));
        assert!(!envelope.body.contains("{{totalCostUSD}}"));
        assert!(!envelope.body.contains("{{totalCostINR}}"));
    }

    #[tokio::test]
    async fn one_row_per_account_per_month() {
        let cost = FakeCost::with_month(&[("111", "1.00"), ("222", "2.00"), ("333", "3.00")]);
        let store = FakeStore {
            template: Some(TEMPLATE.to_string()),
        };
        let envelope = run(&cost, &store, &ReportConfig::default(), today()).await;
        assert_eq!(envelope.body.matches("<tr>").count(), 3);
        assert!(envelope.body.contains("$6.00"));
    }

    #[tokio::test]
    async fn template_fetch_failure_skips_the_cost_query() {
        let cost = FakeCost::with_month(&[("111", "1.00")]);
        let store = FakeStore { template: None };
        let envelope = run(&cost, &store, &ReportConfig::default(), today()).await;

        assert_eq!(envelope.status_code, 500);
        assert!(!cost.called.load(Ordering::SeqCst));
        let body: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["error"], "Template Fetch Error");
        assert!(body["trace"].as_str().unwrap().contains("NoSuchKey"));
    }

    #[tokio::test]
    async fn cost_query_failure_is_a_cost_explorer_error() {
        let store = FakeStore {
            template: Some(TEMPLATE.to_string()),
        };
        let envelope = run(&FailingCost, &store, &ReportConfig::default(), today()).await;

        assert_eq!(envelope.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["error"], "Cost Explorer Error");
        assert!(body["details"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn non_utf8_template_is_a_template_fetch_error() {
        struct BinaryStore;

        #[async_trait]
        impl ObjectStore for BinaryStore {
            async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Vec<u8>> {
                Ok(vec![0xff, 0xfe, 0x00])
            }
            async fn put_object(
                &self,
                _bucket: &str,
                _key: &str,
                _body: Vec<u8>,
                _content_type: &str,
            ) -> Result<()> {
                Ok(())
            }
        }

        let cost = FakeCost::with_month(&[("111", "1.00")]);
        let envelope = run(&cost, &BinaryStore, &ReportConfig::default(), today()).await;
        assert_eq!(envelope.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["error"], "Template Fetch Error");
    }
}
