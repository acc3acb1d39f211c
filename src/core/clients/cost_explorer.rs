use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity, GroupDefinition, GroupDefinitionType, ResultByTime,
};
use chrono::NaiveDate;

use crate::core::clients::{CostApi, CostPage, GroupCost, GroupDimension, MonthBucket};
use crate::core::window::CostQueryWindow;

const METRIC: &str = "UnblendedCost";

/// AWS Cost Explorer implementation of [`CostApi`].
pub struct CostExplorerApi {
    client: aws_sdk_costexplorer::Client,
}

impl CostExplorerApi {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_costexplorer::Client::new(config),
        }
    }
}

#[async_trait]
impl CostApi for CostExplorerApi {
    async fn query_monthly_cost(
        &self,
        window: &CostQueryWindow,
        dimension: GroupDimension,
    ) -> Result<CostPage> {
        let period = DateInterval::builder()
            .start(window.start_str())
            .end(window.end_str())
            .build()
            .context("invalid cost query time period")?;

        let response = self
            .client
            .get_cost_and_usage()
            .time_period(period)
            .granularity(Granularity::Monthly)
            .metrics(METRIC)
            .group_by(
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key(dimension.key())
                    .build(),
            )
            .send()
            .await
            .context("GetCostAndUsage call failed")?;

        page_from_results(response.results_by_time())
    }
}

/// Reshape the API's time-bucketed results into the wire model, keeping the
/// string-decimal amounts untouched.
fn page_from_results(results: &[ResultByTime]) -> Result<CostPage> {
    let mut buckets = Vec::with_capacity(results.len());

    for result in results {
        let start = result
            .time_period()
            .map(|p| p.start())
            .context("result bucket is missing its time period")?;
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .with_context(|| format!("unparseable bucket start date '{start}'"))?;

        let mut groups = Vec::new();
        for group in result.groups() {
            let key = group
                .keys()
                .first()
                .with_context(|| format!("cost group in bucket {start} has no key"))?
                .clone();
            let amount = group
                .metrics()
                .and_then(|m| m.get(METRIC))
                .and_then(|v| v.amount())
                .with_context(|| format!("cost group '{key}' has no {METRIC} amount"))?
                .to_string();
            groups.push(GroupCost { key, amount });
        }

        buckets.push(MonthBucket { start, groups });
    }

    Ok(CostPage { buckets })
}
