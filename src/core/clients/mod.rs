pub mod cost_explorer;
pub mod s3;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::window::CostQueryWindow;

/// Dimension the cost query is bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    LinkedAccount,
    Service,
}

impl GroupDimension {
    /// Dimension key in the cost API's vocabulary.
    pub fn key(&self) -> &'static str {
        match self {
            Self::LinkedAccount => "LINKED_ACCOUNT",
            Self::Service => "SERVICE",
        }
    }
}

/// Cost for one group within one month bucket. The amount stays in the
/// API's string-decimal encoding; parsing happens at aggregation time.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCost {
    pub key: String,
    pub amount: String,
}

/// One month of grouped costs. `start` is the bucket's first day.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub start: NaiveDate,
    pub groups: Vec<GroupCost>,
}

/// A cost query result: month buckets in time order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostPage {
    pub buckets: Vec<MonthBucket>,
}

/// Upstream cost-reporting API. Production wires AWS Cost Explorer; tests
/// wire fakes.
#[async_trait]
pub trait CostApi: Send + Sync {
    /// Query unblended cost at monthly granularity over `window`, grouped by
    /// a single dimension. One attempt, no retry.
    async fn query_monthly_cost(
        &self,
        window: &CostQueryWindow,
        dimension: GroupDimension,
    ) -> Result<CostPage>;
}

/// Object storage the reports read templates from and publish snapshots to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Unconditional overwrite; the object is left world-readable.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;
}

/// Load the shared AWS configuration from the ambient credential chain,
/// optionally pinning a region.
pub async fn load_aws_config(region: Option<String>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_keys_match_the_cost_api_vocabulary() {
        assert_eq!(GroupDimension::LinkedAccount.key(), "LINKED_ACCOUNT");
        assert_eq!(GroupDimension::Service.key(), "SERVICE");
    }
}
