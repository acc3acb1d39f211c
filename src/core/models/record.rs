use serde::{Deserialize, Serialize};

/// One billed line item: a single (month, group) pair from the cost query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Running serial number, 1-based, in encounter order.
    pub sl_no: usize,
    /// Linked account ID or service name, depending on the grouping dimension.
    pub group_key: String,
    /// Month label, e.g. "August 2025".
    pub month_period: String,
    pub cost_usd: f64,
    pub cost_inr: f64,
}

/// Total cost for one month across all groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month_period: String,
    pub total_usd: f64,
}

/// Aggregated view of one cost query: flat records in encounter order plus
/// the per-month and grand totals derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingReport {
    pub records: Vec<CostRecord>,
    pub monthly_totals: Vec<MonthlyTotal>,
    pub total_usd: f64,
    pub total_inr: f64,
}
