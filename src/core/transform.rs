use anyhow::{Context, Result};

use crate::core::clients::CostPage;
use crate::core::models::record::{BillingReport, CostRecord, MonthlyTotal};

/// Round to two decimal places. Amounts are rounded here, at the point of
/// aggregation, so repeated summation cannot accumulate sub-cent drift.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a dollar amount using an explicit exchange rate.
pub fn to_inr(usd: f64, usd_to_inr: f64) -> f64 {
    round2(usd * usd_to_inr)
}

/// Flatten a grouped cost page into billing records.
///
/// Emits one record per (month bucket, group) pair, in bucket order and then
/// group order within each bucket, numbering records from 1. Per-month and
/// grand totals are accumulated alongside.
pub fn build_report(page: &CostPage, usd_to_inr: f64) -> Result<BillingReport> {
    let mut records: Vec<CostRecord> = Vec::new();
    let mut monthly_totals: Vec<MonthlyTotal> = Vec::new();

    for bucket in &page.buckets {
        let month_period = bucket.start.format("%B %Y").to_string();
        let mut month_total = 0.0;

        for group in &bucket.groups {
            let raw: f64 = group.amount.trim().parse().with_context(|| {
                format!(
                    "unparseable cost amount {:?} for group '{}' in {}",
                    group.amount, group.key, month_period
                )
            })?;
            let cost_usd = round2(raw);
            let cost_inr = to_inr(cost_usd, usd_to_inr);
            records.push(CostRecord {
                sl_no: records.len() + 1,
                group_key: group.key.clone(),
                month_period: month_period.clone(),
                cost_usd,
                cost_inr,
            });
            month_total = round2(month_total + cost_usd);
        }

        monthly_totals.push(MonthlyTotal {
            month_period,
            total_usd: month_total,
        });
    }

    let total_usd = round2(records.iter().map(|r| r.cost_usd).sum());
    let total_inr = round2(records.iter().map(|r| r.cost_inr).sum());

    Ok(BillingReport {
        records,
        monthly_totals,
        total_usd,
        total_inr,
    })
}
