//! Admin financial metrics

use chrono::{DateTime, Days, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::Order;
use shared::util::DAY_MILLIS;

use crate::error::ShopResult;
use crate::store::{OrderStore, UserStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    /// Short weekday name (`Mon`..`Sun`)
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_revenue: Decimal,
    pub sales_count: i64,
    pub active_users: i64,
    /// Last seven UTC days, oldest first, ending today
    pub weekly_sales: Vec<DailySales>,
}

/// Start of the UTC day six days before `now`, in epoch millis
fn window_start(now: DateTime<Utc>) -> i64 {
    let first_day = now
        .date_naive()
        .checked_sub_days(Days::new(6))
        .unwrap_or(now.date_naive());
    first_day.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis()
}

/// 按 UTC 日汇总最近七天的订单金额
///
/// Bucket order totals into the seven UTC days ending with `now`'s day
pub fn weekly_buckets(orders: &[Order], now: DateTime<Utc>) -> Vec<DailySales> {
    let start = window_start(now);

    let mut buckets: Vec<DailySales> = (0..7)
        .map(|i| {
            let day_start = start + i * DAY_MILLIS;
            let name = DateTime::from_timestamp_millis(day_start)
                .map(|d| d.format("%a").to_string())
                .unwrap_or_default();
            DailySales {
                name,
                total: Decimal::ZERO,
            }
        })
        .collect();

    for order in orders {
        let offset = order.created_at - start;
        if offset < 0 {
            continue;
        }
        let index = (offset / DAY_MILLIS) as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.total += order.total_amount;
        }
    }

    buckets
}

pub async fn financial_metrics<S>(store: &S, now: DateTime<Utc>) -> ShopResult<FinancialMetrics>
where
    S: OrderStore + UserStore + ?Sized,
{
    let (total_revenue, sales_count) = store.order_totals().await?;
    let active_users = store.count_users().await?;
    let recent = store.orders_since(window_start(now)).await?;

    Ok(FinancialMetrics {
        total_revenue,
        sales_count,
        active_users,
        weekly_sales: weekly_buckets(&recent, now),
    })
}
