//! # Statistics Engine
//!
//! Read-side aggregation over ledger records. Every function is a fold over
//! the slice it is given; nothing is cached between calls.
//!
//! Sums saturate at the ends of the money range instead of overflowing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LedgerRecord, Order, OrderStatus, Purchase, PurchaseStatus};

// =============================================================================
// Order / Purchase statistics
// =============================================================================

/// Counts and sums over all orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Σ order total.
    pub total_revenue: Money,
    /// Σ paid amount.
    pub total_collected: Money,
    /// Σ remaining amount. Overpayments reduce it.
    pub total_pending: Money,
}

/// Counts and sums over all purchases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseStatistics {
    pub total: usize,
    pub paid: usize,
    pub pending: usize,
    /// Σ purchase total cost.
    pub total_expense: Money,
    pub total_paid: Money,
    pub total_pending: Money,
}

pub fn order_statistics(orders: &[Order]) -> OrderStatistics {
    orders
        .iter()
        .fold(OrderStatistics::default(), |mut stats, order| {
            stats.total += 1;
            match order.status {
                OrderStatus::Completed => stats.completed += 1,
                OrderStatus::Pending => stats.pending += 1,
            }
            stats.total_revenue = stats.total_revenue.saturating_add(order.total);
            stats.total_collected = stats.total_collected.saturating_add(order.paid_amount);
            stats.total_pending = stats.total_pending.saturating_add(order.remaining_amount);
            stats
        })
}

pub fn purchase_statistics(purchases: &[Purchase]) -> PurchaseStatistics {
    purchases
        .iter()
        .fold(PurchaseStatistics::default(), |mut stats, purchase| {
            stats.total += 1;
            match purchase.status {
                PurchaseStatus::Paid => stats.paid += 1,
                PurchaseStatus::Pending => stats.pending += 1,
            }
            stats.total_expense = stats.total_expense.saturating_add(purchase.total_cost);
            stats.total_paid = stats.total_paid.saturating_add(purchase.paid_amount);
            stats.total_pending = stats.total_pending.saturating_add(purchase.remaining_amount);
            stats
        })
}

// =============================================================================
// Profit / Loss
// =============================================================================

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Both ends inclusive. A range with `start > end` contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Smallest range covering every record's date, if there are any.
    pub fn spanning<R: LedgerRecord>(records: &[R]) -> Option<DateRange> {
        let mut dates = records.iter().map(LedgerRecord::date);
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange { start, end })
    }

    /// Smallest range covering both ranges.
    pub fn union(self, other: DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Sales against purchases for a period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLoss {
    pub total_sales: Money,
    pub total_purchases: Money,
    /// Sales minus purchases. Negative is a loss.
    pub profit_loss: Money,
    /// Profit as a percentage of sales, two decimals. 0 without sales.
    pub margin: f64,
}

/// Profit/loss over the records dated within `range`, or over everything
/// when no range is given.
pub fn profit_loss(orders: &[Order], purchases: &[Purchase], range: Option<DateRange>) -> ProfitLoss {
    let in_range = |date: NaiveDate| range.map_or(true, |r| r.contains(date));

    let total_sales: Money = orders
        .iter()
        .filter(|o| in_range(o.date))
        .map(|o| o.total)
        .sum();
    let total_purchases: Money = purchases
        .iter()
        .filter(|p| in_range(p.date))
        .map(|p| p.total_cost)
        .sum();
    let profit_loss = total_sales.saturating_sub(total_purchases);

    ProfitLoss {
        total_sales,
        total_purchases,
        profit_loss,
        margin: profit_loss.percentage_of(total_sales),
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the overview page shows, computed in one pass over both
/// collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub orders: OrderStatistics,
    pub purchases: PurchaseStatistics,
    pub profit_loss: ProfitLoss,
    /// Period the profit/loss covers; `None` for all time.
    pub range: Option<DateRange>,
    /// Most recent orders, newest first.
    pub recent_orders: Vec<Order>,
}

/// How many orders [`dashboard`] lists.
pub const RECENT_ORDER_LIMIT: usize = 5;

/// `orders` is expected newest first, as the ledger returns it.
pub fn dashboard(orders: &[Order], purchases: &[Purchase], range: Option<DateRange>) -> DashboardSummary {
    DashboardSummary {
        orders: order_statistics(orders),
        purchases: purchase_statistics(purchases),
        profit_loss: profit_loss(orders, purchases, range),
        range,
        recent_orders: orders.iter().take(RECENT_ORDER_LIMIT).cloned().collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn order(id: &str, date: NaiveDate, total: i64, paid: i64) -> Order {
        let mut order = Order {
            id: id.to_string(),
            date,
            customer_name: "City Mart".to_string(),
            items: Vec::new(),
            subtotal: Money::from_cents(total),
            tax: Money::zero(),
            total: Money::from_cents(total),
            payment_method: PaymentMethod::Cash,
            paid_amount: Money::zero(),
            remaining_amount: Money::zero(),
            status: OrderStatus::Pending,
        };
        order.settle(Money::from_cents(paid));
        order
    }

    fn purchase(id: &str, date: NaiveDate, cost: i64, paid: i64) -> Purchase {
        let mut purchase = Purchase {
            id: id.to_string(),
            date,
            supplier_name: "Grain Traders".to_string(),
            items: Vec::new(),
            total_cost: Money::from_cents(cost),
            paid_amount: Money::zero(),
            remaining_amount: Money::zero(),
            status: PurchaseStatus::Pending,
        };
        purchase.settle(Money::from_cents(paid));
        purchase
    }

    #[test]
    fn test_purchase_statistics_scenario() {
        let purchases = vec![
            purchase("PUR-1", day(1), 10_000, 10_000),
            purchase("PUR-2", day(2), 20_000, 5_000),
        ];

        let stats = purchase_statistics(&purchases);

        assert_eq!(
            stats,
            PurchaseStatistics {
                total: 2,
                paid: 1,
                pending: 1,
                total_expense: Money::from_cents(30_000),
                total_paid: Money::from_cents(15_000),
                total_pending: Money::from_cents(15_000),
            }
        );
    }

    #[test]
    fn test_order_statistics() {
        let orders = vec![
            order("ORD-1", day(3), 554_541, 554_541),
            order("ORD-2", day(4), 554_541, 200_000),
            order("ORD-3", day(5), 1_000, 1_500),
        ];

        let stats = order_statistics(&orders);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_revenue, Money::from_cents(1_110_082));
        assert_eq!(stats.total_collected, Money::from_cents(756_041));
        // 354_541 outstanding minus 500 overpaid.
        assert_eq!(stats.total_pending, Money::from_cents(354_041));
        assert_eq!(
            stats.total_pending,
            stats.total_revenue - stats.total_collected
        );
    }

    #[test]
    fn test_empty_statistics() {
        assert_eq!(order_statistics(&[]), OrderStatistics::default());
        assert_eq!(purchase_statistics(&[]), PurchaseStatistics::default());

        let pl = profit_loss(&[], &[], None);
        assert!(pl.profit_loss.is_zero());
        assert_eq!(pl.margin, 0.0);
    }

    #[test]
    fn test_profit_loss_all_time() {
        let orders = vec![order("ORD-1", day(10), 100_000, 0)];
        let purchases = vec![purchase("PUR-1", day(9), 75_000, 0)];

        let pl = profit_loss(&orders, &purchases, None);

        assert_eq!(pl.total_sales, Money::from_cents(100_000));
        assert_eq!(pl.total_purchases, Money::from_cents(75_000));
        assert_eq!(pl.profit_loss, Money::from_cents(25_000));
        assert_eq!(pl.margin, 25.0);
    }

    #[test]
    fn test_profit_loss_loss_and_no_sales() {
        let orders = vec![order("ORD-1", day(10), 30_000, 0)];
        let purchases = vec![purchase("PUR-1", day(10), 120_000, 0)];

        let pl = profit_loss(&orders, &purchases, None);
        assert_eq!(pl.profit_loss, Money::from_cents(-90_000));
        assert_eq!(pl.margin, -300.0);

        let pl = profit_loss(&[], &purchases, None);
        assert_eq!(pl.profit_loss, Money::from_cents(-120_000));
        assert_eq!(pl.margin, 0.0);
    }

    #[test]
    fn test_profit_loss_range_is_inclusive() {
        let orders = vec![
            order("ORD-3", day(20), 5_000, 0),
            order("ORD-2", day(15), 3_000, 0),
            order("ORD-1", day(10), 1_000, 0),
        ];
        let purchases = vec![
            purchase("PUR-2", day(16), 700, 0),
            purchase("PUR-1", day(9), 400, 0),
        ];

        let pl = profit_loss(&orders, &purchases, Some(DateRange::new(day(10), day(15))));

        assert_eq!(pl.total_sales, Money::from_cents(4_000));
        assert_eq!(pl.total_purchases, Money::zero());

        let inverted = profit_loss(&orders, &purchases, Some(DateRange::new(day(15), day(10))));
        assert!(inverted.total_sales.is_zero());
    }

    #[test]
    fn test_no_range_equals_spanning_range() {
        let orders = vec![
            order("ORD-2", day(18), 12_345, 0),
            order("ORD-1", day(4), 6_789, 0),
        ];
        let purchases = vec![
            purchase("PUR-2", day(25), 9_999, 0),
            purchase("PUR-1", day(2), 1_111, 0),
        ];

        let span = DateRange::spanning(&orders)
            .unwrap()
            .union(DateRange::spanning(&purchases).unwrap());
        assert_eq!(span, DateRange::new(day(2), day(25)));

        assert_eq!(
            profit_loss(&orders, &purchases, None),
            profit_loss(&orders, &purchases, Some(span))
        );
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_overflowing() {
        let near_max = i64::MAX - 100;
        let orders = vec![
            order("ORD-2", day(2), near_max, near_max),
            order("ORD-1", day(1), near_max, 0),
        ];
        let purchases = vec![
            purchase("PUR-2", day(2), near_max, near_max),
            purchase("PUR-1", day(1), near_max, 0),
        ];

        let stats = order_statistics(&orders);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.total_revenue, Money::from_cents(i64::MAX));
        assert_eq!(stats.total_collected, Money::from_cents(near_max));

        let stats = purchase_statistics(&purchases);
        assert_eq!(stats.total_expense, Money::from_cents(i64::MAX));

        let pl = profit_loss(&orders, &[], None);
        assert_eq!(pl.total_sales, Money::from_cents(i64::MAX));
        assert_eq!(pl.margin, 100.0);

        let pl = profit_loss(&[], &purchases, None);
        assert_eq!(pl.profit_loss, Money::from_cents(-i64::MAX));
    }

    #[test]
    fn test_spanning_empty() {
        assert_eq!(DateRange::spanning::<Order>(&[]), None);
    }

    #[test]
    fn test_dashboard() {
        let orders: Vec<Order> = (1..=7)
            .rev()
            .map(|d| order(&format!("ORD-{}", d), day(d), 1_000, 1_000))
            .collect();
        let purchases = vec![purchase("PUR-1", day(1), 2_000, 0)];

        let summary = dashboard(&orders, &purchases, None);

        assert_eq!(summary.orders.total, 7);
        assert_eq!(summary.purchases.pending, 1);
        assert_eq!(summary.profit_loss.profit_loss, Money::from_cents(5_000));
        assert_eq!(summary.recent_orders.len(), RECENT_ORDER_LIMIT);
        assert_eq!(summary.recent_orders[0].id, "ORD-7");
    }
}
