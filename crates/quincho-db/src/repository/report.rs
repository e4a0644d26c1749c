//! # Report Repository
//!
//! Read-only reporting queries over receipts, orders, and the movement
//! ledger.
//!
//! ## Sales History Filters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Conjunctive Filters                                │
//! │                                                                         │
//! │  from / to ────┐                                                        │
//! │  day ──────────┤                                                        │
//! │  month / year ─┼── every provided filter narrows the result (AND),     │
//! │  customer ─────┤   an absent filter matches everything                 │
//! │  product ──────┤                                                        │
//! │  origin/method─┘                                                        │
//! │                                                                         │
//! │  Rows come from receipts joined to their orders; an order without      │
//! │  a receipt never appears in the sales history.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, Days, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use quincho_core::{OrderOrigin, TRAILING_DAYS};

/// One row of the sales history: a receipt with its order's context.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SalesRow {
    pub folio: i64,
    pub emitted_at: chrono::DateTime<Utc>,
    pub customer_name: Option<String>,
    pub origin: OrderOrigin,
    pub payment_method: String,
    pub total_cents: i64,
}

/// Filters for the sales history. All filters are optional and conjunctive.
#[derive(Debug, Clone, Default)]
pub struct SalesFilter {
    /// Inclusive lower bound on the emission date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the emission date.
    pub to: Option<NaiveDate>,
    /// Exact emission day.
    pub day: Option<NaiveDate>,
    /// Emission month (1-12).
    pub month: Option<u32>,
    /// Emission year.
    pub year: Option<i32>,
    /// Customer name substring, case-insensitive.
    pub customer: Option<String>,
    /// Product name substring matched against the order's lines.
    pub product: Option<String>,
    pub origin: Option<OrderOrigin>,
    pub payment_method: Option<String>,
}

/// Sales history result: matched rows plus their aggregates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SalesReport {
    pub rows: Vec<SalesRow>,
    pub count: usize,
    pub total_cents: i64,
}

/// Aggregate sales figures over a date range.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SalesSummary {
    pub count: i64,
    pub total_cents: i64,
    /// total / count, 0 when there are no receipts.
    pub average_ticket_cents: i64,
}

/// One point of the trailing daily-sales series.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DailyPoint {
    /// Day label in `DD-MM` form.
    pub label: String,
    pub total_cents: i64,
}

/// One point of the trailing daily movement series.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DailyMovementPoint {
    /// Day label in `DD-MM` form.
    pub label: String,
    pub entries: i64,
    pub exits: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Runs the sales history with the given filters, newest emission first.
    pub async fn sales_history(&self, filter: &SalesFilter) -> DbResult<SalesReport> {
        let mut builder = sqlx::QueryBuilder::new(
            "SELECT r.folio, r.emitted_at, o.customer_name, o.origin, r.payment_method,
                    r.total_cents
             FROM receipts r JOIN orders o ON o.id = r.order_id WHERE 1 = 1",
        );

        if let Some(from) = filter.from {
            builder.push(" AND date(r.emitted_at) >= ");
            builder.push_bind(from.to_string());
        }
        if let Some(to) = filter.to {
            builder.push(" AND date(r.emitted_at) <= ");
            builder.push_bind(to.to_string());
        }
        if let Some(day) = filter.day {
            builder.push(" AND date(r.emitted_at) = ");
            builder.push_bind(day.to_string());
        }
        if let Some(month) = filter.month {
            builder.push(" AND strftime('%m', r.emitted_at) = ");
            builder.push_bind(format!("{month:02}"));
        }
        if let Some(year) = filter.year {
            builder.push(" AND strftime('%Y', r.emitted_at) = ");
            builder.push_bind(format!("{year:04}"));
        }
        if let Some(customer) = &filter.customer {
            builder.push(" AND o.customer_name LIKE ");
            builder.push_bind(format!("%{customer}%"));
        }
        if let Some(product) = &filter.product {
            builder.push(
                " AND EXISTS (SELECT 1 FROM order_lines l
                              WHERE l.order_id = o.id AND l.product_name LIKE ",
            );
            builder.push_bind(format!("%{product}%"));
            builder.push(")");
        }
        if let Some(origin) = filter.origin {
            builder.push(" AND o.origin = ");
            builder.push_bind(origin);
        }
        if let Some(method) = &filter.payment_method {
            builder.push(" AND r.payment_method = ");
            builder.push_bind(method.clone());
        }
        builder.push(" ORDER BY r.emitted_at DESC, r.folio DESC");

        let rows: Vec<SalesRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        let total_cents = rows.iter().map(|r| r.total_cents).sum();
        Ok(SalesReport {
            count: rows.len(),
            total_cents,
            rows,
        })
    }

    /// Aggregate sales over an inclusive date range. Open bounds allowed.
    pub async fn sales_summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<SalesSummary> {
        let mut builder = sqlx::QueryBuilder::new(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM receipts WHERE 1 = 1",
        );
        if let Some(from) = from {
            builder.push(" AND date(emitted_at) >= ");
            builder.push_bind(from.to_string());
        }
        if let Some(to) = to {
            builder.push(" AND date(emitted_at) <= ");
            builder.push_bind(to.to_string());
        }

        let (count, total_cents): (i64, i64) =
            builder.build_query_as().fetch_one(&self.pool).await?;

        let average_ticket_cents = if count > 0 { total_cents / count } else { 0 };
        Ok(SalesSummary {
            count,
            total_cents,
            average_ticket_cents,
        })
    }

    /// Trailing daily-sales series for the inventory dashboard.
    ///
    /// Always returns exactly [`TRAILING_DAYS`] points, oldest first, with
    /// zero totals for days without receipts. Today is the last point.
    pub async fn daily_sales(&self) -> DbResult<Vec<DailyPoint>> {
        let start = trailing_window_start();

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT date(emitted_at), SUM(total_cents)
             FROM receipts
             WHERE date(emitted_at) >= ?1
             GROUP BY date(emitted_at)",
        )
        .bind(start.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(zero_filled(start, |key| {
            rows.iter()
                .find(|(d, _)| d == key)
                .map(|(_, t)| *t)
                .unwrap_or(0)
        })
        .map(|(label, total_cents)| DailyPoint { label, total_cents })
        .collect())
    }

    /// Trailing entry/exit quantity series over the movement ledger.
    pub async fn daily_movements(&self) -> DbResult<Vec<DailyMovementPoint>> {
        let start = trailing_window_start();

        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT date(occurred_at), kind, SUM(quantity)
             FROM inventory_movements
             WHERE date(occurred_at) >= ?1
             GROUP BY date(occurred_at), kind",
        )
        .bind(start.to_string())
        .fetch_all(&self.pool)
        .await?;

        let sum_for = |key: &str, kind: &str| {
            rows.iter()
                .find(|(d, k, _)| d == key && k == kind)
                .map(|(_, _, q)| *q)
                .unwrap_or(0)
        };

        let mut series = Vec::with_capacity(TRAILING_DAYS as usize);
        for offset in 0..TRAILING_DAYS {
            let day = start + Days::new(offset as u64);
            let key = day.to_string();
            series.push(DailyMovementPoint {
                label: day_label(day),
                entries: sum_for(&key, "entry"),
                exits: sum_for(&key, "exit"),
            });
        }
        Ok(series)
    }
}

fn trailing_window_start() -> NaiveDate {
    Utc::now().date_naive() - Days::new(TRAILING_DAYS as u64 - 1)
}

fn day_label(day: NaiveDate) -> String {
    format!("{:02}-{:02}", day.day(), day.month())
}

fn zero_filled<F>(start: NaiveDate, lookup: F) -> impl Iterator<Item = (String, i64)>
where
    F: Fn(&str) -> i64,
{
    (0..TRAILING_DAYS).map(move |offset| {
        let day = start + Days::new(offset as u64);
        (day_label(day), lookup(&day.to_string()))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::order::{NewOrder, NewOrderLine};
    use quincho_core::{MovementKind, OrderOrigin};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn emit(db: &Database, origin: OrderOrigin, method: &str, cents: i64) -> i64 {
        let mut new = NewOrder::counter(cents);
        new.origin = origin;
        new.channel = origin.label().to_lowercase();
        let order = db.orders().create(&new).await.unwrap();
        db.receipts().emit(order.id, cents, method).await.unwrap().folio
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let db = test_db().await;

        emit(&db, OrderOrigin::Counter, "cash", 100).await;
        emit(&db, OrderOrigin::Counter, "card", 200).await;
        emit(&db, OrderOrigin::Web, "cash", 400).await;

        let filter = SalesFilter {
            origin: Some(OrderOrigin::Counter),
            payment_method: Some("cash".to_string()),
            ..Default::default()
        };
        let report = db.reports().sales_history(&filter).await.unwrap();

        assert_eq!(report.count, 1);
        assert_eq!(report.total_cents, 100);
        assert_eq!(report.rows[0].origin, OrderOrigin::Counter);
    }

    #[tokio::test]
    async fn test_no_filters_matches_everything_newest_first() {
        let db = test_db().await;

        emit(&db, OrderOrigin::Counter, "cash", 100).await;
        emit(&db, OrderOrigin::Web, "card", 200).await;

        let report = db
            .reports()
            .sales_history(&SalesFilter::default())
            .await
            .unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.total_cents, 300);
        // Newest emission first; same-instant ties break by folio desc
        assert!(report.rows[0].folio > report.rows[1].folio);
    }

    #[tokio::test]
    async fn test_customer_and_product_substring_filters() {
        let db = test_db().await;

        let mut with_lines = NewOrder::counter(0);
        with_lines.customer_name = Some("Marcela Rojas".to_string());
        with_lines.lines = vec![NewOrderLine {
            product_id: None,
            product_name: "Completo Italiano".to_string(),
            quantity: 1,
            unit_price_cents: 350_000,
        }];
        let order = db.orders().create(&with_lines).await.unwrap();
        db.receipts().emit(order.id, 350_000, "cash").await.unwrap();

        emit(&db, OrderOrigin::Counter, "cash", 100).await;

        let by_customer = SalesFilter {
            customer: Some("marce".to_string()),
            ..Default::default()
        };
        assert_eq!(db.reports().sales_history(&by_customer).await.unwrap().count, 1);

        let by_product = SalesFilter {
            product: Some("Italiano".to_string()),
            ..Default::default()
        };
        assert_eq!(db.reports().sales_history(&by_product).await.unwrap().count, 1);

        // Conjunction of both with a mismatching customer finds nothing
        let both = SalesFilter {
            customer: Some("nobody".to_string()),
            product: Some("Italiano".to_string()),
            ..Default::default()
        };
        assert_eq!(db.reports().sales_history(&both).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_month_year_filters() {
        let db = test_db().await;
        emit(&db, OrderOrigin::Counter, "cash", 100).await;

        let now = Utc::now().date_naive();
        let matching = SalesFilter {
            month: Some(now.month()),
            year: Some(now.year()),
            ..Default::default()
        };
        assert_eq!(db.reports().sales_history(&matching).await.unwrap().count, 1);

        let wrong_year = SalesFilter {
            year: Some(now.year() - 1),
            ..Default::default()
        };
        assert_eq!(db.reports().sales_history(&wrong_year).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_orders_without_receipts_excluded() {
        let db = test_db().await;

        db.orders().create(&NewOrder::counter(999)).await.unwrap();
        emit(&db, OrderOrigin::Counter, "cash", 100).await;

        let report = db
            .reports()
            .sales_history(&SalesFilter::default())
            .await
            .unwrap();
        assert_eq!(report.count, 1);
    }

    #[tokio::test]
    async fn test_sales_summary_average() {
        let db = test_db().await;

        emit(&db, OrderOrigin::Counter, "cash", 100).await;
        emit(&db, OrderOrigin::Counter, "cash", 300).await;

        let summary = db.reports().sales_summary(None, None).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_cents, 400);
        assert_eq!(summary.average_ticket_cents, 200);
    }

    #[tokio::test]
    async fn test_sales_summary_empty_is_zero() {
        let db = test_db().await;
        let summary = db.reports().sales_summary(None, None).await.unwrap();
        assert_eq!(
            summary,
            SalesSummary {
                count: 0,
                total_cents: 0,
                average_ticket_cents: 0
            }
        );
    }

    #[tokio::test]
    async fn test_daily_series_zero_filled() {
        let db = test_db().await;

        emit(&db, OrderOrigin::Counter, "cash", 500).await;
        emit(&db, OrderOrigin::Counter, "cash", 250).await;

        let series = db.reports().daily_sales().await.unwrap();
        assert_eq!(series.len(), TRAILING_DAYS as usize);

        // Today is the last point and carries both receipts
        assert_eq!(series.last().unwrap().total_cents, 750);
        for point in &series[..series.len() - 1] {
            assert_eq!(point.total_cents, 0);
        }

        let today = Utc::now().date_naive();
        let expected = format!("{:02}-{:02}", today.day(), today.month());
        assert_eq!(series.last().unwrap().label, expected);
    }

    #[tokio::test]
    async fn test_daily_movement_series() {
        let db = test_db().await;
        let item = db
            .inventory()
            .create_item(&crate::repository::inventory::ItemInput {
                name: "Vasos".to_string(),
                sku: None,
                cost_price_cents: 100,
                sale_price_cents: 150,
            })
            .await
            .unwrap();

        db.inventory()
            .record_movement(item.id, MovementKind::Entry, 20, "")
            .await
            .unwrap();
        db.inventory()
            .record_movement(item.id, MovementKind::Exit, 5, "")
            .await
            .unwrap();

        let series = db.reports().daily_movements().await.unwrap();
        assert_eq!(series.len(), TRAILING_DAYS as usize);

        let today = series.last().unwrap();
        assert_eq!(today.entries, 20);
        assert_eq!(today.exits, 5);
        assert_eq!(series[0].entries, 0);
    }
}
