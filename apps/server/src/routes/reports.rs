//! Sales reporting handlers.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quincho_core::OrderOrigin;
use quincho_db::{DailyPoint, SalesFilter, SalesReport, SalesSummary};

use crate::error::ApiError;
use crate::export::sales_csv;
use crate::state::AppState;

/// Query-string form of the sales filters. All optional, all conjunctive.
#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub day: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub customer: Option<String>,
    pub product: Option<String>,
    pub origin: Option<OrderOrigin>,
    pub payment_method: Option<String>,
}

impl SalesQuery {
    fn validate(self) -> Result<SalesFilter, ApiError> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(ApiError::validation("month must be between 1 and 12"));
            }
        }
        Ok(SalesFilter {
            from: self.from,
            to: self.to,
            day: self.day,
            month: self.month,
            year: self.year,
            customer: self.customer.filter(|s| !s.trim().is_empty()),
            product: self.product.filter(|s| !s.trim().is_empty()),
            origin: self.origin,
            payment_method: self.payment_method.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// GET /api/reports/sales — filtered sales history with aggregates.
pub async fn sales_history(
    State(app): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesReport>, ApiError> {
    let filter = query.validate()?;
    Ok(Json(app.db.reports().sales_history(&filter).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/reports/summary — count, total, and average ticket over a range.
pub async fn sales_summary(
    State(app): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SalesSummary>, ApiError> {
    Ok(Json(
        app.db.reports().sales_summary(query.from, query.to).await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct DailySalesResponse {
    pub points: Vec<DailyPoint>,
}

/// GET /api/reports/daily-sales — trailing 7-day totals, oldest first,
/// zero-filled.
pub async fn daily_sales(
    State(app): State<AppState>,
) -> Result<Json<DailySalesResponse>, ApiError> {
    let points = app.db.reports().daily_sales().await?;
    Ok(Json(DailySalesResponse { points }))
}

/// GET /api/reports/sales/export — filtered history as a semicolon CSV.
pub async fn export_csv(
    State(app): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.validate()?;
    let report = app.db.reports().sales_history(&filter).await?;
    let csv = sales_csv(&report.rows).map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales.csv\"".to_string(),
            ),
        ],
        csv,
    ))
}
