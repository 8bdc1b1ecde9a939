use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::BookingRecord;
use crate::services::history::{HistoryQuery, PaymentStatus, SortOrder};
use crate::state::AppState;

// GET /api/bookings
#[derive(Debug, Default, Deserialize)]
pub struct BookingsQuery {
    pub hub_id: Option<String>,
    pub payment_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct BookingsResponse {
    count: usize,
    bookings: Vec<BookingRecord>,
}

/// Empty values and `all` mean "no filter".
fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn parse_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    filter_value(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("{field} must be YYYY-MM-DD")))
        })
        .transpose()
}

impl BookingsQuery {
    fn into_history_query(self) -> Result<HistoryQuery, AppError> {
        let payment_status = match filter_value(self.payment_status)
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            None => None,
            Some("paid") => Some(PaymentStatus::Paid),
            Some("pending") => Some(PaymentStatus::Pending),
            Some(other) => {
                return Err(AppError::BadRequest(format!(
                    "unknown payment_status: {other}"
                )))
            }
        };

        let sort = match filter_value(self.sort).map(|s| s.to_lowercase()).as_deref() {
            None | Some("newest") => SortOrder::Newest,
            Some("oldest") => SortOrder::Oldest,
            Some(other) => return Err(AppError::BadRequest(format!("unknown sort: {other}"))),
        };

        Ok(HistoryQuery {
            hub_id: filter_value(self.hub_id),
            payment_status,
            start_date: parse_date("start_date", self.start_date)?,
            end_date: parse_date("end_date", self.end_date)?,
            sort,
        })
    }
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    let query = query.into_history_query()?;
    let bookings = state.history()?.query(&query);

    Ok(Json(BookingsResponse {
        count: bookings.len(),
        bookings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_means_no_filter() {
        let query = BookingsQuery {
            hub_id: Some("all".to_string()),
            payment_status: Some("All".to_string()),
            start_date: Some(String::new()),
            ..Default::default()
        }
        .into_history_query()
        .unwrap();

        assert!(query.hub_id.is_none());
        assert!(query.payment_status.is_none());
        assert!(query.start_date.is_none());
        assert_eq!(query.sort, SortOrder::Newest);
    }

    #[test]
    fn test_parses_filters() {
        let query = BookingsQuery {
            hub_id: Some("lekki".to_string()),
            payment_status: Some("Paid".to_string()),
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-01-31".to_string()),
            sort: Some("oldest".to_string()),
        }
        .into_history_query()
        .unwrap();

        assert_eq!(query.hub_id.as_deref(), Some("lekki"));
        assert_eq!(query.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(query.end_date.unwrap().to_string(), "2024-01-31");
        assert_eq!(query.sort, SortOrder::Oldest);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_date = BookingsQuery {
            start_date: Some("01/01/2024".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_date.into_history_query(),
            Err(AppError::BadRequest(_))
        ));

        let bad_sort = BookingsQuery {
            sort: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_sort.into_history_query(),
            Err(AppError::BadRequest(_))
        ));
    }
}
