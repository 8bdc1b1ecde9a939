use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{BookingDraft, BookingRecord};

/// Read-only export of a session's booking state for external inspection
/// (browser automation, support tooling). Built on demand, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSnapshot {
    pub session_id: String,
    pub current_booking: BookingDraft,
    pub total_price: i64,
    pub booking_results: Vec<BookingRecord>,
    pub taken_at: NaiveDateTime,
}
