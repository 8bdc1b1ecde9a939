//! Older clients persisted `bookingResults` in two other shapes: a nested
//! `hubDetails`/`userDetails`/`bookingDetails` object, and a flat
//! `hubId` + `formData` object with a `selectedTools` list. Both are mapped
//! onto [`BookingRecord`] here so the read path only ever sees one schema.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{
    find_hub, find_hub_by_name, BookingRecord, ConfigCategory, Configuration, HubSelection,
    PaymentSummary, Schedule, UserDetails,
};
use crate::services::pricing;

#[derive(Debug, PartialEq)]
pub enum RecordShape {
    Canonical,
    Nested,
    FormData,
}

/// Normalizes one persisted entry. Returns `None` for entries that match no
/// known shape.
pub fn normalize_record(value: &Value) -> Option<(BookingRecord, RecordShape)> {
    if let Ok(record) = serde_json::from_value::<BookingRecord>(value.clone()) {
        return Some((record, RecordShape::Canonical));
    }

    if value.get("hubDetails").is_some() {
        let legacy: NestedRecord = serde_json::from_value(value.clone()).ok()?;
        return Some((legacy.into_record(), RecordShape::Nested));
    }

    if value.get("formData").is_some() {
        let legacy: FormDataRecord = serde_json::from_value(value.clone()).ok()?;
        return legacy.into_record().map(|r| (r, RecordShape::FormData));
    }

    None
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
        .ok()
}

fn resolve_hub(id: Option<&str>, name: &str) -> HubSelection {
    id.and_then(find_hub)
        .or_else(|| find_hub_by_name(name))
        .map(HubSelection::from)
        .unwrap_or_else(|| HubSelection {
            id: id.map(str::to_string).unwrap_or_else(|| name.to_lowercase()),
            name: name.to_string(),
            price_per_hour: 0,
        })
}

fn build_record(
    hub: HubSelection,
    user: UserDetails,
    schedule: Schedule,
    configuration: Configuration,
    payment: PaymentSummary,
    timestamp: Option<NaiveDateTime>,
) -> BookingRecord {
    let duration = schedule.duration_hours().max(0);
    let visit_start = NaiveDateTime::parse_from_str(
        &format!("{} {}", schedule.visit_date, schedule.start_hour),
        "%Y-%m-%d %H:%M",
    )
    .ok();

    BookingRecord {
        id: Uuid::new_v4(),
        total_price: pricing::compute_total(duration, hub.price_per_hour),
        duration_hours: duration,
        hub,
        user,
        schedule,
        configuration,
        payment,
        created_at: timestamp
            .or(visit_start)
            .unwrap_or_else(|| Utc::now().naive_utc()),
    }
}

// ── Nested shape ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedRecord {
    hub_details: NestedHub,
    user_details: NestedUser,
    booking_details: NestedBooking,
    config_details: NestedConfig,
    payment_details: NestedPayment,
    timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NestedHub {
    id: Option<Value>,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedUser {
    name: String,
    email: String,
    phone: String,
    age_range: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedBooking {
    book_date: String,
    book_start_time: String,
    book_end_time: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NestedConfig {
    ram: String,
    storage: String,
    os: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedPayment {
    payment_mode: NestedPaymentMode,
    card_details: Option<NestedCard>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedPaymentMode {
    pay_now: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedCard {
    card_number: String,
    expiry_date: String,
}

impl NestedRecord {
    fn into_record(self) -> BookingRecord {
        // Numeric ids were placeholders; only string ids name a hub.
        let hub_id = self.hub_details.id.as_ref().and_then(Value::as_str);
        let hub = resolve_hub(hub_id, &self.hub_details.name);

        let payment = if self.payment_details.payment_mode.pay_now {
            let card = self.payment_details.card_details.unwrap_or_default();
            PaymentSummary::pay_now(&card.card_number, &card.expiry_date)
        } else {
            PaymentSummary::pay_later()
        };

        build_record(
            hub,
            UserDetails {
                full_name: self.user_details.name,
                email: self.user_details.email,
                phone: self.user_details.phone,
                age_range: non_empty(self.user_details.age_range),
            },
            Schedule {
                visit_date: self.booking_details.book_date,
                start_hour: self.booking_details.book_start_time,
                end_hour: self.booking_details.book_end_time,
            },
            Configuration {
                ram: non_empty(self.config_details.ram),
                storage: non_empty(self.config_details.storage),
                os: non_empty(self.config_details.os),
            },
            payment,
            self.timestamp.as_deref().and_then(parse_timestamp),
        )
    }
}

// ── formData shape ──

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FormDataRecord {
    hub_id: Option<String>,
    timestamp: Option<String>,
    form_data: FormData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FormData {
    user_details: FormUser,
    selected_tools: Vec<SelectedTool>,
    payment: Option<FormPayment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FormUser {
    full_name: String,
    email: String,
    phone: String,
    age: Option<Value>,
    visit_day: String,
    start_hour: String,
    end_hour: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SelectedTool {
    #[serde(rename = "type")]
    tool_type: String,
    label: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FormPayment {
    pay_now: bool,
    card_number: String,
    expiry_date: String,
}

impl FormDataRecord {
    fn into_record(self) -> Option<BookingRecord> {
        let hub_id = self.hub_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let hub = resolve_hub(Some(hub_id), hub_id);

        let mut configuration = Configuration::default();
        for tool in self.form_data.selected_tools {
            if let Some(category) = ConfigCategory::from_tool_type(&tool.tool_type) {
                configuration.set(category, non_empty(tool.label));
            }
        }

        let payment = match self.form_data.payment {
            Some(p) if p.pay_now => PaymentSummary::pay_now(&p.card_number, &p.expiry_date),
            _ => PaymentSummary::pay_later(),
        };

        let user = self.form_data.user_details;
        let age_range = match user.age {
            Some(Value::String(s)) => non_empty(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Some(build_record(
            hub,
            UserDetails {
                full_name: user.full_name,
                email: user.email,
                phone: user.phone,
                age_range,
            },
            Schedule {
                visit_date: user.visit_day,
                start_hour: user.start_hour,
                end_hour: user.end_hour,
            },
            configuration,
            payment,
            self.timestamp.as_deref().and_then(parse_timestamp),
        ))
    }
}
