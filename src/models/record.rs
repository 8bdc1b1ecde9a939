use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    BookingDraft, Configuration, HubSelection, PaymentMode, Schedule, UserDetails,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSummary {
    pub mode: PaymentMode,
    pub card_last4: Option<String>,
    pub card_expiry: Option<String>,
}

impl PaymentSummary {
    pub fn pay_later() -> Self {
        Self {
            mode: PaymentMode::PayLater,
            card_last4: None,
            card_expiry: None,
        }
    }

    pub fn pay_now(card_number: &str, expiry: &str) -> Self {
        let digits: Vec<char> = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        let last4 = (digits.len() >= 4)
            .then(|| digits[digits.len() - 4..].iter().collect::<String>());
        Self {
            mode: PaymentMode::PayNow,
            card_last4: last4,
            card_expiry: Some(expiry.trim().to_string()).filter(|e| !e.is_empty()),
        }
    }
}

/// Identity of a booking slot in history: one record per hub, day and start
/// hour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookingKey {
    pub hub_id: String,
    pub visit_date: String,
    pub start_hour: String,
}

/// A finalized booking. Never mutated after confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRecord {
    pub id: Uuid,
    pub hub: HubSelection,
    pub user: UserDetails,
    pub schedule: Schedule,
    pub configuration: Configuration,
    pub payment: PaymentSummary,
    pub duration_hours: i64,
    pub total_price: i64,
    pub created_at: NaiveDateTime,
}

impl BookingRecord {
    /// Freezes a draft. Returns `None` when a required section is missing.
    pub fn from_draft(draft: &BookingDraft, created_at: NaiveDateTime) -> Option<Self> {
        let hub = draft.hub.clone()?;
        let user = draft.user.clone()?;
        let schedule = draft.schedule.clone()?;
        let payment = draft.payment.as_ref()?;

        let summary = match (payment.mode, &payment.card) {
            (PaymentMode::PayNow, Some(card)) => {
                PaymentSummary::pay_now(&card.card_number, &card.expiry_date)
            }
            (PaymentMode::PayNow, None) => PaymentSummary {
                mode: PaymentMode::PayNow,
                card_last4: None,
                card_expiry: None,
            },
            (PaymentMode::PayLater, _) => PaymentSummary::pay_later(),
        };

        Some(Self {
            id: Uuid::new_v4(),
            duration_hours: schedule.duration_hours().max(0),
            total_price: draft.total_price(),
            hub,
            user,
            schedule,
            configuration: draft.configuration.clone().unwrap_or_default(),
            payment: summary,
            created_at,
        })
    }

    pub fn key(&self) -> BookingKey {
        BookingKey {
            hub_id: self.hub.id.clone(),
            visit_date: self.schedule.visit_date.clone(),
            start_hour: self.schedule.start_hour.clone(),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment.mode == PaymentMode::PayNow
    }

    pub fn visit_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.schedule.visit_date, "%Y-%m-%d").ok()
    }

    /// Start of the visit, falling back to midnight when the hour is
    /// unreadable.
    pub fn booked_at(&self) -> Option<NaiveDateTime> {
        let date = self.visit_date()?;
        let time = NaiveTime::parse_from_str(&self.schedule.start_hour, "%H:%M")
            .unwrap_or_default();
        Some(date.and_time(time))
    }
}
