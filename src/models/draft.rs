use serde::{Deserialize, Serialize};

use crate::models::{Configuration, Hub};
use crate::services::pricing;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HubSelection {
    pub id: String,
    pub name: String,
    pub price_per_hour: i64,
}

impl From<&Hub> for HubSelection {
    fn from(hub: &Hub) -> Self {
        Self {
            id: hub.id.to_string(),
            name: hub.name.to_string(),
            price_per_hour: hub.price_per_hour,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub age_range: Option<String>,
}

/// Visit date is `YYYY-MM-DD`; hours are zero-padded 24h `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub visit_date: String,
    pub start_hour: String,
    pub end_hour: String,
}

impl Schedule {
    pub fn duration_hours(&self) -> i64 {
        pricing::compute_duration(&self.start_hour, &self.end_hour)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    PayNow,
    PayLater,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::PayNow => "pay_now",
            PaymentMode::PayLater => "pay_later",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardDetails {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub mode: PaymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardDetails>,
}

/// The in-progress booking assembled across the check-in, configuration and
/// payment steps. One per session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookingDraft {
    pub hub: Option<HubSelection>,
    pub user: Option<UserDetails>,
    pub schedule: Option<Schedule>,
    pub configuration: Option<Configuration>,
    pub payment: Option<Payment>,
    pub finalized: bool,
}

impl BookingDraft {
    pub fn is_empty(&self) -> bool {
        *self == BookingDraft::default()
    }

    pub fn duration_hours(&self) -> Option<i64> {
        self.schedule.as_ref().map(Schedule::duration_hours)
    }

    /// Zero until both a hub and a positive-length schedule are present.
    pub fn total_price(&self) -> i64 {
        match (&self.hub, &self.schedule) {
            (Some(hub), Some(schedule)) => {
                pricing::compute_total(schedule.duration_hours(), hub.price_per_hour)
            }
            _ => 0,
        }
    }

    /// Shallow merge: every section present in the patch replaces the stored
    /// one wholesale.
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(hub) = patch.hub {
            self.hub = Some(hub);
        }
        if let Some(user) = patch.user {
            self.user = Some(user);
        }
        if let Some(schedule) = patch.schedule {
            self.schedule = Some(schedule);
        }
        if let Some(configuration) = patch.configuration {
            self.configuration = Some(configuration);
        }
        if let Some(payment) = patch.payment {
            self.payment = Some(payment);
        }
    }
}

/// A partial draft update. `finalized` is not patchable; only confirmation
/// sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftPatch {
    pub hub: Option<HubSelection>,
    pub user: Option<UserDetails>,
    pub schedule: Option<Schedule>,
    pub configuration: Option<Configuration>,
    pub payment: Option<Payment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_hub;

    fn schedule(start: &str, end: &str) -> Schedule {
        Schedule {
            visit_date: "2030-01-01".to_string(),
            start_hour: start.to_string(),
            end_hour: end.to_string(),
        }
    }

    #[test]
    fn test_apply_replaces_present_sections_only() {
        let mut draft = BookingDraft::default();
        draft.apply(DraftPatch {
            hub: find_hub("lekki").map(HubSelection::from),
            schedule: Some(schedule("09:00", "12:00")),
            ..Default::default()
        });
        draft.apply(DraftPatch {
            schedule: Some(schedule("10:00", "12:00")),
            ..Default::default()
        });

        assert_eq!(draft.hub.as_ref().unwrap().id, "lekki");
        assert_eq!(draft.schedule.as_ref().unwrap().start_hour, "10:00");
        assert!(draft.user.is_none());
        assert!(!draft.finalized);
    }

    #[test]
    fn test_total_price() {
        let mut draft = BookingDraft::default();
        assert_eq!(draft.total_price(), 0);

        draft.hub = find_hub("yaba").map(HubSelection::from);
        draft.schedule = Some(schedule("09:00", "17:00"));
        assert_eq!(draft.duration_hours(), Some(8));
        assert_eq!(draft.total_price(), 32000);

        draft.schedule = Some(schedule("17:00", "09:00"));
        assert_eq!(draft.total_price(), 0);
    }

    #[test]
    fn test_empty_draft_deserializes_from_empty_object() {
        let draft: BookingDraft = serde_json::from_str("{}").unwrap();
        assert!(draft.is_empty());
    }
}
