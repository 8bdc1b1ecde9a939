use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{
    find_hub, find_option, BookingDraft, BookingRecord, BookingSnapshot, CardDetails,
    ConfigCategory, Configuration, DraftPatch, HubSelection, Payment, PaymentMode, Schedule,
    UserDetails,
};
use crate::services::drafts::DraftStore;
use crate::services::history::{AppendOutcome, HistoryStore};
use crate::services::validation::{self, FieldError, FieldErrors};

/// Booking steps in page order. Guard failures name the step the client
/// should return to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Home,
    CheckIn,
    Configuration,
    Payment,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Home => "home",
            Step::CheckIn => "check_in",
            Step::Configuration => "configuration",
            Step::Payment => "payment",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckinForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub age_range: Option<String>,
    pub visit_date: String,
    pub start_hour: String,
    pub end_hour: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigurationForm {
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub os: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmForm {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationReceipt {
    pub record: BookingRecord,
    #[serde(flatten)]
    pub outcome: AppendOutcome,
}

fn redirect(to: Step, reason: &str) -> AppError {
    AppError::Redirect {
        to,
        reason: reason.to_string(),
    }
}

/// Checks that every step before `step` has been completed.
fn require_step(draft: &BookingDraft, step: Step) -> Result<(), AppError> {
    if step == Step::Home {
        return Ok(());
    }
    if draft.hub.is_none() {
        return Err(redirect(Step::Home, "no hub selected"));
    }
    if step == Step::CheckIn {
        return Ok(());
    }
    if draft.user.is_none() || draft.schedule.is_none() {
        return Err(redirect(Step::CheckIn, "check-in details missing"));
    }
    if step == Step::Configuration {
        return Ok(());
    }
    if draft.configuration.is_none() {
        return Err(redirect(Step::Configuration, "workstation not configured"));
    }
    Ok(())
}

/// Starts a fresh booking for `hub_id`, discarding whatever the session had
/// in progress.
pub fn start_booking(
    conn: &Connection,
    session_id: &str,
    hub_id: &str,
) -> Result<BookingDraft, AppError> {
    let hub = find_hub(hub_id).ok_or_else(|| AppError::NotFound(format!("hub {hub_id}")))?;

    let store = DraftStore::new(conn, session_id);
    store.reset_draft()?;
    let draft = store.update_draft(DraftPatch {
        hub: Some(HubSelection::from(hub)),
        ..Default::default()
    })?;

    tracing::info!(session = %session_id, hub = %hub.id, "booking started");
    Ok(draft)
}

fn validate_check_in(
    config: &AppConfig,
    user: &UserDetails,
    schedule: &Schedule,
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check("full_name", validation::validate_name(&user.full_name));
    errors.check("email", validation::validate_email(&user.email));
    errors.check("phone", validation::validate_phone(&user.phone));
    errors.check(
        "age_range",
        validation::validate_age_range(user.age_range.as_deref()),
    );
    errors.check(
        "visit_date",
        validation::validate_visit_date(
            &schedule.visit_date,
            today,
            config.allow_past_visit_dates,
        ),
    );
    errors.check("start_hour", validation::validate_hour(&schedule.start_hour));
    errors.check(
        "end_hour",
        validation::validate_end_after_start(&schedule.start_hour, &schedule.end_hour),
    );
    errors
}

/// Hub selections always come from the catalog; a client-sent name or price
/// is discarded.
fn catalog_hub(selection: &HubSelection) -> Result<HubSelection, AppError> {
    find_hub(&selection.id)
        .map(HubSelection::from)
        .ok_or_else(|| AppError::NotFound(format!("hub {}", selection.id)))
}

/// Applies a raw draft patch. The hub section is re-resolved from the
/// catalog; other sections are checked again at confirmation.
pub fn patch_draft(
    conn: &Connection,
    session_id: &str,
    mut patch: DraftPatch,
) -> Result<BookingDraft, AppError> {
    if let Some(hub) = &patch.hub {
        patch.hub = Some(catalog_hub(hub)?);
    }
    Ok(DraftStore::new(conn, session_id).update_draft(patch)?)
}

pub fn check_in(
    conn: &Connection,
    config: &AppConfig,
    session_id: &str,
    form: CheckinForm,
    today: NaiveDate,
) -> Result<BookingDraft, AppError> {
    let store = DraftStore::new(conn, session_id);
    require_step(&store.get_draft(), Step::CheckIn)?;

    let user = UserDetails {
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        age_range: form
            .age_range
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
    };
    let schedule = Schedule {
        visit_date: form.visit_date.trim().to_string(),
        start_hour: form.start_hour,
        end_hour: form.end_hour,
    };
    validate_check_in(config, &user, &schedule, today)
        .into_result()
        .map_err(AppError::Validation)?;

    let draft = store.update_draft(DraftPatch {
        user: Some(user),
        schedule: Some(schedule),
        ..Default::default()
    })?;

    tracing::info!(
        session = %session_id,
        visit_date = ?draft.schedule.as_ref().map(|s| &s.visit_date),
        "check-in recorded"
    );
    Ok(draft)
}

/// Resolves each chosen option against the catalog and stores its label.
/// Unselected categories stay empty.
pub fn select_configuration(
    conn: &Connection,
    session_id: &str,
    form: ConfigurationForm,
) -> Result<BookingDraft, AppError> {
    let store = DraftStore::new(conn, session_id);
    require_step(&store.get_draft(), Step::Configuration)?;

    let mut errors = FieldErrors::new();
    let mut configuration = Configuration::default();
    let choices = [
        (ConfigCategory::Ram, form.ram),
        (ConfigCategory::Storage, form.storage),
        (ConfigCategory::Os, form.os),
    ];

    for (category, choice) in choices {
        let Some(choice) = choice.filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        match find_option(category, &choice) {
            Some(option) => configuration.set(category, Some(option.label.to_string())),
            None => errors.check(category.as_str(), Err(FieldError::UnknownOption)),
        }
    }
    errors.into_result().map_err(AppError::Validation)?;

    let draft = store.update_draft(DraftPatch {
        configuration: Some(configuration),
        ..Default::default()
    })?;
    Ok(draft)
}

pub fn select_payment_mode(
    conn: &Connection,
    session_id: &str,
    mode: PaymentMode,
) -> Result<BookingDraft, AppError> {
    let store = DraftStore::new(conn, session_id);
    require_step(&store.get_draft(), Step::Payment)?;

    let draft = store.update_draft(DraftPatch {
        payment: Some(Payment { mode, card: None }),
        ..Default::default()
    })?;
    tracing::debug!(session = %session_id, mode = mode.as_str(), "payment mode selected");
    Ok(draft)
}

fn validate_card(config: &AppConfig, form: &ConfirmForm, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let card_check = if config.card_luhn_check {
        validation::validate_card_number_luhn(&form.card_number)
    } else {
        validation::validate_card_number(&form.card_number)
    };
    errors.check("card_number", card_check);
    errors.check(
        "expiry_date",
        validation::validate_expiry(&form.expiry_date, today),
    );
    errors.check("cvv", validation::validate_cvv(&form.cvv));
    errors
}

/// Finalizes the session's draft: validates payment, commits the record to
/// history and resets the draft.
pub fn confirm_booking(
    conn: &Connection,
    history: &mut HistoryStore,
    config: &AppConfig,
    session_id: &str,
    form: ConfirmForm,
    now: NaiveDateTime,
) -> Result<ConfirmationReceipt, AppError> {
    let store = DraftStore::new(conn, session_id);
    let mut draft = store.get_draft();
    require_step(&draft, Step::Payment)?;

    let mode = match &draft.payment {
        Some(payment) => payment.mode,
        None => return Err(redirect(Step::Payment, "payment mode not selected")),
    };

    // The draft may have been patched directly since check-in.
    if let Some(hub) = &draft.hub {
        draft.hub = Some(catalog_hub(hub)?);
    }
    if let (Some(user), Some(schedule)) = (&draft.user, &draft.schedule) {
        validate_check_in(config, user, schedule, now.date())
            .into_result()
            .map_err(AppError::Validation)?;
    }

    let card = match mode {
        PaymentMode::PayNow => {
            let form = ConfirmForm {
                expiry_date: validation::format_expiry_input(&form.expiry_date),
                ..form
            };
            validate_card(config, &form, now.date())
                .into_result()
                .map_err(AppError::Validation)?;
            Some(CardDetails {
                card_number: form.card_number,
                expiry_date: form.expiry_date,
                cvv: form.cvv.trim().to_string(),
            })
        }
        PaymentMode::PayLater => None,
    };

    draft.payment = Some(Payment { mode, card });
    draft.finalized = true;

    let record = BookingRecord::from_draft(&draft, now)
        .ok_or_else(|| redirect(Step::CheckIn, "booking details incomplete"))?;
    let outcome = history.append_record(conn, record.clone())?;
    if let Err(e) = store.reset_draft() {
        tracing::warn!(
            session = %session_id,
            booking_id = %record.id,
            error = %e,
            "booking committed but draft reset failed"
        );
    }

    Ok(ConfirmationReceipt { record, outcome })
}

/// Read-only view of the session draft and the booking history.
pub fn snapshot(conn: &Connection, history: &HistoryStore, session_id: &str) -> BookingSnapshot {
    let current_booking = DraftStore::new(conn, session_id).get_draft();
    BookingSnapshot {
        session_id: session_id.to_string(),
        total_price: current_booking.total_price(),
        current_booking,
        booking_results: history.snapshot(),
        taken_at: Utc::now().naive_utc(),
    }
}
