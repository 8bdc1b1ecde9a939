use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::queries::LOCAL_SCOPE;
use crate::errors::AppError;
use crate::models::{BookingDraft, BookingSnapshot, DraftPatch, PaymentMode};
use crate::services::booking::{
    self, CheckinForm, ConfigurationForm, ConfirmForm, ConfirmationReceipt,
};
use crate::services::drafts::DraftStore;
use crate::state::AppState;

const MAX_SESSION_ID_LEN: usize = 128;

/// Session ids double as storage scopes, so the shared scope is off limits.
fn check_session_id(session_id: &str) -> Result<(), AppError> {
    if session_id.is_empty()
        || session_id.len() > MAX_SESSION_ID_LEN
        || session_id == LOCAL_SCOPE
    {
        return Err(AppError::BadRequest("invalid session id".to_string()));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct DraftResponse {
    #[serde(flatten)]
    draft: BookingDraft,
    duration_hours: Option<i64>,
    total_price: i64,
}

impl From<BookingDraft> for DraftResponse {
    fn from(draft: BookingDraft) -> Self {
        Self {
            duration_hours: draft.duration_hours(),
            total_price: draft.total_price(),
            draft,
        }
    }
}

// POST /api/sessions/:session_id/start
#[derive(Deserialize)]
pub struct StartRequest {
    pub hub_id: String,
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<StartRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let draft = booking::start_booking(&db, &session_id, &req.hub_id)?;
    Ok(Json(draft.into()))
}

// GET /api/sessions/:session_id/draft
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let draft = DraftStore::new(&db, &session_id).get_draft();
    Ok(Json(draft.into()))
}

// PATCH /api/sessions/:session_id/draft
pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(patch): Json<DraftPatch>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let draft = booking::patch_draft(&db, &session_id, patch)?;
    Ok(Json(draft.into()))
}

// DELETE /api/sessions/:session_id/draft
pub async fn reset_draft(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let draft = DraftStore::new(&db, &session_id).reset_draft()?;
    Ok(Json(draft.into()))
}

// POST /api/sessions/:session_id/checkin
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(form): Json<CheckinForm>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let today = Utc::now().date_naive();
    let db = state.db()?;
    let draft = booking::check_in(&db, &state.config, &session_id, form, today)?;
    Ok(Json(draft.into()))
}

// POST /api/sessions/:session_id/configuration
pub async fn select_configuration(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(form): Json<ConfigurationForm>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let draft = booking::select_configuration(&db, &session_id, form)?;
    Ok(Json(draft.into()))
}

// POST /api/sessions/:session_id/payment-mode
#[derive(Deserialize)]
pub struct PaymentModeRequest {
    pub mode: PaymentMode,
}

pub async fn select_payment_mode(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<PaymentModeRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let draft = booking::select_payment_mode(&db, &session_id, req.mode)?;
    Ok(Json(draft.into()))
}

// POST /api/sessions/:session_id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(form): Json<ConfirmForm>,
) -> Result<Json<ConfirmationReceipt>, AppError> {
    check_session_id(&session_id)?;
    let now = Utc::now().naive_utc();
    let db = state.db()?;
    let mut history = state.history()?;
    let receipt =
        booking::confirm_booking(&db, &mut history, &state.config, &session_id, form, now)?;
    Ok(Json(receipt))
}

// GET /api/sessions/:session_id/snapshot
pub async fn snapshot(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<BookingSnapshot>, AppError> {
    check_session_id(&session_id)?;
    let db = state.db()?;
    let history = state.history()?;
    Ok(Json(booking::snapshot(&db, &history, &session_id)))
}
