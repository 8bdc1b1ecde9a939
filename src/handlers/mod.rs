pub mod bookings;
pub mod health;
pub mod hubs;
pub mod sessions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/hubs", get(hubs::list_hubs))
        .route("/api/hubs/:hub_id", get(hubs::get_hub))
        .route("/api/configurations", get(hubs::list_configurations))
        .route("/api/sessions/:session_id/start", post(sessions::start))
        .route(
            "/api/sessions/:session_id/draft",
            get(sessions::get_draft)
                .patch(sessions::update_draft)
                .delete(sessions::reset_draft),
        )
        .route("/api/sessions/:session_id/checkin", post(sessions::check_in))
        .route(
            "/api/sessions/:session_id/configuration",
            post(sessions::select_configuration),
        )
        .route(
            "/api/sessions/:session_id/payment-mode",
            post(sessions::select_payment_mode),
        )
        .route("/api/sessions/:session_id/confirm", post(sessions::confirm))
        .route("/api/sessions/:session_id/snapshot", get(sessions::snapshot))
        .route("/api/bookings", get(bookings::list_bookings))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
