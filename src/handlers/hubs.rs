use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{find_hub, ConfigOption, Hub, CONFIG_OPTIONS, HUBS};

// GET /api/hubs
pub async fn list_hubs() -> Json<&'static [Hub]> {
    Json(HUBS)
}

// GET /api/hubs/:hub_id
pub async fn get_hub(Path(hub_id): Path<String>) -> Result<Json<&'static Hub>, AppError> {
    find_hub(&hub_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("hub {hub_id}")))
}

#[derive(Serialize)]
pub struct ConfigurationsResponse {
    options: &'static [ConfigOption],
}

// GET /api/configurations
pub async fn list_configurations() -> Json<ConfigurationsResponse> {
    Json(ConfigurationsResponse {
        options: CONFIG_OPTIONS,
    })
}
