//! App settings routes.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    _claims: Claims,
) -> ApiResult<Json<Value>> {
    Ok(Json(json!({
        "language": "English",
        "notifications": true,
        "dark_mode": false,
        "tax_rate_bps": state.config.tax_rate_bps,
        "delivery_fee_cents": state.config.delivery_fee_cents,
    })))
}

/// POST /api/settings/language
pub async fn update_language(
    _claims: Claims,
    Json(body): Json<LanguageRequest>,
) -> ApiResult<Json<Value>> {
    if body.language.trim().is_empty() {
        return Err(ApiError::BadRequest("'language' is required".to_string()));
    }

    Ok(Json(json!({
        "message": format!("Language updated to {}", body.language)
    })))
}
