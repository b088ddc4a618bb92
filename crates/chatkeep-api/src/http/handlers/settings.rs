//! Settings handlers.
//!
//! Endpoints:
//! - GET  /api/settings - All settings of the caller as a flat object
//! - POST /api/settings - Upsert the given keys, leaving the rest untouched

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde_json::{Map, Value, json};

use chatkeep_types::settings::Settings;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Settings>>, AppError> {
    let start = Instant::now();
    let settings = state.settings_service.get_all(&user_id).await?;
    Ok(Json(ApiResponse::timed(settings, start)))
}

/// POST /api/settings
///
/// Values may be strings, numbers or booleans; they are stored as text.
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();

    let values = to_settings(body)?;
    state.settings_service.upsert(&user_id, values).await?;

    Ok(Json(ApiResponse::timed(
        json!({ "message": "Settings updated successfully" }),
        start,
    )))
}

fn to_settings(body: Map<String, Value>) -> Result<Settings, AppError> {
    body.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::Validation(format!(
                        "value of '{key}' must be a string, number or boolean"
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_scalars_become_text() {
        let settings =
            to_settings(body(json!({"storageLimit": 5, "theme": "dark", "sound": false}))).unwrap();
        assert_eq!(settings["storageLimit"], "5");
        assert_eq!(settings["theme"], "dark");
        assert_eq!(settings["sound"], "false");
    }

    #[test]
    fn test_nested_values_rejected() {
        assert!(to_settings(body(json!({"theme": {"mode": "dark"}}))).is_err());
        assert!(to_settings(body(json!({"tags": ["a"]}))).is_err());
        assert!(to_settings(body(json!({"autoClear": null}))).is_err());
    }
}
