use crate::types::{Result, Setting, SettingsUpdated};
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use std::collections::BTreeMap;

pub async fn get_all(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Option<String>>>> {
    state.settings.get_all().await.map(Json)
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>> {
    state.settings.get_one(&key).await.map(Json)
}

/// Upsert settings rows. Derived configuration is rebuilt before the
/// response is sent, so the next request resolves against the new values.
pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<BTreeMap<String, Option<String>>>,
) -> Result<Json<SettingsUpdated>> {
    let updated = state.settings.set(&payload).await?;

    Ok(Json(SettingsUpdated {
        status: "success".to_string(),
        updated,
    }))
}
