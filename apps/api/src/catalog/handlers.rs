//! Axum route handlers for the role and preset catalog.

use axum::{extract::Path, Json};
use serde::Serialize;

use crate::catalog::presets::{all_presets, find_preset, Preset, DEFAULT_PRESET_SLUG};
use crate::catalog::roles::{role_options, RoleOption};
use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<RoleOption>,
}

#[derive(Debug, Serialize)]
pub struct PresetListResponse {
    pub default_slug: &'static str,
    pub presets: Vec<Preset>,
}

/// GET /api/v1/roles
pub async fn handle_list_roles() -> Json<RoleListResponse> {
    Json(RoleListResponse {
        roles: role_options(),
    })
}

/// GET /api/v1/presets
pub async fn handle_list_presets() -> Json<PresetListResponse> {
    Json(PresetListResponse {
        default_slug: DEFAULT_PRESET_SLUG,
        presets: all_presets(),
    })
}

/// GET /api/v1/presets/:slug
pub async fn handle_get_preset(Path(slug): Path<String>) -> Result<Json<Preset>, AppError> {
    find_preset(&slug)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Preset '{slug}' not found")))
}
