//! Handlers for overlays (`/oeuvres/{id}/calques`, `/calques`).

use crate::api::{with_conn, ApiError};
use crate::form::MultipartForm;
use crate::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Extension, Multipart, Path,
    },
    Json,
};
use musee_catalog::{
    check_new_overlay, create_overlay, get_overlay, list_overlays_of_work, overlay_exists,
    parse_type_calque, update_overlay, update_overlay_audio, CatalogError, NewOverlay, Overlay,
    OverlayUpdate,
};
use musee_types::AssetKind;
use serde::Deserialize;
use std::sync::Arc;

/// Request body for `PATCH /calques/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOverlayRequest {
    #[serde(rename = "typeCalque", default)]
    pub type_calque: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateOverlayRequest {
    fn into_update(self) -> Result<OverlayUpdate, CatalogError> {
        Ok(OverlayUpdate {
            kind: self
                .type_calque
                .as_deref()
                .map(parse_type_calque)
                .transpose()?,
            description: self.description,
        })
    }
}

/// Handler for `GET /oeuvres/{id}/calques`.
///
/// A work without overlays yields an empty list, not a 404.
pub async fn list_overlays_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(work_id): Path<i64>,
) -> Result<Json<Vec<Overlay>>, ApiError> {
    let overlays = with_conn(&state.pool, move |conn| list_overlays_of_work(conn, work_id)).await?;
    Ok(Json(overlays))
}

/// Handler for `POST /oeuvres/{id}/calques`.
///
/// Multipart fields: `typeCalque`, `description`. Files: `calque`
/// (required) and `audio` (optional).
pub async fn create_overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(work_id): Path<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Overlay>, ApiError> {
    let form = MultipartForm::collect(multipart?).await?;

    let kind = parse_type_calque(&form.required_text("typeCalque")?)?;
    let fields = NewOverlay {
        kind,
        description: form.required_text("description")?,
    };
    let image = form.required_file("calque")?;
    let audio = form.file("audio");

    state.media.check_upload(AssetKind::OverlayImage, image)?;
    if let Some(audio) = audio {
        state.media.check_upload(AssetKind::Audio, audio)?;
    }
    let to_check = fields.clone();
    with_conn(&state.pool, move |conn| {
        check_new_overlay(conn, work_id, &to_check)
    })
    .await?;

    let overlay_url = state.media.store_asset(AssetKind::OverlayImage, image).await?;
    let audio_url = state.media.maybe_store_asset(AssetKind::Audio, audio).await?;

    let overlay = with_conn(&state.pool, move |conn| {
        create_overlay(conn, work_id, &fields, &overlay_url, &audio_url)
    })
    .await?;

    Ok(Json(overlay))
}

/// Handler for `GET /calques/{id}`.
pub async fn get_overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Overlay>, ApiError> {
    with_conn(&state.pool, move |conn| get_overlay(conn, id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("calque not found: {}", id)))
}

/// Handler for `PATCH /calques/{id}`.
pub async fn update_overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateOverlayRequest>, JsonRejection>,
) -> Result<Json<Overlay>, ApiError> {
    let Json(payload) = payload?;
    let updates = payload.into_update()?;
    let overlay = with_conn(&state.pool, move |conn| update_overlay(conn, id, &updates)).await?;
    Ok(Json(overlay))
}

/// Handler for `PUT /calques/{id}/audio`.
///
/// Multipart file `audio` (required). Always writes a new file and replaces
/// the overlay's audio reference; the previous file stays on disk.
pub async fn replace_overlay_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Overlay>, ApiError> {
    let form = MultipartForm::collect(multipart?).await?;
    let audio = form.required_file("audio")?;

    state.media.check_upload(AssetKind::Audio, audio)?;
    let exists = with_conn(&state.pool, move |conn| overlay_exists(conn, id)).await?;
    if !exists {
        return Err(ApiError::NotFound(format!("calque not found: {}", id)));
    }

    let audio_url = state.media.store_asset(AssetKind::Audio, audio).await?;
    let overlay =
        with_conn(&state.pool, move |conn| update_overlay_audio(conn, id, &audio_url)).await?;

    Ok(Json(overlay))
}
