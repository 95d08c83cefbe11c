//! Handlers for works (`/oeuvres`).

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
    check_new_work, create_work, get_work_detail, list_works, update_work, NewWork, Work,
    WorkDetail, WorkUpdate,
};
use musee_types::AssetKind;
use std::sync::Arc;

/// Handler for `GET /oeuvres`.
pub async fn list_works_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Work>>, ApiError> {
    let works = with_conn(&state.pool, list_works).await?;
    Ok(Json(works))
}

/// Handler for `POST /oeuvres`.
///
/// Multipart fields: `titre`, `auteur`, `technique`, `hauteur`, `largeur`,
/// `annee`, and optionally `latitude`, `longitude`, `altitude`,
/// `parcoursId`. Files: `image` (required) and `audio` (optional).
///
/// Input is fully validated before any file is written, and files are
/// written before the row is inserted.
pub async fn create_work_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Work>, ApiError> {
    let form = MultipartForm::collect(multipart?).await?;

    let fields = NewWork {
        title: form.required_text("titre")?,
        author: form.required_text("auteur")?,
        technique: form.required_text("technique")?,
        height: form.required_parse("hauteur")?,
        width: form.required_parse("largeur")?,
        year: form.required_parse("annee")?,
        latitude: form.optional_parse("latitude")?,
        longitude: form.optional_parse("longitude")?,
        altitude: form.optional_parse("altitude")?,
        tour_id: form.optional_parse("parcoursId")?,
    };
    let image = form.required_file("image")?;
    let audio = form.file("audio");

    state.media.check_upload(AssetKind::TargetImage, image)?;
    if let Some(audio) = audio {
        state.media.check_upload(AssetKind::Audio, audio)?;
    }
    let to_check = fields.clone();
    with_conn(&state.pool, move |conn| check_new_work(conn, &to_check)).await?;

    let target_url = state.media.store_asset(AssetKind::TargetImage, image).await?;
    let audio_url = state.media.maybe_store_asset(AssetKind::Audio, audio).await?;

    let work = with_conn(&state.pool, move |conn| {
        create_work(conn, &fields, &target_url, &audio_url)
    })
    .await?;

    Ok(Json(work))
}

/// Handler for `GET /oeuvres/{id}`.
///
/// Returns the work with its overlays embedded under `calques`.
pub async fn get_work_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<WorkDetail>, ApiError> {
    with_conn(&state.pool, move |conn| get_work_detail(conn, id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("oeuvre not found: {}", id)))
}

/// Handler for `PATCH /oeuvres/{id}`.
///
/// JSON body with any subset of the work's descriptive fields. Absent and
/// `null` fields are left unchanged.
pub async fn update_work_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<WorkUpdate>, JsonRejection>,
) -> Result<Json<Work>, ApiError> {
    let Json(updates) = payload?;
    let work = with_conn(&state.pool, move |conn| update_work(conn, id, &updates)).await?;
    Ok(Json(work))
}
