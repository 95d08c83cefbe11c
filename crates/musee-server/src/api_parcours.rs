//! Handlers for tours (`/parcours`).

use crate::api::{with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use musee_catalog::{create_tour, get_tour, list_tours, NewTour, Tour};
use std::sync::Arc;

/// Handler for `GET /parcours`.
pub async fn list_tours_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Tour>>, ApiError> {
    let tours = with_conn(&state.pool, list_tours).await?;
    Ok(Json(tours))
}

/// Handler for `POST /parcours`.
pub async fn create_tour_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<NewTour>, JsonRejection>,
) -> Result<Json<Tour>, ApiError> {
    let Json(payload) = payload?;
    let tour = with_conn(&state.pool, move |conn| create_tour(conn, &payload)).await?;
    Ok(Json(tour))
}

/// Handler for `GET /parcours/{id}`.
pub async fn get_tour_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Tour>, ApiError> {
    with_conn(&state.pool, move |conn| get_tour(conn, id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("parcours not found: {}", id)))
}
