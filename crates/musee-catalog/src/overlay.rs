//! Overlays (calques): annotation layers drawn over a work.

use crate::validate::non_empty;
use crate::work::work_exists;
use crate::CatalogError;
use musee_types::TypeCalque;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

const OVERLAY_COLUMNS: &str = "id, type_calque, description, url_calque, url_audio, oeuvre_id";

/// An annotation layer attached to a work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: i64,
    #[serde(rename = "typeCalque")]
    pub kind: TypeCalque,
    pub description: String,
    /// Relative path of the overlay image under the media root.
    #[serde(rename = "urlCalque")]
    pub overlay_url: String,
    /// Relative path of the audio commentary, or empty when there is none.
    #[serde(rename = "urlAudio")]
    pub audio_url: String,
    /// Owning work.
    #[serde(rename = "oeuvreId")]
    pub work_id: i64,
}

/// Descriptive fields for a new overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOverlay {
    pub kind: TypeCalque,
    pub description: String,
}

/// Partial update of an overlay. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayUpdate {
    pub kind: Option<TypeCalque>,
    pub description: Option<String>,
}

/// Runs every check `create_overlay` performs before inserting.
pub fn check_new_overlay(
    conn: &Connection,
    work_id: i64,
    fields: &NewOverlay,
) -> Result<(), CatalogError> {
    non_empty("description", &fields.description)?;
    if !work_exists(conn, work_id)? {
        return Err(CatalogError::not_found("oeuvre", work_id));
    }
    Ok(())
}

/// Inserts a new overlay on an existing work.
pub fn create_overlay(
    conn: &Connection,
    work_id: i64,
    fields: &NewOverlay,
    overlay_url: &str,
    audio_url: &str,
) -> Result<Overlay, CatalogError> {
    check_new_overlay(conn, work_id, fields)?;
    if overlay_url.is_empty() {
        return Err(CatalogError::validation("urlCalque must not be empty"));
    }

    let overlay = conn.query_row(
        &format!(
            "INSERT INTO calques (type_calque, description, url_calque, url_audio, oeuvre_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {OVERLAY_COLUMNS}"
        ),
        params![
            fields.kind.as_str(),
            fields.description,
            overlay_url,
            audio_url,
            work_id,
        ],
        map_row_to_overlay,
    )?;

    tracing::info!(
        overlay_id = overlay.id,
        work_id,
        kind = %overlay.kind,
        "overlay created"
    );
    Ok(overlay)
}

/// Retrieves an overlay by identity.
pub fn get_overlay(conn: &Connection, id: i64) -> Result<Option<Overlay>, CatalogError> {
    let overlay = conn
        .query_row(
            &format!("SELECT {OVERLAY_COLUMNS} FROM calques WHERE id = ?1"),
            [id],
            map_row_to_overlay,
        )
        .optional()?;
    Ok(overlay)
}

/// Lists the overlays of a work, ordered by identity.
///
/// A work without overlays, or an unknown work, yields an empty list.
pub fn list_overlays_of_work(conn: &Connection, work_id: i64) -> Result<Vec<Overlay>, CatalogError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {OVERLAY_COLUMNS} FROM calques WHERE oeuvre_id = ?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([work_id], map_row_to_overlay)?;
    let mut overlays = Vec::new();
    for row in rows {
        overlays.push(row?);
    }
    Ok(overlays)
}

/// Applies a partial update to an overlay and returns the stored result.
///
/// Same merge rule as [`crate::update_work`]: only set fields are written.
pub fn update_overlay(
    conn: &Connection,
    id: i64,
    updates: &OverlayUpdate,
) -> Result<Overlay, CatalogError> {
    if let Some(description) = &updates.description {
        non_empty("description", description)?;
    }

    let mut set_parts = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1;

    if let Some(kind) = updates.kind {
        set_parts.push(format!("type_calque = ?{}", idx));
        values.push(Box::new(kind.as_str()));
        idx += 1;
    }
    if let Some(description) = &updates.description {
        set_parts.push(format!("description = ?{}", idx));
        values.push(Box::new(description.clone()));
        idx += 1;
    }

    if set_parts.is_empty() {
        return get_overlay(conn, id)?.ok_or_else(|| CatalogError::not_found("calque", id));
    }

    let sql = format!(
        "UPDATE calques SET {} WHERE id = ?{} RETURNING {OVERLAY_COLUMNS}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let overlay = conn
        .query_row(&sql, params.as_slice(), map_row_to_overlay)
        .optional()?
        .ok_or_else(|| CatalogError::not_found("calque", id))?;

    tracing::info!(overlay_id = id, fields = set_parts.len(), "overlay updated");
    Ok(overlay)
}

/// Replaces the audio reference of an overlay.
///
/// Unlike [`update_overlay`] this always writes, because it follows a file
/// upload. The previous audio file is left on disk.
pub fn update_overlay_audio(
    conn: &Connection,
    id: i64,
    audio_url: &str,
) -> Result<Overlay, CatalogError> {
    let overlay = conn
        .query_row(
            &format!("UPDATE calques SET url_audio = ?1 WHERE id = ?2 RETURNING {OVERLAY_COLUMNS}"),
            params![audio_url, id],
            map_row_to_overlay,
        )
        .optional()?
        .ok_or_else(|| CatalogError::not_found("calque", id))?;

    tracing::info!(overlay_id = id, audio_url, "overlay audio replaced");
    Ok(overlay)
}

/// Returns whether an overlay with this identity exists.
pub fn overlay_exists(conn: &Connection, id: i64) -> Result<bool, CatalogError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM calques WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn map_row_to_overlay(row: &Row) -> rusqlite::Result<Overlay> {
    let kind_str: String = row.get(1)?;
    let kind: TypeCalque = kind_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Overlay {
        id: row.get(0)?,
        kind,
        description: row.get(2)?,
        overlay_url: row.get(3)?,
        audio_url: row.get(4)?,
        work_id: row.get(5)?,
    })
}
