//! Works (oeuvres): the pieces on display.

use crate::overlay::{list_overlays_of_work, Overlay};
use crate::tour::tour_exists;
use crate::validate::{finite, non_empty, positive};
use crate::CatalogError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

const WORK_COLUMNS: &str = "id, titre, auteur, technique, hauteur, largeur, annee,
    url_cible, url_audio, latitude, longitude, altitude, parcours_id";

/// A work on display in the museum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    /// Store-assigned identity.
    pub id: i64,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "auteur")]
    pub author: String,
    pub technique: String,
    /// Height in centimetres.
    #[serde(rename = "hauteur")]
    pub height: i64,
    /// Width in centimetres.
    #[serde(rename = "largeur")]
    pub width: i64,
    /// Year of creation.
    #[serde(rename = "annee")]
    pub year: i64,
    /// Relative path of the target image under the media root.
    #[serde(rename = "urlCible")]
    pub target_url: String,
    /// Relative path of the audio commentary, or empty when there is none.
    #[serde(rename = "urlAudio")]
    pub audio_url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    /// Owning tour, if any.
    #[serde(rename = "parcoursId")]
    pub tour_id: Option<i64>,
}

/// A work together with its overlays, as returned by the detail read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDetail {
    #[serde(flatten)]
    pub work: Work,
    #[serde(rename = "calques")]
    pub overlays: Vec<Overlay>,
}

/// Descriptive fields for a new work. Asset paths are supplied separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWork {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "auteur")]
    pub author: String,
    pub technique: String,
    #[serde(rename = "hauteur")]
    pub height: i64,
    #[serde(rename = "largeur")]
    pub width: i64,
    #[serde(rename = "annee")]
    pub year: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(rename = "parcoursId", default)]
    pub tour_id: Option<i64>,
}

impl NewWork {
    /// Checks field invariants without touching the database.
    pub fn validate(&self) -> Result<(), CatalogError> {
        non_empty("titre", &self.title)?;
        non_empty("auteur", &self.author)?;
        non_empty("technique", &self.technique)?;
        positive("hauteur", self.height)?;
        positive("largeur", self.width)?;
        finite("latitude", self.latitude)?;
        finite("longitude", self.longitude)?;
        finite("altitude", self.altitude)?;
        Ok(())
    }
}

/// Partial update of a work.
///
/// Every field is optional. `None` (absent or JSON `null`) leaves the stored
/// value untouched, so a null can never clear a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkUpdate {
    #[serde(rename = "titre", default)]
    pub title: Option<String>,
    #[serde(rename = "auteur", default)]
    pub author: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(rename = "hauteur", default)]
    pub height: Option<i64>,
    #[serde(rename = "largeur", default)]
    pub width: Option<i64>,
    #[serde(rename = "annee", default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(rename = "parcoursId", default)]
    pub tour_id: Option<i64>,
}

impl WorkUpdate {
    fn validate(&self) -> Result<(), CatalogError> {
        if let Some(title) = &self.title {
            non_empty("titre", title)?;
        }
        if let Some(author) = &self.author {
            non_empty("auteur", author)?;
        }
        if let Some(technique) = &self.technique {
            non_empty("technique", technique)?;
        }
        if let Some(height) = self.height {
            positive("hauteur", height)?;
        }
        if let Some(width) = self.width {
            positive("largeur", width)?;
        }
        finite("latitude", self.latitude)?;
        finite("longitude", self.longitude)?;
        finite("altitude", self.altitude)?;
        Ok(())
    }
}

/// Runs every check `create_work` performs before inserting.
///
/// Callers that must write asset files first use this so that invalid input
/// or a dangling tour reference is rejected before anything touches disk.
pub fn check_new_work(conn: &Connection, fields: &NewWork) -> Result<(), CatalogError> {
    fields.validate()?;
    if let Some(tour_id) = fields.tour_id {
        if !tour_exists(conn, tour_id)? {
            return Err(CatalogError::not_found("parcours", tour_id));
        }
    }
    Ok(())
}

/// Inserts a new work referencing already-stored assets.
///
/// `audio_url` is empty when no audio was uploaded.
pub fn create_work(
    conn: &Connection,
    fields: &NewWork,
    target_url: &str,
    audio_url: &str,
) -> Result<Work, CatalogError> {
    check_new_work(conn, fields)?;
    if target_url.is_empty() {
        return Err(CatalogError::validation("urlCible must not be empty"));
    }

    let work = conn.query_row(
        &format!(
            "INSERT INTO oeuvres (
                titre, auteur, technique, hauteur, largeur, annee,
                url_cible, url_audio, latitude, longitude, altitude, parcours_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            RETURNING {WORK_COLUMNS}"
        ),
        params![
            fields.title,
            fields.author,
            fields.technique,
            fields.height,
            fields.width,
            fields.year,
            target_url,
            audio_url,
            fields.latitude,
            fields.longitude,
            fields.altitude,
            fields.tour_id,
        ],
        map_row_to_work,
    )?;

    tracing::info!(work_id = work.id, title = %work.title, "work created");
    Ok(work)
}

/// Retrieves a work by identity.
pub fn get_work(conn: &Connection, id: i64) -> Result<Option<Work>, CatalogError> {
    let work = conn
        .query_row(
            &format!("SELECT {WORK_COLUMNS} FROM oeuvres WHERE id = ?1"),
            [id],
            map_row_to_work,
        )
        .optional()?;
    Ok(work)
}

/// Retrieves a work with its overlays embedded.
pub fn get_work_detail(conn: &Connection, id: i64) -> Result<Option<WorkDetail>, CatalogError> {
    let Some(work) = get_work(conn, id)? else {
        return Ok(None);
    };
    let overlays = list_overlays_of_work(conn, id)?;
    Ok(Some(WorkDetail { work, overlays }))
}

/// Lists every work, ordered by identity.
pub fn list_works(conn: &Connection) -> Result<Vec<Work>, CatalogError> {
    let mut stmt = conn.prepare(&format!("SELECT {WORK_COLUMNS} FROM oeuvres ORDER BY id ASC"))?;
    let rows = stmt.query_map([], map_row_to_work)?;
    let mut works = Vec::new();
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

/// Lists the works owned by a tour, ordered by identity.
pub fn list_works_of_tour(conn: &Connection, tour_id: i64) -> Result<Vec<Work>, CatalogError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WORK_COLUMNS} FROM oeuvres WHERE parcours_id = ?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([tour_id], map_row_to_work)?;
    let mut works = Vec::new();
    for row in rows {
        works.push(row?);
    }
    Ok(works)
}

/// Lists the works owned by a tour, each with its overlays embedded.
pub fn list_work_details_of_tour(
    conn: &Connection,
    tour_id: i64,
) -> Result<Vec<WorkDetail>, CatalogError> {
    list_works_of_tour(conn, tour_id)?
        .into_iter()
        .map(|work| {
            let overlays = list_overlays_of_work(conn, work.id)?;
            Ok(WorkDetail { work, overlays })
        })
        .collect()
}

/// Returns whether a work with this identity exists.
pub fn work_exists(conn: &Connection, id: i64) -> Result<bool, CatalogError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM oeuvres WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Applies a partial update to a work and returns the stored result.
///
/// Only fields set in `updates` are written. An update with no fields set
/// writes nothing and returns the current record.
///
/// Concurrent updates of the same work are not coordinated: the last write
/// of each column wins.
pub fn update_work(conn: &Connection, id: i64, updates: &WorkUpdate) -> Result<Work, CatalogError> {
    updates.validate()?;

    let mut set_parts = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1;

    if let Some(title) = &updates.title {
        set_parts.push(format!("titre = ?{}", idx));
        values.push(Box::new(title.clone()));
        idx += 1;
    }
    if let Some(author) = &updates.author {
        set_parts.push(format!("auteur = ?{}", idx));
        values.push(Box::new(author.clone()));
        idx += 1;
    }
    if let Some(technique) = &updates.technique {
        set_parts.push(format!("technique = ?{}", idx));
        values.push(Box::new(technique.clone()));
        idx += 1;
    }
    if let Some(height) = updates.height {
        set_parts.push(format!("hauteur = ?{}", idx));
        values.push(Box::new(height));
        idx += 1;
    }
    if let Some(width) = updates.width {
        set_parts.push(format!("largeur = ?{}", idx));
        values.push(Box::new(width));
        idx += 1;
    }
    if let Some(year) = updates.year {
        set_parts.push(format!("annee = ?{}", idx));
        values.push(Box::new(year));
        idx += 1;
    }
    if let Some(latitude) = updates.latitude {
        set_parts.push(format!("latitude = ?{}", idx));
        values.push(Box::new(latitude));
        idx += 1;
    }
    if let Some(longitude) = updates.longitude {
        set_parts.push(format!("longitude = ?{}", idx));
        values.push(Box::new(longitude));
        idx += 1;
    }
    if let Some(altitude) = updates.altitude {
        set_parts.push(format!("altitude = ?{}", idx));
        values.push(Box::new(altitude));
        idx += 1;
    }
    if let Some(tour_id) = updates.tour_id {
        if !tour_exists(conn, tour_id)? {
            return Err(CatalogError::not_found("parcours", tour_id));
        }
        set_parts.push(format!("parcours_id = ?{}", idx));
        values.push(Box::new(tour_id));
        idx += 1;
    }

    if set_parts.is_empty() {
        return get_work(conn, id)?.ok_or_else(|| CatalogError::not_found("oeuvre", id));
    }

    let sql = format!(
        "UPDATE oeuvres SET {} WHERE id = ?{} RETURNING {WORK_COLUMNS}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let work = conn
        .query_row(&sql, params.as_slice(), map_row_to_work)
        .optional()?
        .ok_or_else(|| CatalogError::not_found("oeuvre", id))?;

    tracing::info!(work_id = id, fields = set_parts.len(), "work updated");
    Ok(work)
}

pub(crate) fn map_row_to_work(row: &Row) -> rusqlite::Result<Work> {
    Ok(Work {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        technique: row.get(3)?,
        height: row.get(4)?,
        width: row.get(5)?,
        year: row.get(6)?,
        target_url: row.get(7)?,
        audio_url: row.get(8)?,
        latitude: row.get(9)?,
        longitude: row.get(10)?,
        altitude: row.get(11)?,
        tour_id: row.get(12)?,
    })
}
