//! Tours (parcours): named, timed groupings of works.

use crate::validate::{non_empty, positive};
use crate::work::{list_work_details_of_tour, WorkDetail};
use crate::CatalogError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// A tour with the works it owns, each carrying its overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: i64,
    #[serde(rename = "nom")]
    pub name: String,
    /// Expected duration in minutes.
    #[serde(rename = "duree")]
    pub duration: i64,
    #[serde(rename = "oeuvres")]
    pub works: Vec<WorkDetail>,
}

/// Fields for a new tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTour {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "duree")]
    pub duration: i64,
}

/// Inserts a new tour. It owns no works yet.
pub fn create_tour(conn: &Connection, fields: &NewTour) -> Result<Tour, CatalogError> {
    non_empty("nom", &fields.name)?;
    positive("duree", fields.duration)?;

    let id: i64 = conn.query_row(
        "INSERT INTO parcours (nom, duree) VALUES (?1, ?2) RETURNING id",
        params![fields.name, fields.duration],
        |row| row.get(0),
    )?;

    tracing::info!(tour_id = id, name = %fields.name, "tour created");
    Ok(Tour {
        id,
        name: fields.name.clone(),
        duration: fields.duration,
        works: Vec::new(),
    })
}

/// Retrieves a tour with its works and their overlays.
pub fn get_tour(conn: &Connection, id: i64) -> Result<Option<Tour>, CatalogError> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT nom, duree FROM parcours WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((name, duration)) = row else {
        return Ok(None);
    };

    Ok(Some(Tour {
        id,
        name,
        duration,
        works: list_work_details_of_tour(conn, id)?,
    }))
}

/// Lists every tour with its works, ordered by identity.
pub fn list_tours(conn: &Connection) -> Result<Vec<Tour>, CatalogError> {
    let mut stmt = conn.prepare("SELECT id, nom, duree FROM parcours ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut tours = Vec::new();
    for row in rows {
        let (id, name, duration) = row?;
        tours.push(Tour {
            id,
            name,
            duration,
            works: list_work_details_of_tour(conn, id)?,
        });
    }
    Ok(tours)
}

/// Returns whether a tour with this identity exists.
pub fn tour_exists(conn: &Connection, id: i64) -> Result<bool, CatalogError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM parcours WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}
