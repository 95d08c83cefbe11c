//! Demo catalog inserted on startup when enabled.
//!
//! The demo rows use fixed identities, so a second run hits the primary key
//! and is skipped instead of duplicating data.
//!
//! Their asset references follow the same relative layout as uploads
//! (`targets/...`, `overlays/...`). No file is written for them, so they
//! resolve under `/media` only once matching files are placed there.

use crate::error::is_uniqueness_violation;
use crate::CatalogError;
use musee_types::TypeCalque;
use rusqlite::{params, Connection};

/// Outcome of [`seed_demo_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The demo rows were inserted by this call.
    Inserted,
    /// The demo rows (or rows with the same identities) were already present.
    AlreadyPresent,
}

const DEMO_WORK_ID: i64 = 1;

const DEMO_TARGET_URL: &str = "targets/demo-meduse.jpg";

const DEMO_OVERLAYS: &[(i64, TypeCalque, &str, &str)] = &[
    (
        1,
        TypeCalque::Composition,
        "Le triangle de l'amour",
        "overlays/demo-triangle.png",
    ),
    (
        2,
        TypeCalque::Anecdote,
        "Le carré de la haine",
        "overlays/demo-carre.png",
    ),
];

/// Inserts the demo work "La Méduse" and its two overlays.
///
/// Runs in one transaction. A uniqueness violation means the demo data is
/// already there and yields [`SeedOutcome::AlreadyPresent`]; any other
/// failure is returned.
pub fn seed_demo_catalog(conn: &Connection) -> Result<SeedOutcome, CatalogError> {
    let tx = conn.unchecked_transaction()?;

    match insert_demo_rows(&tx) {
        Ok(()) => {
            tx.commit()?;
            tracing::info!(work_id = DEMO_WORK_ID, "demo catalog seeded");
            Ok(SeedOutcome::Inserted)
        }
        Err(e) if is_uniqueness_violation(&e) => {
            tracing::info!("demo catalog already present, skipping seed");
            Ok(SeedOutcome::AlreadyPresent)
        }
        Err(e) => Err(CatalogError::Database(e)),
    }
}

fn insert_demo_rows(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO oeuvres (id, titre, auteur, technique, hauteur, largeur, annee, url_cible)
         VALUES (?1, 'La Méduse', 'Nymous', 'pâte à modeler', 491, 716, 1818, ?2)",
        params![DEMO_WORK_ID, DEMO_TARGET_URL],
    )?;

    for (id, kind, description, url) in DEMO_OVERLAYS {
        conn.execute(
            "INSERT INTO calques (id, type_calque, description, url_calque, oeuvre_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, kind.as_str(), description, url, DEMO_WORK_ID],
        )?;
    }
    Ok(())
}
