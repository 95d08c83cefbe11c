//! Entity store for the Musee backend.
//!
//! Owns the canonical representation of works (oeuvres), overlays (calques)
//! and tours (parcours), and enforces their field invariants and reference
//! rules on top of the `musee-db` schema.
//!
//! Every function takes the caller's `&Connection` as its unit of work.
//! Nothing here holds a connection beyond the call.
//!
//! # Update semantics
//!
//! [`update_work`] and [`update_overlay`] are PATCH-style merges: each field
//! of the update that is `Some` overwrites the stored value, and `None`
//! leaves it alone. JSON `null` deserializes to `None`, so a null can never
//! clear a field, and an update with nothing set returns the record as-is.
//!
//! Asset references (`urlCible`, `urlCalque`, `urlAudio`) are plain relative
//! paths produced by `musee-media`. Callers write the file first and only
//! then call the create/update function that records its path.

mod error;
mod overlay;
mod seed;
mod tour;
mod validate;
mod work;

pub use error::CatalogError;
pub use overlay::{
    check_new_overlay, create_overlay, get_overlay, list_overlays_of_work, overlay_exists,
    update_overlay, update_overlay_audio, NewOverlay, Overlay, OverlayUpdate,
};
pub use seed::{seed_demo_catalog, SeedOutcome};
pub use tour::{create_tour, get_tour, list_tours, tour_exists, NewTour, Tour};
pub use validate::parse_type_calque;
pub use work::{
    check_new_work, create_work, get_work, get_work_detail, list_work_details_of_tour, list_works,
    list_works_of_tour, update_work, work_exists, NewWork, Work, WorkDetail, WorkUpdate,
};
