//! Field validation shared by create and update paths.

use crate::CatalogError;
use musee_types::TypeCalque;

pub(crate) fn non_empty(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

pub(crate) fn positive(field: &str, value: i64) -> Result<(), CatalogError> {
    if value <= 0 {
        return Err(CatalogError::validation(format!(
            "{field} must be strictly positive, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn finite(field: &str, value: Option<f64>) -> Result<(), CatalogError> {
    match value {
        Some(v) if !v.is_finite() => Err(CatalogError::validation(format!(
            "{field} must be a finite number"
        ))),
        _ => Ok(()),
    }
}

/// Converts a raw category label into a [`TypeCalque`].
///
/// Any label outside the closed set is a [`CatalogError::Validation`].
pub fn parse_type_calque(raw: &str) -> Result<TypeCalque, CatalogError> {
    raw.parse()
        .map_err(|e: musee_types::ParseTypeCalqueError| CatalogError::validation(e.to_string()))
}
