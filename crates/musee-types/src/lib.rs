//! Shared types for the Musee backend.
//!
//! This crate holds the closed enumerations that cross crate boundaries:
//! the overlay category carried by every calque, and the kind of media
//! asset an upload is stored as. Both are parsed at the edge of the system
//! so that the rest of the workspace never handles raw category strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category of an overlay (calque) attached to a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCalque {
    /// Describes the composition of the work (lines, shapes, structure).
    Composition,
    /// A story or fact about the work or its author.
    Anecdote,
}

impl TypeCalque {
    /// All known categories, in display order.
    pub const ALL: [TypeCalque; 2] = [TypeCalque::Composition, TypeCalque::Anecdote];

    /// Returns the storage and wire label for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Composition => "composition",
            Self::Anecdote => "anecdote",
        }
    }
}

impl fmt::Display for TypeCalque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known overlay category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overlay category: {0:?} (expected one of: composition, anecdote)")]
pub struct ParseTypeCalqueError(pub String);

impl FromStr for TypeCalque {
    type Err = ParseTypeCalqueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "composition" => Ok(Self::Composition),
            "anecdote" => Ok(Self::Anecdote),
            other => Err(ParseTypeCalqueError(other.to_string())),
        }
    }
}

/// The kind of media asset an upload is persisted as.
///
/// Each kind maps to its own directory under the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Reference image of a work (the "cible" the guide app recognises).
    TargetImage,
    /// Image drawn on top of a work by an overlay.
    OverlayImage,
    /// Audio commentary for a work or an overlay.
    Audio,
}

impl AssetKind {
    /// Directory name, relative to the media root, holding assets of this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::TargetImage => "targets",
            Self::OverlayImage => "overlays",
            Self::Audio => "audio",
        }
    }

    /// Short label used in log fields.
    pub fn label(self) -> &'static str {
        match self {
            Self::TargetImage => "target_image",
            Self::OverlayImage => "overlay_image",
            Self::Audio => "audio",
        }
    }
}
