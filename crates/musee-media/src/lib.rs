//! Media asset persistence for the Musee backend.
//!
//! Uploaded images and audio files are written under a media root, one
//! directory per [`AssetKind`], with a random v4 UUID as the file stem and
//! the original file's extension preserved. The returned reference is the
//! path relative to the media root (`targets/<uuid>.jpg`), which is what the
//! catalog stores and what the static file server exposes.
//!
//! Files are written before any row referencing them is committed. A write
//! failure aborts the caller's operation; partially written files are not
//! cleaned up.

use musee_types::AssetKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Default ceiling for a single uploaded file: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Maximum length kept from an original file extension.
const MAX_EXTENSION_LEN: usize = 8;

/// Errors that can occur while accepting or persisting an asset.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The upload was rejected before anything was written.
    #[error("invalid upload: {0}")]
    Validation(String),

    /// Writing the asset to disk failed.
    #[error("failed to store asset at {path}: {source}")]
    Storage {
        /// Path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Which audio uploads are accepted.
///
/// Rejected audio is always an explicit [`MediaError::Validation`]; it is
/// never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPolicy {
    /// Any audio file is accepted.
    AcceptAny,
    /// Only files whose extension (lowercase, without the dot) is listed.
    Extensions(Vec<String>),
}

impl AudioPolicy {
    /// Builds a policy from a configured extension list; an empty list accepts any file.
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if list.is_empty() {
            Self::AcceptAny
        } else {
            Self::Extensions(list)
        }
    }

    fn allows(&self, extension: Option<&str>) -> bool {
        match self {
            Self::AcceptAny => true,
            Self::Extensions(list) => extension.is_some_and(|ext| list.iter().any(|e| e == ext)),
        }
    }
}

impl Default for AudioPolicy {
    fn default() -> Self {
        Self::Extensions(vec!["mp3".to_string()])
    }
}

/// Tunables for [`MediaStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Audio acceptance policy.
    pub audio_policy: AudioPolicy,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            audio_policy: AudioPolicy::default(),
        }
    }
}

/// A file received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name as sent by the client; only its extension is kept.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Writes uploaded assets under a media root.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    settings: MediaSettings,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, settings: MediaSettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    /// The directory all asset paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    /// Resolves a stored asset reference to its location on disk.
    pub fn resolve(&self, asset_path: &str) -> PathBuf {
        self.root.join(asset_path)
    }

    /// Checks an upload against the size limit and, for audio, the audio policy.
    ///
    /// Performs no I/O, so callers can reject bad input before writing anything.
    pub fn check_upload(&self, kind: AssetKind, upload: &Upload) -> Result<(), MediaError> {
        if upload.bytes.is_empty() {
            return Err(MediaError::Validation(format!(
                "{} upload {:?} is empty",
                kind.label(),
                upload.file_name
            )));
        }
        if upload.bytes.len() > self.settings.max_upload_bytes {
            return Err(MediaError::Validation(format!(
                "file too large: {} bytes (max {})",
                upload.bytes.len(),
                self.settings.max_upload_bytes
            )));
        }
        if kind == AssetKind::Audio {
            let ext = extension_of(&upload.file_name);
            if !self.settings.audio_policy.allows(ext.as_deref()) {
                return Err(MediaError::Validation(format!(
                    "audio file {:?} has an unsupported extension",
                    upload.file_name
                )));
            }
        }
        Ok(())
    }

    /// Persists an upload and returns its path relative to the media root.
    ///
    /// # Errors
    ///
    /// `MediaError::Validation` if [`check_upload`](Self::check_upload) rejects
    /// it, `MediaError::Storage` if the directory or file cannot be written.
    pub async fn store_asset(&self, kind: AssetKind, upload: &Upload) -> Result<String, MediaError> {
        self.check_upload(kind, upload)?;

        let dir = self.root.join(kind.dir_name());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| MediaError::Storage {
                path: dir.clone(),
                source,
            })?;

        let file_name = asset_file_name(&upload.file_name);
        let file_path = dir.join(&file_name);
        tokio::fs::write(&file_path, &upload.bytes)
            .await
            .map_err(|source| MediaError::Storage {
                path: file_path.clone(),
                source,
            })?;

        let asset_path = format!("{}/{}", kind.dir_name(), file_name);
        tracing::info!(
            kind = kind.label(),
            asset_path = %asset_path,
            original_filename = %upload.file_name,
            size_bytes = upload.bytes.len(),
            "asset stored"
        );
        Ok(asset_path)
    }

    /// Optional-upload variant of [`store_asset`](Self::store_asset).
    ///
    /// Returns an empty reference when no file was supplied, matching the
    /// empty-string default of the optional asset columns.
    pub async fn maybe_store_asset(
        &self,
        kind: AssetKind,
        upload: Option<&Upload>,
    ) -> Result<String, MediaError> {
        match upload {
            Some(upload) => self.store_asset(kind, upload).await,
            None => Ok(String::new()),
        }
    }
}

/// Generates a collision-resistant file name keeping the original extension.
pub fn asset_file_name(original_filename: &str) -> String {
    let stem = Uuid::new_v4();
    match extension_of(original_filename) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

/// Returns the lowercase last extension of a client file name, if it is usable.
///
/// Extensions that are not short ASCII alphanumerics are dropped rather
/// than carried into the stored name.
pub fn extension_of(original_filename: &str) -> Option<String> {
    // Clients may send Windows-style paths.
    let base = original_filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(original_filename);
    let ext = Path::new(base).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_uses_last_component() {
        assert_eq!(extension_of("radeau.jpg").as_deref(), Some("jpg"));
        assert_eq!(extension_of("radeau.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("clip.ts").as_deref(), Some("ts"));
        assert_eq!(extension_of("C:\\photos\\scan.tif").as_deref(), Some("tif"));
    }

    #[test]
    fn unusable_extensions_are_dropped() {
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("weird.j pg"), None);
        assert_eq!(extension_of("long.abcdefghijk"), None);
        assert_eq!(extension_of(""), None);
    }

    #[test]
    fn file_names_are_unique_and_keep_extension() {
        let a = asset_file_name("same.png");
        let b = asset_file_name("same.png");
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        let stem = a.trim_end_matches(".png");
        assert!(Uuid::parse_str(stem).is_ok(), "stem should be a UUID: {stem}");
    }

    #[test]
    fn audio_policy_from_config() {
        assert_eq!(
            AudioPolicy::from_extensions(Vec::<String>::new()),
            AudioPolicy::AcceptAny
        );
        let policy = AudioPolicy::from_extensions([".MP3", "ogg"]);
        assert_eq!(
            policy,
            AudioPolicy::Extensions(vec!["mp3".to_string(), "ogg".to_string()])
        );
        assert!(policy.allows(Some("ogg")));
        assert!(!policy.allows(Some("wav")));
        assert!(!policy.allows(None));
    }

    #[test]
    fn non_mp3_audio_is_rejected_loudly() {
        let store = MediaStore::new("/nonexistent", MediaSettings::default());
        let err = store
            .check_upload(AssetKind::Audio, &Upload::new("voice.wav", vec![1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));

        assert!(store
            .check_upload(AssetKind::Audio, &Upload::new("voice.mp3", vec![1, 2, 3]))
            .is_ok());
        // The audio policy does not apply to images.
        assert!(store
            .check_upload(AssetKind::TargetImage, &Upload::new("scan.wav", vec![1]))
            .is_ok());
    }

    #[test]
    fn oversized_and_empty_uploads_are_rejected() {
        let store = MediaStore::new(
            "/nonexistent",
            MediaSettings {
                max_upload_bytes: 4,
                audio_policy: AudioPolicy::AcceptAny,
            },
        );
        assert!(matches!(
            store.check_upload(AssetKind::OverlayImage, &Upload::new("a.png", vec![0; 5])),
            Err(MediaError::Validation(_))
        ));
        assert!(matches!(
            store.check_upload(AssetKind::OverlayImage, &Upload::new("a.png", Vec::new())),
            Err(MediaError::Validation(_))
        ));
    }
}
