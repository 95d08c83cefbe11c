//! Multipart form collection.
//!
//! Create endpoints receive text fields and up to two files in one
//! `multipart/form-data` body. The whole body is collected first so that
//! every field can be validated before any file is written.

use crate::api::ApiError;
use axum::extract::Multipart;
use musee_media::Upload;
use std::collections::HashMap;
use std::str::FromStr;

/// Text fields and files of one multipart request, keyed by field name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    /// Drains a multipart stream.
    ///
    /// A file field with neither a file name nor content (what browsers send
    /// for an untouched file input) counts as absent.
    pub async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(|e| {
                        ApiError::BadRequest(format!("failed to read upload {name}: {}", e))
                    })?;
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.insert(name, Upload::new(file_name, data.to_vec()));
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        ApiError::BadRequest(format!("failed to read field {name}: {}", e))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// A text field that must be present (it may still be empty).
    pub fn required_text(&self, name: &str) -> Result<String, ApiError> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::BadRequest(format!("missing field: {name}")))
    }

    /// A text field parsed into `T`.
    pub fn required_parse<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        let raw = self.required_text(name)?;
        parse_field(name, raw.trim())
    }

    /// An optional field parsed into `T`. Missing and blank both mean `None`.
    pub fn optional_parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.fields.get(name).map(|s| s.trim()) {
            None | Some("") => Ok(None),
            Some(raw) => parse_field(name, raw).map(Some),
        }
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name)
    }

    pub fn required_file(&self, name: &str) -> Result<&Upload, ApiError> {
        self.file(name)
            .ok_or_else(|| ApiError::BadRequest(format!("missing file: {name}")))
    }
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid value for {name}: {raw:?}")))
}
