pub mod admin;
pub mod booking;
pub mod catalog;
pub mod comment;
pub mod health;
pub mod provider;
pub mod service;
pub mod user;
pub mod wishlist;

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde::Serialize;

use commun_auth_types::identity::IdentityHeaders;

use crate::domain::types::{StoredAsset, UploadedFile};
use crate::error::MarketplaceError;
use crate::usecase::Caller;

impl From<&IdentityHeaders> for Caller {
    fn from(identity: &IdentityHeaders) -> Self {
        Self {
            user_id: identity.user_id,
            is_admin: identity.is_admin(),
        }
    }
}

/// `{ success: true, message }` acknowledgement for mutations without a body.
#[derive(Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub url: String,
    pub public_id: String,
}

impl From<StoredAsset> for AssetResponse {
    fn from(asset: StoredAsset) -> Self {
        Self {
            url: asset.url,
            public_id: asset.public_id,
        }
    }
}

/// A multipart body split into text fields and file parts.
///
/// A part with a file name is a file; anything else is text. Text fields
/// may repeat (`subCategories=a&subCategories=b`).
#[derive(Debug, Default)]
pub struct MultipartFields {
    pub texts: HashMap<String, Vec<String>>,
    pub files: Vec<UploadedFile>,
}

impl MultipartFields {
    /// First value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// A text field as a JSON value: a string for one occurrence, an array
    /// of strings for several, `null` when absent.
    pub fn value(&self, name: &str) -> serde_json::Value {
        match self.texts.get(name).map(Vec::as_slice) {
            None | Some([]) => serde_json::Value::Null,
            Some([single]) => serde_json::Value::String(single.clone()),
            Some(many) => serde_json::Value::Array(
                many.iter().cloned().map(serde_json::Value::String).collect(),
            ),
        }
    }

    /// Remove and return the files sent under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field_name == name);
        self.files = kept;
        taken
    }
}

pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartFields, MarketplaceError> {
    let mut fields = MultipartFields::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                fields.files.push(UploadedFile {
                    field_name: name,
                    file_name: Some(file_name),
                    content_type,
                    bytes,
                });
            }
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                fields.texts.entry(name).or_default().push(text);
            }
        }
    }
    Ok(fields)
}

fn multipart_error(err: MultipartError) -> MarketplaceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        MarketplaceError::PayloadTooLarge
    } else {
        MarketplaceError::InvalidMultipart(err.body_text())
    }
}
