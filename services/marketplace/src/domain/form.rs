//! Interpretation of loosely-typed form payloads.
//!
//! Browsers submit provider and service forms as multipart bodies, so list
//! and number fields may arrive as JSON values, JSON-encoded strings or plain
//! strings. Everything here is pure: no I/O, no clock.
//!
//! File parts are tied to a service descriptor through their field name:
//! `serviceImages_{index}` for portfolio images and
//! `serviceDocuments_{index}` for PDF documents, where `index` is the
//! 0-based position of the descriptor in the `services` array.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use commun_domain::catalog::{self, SelectionError};

use crate::domain::types::{AssetKind, UploadedFile};

pub const IMAGE_FIELD_PREFIX: &str = "serviceImages_";
pub const DOCUMENT_FIELD_PREFIX: &str = "serviceDocuments_";

/// Provider and service bios are silently cut to this many characters.
pub const MAX_BIO_CHARS: usize = 500;

static FIELD_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("static regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("services must be a non-empty JSON array of service objects")]
    MalformedServices,
    #[error("providerBio is required")]
    MissingProviderBio,
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a list of strings")]
    InvalidList(&'static str),
    #[error("experience is required")]
    MissingExperience,
    #[error("experience must be a non-negative whole number of years")]
    InvalidExperience,
}

/// A descriptor failure, naming the descriptor by its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("service #{position}: {source}")]
pub struct DescriptorError {
    pub position: usize,
    pub source: FieldError,
}

/// One entry of the `services` array as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDescriptor {
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub sub_categories: Value,
    #[serde(default)]
    pub keywords: Value,
    #[serde(default, alias = "description")]
    pub bio: Value,
    #[serde(default)]
    pub experience: Value,
}

/// A descriptor that passed catalog and presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub category: String,
    pub sub_categories: Vec<String>,
    pub keywords: Vec<String>,
    pub description: String,
    pub experience: u32,
}

impl RawDescriptor {
    /// Check category, sub-categories, keywords, bio, then experience.
    pub fn validate(&self) -> Result<ServiceDescriptor, FieldError> {
        let category = coerce_text(&self.category).ok_or(SelectionError::MissingCategory)?;
        if catalog::find(&category).is_none() {
            return Err(SelectionError::UnknownCategory(category).into());
        }
        let sub_categories = coerce_string_list(&self.sub_categories, "subCategories")?;
        let keywords = coerce_string_list(&self.keywords, "keywords")?;
        let entry = catalog::validate_selection(&category, &sub_categories, &keywords)?;

        let description = coerce_text(&self.bio).ok_or(FieldError::Missing("bio"))?;
        let experience = coerce_experience(&self.experience)?;

        Ok(ServiceDescriptor {
            category: entry.name.to_owned(),
            sub_categories,
            keywords,
            description,
            experience,
        })
    }
}

/// Parse the `services` field into a non-empty descriptor list.
pub fn parse_descriptors(raw: &str) -> Result<Vec<RawDescriptor>, FieldError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| FieldError::MalformedServices)?;
    let Value::Array(items) = value else {
        return Err(FieldError::MalformedServices);
    };
    if items.is_empty() {
        return Err(FieldError::MalformedServices);
    }
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => {
                serde_json::from_value(item).map_err(|_| FieldError::MalformedServices)
            }
            _ => Err(FieldError::MalformedServices),
        })
        .collect()
}

/// Validate every descriptor in order; the first failure wins.
pub fn validate_descriptors(
    raw: &[RawDescriptor],
) -> Result<Vec<ServiceDescriptor>, DescriptorError> {
    raw.iter()
        .enumerate()
        .map(|(i, descriptor)| {
            descriptor.validate().map_err(|source| DescriptorError {
                position: i + 1,
                source,
            })
        })
        .collect()
}

/// Trimmed, non-empty string content of a value.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        _ => None,
    }
}

/// Accepts a JSON array, a JSON-encoded array string, a single plain string,
/// or null. Blank entries are dropped.
pub fn coerce_string_list(value: &Value, field: &'static str) -> Result<Vec<String>, FieldError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(Ok(s.trim().to_owned())),
                _ => Some(Err(FieldError::InvalidList(field))),
            })
            .collect(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(Vec::new())
            } else if s.starts_with('[') {
                let parsed: Value =
                    serde_json::from_str(s).map_err(|_| FieldError::InvalidList(field))?;
                match parsed {
                    Value::Array(_) => coerce_string_list(&parsed, field),
                    _ => Err(FieldError::InvalidList(field)),
                }
            } else {
                Ok(vec![s.to_owned()])
            }
        }
        _ => Err(FieldError::InvalidList(field)),
    }
}

/// Trim every entry and drop the blank ones.
pub fn tidy_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Years of experience from a number or a string with leading digits
/// (`"3"`, `"3 years"`, `"4.5"` all work). Fractions are truncated.
pub fn coerce_experience(value: &Value) -> Result<u32, FieldError> {
    match value {
        Value::Null => Err(FieldError::MissingExperience),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                u32::try_from(v).map_err(|_| FieldError::InvalidExperience)
            } else {
                match n.as_f64() {
                    Some(v) if v.is_finite() && v >= 0.0 && v < f64::from(u32::MAX) => {
                        Ok(v.trunc() as u32)
                    }
                    _ => Err(FieldError::InvalidExperience),
                }
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(FieldError::MissingExperience);
            }
            let digits = s.strip_prefix('+').unwrap_or(s);
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end]
                .parse::<u32>()
                .map_err(|_| FieldError::InvalidExperience)
        }
        _ => Err(FieldError::InvalidExperience),
    }
}

/// Trim and clamp a bio; `None` when blank.
pub fn clamp_bio(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_BIO_CHARS).collect())
}

/// Mean of the experiences, rounded half away from zero.
pub fn mean_experience(values: &[u32]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    (sum as f64 / values.len() as f64).round() as i32
}

/// Where a file part belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSlot {
    pub kind: AssetKind,
    pub index: usize,
}

/// Read the descriptor index out of a file field name.
///
/// The index is the first run of decimal digits. Names starting with
/// `serviceDocuments` are documents; everything else is an image.
pub fn parse_file_field(field_name: &str) -> Option<FileSlot> {
    let index = FIELD_INDEX.find(field_name)?.as_str().parse().ok()?;
    let kind = if field_name.starts_with(DOCUMENT_FIELD_PREFIX.trim_end_matches('_')) {
        AssetKind::Document
    } else {
        AssetKind::Image
    };
    Some(FileSlot { kind, index })
}

/// Files attached to one descriptor.
#[derive(Debug, Clone, Default)]
pub struct ServiceFiles {
    pub images: Vec<UploadedFile>,
    pub documents: Vec<UploadedFile>,
}

/// Distribute files over `count` descriptors by field-name index.
/// Files with no index or an out-of-range index are dropped.
pub fn group_files(files: Vec<UploadedFile>, count: usize) -> Vec<ServiceFiles> {
    let mut groups = vec![ServiceFiles::default(); count];
    for file in files {
        let Some(slot) = parse_file_field(&file.field_name) else {
            tracing::debug!(field = %file.field_name, "ignoring file without service index");
            continue;
        };
        let Some(group) = groups.get_mut(slot.index) else {
            tracing::debug!(field = %file.field_name, "ignoring file with out-of-range index");
            continue;
        };
        match slot.kind {
            AssetKind::Image => group.images.push(file),
            AssetKind::Document => group.documents.push(file),
        }
    }
    groups
}

/// Reject files whose content type does not match their kind.
pub fn check_content_types(files: &[UploadedFile], kind: AssetKind) -> Result<(), String> {
    match files.iter().find(|f| !kind.accepts(&f.content_type)) {
        Some(file) => Err(match kind {
            AssetKind::Image => format!("'{}' is not an image", file.display_name()),
            AssetKind::Document => format!("'{}' is not a PDF document", file.display_name()),
        }),
        None => Ok(()),
    }
}
