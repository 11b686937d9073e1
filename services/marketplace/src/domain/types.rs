use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use commun_domain::booking::BookingStatus;
use commun_domain::user::UserRole;

/// Marketplace user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub profile_image: Option<StoredAsset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// `name`, else `first last`, else the local part of the email.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(local, _)| local)
            .to_owned()
    }
}

/// Partial update of a user's contact details.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
    }
}

/// A file held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Document,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "document" => Some(Self::Document),
            _ => None,
        }
    }

    /// Images must be `image/*`; documents must be PDFs.
    pub fn accepts(self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match self {
            Self::Image => essence.starts_with("image/") && essence.len() > "image/".len(),
            Self::Document => essence == "application/pdf",
        }
    }
}

/// One file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// File extension used for the stored object name.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            });
        if let Some(ext) = from_name {
            return ext;
        }
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "application/pdf" => "pdf",
            _ => "bin",
        }
        .to_owned()
    }

    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.field_name)
    }
}

/// Extension of a user marking them as a service provider.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: String,
    pub experience: i32,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category: String,
    pub sub_categories: Vec<String>,
    pub keywords: Vec<String>,
    pub description: String,
    pub experience: i32,
    pub clicks: i64,
    pub images: Vec<StoredAsset>,
    pub documents: Vec<StoredAsset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceOffering {
    pub fn public_ids(&self) -> impl Iterator<Item = &str> {
        self.images
            .iter()
            .chain(&self.documents)
            .map(|asset| asset.public_id.as_str())
    }
}

/// Everything written by one successful provider registration.
#[derive(Debug, Clone)]
pub struct ProviderRegistration {
    pub profile: ProviderProfile,
    pub services: Vec<ServiceOffering>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    pub text: String,
    pub reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: u64 = ratings.iter().map(|r| u64::from(*r)).sum();
        let average = sum as f64 / ratings.len() as f64;
        Self {
            average: Some((average * 10.0).round() / 10.0),
            count: ratings.len() as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub category: String,
    pub scheduled_at: DateTime<Utc>,
    pub note: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which side of a booking the caller is listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingSide {
    #[default]
    Customer,
    Provider,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub users_by_role: BTreeMap<&'static str, u64>,
    pub providers: u64,
    pub services: u64,
    pub comments: u64,
    pub bookings_by_status: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryClicks {
    pub category: String,
    pub clicks: i64,
    pub services: i64,
}
