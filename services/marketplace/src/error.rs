use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use commun_core::error::error_response;
use commun_domain::booking::BookingStatus;

/// Marketplace service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("{0}")]
    Validation(String),
    #[error("user is already a provider")]
    AlreadyProvider,
    #[error("{0}")]
    MissingFiles(String),
    #[error("invalid multipart body: {0}")]
    InvalidMultipart(String),
    #[error("request body is too large")]
    PayloadTooLarge,
    #[error("missing data")]
    MissingData,
    #[error("a service must keep at least one image")]
    LastImage,
    #[error("unknown booking status '{0}'")]
    InvalidBookingStatus(String),
    #[error("forbidden")]
    Forbidden,
    #[error("caller is not a provider")]
    NotAProvider,
    #[error("user not found")]
    UserNotFound,
    #[error("provider profile not found")]
    ProviderProfileNotFound,
    #[error("service not found")]
    ServiceNotFound,
    #[error("asset not found")]
    AssetNotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("booking not found")]
    BookingNotFound,
    #[error("wishlist item not found")]
    WishlistItemNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("you have already commented on this service")]
    CommentAlreadyExists,
    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("file storage is unavailable")]
    BlobStore(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::AlreadyProvider => "ALREADY_PROVIDER",
            Self::MissingFiles(_) => "MISSING_FILES",
            Self::InvalidMultipart(_) => "INVALID_MULTIPART",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::MissingData => "MISSING_DATA",
            Self::LastImage => "LAST_IMAGE",
            Self::InvalidBookingStatus(_) => "INVALID_BOOKING_STATUS",
            Self::Forbidden => "FORBIDDEN",
            Self::NotAProvider => "NOT_A_PROVIDER",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ProviderProfileNotFound => "PROVIDER_PROFILE_NOT_FOUND",
            Self::ServiceNotFound => "SERVICE_NOT_FOUND",
            Self::AssetNotFound => "ASSET_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::WishlistItemNotFound => "WISHLIST_ITEM_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::CommentAlreadyExists => "COMMENT_ALREADY_EXISTS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::BlobStore(_) => "BLOB_STORE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::AlreadyProvider
            | Self::MissingFiles(_)
            | Self::InvalidMultipart(_)
            | Self::MissingData
            | Self::LastImage
            | Self::InvalidBookingStatus(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Forbidden | Self::NotAProvider => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::ProviderProfileNotFound
            | Self::ServiceNotFound
            | Self::AssetNotFound
            | Self::CommentNotFound
            | Self::BookingNotFound
            | Self::WishlistItemNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists
            | Self::CommentAlreadyExists
            | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::BlobStore(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<commun_domain::catalog::SelectionError> for MarketplaceError {
    fn from(err: commun_domain::catalog::SelectionError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
            }
            Self::BlobStore(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "BLOB_STORE", "blob store error");
            }
            _ => {}
        }
        error_response(self.status(), self.kind(), self.to_string())
    }
}
