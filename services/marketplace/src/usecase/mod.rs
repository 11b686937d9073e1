pub mod admin;
pub mod booking;
pub mod comment;
pub mod provider;
pub mod service;
pub mod user;
pub mod wishlist;

use uuid::Uuid;

use crate::domain::repository::{BlobStore, ProviderProfileRepository, UserRepository};
use crate::domain::types::{ProviderProfile, ServiceOffering, StoredAsset, UploadedFile, User};
use crate::error::MarketplaceError;

/// The authenticated user a use case acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Blobs uploaded during one request.
///
/// Uploads are recorded as they succeed so that an aborted request can
/// delete every one of them with [`UploadBatch::discard`].
pub(crate) struct UploadBatch<'a, B: BlobStore> {
    blobs: &'a B,
    uploaded: Vec<String>,
}

impl<'a, B: BlobStore> UploadBatch<'a, B> {
    pub(crate) fn new(blobs: &'a B) -> Self {
        Self {
            blobs,
            uploaded: Vec::new(),
        }
    }

    pub(crate) async fn upload_all(
        &mut self,
        files: &[UploadedFile],
    ) -> Result<Vec<StoredAsset>, MarketplaceError> {
        let mut assets = Vec::with_capacity(files.len());
        for file in files {
            let asset = self.blobs.upload(file).await?;
            self.uploaded.push(asset.public_id.clone());
            assets.push(asset);
        }
        Ok(assets)
    }

    /// Best-effort delete of everything uploaded so far.
    pub(crate) async fn discard(self) {
        delete_blobs(self.blobs, self.uploaded.iter().map(String::as_str)).await;
    }
}

/// Delete blobs, logging failures instead of returning them.
pub(crate) async fn delete_blobs<'s, B: BlobStore>(
    blobs: &B,
    public_ids: impl IntoIterator<Item = &'s str>,
) {
    for public_id in public_ids {
        if let Err(err) = blobs.delete(public_id).await {
            tracing::warn!(public_id, error = %err, "failed to delete blob");
        }
    }
}

/// Owner or admin may change a service.
pub(crate) async fn authorize_service_change<P: ProviderProfileRepository>(
    profiles: &P,
    caller: Caller,
    service: &ServiceOffering,
) -> Result<(), MarketplaceError> {
    if caller.is_admin {
        return Ok(());
    }
    match profiles.find_by_user_id(caller.user_id).await? {
        Some(profile) if profile.id == service.provider_id => Ok(()),
        _ => Err(MarketplaceError::Forbidden),
    }
}

/// The caller's provider profile, or `NotAProvider`.
pub(crate) async fn require_profile<P: ProviderProfileRepository>(
    profiles: &P,
    user_id: Uuid,
) -> Result<ProviderProfile, MarketplaceError> {
    profiles
        .find_by_user_id(user_id)
        .await?
        .ok_or(MarketplaceError::NotAProvider)
}

/// The caller's user row. Identity headers alone do not prove one exists.
pub(crate) async fn require_user<U: UserRepository>(
    users: &U,
    user_id: Uuid,
) -> Result<User, MarketplaceError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or(MarketplaceError::UserNotFound)
}
