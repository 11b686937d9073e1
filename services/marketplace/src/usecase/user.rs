use chrono::Utc;
use uuid::Uuid;

use commun_domain::user::UserRole;

use crate::domain::repository::{BlobStore, UserRepository};
use crate::domain::types::{AssetKind, UploadedFile, User, UserPatch};
use crate::error::MarketplaceError;
use crate::usecase::delete_blobs;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── CreateUser ───────────────────────────────────────────────────────────────

/// A user record provisioned by the identity layer. Always starts as a
/// customer.
pub struct CreateUserInput {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

pub struct CreateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, MarketplaceError> {
        let email = input.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(MarketplaceError::Validation(
                "email must be a valid address".into(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: input.id,
            name: non_blank(input.name),
            first_name: non_blank(input.first_name),
            last_name: non_blank(input.last_name),
            email,
            phone: non_blank(input.phone),
            role: UserRole::Customer,
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&user).await?;
        Ok(user)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, MarketplaceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, patch: UserPatch) -> Result<User, MarketplaceError> {
        let patch = UserPatch {
            name: non_blank(patch.name),
            first_name: non_blank(patch.first_name),
            last_name: non_blank(patch.last_name),
            phone: non_blank(patch.phone),
        };
        if patch.is_empty() {
            return Err(MarketplaceError::MissingData);
        }
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;
        self.repo.update_profile(user_id, &patch).await?;
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}

// ── UpdateProfileImage ───────────────────────────────────────────────────────

pub struct UpdateProfileImageUseCase<R, B>
where
    R: UserRepository,
    B: BlobStore,
{
    pub repo: R,
    pub blobs: B,
}

impl<R, B> UpdateProfileImageUseCase<R, B>
where
    R: UserRepository,
    B: BlobStore,
{
    /// Upload the new image first; the previous blob is deleted only after
    /// the user row points at the new one.
    pub async fn execute(&self, user_id: Uuid, image: UploadedFile) -> Result<User, MarketplaceError> {
        if !AssetKind::Image.accepts(&image.content_type) {
            return Err(MarketplaceError::Validation(format!(
                "'{}' is not an image",
                image.display_name()
            )));
        }
        let mut user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        let asset = self.blobs.upload(&image).await?;
        let previous = match self.repo.set_profile_image(user_id, &asset).await {
            Ok(previous) => previous,
            Err(err) => {
                delete_blobs(&self.blobs, [asset.public_id.as_str()]).await;
                return Err(err);
            }
        };
        if let Some(previous) = previous {
            delete_blobs(&self.blobs, [previous.public_id.as_str()]).await;
        }

        user.profile_image = Some(asset);
        user.updated_at = Utc::now();
        Ok(user)
    }
}
