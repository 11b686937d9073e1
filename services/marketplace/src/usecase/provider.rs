use chrono::Utc;
use uuid::Uuid;

use commun_domain::pagination::{Page, PageRequest};

use crate::domain::form::{self, FieldError, ServiceDescriptor, ServiceFiles};
use crate::domain::repository::{
    BlobStore, ProviderProfileRepository, ServiceOfferingRepository, UserRepository,
};
use crate::domain::types::{
    AssetKind, ProviderProfile, ProviderQuery, ProviderRegistration, ServiceOffering,
    StoredAsset, UploadedFile,
};
use crate::error::MarketplaceError;
use crate::usecase::UploadBatch;

// ── RegisterProvider ─────────────────────────────────────────────────────────

pub struct RegisterProviderInput {
    pub user_id: Uuid,
    pub provider_bio: String,
    /// JSON array of service descriptors, exactly as submitted.
    pub services: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug)]
pub struct RegisterProviderOutput {
    pub profile: ProviderProfile,
    pub services: Vec<ServiceOffering>,
}

/// Turn a customer into a provider with one or more services in one step.
///
/// Every check runs before the first upload. Uploads are then made per
/// descriptor, and the profile, services and role change are written in one
/// transaction. Any failure after the first upload deletes every blob
/// uploaded by this request.
pub struct RegisterProviderUseCase<U, P, B>
where
    U: UserRepository,
    P: ProviderProfileRepository,
    B: BlobStore,
{
    pub users: U,
    pub profiles: P,
    pub blobs: B,
}

impl<U, P, B> RegisterProviderUseCase<U, P, B>
where
    U: UserRepository,
    P: ProviderProfileRepository,
    B: BlobStore,
{
    pub async fn execute(
        &self,
        input: RegisterProviderInput,
    ) -> Result<RegisterProviderOutput, MarketplaceError> {
        let raw = form::parse_descriptors(&input.services)
            .map_err(|e| MarketplaceError::Validation(e.to_string()))?;

        self.users
            .find_by_id(input.user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;
        if self.profiles.find_by_user_id(input.user_id).await?.is_some() {
            return Err(MarketplaceError::AlreadyProvider);
        }

        let descriptors = form::validate_descriptors(&raw)
            .map_err(|e| MarketplaceError::Validation(e.to_string()))?;
        let bio = form::clamp_bio(&input.provider_bio).ok_or_else(|| {
            MarketplaceError::Validation(FieldError::MissingProviderBio.to_string())
        })?;
        let files = form::group_files(input.files, descriptors.len());
        check_files(&files)?;

        let experiences: Vec<u32> = descriptors.iter().map(|d| d.experience).collect();
        let now = Utc::now();
        let profile = ProviderProfile {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            bio,
            experience: form::mean_experience(&experiences),
            clicks: 0,
            created_at: now,
            updated_at: now,
        };

        let mut batch = UploadBatch::new(&self.blobs);
        let mut services = Vec::with_capacity(descriptors.len());
        for (descriptor, files) in descriptors.into_iter().zip(&files) {
            let uploaded = match upload_service_files(&mut batch, files).await {
                Ok(uploaded) => uploaded,
                Err(err) => {
                    batch.discard().await;
                    return Err(err);
                }
            };
            services.push(new_service(profile.id, descriptor, uploaded));
        }

        let registration = ProviderRegistration { profile, services };
        if let Err(err) = self.profiles.register(&registration).await {
            batch.discard().await;
            return Err(err);
        }

        tracing::info!(
            user_id = %input.user_id,
            profile_id = %registration.profile.id,
            services = registration.services.len(),
            "provider registered"
        );
        Ok(RegisterProviderOutput {
            profile: registration.profile,
            services: registration.services,
        })
    }
}

/// Every descriptor needs an image; every file must match its kind.
fn check_files(files: &[ServiceFiles]) -> Result<(), MarketplaceError> {
    for (i, group) in files.iter().enumerate() {
        let position = i + 1;
        if group.images.is_empty() {
            return Err(MarketplaceError::MissingFiles(format!(
                "service #{position} requires at least one image"
            )));
        }
        form::check_content_types(&group.images, AssetKind::Image)
            .and_then(|()| form::check_content_types(&group.documents, AssetKind::Document))
            .map_err(|msg| MarketplaceError::Validation(format!("service #{position}: {msg}")))?;
    }
    Ok(())
}

pub(crate) struct UploadedServiceFiles {
    images: Vec<StoredAsset>,
    documents: Vec<StoredAsset>,
}

pub(crate) async fn upload_service_files<B: BlobStore>(
    batch: &mut UploadBatch<'_, B>,
    files: &ServiceFiles,
) -> Result<UploadedServiceFiles, MarketplaceError> {
    let images = batch.upload_all(&files.images).await?;
    let documents = batch.upload_all(&files.documents).await?;
    Ok(UploadedServiceFiles { images, documents })
}

pub(crate) fn new_service(
    provider_id: Uuid,
    descriptor: ServiceDescriptor,
    uploaded: UploadedServiceFiles,
) -> ServiceOffering {
    let now = Utc::now();
    ServiceOffering {
        id: Uuid::now_v7(),
        provider_id,
        category: descriptor.category,
        sub_categories: descriptor.sub_categories,
        keywords: descriptor.keywords,
        description: descriptor.description,
        experience: i32::try_from(descriptor.experience).unwrap_or(i32::MAX),
        clicks: 0,
        images: uploaded.images,
        documents: uploaded.documents,
        created_at: now,
        updated_at: now,
    }
}

// ── Profiles ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ProviderDetail {
    pub profile: ProviderProfile,
    pub display_name: Option<String>,
    pub services: Vec<ServiceOffering>,
}

pub struct GetMyProviderProfileUseCase<P, S>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
{
    pub profiles: P,
    pub services: S,
}

impl<P, S> GetMyProviderProfileUseCase<P, S>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<ProviderDetail, MarketplaceError> {
        let profile = self
            .profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or(MarketplaceError::ProviderProfileNotFound)?;
        let services = self.services.list_by_provider(profile.id).await?;
        Ok(ProviderDetail {
            profile,
            display_name: None,
            services,
        })
    }
}

/// Public profile view. Each call counts as a click.
pub struct GetProviderProfileUseCase<P, S, U>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    U: UserRepository,
{
    pub profiles: P,
    pub services: S,
    pub users: U,
}

impl<P, S, U> GetProviderProfileUseCase<P, S, U>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    U: UserRepository,
{
    pub async fn execute(&self, profile_id: Uuid) -> Result<ProviderDetail, MarketplaceError> {
        let mut profile = self
            .profiles
            .find_by_id(profile_id)
            .await?
            .ok_or(MarketplaceError::ProviderProfileNotFound)?;
        self.profiles.record_click(profile.id).await?;
        profile.clicks += 1;

        let display_name = self
            .users
            .find_by_id(profile.user_id)
            .await?
            .map(|user| user.display_name());
        let services = self.services.list_by_provider(profile.id).await?;
        Ok(ProviderDetail {
            profile,
            display_name,
            services,
        })
    }
}

pub struct ListProviderProfilesUseCase<P: ProviderProfileRepository> {
    pub profiles: P,
}

impl<P: ProviderProfileRepository> ListProviderProfilesUseCase<P> {
    pub async fn execute(
        &self,
        query: ProviderQuery,
        page: PageRequest,
    ) -> Result<Page<ProviderProfile>, MarketplaceError> {
        self.profiles.list(&query, page.clamped()).await
    }
}

pub struct UpdateProviderBioUseCase<P: ProviderProfileRepository> {
    pub profiles: P,
}

impl<P: ProviderProfileRepository> UpdateProviderBioUseCase<P> {
    pub async fn execute(&self, user_id: Uuid, bio: &str) -> Result<(), MarketplaceError> {
        let bio = form::clamp_bio(bio)
            .ok_or_else(|| MarketplaceError::Validation(FieldError::Missing("bio").to_string()))?;
        let profile = self
            .profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or(MarketplaceError::ProviderProfileNotFound)?;
        self.profiles.update_bio(profile.id, &bio).await
    }
}
