use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use commun_domain::catalog;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::form::{self, ServiceFiles};
use crate::domain::repository::{
    BlobStore, CommentRepository, ProviderProfileRepository, ServiceOfferingRepository,
};
use crate::domain::types::{AssetKind, RatingSummary, ServiceOffering, ServiceQuery, UploadedFile};
use crate::error::MarketplaceError;
use crate::usecase::provider::{new_service, upload_service_files};
use crate::usecase::{
    Caller, UploadBatch, authorize_service_change, delete_blobs, require_profile,
};

// ── CreateService ────────────────────────────────────────────────────────────

/// Form fields of a single-service submission, as loosely typed as they
/// arrive.
pub struct CreateServiceInput {
    pub category: Value,
    pub sub_categories: Value,
    pub keywords: Value,
    pub description: Value,
    pub experience: Value,
    pub images: Vec<UploadedFile>,
    pub documents: Vec<UploadedFile>,
}

pub struct CreateServiceUseCase<P, S, B>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    B: BlobStore,
{
    pub profiles: P,
    pub services: S,
    pub blobs: B,
}

impl<P, S, B> CreateServiceUseCase<P, S, B>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    B: BlobStore,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateServiceInput,
    ) -> Result<ServiceOffering, MarketplaceError> {
        let profile = require_profile(&self.profiles, user_id).await?;

        let descriptor = form::RawDescriptor {
            category: input.category,
            sub_categories: input.sub_categories,
            keywords: input.keywords,
            bio: input.description,
            experience: input.experience,
        }
        .validate()
        .map_err(|e| MarketplaceError::Validation(e.to_string()))?;

        if input.images.is_empty() {
            return Err(MarketplaceError::MissingFiles(
                "at least one image is required".to_owned(),
            ));
        }
        form::check_content_types(&input.images, AssetKind::Image)
            .and_then(|()| form::check_content_types(&input.documents, AssetKind::Document))
            .map_err(MarketplaceError::Validation)?;

        let files = ServiceFiles {
            images: input.images,
            documents: input.documents,
        };
        let mut batch = UploadBatch::new(&self.blobs);
        let uploaded = match upload_service_files(&mut batch, &files).await {
            Ok(uploaded) => uploaded,
            Err(err) => {
                batch.discard().await;
                return Err(err);
            }
        };
        let service = new_service(profile.id, descriptor, uploaded);
        if let Err(err) = self.services.create(&service).await {
            batch.discard().await;
            return Err(err);
        }
        tracing::info!(service_id = %service.id, provider_id = %profile.id, "service created");
        Ok(service)
    }
}

// ── ListServices / GetService ────────────────────────────────────────────────

pub struct ListServicesUseCase<S: ServiceOfferingRepository> {
    pub services: S,
}

impl<S: ServiceOfferingRepository> ListServicesUseCase<S> {
    pub async fn execute(
        &self,
        query: ServiceQuery,
        page: PageRequest,
    ) -> Result<Page<ServiceOffering>, MarketplaceError> {
        self.services.list(&query, page.clamped()).await
    }
}

#[derive(Debug)]
pub struct ServiceDetail {
    pub service: ServiceOffering,
    pub rating: RatingSummary,
}

/// Public service view. Counts a click on the service and on its provider.
pub struct GetServiceUseCase<S, P, C>
where
    S: ServiceOfferingRepository,
    P: ProviderProfileRepository,
    C: CommentRepository,
{
    pub services: S,
    pub profiles: P,
    pub comments: C,
}

impl<S, P, C> GetServiceUseCase<S, P, C>
where
    S: ServiceOfferingRepository,
    P: ProviderProfileRepository,
    C: CommentRepository,
{
    pub async fn execute(&self, service_id: Uuid) -> Result<ServiceDetail, MarketplaceError> {
        let mut service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        self.services.record_click(service.id).await?;
        self.profiles.record_click(service.provider_id).await?;
        service.clicks += 1;

        let rating = self.comments.rating_summary(service.id).await?;
        Ok(ServiceDetail { service, rating })
    }
}

// ── UpdateService ────────────────────────────────────────────────────────────

/// Partial update; absent fields keep their current value.
#[derive(Default)]
pub struct UpdateServiceInput {
    pub category: Option<String>,
    pub sub_categories: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub description: Option<String>,
    pub experience: Option<Value>,
}

impl UpdateServiceInput {
    fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.sub_categories.is_none()
            && self.keywords.is_none()
            && self.description.is_none()
            && self.experience.is_none()
    }
}

pub struct UpdateServiceUseCase<P, S>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
{
    pub profiles: P,
    pub services: S,
}

impl<P, S> UpdateServiceUseCase<P, S>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
{
    pub async fn execute(
        &self,
        caller: Caller,
        service_id: Uuid,
        input: UpdateServiceInput,
    ) -> Result<ServiceOffering, MarketplaceError> {
        if input.is_empty() {
            return Err(MarketplaceError::MissingData);
        }
        let mut service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        authorize_service_change(&self.profiles, caller, &service).await?;

        // Changing category without new lists re-checks the old lists
        // against the new entry.
        if let Some(category) = input.category {
            service.category = category.trim().to_owned();
        }
        if let Some(sub_categories) = input.sub_categories {
            service.sub_categories = form::tidy_list(sub_categories);
        }
        if let Some(keywords) = input.keywords {
            service.keywords = form::tidy_list(keywords);
        }
        let entry =
            catalog::validate_selection(&service.category, &service.sub_categories, &service.keywords)?;
        service.category = entry.name.to_owned();

        if let Some(description) = input.description {
            service.description = form::coerce_text(&Value::String(description))
                .ok_or_else(|| MarketplaceError::Validation("description is required".into()))?;
        }
        if let Some(experience) = input.experience {
            let years = form::coerce_experience(&experience)
                .map_err(|e| MarketplaceError::Validation(e.to_string()))?;
            service.experience = i32::try_from(years).unwrap_or(i32::MAX);
        }
        service.updated_at = Utc::now();

        self.services.update(&service).await?;
        Ok(service)
    }
}

// ── DeleteService / DeleteServiceAsset ───────────────────────────────────────

pub struct DeleteServiceUseCase<P, S, B>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    B: BlobStore,
{
    pub profiles: P,
    pub services: S,
    pub blobs: B,
}

impl<P, S, B> DeleteServiceUseCase<P, S, B>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    B: BlobStore,
{
    /// Rows go first; blobs are deleted afterwards, best effort.
    pub async fn execute(&self, caller: Caller, service_id: Uuid) -> Result<(), MarketplaceError> {
        let service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        authorize_service_change(&self.profiles, caller, &service).await?;

        if !self.services.delete(service.id).await? {
            return Err(MarketplaceError::ServiceNotFound);
        }
        delete_blobs(&self.blobs, service.public_ids()).await;
        tracing::info!(service_id = %service.id, "service deleted");
        Ok(())
    }
}

pub struct DeleteServiceAssetUseCase<P, S, B>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    B: BlobStore,
{
    pub profiles: P,
    pub services: S,
    pub blobs: B,
}

impl<P, S, B> DeleteServiceAssetUseCase<P, S, B>
where
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    B: BlobStore,
{
    pub async fn execute(
        &self,
        caller: Caller,
        service_id: Uuid,
        public_id: &str,
    ) -> Result<(), MarketplaceError> {
        let service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        authorize_service_change(&self.profiles, caller, &service).await?;

        let is_image = service.images.iter().any(|a| a.public_id == public_id);
        let is_document = service.documents.iter().any(|a| a.public_id == public_id);
        if !is_image && !is_document {
            return Err(MarketplaceError::AssetNotFound);
        }
        if is_image && service.images.len() == 1 {
            return Err(MarketplaceError::LastImage);
        }

        if !self.services.delete_asset(service.id, public_id).await? {
            return Err(MarketplaceError::AssetNotFound);
        }
        delete_blobs(&self.blobs, [public_id]).await;
        Ok(())
    }
}
