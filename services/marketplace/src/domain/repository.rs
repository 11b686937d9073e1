#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use commun_domain::booking::BookingStatus;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Booking, BookingSide, CategoryClicks, Comment, Overview, ProviderProfile, ProviderQuery,
    ProviderRegistration, RatingSummary, ServiceOffering, ServiceQuery, StoredAsset,
    UploadedFile, User, UserPatch,
};
use crate::error::MarketplaceError;

/// Repository for marketplace users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError>;
    /// Fails with `UserAlreadyExists` on a duplicate id or email.
    async fn create(&self, user: &User) -> Result<(), MarketplaceError>;
    async fn update_profile(&self, id: Uuid, patch: &UserPatch) -> Result<(), MarketplaceError>;
    /// Store a new profile image and return the one it replaced.
    async fn set_profile_image(
        &self,
        id: Uuid,
        image: &StoredAsset,
    ) -> Result<Option<StoredAsset>, MarketplaceError>;
    async fn list(&self, page: PageRequest) -> Result<Page<User>, MarketplaceError>;
}

/// Repository for provider profiles.
pub trait ProviderProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>, MarketplaceError>;
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProviderProfile>, MarketplaceError>;
    async fn list(
        &self,
        query: &ProviderQuery,
        page: PageRequest,
    ) -> Result<Page<ProviderProfile>, MarketplaceError>;
    async fn update_bio(&self, id: Uuid, bio: &str) -> Result<(), MarketplaceError>;
    async fn record_click(&self, id: Uuid) -> Result<(), MarketplaceError>;

    /// Atomically write the profile, every service with its assets, and
    /// promote the owner to provider. Nothing is written on failure.
    ///
    /// Fails with `AlreadyProvider` when the owner already has a profile.
    async fn register(&self, registration: &ProviderRegistration) -> Result<(), MarketplaceError>;
}

/// Repository for service offerings and their assets.
pub trait ServiceOfferingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOffering>, MarketplaceError>;
    /// Services with the given ids, in the order given. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ServiceOffering>, MarketplaceError>;
    async fn list_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<ServiceOffering>, MarketplaceError>;
    /// Newest first.
    async fn list(
        &self,
        query: &ServiceQuery,
        page: PageRequest,
    ) -> Result<Page<ServiceOffering>, MarketplaceError>;
    /// Most clicked first.
    async fn top_by_clicks(&self, limit: u64) -> Result<Vec<ServiceOffering>, MarketplaceError>;
    /// Insert the service and its assets in one transaction.
    async fn create(&self, service: &ServiceOffering) -> Result<(), MarketplaceError>;
    /// Overwrite the descriptive fields (category through experience).
    async fn update(&self, service: &ServiceOffering) -> Result<(), MarketplaceError>;
    /// Returns `true` if a row was deleted. Assets, comments and wishlist
    /// entries go with it.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
    /// Returns `true` if an asset row was deleted.
    async fn delete_asset(
        &self,
        service_id: Uuid,
        public_id: &str,
    ) -> Result<bool, MarketplaceError>;
    async fn record_click(&self, id: Uuid) -> Result<(), MarketplaceError>;
}

/// Repository for service comments.
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, MarketplaceError>;
    /// Newest first.
    async fn list_by_service(
        &self,
        service_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, MarketplaceError>;
    /// Fails with `CommentAlreadyExists` when the author already commented.
    async fn create(&self, comment: &Comment) -> Result<(), MarketplaceError>;
    async fn set_reply(
        &self,
        id: Uuid,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
    async fn rating_summary(&self, service_id: Uuid) -> Result<RatingSummary, MarketplaceError>;
}

/// Repository for bookings.
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError>;
    async fn create(&self, booking: &Booking) -> Result<(), MarketplaceError>;
    /// `party_id` is a user id for [`BookingSide::Customer`] and a provider
    /// profile id for [`BookingSide::Provider`]. Newest first.
    async fn list(
        &self,
        side: BookingSide,
        party_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Booking>, MarketplaceError>;
    /// Move the booking to `to` only if it is still in `from`.
    /// Returns `false` when the status changed underneath.
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, MarketplaceError>;
}

/// Repository for wishlist entries.
pub trait WishlistRepository: Send + Sync {
    /// Wished service ids, most recently added first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Uuid>, MarketplaceError>;
    /// Adding an existing entry is a no-op.
    async fn add(&self, user_id: Uuid, service_id: Uuid) -> Result<(), MarketplaceError>;
    /// Returns `true` if an entry was removed.
    async fn remove(&self, user_id: Uuid, service_id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Aggregations behind the admin dashboard.
pub trait AnalyticsRepository: Send + Sync {
    async fn overview(&self) -> Result<Overview, MarketplaceError>;
    /// Sum of clicks and number of services per category, most clicked first.
    async fn category_clicks(&self) -> Result<Vec<CategoryClicks>, MarketplaceError>;
}

/// Remote store for uploaded files.
pub trait BlobStore: Send + Sync {
    async fn upload(&self, file: &UploadedFile) -> Result<StoredAsset, MarketplaceError>;
    async fn delete(&self, public_id: &str) -> Result<(), MarketplaceError>;
}
