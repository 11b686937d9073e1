use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use commun_domain::booking::BookingStatus;
use commun_domain::pagination::{Page, PageRequest};
use commun_domain::user::UserRole;
use commun_marketplace::domain::repository::{
    BlobStore, BookingRepository, CommentRepository, ProviderProfileRepository,
    ServiceOfferingRepository, UserRepository, WishlistRepository,
};
use commun_marketplace::domain::types::{
    Booking, BookingSide, Comment, ProviderProfile, ProviderQuery, ProviderRegistration,
    RatingSummary, ServiceOffering, ServiceQuery, StoredAsset, UploadedFile, User, UserPatch,
};
use commun_marketplace::error::MarketplaceError;

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let slice = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(slice, page, total)
}

// ── MemoryStore ──────────────────────────────────────────────────────────────

/// In-memory stand-in for every repository. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub users: Arc<Mutex<Vec<User>>>,
    pub profiles: Arc<Mutex<Vec<ProviderProfile>>>,
    pub services: Arc<Mutex<Vec<ServiceOffering>>>,
    pub comments: Arc<Mutex<Vec<Comment>>>,
    pub bookings: Arc<Mutex<Vec<Booking>>>,
    pub wishlist: Arc<Mutex<Vec<(Uuid, Uuid)>>>,
    /// Make `register` fail as a rolled-back transaction would.
    pub fail_register: bool,
}

impl MemoryStore {
    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::default();
        *store.users.lock().unwrap() = users;
        store
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn service_count(&self) -> usize {
        self.services.lock().unwrap().len()
    }

    pub fn booking(&self, id: Uuid) -> Booking {
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .unwrap()
    }
}

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        Ok(self.user(id))
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id == user.id || u.email == user.email) {
            return Err(MarketplaceError::UserAlreadyExists);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, patch: &UserPatch) -> Result<(), MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(MarketplaceError::UserNotFound)?;
        if let Some(name) = &patch.name {
            user.name = Some(name.clone());
        }
        if let Some(phone) = &patch.phone {
            user.phone = Some(phone.clone());
        }
        Ok(())
    }

    async fn set_profile_image(
        &self,
        id: Uuid,
        image: &StoredAsset,
    ) -> Result<Option<StoredAsset>, MarketplaceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(MarketplaceError::UserNotFound)?;
        Ok(user.profile_image.replace(image.clone()))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, MarketplaceError> {
        Ok(page_of(&self.users.lock().unwrap(), page))
    }
}

impl ProviderProfileRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>, MarketplaceError> {
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProviderProfile>, MarketplaceError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list(
        &self,
        _query: &ProviderQuery,
        page: PageRequest,
    ) -> Result<Page<ProviderProfile>, MarketplaceError> {
        Ok(page_of(&self.profiles.lock().unwrap(), page))
    }

    async fn update_bio(&self, id: Uuid, bio: &str) -> Result<(), MarketplaceError> {
        if let Some(p) = self.profiles.lock().unwrap().iter_mut().find(|p| p.id == id) {
            p.bio = bio.to_owned();
        }
        Ok(())
    }

    async fn record_click(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if let Some(p) = self.profiles.lock().unwrap().iter_mut().find(|p| p.id == id) {
            p.clicks += 1;
        }
        Ok(())
    }

    async fn register(&self, registration: &ProviderRegistration) -> Result<(), MarketplaceError> {
        if self.fail_register {
            return Err(MarketplaceError::Internal(anyhow::anyhow!("transaction aborted")));
        }
        let mut profiles = self.profiles.lock().unwrap();
        if profiles
            .iter()
            .any(|p| p.user_id == registration.profile.user_id)
        {
            return Err(MarketplaceError::AlreadyProvider);
        }
        profiles.push(registration.profile.clone());
        self.services
            .lock()
            .unwrap()
            .extend(registration.services.iter().cloned());
        if let Some(u) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == registration.profile.user_id && u.role == UserRole::Customer)
        {
            u.role = UserRole::Provider;
        }
        Ok(())
    }
}

impl ServiceOfferingRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOffering>, MarketplaceError> {
        Ok(self.services.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        let services = self.services.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| services.iter().find(|s| s.id == *id).cloned())
            .collect())
    }

    async fn list_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        query: &ServiceQuery,
        page: PageRequest,
    ) -> Result<Page<ServiceOffering>, MarketplaceError> {
        let matching: Vec<_> = self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| query.category.as_ref().is_none_or(|c| &s.category == c))
            .cloned()
            .collect();
        Ok(page_of(&matching, page))
    }

    async fn top_by_clicks(&self, limit: u64) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        let mut services = self.services.lock().unwrap().clone();
        services.sort_by(|a, b| b.clicks.cmp(&a.clicks));
        services.truncate(limit as usize);
        Ok(services)
    }

    async fn create(&self, service: &ServiceOffering) -> Result<(), MarketplaceError> {
        self.services.lock().unwrap().push(service.clone());
        Ok(())
    }

    async fn update(&self, service: &ServiceOffering) -> Result<(), MarketplaceError> {
        let mut services = self.services.lock().unwrap();
        let slot = services
            .iter_mut()
            .find(|s| s.id == service.id)
            .ok_or(MarketplaceError::ServiceNotFound)?;
        *slot = service.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut services = self.services.lock().unwrap();
        let before = services.len();
        services.retain(|s| s.id != id);
        self.comments.lock().unwrap().retain(|c| c.service_id != id);
        self.wishlist.lock().unwrap().retain(|(_, s)| *s != id);
        Ok(services.len() < before)
    }

    async fn delete_asset(
        &self,
        service_id: Uuid,
        public_id: &str,
    ) -> Result<bool, MarketplaceError> {
        let mut services = self.services.lock().unwrap();
        let Some(service) = services.iter_mut().find(|s| s.id == service_id) else {
            return Ok(false);
        };
        let before = service.images.len() + service.documents.len();
        service.images.retain(|a| a.public_id != public_id);
        service.documents.retain(|a| a.public_id != public_id);
        Ok(service.images.len() + service.documents.len() < before)
    }

    async fn record_click(&self, id: Uuid) -> Result<(), MarketplaceError> {
        if let Some(s) = self.services.lock().unwrap().iter_mut().find(|s| s.id == id) {
            s.clicks += 1;
        }
        Ok(())
    }
}

impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, MarketplaceError> {
        Ok(self.comments.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_service(
        &self,
        service_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, MarketplaceError> {
        let matching: Vec<_> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|c| c.service_id == service_id)
            .cloned()
            .collect();
        Ok(page_of(&matching, page))
    }

    async fn create(&self, comment: &Comment) -> Result<(), MarketplaceError> {
        let mut comments = self.comments.lock().unwrap();
        if comments
            .iter()
            .any(|c| c.user_id == comment.user_id && c.service_id == comment.service_id)
        {
            return Err(MarketplaceError::CommentAlreadyExists);
        }
        comments.push(comment.clone());
        Ok(())
    }

    async fn set_reply(
        &self,
        id: Uuid,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        if let Some(c) = self.comments.lock().unwrap().iter_mut().find(|c| c.id == id) {
            c.reply = Some(reply.to_owned());
            c.replied_at = Some(replied_at);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() < before)
    }

    async fn rating_summary(&self, service_id: Uuid) -> Result<RatingSummary, MarketplaceError> {
        let ratings: Vec<u8> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.service_id == service_id)
            .map(|c| c.rating)
            .collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }
}

impl BookingRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError> {
        Ok(self.bookings.lock().unwrap().iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, booking: &Booking) -> Result<(), MarketplaceError> {
        self.bookings.lock().unwrap().push(booking.clone());
        Ok(())
    }

    async fn list(
        &self,
        side: BookingSide,
        party_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Booking>, MarketplaceError> {
        let matching: Vec<_> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| match side {
                BookingSide::Customer => b.customer_id == party_id,
                BookingSide::Provider => b.provider_id == party_id,
            })
            .cloned()
            .collect();
        Ok(page_of(&matching, page))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, MarketplaceError> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.iter_mut().find(|b| b.id == id && b.status == from) {
            Some(b) => {
                b.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl WishlistRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Uuid>, MarketplaceError> {
        Ok(self
            .wishlist
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, s)| *s)
            .collect())
    }

    async fn add(&self, user_id: Uuid, service_id: Uuid) -> Result<(), MarketplaceError> {
        let mut wishlist = self.wishlist.lock().unwrap();
        if !wishlist.contains(&(user_id, service_id)) {
            wishlist.push((user_id, service_id));
        }
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, service_id: Uuid) -> Result<bool, MarketplaceError> {
        let mut wishlist = self.wishlist.lock().unwrap();
        let before = wishlist.len();
        wishlist.retain(|entry| *entry != (user_id, service_id));
        Ok(wishlist.len() < before)
    }
}

// ── MemoryBlobs ──────────────────────────────────────────────────────────────

/// Blob store that tracks which handles are live.
#[derive(Clone, Default)]
pub struct MemoryBlobs {
    pub live: Arc<Mutex<Vec<String>>>,
    pub uploads: Arc<Mutex<usize>>,
    /// Fail the n-th upload (1-based).
    pub fail_on_upload: Option<usize>,
}

impl MemoryBlobs {
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_upload: Some(n),
            ..Self::default()
        }
    }

    pub fn live(&self) -> Vec<String> {
        self.live.lock().unwrap().clone()
    }
}

impl BlobStore for MemoryBlobs {
    async fn upload(&self, file: &UploadedFile) -> Result<StoredAsset, MarketplaceError> {
        let n = {
            let mut uploads = self.uploads.lock().unwrap();
            *uploads += 1;
            *uploads
        };
        if self.fail_on_upload == Some(n) {
            return Err(MarketplaceError::BlobStore(anyhow::anyhow!("connection reset")));
        }
        let public_id = format!("{}.{}", Uuid::now_v7(), file.extension());
        self.live.lock().unwrap().push(public_id.clone());
        Ok(StoredAsset {
            url: format!("https://cdn.test/{public_id}"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MarketplaceError> {
        self.live.lock().unwrap().retain(|id| id != public_id);
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        name: None,
        first_name: Some("Asha".into()),
        last_name: Some("Kumar".into()),
        email: email.into(),
        phone: None,
        role: UserRole::Customer,
        profile_image: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn file(field: &str, name: &str, content_type: &str) -> UploadedFile {
    UploadedFile {
        field_name: field.into(),
        file_name: Some(name.into()),
        content_type: content_type.into(),
        bytes: Bytes::from_static(b"fake file body"),
    }
}

pub fn image(field: &str) -> UploadedFile {
    file(field, "portfolio.jpg", "image/jpeg")
}

pub fn asset(public_id: &str) -> StoredAsset {
    StoredAsset {
        url: format!("https://cdn.test/{public_id}"),
        public_id: public_id.into(),
    }
}

pub fn test_profile(user_id: Uuid) -> ProviderProfile {
    let now = Utc::now();
    ProviderProfile {
        id: Uuid::now_v7(),
        user_id,
        bio: "Tutor".into(),
        experience: 3,
        clicks: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_service(provider_id: Uuid, category: &str) -> ServiceOffering {
    let now = Utc::now();
    ServiceOffering {
        id: Uuid::now_v7(),
        provider_id,
        category: category.into(),
        sub_categories: vec!["Home Tuitions".into()],
        keywords: vec!["Maths".into()],
        description: "Algebra and geometry".into(),
        experience: 3,
        clicks: 0,
        images: vec![asset("img-1.jpg"), asset("img-2.jpg")],
        documents: vec![asset("cv.pdf")],
        created_at: now,
        updated_at: now,
    }
}

/// A store holding one customer and one provider with an Academics service.
pub struct Marketplace {
    pub store: MemoryStore,
    pub customer: User,
    pub provider_user: User,
    pub profile: ProviderProfile,
    pub service: ServiceOffering,
}

pub fn seeded_marketplace() -> Marketplace {
    let customer = test_user("ravi@example.com");
    let mut provider_user = test_user("asha@example.com");
    provider_user.role = UserRole::Provider;
    let profile = test_profile(provider_user.id);
    let service = test_service(profile.id, "Academics");

    let store = MemoryStore::with_users(vec![customer.clone(), provider_user.clone()]);
    store.profiles.lock().unwrap().push(profile.clone());
    store.services.lock().unwrap().push(service.clone());
    Marketplace {
        store,
        customer,
        provider_user,
        profile,
        service,
    }
}
