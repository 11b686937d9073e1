use uuid::Uuid;

use crate::domain::repository::{ServiceOfferingRepository, UserRepository, WishlistRepository};
use crate::domain::types::ServiceOffering;
use crate::error::MarketplaceError;
use crate::usecase::require_user;

pub struct GetWishlistUseCase<W, S>
where
    W: WishlistRepository,
    S: ServiceOfferingRepository,
{
    pub wishlist: W,
    pub services: S,
}

impl<W, S> GetWishlistUseCase<W, S>
where
    W: WishlistRepository,
    S: ServiceOfferingRepository,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        let ids = self.wishlist.list(user_id).await?;
        self.services.find_by_ids(&ids).await
    }
}

pub struct AddWishlistItemUseCase<W, S, U>
where
    W: WishlistRepository,
    S: ServiceOfferingRepository,
    U: UserRepository,
{
    pub wishlist: W,
    pub services: S,
    pub users: U,
}

impl<W, S, U> AddWishlistItemUseCase<W, S, U>
where
    W: WishlistRepository,
    S: ServiceOfferingRepository,
    U: UserRepository,
{
    pub async fn execute(&self, user_id: Uuid, service_id: Uuid) -> Result<(), MarketplaceError> {
        require_user(&self.users, user_id).await?;
        self.services
            .find_by_id(service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        self.wishlist.add(user_id, service_id).await
    }
}

pub struct RemoveWishlistItemUseCase<W: WishlistRepository> {
    pub wishlist: W,
}

impl<W: WishlistRepository> RemoveWishlistItemUseCase<W> {
    pub async fn execute(&self, user_id: Uuid, service_id: Uuid) -> Result<(), MarketplaceError> {
        if self.wishlist.remove(user_id, service_id).await? {
            Ok(())
        } else {
            Err(MarketplaceError::WishlistItemNotFound)
        }
    }
}
