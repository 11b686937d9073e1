use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};
use uuid::Uuid;

use commun_marketplace_schema::wishlist_items;

use crate::domain::repository::WishlistRepository;
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct DbWishlistRepository {
    pub db: DatabaseConnection,
}

impl WishlistRepository for DbWishlistRepository {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Uuid>, MarketplaceError> {
        let ids = wishlist_items::Entity::find()
            .select_only()
            .column(wishlist_items::Column::ServiceId)
            .filter(wishlist_items::Column::UserId.eq(user_id))
            .order_by_desc(wishlist_items::Column::CreatedAt)
            .into_tuple()
            .all(&self.db)
            .await
            .context("list wishlist")?;
        Ok(ids)
    }

    async fn add(&self, user_id: Uuid, service_id: Uuid) -> Result<(), MarketplaceError> {
        let item = wishlist_items::ActiveModel {
            user_id: Set(user_id),
            service_id: Set(service_id),
            created_at: Set(Utc::now()),
        };
        wishlist_items::Entity::insert(item)
            .on_conflict(
                OnConflict::columns([
                    wishlist_items::Column::UserId,
                    wishlist_items::Column::ServiceId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("add wishlist item")?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, service_id: Uuid) -> Result<bool, MarketplaceError> {
        let result = wishlist_items::Entity::delete_many()
            .filter(wishlist_items::Column::UserId.eq(user_id))
            .filter(wishlist_items::Column::ServiceId.eq(service_id))
            .exec(&self.db)
            .await
            .context("remove wishlist item")?;
        Ok(result.rows_affected > 0)
    }
}
