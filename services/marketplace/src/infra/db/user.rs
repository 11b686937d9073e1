use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use commun_domain::pagination::{Page, PageRequest};
use commun_domain::user::UserRole;
use commun_marketplace_schema::users;

use crate::domain::repository::UserRepository;
use crate::domain::types::{StoredAsset, User, UserPatch};
use crate::error::MarketplaceError;

use super::is_unique_violation;

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            email: Set(user.email.clone()),
            phone: Set(user.phone.clone()),
            role: Set(i16::from(user.role.as_u8())),
            profile_image_url: Set(user.profile_image.as_ref().map(|i| i.url.clone())),
            profile_image_public_id: Set(user.profile_image.as_ref().map(|i| i.public_id.clone())),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(MarketplaceError::UserAlreadyExists),
            Err(err) => Err(anyhow::Error::new(err).context("create user").into()),
        }
    }

    async fn update_profile(&self, id: Uuid, patch: &UserPatch) -> Result<(), MarketplaceError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = &patch.name {
            am.name = Set(Some(name.clone()));
        }
        if let Some(first_name) = &patch.first_name {
            am.first_name = Set(Some(first_name.clone()));
        }
        if let Some(last_name) = &patch.last_name {
            am.last_name = Set(Some(last_name.clone()));
        }
        if let Some(phone) = &patch.phone {
            am.phone = Set(Some(phone.clone()));
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update user profile")?;
        Ok(())
    }

    async fn set_profile_image(
        &self,
        id: Uuid,
        image: &StoredAsset,
    ) -> Result<Option<StoredAsset>, MarketplaceError> {
        let current = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for profile image")?
            .ok_or(MarketplaceError::UserNotFound)?;
        let previous = stored_asset(
            current.profile_image_url.clone(),
            current.profile_image_public_id.clone(),
        );

        users::ActiveModel {
            id: Set(id),
            profile_image_url: Set(Some(image.url.clone())),
            profile_image_public_id: Set(Some(image.public_id.clone())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set profile image")?;
        Ok(previous)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, MarketplaceError> {
        let query = users::Entity::find();
        let total = query.clone().count(&self.db).await.context("count users")?;
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(Page::new(
            models.into_iter().map(user_from_model).collect(),
            page,
            total,
        ))
    }
}

fn stored_asset(url: Option<String>, public_id: Option<String>) -> Option<StoredAsset> {
    Some(StoredAsset {
        url: url?,
        public_id: public_id?,
    })
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or_default(),
        profile_image: stored_asset(model.profile_image_url, model.profile_image_public_id),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
