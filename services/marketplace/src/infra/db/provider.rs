use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionError,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use commun_domain::pagination::{Page, PageRequest};
use commun_domain::user::UserRole;
use commun_marketplace_schema::{provider_profiles, service_offerings, users};

use crate::domain::repository::ProviderProfileRepository;
use crate::domain::types::{ProviderProfile, ProviderQuery, ProviderRegistration};
use crate::error::MarketplaceError;

use super::service::insert_service;
use super::{is_unique_violation, lower_contains};

#[derive(Clone)]
pub struct DbProviderProfileRepository {
    pub db: DatabaseConnection,
}

impl ProviderProfileRepository for DbProviderProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>, MarketplaceError> {
        let model = provider_profiles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find provider profile by id")?;
        Ok(model.map(profile_from_model))
    }

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProviderProfile>, MarketplaceError> {
        let model = provider_profiles::Entity::find()
            .filter(provider_profiles::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find provider profile by user id")?;
        Ok(model.map(profile_from_model))
    }

    async fn list(
        &self,
        query: &ProviderQuery,
        page: PageRequest,
    ) -> Result<Page<ProviderProfile>, MarketplaceError> {
        let mut select = provider_profiles::Entity::find();
        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            select = select.filter(lower_contains(provider_profiles::Column::Bio, q));
        }
        if let Some(category) = query.category.as_deref() {
            let provider_ids: Vec<Uuid> = service_offerings::Entity::find()
                .select_only()
                .column(service_offerings::Column::ProviderId)
                .filter(service_offerings::Column::Category.eq(category))
                .distinct()
                .into_tuple()
                .all(&self.db)
                .await
                .context("find providers offering category")?;
            select = select.filter(provider_profiles::Column::Id.is_in(provider_ids));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count provider profiles")?;
        let models = select
            .order_by_desc(provider_profiles::Column::Clicks)
            .order_by_desc(provider_profiles::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list provider profiles")?;
        Ok(Page::new(
            models.into_iter().map(profile_from_model).collect(),
            page,
            total,
        ))
    }

    async fn update_bio(&self, id: Uuid, bio: &str) -> Result<(), MarketplaceError> {
        provider_profiles::ActiveModel {
            id: Set(id),
            bio: Set(bio.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update provider bio")?;
        Ok(())
    }

    async fn record_click(&self, id: Uuid) -> Result<(), MarketplaceError> {
        provider_profiles::Entity::update_many()
            .col_expr(
                provider_profiles::Column::Clicks,
                Expr::col(provider_profiles::Column::Clicks).add(1),
            )
            .filter(provider_profiles::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record provider profile click")?;
        Ok(())
    }

    async fn register(&self, registration: &ProviderRegistration) -> Result<(), MarketplaceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let registration = registration.clone();
                Box::pin(async move { insert_registration(txn, &registration).await })
            })
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(err)) if is_unique_violation(&err) => {
                Err(MarketplaceError::AlreadyProvider)
            }
            Err(err) => Err(anyhow::Error::new(err)
                .context("register provider")
                .into()),
        }
    }
}

async fn insert_registration(
    txn: &DatabaseTransaction,
    registration: &ProviderRegistration,
) -> Result<(), DbErr> {
    let profile = &registration.profile;
    provider_profiles::ActiveModel {
        id: Set(profile.id),
        user_id: Set(profile.user_id),
        bio: Set(profile.bio.clone()),
        experience: Set(profile.experience),
        clicks: Set(profile.clicks),
        created_at: Set(profile.created_at),
        updated_at: Set(profile.updated_at),
    }
    .insert(txn)
    .await?;

    for service in &registration.services {
        insert_service(txn, service).await?;
    }

    // Only customers are promoted; admins keep their role.
    users::Entity::update_many()
        .col_expr(
            users::Column::Role,
            Expr::value(i16::from(UserRole::Provider.as_u8())),
        )
        .col_expr(users::Column::UpdatedAt, Expr::value(profile.created_at))
        .filter(users::Column::Id.eq(profile.user_id))
        .filter(users::Column::Role.eq(i16::from(UserRole::Customer.as_u8())))
        .exec(txn)
        .await?;
    Ok(())
}

fn profile_from_model(model: provider_profiles::Model) -> ProviderProfile {
    ProviderProfile {
        id: model.id,
        user_id: model.user_id,
        bio: model.bio,
        experience: model.experience,
        clicks: model.clicks,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
