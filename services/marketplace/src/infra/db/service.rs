use std::collections::HashMap;

use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use commun_domain::pagination::{Page, PageRequest};
use commun_marketplace_schema::{service_assets, service_offerings};

use crate::domain::repository::ServiceOfferingRepository;
use crate::domain::types::{AssetKind, ServiceOffering, ServiceQuery, StoredAsset};
use crate::error::MarketplaceError;

use super::{from_json_list, lower_contains, to_json_list};

#[derive(Clone)]
pub struct DbServiceOfferingRepository {
    pub db: DatabaseConnection,
}

impl DbServiceOfferingRepository {
    /// Load assets for the given rows and assemble domain services.
    async fn with_assets(
        &self,
        models: Vec<service_offerings::Model>,
    ) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let assets = service_assets::Entity::find()
            .filter(service_assets::Column::ServiceId.is_in(ids))
            .order_by_asc(service_assets::Column::Position)
            .all(&self.db)
            .await
            .context("load service assets")?;

        let mut by_service: HashMap<Uuid, Vec<service_assets::Model>> = HashMap::new();
        for asset in assets {
            by_service.entry(asset.service_id).or_default().push(asset);
        }
        Ok(models
            .into_iter()
            .map(|model| {
                let assets = by_service.remove(&model.id).unwrap_or_default();
                service_from_model(model, assets)
            })
            .collect())
    }
}

impl ServiceOfferingRepository for DbServiceOfferingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOffering>, MarketplaceError> {
        let Some(model) = service_offerings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find service by id")?
        else {
            return Ok(None);
        };
        Ok(self.with_assets(vec![model]).await?.pop())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = service_offerings::Entity::find()
            .filter(service_offerings::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find services by ids")?;
        let mut by_id: HashMap<Uuid, ServiceOffering> = self
            .with_assets(models)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn list_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        let models = service_offerings::Entity::find()
            .filter(service_offerings::Column::ProviderId.eq(provider_id))
            .order_by_asc(service_offerings::Column::CreatedAt)
            .order_by_asc(service_offerings::Column::Id)
            .all(&self.db)
            .await
            .context("list services by provider")?;
        self.with_assets(models).await
    }

    async fn list(
        &self,
        query: &ServiceQuery,
        page: PageRequest,
    ) -> Result<Page<ServiceOffering>, MarketplaceError> {
        let mut select = service_offerings::Entity::find();
        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            select = select.filter(lower_contains(service_offerings::Column::Description, q));
        }
        if let Some(category) = query.category.as_deref() {
            select = select.filter(service_offerings::Column::Category.eq(category));
        }
        if let Some(provider_id) = query.provider_id {
            select = select.filter(service_offerings::Column::ProviderId.eq(provider_id));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count services")?;
        let models = select
            .order_by_desc(service_offerings::Column::CreatedAt)
            .order_by_desc(service_offerings::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list services")?;
        Ok(Page::new(self.with_assets(models).await?, page, total))
    }

    async fn top_by_clicks(&self, limit: u64) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        let models = service_offerings::Entity::find()
            .order_by_desc(service_offerings::Column::Clicks)
            .order_by_desc(service_offerings::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list top services")?;
        self.with_assets(models).await
    }

    async fn create(&self, service: &ServiceOffering) -> Result<(), MarketplaceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let service = service.clone();
                Box::pin(async move { insert_service(txn, &service).await })
            })
            .await
            .context("create service")?;
        Ok(())
    }

    async fn update(&self, service: &ServiceOffering) -> Result<(), MarketplaceError> {
        service_offerings::ActiveModel {
            id: Set(service.id),
            category: Set(service.category.clone()),
            sub_categories: Set(to_json_list(&service.sub_categories)),
            keywords: Set(to_json_list(&service.keywords)),
            description: Set(service.description.clone()),
            experience: Set(service.experience),
            updated_at: Set(service.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update service")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = service_offerings::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete service")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_asset(
        &self,
        service_id: Uuid,
        public_id: &str,
    ) -> Result<bool, MarketplaceError> {
        let result = service_assets::Entity::delete_many()
            .filter(service_assets::Column::ServiceId.eq(service_id))
            .filter(service_assets::Column::PublicId.eq(public_id))
            .exec(&self.db)
            .await
            .context("delete service asset")?;
        Ok(result.rows_affected > 0)
    }

    async fn record_click(&self, id: Uuid) -> Result<(), MarketplaceError> {
        service_offerings::Entity::update_many()
            .col_expr(
                service_offerings::Column::Clicks,
                Expr::col(service_offerings::Column::Clicks).add(1),
            )
            .filter(service_offerings::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record service click")?;
        Ok(())
    }
}

/// Insert one service row followed by its images and documents.
pub(super) async fn insert_service<C: ConnectionTrait>(
    conn: &C,
    service: &ServiceOffering,
) -> Result<(), DbErr> {
    service_offerings::ActiveModel {
        id: Set(service.id),
        provider_id: Set(service.provider_id),
        category: Set(service.category.clone()),
        sub_categories: Set(to_json_list(&service.sub_categories)),
        keywords: Set(to_json_list(&service.keywords)),
        description: Set(service.description.clone()),
        experience: Set(service.experience),
        clicks: Set(service.clicks),
        created_at: Set(service.created_at),
        updated_at: Set(service.updated_at),
    }
    .insert(conn)
    .await?;

    let assets = service
        .images
        .iter()
        .map(|a| (AssetKind::Image, a))
        .chain(service.documents.iter().map(|a| (AssetKind::Document, a)));
    for (position, (kind, asset)) in assets.enumerate() {
        service_assets::ActiveModel {
            id: Set(Uuid::now_v7()),
            service_id: Set(service.id),
            kind: Set(kind.as_str().to_owned()),
            url: Set(asset.url.clone()),
            public_id: Set(asset.public_id.clone()),
            position: Set(position as i32),
            created_at: Set(service.created_at),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

fn service_from_model(
    model: service_offerings::Model,
    assets: Vec<service_assets::Model>,
) -> ServiceOffering {
    let mut images = Vec::new();
    let mut documents = Vec::new();
    for asset in assets {
        let stored = StoredAsset {
            url: asset.url,
            public_id: asset.public_id,
        };
        match AssetKind::parse(&asset.kind) {
            Some(AssetKind::Document) => documents.push(stored),
            _ => images.push(stored),
        }
    }
    ServiceOffering {
        id: model.id,
        provider_id: model.provider_id,
        category: model.category,
        sub_categories: from_json_list(model.sub_categories),
        keywords: from_json_list(model.keywords),
        description: model.description,
        experience: model.experience,
        clicks: model.clicks,
        images,
        documents,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
