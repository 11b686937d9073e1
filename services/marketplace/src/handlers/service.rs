use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use commun_auth_types::identity::IdentityHeaders;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::types::{RatingSummary, ServiceOffering, ServiceQuery};
use crate::error::MarketplaceError;
use crate::handlers::{Ack, AssetResponse, read_multipart};
use crate::state::AppState;
use crate::usecase::Caller;
use crate::usecase::service::{
    CreateServiceInput, CreateServiceUseCase, DeleteServiceAssetUseCase, DeleteServiceUseCase,
    GetServiceUseCase, ListServicesUseCase, UpdateServiceInput, UpdateServiceUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category: String,
    pub sub_categories: Vec<String>,
    pub keywords: Vec<String>,
    pub description: String,
    pub experience: i32,
    pub clicks: i64,
    pub images: Vec<AssetResponse>,
    pub documents: Vec<AssetResponse>,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ServiceOffering> for ServiceResponse {
    fn from(s: ServiceOffering) -> Self {
        Self {
            id: s.id,
            provider_id: s.provider_id,
            category: s.category,
            sub_categories: s.sub_categories,
            keywords: s.keywords,
            description: s.description,
            experience: s.experience,
            clicks: s.clicks,
            images: s.images.into_iter().map(AssetResponse::from).collect(),
            documents: s.documents.into_iter().map(AssetResponse::from).collect(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub average: Option<f64>,
    pub count: u64,
}

impl From<RatingSummary> for RatingResponse {
    fn from(r: RatingSummary) -> Self {
        Self {
            average: r.average,
            count: r.count,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetailResponse {
    #[serde(flatten)]
    pub service: ServiceResponse,
    pub rating: RatingResponse,
}

// ── POST /services ───────────────────────────────────────────────────────────

pub async fn create_service(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ServiceResponse>), MarketplaceError> {
    let mut fields = read_multipart(multipart).await?;
    let images = fields.take_files("images");
    let documents = fields.take_files("documents");
    let usecase = CreateServiceUseCase {
        profiles: state.provider_repo(),
        services: state.service_repo(),
        blobs: state.blob_store(),
    };
    let service = usecase
        .execute(
            identity.user_id,
            CreateServiceInput {
                category: fields.value("category"),
                sub_categories: fields.value("subCategories"),
                keywords: fields.value("keywords"),
                description: fields.value("description"),
                experience: fields.value("experience"),
                images,
                documents,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

// ── GET /services ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub provider_id: Option<Uuid>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<Page<ServiceResponse>>, MarketplaceError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };
    let usecase = ListServicesUseCase {
        services: state.service_repo(),
    };
    let services = usecase
        .execute(
            ServiceQuery {
                q: query.q,
                category: query.category,
                provider_id: query.provider_id,
            },
            page,
        )
        .await?;
    Ok(Json(services.map(ServiceResponse::from)))
}

// ── GET /services/{id} ───────────────────────────────────────────────────────

pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<ServiceDetailResponse>, MarketplaceError> {
    let usecase = GetServiceUseCase {
        services: state.service_repo(),
        profiles: state.provider_repo(),
        comments: state.comment_repo(),
    };
    let detail = usecase.execute(service_id).await?;
    Ok(Json(ServiceDetailResponse {
        service: detail.service.into(),
        rating: detail.rating.into(),
    }))
}

// ── PATCH /services/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub category: Option<String>,
    pub sub_categories: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub description: Option<String>,
    pub experience: Option<serde_json::Value>,
}

pub async fn update_service(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceResponse>, MarketplaceError> {
    let usecase = UpdateServiceUseCase {
        profiles: state.provider_repo(),
        services: state.service_repo(),
    };
    let service = usecase
        .execute(
            Caller::from(&identity),
            service_id,
            UpdateServiceInput {
                category: body.category,
                sub_categories: body.sub_categories,
                keywords: body.keywords,
                description: body.description,
                experience: body.experience,
            },
        )
        .await?;
    Ok(Json(service.into()))
}

// ── DELETE /services/{id} ────────────────────────────────────────────────────

pub async fn delete_service(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Ack>, MarketplaceError> {
    let usecase = DeleteServiceUseCase {
        profiles: state.provider_repo(),
        services: state.service_repo(),
        blobs: state.blob_store(),
    };
    usecase.execute(Caller::from(&identity), service_id).await?;
    Ok(Json(Ack::new("service deleted")))
}

// ── DELETE /services/{id}/assets/{public_id} ─────────────────────────────────

pub async fn delete_service_asset(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((service_id, public_id)): Path<(Uuid, String)>,
) -> Result<Json<Ack>, MarketplaceError> {
    let usecase = DeleteServiceAssetUseCase {
        profiles: state.provider_repo(),
        services: state.service_repo(),
        blobs: state.blob_store(),
    };
    usecase
        .execute(Caller::from(&identity), service_id, &public_id)
        .await?;
    Ok(Json(Ack::new("asset deleted")))
}
