use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use commun_auth_types::identity::IdentityHeaders;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::types::{ProviderProfile, ProviderQuery};
use crate::error::MarketplaceError;
use crate::handlers::service::ServiceResponse;
use crate::handlers::{Ack, read_multipart};
use crate::state::AppState;
use crate::usecase::provider::{
    GetMyProviderProfileUseCase, GetProviderProfileUseCase, ListProviderProfilesUseCase,
    ProviderDetail, RegisterProviderInput, RegisterProviderUseCase, UpdateProviderBioUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: String,
    pub experience: i32,
    pub clicks: i64,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProviderProfile> for ProviderProfileResponse {
    fn from(p: ProviderProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            bio: p.bio,
            experience: p.experience,
            clicks: p.clicks,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetailResponse {
    #[serde(flatten)]
    pub profile: ProviderProfileResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub service_offerings: Vec<ServiceResponse>,
}

impl From<ProviderDetail> for ProviderDetailResponse {
    fn from(d: ProviderDetail) -> Self {
        Self {
            profile: d.profile.into(),
            display_name: d.display_name,
            service_offerings: d.services.into_iter().map(ServiceResponse::from).collect(),
        }
    }
}

// ── POST /provider-profile/become-provider-multi ─────────────────────────────

#[derive(Serialize)]
pub struct RegisterProviderResponse {
    pub success: bool,
    pub message: &'static str,
    pub profile: ProviderProfileResponse,
    pub services: Vec<ServiceResponse>,
}

pub async fn become_provider_multi(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RegisterProviderResponse>), MarketplaceError> {
    let mut fields = read_multipart(multipart).await?;
    let input = RegisterProviderInput {
        user_id: identity.user_id,
        provider_bio: fields.text("providerBio").unwrap_or_default().to_owned(),
        services: fields.text("services").unwrap_or_default().to_owned(),
        files: std::mem::take(&mut fields.files),
    };
    let usecase = RegisterProviderUseCase {
        users: state.user_repo(),
        profiles: state.provider_repo(),
        blobs: state.blob_store(),
    };
    let output = usecase.execute(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterProviderResponse {
            success: true,
            message: "provider profile created",
            profile: output.profile.into(),
            services: output.services.into_iter().map(ServiceResponse::from).collect(),
        }),
    ))
}

// ── GET /provider-profile/me ─────────────────────────────────────────────────

pub async fn get_my_profile(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ProviderDetailResponse>, MarketplaceError> {
    let usecase = GetMyProviderProfileUseCase {
        profiles: state.provider_repo(),
        services: state.service_repo(),
    };
    let detail = usecase.execute(identity.user_id).await?;
    Ok(Json(detail.into()))
}

// ── PATCH /provider-profile/me ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateBioRequest {
    #[serde(default)]
    pub bio: String,
}

pub async fn update_my_profile(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateBioRequest>,
) -> Result<Json<Ack>, MarketplaceError> {
    let usecase = UpdateProviderBioUseCase {
        profiles: state.provider_repo(),
    };
    usecase.execute(identity.user_id, &body.bio).await?;
    Ok(Json(Ack::new("provider profile updated")))
}

// ── GET /provider-profiles ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProviderListQuery>,
) -> Result<Json<Page<ProviderProfileResponse>>, MarketplaceError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };
    let usecase = ListProviderProfilesUseCase {
        profiles: state.provider_repo(),
    };
    let profiles = usecase
        .execute(
            ProviderQuery {
                q: query.q,
                category: query.category,
            },
            page,
        )
        .await?;
    Ok(Json(profiles.map(ProviderProfileResponse::from)))
}

// ── GET /provider-profiles/{id} ──────────────────────────────────────────────

pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProviderDetailResponse>, MarketplaceError> {
    let usecase = GetProviderProfileUseCase {
        profiles: state.provider_repo(),
        services: state.service_repo(),
        users: state.user_repo(),
    };
    let detail = usecase.execute(profile_id).await?;
    Ok(Json(detail.into()))
}
