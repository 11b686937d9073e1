use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use commun_auth_types::identity::IdentityHeaders;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::types::{CategoryClicks, Overview};
use crate::error::MarketplaceError;
use crate::handlers::service::ServiceResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::admin::{
    GetCategoryClicksUseCase, GetOverviewUseCase, GetTopServicesUseCase, ListUsersUseCase,
};

fn require_admin(identity: &IdentityHeaders) -> Result<(), MarketplaceError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden)
    }
}

// ── GET /admin/overview ──────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub users_by_role: BTreeMap<&'static str, u64>,
    pub providers: u64,
    pub services: u64,
    pub comments: u64,
    pub bookings_by_status: BTreeMap<&'static str, u64>,
}

impl From<Overview> for OverviewResponse {
    fn from(o: Overview) -> Self {
        Self {
            users_by_role: o.users_by_role,
            providers: o.providers,
            services: o.services,
            comments: o.comments,
            bookings_by_status: o.bookings_by_status,
        }
    }
}

pub async fn get_overview(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, MarketplaceError> {
    require_admin(&identity)?;
    let usecase = GetOverviewUseCase {
        analytics: state.analytics_repo(),
    };
    Ok(Json(usecase.execute().await?.into()))
}

// ── GET /admin/top-services ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TopServicesQuery {
    pub limit: Option<u64>,
}

pub async fn get_top_services(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<TopServicesQuery>,
) -> Result<Json<Vec<ServiceResponse>>, MarketplaceError> {
    require_admin(&identity)?;
    let usecase = GetTopServicesUseCase {
        services: state.service_repo(),
    };
    let services = usecase.execute(query.limit).await?;
    Ok(Json(services.into_iter().map(ServiceResponse::from).collect()))
}

// ── GET /admin/category-clicks ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct CategoryClicksResponse {
    pub category: String,
    pub clicks: i64,
    pub services: i64,
}

impl From<CategoryClicks> for CategoryClicksResponse {
    fn from(c: CategoryClicks) -> Self {
        Self {
            category: c.category,
            clicks: c.clicks,
            services: c.services,
        }
    }
}

pub async fn get_category_clicks(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryClicksResponse>>, MarketplaceError> {
    require_admin(&identity)?;
    let usecase = GetCategoryClicksUseCase {
        analytics: state.analytics_repo(),
    };
    let rows = usecase.execute().await?;
    Ok(Json(rows.into_iter().map(CategoryClicksResponse::from).collect()))
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

pub async fn list_users(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<UserResponse>>, MarketplaceError> {
    require_admin(&identity)?;
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(page).await?;
    Ok(Json(users.map(UserResponse::from)))
}
