use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use commun_auth_types::identity::IdentityHeaders;

use crate::error::MarketplaceError;
use crate::handlers::Ack;
use crate::handlers::service::ServiceResponse;
use crate::state::AppState;
use crate::usecase::wishlist::{
    AddWishlistItemUseCase, GetWishlistUseCase, RemoveWishlistItemUseCase,
};

// ── GET /users/@me/wishlist ──────────────────────────────────────────────────

pub async fn get_wishlist(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceResponse>>, MarketplaceError> {
    let usecase = GetWishlistUseCase {
        wishlist: state.wishlist_repo(),
        services: state.service_repo(),
    };
    let services = usecase.execute(identity.user_id).await?;
    Ok(Json(services.into_iter().map(ServiceResponse::from).collect()))
}

// ── PUT /users/@me/wishlist/{service_id} ─────────────────────────────────────

pub async fn add_wishlist_item(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Ack>, MarketplaceError> {
    let usecase = AddWishlistItemUseCase {
        wishlist: state.wishlist_repo(),
        services: state.service_repo(),
        users: state.user_repo(),
    };
    usecase.execute(identity.user_id, service_id).await?;
    Ok(Json(Ack::new("added to wishlist")))
}

// ── DELETE /users/@me/wishlist/{service_id} ──────────────────────────────────

pub async fn remove_wishlist_item(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Ack>, MarketplaceError> {
    let usecase = RemoveWishlistItemUseCase {
        wishlist: state.wishlist_repo(),
    };
    usecase.execute(identity.user_id, service_id).await?;
    Ok(Json(Ack::new("removed from wishlist")))
}
