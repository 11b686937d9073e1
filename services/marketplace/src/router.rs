use axum::{
    Router,
    extract::{DefaultBodyLimit, MatchedPath, Request},
    routing::{delete, get, patch, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use commun_core::error::route_not_found;
use commun_core::middleware::{X_REQUEST_ID, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{get_category_clicks, get_overview, get_top_services, list_users},
    booking::{create_booking, list_bookings, update_booking_status},
    catalog::get_catalog,
    comment::{create_comment, delete_comment, list_comments, reply_to_comment},
    health::{healthz, readyz},
    provider::{
        become_provider_multi, get_my_profile, get_profile, list_profiles, update_my_profile,
    },
    service::{
        create_service, delete_service, delete_service_asset, get_service, list_services,
        update_service,
    },
    user::{create_user, get_me, update_me, update_profile_image},
    wishlist::{add_wishlist_item, get_wishlist, remove_wishlist_item},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Catalog
        .route("/catalog", get(get_catalog))
        // Users
        .route("/users", post(create_user))
        .route("/users/@me", get(get_me).patch(update_me))
        .route("/users/@me/profile-image", put(update_profile_image))
        // Wishlist
        .route("/users/@me/wishlist", get(get_wishlist))
        .route(
            "/users/@me/wishlist/{service_id}",
            put(add_wishlist_item).delete(remove_wishlist_item),
        )
        // Provider profiles
        .route(
            "/provider-profile/become-provider-multi",
            post(become_provider_multi),
        )
        .route(
            "/provider-profile/me",
            get(get_my_profile).patch(update_my_profile),
        )
        .route("/provider-profiles", get(list_profiles))
        .route("/provider-profiles/{id}", get(get_profile))
        // Services
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            get(get_service).patch(update_service).delete(delete_service),
        )
        .route(
            "/services/{id}/assets/{public_id}",
            delete(delete_service_asset),
        )
        // Comments
        .route(
            "/services/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/comments/{id}/reply", put(reply_to_comment))
        .route("/comments/{id}", delete(delete_comment))
        // Bookings
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        // Admin
        .route("/admin/overview", get(get_overview))
        .route("/admin/top-services", get(get_top_services))
        .route("/admin/category-clicks", get(get_category_clicks))
        .route("/admin/users", get(list_users))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(
                    TraceLayer::new_for_http().make_span_with(|req: &Request| {
                        let matched_path = req
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);
                        let request_id = req
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default();
                        tracing::info_span!(
                            "request",
                            method = %req.method(),
                            uri = %req.uri(),
                            matched_path,
                            request_id,
                        )
                    }),
                )
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
