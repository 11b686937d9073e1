use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use commun_auth_types::identity::IdentityHeaders;
use commun_domain::booking::BookingStatus;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Booking, BookingSide};
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::booking::{
    CreateBookingInput, CreateBookingUseCase, ListBookingsUseCase, UpdateBookingStatusUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub category: String,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub scheduled_at: DateTime<Utc>,
    pub note: Option<String>,
    pub status: BookingStatus,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            customer_id: b.customer_id,
            provider_id: b.provider_id,
            category: b.category,
            scheduled_at: b.scheduled_at,
            note: b.note,
            status: b.status,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

// ── POST /bookings ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub provider_id: Uuid,
    pub category: String,
    pub scheduled_at: DateTime<Utc>,
    pub note: Option<String>,
}

pub async fn create_booking(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), MarketplaceError> {
    let usecase = CreateBookingUseCase {
        bookings: state.booking_repo(),
        profiles: state.provider_repo(),
        services: state.service_repo(),
        users: state.user_repo(),
    };
    let booking = usecase
        .execute(
            identity.user_id,
            CreateBookingInput {
                provider_id: body.provider_id,
                category: body.category,
                scheduled_at: body.scheduled_at,
                note: body.note,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

// ── GET /bookings ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BookingListQuery {
    #[serde(rename = "as")]
    pub side: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

fn parse_side(raw: Option<&str>) -> Result<BookingSide, MarketplaceError> {
    match raw {
        None | Some("customer") => Ok(BookingSide::Customer),
        Some("provider") => Ok(BookingSide::Provider),
        Some(other) => Err(MarketplaceError::Validation(format!(
            "as must be 'customer' or 'provider', got '{other}'"
        ))),
    }
}

pub async fn list_bookings(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Page<BookingResponse>>, MarketplaceError> {
    let side = parse_side(query.side.as_deref())?;
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };
    let usecase = ListBookingsUseCase {
        bookings: state.booking_repo(),
        profiles: state.provider_repo(),
    };
    let bookings = usecase.execute(identity.user_id, side, page).await?;
    Ok(Json(bookings.map(BookingResponse::from)))
}

// ── PATCH /bookings/{id}/status ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, MarketplaceError> {
    let usecase = UpdateBookingStatusUseCase {
        bookings: state.booking_repo(),
        profiles: state.provider_repo(),
    };
    let booking = usecase
        .execute(identity.user_id, booking_id, &body.status)
        .await?;
    Ok(Json(booking.into()))
}
