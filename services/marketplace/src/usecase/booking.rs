use chrono::{DateTime, Utc};
use uuid::Uuid;

use commun_domain::booking::{BookingActor, BookingStatus};
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    BookingRepository, ProviderProfileRepository, ServiceOfferingRepository, UserRepository,
};
use crate::domain::types::{Booking, BookingSide};
use crate::error::MarketplaceError;
use crate::usecase::{require_profile, require_user};

pub const MAX_NOTE_CHARS: usize = 500;

// ── CreateBooking ────────────────────────────────────────────────────────────

pub struct CreateBookingInput {
    pub provider_id: Uuid,
    pub category: String,
    pub scheduled_at: DateTime<Utc>,
    pub note: Option<String>,
}

pub struct CreateBookingUseCase<B, P, S, U>
where
    B: BookingRepository,
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    U: UserRepository,
{
    pub bookings: B,
    pub profiles: P,
    pub services: S,
    pub users: U,
}

impl<B, P, S, U> CreateBookingUseCase<B, P, S, U>
where
    B: BookingRepository,
    P: ProviderProfileRepository,
    S: ServiceOfferingRepository,
    U: UserRepository,
{
    pub async fn execute(
        &self,
        customer_id: Uuid,
        input: CreateBookingInput,
    ) -> Result<Booking, MarketplaceError> {
        let now = Utc::now();
        if input.scheduled_at <= now {
            return Err(MarketplaceError::Validation(
                "scheduledAt must be in the future".into(),
            ));
        }
        let category = input.category.trim();
        if category.is_empty() {
            return Err(MarketplaceError::Validation("category is required".into()));
        }

        require_user(&self.users, customer_id).await?;
        let provider = self
            .profiles
            .find_by_id(input.provider_id)
            .await?
            .ok_or(MarketplaceError::ProviderProfileNotFound)?;
        if provider.user_id == customer_id {
            return Err(MarketplaceError::Forbidden);
        }
        let offered = self.services.list_by_provider(provider.id).await?;
        if !offered.iter().any(|s| s.category == category) {
            return Err(MarketplaceError::Validation(format!(
                "provider does not offer '{category}'"
            )));
        }

        let booking = Booking {
            id: Uuid::now_v7(),
            customer_id,
            provider_id: provider.id,
            category: category.to_owned(),
            scheduled_at: input.scheduled_at,
            note: input
                .note
                .map(|n| n.trim().chars().take(MAX_NOTE_CHARS).collect::<String>())
                .filter(|n| !n.is_empty()),
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.bookings.create(&booking).await?;
        tracing::info!(booking_id = %booking.id, provider_id = %provider.id, "booking created");
        Ok(booking)
    }
}

// ── ListBookings ─────────────────────────────────────────────────────────────

pub struct ListBookingsUseCase<B, P>
where
    B: BookingRepository,
    P: ProviderProfileRepository,
{
    pub bookings: B,
    pub profiles: P,
}

impl<B, P> ListBookingsUseCase<B, P>
where
    B: BookingRepository,
    P: ProviderProfileRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        side: BookingSide,
        page: PageRequest,
    ) -> Result<Page<Booking>, MarketplaceError> {
        let party_id = match side {
            BookingSide::Customer => user_id,
            BookingSide::Provider => require_profile(&self.profiles, user_id).await?.id,
        };
        self.bookings.list(side, party_id, page.clamped()).await
    }
}

// ── UpdateBookingStatus ──────────────────────────────────────────────────────

/// Apply a status change requested by one side of the booking.
///
/// Order of checks: target name (400), booking (404), actor (403), edge
/// (409). The write is conditional on the status read, so a concurrent
/// change surfaces as 409 instead of being overwritten.
pub struct UpdateBookingStatusUseCase<B, P>
where
    B: BookingRepository,
    P: ProviderProfileRepository,
{
    pub bookings: B,
    pub profiles: P,
}

impl<B, P> UpdateBookingStatusUseCase<B, P>
where
    B: BookingRepository,
    P: ProviderProfileRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
        target: &str,
    ) -> Result<Booking, MarketplaceError> {
        let target: BookingStatus = target
            .parse()
            .map_err(|_| MarketplaceError::InvalidBookingStatus(target.to_owned()))?;

        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(MarketplaceError::BookingNotFound)?;

        let actor = self.actor(user_id, &booking).await?;
        if !actor.may_request(target) {
            return Err(MarketplaceError::Forbidden);
        }
        let from = booking.status;
        if !from.can_transition_to(target) {
            return Err(MarketplaceError::InvalidTransition { from, to: target });
        }
        if !self.bookings.update_status(booking.id, from, target).await? {
            return Err(MarketplaceError::InvalidTransition { from, to: target });
        }

        tracing::info!(booking_id = %booking.id, %from, to = %target, "booking status changed");
        booking.status = target;
        booking.updated_at = Utc::now();
        Ok(booking)
    }

    async fn actor(&self, user_id: Uuid, booking: &Booking) -> Result<BookingActor, MarketplaceError> {
        if booking.customer_id == user_id {
            return Ok(BookingActor::Customer);
        }
        match self.profiles.find_by_user_id(user_id).await? {
            Some(profile) if profile.id == booking.provider_id => Ok(BookingActor::Provider),
            _ => Err(MarketplaceError::Forbidden),
        }
    }
}
