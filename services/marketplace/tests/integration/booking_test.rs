use chrono::{Duration, Utc};
use uuid::Uuid;

use commun_domain::booking::{BookingActor, BookingStatus};
use commun_domain::pagination::PageRequest;
use commun_marketplace::domain::types::{Booking, BookingSide};
use commun_marketplace::error::MarketplaceError;
use commun_marketplace::usecase::booking::{
    CreateBookingInput, CreateBookingUseCase, ListBookingsUseCase, UpdateBookingStatusUseCase,
};

use crate::helpers::{Marketplace, seeded_marketplace};

fn create_usecase(
    m: &Marketplace,
) -> CreateBookingUseCase<
    crate::helpers::MemoryStore,
    crate::helpers::MemoryStore,
    crate::helpers::MemoryStore,
    crate::helpers::MemoryStore,
> {
    CreateBookingUseCase {
        bookings: m.store.clone(),
        profiles: m.store.clone(),
        services: m.store.clone(),
        users: m.store.clone(),
    }
}

fn tomorrow() -> chrono::DateTime<Utc> {
    Utc::now() + Duration::days(1)
}

fn seed_booking(m: &Marketplace, status: BookingStatus) -> Booking {
    let now = Utc::now();
    let booking = Booking {
        id: Uuid::now_v7(),
        customer_id: m.customer.id,
        provider_id: m.profile.id,
        category: "Academics".into(),
        scheduled_at: tomorrow(),
        note: None,
        status,
        created_at: now,
        updated_at: now,
    };
    m.store.bookings.lock().unwrap().push(booking.clone());
    booking
}

// ── CreateBookingUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_pending_booking() {
    let m = seeded_marketplace();
    let booking = create_usecase(&m)
        .execute(
            m.customer.id,
            CreateBookingInput {
                provider_id: m.profile.id,
                category: "Academics".into(),
                scheduled_at: tomorrow(),
                note: Some("  Class 10 maths  ".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.note.as_deref(), Some("Class 10 maths"));
    assert_eq!(m.store.booking(booking.id).customer_id, m.customer.id);
}

#[tokio::test]
async fn should_reject_booking_in_the_past() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(
            m.customer.id,
            CreateBookingInput {
                provider_id: m.profile.id,
                category: "Academics".into(),
                scheduled_at: Utc::now() - Duration::hours(1),
                note: None,
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::Validation(_))));
}

#[tokio::test]
async fn should_reject_category_the_provider_does_not_offer() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(
            m.customer.id,
            CreateBookingInput {
                provider_id: m.profile.id,
                category: "Music".into(),
                scheduled_at: tomorrow(),
                note: None,
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::Validation(_))));
}

#[tokio::test]
async fn should_reject_booking_own_profile() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(
            m.provider_user.id,
            CreateBookingInput {
                provider_id: m.profile.id,
                category: "Academics".into(),
                scheduled_at: tomorrow(),
                note: None,
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

#[tokio::test]
async fn should_require_a_user_row_for_the_customer() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(
            Uuid::now_v7(),
            CreateBookingInput {
                provider_id: m.profile.id,
                category: "Academics".into(),
                scheduled_at: tomorrow(),
                note: None,
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::UserNotFound)));
    assert!(m.store.bookings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_not_found_for_unknown_provider() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(
            m.customer.id,
            CreateBookingInput {
                provider_id: Uuid::now_v7(),
                category: "Academics".into(),
                scheduled_at: tomorrow(),
                note: None,
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::ProviderProfileNotFound)));
}

// ── ListBookingsUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_bookings_from_either_side() {
    let m = seeded_marketplace();
    seed_booking(&m, BookingStatus::Pending);
    let usecase = ListBookingsUseCase {
        bookings: m.store.clone(),
        profiles: m.store.clone(),
    };

    let as_customer = usecase
        .execute(m.customer.id, BookingSide::Customer, PageRequest::default())
        .await
        .unwrap();
    let as_provider = usecase
        .execute(m.provider_user.id, BookingSide::Provider, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(as_customer.total, 1);
    assert_eq!(as_provider.total, 1);

    let result = usecase
        .execute(m.customer.id, BookingSide::Provider, PageRequest::default())
        .await;
    assert!(matches!(result, Err(MarketplaceError::NotAProvider)));
}

// ── UpdateBookingStatusUseCase ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Who {
    Customer,
    Provider,
    Stranger,
}

#[tokio::test]
async fn should_follow_state_machine_for_every_actor_state_and_target() {
    for who in [Who::Customer, Who::Provider, Who::Stranger] {
        for from in BookingStatus::ALL {
            for target in BookingStatus::ALL {
                let m = seeded_marketplace();
                let booking = seed_booking(&m, from);
                let (user_id, actor) = match who {
                    Who::Customer => (m.customer.id, Some(BookingActor::Customer)),
                    Who::Provider => (m.provider_user.id, Some(BookingActor::Provider)),
                    Who::Stranger => (Uuid::now_v7(), None),
                };
                let usecase = UpdateBookingStatusUseCase {
                    bookings: m.store.clone(),
                    profiles: m.store.clone(),
                };
                let result = usecase
                    .execute(user_id, booking.id, target.as_str())
                    .await;
                let stored = m.store.booking(booking.id).status;
                let case = format!("{who:?} {from} -> {target}");

                match actor {
                    None => {
                        assert!(matches!(result, Err(MarketplaceError::Forbidden)), "{case}");
                    }
                    Some(actor) if !actor.may_request(target) => {
                        assert!(matches!(result, Err(MarketplaceError::Forbidden)), "{case}");
                    }
                    Some(_) if !from.can_transition_to(target) => {
                        assert!(
                            matches!(result, Err(MarketplaceError::InvalidTransition { .. })),
                            "{case}"
                        );
                    }
                    Some(_) => {
                        assert_eq!(result.unwrap().status, target, "{case}");
                        assert_eq!(stored, target, "{case}");
                        continue;
                    }
                }
                assert_eq!(stored, from, "{case}");
            }
        }
    }
}

#[tokio::test]
async fn should_reject_unknown_status_before_checking_authority() {
    let m = seeded_marketplace();
    let booking = seed_booking(&m, BookingStatus::Pending);
    let usecase = UpdateBookingStatusUseCase {
        bookings: m.store.clone(),
        profiles: m.store.clone(),
    };
    let result = usecase.execute(Uuid::now_v7(), booking.id, "shipped").await;
    assert!(matches!(result, Err(MarketplaceError::InvalidBookingStatus(s)) if s == "shipped"));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_booking() {
    let m = seeded_marketplace();
    let usecase = UpdateBookingStatusUseCase {
        bookings: m.store.clone(),
        profiles: m.store.clone(),
    };
    let result = usecase
        .execute(m.customer.id, Uuid::now_v7(), "cancelled")
        .await;
    assert!(matches!(result, Err(MarketplaceError::BookingNotFound)));
}
