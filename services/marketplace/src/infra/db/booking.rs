use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use uuid::Uuid;

use commun_domain::booking::BookingStatus;
use commun_domain::pagination::{Page, PageRequest};
use commun_marketplace_schema::bookings;

use crate::domain::repository::BookingRepository;
use crate::domain::types::{Booking, BookingSide};
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct DbBookingRepository {
    pub db: DatabaseConnection,
}

impl BookingRepository for DbBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError> {
        let model = bookings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find booking by id")?;
        model.map(booking_from_model).transpose()
    }

    async fn create(&self, booking: &Booking) -> Result<(), MarketplaceError> {
        bookings::ActiveModel {
            id: Set(booking.id),
            customer_id: Set(booking.customer_id),
            provider_id: Set(booking.provider_id),
            category: Set(booking.category.clone()),
            scheduled_at: Set(booking.scheduled_at),
            note: Set(booking.note.clone()),
            status: Set(booking.status.as_str().to_owned()),
            created_at: Set(booking.created_at),
            updated_at: Set(booking.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create booking")?;
        Ok(())
    }

    async fn list(
        &self,
        side: BookingSide,
        party_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Booking>, MarketplaceError> {
        let column = match side {
            BookingSide::Customer => bookings::Column::CustomerId,
            BookingSide::Provider => bookings::Column::ProviderId,
        };
        let select = bookings::Entity::find().filter(column.eq(party_id));
        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count bookings")?;
        let models = select
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list bookings")?;
        let items = models
            .into_iter()
            .map(booking_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, MarketplaceError> {
        let result = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, Expr::value(to.as_str()))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(bookings::Column::Id.eq(id))
            .filter(bookings::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .context("update booking status")?;
        Ok(result.rows_affected == 1)
    }
}

fn booking_from_model(model: bookings::Model) -> Result<Booking, MarketplaceError> {
    let status = model
        .status
        .parse::<BookingStatus>()
        .with_context(|| format!("booking {} has a corrupt status", model.id))?;
    Ok(Booking {
        id: model.id,
        customer_id: model.customer_id,
        provider_id: model.provider_id,
        category: model.category,
        scheduled_at: model.scheduled_at,
        note: model.note,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
