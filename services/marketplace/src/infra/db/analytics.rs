use anyhow::Context as _;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Statement,
};

use commun_domain::booking::BookingStatus;
use commun_domain::user::UserRole;
use commun_marketplace_schema::{comments, provider_profiles, service_offerings};

use crate::domain::repository::AnalyticsRepository;
use crate::domain::types::{CategoryClicks, Overview};
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct DbAnalyticsRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct RoleCountRow {
    role: i16,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: String,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct CategoryClicksRow {
    category: String,
    clicks: i64,
    services: i64,
}

impl AnalyticsRepository for DbAnalyticsRepository {
    async fn overview(&self) -> Result<Overview, MarketplaceError> {
        let backend = self.db.get_database_backend();

        let role_rows = RoleCountRow::find_by_statement(Statement::from_string(
            backend,
            "SELECT role, COUNT(*) AS total FROM users GROUP BY role",
        ))
        .all(&self.db)
        .await
        .context("count users by role")?;

        let status_rows = StatusCountRow::find_by_statement(Statement::from_string(
            backend,
            "SELECT status, COUNT(*) AS total FROM bookings GROUP BY status",
        ))
        .all(&self.db)
        .await
        .context("count bookings by status")?;

        let mut overview = Overview::default();
        for role in [UserRole::Customer, UserRole::Provider, UserRole::Admin] {
            overview.users_by_role.insert(role.as_str(), 0);
        }
        for row in role_rows {
            let role = u8::try_from(row.role).ok().and_then(UserRole::from_u8);
            if let Some(role) = role {
                overview.users_by_role.insert(role.as_str(), row.total.max(0) as u64);
            }
        }
        for status in BookingStatus::ALL {
            overview.bookings_by_status.insert(status.as_str(), 0);
        }
        for row in status_rows {
            if let Ok(status) = row.status.parse::<BookingStatus>() {
                overview
                    .bookings_by_status
                    .insert(status.as_str(), row.total.max(0) as u64);
            }
        }

        overview.providers = provider_profiles::Entity::find()
            .count(&self.db)
            .await
            .context("count providers")?;
        overview.services = service_offerings::Entity::find()
            .count(&self.db)
            .await
            .context("count services")?;
        overview.comments = comments::Entity::find()
            .count(&self.db)
            .await
            .context("count comments")?;
        Ok(overview)
    }

    async fn category_clicks(&self) -> Result<Vec<CategoryClicks>, MarketplaceError> {
        let rows = CategoryClicksRow::find_by_statement(Statement::from_string(
            self.db.get_database_backend(),
            r#"
            SELECT category,
                   CAST(COALESCE(SUM(clicks), 0) AS BIGINT) AS clicks,
                   COUNT(*) AS services
                FROM service_offerings
                GROUP BY category
                ORDER BY clicks DESC, category ASC
            "#,
        ))
        .all(&self.db)
        .await
        .context("sum clicks by category")?;
        Ok(rows
            .into_iter()
            .map(|row| CategoryClicks {
                category: row.category,
                clicks: row.clicks,
                services: row.services,
            })
            .collect())
    }
}
