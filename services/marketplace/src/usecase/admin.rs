use commun_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AnalyticsRepository, ServiceOfferingRepository, UserRepository};
use crate::domain::types::{CategoryClicks, Overview, ServiceOffering, User};
use crate::error::MarketplaceError;

pub const DEFAULT_TOP_SERVICES: u64 = 10;
pub const MAX_TOP_SERVICES: u64 = 50;

pub struct GetOverviewUseCase<A: AnalyticsRepository> {
    pub analytics: A,
}

impl<A: AnalyticsRepository> GetOverviewUseCase<A> {
    pub async fn execute(&self) -> Result<Overview, MarketplaceError> {
        self.analytics.overview().await
    }
}

pub struct GetTopServicesUseCase<S: ServiceOfferingRepository> {
    pub services: S,
}

impl<S: ServiceOfferingRepository> GetTopServicesUseCase<S> {
    pub async fn execute(&self, limit: Option<u64>) -> Result<Vec<ServiceOffering>, MarketplaceError> {
        let limit = limit
            .unwrap_or(DEFAULT_TOP_SERVICES)
            .clamp(1, MAX_TOP_SERVICES);
        self.services.top_by_clicks(limit).await
    }
}

pub struct GetCategoryClicksUseCase<A: AnalyticsRepository> {
    pub analytics: A,
}

impl<A: AnalyticsRepository> GetCategoryClicksUseCase<A> {
    pub async fn execute(&self) -> Result<Vec<CategoryClicks>, MarketplaceError> {
        self.analytics.category_clicks().await
    }
}

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<User>, MarketplaceError> {
        self.users.list(page.clamped()).await
    }
}
