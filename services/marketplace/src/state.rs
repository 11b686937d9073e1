use sea_orm::DatabaseConnection;

use crate::infra::blob::ObjectBlobStore;
use crate::infra::db::{
    DbAnalyticsRepository, DbBookingRepository, DbCommentRepository, DbProviderProfileRepository,
    DbServiceOfferingRepository, DbUserRepository, DbWishlistRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub blobs: ObjectBlobStore,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn provider_repo(&self) -> DbProviderProfileRepository {
        DbProviderProfileRepository {
            db: self.db.clone(),
        }
    }

    pub fn service_repo(&self) -> DbServiceOfferingRepository {
        DbServiceOfferingRepository {
            db: self.db.clone(),
        }
    }

    pub fn comment_repo(&self) -> DbCommentRepository {
        DbCommentRepository {
            db: self.db.clone(),
        }
    }

    pub fn booking_repo(&self) -> DbBookingRepository {
        DbBookingRepository {
            db: self.db.clone(),
        }
    }

    pub fn wishlist_repo(&self) -> DbWishlistRepository {
        DbWishlistRepository {
            db: self.db.clone(),
        }
    }

    pub fn analytics_repo(&self) -> DbAnalyticsRepository {
        DbAnalyticsRepository {
            db: self.db.clone(),
        }
    }

    pub fn blob_store(&self) -> ObjectBlobStore {
        self.blobs.clone()
    }
}
