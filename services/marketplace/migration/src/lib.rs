use sea_orm_migration::prelude::*;

mod m20260101_000001_create_users;
mod m20260101_000002_create_provider_profiles;
mod m20260101_000003_create_service_offerings;
mod m20260101_000004_create_service_assets;
mod m20260101_000005_create_comments;
mod m20260101_000006_create_bookings;
mod m20260101_000007_create_wishlist_items;
mod m20260101_000008_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users::Migration),
            Box::new(m20260101_000002_create_provider_profiles::Migration),
            Box::new(m20260101_000003_create_service_offerings::Migration),
            Box::new(m20260101_000004_create_service_assets::Migration),
            Box::new(m20260101_000005_create_comments::Migration),
            Box::new(m20260101_000006_create_bookings::Migration),
            Box::new(m20260101_000007_create_wishlist_items::Migration),
            Box::new(m20260101_000008_add_lookup_indexes::Migration),
        ]
    }
}
