use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: [(&str, &str, &str); 6] = [
    ("idx_service_offerings_provider_id", "service_offerings", "provider_id"),
    ("idx_service_offerings_category", "service_offerings", "category"),
    ("idx_service_assets_service_id", "service_assets", "service_id"),
    ("idx_comments_service_id", "comments", "service_id"),
    ("idx_bookings_customer_id", "bookings", "customer_id"),
    ("idx_bookings_provider_id", "bookings", "provider_id"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .table(Alias::new(table))
                        .col(Alias::new(column))
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().table(Alias::new(*table)).name(*name).to_owned())
                .await?;
        }
        Ok(())
    }
}
