use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOfferings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceOfferings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::ProviderId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::SubCategories)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::Keywords)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::Experience)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ServiceOfferings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ServiceOfferings::Table, ServiceOfferings::ProviderId)
                            .to(ProviderProfiles::Table, ProviderProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceOfferings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceOfferings {
    Table,
    Id,
    ProviderId,
    Category,
    SubCategories,
    Keywords,
    Description,
    Experience,
    Clicks,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProviderProfiles {
    Table,
    Id,
}
