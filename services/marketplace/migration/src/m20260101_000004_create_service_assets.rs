use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceAssets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceAssets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceAssets::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(ServiceAssets::Kind).string().not_null())
                    .col(ColumnDef::new(ServiceAssets::Url).string().not_null())
                    .col(
                        ColumnDef::new(ServiceAssets::PublicId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceAssets::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServiceAssets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ServiceAssets::Table, ServiceAssets::ServiceId)
                            .to(ServiceOfferings::Table, ServiceOfferings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceAssets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceAssets {
    Table,
    Id,
    ServiceId,
    Kind,
    Url,
    PublicId,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum ServiceOfferings {
    Table,
    Id,
}
