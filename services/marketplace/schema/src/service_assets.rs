use sea_orm::entity::prelude::*;

/// Uploaded file attached to a service offering.
///
/// `kind` is `"image"` or `"document"`; `public_id` is the blob-store deletion handle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub kind: String,
    pub url: String,
    #[sea_orm(unique)]
    pub public_id: String,
    pub position: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_offerings::Entity",
        from = "Column::ServiceId",
        to = "super::service_offerings::Column::Id"
    )]
    ServiceOffering,
}

impl Related<super::service_offerings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOffering.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
