use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use commun_domain::pagination::{Page, PageRequest};
use commun_marketplace_schema::comments;

use crate::domain::repository::CommentRepository;
use crate::domain::types::{Comment, RatingSummary};
use crate::error::MarketplaceError;

use super::is_unique_violation;

#[derive(Clone)]
pub struct DbCommentRepository {
    pub db: DatabaseConnection,
}

impl CommentRepository for DbCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, MarketplaceError> {
        let model = comments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find comment by id")?;
        Ok(model.map(comment_from_model))
    }

    async fn list_by_service(
        &self,
        service_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, MarketplaceError> {
        let select = comments::Entity::find().filter(comments::Column::ServiceId.eq(service_id));
        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count comments")?;
        let models = select
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list comments")?;
        Ok(Page::new(
            models.into_iter().map(comment_from_model).collect(),
            page,
            total,
        ))
    }

    async fn create(&self, comment: &Comment) -> Result<(), MarketplaceError> {
        let result = comments::ActiveModel {
            id: Set(comment.id),
            service_id: Set(comment.service_id),
            user_id: Set(comment.user_id),
            rating: Set(i16::from(comment.rating)),
            text: Set(comment.text.clone()),
            reply: Set(comment.reply.clone()),
            replied_at: Set(comment.replied_at),
            created_at: Set(comment.created_at),
            updated_at: Set(comment.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(MarketplaceError::CommentAlreadyExists),
            Err(err) => Err(anyhow::Error::new(err).context("create comment").into()),
        }
    }

    async fn set_reply(
        &self,
        id: Uuid,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        comments::ActiveModel {
            id: Set(id),
            reply: Set(Some(reply.to_owned())),
            replied_at: Set(Some(replied_at)),
            updated_at: Set(replied_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set comment reply")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = comments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete comment")?;
        Ok(result.rows_affected > 0)
    }

    async fn rating_summary(&self, service_id: Uuid) -> Result<RatingSummary, MarketplaceError> {
        let ratings: Vec<i16> = comments::Entity::find()
            .select_only()
            .column(comments::Column::Rating)
            .filter(comments::Column::ServiceId.eq(service_id))
            .into_tuple()
            .all(&self.db)
            .await
            .context("load service ratings")?;
        let ratings: Vec<u8> = ratings
            .into_iter()
            .filter_map(|r| u8::try_from(r).ok())
            .collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }
}

fn comment_from_model(model: comments::Model) -> Comment {
    Comment {
        id: model.id,
        service_id: model.service_id,
        user_id: model.user_id,
        rating: u8::try_from(model.rating).unwrap_or_default(),
        text: model.text,
        reply: model.reply,
        replied_at: model.replied_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
