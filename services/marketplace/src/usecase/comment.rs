use chrono::Utc;
use uuid::Uuid;

use commun_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    CommentRepository, ProviderProfileRepository, ServiceOfferingRepository, UserRepository,
};
use crate::domain::types::Comment;
use crate::error::MarketplaceError;
use crate::usecase::{Caller, require_user};

pub const MAX_COMMENT_CHARS: usize = 1000;

fn clean_text(raw: &str, field: &str) -> Result<String, MarketplaceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MarketplaceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.chars().take(MAX_COMMENT_CHARS).collect())
}

// ── CreateComment ────────────────────────────────────────────────────────────

pub struct CreateCommentInput {
    pub service_id: Uuid,
    pub rating: i64,
    pub text: String,
}

/// One rated comment per user per service. Providers cannot review their own
/// services.
pub struct CreateCommentUseCase<C, S, P, U>
where
    C: CommentRepository,
    S: ServiceOfferingRepository,
    P: ProviderProfileRepository,
    U: UserRepository,
{
    pub comments: C,
    pub services: S,
    pub profiles: P,
    pub users: U,
}

impl<C, S, P, U> CreateCommentUseCase<C, S, P, U>
where
    C: CommentRepository,
    S: ServiceOfferingRepository,
    P: ProviderProfileRepository,
    U: UserRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateCommentInput,
    ) -> Result<Comment, MarketplaceError> {
        let rating = u8::try_from(input.rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or_else(|| MarketplaceError::Validation("rating must be between 1 and 5".into()))?;
        let text = clean_text(&input.text, "text")?;

        require_user(&self.users, user_id).await?;
        let service = self
            .services
            .find_by_id(input.service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        if let Some(own) = self.profiles.find_by_user_id(user_id).await? {
            if own.id == service.provider_id {
                return Err(MarketplaceError::Forbidden);
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::now_v7(),
            service_id: service.id,
            user_id,
            rating,
            text,
            reply: None,
            replied_at: None,
            created_at: now,
            updated_at: now,
        };
        self.comments.create(&comment).await?;
        Ok(comment)
    }
}

// ── ListComments ─────────────────────────────────────────────────────────────

pub struct ListCommentsUseCase<C, S>
where
    C: CommentRepository,
    S: ServiceOfferingRepository,
{
    pub comments: C,
    pub services: S,
}

impl<C, S> ListCommentsUseCase<C, S>
where
    C: CommentRepository,
    S: ServiceOfferingRepository,
{
    pub async fn execute(
        &self,
        service_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, MarketplaceError> {
        self.services
            .find_by_id(service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        self.comments.list_by_service(service_id, page.clamped()).await
    }
}

// ── ReplyToComment ───────────────────────────────────────────────────────────

/// Only the provider owning the commented service may reply. A second reply
/// replaces the first.
pub struct ReplyToCommentUseCase<C, S, P>
where
    C: CommentRepository,
    S: ServiceOfferingRepository,
    P: ProviderProfileRepository,
{
    pub comments: C,
    pub services: S,
    pub profiles: P,
}

impl<C, S, P> ReplyToCommentUseCase<C, S, P>
where
    C: CommentRepository,
    S: ServiceOfferingRepository,
    P: ProviderProfileRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        comment_id: Uuid,
        reply: &str,
    ) -> Result<Comment, MarketplaceError> {
        let reply = clean_text(reply, "reply")?;
        let mut comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or(MarketplaceError::CommentNotFound)?;
        let service = self
            .services
            .find_by_id(comment.service_id)
            .await?
            .ok_or(MarketplaceError::ServiceNotFound)?;
        match self.profiles.find_by_user_id(user_id).await? {
            Some(profile) if profile.id == service.provider_id => {}
            _ => return Err(MarketplaceError::Forbidden),
        }

        let now = Utc::now();
        self.comments.set_reply(comment.id, &reply, now).await?;
        comment.reply = Some(reply);
        comment.replied_at = Some(now);
        comment.updated_at = now;
        Ok(comment)
    }
}

// ── DeleteComment ────────────────────────────────────────────────────────────

pub struct DeleteCommentUseCase<C: CommentRepository> {
    pub comments: C,
}

impl<C: CommentRepository> DeleteCommentUseCase<C> {
    pub async fn execute(&self, caller: Caller, comment_id: Uuid) -> Result<(), MarketplaceError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or(MarketplaceError::CommentNotFound)?;
        if comment.user_id != caller.user_id && !caller.is_admin {
            return Err(MarketplaceError::Forbidden);
        }
        if !self.comments.delete(comment.id).await? {
            return Err(MarketplaceError::CommentNotFound);
        }
        Ok(())
    }
}
