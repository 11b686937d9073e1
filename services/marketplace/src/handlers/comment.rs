use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use commun_auth_types::identity::IdentityHeaders;
use commun_domain::pagination::{Page, PageRequest};

use crate::domain::types::Comment;
use crate::error::MarketplaceError;
use crate::handlers::Ack;
use crate::state::AppState;
use crate::usecase::Caller;
use crate::usecase::comment::{
    CreateCommentInput, CreateCommentUseCase, DeleteCommentUseCase, ListCommentsUseCase,
    ReplyToCommentUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    pub text: String,
    pub reply: Option<String>,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms_opt")]
    pub replied_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "commun_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            service_id: c.service_id,
            user_id: c.user_id,
            rating: c.rating,
            text: c.text,
            reply: c.reply,
            replied_at: c.replied_at,
            created_at: c.created_at,
        }
    }
}

// ── POST /services/{id}/comments ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub rating: i64,
    #[serde(default)]
    pub text: String,
}

pub async fn create_comment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), MarketplaceError> {
    let usecase = CreateCommentUseCase {
        comments: state.comment_repo(),
        services: state.service_repo(),
        profiles: state.provider_repo(),
        users: state.user_repo(),
    };
    let comment = usecase
        .execute(
            identity.user_id,
            CreateCommentInput {
                service_id,
                rating: body.rating,
                text: body.text,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

// ── GET /services/{id}/comments ──────────────────────────────────────────────

pub async fn list_comments(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<CommentResponse>>, MarketplaceError> {
    let usecase = ListCommentsUseCase {
        comments: state.comment_repo(),
        services: state.service_repo(),
    };
    let comments = usecase.execute(service_id, page).await?;
    Ok(Json(comments.map(CommentResponse::from)))
}

// ── PUT /comments/{id}/reply ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn reply_to_comment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<ReplyRequest>,
) -> Result<Json<CommentResponse>, MarketplaceError> {
    let usecase = ReplyToCommentUseCase {
        comments: state.comment_repo(),
        services: state.service_repo(),
        profiles: state.provider_repo(),
    };
    let comment = usecase
        .execute(identity.user_id, comment_id, &body.text)
        .await?;
    Ok(Json(comment.into()))
}

// ── DELETE /comments/{id} ────────────────────────────────────────────────────

pub async fn delete_comment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Ack>, MarketplaceError> {
    let usecase = DeleteCommentUseCase {
        comments: state.comment_repo(),
    };
    usecase.execute(Caller::from(&identity), comment_id).await?;
    Ok(Json(Ack::new("comment deleted")))
}
