use uuid::Uuid;

use commun_domain::pagination::PageRequest;
use commun_marketplace::error::MarketplaceError;
use commun_marketplace::usecase::Caller;
use commun_marketplace::usecase::comment::{
    CreateCommentInput, CreateCommentUseCase, DeleteCommentUseCase, ListCommentsUseCase,
    ReplyToCommentUseCase,
};

use crate::helpers::{Marketplace, MemoryStore, seeded_marketplace};

fn create_usecase(
    m: &Marketplace,
) -> CreateCommentUseCase<MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    CreateCommentUseCase {
        comments: m.store.clone(),
        services: m.store.clone(),
        profiles: m.store.clone(),
        users: m.store.clone(),
    }
}

fn input(m: &Marketplace, rating: i64, text: &str) -> CreateCommentInput {
    CreateCommentInput {
        service_id: m.service.id,
        rating,
        text: text.into(),
    }
}

#[tokio::test]
async fn should_create_comment_once_per_user() {
    let m = seeded_marketplace();
    let usecase = create_usecase(&m);
    let comment = usecase
        .execute(m.customer.id, input(&m, 4, " Patient teacher "))
        .await
        .unwrap();
    assert_eq!(comment.rating, 4);
    assert_eq!(comment.text, "Patient teacher");

    let again = usecase.execute(m.customer.id, input(&m, 5, "Again")).await;
    assert!(matches!(again, Err(MarketplaceError::CommentAlreadyExists)));
}

#[tokio::test]
async fn should_reject_rating_outside_one_to_five() {
    let m = seeded_marketplace();
    for rating in [0, 6, -1, 300] {
        let result = create_usecase(&m)
            .execute(m.customer.id, input(&m, rating, "ok"))
            .await;
        assert!(matches!(result, Err(MarketplaceError::Validation(_))), "{rating}");
    }
}

#[tokio::test]
async fn should_reject_blank_text() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(m.customer.id, input(&m, 3, "   "))
        .await;
    assert!(matches!(result, Err(MarketplaceError::Validation(_))));
}

#[tokio::test]
async fn should_forbid_reviewing_own_service() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(m.provider_user.id, input(&m, 5, "Best tutor ever"))
        .await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

#[tokio::test]
async fn should_require_a_user_row_for_the_author() {
    let m = seeded_marketplace();
    let result = create_usecase(&m)
        .execute(Uuid::now_v7(), input(&m, 4, "Great"))
        .await;
    assert!(matches!(result, Err(MarketplaceError::UserNotFound)));
    assert!(m.store.comments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_service_not_found_for_unknown_service() {
    let m = seeded_marketplace();
    let mut comment = input(&m, 3, "ok");
    comment.service_id = Uuid::now_v7();
    let result = create_usecase(&m).execute(m.customer.id, comment).await;
    assert!(matches!(result, Err(MarketplaceError::ServiceNotFound)));
}

#[tokio::test]
async fn should_let_only_owning_provider_reply_and_overwrite() {
    let m = seeded_marketplace();
    let comment = create_usecase(&m)
        .execute(m.customer.id, input(&m, 4, "Good"))
        .await
        .unwrap();
    let usecase = ReplyToCommentUseCase {
        comments: m.store.clone(),
        services: m.store.clone(),
        profiles: m.store.clone(),
    };

    let denied = usecase.execute(m.customer.id, comment.id, "Thanks").await;
    assert!(matches!(denied, Err(MarketplaceError::Forbidden)));

    usecase
        .execute(m.provider_user.id, comment.id, "Thanks")
        .await
        .unwrap();
    let replied = usecase
        .execute(m.provider_user.id, comment.id, "Thank you!")
        .await
        .unwrap();
    assert_eq!(replied.reply.as_deref(), Some("Thank you!"));
    assert!(replied.replied_at.is_some());

    let page = ListCommentsUseCase {
        comments: m.store.clone(),
        services: m.store.clone(),
    }
    .execute(m.service.id, PageRequest::default())
    .await
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].reply.as_deref(), Some("Thank you!"));
}

#[tokio::test]
async fn should_let_author_or_admin_delete() {
    let m = seeded_marketplace();
    let comment = create_usecase(&m)
        .execute(m.customer.id, input(&m, 2, "Late"))
        .await
        .unwrap();
    let usecase = DeleteCommentUseCase {
        comments: m.store.clone(),
    };

    let stranger = Caller {
        user_id: m.provider_user.id,
        is_admin: false,
    };
    assert!(matches!(
        usecase.execute(stranger, comment.id).await,
        Err(MarketplaceError::Forbidden)
    ));

    let admin = Caller {
        user_id: Uuid::now_v7(),
        is_admin: true,
    };
    usecase.execute(admin, comment.id).await.unwrap();
    assert!(matches!(
        usecase.execute(admin, comment.id).await,
        Err(MarketplaceError::CommentNotFound)
    ));
}
