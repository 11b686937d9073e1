use serde_json::json;

use commun_domain::user::UserRole;
use commun_marketplace::error::MarketplaceError;
use commun_marketplace::usecase::provider::{
    RegisterProviderInput, RegisterProviderOutput, RegisterProviderUseCase,
};

use crate::helpers::{MemoryBlobs, MemoryStore, file, image, test_user};

fn academics(experience: serde_json::Value) -> serde_json::Value {
    json!({
        "category": "Academics",
        "subCategories": ["Home Tuitions"],
        "keywords": ["Maths", "Physics"],
        "bio": "Board exam preparation",
        "experience": experience,
    })
}

fn music(sub_category: &str) -> serde_json::Value {
    json!({
        "category": "Music",
        "subCategories": [sub_category],
        "keywords": ["Guitar"],
        "bio": "Acoustic guitar for beginners",
        "experience": 2,
    })
}

struct Setup {
    store: MemoryStore,
    blobs: MemoryBlobs,
    user_id: uuid::Uuid,
}

fn setup(blobs: MemoryBlobs) -> Setup {
    let user = test_user("asha@example.com");
    let user_id = user.id;
    Setup {
        store: MemoryStore::with_users(vec![user]),
        blobs,
        user_id,
    }
}

async fn register(
    setup: &Setup,
    bio: &str,
    services: serde_json::Value,
    files: Vec<commun_marketplace::domain::types::UploadedFile>,
) -> Result<RegisterProviderOutput, MarketplaceError> {
    RegisterProviderUseCase {
        users: setup.store.clone(),
        profiles: setup.store.clone(),
        blobs: setup.blobs.clone(),
    }
    .execute(RegisterProviderInput {
        user_id: setup.user_id,
        provider_bio: bio.into(),
        services: services.to_string(),
        files,
    })
    .await
}

// ── Success ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_three_services_with_mean_experience() {
    let s = setup(MemoryBlobs::default());
    let output = register(
        &s,
        "Teacher and musician",
        json!([academics(json!(2)), academics(json!("5")), music("Academy")]),
        vec![image("serviceImages_0"), image("serviceImages_1"), image("serviceImages_2")],
    )
    .await
    .unwrap();

    assert_eq!(output.services.len(), 3);
    assert_eq!(s.store.profile_count(), 1);
    assert_eq!(s.store.service_count(), 3);
    assert_eq!(s.store.user(s.user_id).unwrap().role, UserRole::Provider);
    assert!(output.services.iter().all(|svc| svc.provider_id == output.profile.id));
    // [2, 5, 2] averages to 3
    assert_eq!(output.profile.experience, 3);
    assert_eq!(s.blobs.live().len(), 3);
}

#[tokio::test]
async fn should_round_mean_experience_half_up() {
    let s = setup(MemoryBlobs::default());
    let output = register(
        &s,
        "Tutor",
        json!([academics(json!(1)), academics(json!(2))]),
        vec![image("serviceImages_0"), image("serviceImages_1")],
    )
    .await
    .unwrap();
    assert_eq!(output.profile.experience, 2);
}

#[tokio::test]
async fn should_attach_files_to_descriptor_by_index() {
    let s = setup(MemoryBlobs::default());
    let output = register(
        &s,
        "Tutor",
        json!([academics(json!(2)), music("Home Classes")]),
        vec![
            image("serviceImages_1"),
            image("serviceImages_0"),
            image("serviceImages_0"),
            file("serviceDocuments_1", "cv.pdf", "application/pdf"),
            image("serviceImages_7"),
            image("serviceImages_x"),
        ],
    )
    .await
    .unwrap();

    let (a, b) = (&output.services[0], &output.services[1]);
    assert_eq!(a.category, "Academics");
    assert_eq!(a.images.len(), 2);
    assert!(a.documents.is_empty());
    assert_eq!(b.category, "Music");
    assert_eq!(b.images.len(), 1);
    assert_eq!(b.documents.len(), 1);
    // ignored files are never uploaded
    assert_eq!(s.blobs.live().len(), 4);
}

#[tokio::test]
async fn should_accept_other_category_with_empty_lists() {
    let s = setup(MemoryBlobs::default());
    let other = json!({
        "category": "Other",
        "subCategories": [],
        "keywords": "",
        "bio": "Odd jobs",
        "experience": "4 years",
    });
    let output = register(&s, "Handyman", json!([other]), vec![image("serviceImages_0")])
        .await
        .unwrap();
    assert_eq!(output.services[0].experience, 4);
    assert!(output.services[0].sub_categories.is_empty());
}

#[tokio::test]
async fn should_clamp_provider_bio() {
    let s = setup(MemoryBlobs::default());
    let long_bio = "x".repeat(700);
    let output = register(
        &s,
        &long_bio,
        json!([academics(json!(1))]),
        vec![image("serviceImages_0")],
    )
    .await
    .unwrap();
    assert_eq!(output.profile.bio.chars().count(), 500);
}

// ── Rejections ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_second_registration_without_side_effects() {
    let s = setup(MemoryBlobs::default());
    register(&s, "Tutor", json!([academics(json!(2))]), vec![image("serviceImages_0")])
        .await
        .unwrap();
    let uploads_before = *s.blobs.uploads.lock().unwrap();

    let result = register(
        &s,
        "Tutor again",
        json!([academics(json!(2))]),
        vec![image("serviceImages_0")],
    )
    .await;

    assert!(matches!(result, Err(MarketplaceError::AlreadyProvider)));
    assert_eq!(s.store.profile_count(), 1);
    assert_eq!(s.store.service_count(), 1);
    assert_eq!(*s.blobs.uploads.lock().unwrap(), uploads_before);
}

#[tokio::test]
async fn should_name_the_failing_descriptor() {
    let s = setup(MemoryBlobs::default());
    let result = register(
        &s,
        "Tutor",
        json!([academics(json!(2)), music("Home Tuitions")]),
        vec![image("serviceImages_0"), image("serviceImages_1")],
    )
    .await;

    match result {
        Err(MarketplaceError::Validation(msg)) => {
            assert!(msg.starts_with("service #2:"), "{msg}");
            assert!(msg.contains("Home Tuitions"), "{msg}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(s.store.profile_count(), 0);
    assert_eq!(s.store.service_count(), 0);
    assert_eq!(*s.blobs.uploads.lock().unwrap(), 0);
    assert_eq!(s.store.user(s.user_id).unwrap().role, UserRole::Customer);
}

#[tokio::test]
async fn should_reject_malformed_services_field() {
    let s = setup(MemoryBlobs::default());
    for services in [json!([]), json!({"category": "Music"}), json!(["Music"])] {
        let result = register(&s, "Tutor", services, vec![image("serviceImages_0")]).await;
        assert!(matches!(result, Err(MarketplaceError::Validation(_))));
    }
}

#[tokio::test]
async fn should_reject_blank_provider_bio() {
    let s = setup(MemoryBlobs::default());
    let result = register(&s, "   ", json!([academics(json!(2))]), vec![image("serviceImages_0")])
        .await;
    match result {
        Err(MarketplaceError::Validation(msg)) => assert_eq!(msg, "providerBio is required"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_missing_experience() {
    let s = setup(MemoryBlobs::default());
    let result = register(
        &s,
        "Tutor",
        json!([academics(serde_json::Value::Null)]),
        vec![image("serviceImages_0")],
    )
    .await;
    match result {
        Err(MarketplaceError::Validation(msg)) => {
            assert_eq!(msg, "service #1: experience is required");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_require_an_image_for_every_descriptor_before_uploading() {
    let s = setup(MemoryBlobs::default());
    let result = register(
        &s,
        "Tutor",
        json!([academics(json!(2)), music("Academy")]),
        vec![image("serviceImages_0")],
    )
    .await;
    assert!(matches!(result, Err(MarketplaceError::MissingFiles(_))));
    assert_eq!(*s.blobs.uploads.lock().unwrap(), 0);
}

#[tokio::test]
async fn should_reject_pdf_sent_as_image() {
    let s = setup(MemoryBlobs::default());
    let result = register(
        &s,
        "Tutor",
        json!([academics(json!(2))]),
        vec![file("serviceImages_0", "cv.pdf", "application/pdf")],
    )
    .await;
    assert!(matches!(result, Err(MarketplaceError::Validation(_))));
}

#[tokio::test]
async fn should_return_user_not_found_for_unknown_caller() {
    let mut s = setup(MemoryBlobs::default());
    s.user_id = uuid::Uuid::now_v7();
    let result = register(&s, "Tutor", json!([academics(json!(2))]), vec![image("serviceImages_0")])
        .await;
    assert!(matches!(result, Err(MarketplaceError::UserNotFound)));
}

// ── Cleanup after partial work ───────────────────────────────────────────────

#[tokio::test]
async fn should_discard_uploaded_blobs_when_an_upload_fails() {
    let s = setup(MemoryBlobs::failing_on(3));
    let result = register(
        &s,
        "Tutor",
        json!([academics(json!(2)), music("Academy")]),
        vec![image("serviceImages_0"), image("serviceImages_0"), image("serviceImages_1")],
    )
    .await;

    assert!(matches!(result, Err(MarketplaceError::BlobStore(_))));
    assert!(s.blobs.live().is_empty());
    assert_eq!(s.store.profile_count(), 0);
    assert_eq!(s.store.user(s.user_id).unwrap().role, UserRole::Customer);
}

#[tokio::test]
async fn should_discard_uploaded_blobs_when_the_transaction_fails() {
    let mut s = setup(MemoryBlobs::default());
    s.store.fail_register = true;
    let result = register(
        &s,
        "Tutor",
        json!([academics(json!(2)), music("Academy")]),
        vec![image("serviceImages_0"), image("serviceImages_1")],
    )
    .await;

    assert!(matches!(result, Err(MarketplaceError::Internal(_))));
    assert_eq!(*s.blobs.uploads.lock().unwrap(), 2);
    assert!(s.blobs.live().is_empty());
    assert_eq!(s.store.service_count(), 0);
    assert_eq!(s.store.user(s.user_id).unwrap().role, UserRole::Customer);
}
