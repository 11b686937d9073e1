use serde_json::json;
use uuid::Uuid;

use commun_marketplace::domain::types::UploadedFile;
use commun_marketplace::error::MarketplaceError;
use commun_marketplace::usecase::Caller;
use commun_marketplace::usecase::admin::GetTopServicesUseCase;
use commun_marketplace::usecase::service::{
    CreateServiceInput, CreateServiceUseCase, DeleteServiceAssetUseCase, DeleteServiceUseCase,
    GetServiceUseCase, UpdateServiceInput, UpdateServiceUseCase,
};
use commun_marketplace::usecase::wishlist::{
    AddWishlistItemUseCase, GetWishlistUseCase, RemoveWishlistItemUseCase,
};

use crate::helpers::{MemoryBlobs, file, image, seeded_marketplace, test_service};

fn owner(user_id: Uuid) -> Caller {
    Caller {
        user_id,
        is_admin: false,
    }
}

fn create_input(images: Vec<UploadedFile>, documents: Vec<UploadedFile>) -> CreateServiceInput {
    CreateServiceInput {
        category: json!("Music"),
        sub_categories: json!("Home Classes"),
        keywords: json!(["Guitar", "Vocals"]),
        description: json!("Weekend guitar lessons"),
        experience: json!("6"),
        images,
        documents,
    }
}

// ── CreateServiceUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_service_for_existing_provider() {
    let m = seeded_marketplace();
    let blobs = MemoryBlobs::default();
    let service = CreateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
        blobs: blobs.clone(),
    }
    .execute(
        m.provider_user.id,
        create_input(
            vec![image("images")],
            vec![file("documents", "syllabus.pdf", "application/pdf")],
        ),
    )
    .await
    .unwrap();

    assert_eq!(service.provider_id, m.profile.id);
    assert_eq!(service.sub_categories, vec!["Home Classes"]);
    assert_eq!(service.experience, 6);
    assert_eq!(blobs.live().len(), 2);
    assert_eq!(m.store.service_count(), 2);
}

#[tokio::test]
async fn should_require_provider_profile_to_create_service() {
    let m = seeded_marketplace();
    let result = CreateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
        blobs: MemoryBlobs::default(),
    }
    .execute(m.customer.id, create_input(vec![image("images")], vec![]))
    .await;
    assert!(matches!(result, Err(MarketplaceError::NotAProvider)));
}

#[tokio::test]
async fn should_require_at_least_one_image() {
    let m = seeded_marketplace();
    let result = CreateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
        blobs: MemoryBlobs::default(),
    }
    .execute(m.provider_user.id, create_input(vec![], vec![]))
    .await;
    assert!(matches!(result, Err(MarketplaceError::MissingFiles(_))));
}

#[tokio::test]
async fn should_discard_images_when_document_upload_fails() {
    let m = seeded_marketplace();
    let blobs = MemoryBlobs::failing_on(2);
    let result = CreateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
        blobs: blobs.clone(),
    }
    .execute(
        m.provider_user.id,
        create_input(
            vec![image("images")],
            vec![file("documents", "syllabus.pdf", "application/pdf")],
        ),
    )
    .await;
    assert!(matches!(result, Err(MarketplaceError::BlobStore(_))));
    assert!(blobs.live().is_empty());
    assert_eq!(m.store.service_count(), 1);
}

// ── GetServiceUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_count_clicks_on_service_and_provider() {
    let m = seeded_marketplace();
    let usecase = GetServiceUseCase {
        services: m.store.clone(),
        profiles: m.store.clone(),
        comments: m.store.clone(),
    };
    usecase.execute(m.service.id).await.unwrap();
    let detail = usecase.execute(m.service.id).await.unwrap();

    assert_eq!(detail.service.clicks, 2);
    assert_eq!(detail.rating.count, 0);
    assert_eq!(detail.rating.average, None);
    let profile = m.store.profiles.lock().unwrap()[0].clone();
    assert_eq!(profile.clicks, 2);
}

// ── UpdateServiceUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_revalidate_catalog_on_update() {
    let m = seeded_marketplace();
    let usecase = UpdateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
    };

    // Academics lists are not valid under Music.
    let result = usecase
        .execute(
            owner(m.provider_user.id),
            m.service.id,
            UpdateServiceInput {
                category: Some("Music".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::Validation(_))));

    let updated = usecase
        .execute(
            owner(m.provider_user.id),
            m.service.id,
            UpdateServiceInput {
                category: Some("Music".into()),
                sub_categories: Some(vec!["Academy".into()]),
                keywords: Some(vec!["Piano".into()]),
                experience: Some(json!(9)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.category, "Music");
    assert_eq!(updated.experience, 9);
}

#[tokio::test]
async fn should_trim_list_entries_and_drop_blanks_on_update() {
    let m = seeded_marketplace();
    let updated = UpdateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
    }
    .execute(
        owner(m.provider_user.id),
        m.service.id,
        UpdateServiceInput {
            category: Some(" Music ".into()),
            sub_categories: Some(vec![" Home Classes ".into(), "  ".into()]),
            keywords: Some(vec![" Guitar ".into(), String::new()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.category, "Music");
    assert_eq!(updated.sub_categories, vec!["Home Classes".to_owned()]);
    assert_eq!(updated.keywords, vec!["Guitar".to_owned()]);
}

#[tokio::test]
async fn should_forbid_updates_from_other_users() {
    let m = seeded_marketplace();
    let result = UpdateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
    }
    .execute(
        owner(m.customer.id),
        m.service.id,
        UpdateServiceInput {
            description: Some("Hijacked".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

#[tokio::test]
async fn should_return_missing_data_for_empty_update() {
    let m = seeded_marketplace();
    let result = UpdateServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
    }
    .execute(owner(m.provider_user.id), m.service.id, UpdateServiceInput::default())
    .await;
    assert!(matches!(result, Err(MarketplaceError::MissingData)));
}

// ── DeleteService / DeleteServiceAsset ───────────────────────────────────────

#[tokio::test]
async fn should_delete_service_and_its_blobs() {
    let m = seeded_marketplace();
    let blobs = MemoryBlobs::default();
    blobs
        .live
        .lock()
        .unwrap()
        .extend(["img-1.jpg", "img-2.jpg", "cv.pdf", "unrelated.png"].map(String::from));

    let admin = Caller {
        user_id: Uuid::now_v7(),
        is_admin: true,
    };
    DeleteServiceUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
        blobs: blobs.clone(),
    }
    .execute(admin, m.service.id)
    .await
    .unwrap();

    assert_eq!(m.store.service_count(), 0);
    assert_eq!(blobs.live(), vec!["unrelated.png".to_owned()]);
}

#[tokio::test]
async fn should_keep_the_last_image() {
    let m = seeded_marketplace();
    let usecase = DeleteServiceAssetUseCase {
        profiles: m.store.clone(),
        services: m.store.clone(),
        blobs: MemoryBlobs::default(),
    };
    let caller = owner(m.provider_user.id);

    usecase
        .execute(caller, m.service.id, "img-1.jpg")
        .await
        .unwrap();
    let result = usecase.execute(caller, m.service.id, "img-2.jpg").await;
    assert!(matches!(result, Err(MarketplaceError::LastImage)));

    usecase.execute(caller, m.service.id, "cv.pdf").await.unwrap();
    let result = usecase.execute(caller, m.service.id, "cv.pdf").await;
    assert!(matches!(result, Err(MarketplaceError::AssetNotFound)));
}

// ── Wishlist ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_add_wishlist_items_idempotently() {
    let m = seeded_marketplace();
    let add = AddWishlistItemUseCase {
        wishlist: m.store.clone(),
        services: m.store.clone(),
        users: m.store.clone(),
    };
    add.execute(m.customer.id, m.service.id).await.unwrap();
    add.execute(m.customer.id, m.service.id).await.unwrap();

    let wished = GetWishlistUseCase {
        wishlist: m.store.clone(),
        services: m.store.clone(),
    }
    .execute(m.customer.id)
    .await
    .unwrap();
    assert_eq!(wished.len(), 1);
    assert_eq!(wished[0].id, m.service.id);

    let missing = add.execute(m.customer.id, Uuid::now_v7()).await;
    assert!(matches!(missing, Err(MarketplaceError::ServiceNotFound)));
}

#[tokio::test]
async fn should_require_a_user_row_to_wish_for_a_service() {
    let m = seeded_marketplace();
    let result = AddWishlistItemUseCase {
        wishlist: m.store.clone(),
        services: m.store.clone(),
        users: m.store.clone(),
    }
    .execute(Uuid::now_v7(), m.service.id)
    .await;
    assert!(matches!(result, Err(MarketplaceError::UserNotFound)));
    assert!(m.store.wishlist.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_report_missing_wishlist_item_on_remove() {
    let m = seeded_marketplace();
    let remove = RemoveWishlistItemUseCase {
        wishlist: m.store.clone(),
    };
    let result = remove.execute(m.customer.id, m.service.id).await;
    assert!(matches!(result, Err(MarketplaceError::WishlistItemNotFound)));
}

// ── Admin ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_rank_top_services_by_clicks_and_clamp_limit() {
    let m = seeded_marketplace();
    {
        let mut services = m.store.services.lock().unwrap();
        for clicks in [5, 50, 20] {
            let mut s = test_service(m.profile.id, "Academics");
            s.clicks = clicks;
            services.push(s);
        }
    }
    let usecase = GetTopServicesUseCase {
        services: m.store.clone(),
    };

    let top = usecase.execute(Some(2)).await.unwrap();
    assert_eq!(top.iter().map(|s| s.clicks).collect::<Vec<_>>(), vec![50, 20]);
    assert_eq!(usecase.execute(Some(0)).await.unwrap().len(), 1);
    assert_eq!(usecase.execute(None).await.unwrap().len(), 4);
}
