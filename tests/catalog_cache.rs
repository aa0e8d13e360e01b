use std::sync::Arc;
use std::time::Duration;

use storefront::application::catalog::Catalog;
use storefront::application::mutation::MutationState;
use storefront::application::repos::{CatalogApi, CatalogError};
use storefront::cache::{CacheConfig, QueryFamily, QueryKey, QueryState};
use storefront::infra::catalog::InMemoryCatalog;
use storefront_api_types::ProductFormData;

fn setup(latency: Duration) -> (Arc<InMemoryCatalog>, Catalog) {
    let api = Arc::new(InMemoryCatalog::with_samples().with_latency(latency));
    let catalog = Catalog::new(
        Arc::clone(&api) as Arc<dyn CatalogApi>,
        &CacheConfig::default(),
    );
    (api, catalog)
}

fn form(title: &str) -> ProductFormData {
    ProductFormData {
        title: title.to_string(),
        price: 25.0,
        description: "Sturdy".to_string(),
        brand: "Acme".to_string(),
        category: "tools".to_string(),
        thumbnail: "https://cdn.example.com/t.png".to_string(),
        images: Vec::new(),
    }
}

#[tokio::test]
async fn repeated_reads_are_served_from_cache() {
    let (api, catalog) = setup(Duration::ZERO);

    let first = catalog.get_product(3).await.expect("product");
    let second = catalog.get_product(3).await.expect("cached product");
    assert_eq!(first, second);
    assert_eq!(api.requests("get_product"), 1);

    catalog.list_products(5, 0).await.expect("page");
    catalog.list_products(5, 0).await.expect("cached page");
    catalog.list_products(5, 5).await.expect("other page");
    assert_eq!(api.requests("list_products"), 2);
}

#[tokio::test]
async fn concurrent_reads_share_one_request() {
    let (api, catalog) = setup(Duration::from_millis(30));

    let (a, b) = tokio::join!(catalog.get_product(7), catalog.get_product(7));

    assert_eq!(api.requests("get_product"), 1);
    assert_eq!(a.expect("first caller"), b.expect("second caller"));
}

#[tokio::test]
async fn concurrent_failures_share_one_error() {
    let (api, catalog) = setup(Duration::from_millis(30));

    let (a, b) = tokio::join!(catalog.get_product(404), catalog.get_product(404));

    assert_eq!(api.requests("get_product"), 1);
    let a = a.expect_err("first caller");
    assert!(a.is_not_found());
    assert_eq!(Err(a), b);
}

#[tokio::test]
async fn create_refetches_cached_listings() {
    let (api, catalog) = setup(Duration::ZERO);

    let before = catalog.list_products(0, 0).await.expect("page");
    assert_eq!(before.total, 12);

    catalog.create_product(&form("Hammer")).await.expect("created");
    assert!(matches!(
        catalog.list_state(0, 0),
        QueryState::Success { stale: true, .. }
    ));

    let after = catalog.list_products(0, 0).await.expect("refetched page");
    assert_eq!(after.total, 13);
    assert_eq!(api.requests("list_products"), 2);
}

#[tokio::test]
async fn update_refetches_product_and_listings() {
    let (api, catalog) = setup(Duration::ZERO);

    catalog.get_product(2).await.expect("product");
    catalog.list_products(3, 0).await.expect("page");

    catalog
        .update_product(2, &form("Renamed Palette"))
        .await
        .expect("updated");

    let product = catalog.get_product(2).await.expect("refetched product");
    assert_eq!(product.title, "Renamed Palette");
    let page = catalog.list_products(3, 0).await.expect("refetched page");
    assert_eq!(page.products[1].title, "Renamed Palette");

    assert_eq!(api.requests("get_product"), 2);
    assert_eq!(api.requests("list_products"), 2);
}

#[tokio::test]
async fn delete_evicts_product_and_surfaces_not_found() {
    let (api, catalog) = setup(Duration::ZERO);

    catalog.get_product(4).await.expect("product");
    let deleted = catalog.delete_product(4).await.expect("deleted");
    assert!(deleted.is_deleted);
    assert!(matches!(
        catalog.product_state(4),
        QueryState::Pending { fetching: false }
    ));

    let err = catalog.get_product(4).await.expect_err("gone");
    assert!(err.is_not_found());
    assert_eq!(api.requests("get_product"), 2);
}

#[tokio::test]
async fn failed_refetch_keeps_last_good_data() {
    let (api, catalog) = setup(Duration::ZERO);

    let product = catalog.get_product(1).await.expect("product");
    catalog.invalidate(QueryKey::Product(1));
    api.set_offline(true);

    let err = catalog.get_product(1).await.expect_err("offline");
    assert!(matches!(err, CatalogError::Network { .. }));

    match catalog.product_state(1) {
        QueryState::Error { error, data, .. } => {
            assert_eq!(error, err);
            assert_eq!(data, Some(product.clone()));
        }
        other => panic!("unexpected state: {other:?}"),
    }

    api.set_offline(false);
    let recovered = catalog.get_product(1).await.expect("recovered");
    assert_eq!(recovered, product);
    assert!(catalog.product_state(1).is_success());
}

#[tokio::test]
async fn family_invalidation_marks_every_product_stale() {
    let (api, catalog) = setup(Duration::ZERO);

    catalog.get_product(1).await.expect("product 1");
    catalog.get_product(2).await.expect("product 2");
    catalog.invalidate_family(QueryFamily::Product);

    for id in [1, 2] {
        assert!(matches!(
            catalog.product_state(id),
            QueryState::Success { stale: true, .. }
        ));
    }

    catalog.get_product(1).await.expect("refetched");
    assert_eq!(api.requests("get_product"), 3);
}

#[tokio::test]
async fn disabled_cache_still_coalesces() {
    let api = Arc::new(InMemoryCatalog::with_samples().with_latency(Duration::from_millis(30)));
    let config = CacheConfig {
        enabled: false,
        ..CacheConfig::default()
    };
    let catalog = Catalog::new(Arc::clone(&api) as Arc<dyn CatalogApi>, &config);

    let (a, b) = tokio::join!(catalog.get_product(5), catalog.get_product(5));
    a.expect("first");
    b.expect("second");
    assert_eq!(api.requests("get_product"), 1);

    catalog.get_product(5).await.expect("third");
    assert_eq!(api.requests("get_product"), 2);
}

#[tokio::test]
async fn abandoned_read_finishes_in_background() {
    let (api, catalog) = setup(Duration::from_millis(50));

    let timed_out = tokio::time::timeout(Duration::from_millis(5), catalog.get_product(3)).await;
    assert!(timed_out.is_err());
    assert!(catalog.product_state(3).is_fetching());

    tokio::time::sleep(Duration::from_millis(200)).await;

    match catalog.product_state(3) {
        QueryState::Success {
            data,
            stale,
            fetching,
        } => {
            assert_eq!(data.id, 3);
            assert!(!stale);
            assert!(!fetching);
        }
        other => panic!("unexpected state: {other:?}"),
    }
    catalog.get_product(3).await.expect("cached product");
    assert_eq!(api.requests("get_product"), 1);
}

#[tokio::test]
async fn mutations_report_their_outcome() {
    let (_api, catalog) = setup(Duration::ZERO);
    assert_eq!(catalog.create_state(), MutationState::Idle);

    let created = catalog
        .create_product(&form("Hammer"))
        .await
        .expect("created");
    assert_eq!(catalog.create_state(), MutationState::Success(created));

    let updated = catalog
        .update_product(1, &form("Renamed"))
        .await
        .expect("updated");
    assert_eq!(catalog.update_state(), MutationState::Success(updated));

    let deleted = catalog.delete_product(2).await.expect("deleted");
    assert_eq!(catalog.delete_state(), MutationState::Success(deleted));

    catalog.reset_mutations();
    assert_eq!(catalog.create_state(), MutationState::Idle);
    assert_eq!(catalog.update_state(), MutationState::Idle);
    assert_eq!(catalog.delete_state(), MutationState::Idle);
}

#[tokio::test]
async fn failed_mutations_leave_cache_untouched() {
    let (api, catalog) = setup(Duration::ZERO);

    catalog.list_products(5, 0).await.expect("page");
    catalog.get_product(2).await.expect("product");
    api.set_offline(true);

    let create = catalog.create_product(&form("Hammer")).await;
    assert!(matches!(create, Err(CatalogError::Network { .. })));
    let update = catalog.update_product(2, &form("Renamed")).await;
    assert!(matches!(update, Err(CatalogError::Network { .. })));
    let delete = catalog.delete_product(2).await;
    assert!(matches!(delete, Err(CatalogError::Network { .. })));

    assert!(matches!(
        catalog.create_state(),
        MutationState::Error(CatalogError::Network { .. })
    ));
    assert!(matches!(
        catalog.update_state(),
        MutationState::Error(CatalogError::Network { .. })
    ));
    assert!(matches!(
        catalog.delete_state(),
        MutationState::Error(CatalogError::Network { .. })
    ));

    assert!(matches!(
        catalog.list_state(5, 0),
        QueryState::Success { stale: false, .. }
    ));
    assert!(matches!(
        catalog.product_state(2),
        QueryState::Success { stale: false, .. }
    ));

    catalog.list_products(5, 0).await.expect("cached page");
    catalog.get_product(2).await.expect("cached product");
    assert_eq!(api.requests("list_products"), 1);
    assert_eq!(api.requests("get_product"), 1);
}
