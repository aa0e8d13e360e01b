use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use storefront::application::catalog::Catalog;
use storefront::application::repos::CatalogApi;
use storefront::cache::{CacheConfig, QueryKey};
use storefront::infra::catalog::InMemoryCatalog;
use storefront::infra::telemetry::describe_metrics;

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    describe_metrics();

    let api: Arc<dyn CatalogApi> =
        Arc::new(InMemoryCatalog::with_samples().with_latency(Duration::from_millis(20)));
    let config = CacheConfig {
        list_limit: 1,
        ..Default::default()
    };
    let catalog = Catalog::new(api, &config);

    // miss + coalesced
    let (a, b) = tokio::join!(catalog.get_product(1), catalog.get_product(1));
    a.expect("first");
    b.expect("second");
    // hit
    catalog.get_product(1).await.expect("cached");
    // invalidated
    catalog.invalidate(QueryKey::Product(1));
    // capacity eviction on the single-slot list family
    catalog.list_products(2, 0).await.expect("page one");
    catalog.list_products(2, 2).await.expect("page two");
    // explicit eviction
    catalog.delete_product(3).await.expect("deleted");

    let counters: HashMap<(String, String), u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| {
            let key = composite_key.key();
            let family = key
                .labels()
                .find(|label| label.key() == "query")
                .map(|label| label.value().to_string())?;
            match value {
                DebugValue::Counter(count) => Some(((key.name().to_string(), family), count)),
                _ => None,
            }
        })
        .collect();

    let expect = |name: &str, family: &str| {
        counters
            .get(&(name.to_string(), family.to_string()))
            .copied()
            .unwrap_or_default()
    };

    assert_eq!(expect("storefront_catalog_cache_miss_total", "product"), 1);
    assert_eq!(expect("storefront_catalog_cache_coalesced_total", "product"), 1);
    assert_eq!(expect("storefront_catalog_cache_hit_total", "product"), 1);
    assert_eq!(expect("storefront_catalog_cache_invalidated_total", "product"), 1);
    assert_eq!(expect("storefront_catalog_cache_miss_total", "products"), 2);
    assert!(expect("storefront_catalog_cache_invalidated_total", "products") >= 1);
    assert_eq!(expect("storefront_catalog_cache_evicted_total", "products"), 1);
    assert_eq!(expect("storefront_catalog_cache_evicted_total", "product"), 1);
}
