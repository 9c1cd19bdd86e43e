mod common;

use catalog_crawler::{Company, CrawlService, ScraperRegistry};
use common::{catalog, storefront, test_config};
use serde_json::json;

#[tokio::test]
async fn crawl_isolates_a_failing_company() {
    let server = storefront(vec![
        ("/a/products.json", catalog(&[("nuggets", "Vegicken Nuggets"), ("keema", "Unmutton Keema")])),
        ("/c/products.json", catalog(&[("sausage", "Smoky Sausages")])),
    ])
    .await;
    let (config, _dir) = test_config();
    let service = CrawlService::from_config(&config).await.unwrap();

    let companies = vec![
        Company::new("A", &server.url("/a")).with_platform("shopify"),
        Company::new("B", "http://127.0.0.1:1").with_platform("shopify"),
        Company::new("C", &server.url("/c")).with_platform("shopify"),
    ];
    let summary = service.run(&companies).await.unwrap();

    assert_eq!(service.progress().completed(), 3);
    assert_eq!(service.progress().total(), 3);
    assert_eq!(summary.failed(), 1);
    assert!(summary.is_partial());
    assert_eq!(summary.outcome("B").unwrap().error.as_ref().unwrap().kind(), "network");
    assert_eq!(summary.outcome("A").unwrap().records_persisted, 2);
    assert_eq!(summary.outcome("C").unwrap().records_persisted, 1);
    assert_eq!(service.store().count().await.unwrap(), 3);
}

#[tokio::test]
async fn persisted_rows_are_normalized() {
    let server = storefront(vec![("/a/products.json", catalog(&[("nuggets", "Vegicken Nuggets")]))]).await;
    let (config, _dir) = test_config();
    let service = CrawlService::from_config(&config).await.unwrap();

    let companies = vec![
        Company::new("GoodDot", &server.url("/a"))
            .with_platform("shopify")
            .with_storage_condition("Frozen"),
    ];
    service.run(&companies).await.unwrap();

    let rows = service.store().get_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["product_page"], json!(server.url("/a/products/nuggets")));
    assert_eq!(row["brand"], json!("GoodDot"));
    assert_eq!(row["animal_product_replicated"], json!("Chicken"));
    assert_eq!(row["pack_size"], json!("250 g"));
    assert_eq!(row["weight"], json!(250.0));
    assert_eq!(row["price_per_kg_l"], json!(800.0));
    assert_eq!(row["in_stock"], json!(1));
    assert_eq!(row["availability"], json!("Active"));
    assert_eq!(row["claims"], json!("vegan"));
    assert_eq!(row["ingredient_count"], json!(3));
    assert_eq!(row["sku_code"], json!("SKU-NUGGETS"));
    assert_eq!(row["storage_condition"], json!("Frozen"));
    assert_eq!(row["source_name"], json!("GoodDot Official Website"));
}

#[tokio::test]
async fn recrawling_overwrites_instead_of_duplicating() {
    let server = storefront(vec![("/a/products.json", catalog(&[("nuggets", "Vegicken Nuggets")]))]).await;
    let (config, _dir) = test_config();
    let service = CrawlService::from_config(&config).await.unwrap();
    let companies = vec![Company::new("A", &server.url("/a")).with_platform("shopify")];

    service.run(&companies).await.unwrap();
    service.run(&companies).await.unwrap();

    assert_eq!(service.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn unregistered_platform_fails_only_that_company() {
    let server = storefront(vec![("/a/products.json", catalog(&[("nuggets", "Vegicken Nuggets")]))]).await;
    let (config, _dir) = test_config();
    let service = CrawlService::with_registry(&config, ScraperRegistry::with_defaults()).await.unwrap();

    let companies = vec![
        Company::new("A", &server.url("/a")).with_platform("shopify"),
        Company::new("W", &server.url("/w")).with_platform("wix"),
    ];
    let summary = service.run(&companies).await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.outcome("W").unwrap().error.as_ref().unwrap().kind(), "configuration");
    assert_eq!(service.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn platform_is_detected_when_not_configured() {
    let server = storefront(vec![
        ("/s", r#"<html><head><script src="https://cdn.shopify.com/s/theme.js"></script></head></html>"#.to_string()),
        ("/s/products.json", catalog(&[("tikka", "Chicken Tikka")])),
    ])
    .await;
    let (config, _dir) = test_config();
    let service = CrawlService::from_config(&config).await.unwrap();

    let summary = service.run(&[Company::new("S", &server.url("/s"))]).await.unwrap();

    let outcome = summary.outcome("S").unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.platform.as_deref(), Some("shopify"));
    assert_eq!(outcome.records_persisted, 1);
}

#[tokio::test]
async fn empty_company_list_is_rejected_before_dispatch() {
    let (config, _dir) = test_config();
    let service = CrawlService::from_config(&config).await.unwrap();

    let err = service.run(&[]).await.unwrap_err();
    assert_eq!(err.kind(), "configuration");
    assert_eq!(service.progress().completed(), 0);
}
