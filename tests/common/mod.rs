//! Shared fixtures for integration tests

use catalog_crawler::AppConfig;
use catalog_crawler::infrastructure::config::DatabaseConfig;
use catalog_crawler::test_utils::StubServer;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Storefront stub answering `200 OK` for each listed path
pub async fn storefront(routes: Vec<(&str, String)>) -> StubServer {
    StubServer::start(routes.into_iter().map(|(path, body)| (path, 200, body)).collect()).await
}

/// `products.json` body with one single-variant product per `(handle, title)`
pub fn catalog(products: &[(&str, &str)]) -> String {
    let products: Vec<Value> = products
        .iter()
        .enumerate()
        .map(|(i, (handle, title))| {
            json!({
                "id": i + 1,
                "title": title,
                "handle": handle,
                "body_html": "<p>100% vegan. Ingredients: Soy protein, Wheat gluten, Spices</p>",
                "updated_at": "2024-05-01T10:00:00+05:30",
                "variants": [{
                    "id": 100 + i,
                    "title": "Default Title",
                    "available": true,
                    "price": "200.00",
                    "grams": 250,
                    "sku": format!("sku-{handle}")
                }],
                "images": []
            })
        })
        .collect();
    json!({ "products": products }).to_string()
}

/// Default config pointing at a fresh database in a temporary directory
pub fn test_config() -> (AppConfig, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        database: DatabaseConfig {
            path: dir.path().join("catalog.db"),
        },
        ..AppConfig::default()
    };
    (config, dir)
}
