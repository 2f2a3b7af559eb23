mod common;

use std::collections::HashMap;

use async_trait::async_trait;
use common::{create_product, create_user, database_url, setup_state, unique};
use retail_backend::{
    error::{AppError, AppResult},
    inventory::{InventorySource, RemoteOrderItem, RemoteProduct},
    services::{inventory_service, product_service},
};

/// In-memory stand-in for the wholesale API.
struct FakeInventory {
    orders: HashMap<i64, Vec<RemoteOrderItem>>,
    products: HashMap<i64, RemoteProduct>,
}

#[async_trait]
impl InventorySource for FakeInventory {
    async fn order_items(&self, order_id: i64) -> AppResult<Vec<RemoteOrderItem>> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("no order {order_id}")))
    }

    async fn product(&self, product_id: i64) -> AppResult<RemoteProduct> {
        self.products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("no product {product_id}")))
    }
}

#[tokio::test]
async fn sync_creates_and_restocks_products() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let staff = create_user(&state, "inkoop", "staff").await?;
    let known = create_product(&state, "Terracotta pot", 699, 4).await?;
    let new_article = 20_000_000_000 + i64::from(unique());
    let order_id = i64::from(unique());

    let source = FakeInventory {
        orders: HashMap::from([(
            order_id,
            vec![
                RemoteOrderItem {
                    product_id: known.article_number,
                    quantity: 6,
                },
                RemoteOrderItem {
                    product_id: new_article,
                    quantity: 3,
                },
            ],
        )]),
        products: HashMap::from([
            (
                known.article_number,
                RemoteProduct {
                    id: known.article_number,
                    name: "Terracotta pot".into(),
                    color: Some("rood".into()),
                    ..Default::default()
                },
            ),
            (
                new_article,
                RemoteProduct {
                    id: new_article,
                    name: "Olijfboom".into(),
                    price: Some(3995),
                    ..Default::default()
                },
            ),
        ]),
    };

    let synced = inventory_service::sync_order(&state, &source, &staff, order_id)
        .await?
        .data
        .expect("synced");
    assert_eq!(synced.items.len(), 2);

    let restocked = &synced.items[0];
    assert!(!restocked.created);
    assert_eq!(restocked.stock, 10);

    let created = &synced.items[1];
    assert!(created.created);
    assert_eq!(created.stock, 3);

    let product = product_service::get_product(&state, created.product_id)
        .await?
        .data
        .expect("product")
        .product;
    assert_eq!(product.price, 3995);
    assert_eq!(product.barcode.len(), 13);
    assert!(product.sku.is_some());

    let local = product_service::get_product(&state, known.id)
        .await?
        .data
        .expect("product")
        .product;
    assert_eq!(local.color.as_deref(), Some("rood"));
    assert_eq!(local.price, 699);

    // Counting the same order again is intentional.
    let again = inventory_service::sync_order(&state, &source, &staff, order_id)
        .await?
        .data
        .expect("synced");
    assert_eq!(again.items[0].stock, 16);
    Ok(())
}

#[tokio::test]
async fn failed_fetch_changes_nothing() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let staff = create_user(&state, "inkoop", "staff").await?;
    let known = create_product(&state, "Lavendel", 399, 4).await?;
    let order_id = i64::from(unique());

    // The order references a product the remote cannot describe.
    let source = FakeInventory {
        orders: HashMap::from([(
            order_id,
            vec![
                RemoteOrderItem {
                    product_id: known.article_number,
                    quantity: 2,
                },
                RemoteOrderItem {
                    product_id: -1,
                    quantity: 1,
                },
            ],
        )]),
        products: HashMap::from([(
            known.article_number,
            RemoteProduct {
                id: known.article_number,
                name: "Lavendel".into(),
                ..Default::default()
            },
        )]),
    };

    let result = inventory_service::sync_order(&state, &source, &staff, order_id).await;
    assert!(matches!(result, Err(AppError::Upstream(_))));

    let local = product_service::get_product(&state, known.id)
        .await?
        .data
        .expect("product")
        .product;
    assert_eq!(local.stock, 4);
    Ok(())
}

#[tokio::test]
async fn negative_remote_price_is_rejected_as_upstream() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let staff = create_user(&state, "inkoop", "staff").await?;
    let known = create_product(&state, "Kentia", 1999, 2).await?;
    let new_article = 30_000_000_000 + i64::from(unique());
    let order_id = i64::from(unique());

    let palm: RemoteProduct = serde_json::from_value(serde_json::json!({
        "id": new_article,
        "name": "Palm",
        "price": "-1.50",
    }))?;
    assert_eq!(palm.price, Some(-150));

    let source = FakeInventory {
        orders: HashMap::from([(
            order_id,
            vec![
                RemoteOrderItem {
                    product_id: known.article_number,
                    quantity: 5,
                },
                RemoteOrderItem {
                    product_id: new_article,
                    quantity: 1,
                },
            ],
        )]),
        products: HashMap::from([
            (
                known.article_number,
                RemoteProduct {
                    id: known.article_number,
                    name: "Kentia".into(),
                    ..Default::default()
                },
            ),
            (new_article, palm),
        ]),
    };

    let result = inventory_service::sync_order(&state, &source, &staff, order_id).await;
    assert!(matches!(result, Err(AppError::Upstream(_))));

    let local = product_service::get_product(&state, known.id)
        .await?
        .data
        .expect("product")
        .product;
    assert_eq!(local.stock, 2);
    Ok(())
}
