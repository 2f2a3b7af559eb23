use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;

use crate::{
    audit,
    dto::inventory::{PlacedRemoteOrders, StoreRemoteOrderRequest, SyncedItem, SyncedOrder},
    entity::products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    identifiers::{random_barcode, sku_for_product, unique_number},
    inventory::{
        InventorySource, RemoteOrderDetail, RemoteProduct, apply_remote_details, received_stock,
    },
    middleware::auth::{AuthUser, ensure_staff},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn remote_products(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Value>> {
    ensure_staff(user)?;
    let products = state.inventory.products().await?;
    Ok(ApiResponse::success(
        "Product list fetched",
        products,
        Some(Meta::empty()),
    ))
}

pub async fn remote_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Value>> {
    ensure_staff(user)?;
    let orders = state.inventory.orders().await?;
    Ok(ApiResponse::success(
        "Order list fetched",
        orders,
        Some(Meta::empty()),
    ))
}

pub async fn remote_order<S: InventorySource>(
    source: &S,
    user: &AuthUser,
    order_id: i64,
) -> AppResult<ApiResponse<RemoteOrderDetail>> {
    ensure_staff(user)?;
    let order_items = source.order_items(order_id).await?;
    let mut products = Vec::with_capacity(order_items.len());
    for item in &order_items {
        products.push(source.product(item.product_id).await?);
    }
    Ok(ApiResponse::success(
        "Order fetched",
        RemoteOrderDetail {
            order_items,
            products,
        },
        Some(Meta::empty()),
    ))
}

/// Place order lines with the supplier, one remote call per line. Stops at
/// the first failure.
pub async fn store_remote_order(
    state: &AppState,
    user: &AuthUser,
    payload: StoreRemoteOrderRequest,
) -> AppResult<ApiResponse<PlacedRemoteOrders>> {
    ensure_staff(user)?;
    payload.validate()?;

    let mut order_ids = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let placed = state.inventory.place_order_item(item).await?;
        order_ids.push(placed.order_id);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "remote_order_store",
        "inventory",
        serde_json::json!({ "order_ids": order_ids }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        PlacedRemoteOrders { order_ids },
        Some(Meta::empty()),
    ))
}

/// Pull a remote order into the local catalog: unknown articles become new
/// products, known ones get their details refreshed and the quantity added to
/// stock. Runs in one transaction; syncing the same order twice counts it twice.
pub async fn sync_order<S: InventorySource>(
    state: &AppState,
    source: &S,
    user: &AuthUser,
    order_id: i64,
) -> AppResult<ApiResponse<SyncedOrder>> {
    ensure_staff(user)?;

    let order_items = source.order_items(order_id).await?;
    let mut remote = Vec::with_capacity(order_items.len());
    for item in order_items {
        let detail = source.product(item.product_id).await?;
        remote.push((item.quantity, detail));
    }

    let txn = state.orm.begin().await?;
    let mut items = Vec::with_capacity(remote.len());
    for (quantity, detail) in &remote {
        items.push(upsert_product(&txn, user.user_id, detail, *quantity).await?);
    }
    txn.commit().await?;

    tracing::info!(order_id, lines = items.len(), "remote order synced");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "remote_order_sync",
        "products",
        serde_json::json!({ "order_id": order_id, "lines": items.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order synced",
        SyncedOrder { order_id, items },
        Some(Meta::empty()),
    ))
}

async fn upsert_product<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    remote: &RemoteProduct,
    quantity: i32,
) -> AppResult<SyncedItem> {
    let existing = Products::find()
        .filter(ProdCol::ArticleNumber.eq(remote.id))
        .lock(LockType::Update)
        .one(db)
        .await?;

    let (product, created) = match existing {
        Some(product) => {
            let stock = received_stock(product.stock, quantity)?;
            let mut active: ProductActive = product.into();
            apply_remote_details(&mut active, remote)?;
            active.stock = Set(stock);
            active.updated_at = Set(Utc::now().into());
            (active.update(db).await?, false)
        }
        None => {
            if remote.name.trim().is_empty() {
                return Err(AppError::Upstream(format!(
                    "remote product {} has no name",
                    remote.id
                )));
            }
            let stock = received_stock(0, quantity)?;
            let barcode = unique_barcode(db).await?;
            let mut active = ProductActive {
                id: NotSet,
                article_number: Set(remote.id),
                name: Set(remote.name.clone()),
                description: Set(None),
                price: Set(0),
                image: Set(None),
                color: Set(None),
                height_cm: Set(None),
                width_cm: Set(None),
                depth_cm: Set(None),
                weight_gr: Set(None),
                barcode: Set(barcode),
                stock: Set(stock),
                sku: Set(Some(sku_for_product(&remote.name, remote.id))),
                user_id: Set(Some(user_id)),
                created_at: NotSet,
                updated_at: NotSet,
            };
            apply_remote_details(&mut active, remote)?;
            (active.insert(db).await?, true)
        }
    };

    tracing::debug!(
        article_number = product.article_number,
        stock = product.stock,
        created,
        "product synced from inventory"
    );

    Ok(SyncedItem {
        article_number: product.article_number,
        product_id: product.id,
        quantity,
        stock: product.stock,
        created,
    })
}

async fn unique_barcode<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    unique_number(
        || random_barcode(&mut rand::rng()),
        move |candidate| async move {
            let taken = Products::find()
                .filter(ProdCol::Barcode.eq(candidate))
                .count(db)
                .await?;
            Ok::<bool, AppError>(taken > 0)
        },
    )
    .await
}
