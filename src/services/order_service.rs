use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, CustomerOrderRequest, OrderList, OrderWithItems},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{self, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{ListQuery, SortOrder},
    state::AppState,
};

/// Customer details stored on an order; staff orders leave them empty.
#[derive(Default)]
struct Recipient {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    zipcode: Option<String>,
    house_number: Option<String>,
    city: Option<String>,
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: ListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Orders::find();
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(OrderCol::Email.contains(q.as_str()));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_staff(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Staff order for one product, looked up by name.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_staff(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let product = product_by_name(&txn, &payload.product).await?;
    let (order, items) = place_order(
        &txn,
        Some(user.user_id),
        Recipient::default(),
        vec![(product, payload.quantity)],
    )
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Anonymous webshop order.
pub async fn create_customer_order(
    state: &AppState,
    payload: CustomerOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let mut lines = Vec::with_capacity(payload.products.len());
    for line in &payload.products {
        let product = product_by_name(&txn, &line.product).await?;
        lines.push((product, line.quantity));
    }

    let recipient = Recipient {
        name: Some(payload.name),
        email: Some(payload.email.trim().to_lowercase()),
        phone: Some(payload.phone),
        address: Some(payload.address),
        zipcode: Some(payload.zipcode),
        house_number: Some(payload.house_number),
        city: Some(payload.city),
    };
    let (order, items) = place_order(&txn, None, recipient, lines).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        None,
        "customer_order_create",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

async fn product_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<products::Model> {
    let product = Products::find()
        .filter(ProdCol::Name.eq(name.trim()))
        .order_by_asc(ProdCol::Id)
        .one(db)
        .await?;
    match product {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

async fn place_order<C: ConnectionTrait>(
    db: &C,
    user_id: Option<i32>,
    recipient: Recipient,
    lines: Vec<(products::Model, i32)>,
) -> AppResult<(orders::Model, Vec<OrderItem>)> {
    let total = lines
        .iter()
        .try_fold(0i64, |acc, (product, quantity)| {
            product
                .price
                .checked_mul(i64::from(*quantity))
                .and_then(|line| acc.checked_add(line))
        })
        .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))?;

    let order = OrderActive {
        id: NotSet,
        user_id: Set(user_id),
        name: Set(recipient.name),
        email: Set(recipient.email),
        phone: Set(recipient.phone),
        address: Set(recipient.address),
        zipcode: Set(recipient.zipcode),
        house_number: Set(recipient.house_number),
        city: Set(recipient.city),
        total: Set(total),
        created_at: NotSet,
    }
    .insert(db)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (product, quantity) in lines {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(quantity),
            created_at: NotSet,
        }
        .insert(db)
        .await?;
        items.push(OrderItem::from(item));
    }

    Ok((order, items))
}
