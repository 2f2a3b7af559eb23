use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use chrono::Utc;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        Categories, ProductCategories,
        products::{self, ActiveModel, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    identifiers::sku_for_product,
    middleware::auth::{AuthUser, ensure_staff},
    models::{Category, Product, ProductWithCategories},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::category_service::attach_to_category,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(Expr::col(Column::Sku).ilike(pattern))
                .add(Column::Barcode.eq(search.clone())),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Stock => Column::Stock,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_categories(&state.orm, products).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<ProductWithCategories>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    let item = with_categories(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", item, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    payload.validate()?;

    let barcode = payload.barcode.trim().to_string();
    let taken = Products::find()
        .filter(
            Condition::any()
                .add(Column::ArticleNumber.eq(payload.article_number))
                .add(Column::Barcode.eq(barcode.clone())),
        )
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::BadRequest(
            "Article number or barcode is already in use".into(),
        ));
    }

    let sku = sku_for_product(&payload.name, payload.article_number);
    let active = ActiveModel {
        id: NotSet,
        article_number: Set(payload.article_number),
        name: Set(payload.name),
        description: Set(Some(payload.description)),
        price: Set(payload.price),
        image: Set(payload.image),
        color: Set(payload.color),
        height_cm: Set(payload.height_cm),
        width_cm: Set(payload.width_cm),
        depth_cm: Set(payload.depth_cm),
        weight_gr: Set(payload.weight_gr),
        barcode: Set(barcode),
        stock: Set(payload.stock),
        sku: Set(Some(sku)),
        user_id: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductWithCategories>> {
    ensure_staff(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id).one(&txn).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let barcode = payload.barcode.as_deref().map(|b| b.trim().to_string());
    if let Some(barcode) = barcode.as_ref() {
        let clash = Products::find()
            .filter(Column::Barcode.eq(barcode.clone()))
            .filter(Column::Id.ne(id))
            .count(&txn)
            .await?;
        if clash > 0 {
            return Err(AppError::BadRequest("Barcode is already in use".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(color) = payload.color {
        active.color = Set(Some(color));
    }
    if payload.height_cm.is_some() {
        active.height_cm = Set(payload.height_cm);
    }
    if payload.width_cm.is_some() {
        active.width_cm = Set(payload.width_cm);
    }
    if payload.depth_cm.is_some() {
        active.depth_cm = Set(payload.depth_cm);
    }
    if payload.weight_gr.is_some() {
        active.weight_gr = Set(payload.weight_gr);
    }
    if let Some(barcode) = barcode {
        active.barcode = Set(barcode);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    active.updated_at = Set(Utc::now().into());
    let mut product = active.update(&txn).await?;

    if let Some(category) = payload.category.as_ref().filter(|c| !c.trim().is_empty()) {
        ProductCategories::delete_many()
            .filter(crate::entity::product_categories::Column::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        let (_, updated) = attach_to_category(&txn, category.trim(), &product, user.user_id).await?;
        product = updated;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let item = with_categories(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product updated",
        item,
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    existing.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Product deleted"))
}

/// Pair each product with its categories in two queries.
pub(crate) async fn with_categories<C: ConnectionTrait>(
    db: &C,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductWithCategories>> {
    let categories = products
        .load_many_to_many(Categories, ProductCategories, db)
        .await?;
    Ok(products
        .into_iter()
        .zip(categories)
        .map(|(product, categories)| ProductWithCategories {
            product: Product::from(product),
            categories: categories.into_iter().map(Category::from).collect(),
        })
        .collect())
}
