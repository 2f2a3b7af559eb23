use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::categories::{
        CategoryList, CreateCategoryRequest, DetachProductRequest, UpdateCategoryRequest,
    },
    entity::{
        Products,
        categories::{self, ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        product_categories::{
            ActiveModel as LinkActive, Column as LinkCol, Entity as ProductCategories,
        },
        products::{self, Column as ProdCol},
    },
    error::{AppError, AppResult},
    identifiers::sku_for_category,
    middleware::auth::{AuthUser, ensure_staff},
    models::{Category, CategoryWithProducts, Product},
    response::{ApiResponse, Meta},
    routes::params::{ListQuery, SortOrder},
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    query: ListQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Categories::find();
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(CategoryCol::Name.contains(q.as_str()));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(CategoryCol::Id),
        SortOrder::Desc => finder.order_by_desc(CategoryCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let categories = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_products(&state.orm, categories).await?;

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_category(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<CategoryWithProducts>> {
    let category = Categories::find_by_id(id).one(&state.orm).await?;
    let category = match category {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    let item = with_products(&state.orm, vec![category])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Category", item, None))
}

/// Create the category unless one with that name exists, and optionally put a
/// product (by name) into it.
pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<CategoryWithProducts>> {
    ensure_staff(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let category = find_or_create(&txn, payload.name.trim(), user.user_id).await?;

    if let Some(product_name) = payload.product.as_ref().filter(|p| !p.trim().is_empty()) {
        let product = Products::find()
            .filter(ProdCol::Name.eq(product_name.trim()))
            .order_by_asc(ProdCol::Id)
            .one(&txn)
            .await?;
        let product = match product {
            Some(p) => p,
            None => return Err(AppError::NotFound),
        };
        link(&txn, &category, &product).await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    let item = with_products(&state.orm, vec![category])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Category saved",
        item,
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    payload.validate()?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.trim().to_string();
    let clash = Categories::find()
        .filter(CategoryCol::Name.eq(name.clone()))
        .filter(CategoryCol::Id.ne(id))
        .count(&state.orm)
        .await?;
    if clash > 0 {
        return Err(AppError::BadRequest("Category name is already in use".into()));
    }

    let mut active: CategoryActive = existing.into();
    active.name = Set(name);
    active.updated_at = Set(Utc::now().into());
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Category updated",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    existing.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Category deleted"))
}

/// Remove a product (by name) from a category. The product keeps its SKU.
pub async fn detach_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: DetachProductRequest,
) -> AppResult<ApiResponse<CategoryWithProducts>> {
    ensure_staff(user)?;
    let category = Categories::find_by_id(id).one(&state.orm).await?;
    let category = match category {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let product = Products::find()
        .filter(ProdCol::Name.eq(payload.product.trim()))
        .order_by_asc(ProdCol::Id)
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let removed = ProductCategories::delete_many()
        .filter(LinkCol::CategoryId.eq(category.id))
        .filter(LinkCol::ProductId.eq(product.id))
        .exec(&state.orm)
        .await?;
    if removed.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let item = with_products(&state.orm, vec![category])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product detached",
        item,
        Some(Meta::empty()),
    ))
}

/// Put `product` into the category called `name` (created when missing) and
/// give it the category SKU.
pub(crate) async fn attach_to_category<C: ConnectionTrait>(
    db: &C,
    name: &str,
    product: &products::Model,
    user_id: i32,
) -> AppResult<(categories::Model, products::Model)> {
    let category = find_or_create(db, name, user_id).await?;
    let product = link(db, &category, product).await?;
    Ok((category, product))
}

async fn find_or_create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    user_id: i32,
) -> AppResult<categories::Model> {
    let existing = Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(db)
        .await?;
    if let Some(category) = existing {
        return Ok(category);
    }
    let category = CategoryActive {
        id: NotSet,
        name: Set(name.to_string()),
        user_id: Set(Some(user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(db)
    .await?;
    tracing::debug!(category_id = category.id, name, "category created");
    Ok(category)
}

async fn link<C: ConnectionTrait>(
    db: &C,
    category: &categories::Model,
    product: &products::Model,
) -> AppResult<products::Model> {
    ProductCategories::insert(LinkActive {
        product_id: Set(product.id),
        category_id: Set(category.id),
    })
    .on_conflict(
        OnConflict::columns([LinkCol::ProductId, LinkCol::CategoryId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    let mut active: products::ActiveModel = product.clone().into();
    active.sku = Set(Some(sku_for_category(&category.name, &product.name, product.id)));
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

async fn with_products<C: ConnectionTrait>(
    db: &C,
    categories: Vec<categories::Model>,
) -> AppResult<Vec<CategoryWithProducts>> {
    let products = categories
        .load_many_to_many(Products, ProductCategories, db)
        .await?;
    Ok(categories
        .into_iter()
        .zip(products)
        .map(|(category, products)| CategoryWithProducts {
            category: Category::from(category),
            products: products.into_iter().map(Product::from).collect(),
        })
        .collect())
}
