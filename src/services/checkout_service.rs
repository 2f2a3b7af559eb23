use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Alias, Expr, LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::checkout::{
        CheckoutLineList, ClearedCart, CreateCheckoutLineRequest, FinalizedReceipt, ReceiptList,
    },
    entity::{
        checkout_lines::{self, ActiveModel as LineActive, Column as LineCol, Entity as CheckoutLines},
        products::{Column as ProdCol, Entity as Products},
        receipts::{ActiveModel as ReceiptActive, Column as ReceiptCol, Entity as Receipts},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::{
        auth::{AuthUser, ensure_staff},
        register::RegisterId,
    },
    models::{CheckoutLine, Product, Receipt},
    receipt::{CashierIdentity, ReceiptLine, build_receipt},
    response::{ApiResponse, Meta},
    routes::params::ReceiptQuery,
    state::AppState,
};

/// Bump the quantity of an existing `(register_id, article_number)` line by
/// the quantity of the row being inserted.
fn merge_quantity() -> OnConflict {
    OnConflict::columns([LineCol::RegisterId, LineCol::ArticleNumber])
        .value(
            LineCol::Quantity,
            Expr::col((CheckoutLines, LineCol::Quantity))
                .add(Expr::col((Alias::new("excluded"), LineCol::Quantity))),
        )
        .value(LineCol::UpdatedAt, Expr::current_timestamp())
        .to_owned()
}

pub async fn find_by_code(state: &AppState, code: &str) -> AppResult<ApiResponse<Product>> {
    let product = Products::find()
        .filter(ProdCol::Barcode.eq(code.trim()))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", product.into(), None))
}

/// Scan a barcode into the register's staging cart.
pub async fn scan_barcode(
    state: &AppState,
    user: &AuthUser,
    register: &RegisterId,
    code: &str,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let product = Products::find()
        .filter(ProdCol::Barcode.eq(code.trim()))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let line = LineActive {
        id: NotSet,
        register_id: Set(register.as_str().to_string()),
        article_number: Set(product.article_number),
        name: Set(product.name.clone()),
        price: Set(product.price),
        quantity: Set(1),
        user_id: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let line = CheckoutLines::insert(line)
        .on_conflict(merge_quantity())
        .exec_with_returning(&state.orm)
        .await?;

    tracing::debug!(
        register = register.as_str(),
        article_number = line.article_number,
        quantity = line.quantity,
        "barcode scanned"
    );

    Ok(ApiResponse::success(
        "Product added to checkout",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn add_line(
    state: &AppState,
    user: &AuthUser,
    register: &RegisterId,
    payload: CreateCheckoutLineRequest,
) -> AppResult<ApiResponse<CheckoutLine>> {
    ensure_staff(user)?;
    payload.validate()?;

    let line = LineActive {
        id: NotSet,
        register_id: Set(register.as_str().to_string()),
        article_number: Set(payload.article_number),
        name: Set(payload.name),
        price: Set(payload.price),
        quantity: Set(payload.quantity.unwrap_or(1)),
        user_id: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let line = CheckoutLines::insert(line)
        .on_conflict(merge_quantity())
        .exec_with_returning(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Checkout line saved",
        line.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_lines(
    state: &AppState,
    user: &AuthUser,
    register: &RegisterId,
) -> AppResult<ApiResponse<CheckoutLineList>> {
    ensure_staff(user)?;
    let items: Vec<CheckoutLine> = CheckoutLines::find()
        .filter(LineCol::RegisterId.eq(register.as_str()))
        .order_by_desc(LineCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CheckoutLine::from)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Checkout lines",
        CheckoutLineList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn remove_line(
    state: &AppState,
    user: &AuthUser,
    register: &RegisterId,
    id: i32,
) -> AppResult<ApiResponse<CheckoutLine>> {
    ensure_staff(user)?;
    let line = CheckoutLines::find()
        .filter(
            Condition::all()
                .add(LineCol::Id.eq(id))
                .add(LineCol::RegisterId.eq(register.as_str())),
        )
        .one(&state.orm)
        .await?;
    let line = match line {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };

    CheckoutLines::delete_by_id(line.id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Checkout line removed",
        line.into(),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
    register: &RegisterId,
) -> AppResult<ApiResponse<ClearedCart>> {
    ensure_staff(user)?;
    let result = CheckoutLines::delete_many()
        .filter(LineCol::RegisterId.eq(register.as_str()))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Checkout cleared",
        ClearedCart {
            removed: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

/// Turn the register's staging cart into a receipt, take the sold quantities
/// out of stock and empty the cart. All or nothing.
pub async fn finalize_receipt(
    state: &AppState,
    user: &AuthUser,
    register: &RegisterId,
) -> AppResult<ApiResponse<FinalizedReceipt>> {
    ensure_staff(user)?;
    let txn = state.orm.begin().await?;

    let lines: Vec<checkout_lines::Model> = CheckoutLines::find()
        .filter(LineCol::RegisterId.eq(register.as_str()))
        .order_by_asc(LineCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Err(AppError::BadRequest("Checkout is empty".into()));
    }

    let cashier = match lines.iter().find_map(|line| line.user_id) {
        Some(cashier_id) => Users::find_by_id(cashier_id)
            .one(&txn)
            .await?
            .map(|u| CashierIdentity::from(&u)),
        None => None,
    };

    let receipt_lines: Vec<ReceiptLine> = lines.iter().map(ReceiptLine::from).collect();
    let summary = build_receipt(&receipt_lines, cashier.as_ref());

    let receipt = ReceiptActive {
        id: NotSet,
        register_id: Set(register.as_str().to_string()),
        user_id: Set(Some(user.user_id)),
        data: Set(summary.data),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &lines {
        let product = Products::find()
            .filter(ProdCol::ArticleNumber.eq(line.article_number))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let product = match product {
            Some(p) => p,
            None => {
                tracing::warn!(
                    article_number = line.article_number,
                    "checkout line has no matching product, stock left untouched"
                );
                continue;
            }
        };

        let remaining = product.stock.checked_sub(line.quantity).unwrap_or(-1);
        if remaining < 0 {
            tracing::info!(
                article_number = line.article_number,
                stock = product.stock,
                requested = line.quantity,
                "finalize rejected, not enough stock"
            );
            return Err(AppError::OutOfStock {
                article_number: line.article_number,
            });
        }
        if remaining == 0 {
            tracing::warn!(article_number = line.article_number, "product sold out");
        }

        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .col_expr(ProdCol::UpdatedAt, Expr::current_timestamp().into())
            .filter(ProdCol::Id.eq(product.id))
            .exec(&txn)
            .await?;
    }

    CheckoutLines::delete_many()
        .filter(LineCol::RegisterId.eq(register.as_str()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "receipt_finalize",
        "receipts",
        serde_json::json!({
            "receipt_id": receipt.id,
            "register_id": register.as_str(),
            "total_price": summary.totals.total_price,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Receipt created",
        FinalizedReceipt {
            receipt: receipt.into(),
            totals: summary.totals,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_receipts(
    state: &AppState,
    user: &AuthUser,
    query: ReceiptQuery,
) -> AppResult<ApiResponse<ReceiptList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Receipts::find().order_by_desc(ReceiptCol::CreatedAt);
    if let Some(register_id) = query.register_id.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(ReceiptCol::RegisterId.eq(register_id.clone()));
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items: Vec<Receipt> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Receipt::from)
        .collect();

    Ok(ApiResponse::success(
        "Receipts",
        ReceiptList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
