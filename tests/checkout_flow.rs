mod common;

use common::{create_product, create_user, database_url, setup_state, unique};
use retail_backend::{
    dto::{
        auth::{CustomerLoginRequest, RegisterRequest},
        checkout::CreateCheckoutLineRequest,
        products::CreateProductRequest,
        roles::AssignRoleRequest,
    },
    error::AppError,
    middleware::register::RegisterId,
    routes::params::ReceiptQuery,
    services::{auth_service, checkout_service, product_service, role_service},
};

fn register() -> RegisterId {
    RegisterId(format!("kassa-{}", unique()))
}

fn receipts_of(register: &RegisterId) -> ReceiptQuery {
    ReceiptQuery {
        register_id: Some(register.as_str().to_string()),
        ..Default::default()
    }
}

// Scan the same barcode twice, then finalize: one line of two, one receipt, stock moved.
#[tokio::test]
async fn scan_merge_and_finalize() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "kassamedewerker").await?;
    let product = create_product(&state, "Ficus Benjamina", 1499, 5).await?;
    let till = register();

    checkout_service::scan_barcode(&state, &cashier, &till, &product.barcode).await?;
    checkout_service::scan_barcode(&state, &cashier, &till, &product.barcode).await?;

    let lines = checkout_service::list_lines(&state, &cashier, &till)
        .await?
        .data
        .expect("lines")
        .items;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].article_number, product.article_number);

    let finalized = checkout_service::finalize_receipt(&state, &cashier, &till)
        .await?
        .data
        .expect("receipt");
    assert_eq!(finalized.totals.total_quantity, 2);
    assert_eq!(finalized.totals.total_price, 2 * 1499);
    assert!(finalized.receipt.data.contains("Cashier Number: K"));
    assert!(finalized.receipt.data.contains("Ficus Benjamina"));

    let stock = product_service::get_product(&state, product.id)
        .await?
        .data
        .expect("product")
        .product
        .stock;
    assert_eq!(stock, 3);

    let lines = checkout_service::list_lines(&state, &cashier, &till)
        .await?
        .data
        .expect("lines")
        .items;
    assert!(lines.is_empty());

    let receipts = checkout_service::list_receipts(&state, &cashier, receipts_of(&till))
        .await?
        .data
        .expect("receipts")
        .items;
    assert_eq!(receipts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_barcode_leaves_cart_untouched() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "staff").await?;
    let till = register();

    let result = checkout_service::scan_barcode(&state, &cashier, &till, "0000000000000").await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let lines = checkout_service::list_lines(&state, &cashier, &till)
        .await?
        .data
        .expect("lines")
        .items;
    assert!(lines.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_cart_cannot_be_finalized() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "staff").await?;

    let result = checkout_service::finalize_receipt(&state, &cashier, &register()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    Ok(())
}

// Selling the last unit succeeds; selling past zero rolls everything back.
#[tokio::test]
async fn stock_may_reach_zero_but_not_below() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "staff").await?;
    let product = create_product(&state, "Lavendel", 399, 2).await?;
    let till = register();

    let line = |quantity| CreateCheckoutLineRequest {
        article_number: product.article_number,
        name: product.name.clone(),
        price: product.price,
        quantity: Some(quantity),
    };

    checkout_service::add_line(&state, &cashier, &till, line(2)).await?;
    checkout_service::finalize_receipt(&state, &cashier, &till).await?;

    let stock = product_service::get_product(&state, product.id)
        .await?
        .data
        .expect("product")
        .product
        .stock;
    assert_eq!(stock, 0);

    checkout_service::add_line(&state, &cashier, &till, line(1)).await?;
    let result = checkout_service::finalize_receipt(&state, &cashier, &till).await;
    assert!(matches!(
        result,
        Err(AppError::OutOfStock { article_number }) if article_number == product.article_number
    ));

    let lines = checkout_service::list_lines(&state, &cashier, &till)
        .await?
        .data
        .expect("lines")
        .items;
    assert_eq!(lines.len(), 1);

    let receipts = checkout_service::list_receipts(&state, &cashier, receipts_of(&till))
        .await?
        .data
        .expect("receipts")
        .items;
    assert_eq!(receipts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn registers_do_not_share_carts() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "staff").await?;
    let product = create_product(&state, "Monstera", 2495, 10).await?;
    let (first, second) = (register(), register());

    checkout_service::scan_barcode(&state, &cashier, &first, &product.barcode).await?;

    let other = checkout_service::list_lines(&state, &cashier, &second)
        .await?
        .data
        .expect("lines")
        .items;
    assert!(other.is_empty());

    let cleared = checkout_service::clear_cart(&state, &cashier, &first)
        .await?
        .data
        .expect("cleared");
    assert_eq!(cleared.removed, 1);
    Ok(())
}

#[tokio::test]
async fn cashier_number_follows_role() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let user = create_user(&state, "medewerker", "staff").await?;
    let admin = common::admin();

    let promoted = role_service::assign_role(
        &state,
        &admin,
        user.user_id,
        AssignRoleRequest {
            name: "kassamedewerker".into(),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(
        promoted.user.cashier_number,
        Some(format!("K{:04}", user.user_id))
    );

    let reverted = role_service::assign_role(
        &state,
        &admin,
        user.user_id,
        AssignRoleRequest {
            name: "staff".into(),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(reverted.user.cashier_number, None);
    assert_eq!(reverted.role.map(|r| r.name), Some("staff".to_string()));
    Ok(())
}

#[tokio::test]
async fn registration_assigns_customer_number() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;

    let user = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Sanne".into(),
            last_name: "de Vries".into(),
            email: format!("Sanne{}@Example.com", unique()),
            password: "geheim123".into(),
            password_confirmation: "geheim123".into(),
            city: None,
            phone: None,
            birthday: None,
        },
    )
    .await?
    .data
    .expect("user");

    let number = user.customer_number.expect("customer number");
    assert_eq!(number.len(), 8);
    assert!(number.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(user.email, user.email.to_lowercase());

    let login = auth_service::login_customer(
        &state,
        CustomerLoginRequest {
            customer_number: number,
            password: "geheim123".into(),
        },
    )
    .await?
    .data
    .expect("token");
    assert_eq!(login.token_type, "Bearer");
    Ok(())
}

#[tokio::test]
async fn remove_line_is_scoped_to_the_register() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "staff").await?;
    let ficus = create_product(&state, "Ficus", 1499, 10).await?;
    let cactus = create_product(&state, "Cactus", 599, 10).await?;
    let (mine, other) = (register(), register());

    checkout_service::scan_barcode(&state, &cashier, &mine, &ficus.barcode).await?;
    checkout_service::scan_barcode(&state, &cashier, &mine, &cactus.barcode).await?;
    checkout_service::scan_barcode(&state, &cashier, &other, &ficus.barcode).await?;

    let own_lines = checkout_service::list_lines(&state, &cashier, &mine)
        .await?
        .data
        .expect("lines")
        .items;
    let other_line = checkout_service::list_lines(&state, &cashier, &other)
        .await?
        .data
        .expect("lines")
        .items
        .remove(0);

    let removed = checkout_service::remove_line(&state, &cashier, &mine, own_lines[0].id)
        .await?
        .data
        .expect("line");
    assert_eq!(removed.id, own_lines[0].id);
    let left = checkout_service::list_lines(&state, &cashier, &mine)
        .await?
        .data
        .expect("lines")
        .items;
    assert_eq!(left.len(), 1);
    assert_ne!(left[0].id, removed.id);

    let result = checkout_service::remove_line(&state, &cashier, &mine, other_line.id).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    let still_there = checkout_service::list_lines(&state, &cashier, &other)
        .await?
        .data
        .expect("lines")
        .items;
    assert_eq!(still_there.len(), 1);
    assert_eq!(still_there[0].id, other_line.id);

    let result = checkout_service::remove_line(&state, &cashier, &mine, i32::MAX).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn padded_barcode_is_stored_trimmed() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url).await?;
    let cashier = create_user(&state, "kassa", "staff").await?;
    let n = unique();
    let code = format!("98{:011}", n);

    let product = product_service::create_product(
        &state,
        &cashier,
        CreateProductRequest {
            article_number: 40_000_000_000 + i64::from(n),
            name: "Aloe Vera".into(),
            description: "Vetplant".into(),
            price: 899,
            image: None,
            color: None,
            height_cm: None,
            width_cm: None,
            depth_cm: None,
            weight_gr: None,
            barcode: format!("  {code} "),
            stock: 3,
        },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(product.barcode, code);

    let scanned = checkout_service::scan_barcode(&state, &cashier, &register(), &code)
        .await?
        .data
        .expect("product");
    assert_eq!(scanned.id, product.id);
    Ok(())
}
