//! Sale transaction behaviour against a real SQLite database.

mod common;

use common::*;
use stockbook_core::{
    CoreError, ErrorKind, MovementReason, MovementType, NewCustomer, PaymentMethod, ProductUpdate,
};
use stockbook_db::LedgerError;

#[tokio::test]
async fn test_sale_decrements_stock_and_records_movement() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA-330", "10.00", 5).await;

    let done = db
        .processor()
        .process_sale(sale(&store.id).with_item(&cola.id, units(3), money("10.00")))
        .await
        .unwrap();

    assert_eq!(done.sale.total.to_string(), "30.00");
    assert_eq!(done.sale.subtotal, money("30.00"));
    assert_eq!(done.items.len(), 1);
    assert_eq!(done.items[0].sku_snapshot, "COLA-330");
    assert_eq!(done.items[0].line_total, money("30.00"));

    assert_eq!(done.movements.len(), 1);
    let out = &done.movements[0];
    assert_eq!(out.movement_type, MovementType::Out);
    assert_eq!(out.reason, MovementReason::Sale);
    assert_eq!(out.quantity.to_string(), "3.000");
    assert_eq!(out.reference_id.as_deref(), Some(done.sale.id.as_str()));

    assert_eq!(stock_of(&db, &store.id, &cola.id).await.to_string(), "2.000");
    assert_eq!(count(&db, "inventory_movements").await, 1);
}

#[tokio::test]
async fn test_sale_is_readable_afterwards() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "2.50", 10).await;
    let chips = add_product(&db, &store.id, "CHIPS", "1.25", 10).await;

    let done = db
        .processor()
        .process_sale(
            sale(&store.id)
                .with_item(&cola.id, units(2), money("2.50"))
                .with_item(&chips.id, units(1), money("1.25")),
        )
        .await
        .unwrap();

    let sales = db.sales();
    let header = sales.get(&store.id, &done.sale.id).await.unwrap().unwrap();
    assert_eq!(header, done.sale);

    let by_receipt = sales
        .get_by_receipt(&store.id, &done.sale.receipt_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_receipt.id, done.sale.id);

    let items = sales.items(&store.id, &done.sale.id).await.unwrap();
    assert_eq!(items, done.items);

    let movements = db
        .movements()
        .for_reference(&store.id, &done.sale.id)
        .await
        .unwrap();
    assert_eq!(movements, done.movements);

    let today = done.sale.created_at.date_naive();
    let listed = sales.list_for_date(&store.id, today).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_duplicate_lines_are_summed_against_stock() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "10.00", 5).await;

    let err = db
        .processor()
        .process_sale(
            sale(&store.id)
                .with_item(&cola.id, units(3), money("10.00"))
                .with_item(&cola.id, units(3), money("10.00")),
        )
        .await
        .unwrap_err();

    match err {
        LedgerError::Core(CoreError::InsufficientStock {
            product_id,
            available,
            requested,
            ..
        }) => {
            assert_eq!(product_id, cola.id);
            assert_eq!(available, units(5));
            assert_eq!(requested, units(6));
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(stock_of(&db, &store.id, &cola.id).await, units(5));
    assert_eq!(count(&db, "sales").await, 0);
}

#[tokio::test]
async fn test_duplicate_lines_within_stock_keep_separate_items() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "10.00", 5).await;

    let done = db
        .processor()
        .process_sale(
            sale(&store.id)
                .with_item(&cola.id, units(2), money("10.00"))
                .with_item(&cola.id, units(2), money("9.00")),
        )
        .await
        .unwrap();

    assert_eq!(done.items.len(), 2);
    assert_eq!(done.movements.len(), 2);
    assert_eq!(done.sale.total, money("38.00"));
    assert_eq!(stock_of(&db, &store.id, &cola.id).await, units(1));
}

#[tokio::test]
async fn test_short_line_rolls_back_whole_cart() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let plenty = add_product(&db, &store.id, "A-PLENTY", "1.00", 100).await;
    let scarce = add_product(&db, &store.id, "Z-SCARCE", "1.00", 1).await;

    let err = db
        .processor()
        .process_sale(
            sale(&store.id)
                .with_item(&plenty.id, units(10), money("1.00"))
                .with_item(&scarce.id, units(2), money("1.00")),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(
        err.report().message,
        "Insufficient stock for Z-SCARCE: available 1.000, requested 2.000"
    );

    assert_eq!(stock_of(&db, &store.id, &plenty.id).await, units(100));
    assert_eq!(stock_of(&db, &store.id, &scarce.id).await, units(1));
    assert_eq!(count(&db, "sales").await, 0);
    assert_eq!(count(&db, "sale_items").await, 0);
    assert_eq!(count(&db, "inventory_movements").await, 0);
}

#[tokio::test]
async fn test_fractional_quantities_round_half_even() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cheese = add_product(&db, &store.id, "CHEESE", "12.50", 10).await;

    // 0.250 kg × 12.50 = 3.125 → 3.12
    let done = db
        .processor()
        .process_sale(sale(&store.id).with_item(&cheese.id, "0.250".parse().unwrap(), money("12.50")))
        .await
        .unwrap();

    assert_eq!(done.items[0].line_total, money("3.12"));
    assert_eq!(stock_of(&db, &store.id, &cheese.id).await.to_string(), "9.750");
}

#[tokio::test]
async fn test_discount_and_tax_shape_total() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "10.00", 5).await;

    let mut request = sale(&store.id).with_item(&cola.id, units(3), money("10.00"));
    request.discount = money("5.00");
    request.tax = money("2.50");
    request.payment_method = PaymentMethod::Card;

    let done = db.processor().process_sale(request).await.unwrap();

    assert_eq!(done.sale.subtotal, money("30.00"));
    assert_eq!(done.sale.total, money("27.50"));
    assert_eq!(done.sale.payment_method, PaymentMethod::Card);
}

#[tokio::test]
async fn test_receipt_numbers_follow_daily_sequence() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "1.00", 10).await;

    let processor = db.processor();
    let first = processor
        .process_sale(sale(&store.id).with_item(&cola.id, units(1), money("1.00")))
        .await
        .unwrap();
    let second = processor
        .process_sale(sale(&store.id).with_item(&cola.id, units(1), money("1.00")))
        .await
        .unwrap();

    let prefix = first.sale.created_at.format("%Y%m%d").to_string();
    assert_eq!(first.sale.receipt_number, format!("{prefix}-0001"));
    assert!(second.sale.receipt_number.ends_with("-0002"));
}

#[tokio::test]
async fn test_invalid_cart_is_rejected_before_storage() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "1.00", 10).await;

    let empty = db.processor().process_sale(sale(&store.id)).await.unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::InvalidRequest);

    let zero = db
        .processor()
        .process_sale(sale(&store.id).with_item(&cola.id, units(0), money("1.00")))
        .await
        .unwrap_err();
    assert_eq!(zero.kind(), ErrorKind::InvalidRequest);

    let mut over_discounted = sale(&store.id).with_item(&cola.id, units(1), money("1.00"));
    over_discounted.discount = money("2.00");
    let err = db.processor().process_sale(over_discounted).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    assert_eq!(count(&db, "sales").await, 0);
}

#[tokio::test]
async fn test_missing_and_foreign_products_are_not_found() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let other = open_store(&db, OWNER, "Second Branch").await;
    let foreign = add_product(&db, &other.id, "COLA", "1.00", 10).await;

    let missing = db
        .processor()
        .process_sale(sale(&store.id).with_item("no-such-product", units(1), money("1.00")))
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let cross_tenant = db
        .processor()
        .process_sale(sale(&store.id).with_item(&foreign.id, units(1), money("1.00")))
        .await
        .unwrap_err();
    assert_eq!(cross_tenant.kind(), ErrorKind::NotFound);
    assert_eq!(stock_of(&db, &other.id, &foreign.id).await, units(10));
}

#[tokio::test]
async fn test_inactive_product_is_invalid() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "1.00", 10).await;
    db.products().set_active(&store.id, &cola.id, false).await.unwrap();

    let err = db
        .processor()
        .process_sale(sale(&store.id).with_item(&cola.id, units(1), money("1.00")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(stock_of(&db, &store.id, &cola.id).await, units(10));
}

#[tokio::test]
async fn test_unknown_store_and_customer_are_not_found() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "1.00", 10).await;

    let no_store = db
        .processor()
        .process_sale(sale("no-such-store").with_item(&cola.id, units(1), money("1.00")))
        .await
        .unwrap_err();
    assert_eq!(no_store.kind(), ErrorKind::NotFound);

    let mut with_customer = sale(&store.id).with_item(&cola.id, units(1), money("1.00"));
    with_customer.customer_id = Some("no-such-customer".to_string());
    let no_customer = db.processor().process_sale(with_customer).await.unwrap_err();
    assert_eq!(no_customer.kind(), ErrorKind::NotFound);

    let customer = db
        .customers()
        .create(&NewCustomer {
            store_id: store.id.clone(),
            name: "Ayesha".to_string(),
            phone: None,
            email: None,
        })
        .await
        .unwrap();
    let mut known = sale(&store.id).with_item(&cola.id, units(1), money("1.00"));
    known.customer_id = Some(customer.id.clone());
    let done = db.processor().process_sale(known).await.unwrap();
    assert_eq!(done.sale.customer_id, Some(customer.id));
}

#[tokio::test]
async fn test_catalogue_changes_never_touch_stock() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "1.00", 10).await;

    let updated = db
        .products()
        .update_details(
            &store.id,
            &cola.id,
            &ProductUpdate {
                selling_price: Some(money("1.20")),
                min_stock_level: Some(units(3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.selling_price, money("1.20"));
    assert_eq!(updated.stock, units(10));
    assert_eq!(updated.name, cola.name);
}

#[tokio::test]
async fn test_ledger_rows_are_append_only() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let cola = add_product(&db, &store.id, "COLA", "1.00", 10).await;
    let done = db
        .processor()
        .process_sale(sale(&store.id).with_item(&cola.id, units(1), money("1.00")))
        .await
        .unwrap();

    let update_sale = sqlx::query("UPDATE sales SET total = 0 WHERE id = ?1")
        .bind(&done.sale.id)
        .execute(db.pool())
        .await;
    assert!(update_sale.is_err());

    let delete_item = sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
        .bind(&done.sale.id)
        .execute(db.pool())
        .await;
    assert!(delete_item.is_err());

    let update_movement = sqlx::query("UPDATE inventory_movements SET quantity = 1")
        .execute(db.pool())
        .await;
    assert!(update_movement.is_err());

    let delete_product = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(&cola.id)
        .execute(db.pool())
        .await;
    assert!(delete_product.is_err());

    assert_eq!(count(&db, "inventory_movements").await, 1);
}
