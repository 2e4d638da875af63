//! Catalogue management, customers and tenant isolation.

mod common;

use common::*;
use stockbook_core::{ErrorKind, Money, NewCustomer, NewProduct, ProductUpdate};

fn product_input(store_id: &str, sku: &str, name: &str, barcode: Option<&str>) -> NewProduct {
    NewProduct {
        store_id: store_id.to_string(),
        sku: sku.to_string(),
        barcode: barcode.map(str::to_string),
        name: name.to_string(),
        description: None,
        selling_price: money("2.50"),
        purchase_price: money("1.20"),
        initial_stock: units(10),
        min_stock_level: units(2),
    }
}

#[tokio::test]
async fn test_create_product_sets_stock_from_initial() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;

    let product = db
        .products()
        .create(&product_input(&store.id, "  TEA-100 ", " Green Tea ", Some("4006381333931")))
        .await
        .unwrap();

    assert_eq!(product.sku, "TEA-100");
    assert_eq!(product.name, "Green Tea");
    assert_eq!(product.stock, units(10));
    assert_eq!(product.initial_stock, units(10));
    assert!(product.is_active);

    let by_sku = db.products().get_by_sku(&store.id, "TEA-100").await.unwrap();
    assert_eq!(by_sku.as_ref().map(|p| &p.id), Some(&product.id));

    let by_barcode = db.products().get_by_barcode(&store.id, "4006381333931").await.unwrap();
    assert_eq!(by_barcode.map(|p| p.id), Some(product.id));
}

#[tokio::test]
async fn test_duplicate_sku_or_barcode_is_rejected() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let products = db.products();

    products
        .create(&product_input(&store.id, "TEA-100", "Green Tea", Some("11112222")))
        .await
        .unwrap();

    let same_sku = products
        .create(&product_input(&store.id, "TEA-100", "Black Tea", None))
        .await
        .unwrap_err();
    assert_eq!(same_sku.kind(), ErrorKind::InvalidRequest);
    assert!(same_sku.to_string().contains("sku"), "{same_sku}");

    let same_barcode = products
        .create(&product_input(&store.id, "TEA-200", "Black Tea", Some("11112222")))
        .await
        .unwrap_err();
    assert_eq!(same_barcode.kind(), ErrorKind::InvalidRequest);
    assert!(same_barcode.to_string().contains("barcode"), "{same_barcode}");

    assert_eq!(count(&db, "products").await, 1);
}

#[tokio::test]
async fn test_same_sku_is_allowed_in_another_store() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let other = open_store(&db, OWNER, "Airport").await;

    let here = add_product(&db, &store.id, "TEA-100", "2.50", 1).await;
    let there = add_product(&db, &other.id, "TEA-100", "3.00", 1).await;

    assert_ne!(here.id, there.id);
    assert_eq!(db.products().get(&store.id, &there.id).await.unwrap(), None);
    assert_eq!(
        db.products().get_by_sku(&other.id, "TEA-100").await.unwrap().map(|p| p.id),
        Some(there.id)
    );
}

#[tokio::test]
async fn test_product_needs_an_active_store() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;

    let missing = db
        .products()
        .create(&product_input("no-such-store", "TEA-100", "Green Tea", None))
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    db.tenancy().deactivate_store(&store.id).await.unwrap();
    let closed = db
        .products()
        .create(&product_input(&store.id, "TEA-100", "Green Tea", None))
        .await
        .unwrap_err();
    assert_eq!(closed.kind(), ErrorKind::NotFound);

    let invalid = db
        .products()
        .create(&product_input(&store.id, "bad sku!", "Green Tea", None))
        .await
        .unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_search_matches_name_sku_and_barcode() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let products = db.products();

    products
        .create(&product_input(&store.id, "TEA-100", "Green Tea", Some("5000111")))
        .await
        .unwrap();
    products
        .create(&product_input(&store.id, "COF-1", "Arabica Coffee", Some("7000222")))
        .await
        .unwrap();
    let hidden = products
        .create(&product_input(&store.id, "TEA-OLD", "Old Tea", None))
        .await
        .unwrap();
    products.set_active(&store.id, &hidden.id, false).await.unwrap();

    let names = |found: Vec<stockbook_core::Product>| -> Vec<String> {
        found.into_iter().map(|p| p.name).collect()
    };

    assert_eq!(names(products.search(&store.id, "tea", 10).await.unwrap()), vec!["Green Tea"]);
    assert_eq!(names(products.search(&store.id, "COF", 10).await.unwrap()), vec!["Arabica Coffee"]);
    assert_eq!(names(products.search(&store.id, "7000", 10).await.unwrap()), vec!["Arabica Coffee"]);
    assert_eq!(
        names(products.search(&store.id, "", 10).await.unwrap()),
        vec!["Arabica Coffee", "Green Tea"]
    );
    assert_eq!(products.search(&store.id, "", 1).await.unwrap().len(), 1);

    // LIKE wildcards in the query are literal.
    assert!(products.search(&store.id, "%", 10).await.unwrap().is_empty());

    assert_eq!(products.list(&store.id, false).await.unwrap().len(), 2);
    assert_eq!(products.list(&store.id, true).await.unwrap().len(), 3);
    assert_eq!(products.count_active(&store.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_update_details_keeps_unset_fields() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let tea = db
        .products()
        .create(&product_input(&store.id, "TEA-100", "Green Tea", Some("5000111")))
        .await
        .unwrap();

    let updated = db
        .products()
        .update_details(
            &store.id,
            &tea.id,
            &ProductUpdate {
                selling_price: Some(money("2.75")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.selling_price, money("2.75"));
    assert_eq!(updated.name, "Green Tea");
    assert_eq!(updated.barcode.as_deref(), Some("5000111"));
    assert_eq!(updated.stock, tea.stock);

    let foreign = open_store(&db, OWNER, "Airport").await;
    let err = db
        .products()
        .update_details(&foreign.id, &tea.id, &ProductUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_customers_are_store_scoped() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let other = open_store(&db, OWNER, "Airport").await;
    let customers = db.customers();

    let zara = customers
        .create(&NewCustomer {
            store_id: store.id.clone(),
            name: "Zara".to_string(),
            phone: Some("0300-1234567".to_string()),
            email: None,
        })
        .await
        .unwrap();
    customers
        .create(&NewCustomer {
            store_id: store.id.clone(),
            name: "Adam".to_string(),
            phone: None,
            email: Some("adam@example.com".to_string()),
        })
        .await
        .unwrap();

    let listed: Vec<String> = customers
        .list(&store.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(listed, vec!["Adam", "Zara"]);

    assert_eq!(customers.get(&store.id, &zara.id).await.unwrap(), Some(zara.clone()));
    assert_eq!(customers.get(&other.id, &zara.id).await.unwrap(), None);
    assert!(customers.list(&other.id).await.unwrap().is_empty());

    let orphan = customers
        .create(&NewCustomer {
            store_id: "no-such-store".to_string(),
            name: "Ghost".to_string(),
            phone: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(orphan.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_sales_are_invisible_across_stores() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let other = open_store(&db, OWNER, "Airport").await;
    let tea = add_product(&db, &store.id, "TEA-100", "2.50", 10).await;

    let done = db
        .processor()
        .process_sale(sale(&store.id).with_item(&tea.id, units(1), money("2.50")))
        .await
        .unwrap();

    let sales = db.sales();
    assert!(sales.get(&store.id, &done.sale.id).await.unwrap().is_some());
    assert_eq!(sales.get(&other.id, &done.sale.id).await.unwrap(), None);
    assert!(sales.items(&other.id, &done.sale.id).await.unwrap().is_empty());
    assert!(db.movements().for_reference(&other.id, &done.sale.id).await.unwrap().is_empty());

    // Selling another store's product is reported as missing.
    let err = db
        .processor()
        .process_sale(sale(&other.id).with_item(&tea.id, units(1), money("2.50")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(stock_of(&db, &store.id, &tea.id).await, units(9));
    assert_eq!(done.sale.total, money("2.50"));
    assert_ne!(done.sale.total, Money::zero());
}
