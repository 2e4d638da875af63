//! Column lists for `SELECT` and `RETURNING` clauses.
//!
//! Each macro expands to a string literal so queries can be assembled with
//! `concat!` at compile time. Order matches the field order of the
//! corresponding `FromRow` struct in stockbook-core.

macro_rules! product_columns {
    () => {
        "id, store_id, sku, barcode, name, description, selling_price, purchase_price, \
         stock, initial_stock, min_stock_level, is_active, created_at, updated_at"
    };
}

macro_rules! sale_columns {
    () => {
        "id, store_id, cashier_id, receipt_number, customer_id, subtotal, discount, tax, \
         total, payment_method, status, notes, created_at"
    };
}

macro_rules! sale_item_columns {
    () => {
        "id, sale_id, product_id, sku_snapshot, name_snapshot, quantity, unit_price, \
         line_total, created_at"
    };
}

macro_rules! movement_columns {
    () => {
        "id, store_id, product_id, movement_type, quantity, reason, reference_id, note, \
         actor_id, created_at"
    };
}

macro_rules! cash_flow_columns {
    () => {
        "id, store_id, flow_type, amount, payment_status, category, description, \
         customer_id, product_id, entry_date, created_by, created_at"
    };
}

macro_rules! customer_columns {
    () => {
        "id, store_id, name, phone, email, created_at"
    };
}

macro_rules! store_columns {
    () => {
        "id, owner_id, name, address, is_active, created_at, updated_at"
    };
}

macro_rules! user_columns {
    () => {
        "id, store_id, name, email, role, is_active, created_at"
    };
}

macro_rules! plan_columns {
    () => {
        "id, name, max_stores, max_users, price, is_active"
    };
}

macro_rules! subscription_columns {
    () => {
        "id, owner_id, plan_id, status, started_at, expires_at, created_at, updated_at"
    };
}
