//! Diesel table definitions. Keep in step with `backend/migrations`.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lower-case.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        password_hash -> Varchar,
        /// `customer` or `admin`.
        role -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        price -> Numeric,
        image_url -> Nullable<Varchar>,
        category -> Nullable<Varchar>,
        stock -> Int4,
        low_stock_threshold -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Orders. Rows cascade away with their owning user.
    orders (id) {
        id -> Uuid,
        user_id -> Uuid,
        total_amount -> Numeric,
        /// One of the `OrderStatus` names, e.g. `pending` or `shipped`.
        status -> Varchar,
        /// Street, city, state, zip code and country joined with `", "`.
        shipping_address -> Text,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Order lines. `product_id` is a snapshot and carries no foreign key.
    order_items (id) {
        id -> Uuid,
        order_id -> Uuid,
        product_id -> Uuid,
        product_name -> Varchar,
        quantity -> Int4,
        price -> Numeric,
    }
}

diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_items -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(users, products, orders, order_items);
