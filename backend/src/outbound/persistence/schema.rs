//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Catalogue values
//! (city, colour, size, label) are stored as their SCREAMING_SNAKE_CASE
//! names in `TEXT` columns.

diesel::table! {
    /// Physical locations, unique on (city, street, house).
    addresses (id) {
        id -> Int8,
        city -> Text,
        street -> Text,
        house -> Int4,
    }
}

diesel::table! {
    /// Warehouses. `id` is also a foreign key to `addresses.id`.
    storages (id) {
        id -> Int8,
    }
}

diesel::table! {
    /// Rentable bikes; `storage_id` is the owning side of storage → bikes.
    bikes (id) {
        id -> Int8,
        color -> Text,
        size -> Text,
        label -> Text,
        available -> Bool,
        storage_id -> Int8,
    }
}

diesel::table! {
    /// Customers, unique on email.
    clients (id) {
        id -> Int8,
        email -> Text,
        name -> Text,
    }
}

diesel::table! {
    /// Remarks about clients.
    comments (id) {
        id -> Int8,
        client_id -> Int8,
        description -> Text,
    }
}

diesel::table! {
    /// Rental transactions.
    orders (id) {
        id -> Int8,
        client_id -> Int8,
        storage_id -> Int8,
    }
}

diesel::table! {
    /// Join table for the many-to-many bike ↔ order association.
    bike_orders (bike_id, order_id) {
        bike_id -> Int8,
        order_id -> Int8,
    }
}

diesel::joinable!(storages -> addresses (id));
diesel::joinable!(bikes -> storages (storage_id));
diesel::joinable!(comments -> clients (client_id));
diesel::joinable!(orders -> clients (client_id));
diesel::joinable!(orders -> storages (storage_id));
diesel::joinable!(bike_orders -> bikes (bike_id));
diesel::joinable!(bike_orders -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    addresses,
    storages,
    bikes,
    clients,
    comments,
    orders,
    bike_orders,
);
