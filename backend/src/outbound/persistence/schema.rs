//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly.

diesel::table! {
    /// Organizations keyed by `org_id`. `name` carries a non-unique index.
    organizations (org_id) {
        org_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    /// Users keyed by `user_id`. `org_id` and `email` carry non-unique indexes.
    users (user_id) {
        user_id -> Text,
        org_id -> Text,
        name -> Text,
        email -> Text,
    }
}

diesel::table! {
    /// Durable command queue. One row per message; a row is hidden from
    /// receivers until `visible_at` and is retired by deletion or by setting
    /// `dead_lettered_at`.
    command_messages (id) {
        id -> Int8,
        queue_name -> Text,
        body -> Text,
        receive_count -> Int4,
        visible_at -> Timestamptz,
        enqueued_at -> Timestamptz,
        dead_lettered_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Strict-mode uniqueness claims.
    uniqueness_claims (kind, value) {
        kind -> Text,
        value -> Text,
        owner_id -> Text,
    }
}
