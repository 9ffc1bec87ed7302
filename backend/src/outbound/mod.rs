//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories, uniqueness claims, and schema
//!   migrations via Diesel.
//! - **queue**: PostgreSQL table queue plus shared queue naming and
//!   redelivery policy.
//! - **memory**: in-process store, queue, and claims.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod queue;
