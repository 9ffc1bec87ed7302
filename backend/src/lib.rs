//! Roster: organization and user directory with a queued command pipeline.
//!
//! Hexagonal layout: [`domain`] holds aggregates, ports and services;
//! [`inbound`] adapts HTTP and queue deliveries onto the driving ports;
//! [`outbound`] implements the driven ports for PostgreSQL and in-memory use.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
