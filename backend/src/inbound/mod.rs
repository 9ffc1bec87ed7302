//! Inbound adapters that translate external input into domain service calls
//! while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`]; the queue polling loop that drives the
//! command consumer lives under [`queue`].

pub mod http;
pub mod queue;
