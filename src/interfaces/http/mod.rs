//! HTTP interface
//!
//! - `webhook`: `POST /webhook`
//! - `health`: `GET /health`
//! - `metrics`: `GET /metrics` and request metrics middleware
//! - `request_id`: `X-Request-Id` propagation
//! - `router`: assembles routes and middleware

pub mod health;
pub mod metrics;
pub mod request_id;
pub mod router;
pub mod webhook;

pub use router::create_router;
