//! # OCPP webhook log receiver
//!
//! Receives webhook notifications about charging-station connectivity and
//! OCPP-J traffic and renders each one as a color-coded block on stdout.
//!
//! ## Architecture
//!
//! - **domain**: the inbound event record
//! - **support**: OCPP-J frame decoding, error types, shutdown signalling
//! - **application**: block rendering and the webhook service (clock → renderer → sink)
//! - **interfaces**: axum HTTP routes and middleware
//! - **server**: listener lifecycle, tracing and panic observer setup
//! - **config**: TOML configuration

pub mod application;
pub mod config;
pub mod domain;
pub mod interfaces;
pub mod server;
pub mod support;

pub use application::{Renderer, RenderOptions, ResponseColorPolicy, WebhookService};
pub use config::{default_config_path, AppConfig};
pub use domain::{EventKind, InboundEvent};
pub use support::ocpp_frame::{MessageKind, OcppMessage};
