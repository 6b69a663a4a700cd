//! routeproxy core - Domain models, error taxonomy, configuration and ports
//!
//! This crate contains the provider-independent pieces shared by the proxy
//! service, the upstream adapter and the client coordinator.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{ProxyError, Result};
