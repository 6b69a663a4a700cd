//! routeproxy provider - Upstream mapping provider adapters
//!
//! This crate implements the [`MapProvider`](routeproxy_core::ports::MapProvider)
//! port against the Mapbox geocoding and directions REST APIs.

mod dto;
pub mod mapbox;

pub use mapbox::{MapboxConfig, MapboxProvider};
