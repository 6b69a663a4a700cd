//! Client-side request coordination for the route proxy
//!
//! [`RequestCoordinator`] owns the address-field state machine: it debounces
//! keystrokes, keeps at most one suggestion request in flight per field and
//! drops results whose request was superseded. Rendering code observes
//! [`UiState`] snapshots through [`RequestCoordinator::subscribe`].

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod state;

pub use api::{HealthStatus, HttpProxyApi, ProxyApi, RouteSummary};
pub use config::ClientConfig;
pub use coordinator::{CoordinatorConfig, RequestCoordinator};
pub use error::{ClientError, Result};
pub use state::{Field, FieldState, Notice, Phase, RouteView, UiState};
