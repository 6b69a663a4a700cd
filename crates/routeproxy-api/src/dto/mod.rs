mod request;
mod response;

pub use request::{GeocodeRequest, RouteRequest, SuggestionRequest};
pub use response::{GeocodeResponse, HealthResponse, RouteResponse};
