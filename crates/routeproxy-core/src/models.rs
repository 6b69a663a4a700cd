pub mod coords;
pub mod endpoint;
pub mod place;
pub mod route;

pub use coords::{parse_lng_lat, LngLat};
pub use endpoint::UpstreamEndpoint;
pub use place::{PlaceSuggestion, SuggestionQuery, MIN_QUERY_CHARS};
pub use route::RouteResult;
