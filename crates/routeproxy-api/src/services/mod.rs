mod geocode;
mod route;
mod suggestions;

pub use geocode::GeocodeService;
pub use route::RouteService;
pub use suggestions::SuggestionService;
