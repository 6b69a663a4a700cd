mod geocode;
mod health;
mod route;
mod suggestions;

pub use geocode::geocode;
pub use health::health_check;
pub use route::route;
pub use suggestions::suggestions;
