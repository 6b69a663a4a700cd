use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream provider API an outbound call was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamEndpoint {
    Suggestions,
    Geocode,
    Directions,
}

impl UpstreamEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamEndpoint::Suggestions => "suggestions",
            UpstreamEndpoint::Geocode => "geocode",
            UpstreamEndpoint::Directions => "directions",
        }
    }
}

impl fmt::Display for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
