use clap::{Parser, Subcommand};

/// Command-line client for the route proxy
#[derive(Parser, Debug)]
#[command(name = "routeproxy")]
#[command(about = "Query a running route proxy", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Proxy base URL (overrides ROUTEPROXY_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Autocomplete a partial address
    Suggest(SuggestArgs),

    /// Resolve an address to coordinates
    Geocode(GeocodeArgs),

    /// Compute a driving route between two coordinate pairs
    Route(RouteArgs),

    /// Type two addresses, pick suggestions and compute the route
    Plan(PlanArgs),

    /// Check client configuration and proxy reachability
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct SuggestArgs {
    /// Text typed so far
    pub query: String,

    /// Proximity bias as "lon,lat"
    #[arg(long)]
    pub proximity: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GeocodeArgs {
    /// Free-text address
    pub location: String,
}

#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// Start as "lon,lat"
    #[arg(long, allow_hyphen_values = true)]
    pub from: String,

    /// End as "lon,lat"
    #[arg(long, allow_hyphen_values = true)]
    pub to: String,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Start address text
    pub from: String,

    /// End address text
    pub to: String,

    /// Suggestion index to pick for each field
    #[arg(long, default_value = "0")]
    pub pick: usize,

    /// Seconds to wait for suggestions per field
    #[arg(long, default_value = "10")]
    pub wait_secs: u64,
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Show the proxy's effective configuration as seen from this environment
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_accepts_negative_longitudes() {
        let cli = Cli::try_parse_from([
            "routeproxy",
            "route",
            "--from",
            "-4.02,5.32",
            "--to",
            "-3.98,5.35",
        ])
        .unwrap();

        match cli.command {
            Commands::Route(args) => {
                assert_eq!(args.from, "-4.02,5.32");
                assert_eq!(args.to, "-3.98,5.35");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "routeproxy",
            "suggest",
            "Abid",
            "--json",
            "--api-url",
            "http://localhost:5000",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:5000"));
    }

    #[test]
    fn test_plan_defaults() {
        let cli = Cli::try_parse_from(["routeproxy", "plan", "Plateau", "Cocody"]).unwrap();
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.pick, 0);
                assert_eq!(args.wait_secs, 10);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
