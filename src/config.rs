// Command line arguments and endpoint resolution.

use clap::Parser;

/// Used for whichever endpoint is not given on the command line.
pub const DEFAULT_URL: &str = "http://localhost:8080";

/// Copy chart versions missing on a destination ChartMuseum from a source.
#[derive(Parser, Debug, Clone)]
#[command(name = "cm-sync", author, version, about)]
pub struct Cli {
    /// Source, a valid ChartMuseum URL
    #[arg(short, long, env = "CM_SYNC_SOURCE", value_name = "URL")]
    pub source: Option<String>,

    /// Destination, a valid ChartMuseum URL
    #[arg(short, long, env = "CM_SYNC_DESTINATION", value_name = "URL")]
    pub destination: Option<String>,

    /// Probe both servers and print what would be copied, without copying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// The two servers a run talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub source: String,
    pub destination: String,
}

impl Endpoints {
    /// Fill in the default for a missing side. Returns `None` when neither
    /// side was given: there is nothing meaningful to sync then.
    pub fn resolve(source: Option<String>, destination: Option<String>) -> Option<Self> {
        match (source, destination) {
            (None, None) => None,
            (source, destination) => Some(Endpoints {
                source: source.unwrap_or_else(|| DEFAULT_URL.to_string()),
                destination: destination.unwrap_or_else(|| DEFAULT_URL.to_string()),
            }),
        }
    }
}

impl Cli {
    pub fn endpoints(&self) -> Option<Endpoints> {
        Endpoints::resolve(self.source.clone(), self.destination.clone())
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
