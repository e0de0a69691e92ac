// Error types shared by the HTTP client and the sync engine.

use reqwest::StatusCode;
use std::error::Error as StdError;
use thiserror::Error;

/// Failure talking to a single ChartMuseum endpoint.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or no response came back.
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The connection broke while the response body was being read.
    #[error("reading response body from {url} failed")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status code {status} from {url}")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("error decoding JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing '{field}' key in JSON from {url}")]
    Schema { url: String, field: &'static str },
}

/// Per-item failure inside the transfer loop. These never abort a run.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("failed to fetch {chart}-{version} from {server}")]
    Fetch {
        chart: String,
        version: String,
        server: String,
        #[source]
        cause: ApiError,
    },

    #[error("failed to read {chart}-{version} from {server}")]
    Read {
        chart: String,
        version: String,
        server: String,
        #[source]
        cause: ApiError,
    },

    #[error("failed to sync {chart}-{version} to {server}")]
    Upload {
        chart: String,
        version: String,
        server: String,
        #[source]
        cause: ApiError,
    },
}

impl TransferError {
    /// `chart-version` label of the item that failed.
    pub fn item(&self) -> String {
        match self {
            TransferError::Fetch { chart, version, .. }
            | TransferError::Read { chart, version, .. }
            | TransferError::Upload { chart, version, .. } => format!("{}-{}", chart, version),
        }
    }
}

/// Errors that stop a sync before any archive is transferred.
#[derive(Error, Debug)]
pub enum SyncError {
    /// At least one of the two listings failed. Both outcomes are kept so
    /// they can be reported together.
    #[error("error fetching charts: {}", describe_listing(.source_listing, .destination_listing))]
    Listing {
        source_listing: Option<ApiError>,
        destination_listing: Option<ApiError>,
    },
}

/// `err` followed by each of its sources, on one line. Used where the
/// error is logged or embedded rather than printed by anyhow.
pub fn chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        next = cause.source();
    }
    out
}

fn describe_listing(source: &Option<ApiError>, destination: &Option<ApiError>) -> String {
    let side = |label: &str, err: &Option<ApiError>| match err {
        Some(e) => format!("{}: {}", label, chain(e)),
        None => format!("{}: ok", label),
    };
    format!("{}; {}", side("source", source), side("destination", destination))
}
