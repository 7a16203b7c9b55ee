//! Error types shared by the query builder, the submission client and the
//! geocoder.

use std::path::PathBuf;
use thiserror::Error;

/// Raised while constructing a statement tree. Nothing is compiled when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{outer} cannot wrap {inner}; reference its result set with a set statement instead")]
    InvalidNesting {
        outer: &'static str,
        inner: &'static str,
    },

    #[error("setting 'out' must be one of xml, json, csv, not '{0}'")]
    InvalidOutputFormat(String),

    #[error("csv output format requires header options (i.e. which tags/headers to keep)")]
    MissingCsvOptions,

    #[error("{0} filter requires at least one id")]
    EmptyIdList(&'static str),

    #[error("{0} filter requires at least one coordinate")]
    EmptyRing(&'static str),

    #[error("{0} values must be finite numbers")]
    NonFinite(&'static str),
}

/// Network or IO failure reaching an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request to {endpoint} failed: {message}")]
pub struct TransportError {
    pub endpoint: String,
    pub message: String,
}

impl TransportError {
    pub fn new(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The status endpoint reported no free slots.
    #[error("query engine is rate limited:\n{body}")]
    RateLimited { body: String },

    /// Every probe round came back unavailable; `last` is the final round's cause.
    #[error(
        "query engine is not available for download after {attempts} attempt(s), please wait and try again"
    )]
    Unavailable {
        attempts: u32,
        #[source]
        last: Option<Box<SubmitError>>,
    },

    #[error("query engine error (status code {status}):\n{body}")]
    Engine { status: u16, body: String },

    #[error("failed to export response to {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubmitError {
    /// True when the engine was reachable but busy, i.e. retrying later may help.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            SubmitError::RateLimited { .. } => true,
            SubmitError::Unavailable { last: Some(last), .. } => last.is_rate_limited(),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode geocoder response: {0}")]
    Decode(String),

    #[error("could not find suitable polygon for input place name '{0}'")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}
