//! Overpass QL query builder and submission client.
//!
//! Queries are assembled from typed statements in [`query`], each compiled
//! to its text form when constructed. [`client::Client`] submits the final
//! [`query::Sequence`], waiting out rate limiting for a bounded number of
//! rounds. [`presets`] builds the usual street-network queries from an area.

pub mod client;
pub mod config;
pub mod dsl;
pub mod error;
pub mod geocode;
pub mod presets;
pub mod query;
mod utils;

pub use client::{Client, HttpTransport, Transport};
pub use config::ClientConfig;
pub use error::{BuildError, GeocodeError, PresetError, SubmitError, TransportError};
pub use query::Sequence;
