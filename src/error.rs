use crate::dataset::error::DataLoadError;
use crate::fetch::error::FetchError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgyptClimateError {
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Errors raised while answering a map or statistics request.
///
/// An empty year/period/month selection is *not* an error; those outcomes are
/// reported through [`crate::MapView`] and [`crate::StatsView`] so callers can
/// degrade gracefully (show a message, render nothing) instead of crashing.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Attribute '{0}' does not resolve to a column in any observation table")]
    AttributeNotFound(String),

    #[error("Unknown month abbreviation '{0}'")]
    UnknownMonth(String),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
