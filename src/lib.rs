mod client;
mod dataset;
mod error;
mod fetch;
mod map;
mod stats;

pub use client::*;
pub use error::{EgyptClimateError, QueryError};

pub use dataset::catalog::{Catalog, ResolvedAttribute, TableKind};
pub use dataset::error::DataLoadError;
pub use dataset::loader::Dataset;
pub use dataset::{month_abbr, month_number, MONTH_ABBR};

pub use map::aggregate::{
    aggregate_by_location, select_period, AggregatedPoint, AggregationMode, PeriodSelection,
};
pub use map::bounds::{BoundingBox, EGYPT_BOUNDS};
pub use map::classify::{
    bucket_for, classify, quantile_breakpoints, ClassifiedPoint, PALETTE, QUANTILE_PROBS,
};
pub use map::filtering::ClimateFrameFilterExt;
pub use map::render::{artifact_filename, build_map, MapDocument, Marker};

pub use stats::summary::{
    city_stats, distribution, monthly_stats, top_n, CityStat, HistogramBin, MonthlyStat,
    RankedObservation, HISTOGRAM_BINS, TOP_N,
};

pub use fetch::downloader::{PowerDownloader, POWER_GRID, POWER_PARAMETERS};
pub use fetch::error::FetchError;
