//! The main entry point for turning loaded observation tables into map layers
//! and statistical summaries.

use crate::dataset::loader::Dataset;
use crate::dataset::month_number;
use crate::error::{EgyptClimateError, QueryError};
use crate::map::aggregate::{
    aggregate_by_location, select_period, AggregationMode, PeriodSelection,
};
use crate::map::bounds::EGYPT_BOUNDS;
use crate::map::classify::classify;
use crate::map::filtering::ClimateFrameFilterExt;
use crate::map::render::{build_map, MapDocument};
use crate::stats::summary::{
    city_stats, distribution, monthly_stats, top_n, CityStat, HistogramBin, MonthlyStat,
    RankedObservation, TOP_N,
};
use bon::bon;
use log::warn;
use polars::prelude::IntoLazy;
use std::path::Path;

const DEFAULT_DATA_DIR: &str = "data";

/// Outcome of a map request. The empty selections are expected results the
/// caller displays as a message instead of a map.
#[derive(Debug, Clone)]
pub enum MapView {
    /// A renderable map. May still be empty of markers when every aggregated
    /// point fell outside the bounding box or had non-positive intensity;
    /// check [`MapDocument::is_empty`].
    Map(MapDocument),
    NoDataForYear {
        year: i32,
    },
    NoDataForPeriod {
        year: i32,
        mode: AggregationMode,
        period: u32,
    },
}

/// Outcome of a statistics request.
#[derive(Debug, Clone)]
pub enum StatsView {
    Summary(StatisticalSummary),
    NoData { month: String, year: i32 },
}

/// The four statistical views over one year/month-filtered subset.
#[derive(Debug, Clone)]
pub struct StatisticalSummary {
    /// Human-readable attribute name from the catalog, for chart titles.
    pub attribute_name: String,
    pub histogram: Vec<HistogramBin>,
    pub monthly: Vec<MonthlyStat>,
    pub cities: Vec<CityStat>,
    pub top: Vec<RankedObservation>,
}

/// The client owning the loaded dataset.
///
/// The two observation tables and the catalog are read once at construction
/// and shared read-only across all subsequent requests; every request builds
/// fresh derived frames and discards them afterwards.
///
/// # Examples
///
/// ```no_run
/// use egypt_climate::{AggregationMode, EgyptClimate, MapView};
///
/// # fn run() -> Result<(), egypt_climate::EgyptClimateError> {
/// let client = EgyptClimate::new()?;
/// let view = client
///     .aggregated_map()
///     .year(2020)
///     .attribute("PRECTOTCORR")
///     .mode(AggregationMode::Week)
///     .period(26)
///     .call()?;
/// if let MapView::Map(doc) = view {
///     doc.save_html("precipitation.html").ok();
/// }
/// # Ok(())
/// # }
/// ```
pub struct EgyptClimate {
    dataset: Dataset,
}

#[bon]
impl EgyptClimate {
    /// Loads the dataset from the default `data/` folder.
    pub fn new() -> Result<Self, EgyptClimateError> {
        Self::with_data_folder(Path::new(DEFAULT_DATA_DIR))
    }

    /// Loads the dataset from a custom folder.
    pub fn with_data_folder(data_dir: &Path) -> Result<Self, EgyptClimateError> {
        let dataset = Dataset::load(data_dir)?;
        Ok(Self::from_dataset(dataset))
    }

    /// Wraps an already-loaded dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Runs the map pipeline for one (year, attribute, mode, period) request:
    /// period selection, spatial bounding, per-location aggregation, intensity
    /// classification and layer rendering.
    ///
    /// # Arguments
    ///
    /// * `.year(i32)`: **Required.** Bounded by the data's year range.
    /// * `.attribute(&str)`: **Required.** A catalog code.
    /// * `.mode(AggregationMode)`: Optional. Defaults to `Week`.
    /// * `.period(u32)`: Optional, 1-366. Defaults to `26`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::AttributeNotFound`] (wrapped) when the attribute
    /// does not resolve to a table column; empty selections are reported
    /// through [`MapView`], not as errors.
    #[builder]
    pub fn aggregated_map(
        &self,
        year: i32,
        attribute: &str,
        mode: Option<AggregationMode>,
        period: Option<u32>,
    ) -> Result<MapView, EgyptClimateError> {
        let mode = mode.unwrap_or(AggregationMode::Week);
        let period = period.unwrap_or(26);

        let resolved = self.dataset.catalog().resolve(attribute)?;
        let table = self.dataset.table(resolved.table);

        let rows = match select_period(table, year, mode, period)? {
            PeriodSelection::NoDataForYear { year } => {
                return Ok(MapView::NoDataForYear { year });
            }
            PeriodSelection::NoDataForPeriod { year, mode, period } => {
                return Ok(MapView::NoDataForPeriod { year, mode, period });
            }
            PeriodSelection::Selected(rows) => rows,
        };

        let bounded = rows
            .lazy()
            .filter_bounds(&EGYPT_BOUNDS)
            .collect()
            .map_err(QueryError::from)?;
        let points = aggregate_by_location(&bounded, &resolved.code)?;
        let classified = classify(points);
        let doc = build_map(&classified, &EGYPT_BOUNDS, &resolved.code, year, mode, period);
        if doc.is_empty() {
            warn!(
                "No data points within the Egypt bounds for {} {} in {year}",
                resolved.code,
                mode.label(period)
            );
        }
        Ok(MapView::Map(doc))
    }

    /// Computes the four statistical views for one (year, month, attribute)
    /// request. `month` is a calendar abbreviation (`"Jan"`..`"Dec"`).
    ///
    /// The histogram, city statistics and top-10 ranking are computed over the
    /// year+month subset; the monthly statistics cover the whole selected
    /// year. All four fail softly together via [`StatsView::NoData`] when the
    /// year+month subset is empty.
    #[builder]
    pub fn statistics(
        &self,
        year: i32,
        month: &str,
        attribute: &str,
    ) -> Result<StatsView, EgyptClimateError> {
        let resolved = self.dataset.catalog().resolve(attribute)?;
        let month_num = month_number(month)
            .ok_or_else(|| QueryError::UnknownMonth(month.to_string()))?;
        let table = self.dataset.table(resolved.table);

        let year_rows = table
            .clone()
            .lazy()
            .filter_year(year)
            .collect()
            .map_err(QueryError::from)?;
        let subset = year_rows
            .clone()
            .lazy()
            .filter_month(month_num)
            .collect()
            .map_err(QueryError::from)?;
        if subset.height() == 0 {
            return Ok(StatsView::NoData {
                month: month.to_string(),
                year,
            });
        }

        Ok(StatsView::Summary(StatisticalSummary {
            attribute_name: resolved.name.clone(),
            histogram: distribution(&subset, &resolved.code)?,
            monthly: monthly_stats(&year_rows, &resolved.code)?,
            cities: city_stats(&subset, &resolved.code)?,
            top: top_n(&subset, &resolved.code, TOP_N)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn test_client() -> EgyptClimate {
        let small = df!(
            "LAT" => [22.5, 30.0],
            "LON" => [25.0, 31.2],
            "City" => ["Aswan", "Cairo"],
            "YEAR" => [2020i64, 2020],
            "Month" => [1i64, 1],
            "Week" => [1i64, 1],
            "Chapter" => [1i64, 1],
            "DOY" => [5i64, 5],
            "Date" => ["2020-01-05", "2020-01-05"],
            "PSH" => [5.5, 6.5],
        )
        .unwrap();
        let large = df!(
            "LAT" => [22.5, 25.0, 30.0, 40.0],
            "LON" => [25.0, 30.0, 31.2, 10.0],
            "City" => ["Aswan", "Asyut", "Cairo", "Offshore"],
            "YEAR" => [2020i64, 2020, 2020, 2020],
            "Month" => [1i64, 1, 1, 1],
            "Week" => [1i64, 1, 1, 1],
            "Chapter" => [1i64, 1, 1, 1],
            "DOY" => [5i64, 5, 5, 5],
            "Date" => ["2020-01-05", "2020-01-05", "2020-01-05", "2020-01-05"],
            "PRECTOTCORR" => [0.0, 5.0, 10.0, 99.0],
        )
        .unwrap();
        let mapping = df!(
            "Code" => ["PSH", "PRECTOTCORR"],
            "Name" => ["Peak Sun Hours", "Corrected Precipitation"],
        )
        .unwrap();
        EgyptClimate::from_dataset(Dataset::from_frames(small, large, &mapping).unwrap())
    }

    #[test]
    fn map_request_runs_the_full_pipeline() {
        let client = test_client();
        let view = client
            .aggregated_map()
            .year(2020)
            .attribute("PRECTOTCORR")
            .mode(AggregationMode::Week)
            .period(1)
            .call()
            .unwrap();

        let MapView::Map(doc) = view else {
            panic!("expected a rendered map");
        };
        // The out-of-bounds 99.0 row is excluded before normalization, and the
        // zero-intensity Aswan point is dropped from the marker set.
        assert_eq!(doc.markers.len(), 2);
        assert_eq!(doc.heat.len(), 2);
        assert_eq!(doc.title, "Year: 2020 - Week: 1 - Attribute: PRECTOTCORR");
    }

    #[test]
    fn map_request_defaults_to_week_26() {
        let client = test_client();
        let view = client
            .aggregated_map()
            .year(2020)
            .attribute("PRECTOTCORR")
            .call()
            .unwrap();
        assert!(matches!(
            view,
            MapView::NoDataForPeriod {
                year: 2020,
                mode: AggregationMode::Week,
                period: 26
            }
        ));
    }

    #[test]
    fn map_request_reports_empty_year() {
        let client = test_client();
        let view = client
            .aggregated_map()
            .year(1999)
            .attribute("PSH")
            .call()
            .unwrap();
        assert!(matches!(view, MapView::NoDataForYear { year: 1999 }));
    }

    #[test]
    fn unknown_attribute_fails_before_any_computation() {
        let client = test_client();
        let err = client
            .aggregated_map()
            .year(2020)
            .attribute("NOT_A_CODE")
            .call()
            .unwrap_err();
        assert!(matches!(
            err,
            EgyptClimateError::Query(QueryError::AttributeNotFound(_))
        ));
    }

    #[test]
    fn statistics_request_builds_all_four_views() {
        let client = test_client();
        let view = client
            .statistics()
            .year(2020)
            .month("Jan")
            .attribute("PRECTOTCORR")
            .call()
            .unwrap();

        let StatsView::Summary(summary) = view else {
            panic!("expected a summary");
        };
        assert_eq!(summary.attribute_name, "Corrected Precipitation");
        assert!(!summary.histogram.is_empty());
        assert_eq!(summary.monthly.len(), 1);
        assert_eq!(summary.monthly[0].abbr, "Jan");
        assert_eq!(summary.cities.len(), 4);
        assert_eq!(summary.top.len(), 4);
        assert_eq!(summary.top[0].value, 99.0);
    }

    #[test]
    fn statistics_request_reports_empty_month() {
        let client = test_client();
        let view = client
            .statistics()
            .year(2020)
            .month("Jul")
            .attribute("PSH")
            .call()
            .unwrap();
        assert!(matches!(
            view,
            StatsView::NoData { month, year: 2020 } if month == "Jul"
        ));
    }

    #[test]
    fn statistics_request_rejects_bad_month_abbreviation() {
        let client = test_client();
        let err = client
            .statistics()
            .year(2020)
            .month("January")
            .attribute("PSH")
            .call()
            .unwrap_err();
        assert!(matches!(
            err,
            EgyptClimateError::Query(QueryError::UnknownMonth(_))
        ));
    }
}
