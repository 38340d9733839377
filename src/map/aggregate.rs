//! Period selection and per-location aggregation for the map pipeline.

use crate::error::QueryError;
use crate::map::filtering::ClimateFrameFilterExt;
use log::warn;
use polars::prelude::*;
use std::fmt;

/// How a map request buckets the selected year into periods.
///
/// Each mode names an integer column of the observation tables; the period
/// selector value is compared against that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationMode {
    Week,
    Month,
    /// A source-specific coarse time bucket; treated as an opaque grouping key.
    Chapter,
    /// Day of year, 1-366.
    DayOfYear,
}

impl AggregationMode {
    /// The observation-table column this mode filters on.
    pub fn column(&self) -> &'static str {
        match self {
            AggregationMode::Week => "Week",
            AggregationMode::Month => "Month",
            AggregationMode::Chapter => "Chapter",
            AggregationMode::DayOfYear => "DOY",
        }
    }

    /// The human label used in map titles, e.g. `"Week: 26"`.
    pub fn label(&self, period: u32) -> String {
        format!("{self}: {period}")
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Outcome of [`select_period`]. The two empty cases are expected,
/// non-exceptional results that the caller reports and then skips the rest of
/// the pipeline for.
#[derive(Debug, Clone)]
pub enum PeriodSelection {
    Selected(DataFrame),
    NoDataForYear {
        year: i32,
    },
    NoDataForPeriod {
        year: i32,
        mode: AggregationMode,
        period: u32,
    },
}

/// Filters `rows` to `YEAR == year` and then to the mode column equal to
/// `period`, distinguishing which of the two filters emptied the result.
pub fn select_period(
    rows: &DataFrame,
    year: i32,
    mode: AggregationMode,
    period: u32,
) -> Result<PeriodSelection, QueryError> {
    let year_rows = rows.clone().lazy().filter_year(year).collect()?;
    if year_rows.height() == 0 {
        return Ok(PeriodSelection::NoDataForYear { year });
    }
    let period_rows = year_rows.lazy().filter_period(mode, period).collect()?;
    if period_rows.height() == 0 {
        return Ok(PeriodSelection::NoDataForPeriod { year, mode, period });
    }
    Ok(PeriodSelection::Selected(period_rows))
}

/// One location's mean attribute value over the selected rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
    pub city: Option<String>,
}

/// Groups `rows` by the exact (LAT, LON) pair and computes the arithmetic mean
/// of `attribute` per group, preserving first-occurrence group order.
///
/// Group-key equality is exact floating-point equality on the stored
/// coordinates; there is no snapping or tolerance. When the table carries a
/// `City` column the first city per group is kept for marker tooltips.
///
/// # Errors
///
/// Returns [`QueryError::AttributeNotFound`] when `attribute` is not a column
/// of `rows` (the attribute belongs to the other observation table).
pub fn aggregate_by_location(
    rows: &DataFrame,
    attribute: &str,
) -> Result<Vec<AggregatedPoint>, QueryError> {
    let columns = rows.get_column_names();
    if !columns.iter().any(|c| c.as_str() == attribute) {
        return Err(QueryError::AttributeNotFound(attribute.to_string()));
    }
    let has_city = columns.iter().any(|c| c.as_str() == "City");

    let mut aggs = vec![col(attribute)
        .cast(DataType::Float64)
        .mean()
        .alias("mean_value")];
    if has_city {
        aggs.push(col("City").first());
    }

    let grouped = rows
        .clone()
        .lazy()
        .group_by_stable([col("LAT"), col("LON")])
        .agg(aggs)
        .collect()?;

    let lats = grouped.column("LAT")?.f64()?;
    let lons = grouped.column("LON")?.f64()?;
    let means = grouped.column("mean_value")?.f64()?;
    let cities = if has_city {
        Some(grouped.column("City")?.str()?)
    } else {
        None
    };

    let mut points = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let (Some(lat), Some(lon)) = (lats.get(i), lons.get(i)) else {
            warn!("Dropping aggregated row {i} with a null coordinate");
            continue;
        };
        let Some(value) = means.get(i) else {
            warn!("Dropping location ({lat}, {lon}): no non-null '{attribute}' values");
            continue;
        };
        let city = cities
            .and_then(|c| c.get(i))
            .map(|c| c.to_string());
        points.push(AggregatedPoint {
            lat,
            lon,
            value,
            city,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations() -> DataFrame {
        df!(
            "LAT" => [22.5, 22.5, 30.0, 30.0, 25.0],
            "LON" => [25.0, 25.0, 31.2, 31.2, 33.0],
            "City" => ["Aswan", "Aswan", "Cairo", "Cairo", "Hurghada"],
            "YEAR" => [2020i64, 2020, 2020, 2020, 2021],
            "Month" => [1i64, 1, 1, 1, 1],
            "Week" => [1i64, 1, 1, 2, 1],
            "Chapter" => [1i64, 1, 1, 1, 1],
            "DOY" => [5i64, 6, 5, 12, 5],
            "PRECTOTCORR" => [2.0, 4.0, 1.0, 7.0, 9.0],
        )
        .unwrap()
    }

    #[test]
    fn select_period_keeps_only_matching_rows() {
        let selection = select_period(&observations(), 2020, AggregationMode::Week, 1).unwrap();
        let PeriodSelection::Selected(rows) = selection else {
            panic!("expected rows for week 1 of 2020");
        };
        assert_eq!(rows.height(), 3);
        let years = rows.column("YEAR").unwrap().i64().unwrap();
        let weeks = rows.column("Week").unwrap().i64().unwrap();
        for i in 0..rows.height() {
            assert_eq!(years.get(i), Some(2020));
            assert_eq!(weeks.get(i), Some(1));
        }
    }

    #[test]
    fn empty_year_is_a_distinct_outcome() {
        let selection = select_period(&observations(), 1999, AggregationMode::Week, 1).unwrap();
        assert!(matches!(
            selection,
            PeriodSelection::NoDataForYear { year: 1999 }
        ));
    }

    #[test]
    fn empty_period_is_a_distinct_outcome() {
        let selection = select_period(&observations(), 2020, AggregationMode::Week, 52).unwrap();
        assert!(matches!(
            selection,
            PeriodSelection::NoDataForPeriod {
                year: 2020,
                mode: AggregationMode::Week,
                period: 52
            }
        ));
    }

    #[test]
    fn aggregation_means_per_exact_coordinate() {
        let points = aggregate_by_location(&observations(), "PRECTOTCORR").unwrap();
        assert_eq!(points.len(), 3);

        // First-occurrence order: Aswan, Cairo, Hurghada.
        assert_eq!(points[0].lat, 22.5);
        assert_eq!(points[0].value, 3.0);
        assert_eq!(points[0].city.as_deref(), Some("Aswan"));
        assert_eq!(points[1].value, 4.0);
        assert_eq!(points[2].value, 9.0);
    }

    #[test]
    fn distinct_floats_stay_distinct_groups() {
        let rows = df!(
            "LAT" => [22.5, 22.500001],
            "LON" => [25.0, 25.0],
            "PRECTOTCORR" => [1.0, 3.0],
        )
        .unwrap();
        let points = aggregate_by_location(&rows, "PRECTOTCORR").unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn missing_attribute_is_attribute_not_found() {
        let err = aggregate_by_location(&observations(), "PSH").unwrap_err();
        assert!(matches!(err, QueryError::AttributeNotFound(code) if code == "PSH"));
    }

    #[test]
    fn aggregation_without_city_column_yields_no_cities() {
        let rows = df!(
            "LAT" => [22.5],
            "LON" => [25.0],
            "PRECTOTCORR" => [1.0],
        )
        .unwrap();
        let points = aggregate_by_location(&rows, "PRECTOTCORR").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].city, None);
    }

    #[test]
    fn mode_labels_match_titles() {
        assert_eq!(AggregationMode::Week.label(26), "Week: 26");
        assert_eq!(AggregationMode::DayOfYear.label(100), "DOY: 100");
        assert_eq!(AggregationMode::Chapter.column(), "Chapter");
    }
}
