//! Read-only statistical views over a year/month-filtered observation subset:
//! distribution histogram, per-month and per-city min/max/mean, and top-N
//! ranking.

use crate::dataset::month_abbr;
use crate::error::QueryError;
use polars::prelude::*;

/// Fixed histogram bin count for the distribution view.
pub const HISTOGRAM_BINS: usize = 300;

/// Number of rows returned by the top ranking view.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStat {
    /// 1-based month number.
    pub month: i64,
    pub abbr: &'static str,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityStat {
    pub city: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// One row of the top-N ranking, projected to the display columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedObservation {
    pub city: Option<String>,
    pub value: f64,
    pub date: Option<String>,
}

/// Histogram of `attribute` over `rows`: [`HISTOGRAM_BINS`] equal-width bins
/// spanning the subset's min/max. An empty (or all-null) subset yields no
/// bins; a subset where min equals max yields a single bin holding every row.
pub fn distribution(rows: &DataFrame, attribute: &str) -> Result<Vec<HistogramBin>, QueryError> {
    let values = attribute_values(rows, attribute)?;
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return Ok(vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len() as u32,
        }]);
    }

    let width = (max - min) / HISTOGRAM_BINS as f64;
    let mut counts = [0u32; HISTOGRAM_BINS];
    for v in &values {
        // The maximum lands in the last bin rather than opening a 301st.
        let idx = (((v - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    Ok(counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
        })
        .collect())
}

/// Min/max/mean of `attribute` per month over `year_rows` (all rows of the
/// selected year, not just the selected month), ordered by month 1..12 with
/// the abbreviation attached for display.
pub fn monthly_stats(
    year_rows: &DataFrame,
    attribute: &str,
) -> Result<Vec<MonthlyStat>, QueryError> {
    ensure_attribute(year_rows, attribute)?;
    let grouped = year_rows
        .clone()
        .lazy()
        .group_by_stable([col("Month")])
        .agg(stat_aggs(attribute))
        .sort(["Month"], SortMultipleOptions::default())
        .collect()?;

    let months = grouped.column("Month")?.i64()?;
    let mins = grouped.column("min")?.f64()?;
    let maxs = grouped.column("max")?.f64()?;
    let means = grouped.column("mean")?.f64()?;

    let mut stats = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let (Some(month), Some(min), Some(max), Some(mean)) =
            (months.get(i), mins.get(i), maxs.get(i), means.get(i))
        else {
            continue;
        };
        stats.push(MonthlyStat {
            month,
            abbr: month_abbr(month).unwrap_or("?"),
            min,
            max,
            mean,
        });
    }
    Ok(stats)
}

/// Min/max/mean of `attribute` per city over the year+month-filtered subset,
/// ordered by city name.
pub fn city_stats(rows: &DataFrame, attribute: &str) -> Result<Vec<CityStat>, QueryError> {
    ensure_attribute(rows, attribute)?;
    let grouped = rows
        .clone()
        .lazy()
        .group_by_stable([col("City")])
        .agg(stat_aggs(attribute))
        .sort(["City"], SortMultipleOptions::default())
        .collect()?;

    let cities = grouped.column("City")?.str()?;
    let mins = grouped.column("min")?.f64()?;
    let maxs = grouped.column("max")?.f64()?;
    let means = grouped.column("mean")?.f64()?;

    let mut stats = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let (Some(city), Some(min), Some(max), Some(mean)) =
            (cities.get(i), mins.get(i), maxs.get(i), means.get(i))
        else {
            continue;
        };
        stats.push(CityStat {
            city: city.to_string(),
            min,
            max,
            mean,
        });
    }
    Ok(stats)
}

/// The `n` rows with the largest `attribute` value in the subset, projected to
/// `{City, value, Date}`. Descending and stable: ties keep their original row
/// order, and every returned value is >= every excluded one.
pub fn top_n(
    rows: &DataFrame,
    attribute: &str,
    n: usize,
) -> Result<Vec<RankedObservation>, QueryError> {
    ensure_attribute(rows, attribute)?;
    let columns = rows.get_column_names();
    let has_city = columns.iter().any(|c| c.as_str() == "City");
    let has_date = columns.iter().any(|c| c.as_str() == "Date");

    let top = rows
        .clone()
        .lazy()
        .sort(
            [attribute],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true)
                .with_nulls_last(true),
        )
        .limit(n as u32)
        .collect()?;

    let values = top.column(attribute)?.cast(&DataType::Float64)?;
    let values = values.f64()?;
    let cities = if has_city {
        Some(top.column("City")?.str()?)
    } else {
        None
    };
    let dates = if has_date {
        Some(top.column("Date")?.str()?)
    } else {
        None
    };

    let mut ranked = Vec::with_capacity(top.height());
    for i in 0..top.height() {
        let Some(value) = values.get(i) else {
            continue;
        };
        ranked.push(RankedObservation {
            city: cities.and_then(|c| c.get(i)).map(|c| c.to_string()),
            value,
            date: dates.and_then(|d| d.get(i)).map(|d| d.to_string()),
        });
    }
    Ok(ranked)
}

fn stat_aggs(attribute: &str) -> Vec<Expr> {
    let value = col(attribute).cast(DataType::Float64);
    vec![
        value.clone().min().alias("min"),
        value.clone().max().alias("max"),
        value.mean().alias("mean"),
    ]
}

fn ensure_attribute(rows: &DataFrame, attribute: &str) -> Result<(), QueryError> {
    if rows
        .get_column_names()
        .iter()
        .any(|c| c.as_str() == attribute)
    {
        Ok(())
    } else {
        Err(QueryError::AttributeNotFound(attribute.to_string()))
    }
}

fn attribute_values(rows: &DataFrame, attribute: &str) -> Result<Vec<f64>, QueryError> {
    ensure_attribute(rows, attribute)?;
    let values = rows.column(attribute)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().flatten().collect())
}
