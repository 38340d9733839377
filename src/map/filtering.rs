//! Lazy filter helpers shared by the map pipeline and the statistics views.

use crate::map::aggregate::AggregationMode;
use crate::map::bounds::BoundingBox;
use polars::prelude::{col, lit, LazyFrame};

pub trait ClimateFrameFilterExt {
    /// Keeps rows whose `LAT`/`LON` fall inside `bounds` (inclusive on all four
    /// edges). Pure and order-preserving; an empty input yields an empty
    /// output, not an error.
    fn filter_bounds(self, bounds: &BoundingBox) -> LazyFrame;

    /// Keeps rows with `YEAR == year`.
    fn filter_year(self, year: i32) -> LazyFrame;

    /// Keeps rows whose mode column (`Week`/`Month`/`Chapter`/`DOY`) equals
    /// `period`. Range validation of `period` (1-366) is the caller's
    /// responsibility.
    fn filter_period(self, mode: AggregationMode, period: u32) -> LazyFrame;

    /// Keeps rows with `Month == month` (1-12).
    fn filter_month(self, month: i64) -> LazyFrame;
}

impl ClimateFrameFilterExt for LazyFrame {
    fn filter_bounds(self, bounds: &BoundingBox) -> LazyFrame {
        self.filter(
            col("LAT")
                .gt_eq(lit(bounds.min_lat))
                .and(col("LAT").lt_eq(lit(bounds.max_lat)))
                .and(col("LON").gt_eq(lit(bounds.min_lon)))
                .and(col("LON").lt_eq(lit(bounds.max_lon))),
        )
    }

    fn filter_year(self, year: i32) -> LazyFrame {
        self.filter(col("YEAR").eq(lit(year as i64)))
    }

    fn filter_period(self, mode: AggregationMode, period: u32) -> LazyFrame {
        self.filter(col(mode.column()).eq(lit(period as i64)))
    }

    fn filter_month(self, month: i64) -> LazyFrame {
        self.filter(col("Month").eq(lit(month)))
    }
}
