//! Loads the two observation tables and the attribute mapping table from disk.
//!
//! The three files are read once into an immutable [`Dataset`] which the client
//! owns for the rest of the process lifetime. Downstream components only ever
//! see `&DataFrame` views and build fresh derived frames per request; nothing
//! mutates the loaded tables in place.

use crate::dataset::catalog::{Catalog, TableKind};
use crate::dataset::error::DataLoadError;
use crate::dataset::month_abbr;
use log::info;
use polars::prelude::*;
use std::path::Path;

const SMALL_FILE: &str = "fullWithLocations_FINAL_small.csv";
const LARGE_FILE: &str = "fullWithLocations_FINAL_large.csv";
const MAPPING_FILE: &str = "dataMapping.csv";

/// The loaded observation tables plus the attribute catalog.
///
/// Treated as read-only by every downstream component: map and statistics
/// requests operate on lazy views and collected copies, never on the shared
/// frames themselves.
#[derive(Debug, Clone)]
pub struct Dataset {
    small: DataFrame,
    large: DataFrame,
    catalog: Catalog,
}

impl Dataset {
    /// Reads the small/large observation CSVs and the mapping table from
    /// `data_dir` and derives the `Month_Name` column on both observation
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError::MissingFile`] / [`DataLoadError::CsvRead`] when
    /// a source file is absent or unparsable, and
    /// [`DataLoadError::InvalidMonth`] when a `Month` value falls outside 1-12.
    pub fn load(data_dir: &Path) -> Result<Self, DataLoadError> {
        let small = read_csv(&data_dir.join(SMALL_FILE))?;
        let large = read_csv(&data_dir.join(LARGE_FILE))?;
        let mapping = read_csv(&data_dir.join(MAPPING_FILE))?;
        let dataset = Self::from_frames(small, large, &mapping)?;
        info!(
            "Loaded dataset from {:?}: {} small rows, {} large rows, {} catalog entries",
            data_dir,
            dataset.small.height(),
            dataset.large.height(),
            dataset.catalog.len()
        );
        Ok(dataset)
    }

    /// Builds a dataset from already-parsed frames, running the same
    /// `Month_Name` derivation and catalog schema check as [`Dataset::load`].
    pub fn from_frames(
        small: DataFrame,
        large: DataFrame,
        mapping: &DataFrame,
    ) -> Result<Self, DataLoadError> {
        let small = with_month_abbr(small, "small")?;
        let large = with_month_abbr(large, "large")?;
        let catalog = Catalog::from_frames(mapping, &small, &large)?;
        Ok(Self {
            small,
            large,
            catalog,
        })
    }

    /// The observation table backing the given attribute group.
    pub fn table(&self, kind: TableKind) -> &DataFrame {
        match kind {
            TableKind::Small => &self.small,
            TableKind::Large => &self.large,
        }
    }

    pub fn small(&self) -> &DataFrame {
        &self.small
    }

    pub fn large(&self) -> &DataFrame {
        &self.large
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Min and max `YEAR` present in the large table, used to bound the UI
    /// year selector. `None` when the table is empty.
    pub fn year_range(&self) -> Option<(i64, i64)> {
        let years = self.large.column("YEAR").ok()?.i64().ok()?;
        Some((years.min()?, years.max()?))
    }
}

fn read_csv(path: &Path) -> Result<DataFrame, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::MissingFile(path.to_path_buf()));
    }
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| DataLoadError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .finish()
        .map_err(|e| DataLoadError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Appends a `Month_Name` column derived from the numeric `Month` column.
fn with_month_abbr(mut df: DataFrame, table: &str) -> Result<DataFrame, DataLoadError> {
    let abbrs: Vec<&'static str> = {
        let months = df
            .column("Month")
            .and_then(|c| Ok(c.i64()?.clone()))
            .map_err(|e| DataLoadError::MissingColumn {
                table: table.to_string(),
                column: "Month".to_string(),
                source: e,
            })?;
        let mut abbrs = Vec::with_capacity(months.len());
        for month in months.into_iter() {
            match month {
                Some(m) => abbrs.push(month_abbr(m).ok_or(DataLoadError::InvalidMonth(m))?),
                None => return Err(DataLoadError::NullMonth(table.to_string())),
            }
        }
        abbrs
    };
    df.with_column(Series::new("Month_Name".into(), abbrs))
        .map_err(|e| DataLoadError::MonthDerivation {
            table: table.to_string(),
            source: e,
        })?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SMALL_CSV: &str = "\
LAT,LON,City,YEAR,Month,Week,Chapter,DOY,Date,PSH
22.5,25.0,Aswan,2020,1,1,1,5,2020-01-05,5.5
30.0,31.2,Cairo,2020,2,6,1,36,2020-02-05,6.1
";
    const LARGE_CSV: &str = "\
LAT,LON,City,YEAR,Month,Week,Chapter,DOY,Date,PRECTOTCORR
22.5,25.0,Aswan,2020,1,1,1,5,2020-01-05,0.0
30.0,31.2,Cairo,2020,12,50,4,340,2020-12-05,3.2
";
    const MAPPING_CSV: &str = "\
Code,Name
PSH,Peak Sun Hours
PRECTOTCORR,Corrected Precipitation
";

    fn write_data_dir(small: &str, large: &str, mapping: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SMALL_FILE), small).unwrap();
        fs::write(dir.path().join(LARGE_FILE), large).unwrap();
        fs::write(dir.path().join(MAPPING_FILE), mapping).unwrap();
        dir
    }

    #[test]
    fn loads_tables_and_derives_month_names() {
        let dir = write_data_dir(SMALL_CSV, LARGE_CSV, MAPPING_CSV);
        let dataset = Dataset::load(dir.path()).unwrap();

        assert_eq!(dataset.small().height(), 2);
        assert_eq!(dataset.large().height(), 2);
        assert_eq!(dataset.catalog().len(), 2);

        let names = dataset.small().column("Month_Name").unwrap();
        let names = names.str().unwrap();
        assert_eq!(names.get(0), Some("Jan"));
        assert_eq!(names.get(1), Some("Feb"));

        let names = dataset.large().column("Month_Name").unwrap();
        let names = names.str().unwrap();
        assert_eq!(names.get(1), Some("Dec"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingFile(_)));
    }

    #[test]
    fn month_outside_calendar_fails_load() {
        let bad_small = SMALL_CSV.replace(",2020,1,", ",2020,13,");
        let dir = write_data_dir(&bad_small, LARGE_CSV, MAPPING_CSV);
        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidMonth(13)));
    }

    #[test]
    fn year_range_spans_large_table() {
        let dir = write_data_dir(SMALL_CSV, LARGE_CSV, MAPPING_CSV);
        let dataset = Dataset::load(dir.path()).unwrap();
        assert_eq!(dataset.year_range(), Some((2020, 2020)));
    }
}
