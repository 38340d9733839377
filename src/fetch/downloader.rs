//! Downloads yearly regional CSVs from the NASA POWER daily API, one file per
//! climate parameter, into the flat layout the [`crate::Dataset`] loader reads
//! from upstream tooling.
//!
//! A failing parameter is logged with its target path and HTTP status and then
//! skipped; there is no retry and no abort. Only infrastructure failures (the
//! year directory cannot be created, a response cannot be written) stop a
//! batch.

use crate::fetch::error::FetchError;
use crate::map::bounds::BoundingBox;
use log::{info, warn};
use reqwest::Client;
use std::path::PathBuf;
use tokio::fs;

/// The grid requested from the POWER API. Slightly wider in latitude and
/// narrower in longitude than the display bounds; the spatial filter trims the
/// difference at render time.
pub const POWER_GRID: BoundingBox = BoundingBox::new(22.0, 32.0, 24.5, 34.5);

/// Every climate parameter the observation tables are built from.
pub const POWER_PARAMETERS: [&str; 48] = [
    "T2M",
    "ALLSKY_SFC_SW_DWN",
    "WS2M",
    "RH2M",
    "T2M_MAX",
    "T2M_MIN",
    "WS50M",
    "WD50M",
    "WD2M",
    "CLOUD_AMT",
    "PRECTOTCORR",
    "GWETPROF",
    "TS",
    "QV2M",
    "GWETROOT",
    "GWETTOP",
    "WS50M_MAX",
    "WS50M_MIN",
    "ALLSKY_SFC_UVA",
    "ALLSKY_SFC_UVB",
    "ALLSKY_SFC_UV_INDEX",
    "MIDDAY_INSOL",
    "SZA",
    "TS_MAX",
    "TS_MIN",
    "WS2M_MAX",
    "WS2M_MIN",
    "PW",
    "AIRMASS",
    "CLOUD_AMT_DAY",
    "CLOUD_AMT_NIGHT",
    "CLRSKY_DAYS",
    "EVLAND",
    "ORIGINAL_ALLSKY_SFC_SW_DWN",
    "PSH",
    "PRECSNO",
    "RHOA",
    "TO3",
    "T10M",
    "T10M_MAX",
    "T10M_MIN",
    "TSOIL1",
    "TSOIL2",
    "TSOIL3",
    "TSOIL4",
    "TSOIL5",
    "TSOIL6",
    "Z0M",
];

const POWER_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/regional";

/// Fetches raw yearly CSVs from the NASA POWER regional API.
pub struct PowerDownloader {
    client: Client,
    data_dir: PathBuf,
    grid: BoundingBox,
}

impl PowerDownloader {
    /// Creates a downloader writing under `data_dir` (one subdirectory per
    /// year) and requesting the default Egypt [`POWER_GRID`].
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            data_dir: data_dir.into(),
            grid: POWER_GRID,
        }
    }

    pub fn with_grid(data_dir: impl Into<PathBuf>, grid: BoundingBox) -> Self {
        Self {
            client: Client::new(),
            data_dir: data_dir.into(),
            grid,
        }
    }

    /// The request URL for one (year, parameter) pair.
    pub fn request_url(&self, year: i32, parameter: &str) -> String {
        format!(
            "{POWER_BASE_URL}?start={year}0101&end={year}1231\
             &latitude-min={}&latitude-max={}&longitude-min={}&longitude-max={}\
             &community=ag&parameters={parameter}&format=csv&header=true&time-standard=utc",
            self.grid.min_lat, self.grid.max_lat, self.grid.min_lon, self.grid.max_lon
        )
    }

    /// Where a parameter's CSV lands on disk: `{data_dir}/{year}/{param}.csv`.
    pub fn csv_path(&self, year: i32, parameter: &str) -> PathBuf {
        self.data_dir
            .join(year.to_string())
            .join(format!("{parameter}.csv"))
    }

    /// Downloads one CSV per parameter for `year`, returning the number of
    /// files written. Parameters that fail with a non-success HTTP status are
    /// logged and skipped.
    pub async fn fetch_year(&self, year: i32, parameters: &[&str]) -> Result<usize, FetchError> {
        let year_dir = self.data_dir.join(year.to_string());
        fs::create_dir_all(&year_dir)
            .await
            .map_err(|e| FetchError::DirCreation(year_dir.clone(), e))?;

        let mut written = 0;
        for parameter in parameters {
            if self.fetch_parameter(year, parameter).await? {
                written += 1;
            }
        }
        info!(
            "Fetched {written}/{} parameters for {year} into {:?}",
            parameters.len(),
            year_dir
        );
        Ok(written)
    }

    /// Downloads every year in `years` with the full [`POWER_PARAMETERS`] set.
    pub async fn fetch_years(
        &self,
        years: impl IntoIterator<Item = i32>,
    ) -> Result<usize, FetchError> {
        let mut written = 0;
        for year in years {
            written += self.fetch_year(year, &POWER_PARAMETERS).await?;
        }
        Ok(written)
    }

    /// Fetches a single parameter CSV; `Ok(false)` means the API answered with
    /// a non-success status and the file was skipped.
    async fn fetch_parameter(&self, year: i32, parameter: &str) -> Result<bool, FetchError> {
        let url = self.request_url(year, parameter);
        let path = self.csv_path(year, parameter);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Error with {:?}: HTTP {status}", path);
            return Ok(false);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(url, e))?;
        fs::write(&path, body)
            .await
            .map_err(|e| FetchError::FileWrite(path.clone(), e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn request_url_carries_year_grid_and_parameter() {
        let downloader = PowerDownloader::new("data");
        let url = downloader.request_url(2021, "PRECTOTCORR");
        assert!(url.starts_with(POWER_BASE_URL));
        assert!(url.contains("start=20210101"));
        assert!(url.contains("end=20211231"));
        assert!(url.contains("latitude-min=22"));
        assert!(url.contains("longitude-max=34.5"));
        assert!(url.contains("parameters=PRECTOTCORR"));
        assert!(url.contains("format=csv"));
    }

    #[test]
    fn csv_path_is_keyed_by_year_and_parameter() {
        let downloader = PowerDownloader::new("data");
        assert_eq!(
            downloader.csv_path(2020, "T2M"),
            Path::new("data").join("2020").join("T2M.csv")
        );
    }

    #[test]
    fn parameter_list_is_deduplicated() {
        let mut params = POWER_PARAMETERS.to_vec();
        params.sort_unstable();
        params.dedup();
        assert_eq!(params.len(), POWER_PARAMETERS.len());
    }
}
