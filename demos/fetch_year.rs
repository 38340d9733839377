// demos/fetch_year.rs
use egypt_climate::{EgyptClimateError, PowerDownloader, POWER_PARAMETERS};

#[tokio::main]
async fn main() -> Result<(), EgyptClimateError> {
    env_logger::init();

    let downloader = PowerDownloader::new("data/raw");
    for year in 2019..2024 {
        let written = downloader.fetch_year(year, &POWER_PARAMETERS).await?;
        println!("{year}: wrote {written} parameter files");
    }

    Ok(())
}
