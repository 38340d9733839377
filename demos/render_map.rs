// demos/render_map.rs
use egypt_climate::{
    artifact_filename, AggregationMode, EgyptClimate, EgyptClimateError, MapView,
};

fn main() -> Result<(), EgyptClimateError> {
    // Set RUST_LOG=info to see loader and pipeline diagnostics.
    env_logger::init();

    let client = EgyptClimate::new()?;
    if let Some((min_year, max_year)) = client.dataset().year_range() {
        println!("Dataset covers {min_year}..={max_year}");
    }

    let year = 2020;
    let attribute = "PRECTOTCORR";
    let mode = AggregationMode::Week;
    let period = 26;

    let view = client
        .aggregated_map()
        .year(year)
        .attribute(attribute)
        .mode(mode)
        .period(period)
        .call()?;

    match view {
        MapView::Map(doc) => {
            println!("{} ({} markers)", doc.title, doc.markers.len());
            if doc.is_empty() {
                println!("No data points within Egypt's boundaries");
            }
            let filename = artifact_filename(attribute, year, mode, period);
            doc.save_html(&filename).expect("failed to write map HTML");
            println!("Saved {filename}");
        }
        MapView::NoDataForYear { year } => {
            println!("No data available for Year {year}");
        }
        MapView::NoDataForPeriod { year, mode, period } => {
            println!("No data available for {mode} {period} in Year {year}");
        }
    }

    Ok(())
}
