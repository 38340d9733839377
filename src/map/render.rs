//! Turns classified points into map layer data and a self-contained HTML
//! artifact (Leaflet + leaflet.heat, data inlined as JSON).

use crate::map::aggregate::AggregationMode;
use crate::map::bounds::BoundingBox;
use crate::map::classify::ClassifiedPoint;
use log::warn;
use serde::Serialize;
use std::io;
use std::path::Path;

/// One colored circle marker with its tooltip text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    /// Hex color of the point's intensity bucket.
    pub color: &'static str,
    pub tooltip: String,
}

/// The rendered map: a heat layer, the classified markers and the title
/// banner. Discarded after rendering; never persisted unless
/// [`MapDocument::save_html`] is called.
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub title: String,
    pub bounds: BoundingBox,
    /// `(LAT, LON, Intensity)` triples feeding the heat layer, restricted to
    /// `Intensity > 0`.
    pub heat: Vec<(f64, f64, f64)>,
    pub markers: Vec<Marker>,
}

/// Builds the map layers from classified points.
///
/// Only points with `Intensity > 0` produce heat entries and markers; this is
/// a documented compatibility filter, not a bug (see the classifier module
/// docs).
/// An empty classified set produces an empty but titled document, signalling
/// "no points in region" without raising.
pub fn build_map(
    points: &[ClassifiedPoint],
    bounds: &BoundingBox,
    attribute: &str,
    year: i32,
    mode: AggregationMode,
    period: u32,
) -> MapDocument {
    let title = format!(
        "Year: {year} - {} - Attribute: {attribute}",
        mode.label(period)
    );

    let mut heat = Vec::new();
    let mut markers = Vec::new();
    for p in points {
        if p.intensity <= 0.0 {
            continue;
        }
        heat.push((p.lat, p.lon, p.intensity));
        let tooltip = match &p.city {
            Some(city) => format!("City: {city}, {attribute}: {:.5}", p.value),
            None => format!("{attribute}: {:.5}", p.value),
        };
        markers.push(Marker {
            lat: p.lat,
            lon: p.lon,
            color: p.color(),
            tooltip,
        });
    }

    MapDocument {
        title,
        bounds: *bounds,
        heat,
        markers,
    }
}

/// File name for the saved artifact:
/// `Aggregated_{attribute}_{year}_{mode}{period}.html`.
pub fn artifact_filename(attribute: &str, year: i32, mode: AggregationMode, period: u32) -> String {
    format!("Aggregated_{attribute}_{year}_{mode}{period}.html")
}

impl MapDocument {
    /// True when no point survived the bounds and positive-intensity filters;
    /// the map still renders, just without layers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Serializes the document to a self-contained HTML page reproducing the
    /// heat layer, markers and title banner shown interactively.
    pub fn to_html(&self) -> String {
        let (center_lat, center_lon) = self.bounds.center();
        let heat_json = to_json(&self.heat);
        let markers_json = to_json(&self.markers);
        let b = &self.bounds;

        let mut html = String::with_capacity(2048 + heat_json.len() + markers_json.len());
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
        html.push_str(&format!("<title>{}</title>\n", self.title));
        html.push_str(concat!(
            "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\"/>\n",
            "<script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n",
            "<script src=\"https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js\"></script>\n",
            "</head>\n<body>\n",
        ));
        html.push_str(&format!(
            "<h3 align=\"center\" style=\"font-size:20px\"><b>{}</b></h3>\n",
            self.title
        ));
        html.push_str("<div id=\"map\" style=\"width:100%;height:600px\"></div>\n<script>\n");
        html.push_str(&format!(
            "var bounds = [[{}, {}], [{}, {}]];\n",
            b.min_lat, b.min_lon, b.max_lat, b.max_lon
        ));
        html.push_str(&format!(
            "var map = L.map('map', {{maxBounds: bounds}}).setView([{center_lat}, {center_lon}], 6);\n"
        ));
        html.push_str(concat!(
            "L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', ",
            "{maxZoom: 19}).addTo(map);\n",
            "L.rectangle(bounds, {color: 'blue', weight: 2, fill: false, opacity: 0})",
            ".bindTooltip('Egypt Boundaries').addTo(map);\n",
        ));
        html.push_str(&format!("var heat = {heat_json};\n"));
        html.push_str(
            "if (heat.length) L.heatLayer(heat, {radius: 10, blur: 15, maxZoom: 10}).addTo(map);\n",
        );
        html.push_str(&format!("var markers = {markers_json};\n"));
        html.push_str(concat!(
            "markers.forEach(function (m) {\n",
            "  L.circleMarker([m.lat, m.lon], ",
            "{radius: 7, color: m.color, fillColor: m.color, fill: true, fillOpacity: 0.6})",
            ".bindTooltip(m.tooltip).addTo(map);\n",
            "});\n",
            "</script>\n</body>\n</html>\n",
        ));
        html
    }

    /// Writes the HTML artifact to `path`. Pass-through to the filesystem; the
    /// document itself is unchanged by saving.
    pub fn save_html(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, self.to_html())
    }
}

fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| {
        warn!("Failed to serialize map layer data: {e}");
        "[]".to_string()
    })
}
