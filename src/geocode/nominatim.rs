use geo_types::LineString;
use serde::Deserialize;

use super::{Geocoder, outer_ring};
use crate::client::{build_agent, read_response};
use crate::config::ClientConfig;
use crate::error::GeocodeError;

/// One search hit; only the fields needed to pick a polygon.
#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    geojson: Option<serde_json::Value>,
}

pub struct NominatimGeocoder {
    agent: ureq::Agent,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agent: build_agent(&config.user_agent),
            endpoint: config.geocoder_endpoint.clone(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn resolve(&self, place: &str) -> Result<LineString<f64>, GeocodeError> {
        tracing::debug!("GET {} q={:?}", self.endpoint, place);
        let result = self
            .agent
            .get(&self.endpoint)
            .query("format", "json")
            .query("limit", "5")
            .query("dedupe", "0")
            .query("polygon_geojson", "1")
            .query("q", place)
            .call();
        let response = read_response(&self.endpoint, result)?;
        if response.status != 200 {
            return Err(GeocodeError::Decode(format!(
                "status code {}: {}",
                response.status,
                response.text()
            )));
        }
        first_polygon(&response.body, place)
    }
}

/// Walk search results in order and return the first usable polygon ring.
fn first_polygon(body: &[u8], place: &str) -> Result<LineString<f64>, GeocodeError> {
    let items: Vec<SearchItem> =
        serde_json::from_slice(body).map_err(|err| GeocodeError::Decode(err.to_string()))?;

    for item in items {
        let Some(value) = item.geojson else {
            continue;
        };
        let geometry = match geojson::Geometry::from_json_value(value) {
            Ok(geometry) => geometry,
            Err(err) => {
                tracing::warn!("{}: failed to read geometry: {}", item.display_name, err);
                continue;
            }
        };
        match outer_ring(&geometry) {
            Ok(Some(ring)) => {
                tracing::info!("Using polygon for {}", item.display_name);
                return Ok(ring);
            }
            Ok(None) => {
                tracing::info!(
                    "{}: unsupported geometry type '{}'",
                    item.display_name,
                    geometry_type(&geometry.value)
                );
            }
            Err(err) => {
                tracing::warn!("{}: failed to convert polygon: {}", item.display_name, err);
            }
        }
    }

    Err(GeocodeError::NotFound(place.to_string()))
}

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}
