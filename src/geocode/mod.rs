//! Place-name resolution to polygon rings.

mod nominatim;

use geo_types::{Coord, LineString};

use crate::error::GeocodeError;

pub use nominatim::NominatimGeocoder;

pub trait Geocoder {
    /// Outer ring of the first polygon matching `place`, in GeoJSON
    /// `(lon, lat)` order.
    fn resolve(&self, place: &str) -> Result<LineString<f64>, GeocodeError>;
}

/// Outer ring of a Polygon, or of the first polygon of a MultiPolygon.
/// Other geometry types yield `None`.
pub fn outer_ring(geometry: &geojson::Geometry) -> Result<Option<LineString<f64>>, String> {
    let ring = match &geometry.value {
        geojson::Value::Polygon(rings) => rings.first(),
        geojson::Value::MultiPolygon(polygons) => {
            polygons.first().and_then(|rings| rings.first())
        }
        _ => return Ok(None),
    };

    let Some(ring) = ring else {
        return Err("polygon has no rings".to_string());
    };

    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
            other => Err(format!("position has {} value(s), expected 2", other.len())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if coords.is_empty() {
        return Err("polygon ring is empty".to_string());
    }
    Ok(Some(LineString::from(coords)))
}

/// Outer rings from a GeoJSON document: a bare geometry, a feature, or
/// every polygon feature of a collection.
pub fn rings_from_geojson(document: &str) -> Result<Vec<LineString<f64>>, String> {
    let geojson: geojson::GeoJson = document
        .parse()
        .map_err(|err| format!("invalid GeoJSON: {err}"))?;

    let geometries: Vec<geojson::Geometry> = match geojson {
        geojson::GeoJson::Geometry(geometry) => vec![geometry],
        geojson::GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        geojson::GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
    };

    let mut rings = Vec::new();
    for geometry in &geometries {
        if let Some(ring) = outer_ring(geometry)? {
            rings.push(ring);
        }
    }

    if rings.is_empty() {
        return Err("GeoJSON contains no Polygon or MultiPolygon geometry".to_string());
    }
    Ok(rings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_ring_of_polygon_drops_holes() {
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]],
            vec![vec![0.2, 0.2], vec![0.3, 0.2], vec![0.2, 0.2]],
        ]));
        let ring = outer_ring(&geometry).unwrap().unwrap();
        assert_eq!(ring.0.len(), 4);
        assert_eq!(ring.0[1], Coord { x: 1.0, y: 0.0 });
    }

    #[test]
    fn points_have_no_ring() {
        let geometry = geojson::Geometry::new(geojson::Value::Point(vec![144.9, -37.8]));
        assert_eq!(outer_ring(&geometry).unwrap(), None);
    }

    #[test]
    fn short_positions_are_errors() {
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![vec![1.0]]]));
        assert!(outer_ring(&geometry).is_err());
    }

    #[test]
    fn rings_from_feature_collection() {
        let document = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[145.1, -37.8], [145.2, -37.8], [145.2, -37.9], [145.1, -37.8]]],
                    [[[146.1, -38.8], [146.2, -38.8], [146.1, -38.8]]]
                ]}}
            ]
        }"#;
        let rings = rings_from_geojson(document).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].0[0], Coord { x: 145.1, y: -37.8 });
    }

    #[test]
    fn rings_from_geojson_without_polygons_fails() {
        let document = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        assert!(rings_from_geojson(document).is_err());
    }
}
