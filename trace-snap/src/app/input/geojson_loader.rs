use crate::app::TraceSnapAppError;
use geo::{Coord, LineString, MultiLineString};
use geojson::{Feature, GeoJson, Value};
use kdam::{Bar, BarExt};
use std::path::Path;
use trace_snap_core::model::feature::{FeatureGeometry, MatchableFeature, MatchableSet};

/// Loads a GeoJSON FeatureCollection into a cell-indexed [`MatchableSet`].
///
/// `is_multiline` controls whether multi-part geometries are accepted
/// (road networks) or rejected (source traces, which must be single
/// polylines). `properties_filter` keeps only features whose property
/// equals the given string, e.g. `("type", "segment")` for road segments.
/// Features with unusable geometry or without an id are skipped with a
/// warning; an unreadable file or an empty result is fatal.
pub fn load_matchable_set(
    path: &Path,
    is_multiline: bool,
    properties_filter: Option<(&str, &str)>,
    resolution: usize,
) -> Result<MatchableSet, TraceSnapAppError> {
    if !path.exists() {
        return Err(TraceSnapAppError::InputMissing(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    let geojson: GeoJson = raw.parse().map_err(|e: geojson::Error| {
        TraceSnapAppError::InvalidGeoJson {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    })?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(TraceSnapAppError::InvalidGeoJson {
                path: path.display().to_string(),
                message: "expected a FeatureCollection".to_string(),
            })
        }
    };

    let mut pb = Bar::builder()
        .total(collection.features.len())
        .desc("features")
        .build()
        .map_err(|s| {
            std::io::Error::new(std::io::ErrorKind::Interrupted, s.as_str())
        })?;

    let mut features: Vec<MatchableFeature> = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let _ = pb.update(1);
        if let Some(parsed) = parse_feature(feature, is_multiline, properties_filter) {
            features.push(parsed);
        }
    }

    if features.is_empty() {
        return Err(TraceSnapAppError::EmptyFeatureSet(
            path.display().to_string(),
        ));
    }
    Ok(MatchableSet::new(features, resolution))
}

fn parse_feature(
    feature: Feature,
    is_multiline: bool,
    properties_filter: Option<(&str, &str)>,
) -> Option<MatchableFeature> {
    let properties = feature.properties.clone().unwrap_or_default();

    if let Some((key, expected)) = properties_filter {
        let matches = properties
            .get(key)
            .and_then(|v| v.as_str())
            .map(|v| v == expected)
            .unwrap_or(false);
        if !matches {
            return None;
        }
    }

    let id = feature_id(&feature, &properties)?;

    let geometry = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(coords)) => {
            FeatureGeometry::LineString(parse_linestring(coords)?)
        }
        Some(Value::MultiLineString(parts)) if is_multiline => {
            let lines: Option<Vec<LineString<f64>>> =
                parts.iter().map(|part| parse_linestring(part)).collect();
            FeatureGeometry::MultiLineString(MultiLineString(lines?))
        }
        _ => {
            log::warn!("feature {}: unsupported or invalid geometry, skipping", id);
            return None;
        }
    };

    let connector_ids = parse_connector_ids(&properties);
    let times = properties.get("times").and_then(|v| v.as_array()).map(|a| {
        a.iter()
            .filter_map(|t| t.as_str().map(|s| s.to_string()))
            .collect()
    });

    let mut parsed = MatchableFeature::new(id, geometry);
    parsed.connector_ids = connector_ids;
    parsed.times = times;
    parsed.properties = Some(properties);
    Some(parsed)
}

fn feature_id(feature: &Feature, properties: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    match &feature.id {
        Some(geojson::feature::Id::String(s)) => Some(s.clone()),
        Some(geojson::feature::Id::Number(n)) => Some(n.to_string()),
        None => match properties.get("id") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => {
                log::warn!("feature without id, skipping");
                None
            }
        },
    }
}

fn parse_linestring(coords: &[Vec<f64>]) -> Option<LineString<f64>> {
    if coords.is_empty() {
        return None;
    }
    let mut line: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for position in coords {
        if position.len() < 2 {
            return None;
        }
        line.push(Coord {
            x: position[0],
            y: position[1],
        });
    }
    Some(LineString::from(line))
}

/// connector ids appear either as a plain `connector_ids` string array or
/// as the richer `connectors` array of `{connector_id, at}` objects.
fn parse_connector_ids(properties: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
    if let Some(ids) = properties.get("connector_ids").and_then(|v| v.as_array()) {
        return ids
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect();
    }
    if let Some(connectors) = properties.get("connectors").and_then(|v| v.as_array()) {
        return connectors
            .iter()
            .filter_map(|c| {
                c.get("connector_id")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
            .collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_geojson(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const ROADS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "seg-1",
                "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.001, 0.0]]},
                "properties": {"type": "segment", "connector_ids": ["c1", "c2"]}
            },
            {
                "type": "Feature",
                "id": "seg-2",
                "geometry": {"type": "MultiLineString", "coordinates": [[[0.001, 0.0], [0.002, 0.0]]]},
                "properties": {"type": "segment", "connectors": [{"connector_id": "c2", "at": 0}, {"connector_id": "c3", "at": 1}]}
            },
            {
                "type": "Feature",
                "id": "water-1",
                "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.001, 0.001]]},
                "properties": {"type": "water"}
            }
        ]
    }"#;

    #[test]
    fn test_load_roads_with_filter() {
        let file = write_geojson(ROADS);
        let set = load_matchable_set(file.path(), true, Some(("type", "segment")), 7).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("seg-1").unwrap().connector_ids, vec!["c1", "c2"]);
        assert_eq!(set.get("seg-2").unwrap().connector_ids, vec!["c2", "c3"]);
        assert!(set.get("water-1").is_none());
    }

    #[test]
    fn test_multiline_rejected_for_traces() {
        let file = write_geojson(
            r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "trace-1",
                    "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.001, 0.0]]},
                    "properties": {"times": ["2024-05-01T10:00:00Z", "2024-05-01T10:00:10Z"]}
                },
                {
                    "type": "Feature",
                    "id": "trace-2",
                    "geometry": {"type": "MultiLineString", "coordinates": [[[0.0, 0.0], [0.001, 0.0]]]},
                    "properties": {}
                }
            ]
        }"#,
        );
        let set = load_matchable_set(file.path(), false, None, 7).unwrap();
        assert_eq!(set.len(), 1);
        let trace = set.get("trace-1").unwrap();
        assert_eq!(trace.times.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = load_matchable_set(Path::new("/nonexistent/file.geojson"), false, None, 7);
        assert!(matches!(result, Err(TraceSnapAppError::InputMissing(_))));
    }

    #[test]
    fn test_empty_collection_is_fatal() {
        let file = write_geojson(r#"{"type": "FeatureCollection", "features": []}"#);
        let result = load_matchable_set(file.path(), false, None, 7);
        assert!(matches!(result, Err(TraceSnapAppError::EmptyFeatureSet(_))));
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let file = write_geojson("not geojson at all");
        let result = load_matchable_set(file.path(), false, None, 7);
        assert!(matches!(
            result,
            Err(TraceSnapAppError::InvalidGeoJson { .. })
        ));
    }

    #[test]
    fn test_invalid_geometry_is_skipped() {
        let file = write_geojson(
            r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "pt",
                    "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "id": "ok",
                    "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.001, 0.0]]},
                    "properties": {}
                }
            ]
        }"#,
        );
        let set = load_matchable_set(file.path(), false, None, 7).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("ok").is_some());
    }
}
