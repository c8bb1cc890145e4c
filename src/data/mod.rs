use crate::map::MapRenderer;
use anyhow::{bail, Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// The bundled skatepark dataset, compiled into the binary.
const SKATEPARKS_GEOJSON: &str = include_str!("../../assets/skateparks.json");

/// One point-of-interest record from the bundled dataset. Never mutated.
#[derive(Clone, Debug)]
pub struct ParkFeature {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    pub name: String,
    pub description: String,
}

/// Parse the bundled skatepark FeatureCollection.
/// Malformed bundled data is a startup error.
pub fn load_parks() -> Result<Vec<ParkFeature>> {
    parse_parks(SKATEPARKS_GEOJSON)
}

fn parse_parks(raw: &str) -> Result<Vec<ParkFeature>> {
    let geojson: GeoJson = raw.parse().context("skatepark dataset is not valid GeoJSON")?;

    let GeoJson::FeatureCollection(fc) = geojson else {
        bail!("skatepark dataset must be a FeatureCollection");
    };

    let mut parks = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let props = feature.properties.as_ref();

        let id = props
            .and_then(|p| p.get("id"))
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .with_context(|| format!("park feature missing id (after {} parks)", parks.len()))?;

        let name = props
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unnamed park")
            .to_string();

        let description = props
            .and_then(|p| p.get("description"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let Some(geometry) = feature.geometry else {
            bail!("park {id} has no geometry");
        };
        let Value::Point(coords) = geometry.value else {
            bail!("park {id} is not a Point");
        };
        if coords.len() < 2 {
            bail!("park {id} has malformed coordinates");
        }

        parks.push(ParkFeature {
            id,
            lon: coords[0],
            lat: coords[1],
            name,
            description,
        });
    }

    Ok(parks)
}

/// Load optional basemap coastline GeoJSON from a data directory.
/// Missing files are skipped; unparsable files log a warning and are skipped.
pub fn load_basemap(renderer: &mut MapRenderer, data_dir: &Path) -> Result<()> {
    let coastline_files = [
        "ne_110m_coastline.json",
        "ne_50m_coastline.json",
        "natural-earth.json",
    ];

    for filename in coastline_files {
        let path = data_dir.join(filename);
        if path.exists() {
            if let Err(e) = load_lines(renderer, &path) {
                tracing::warn!(file = filename, error = %e, "failed to load basemap file");
            }
        }
    }

    Ok(())
}

fn load_lines(renderer: &mut MapRenderer, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    process_geojson_lines(&geojson, |line| renderer.add_basemap_line(line));
    Ok(())
}

/// Walk a GeoJSON document and extract every line-like feature.
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match &geometry.value {
        Value::LineString(coords) => {
            add_line(coords.iter().map(|c| (c[0], c[1])).collect());
        }
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(coords.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(exterior.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(exterior.iter().map(|c| (c[0], c[1])).collect());
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Coarse continent outlines used when no basemap files are present.
pub fn generate_simple_world(renderer: &mut MapRenderer) {
    renderer.add_basemap_line(vec![
        (-168.0, 65.0), (-141.0, 60.0), (-125.0, 48.0), (-117.0, 32.0),
        (-97.0, 25.0), (-82.0, 24.0), (-81.0, 31.0), (-70.0, 41.0),
        (-65.0, 47.0), (-52.0, 47.0), (-58.0, 55.0), (-73.0, 62.0),
        (-95.0, 62.0), (-130.0, 70.0), (-168.0, 65.0),
    ]);

    renderer.add_basemap_line(vec![
        (-80.0, 10.0), (-60.0, 5.0), (-35.0, -5.0), (-40.0, -22.0),
        (-55.0, -34.0), (-68.0, -50.0), (-75.0, -45.0), (-70.0, -20.0),
        (-80.0, -5.0), (-80.0, 10.0),
    ]);

    renderer.add_basemap_line(vec![
        (-10.0, 36.0), (5.0, 43.0), (15.0, 45.0), (25.0, 37.0),
        (40.0, 43.0), (40.0, 55.0), (25.0, 65.0), (10.0, 71.0),
        (5.0, 58.0), (-10.0, 52.0), (-5.0, 43.0), (-10.0, 36.0),
    ]);

    renderer.add_basemap_line(vec![
        (-17.0, 15.0), (0.0, 5.0), (20.0, -5.0), (35.0, -20.0),
        (20.0, -35.0), (10.0, -15.0), (5.0, 5.0), (-17.0, 15.0),
    ]);

    renderer.add_basemap_line(vec![
        (40.0, 43.0), (60.0, 25.0), (75.0, 15.0), (88.0, 22.0),
        (105.0, 10.0), (120.0, 22.0), (130.0, 35.0), (145.0, 50.0),
        (135.0, 55.0), (110.0, 45.0), (70.0, 55.0), (40.0, 43.0),
    ]);

    renderer.add_basemap_line(vec![
        (115.0, -20.0), (140.0, -12.0), (153.0, -30.0), (145.0, -38.0),
        (130.0, -32.0), (115.0, -35.0), (115.0, -20.0),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_parks_parse() {
        let parks = load_parks().unwrap();
        assert!(parks.len() >= 8);
        for park in &parks {
            assert!(!park.name.is_empty());
            // Everything in the bundle is in the Ottawa area
            assert!(park.lat > 45.0 && park.lat < 46.0, "{}", park.name);
            assert!(park.lon > -76.5 && park.lon < -75.0, "{}", park.name);
        }
    }

    #[test]
    fn test_bundled_park_ids_unique() {
        let parks = load_parks().unwrap();
        let mut ids: Vec<_> = parks.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), parks.len());
    }

    #[test]
    fn test_parse_rejects_non_collection() {
        let raw = r#"{"type":"Point","coordinates":[0.0,0.0]}"#;
        assert!(parse_parks(raw).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_geometry() {
        let raw = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"id":"p1","name":"X"},"geometry":null}
        ]}"#;
        assert!(parse_parks(raw).is_err());
    }

    #[test]
    fn test_simple_world_populates_basemap() {
        let mut renderer = MapRenderer::new();
        assert!(!renderer.has_basemap());
        generate_simple_world(&mut renderer);
        assert!(renderer.has_basemap());
    }
}
