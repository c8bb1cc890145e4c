use geojson::Value;
use serde::Deserialize;

use super::error::{MapApiError, Result};

/// Driving-directions client for the hosted Mapbox-style directions v5 API.
/// Requests GeoJSON geometry (the lightest representation the renderer can
/// draw directly) and uses only the first route candidate.
#[derive(Clone)]
pub struct DirectionsClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    geometry: geojson::Geometry,
}

impl DirectionsClient {
    pub fn new(client: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Fetch a driving route between two (lon, lat) points, in (start, end)
    /// order, as ordered (lon, lat) pairs.
    pub async fn driving(&self, start: (f64, f64), end: (f64, f64)) -> Result<Vec<(f64, f64)>> {
        let endpoint = format!(
            "{}/directions/v5/mapbox/driving/{}",
            self.base_url,
            route_path(start, end)
        );

        let resp = self
            .client
            .get(&endpoint)
            .query(&[
                ("geometries", "geojson"),
                ("overview", "full"),
                ("access_token", self.token.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MapApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        parse_route(&body)
    }
}

/// Build the `lon,lat;lon,lat` path segment, start first.
pub(crate) fn route_path(start: (f64, f64), end: (f64, f64)) -> String {
    format!("{},{};{},{}", start.0, start.1, end.0, end.1)
}

/// Parse a directions response body into route geometry.
/// Zero candidates is an explicit `NoRoute` error, never a panic.
pub(crate) fn parse_route(body: &str) -> Result<Vec<(f64, f64)>> {
    let parsed: DirectionsResponse = serde_json::from_str(body)?;
    let route = parsed.routes.into_iter().next().ok_or(MapApiError::NoRoute)?;

    match route.geometry.value {
        Value::LineString(coords) => Ok(coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()),
        _ => Err(MapApiError::BadGeometry),
    }
}
