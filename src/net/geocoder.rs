use serde::Deserialize;

use super::error::{MapApiError, Result};

/// Forward-geocoding client for the hosted Mapbox-style geocoding v5 API.
/// Only the top-ranked candidate is ever used.
#[derive(Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
    /// [lon, lat] of the candidate
    center: [f64; 2],
}

impl GeocodingClient {
    pub fn new(client: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Resolve free text to (lon, lat) of the best match.
    /// `Ok(None)` means the service returned no candidates.
    pub async fn forward(&self, place: &str) -> Result<Option<(f64, f64)>> {
        let url = self.endpoint(place)?;

        let resp = self
            .client
            .get(url)
            .query(&[("access_token", self.token.as_str()), ("limit", "1")])
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
        parse_forward(&body)
    }

    fn endpoint(&self, place: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| MapApiError::Network(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| MapApiError::Network("geocoder base URL cannot be a base".into()))?;
            segments.pop_if_empty();
            segments.extend(["geocoding", "v5", "mapbox.places"]);
            // Pushed as one segment so the place text gets percent-encoded
            segments.push(&format!("{place}.json"));
        }
        Ok(url)
    }
}

/// Parse a geocoding response body. Split out of the request path for tests.
pub(crate) fn parse_forward(body: &str) -> Result<Option<(f64, f64)>> {
    let parsed: GeocodeResponse = serde_json::from_str(body)?;
    Ok(parsed
        .features
        .first()
        .map(|f| (f.center[0], f.center[1])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_candidate() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"id":"place.1","center":[-75.6972,45.4215],"place_name":"Ottawa, Ontario, Canada"},
            {"id":"place.2","center":[-84.0,39.0],"place_name":"Ottawa, Ohio"}
        ]}"#;
        let result = parse_forward(body).unwrap();
        assert_eq!(result, Some((-75.6972, 45.4215)));
    }

    #[test]
    fn test_parse_empty_result_is_not_found() {
        let body = r#"{"type":"FeatureCollection","features":[]}"#;
        assert_eq!(parse_forward(body).unwrap(), None);
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(
            parse_forward("not json"),
            Err(MapApiError::Decode(_))
        ));
    }

    #[test]
    fn test_endpoint_percent_encodes_place() {
        let client = GeocodingClient::new(
            reqwest::Client::new(),
            "https://api.example.com",
            "tok",
        );
        let url = client.endpoint("Ottawa, ON").unwrap();
        assert_eq!(
            url.path(),
            "/geocoding/v5/mapbox.places/Ottawa,%20ON.json"
        );
    }
}
