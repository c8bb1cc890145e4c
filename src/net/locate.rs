use serde::Deserialize;

use super::error::{MapApiError, Result};

/// One-shot approximate device location via an IP geolocation endpoint.
/// Fire-and-forget: the caller ignores failures and keeps the default camera.
#[derive(Clone)]
pub struct LocateClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct LocateResponse {
    /// "lat,lon" pair, e.g. "45.4211,-75.6903"
    loc: String,
}

impl LocateClient {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    /// Look up the current position once. Returns (lon, lat).
    pub async fn current_position(&self) -> Result<(f64, f64)> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
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
        parse_position(&body)
    }
}

pub(crate) fn parse_position(body: &str) -> Result<(f64, f64)> {
    let parsed: LocateResponse = serde_json::from_str(body)?;
    let (lat, lon) = parsed
        .loc
        .split_once(',')
        .ok_or_else(|| MapApiError::Decode(format!("bad loc field: {}", parsed.loc)))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| MapApiError::Decode(format!("bad latitude: {lat}")))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| MapApiError::Decode(format!("bad longitude: {lon}")))?;

    Ok((lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_lat_lon_order() {
        let body = r#"{"ip":"203.0.113.7","city":"Ottawa","loc":"45.4211,-75.6903"}"#;
        let (lon, lat) = parse_position(body).unwrap();
        assert_eq!(lon, -75.6903);
        assert_eq!(lat, 45.4211);
    }

    #[test]
    fn test_parse_position_rejects_bad_loc() {
        let body = r#"{"loc":"not-a-pair"}"#;
        assert!(parse_position(body).is_err());
    }

    #[test]
    fn test_parse_position_rejects_missing_loc() {
        let body = r#"{"ip":"203.0.113.7"}"#;
        assert!(parse_position(body).is_err());
    }
}
