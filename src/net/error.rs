use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapApiError>;

#[derive(Debug, Error)]
pub enum MapApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("directions returned no route candidates")]
    NoRoute,

    #[error("unexpected geometry in directions response")]
    BadGeometry,

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for MapApiError {
    fn from(err: reqwest::Error) -> Self {
        MapApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for MapApiError {
    fn from(err: serde_json::Error) -> Self {
        MapApiError::Decode(err.to_string())
    }
}
