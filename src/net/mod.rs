mod directions;
mod error;
mod geocoder;
mod locate;
mod service;

pub use error::{MapApiError, Result};
pub use service::NetService;
