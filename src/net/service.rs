use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::app::{Command, NetEvent};
use crate::config::Config;

use super::directions::DirectionsClient;
use super::error::Result as ApiResult;
use super::geocoder::GeocodingClient;
use super::locate::LocateClient;

/// The two hosted lookups the route pipeline depends on, split from the
/// concrete clients so the pipeline's call sequence stands on its own.
#[async_trait]
pub trait RouteBackend: Send + Sync {
    async fn geocode(&self, place: &str) -> ApiResult<Option<(f64, f64)>>;
    async fn driving(&self, start: (f64, f64), end: (f64, f64)) -> ApiResult<Vec<(f64, f64)>>;
}

#[derive(Clone)]
struct ApiBackend {
    geocoder: GeocodingClient,
    directions: DirectionsClient,
}

#[async_trait]
impl RouteBackend for ApiBackend {
    async fn geocode(&self, place: &str) -> ApiResult<Option<(f64, f64)>> {
        self.geocoder.forward(place).await
    }

    async fn driving(&self, start: (f64, f64), end: (f64, f64)) -> ApiResult<Vec<(f64, f64)>> {
        self.directions.driving(start, end).await
    }
}

/// Geocode both endpoints sequentially, then fetch one driving route with
/// the resolved coordinates in (start, end) order. Either endpoint missing
/// or failing aborts before the directions service is touched. Failures are
/// logged and yield `None`; the caller sends no event in that case.
pub(crate) async fn resolve_route(
    backend: &dyn RouteBackend,
    start: &str,
    end: &str,
) -> Option<Vec<(f64, f64)>> {
    let start_pt = match backend.geocode(start).await {
        Ok(Some(pt)) => pt,
        Ok(None) => {
            info!(query = %start, "route start did not geocode; aborting");
            return None;
        }
        Err(e) => {
            warn!(query = %start, error = %e, "route start geocode failed; aborting");
            return None;
        }
    };

    let end_pt = match backend.geocode(end).await {
        Ok(Some(pt)) => pt,
        Ok(None) => {
            info!(query = %end, "route end did not geocode; aborting");
            return None;
        }
        Err(e) => {
            warn!(query = %end, error = %e, "route end geocode failed; aborting");
            return None;
        }
    };

    match backend.driving(start_pt, end_pt).await {
        Ok(geometry) => {
            info!(points = geometry.len(), "route fetched");
            Some(geometry)
        }
        Err(e) => {
            warn!(error = %e, "directions request failed");
            None
        }
    }
}

/// Runs network commands on a small tokio runtime and reports completions
/// back to the event loop as messages. Failures are logged and produce no
/// event; the UI stays interactive whatever happens here.
pub struct NetService {
    rt: tokio::runtime::Runtime,
    backend: ApiBackend,
    locate: LocateClient,
}

impl NetService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        Ok(Self {
            rt,
            backend: ApiBackend {
                geocoder: GeocodingClient::new(
                    client.clone(),
                    &config.api_base,
                    &config.access_token,
                ),
                directions: DirectionsClient::new(
                    client.clone(),
                    &config.api_base,
                    &config.access_token,
                ),
            },
            locate: LocateClient::new(client, &config.locate_url),
        })
    }

    /// Spawn the task for a command. Never blocks the event loop.
    pub fn dispatch(&self, command: Command, tx: Sender<NetEvent>) {
        match command {
            Command::Locate => {
                let locate = self.locate.clone();
                self.rt.spawn(async move {
                    match locate.current_position().await {
                        Ok((lon, lat)) => {
                            info!(lon, lat, "device location acquired");
                            let _ = tx.send(NetEvent::Located { lon, lat });
                        }
                        // No retry, default camera stays
                        Err(e) => debug!(error = %e, "geolocation unavailable"),
                    }
                });
            }

            Command::Search { query, seq } => {
                let backend = self.backend.clone();
                self.rt.spawn(async move {
                    match backend.geocode(&query).await {
                        Ok(Some((lon, lat))) => {
                            let _ = tx.send(NetEvent::SearchResolved { seq, lon, lat });
                        }
                        Ok(None) => info!(query = %query, "search found no results"),
                        Err(e) => warn!(query = %query, error = %e, "search geocode failed"),
                    }
                });
            }

            Command::FetchRoute { start, end, seq } => {
                let backend = self.backend.clone();
                self.rt.spawn(async move {
                    if let Some(geometry) = resolve_route(&backend, &start, &end).await {
                        let _ = tx.send(NetEvent::RouteResolved { seq, geometry });
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::error::MapApiError;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const OTTAWA: (f64, f64) = (-75.6972, 45.4215);
    const TORONTO: (f64, f64) = (-79.3832, 43.6532);

    /// Scripted backend recording every directions call and its arguments.
    struct StubBackend {
        start_point: ApiResult<Option<(f64, f64)>>,
        end_point: ApiResult<Option<(f64, f64)>>,
        directions_calls: AtomicUsize,
        directions_args: Mutex<Option<((f64, f64), (f64, f64))>>,
    }

    impl StubBackend {
        fn new(
            start_point: ApiResult<Option<(f64, f64)>>,
            end_point: ApiResult<Option<(f64, f64)>>,
        ) -> Self {
            Self {
                start_point,
                end_point,
                directions_calls: AtomicUsize::new(0),
                directions_args: Mutex::new(None),
            }
        }
    }

    fn clone_result(r: &ApiResult<Option<(f64, f64)>>) -> ApiResult<Option<(f64, f64)>> {
        match r {
            Ok(pt) => Ok(*pt),
            Err(_) => Err(MapApiError::Network("offline".to_string())),
        }
    }

    #[async_trait]
    impl RouteBackend for StubBackend {
        async fn geocode(&self, place: &str) -> ApiResult<Option<(f64, f64)>> {
            if place == "start-city" {
                clone_result(&self.start_point)
            } else {
                clone_result(&self.end_point)
            }
        }

        async fn driving(
            &self,
            start: (f64, f64),
            end: (f64, f64),
        ) -> ApiResult<Vec<(f64, f64)>> {
            self.directions_calls.fetch_add(1, Ordering::SeqCst);
            *self.directions_args.lock().unwrap() = Some((start, end));
            Ok(vec![start, end])
        }
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_successful_pair_makes_one_directions_call_in_order() {
        let backend = StubBackend::new(Ok(Some(OTTAWA)), Ok(Some(TORONTO)));

        let geometry = block_on(resolve_route(&backend, "start-city", "end-city"));

        assert_eq!(backend.directions_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *backend.directions_args.lock().unwrap(),
            Some((OTTAWA, TORONTO))
        );
        assert_eq!(geometry, Some(vec![OTTAWA, TORONTO]));
    }

    #[test]
    fn test_start_geocode_miss_skips_directions() {
        let backend = StubBackend::new(Ok(None), Ok(Some(TORONTO)));

        let geometry = block_on(resolve_route(&backend, "start-city", "end-city"));

        assert_eq!(geometry, None);
        assert_eq!(backend.directions_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_end_geocode_miss_skips_directions() {
        let backend = StubBackend::new(Ok(Some(OTTAWA)), Ok(None));

        let geometry = block_on(resolve_route(&backend, "start-city", "end-city"));

        assert_eq!(geometry, None);
        assert_eq!(backend.directions_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_geocode_failure_skips_directions() {
        let backend = StubBackend::new(
            Err(MapApiError::Network("offline".to_string())),
            Ok(Some(TORONTO)),
        );

        let geometry = block_on(resolve_route(&backend, "start-city", "end-city"));

        assert_eq!(geometry, None);
        assert_eq!(backend.directions_calls.load(Ordering::SeqCst), 0);
    }
}
