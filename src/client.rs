//! Roll provider clients
//!
//! The betting side asks a [`RollSource`] for a raw die value. The HTTP source
//! calls `GET /roll-dice` on a provider service; the local source samples an
//! in-process [`RandomnessProvider`]. Values are returned unvalidated so the
//! engine can reject out-of-range answers itself.

use crate::{
    api::models::RollDiceResponse,
    errors::ProviderError,
    games::provider::RandomnessProvider,
};
use async_trait::async_trait;
use reqwest::Url;
use std::{sync::Arc, time::Duration};
use tracing::debug;

#[async_trait]
pub trait RollSource: Send + Sync {
    async fn get_roll(&self) -> Result<i64, ProviderError>;
}

/// Fetches rolls from a remote provider over HTTP.
pub struct HttpRollSource {
    http_client: reqwest::Client,
    roll_url: Url,
}

impl HttpRollSource {
    /// `roll_url` is the full endpoint, e.g. `http://localhost:5000/roll-dice`.
    pub fn new(roll_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let roll_url = Url::parse(roll_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", roll_url, e)))?;
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client, roll_url })
    }

    pub fn url(&self) -> &Url {
        &self.roll_url
    }
}

#[async_trait]
impl RollSource for HttpRollSource {
    async fn get_roll(&self) -> Result<i64, ProviderError> {
        let response = self.http_client.get(self.roll_url.clone()).send().await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let bytes = response.bytes().await?;
                let body: RollDiceResponse = serde_json::from_slice(&bytes)
                    .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
                debug!("Provider at {} rolled {}", self.roll_url, body.dice);
                Ok(body.dice)
            }
            status => Err(ProviderError::Failed(status)),
        }
    }
}

/// Samples an in-process provider, for offline play.
pub struct LocalRollSource {
    provider: Arc<dyn RandomnessProvider>,
}

impl LocalRollSource {
    pub fn new(provider: Arc<dyn RandomnessProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RollSource for LocalRollSource {
    async fn get_roll(&self) -> Result<i64, ProviderError> {
        Ok(self.provider.roll().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::provider::SeededProvider;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use std::net::SocketAddr;

    async fn serve_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let actual_addr = listener.local_addr().unwrap();
        let base_url = format!("http://{actual_addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (base_url, handle)
    }

    fn source(base_url: &str) -> HttpRollSource {
        HttpRollSource::new(&format!("{base_url}/roll-dice"), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_http_source_reads_dice_field() {
        let router = Router::new().route(
            "/roll-dice",
            get(|| async { Json(serde_json::json!({ "dice": 4 })) }),
        );
        let (base_url, handle) = serve_router(router).await;

        assert_eq!(source(&base_url).get_roll().await.unwrap(), 4);
        handle.abort();
    }

    #[tokio::test]
    async fn test_http_source_passes_out_of_range_values_through() {
        let router = Router::new().route(
            "/roll-dice",
            get(|| async { Json(serde_json::json!({ "dice": 9 })) }),
        );
        let (base_url, handle) = serve_router(router).await;

        assert_eq!(source(&base_url).get_roll().await.unwrap(), 9);
        handle.abort();
    }

    #[tokio::test]
    async fn test_http_source_rejects_non_200() {
        let router = Router::new().route(
            "/roll-dice",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let (base_url, handle) = serve_router(router).await;

        let err = source(&base_url).get_roll().await.unwrap_err();
        match err {
            ProviderError::Failed(status) => assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE),
            other => panic!("expected Failed, got {other:?}"),
        }
        handle.abort();
    }

    #[tokio::test]
    async fn test_http_source_rejects_malformed_body() {
        let router = Router::new().route(
            "/roll-dice",
            get(|| async { Json(serde_json::json!({ "dice": "six" })) }),
        );
        let (base_url, handle) = serve_router(router).await;

        let err = source(&base_url).get_roll().await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        handle.abort();
    }

    #[tokio::test]
    async fn test_http_source_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(&format!("http://{addr}")).get_roll().await.unwrap_err();
        assert!(matches!(err, ProviderError::Reqwest(_)));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = HttpRollSource::new("not a url", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidUrl(_)));
        assert!(err.to_string().starts_with("invalid provider URL: not a url"));
    }

    #[tokio::test]
    async fn test_local_source_uses_provider() {
        let local = LocalRollSource::new(Arc::new(SeededProvider::new(3)));
        let reference = SeededProvider::new(3);

        for _ in 0..5 {
            let value = local.get_roll().await.unwrap();
            assert_eq!(value, i64::from(reference.roll()));
        }
    }
}
