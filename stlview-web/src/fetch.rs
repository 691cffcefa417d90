/// HTTP fetcher backed by the browser's fetch API
use gloo_net::http::Request;
use stlview_core::{Fetch, FetchError};

#[derive(Debug, Clone, Copy, Default)]
pub struct GlooFetcher;

impl Fetch for GlooFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }

        response.binary().await.map_err(|e| FetchError::Network(e.to_string()))
    }
}
