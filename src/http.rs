use crate::error::Error;
use log::trace;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

/// Thin wrapper over reqwest. Requests are made exactly once; failures
/// propagate to the caller, which may retry at its discretion.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    pub async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<(StatusCode, String), Error> {
        trace!("GET {url}");
        let resp = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::network(format!("network send error: {e}")))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::network(format!("read body error: {e}")))?;
        Ok((status, text))
    }

    pub async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<(StatusCode, String), Error> {
        trace!("POST {url}");
        let resp = self
            .client
            .post(url)
            .headers(headers)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::network(format!("network send error: {e}")))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::network(format!("read body error: {e}")))?;
        Ok((status, text))
    }

    pub async fn post_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<(StatusCode, String), Error> {
        trace!("POST {url} (form)");
        let resp = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| Error::network(format!("network send error: {e}")))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::network(format!("read body error: {e}")))?;
        Ok((status, text))
    }
}
