#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

mod api;
mod error;

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Bytes,
    header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE},
    http::HeaderValue,
    Method, Request, StatusCode,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use std::time::Duration;

pub use api::{SlmApi, REQUEST_TIMEOUT};
pub use error::Error;

/// The HTTP round trip the SLM calls are made through.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, Error>;

    /// Sends `form` as an `application/x-www-form-urlencoded` body.
    async fn post(&self, url: &str, form: Vec<u8>, timeout: Duration)
        -> Result<Response, Error>;
}

#[derive(Clone)]
pub struct Client {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl Client {
    #[must_use]
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = HyperClient::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }

    pub async fn request(
        &self,
        url: &str,
        method: Method,
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> Result<Response, Error> {
        let builder = Request::builder()
            .uri(url)
            .method(method)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        let req = if let Some(bytes) = body {
            let len = bytes.len();
            builder
                .header(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                )
                .header(CONTENT_LENGTH, len)
                .body(Full::from(Bytes::from(bytes)))?
        } else {
            builder.body(Full::new(Bytes::new()))?
        };

        let round_trip = async {
            let res = self.client.request(req).await?;
            let status = res.status();
            let bytes = res.into_body().collect().await?.to_bytes().to_vec();
            Ok::<_, Error>(Response { status, bytes })
        };

        tokio::time::timeout(timeout, round_trip)
            .await
            .map_err(|_| Error::Timeout(timeout))?
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for Client {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, Error> {
        self.request(url, Method::GET, None, timeout).await
    }

    async fn post(
        &self,
        url: &str,
        form: Vec<u8>,
        timeout: Duration,
    ) -> Result<Response, Error> {
        self.request(url, Method::POST, Some(form), timeout).await
    }
}

pub struct Response {
    pub status: StatusCode,
    bytes: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
