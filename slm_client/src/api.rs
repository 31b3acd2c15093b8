use slm_models::{
    request::{Action, Installation, RequestEnvelope},
    response::ServerResponse,
};
use std::{sync::Arc, time::Duration};

use crate::{Error, Transport};

/// Every SLM call gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// The SLM endpoint, addressed through a [`Transport`].
#[derive(Clone)]
pub struct SlmApi {
    transport: Arc<dyn Transport>,
    server_url: String,
    secret_key: String,
}

impl SlmApi {
    pub fn new(
        transport: Arc<dyn Transport>,
        server_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            server_url: server_url.into(),
            secret_key: secret_key.into(),
        }
    }

    pub async fn activate(
        &self,
        license_key: &str,
        installation: &Installation<'_>,
    ) -> Result<ServerResponse, Error> {
        let envelope = RequestEnvelope::activate(&self.secret_key, license_key, installation);
        self.send(&envelope).await
    }

    pub async fn update_version(
        &self,
        license_key: &str,
        installation: &Installation<'_>,
    ) -> Result<ServerResponse, Error> {
        let envelope =
            RequestEnvelope::update_version(&self.secret_key, license_key, installation);
        self.send(&envelope).await
    }

    pub async fn deactivate(
        &self,
        license_key: &str,
        registered_domain: &str,
    ) -> Result<ServerResponse, Error> {
        let envelope =
            RequestEnvelope::deactivate(&self.secret_key, license_key, registered_domain);
        self.send(&envelope).await
    }

    pub async fn check(&self, license_key: &str) -> Result<ServerResponse, Error> {
        let envelope = RequestEnvelope::check(&self.secret_key, license_key);
        self.send(&envelope).await
    }

    /// Sends the envelope and decodes the answer.
    ///
    /// Version updates go out as a form POST, every other action as a GET query. The body is
    /// decoded whatever the status code; only when that fails does a non 2xx status win
    /// over the decoding error.
    pub async fn send(&self, envelope: &RequestEnvelope) -> Result<ServerResponse, Error> {
        let params = serde_urlencoded::to_string(envelope)?;
        let res = match envelope.action {
            Action::UpdateVersion => {
                self.transport
                    .post(&self.server_url, params.into_bytes(), REQUEST_TIMEOUT)
                    .await?
            }
            Action::Activate | Action::Deactivate | Action::Check => {
                self.transport
                    .get(&self.query_url(&params), REQUEST_TIMEOUT)
                    .await?
            }
        };
        tracing::debug!(action = %envelope.action, status = %res.status, "slm server responded");

        serde_json::from_slice::<ServerResponse>(res.bytes()).map_err(|err| {
            if res.status.is_success() {
                Error::Parsing(err)
            } else {
                Error::APIError(res.status)
            }
        })
    }

    fn query_url(&self, params: &str) -> String {
        let separator = if self.server_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{params}", self.server_url)
    }
}
