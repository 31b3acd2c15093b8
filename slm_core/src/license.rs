use chrono::{DateTime, Utc};
use serde_json::Value;
use slm_client::{SlmApi, Transport};
use slm_database::OptionStore;
use slm_models::{
    license::{LicenseRecord, OptionNames},
    request::Installation,
    response::ServerResponse,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::SlmError,
    scheduler::{Scheduler, VERSION_REPORT_INTERVAL},
    settings::ClientSettings,
};

pub const NO_LICENSE_KEY: &str = "No license key found";
pub const EMPTY_LICENSE_KEY: &str = "License key is empty";

/// Activates, checks, reports and deactivates the license of one installation.
///
/// Operations on the same client run one at a time, network round trip included, so the
/// stored key and active flag are never written by two operations at once.
pub struct LicenseClient {
    api: SlmApi,
    store: Arc<dyn OptionStore>,
    scheduler: Arc<dyn Scheduler>,
    settings: ClientSettings,
    options: OptionNames,
    lock: Mutex<()>,
}

impl LicenseClient {
    pub fn new(
        settings: ClientSettings,
        transport: Arc<dyn Transport>,
        store: Arc<dyn OptionStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let api = SlmApi::new(transport, &settings.server_url, &settings.secret_key);
        let options = OptionNames::with_prefix(&settings.option_prefix);
        Self {
            api,
            store,
            scheduler,
            settings,
            options,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    #[must_use]
    pub const fn options(&self) -> &OptionNames {
        &self.options
    }

    /// Reads the stored license state.
    ///
    /// # Errors
    ///
    /// Returns Err if the option store cannot be read.
    pub async fn record(&self) -> Result<LicenseRecord, SlmError> {
        let license_key = match self.store.get(&self.options.license_key).await? {
            Some(Value::String(key)) => Some(key),
            _ => None,
        };
        let is_active = self
            .store
            .get(&self.options.license_active)
            .await?
            .is_some_and(|v| truthy(&v));
        let last_version_report_at = self
            .store
            .get(&self.options.last_version_report)
            .await?
            .and_then(|v| v.as_i64())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        Ok(LicenseRecord {
            license_key,
            is_active,
            last_version_report_at,
        })
    }

    /// Activates `license_key` for the installation. On success the key is stored, the
    /// license flagged active and the daily version report scheduled.
    ///
    /// An empty key is refused without contacting the server. Failing to reach the server
    /// is reported as an error result with the transport error as message; a server error
    /// is returned as received.
    pub async fn activate(
        &self,
        license_key: &str,
        installation: &Installation<'_>,
    ) -> ServerResponse {
        if license_key.is_empty() {
            return ServerResponse::error(EMPTY_LICENSE_KEY);
        }
        let _guard = self.lock.lock().await;

        let response = match self.api.activate(license_key, installation).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "activation request failed");
                return ServerResponse::error(err.to_string());
            }
        };

        if response.is_success() {
            match self.store_activation(license_key).await {
                Ok(()) => self.ensure_scheduled(),
                Err(err) => tracing::error!(error = %err, "failed to store the activated license"),
            }
            tracing::info!(domain = installation.registered_domain, "license activated");
        }

        response
    }

    /// Reports the configured version for the active license.
    ///
    /// Returns `true` only when the server acknowledged the report. Without an active
    /// license nothing is sent. Transport failures are logged and end up as `false`.
    pub async fn update_version(&self) -> bool {
        let _guard = self.lock.lock().await;

        let record = match self.record().await {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(error = %err, "failed to read the license record");
                return false;
            }
        };
        let Some(license_key) = record.active_key() else {
            return false;
        };

        match self
            .api
            .update_version(license_key, &self.settings.installation())
            .await
        {
            Ok(response) if response.is_success() => {
                let now = Utc::now().timestamp();
                if let Err(err) = self
                    .store
                    .set(&self.options.last_version_report, Value::from(now))
                    .await
                {
                    tracing::error!(error = %err, "failed to store the version report time");
                }
                tracing::info!(version = %self.settings.version, "version reported");
                true
            }
            Ok(_) => false,
            Err(err) => {
                tracing::error!(error = %err, "SLM version update failed");
                false
            }
        }
    }

    /// Releases the stored license from this domain. On success the key and active flag are
    /// removed and the daily version report is cancelled.
    pub async fn deactivate(&self) -> ServerResponse {
        let _guard = self.lock.lock().await;

        let record = match self.record().await {
            Ok(record) => record,
            Err(err) => return ServerResponse::error(err.to_string()),
        };
        let license_key = record.license_key.unwrap_or_default();

        let response = match self
            .api
            .deactivate(&license_key, &self.settings.registered_domain)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "deactivation request failed");
                return ServerResponse::error(err.to_string());
            }
        };

        if response.is_success() {
            if let Err(err) = self.remove_activation().await {
                tracing::error!(error = %err, "failed to remove the deactivated license");
            }
            tracing::info!(domain = %self.settings.registered_domain, "license deactivated");
        }

        response
    }

    /// Asks the server about the stored license. The answer is returned as received and
    /// nothing is stored.
    pub async fn check_status(&self) -> ServerResponse {
        let _guard = self.lock.lock().await;

        let record = match self.record().await {
            Ok(record) => record,
            Err(err) => return ServerResponse::error(err.to_string()),
        };
        let Some(license_key) = record.key() else {
            return ServerResponse::error(NO_LICENSE_KEY);
        };

        match self.api.check(license_key).await {
            Ok(response) => response,
            Err(err) => ServerResponse::error(err.to_string()),
        }
    }

    /// Brings the in-process schedule in line with the stored record: scheduled if the
    /// license is active, cleared otherwise. Returns whether the task is scheduled.
    ///
    /// # Errors
    ///
    /// Returns Err if the option store cannot be read.
    pub async fn restore_schedule(&self) -> Result<bool, SlmError> {
        let _guard = self.lock.lock().await;

        let record = self.record().await?;
        if record.is_active {
            self.ensure_scheduled();
        } else {
            self.scheduler.clear(&self.options.version_update_task);
        }
        Ok(record.is_active)
    }

    async fn store_activation(&self, license_key: &str) -> Result<(), SlmError> {
        self.store
            .set(&self.options.license_key, Value::from(license_key))
            .await?;
        self.store
            .set(&self.options.license_active, Value::Bool(true))
            .await?;
        Ok(())
    }

    /// The flag goes first and the report is only cancelled once it is gone, so a store
    /// failure cannot leave an active license without its key or its task.
    async fn remove_activation(&self) -> Result<(), SlmError> {
        self.store.delete(&self.options.license_active).await?;
        self.scheduler.clear(&self.options.version_update_task);
        self.store.delete(&self.options.license_key).await?;
        Ok(())
    }

    fn ensure_scheduled(&self) {
        let task = &self.options.version_update_task;
        if !self.scheduler.is_scheduled(task) {
            self.scheduler.schedule_recurring(task, VERSION_REPORT_INTERVAL);
        }
    }
}

/// Flag semantics of stored options: `"0"`, `""`, `0`, `false`, `null` and empty
/// collections are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
