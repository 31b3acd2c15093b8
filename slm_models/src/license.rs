use chrono::{DateTime, Utc};
use serde::Serialize;

/// The locally persisted state of the license.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LicenseRecord {
    /// The key submitted on the last successful activation. `None` when never activated or
    /// after deactivation.
    pub license_key: Option<String>,
    pub is_active: bool,
    /// When the server last acknowledged a version report.
    pub last_version_report_at: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// Returns the stored key, treating an empty one as absent.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.license_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Returns the key only if the license is also flagged active.
    #[must_use]
    pub fn active_key(&self) -> Option<&str> {
        if self.is_active {
            self.key()
        } else {
            None
        }
    }
}

/// Names of the persisted options and of the periodic version-report task.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionNames {
    pub license_key: String,
    pub license_active: String,
    pub last_version_report: String,
    pub version_update_task: String,
}

impl OptionNames {
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            license_key: format!("{prefix}_license_key"),
            license_active: format!("{prefix}_license_active"),
            last_version_report: format!("{prefix}_last_version_report"),
            version_update_task: format!("{prefix}_daily_version_update"),
        }
    }
}
