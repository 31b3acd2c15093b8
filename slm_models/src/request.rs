use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The operation requested from the SLM server, sent as `slm_action`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Action {
    #[serde(rename = "slm_activate")]
    Activate,
    #[serde(rename = "slm_update_version")]
    UpdateVersion,
    #[serde(rename = "slm_deactivate")]
    Deactivate,
    #[serde(rename = "slm_check")]
    Check,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Activate => "slm_activate",
            Action::UpdateVersion => "slm_update_version",
            Action::Deactivate => "slm_deactivate",
            Action::Check => "slm_check",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// The outgoing parameter set of a single SLM call.
///
/// Fields which are `None` are left out of the query string or form body, the
/// remaining ones keep their declaration order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RequestEnvelope {
    #[serde(rename = "slm_action")]
    pub action: Action,
    pub secret_key: String,
    pub license_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The product being reported to the server on activation and version updates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Installation<'a> {
    pub registered_domain: &'a str,
    pub item_reference: &'a str,
    pub version: &'a str,
}

impl RequestEnvelope {
    #[must_use]
    pub fn activate(secret_key: &str, license_key: &str, installation: &Installation<'_>) -> Self {
        Self::with_installation(Action::Activate, secret_key, license_key, installation)
    }

    #[must_use]
    pub fn update_version(
        secret_key: &str,
        license_key: &str,
        installation: &Installation<'_>,
    ) -> Self {
        Self::with_installation(Action::UpdateVersion, secret_key, license_key, installation)
    }

    #[must_use]
    pub fn deactivate(secret_key: &str, license_key: &str, registered_domain: &str) -> Self {
        Self {
            action: Action::Deactivate,
            secret_key: secret_key.to_string(),
            license_key: license_key.to_string(),
            registered_domain: Some(registered_domain.to_string()),
            item_reference: None,
            version: None,
        }
    }

    #[must_use]
    pub fn check(secret_key: &str, license_key: &str) -> Self {
        Self {
            action: Action::Check,
            secret_key: secret_key.to_string(),
            license_key: license_key.to_string(),
            registered_domain: None,
            item_reference: None,
            version: None,
        }
    }

    fn with_installation(
        action: Action,
        secret_key: &str,
        license_key: &str,
        installation: &Installation<'_>,
    ) -> Self {
        Self {
            action,
            secret_key: secret_key.to_string(),
            license_key: license_key.to_string(),
            registered_domain: Some(installation.registered_domain.to_string()),
            item_reference: Some(installation.item_reference.to_string()),
            version: Some(installation.version.to_string()),
        }
    }
}
