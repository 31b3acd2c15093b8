use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::license::LicenseClient;

/// Pause between an update of the plugin and reporting its new version.
pub const UPGRADE_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Host events which may lead to a version report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// The host finished installing or updating packages.
    UpgradeCompleted(UpgradeNotice),
    /// A periodic task fired.
    Scheduled(String),
    /// The plugin itself was (re)activated in the host.
    PluginActivated,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct UpgradeNotice {
    pub action: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl UpgradeNotice {
    fn updated(&self, plugin_basename: &str) -> bool {
        self.action == "update"
            && self.kind == "plugin"
            && self.plugins.iter().any(|p| p == plugin_basename)
    }
}

/// Handles one trigger. Returns the outcome of the version report, or `None` when the
/// trigger did not call for one.
pub async fn dispatch(client: &LicenseClient, trigger: Trigger) -> Option<bool> {
    match trigger {
        Trigger::UpgradeCompleted(notice) => {
            if !notice.updated(&client.settings().plugin_basename) {
                return None;
            }
            tokio::time::sleep(UPGRADE_SETTLE_DELAY).await;
            Some(client.update_version().await)
        }
        Trigger::Scheduled(task) => {
            if task != client.options().version_update_task {
                tracing::debug!(task = %task, "ignoring unknown scheduled task");
                return None;
            }
            Some(client.update_version().await)
        }
        Trigger::PluginActivated => match client.record().await {
            Ok(record) if record.active_key().is_some() => Some(client.update_version().await),
            Ok(_) => None,
            Err(err) => {
                tracing::error!(error = %err, "failed to read the license record");
                None
            }
        },
    }
}

/// Processes triggers one after the other until every sender is gone.
pub async fn run(client: Arc<LicenseClient>, mut triggers: UnboundedReceiver<Trigger>) {
    while let Some(trigger) = triggers.recv().await {
        tracing::debug!(?trigger, "handling trigger");
        if let Some(reported) = dispatch(&client, trigger).await {
            tracing::debug!(reported, "version report finished");
        }
    }
}
