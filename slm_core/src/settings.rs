use hyper::Uri;
use slm_models::request::Installation;

use crate::error::SlmError;

/// Everything the client needs to know about the server and the product it reports.
#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub server_url: String,
    pub secret_key: String,
    /// Hostname the license is activated under.
    pub registered_domain: String,
    pub item_reference: String,
    pub version: String,
    /// Identifier of the plugin in update notifications, e.g. `my-plugin/my-plugin.php`.
    pub plugin_basename: String,
    pub option_prefix: String,
}

impl ClientSettings {
    #[must_use]
    pub fn installation(&self) -> Installation<'_> {
        Installation {
            registered_domain: &self.registered_domain,
            item_reference: &self.item_reference,
            version: &self.version,
        }
    }
}

/// Extracts the host of the site URL, which is what the server scopes activations to.
pub fn registered_domain(site_url: &str) -> Result<String, SlmError> {
    let uri = site_url
        .trim()
        .parse::<Uri>()
        .map_err(|err| SlmError::config(format!("invalid site url {site_url:?}: {err}")))?;
    match uri.host() {
        Some(host) if !host.is_empty() => Ok(host.to_ascii_lowercase()),
        _ => Err(SlmError::config(format!("site url {site_url:?} has no host"))),
    }
}
