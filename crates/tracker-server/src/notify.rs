//! [`Notifier`] implementations: one that logs, one that POSTs to a webhook.

use std::{sync::Arc, time::Duration};

use reqwest::Client;
use serde_json::json;
use tracker_core::notify::Notifier;

use crate::config::DebugConfig;

/// Build the notifier described by `cfg`, or `None` when debug output is off.
pub fn from_config(cfg: &DebugConfig) -> reqwest::Result<Option<Arc<dyn Notifier>>> {
  if !cfg.enabled {
    return Ok(None);
  }
  Ok(Some(match &cfg.webhook_url {
    Some(url) => Arc::new(WebhookNotifier::new(url.clone())?),
    None => Arc::new(LogNotifier),
  }))
}

/// Writes each notification to the log at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn notify(&self, subject: &str, body: &str) {
    tracing::info!(subject, body, "notification");
  }
}

/// Posts `{"subject", "body"}` to a webhook from a detached task.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
  client: Client,
  url:    String,
}

impl WebhookNotifier {
  pub fn new(url: String) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, url })
  }
}

impl Notifier for WebhookNotifier {
  fn notify(&self, subject: &str, body: &str) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      tracing::warn!(subject, "no runtime; dropping notification");
      return;
    };

    let request = self
      .client
      .post(&self.url)
      .json(&json!({ "subject": subject, "body": body }));
    let url = self.url.clone();

    runtime.spawn(async move {
      match request.send().await.and_then(|r| r.error_for_status()) {
        Ok(_) => tracing::debug!(%url, "notification delivered"),
        Err(e) => tracing::warn!(%url, error = %e, "notification failed"),
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn disabled_debug_builds_no_notifier() {
    let cfg = DebugConfig { enabled: false, webhook_url: Some("http://x".into()) };
    assert!(from_config(&cfg).unwrap().is_none());
  }

  #[test]
  fn enabled_debug_without_url_logs() {
    let cfg = DebugConfig { enabled: true, webhook_url: None };
    assert!(from_config(&cfg).unwrap().is_some());
  }

  #[test]
  fn webhook_outside_a_runtime_is_dropped_quietly() {
    let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook".into()).unwrap();
    notifier.notify("subject", "body");
  }
}
