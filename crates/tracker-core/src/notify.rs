//! Outbound notifications.
//!
//! Notifications are fire-and-forget: implementations must not block the
//! caller and must not report failure back into the pipeline.

use crate::submission::Submission;

pub trait Notifier: Send + Sync {
  fn notify(&self, subject: &str, body: &str);
}

pub const DEBUG_SUBJECT: &str = "Debug Output: Non-compliant Audit Data";

/// Subject and body of the debug notification sent for each submission.
pub fn debug_message(submission: &Submission) -> (String, String) {
  let pretty = submission
    .to_pretty_json()
    .unwrap_or_else(|_| submission.document().to_string());
  (
    DEBUG_SUBJECT.to_owned(),
    format!("JSON Data for non-compliant audit:\n\n{pretty}"),
  )
}
