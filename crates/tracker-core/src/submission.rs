//! [`Submission`]: one audit record as received.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, path::Path};

/// An audit submission: a `metadata` envelope and an `answers` map.
///
/// The document is kept as received, key order included, and is never
/// mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission(Value);

impl Submission {
  pub const METADATA: &'static str = "metadata";
  pub const ANSWERS: &'static str = "answers";

  pub fn new(document: Value) -> Self { Self(document) }

  pub fn from_slice(bytes: &[u8]) -> Result<Self> { Ok(Self(serde_json::from_slice(bytes)?)) }

  pub fn document(&self) -> &Value { &self.0 }

  pub fn metadata(&self) -> Option<&Value> { self.0.get(Self::METADATA) }

  pub fn answers(&self) -> Option<&Value> { self.0.get(Self::ANSWERS) }

  /// Resolve `path` against the whole document.
  pub fn get(&self, path: &Path) -> Option<&Value> { path.extract(&self.0) }

  /// `metadata.submission_id`, if it is present as a string or number.
  pub fn submission_id(&self) -> Option<String> {
    match self.metadata()?.get("submission_id")? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  pub fn to_pretty_json(&self) -> Result<String> { Ok(serde_json::to_string_pretty(&self.0)?) }
}

impl From<Value> for Submission {
  fn from(document: Value) -> Self { Self(document) }
}
