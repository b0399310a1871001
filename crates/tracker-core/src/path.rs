//! Dotted paths with bracket indices, e.g. `answers.Non_Compliance.values[0].Reason.value`.
//!
//! A path is parsed once into typed [`Segment`]s and then evaluated against a
//! JSON tree. Evaluation never fails: a missing key, a container of the wrong
//! kind, or an out-of-range index all resolve to `None`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Field(String),
  Index(usize),
}

/// A parsed extraction path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
  segments: Vec<Segment>,
}

impl Path {
  pub fn parse(text: &str) -> Result<Self> {
    let invalid = |reason: &str| Error::InvalidPath {
      path:   text.to_owned(),
      reason: reason.to_owned(),
    };

    if text.is_empty() {
      return Err(invalid("path is empty"));
    }

    let mut segments = Vec::new();
    for part in text.split('.') {
      let (name, mut rest) = match part.find('[') {
        Some(at) => part.split_at(at),
        None => (part, ""),
      };
      if name.is_empty() {
        return Err(invalid("empty field name"));
      }
      if name.contains(']') {
        return Err(invalid("unexpected `]`"));
      }
      segments.push(Segment::Field(name.to_owned()));

      while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
          return Err(invalid("unexpected text after `]`"));
        };
        let Some(close) = inner.find(']') else {
          return Err(invalid("unclosed `[`"));
        };
        let digits = &inner[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
          return Err(invalid("index must be a non-negative integer"));
        }
        let index = digits
          .parse()
          .map_err(|_| invalid("index out of range"))?;
        segments.push(Segment::Index(index));
        rest = &inner[close + 1..];
      }
    }

    Ok(Self { segments })
  }

  /// Build a path from segments that are already typed.
  pub fn from_segments(segments: Vec<Segment>) -> Self { Self { segments } }

  pub fn segments(&self) -> &[Segment] { &self.segments }

  /// Resolve this path against `root`.
  pub fn extract<'a>(&self, root: &'a Value) -> Option<&'a Value> {
    self.segments.iter().try_fold(root, |node, segment| match segment {
      Segment::Field(name) => node.as_object()?.get(name),
      Segment::Index(i) => node.as_array()?.get(*i),
    })
  }
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.segments.iter().enumerate() {
      match segment {
        Segment::Field(name) if i == 0 => f.write_str(name)?,
        Segment::Field(name) => write!(f, ".{name}")?,
        Segment::Index(index) => write!(f, "[{index}]")?,
      }
    }
    Ok(())
  }
}

impl FromStr for Path {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Path {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<Path> for String {
  fn from(p: Path) -> Self { p.to_string() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn submission() -> Value {
    json!({
      "metadata": { "submission_id": "97026957" },
      "answers": {
        "Job_Type": { "value": "Installation" },
        "Non_Compliance": {
          "values": [
            { "Reason": { "value": "Test 1" }, "Severity": { "value": "1" } },
          ],
        },
      },
    })
  }

  #[test]
  fn parses_fields_and_indices() {
    let path: Path = "a.b[0][12].c".parse().unwrap();
    assert_eq!(path.segments(), &[
      Segment::Field("a".into()),
      Segment::Field("b".into()),
      Segment::Index(0),
      Segment::Index(12),
      Segment::Field("c".into()),
    ]);
    assert_eq!(path.to_string(), "a.b[0][12].c");
  }

  #[test]
  fn rejects_malformed_paths() {
    for bad in ["", "a..b", ".a", "a[", "a[]", "a[x]", "a[-1]", "a[0]b", "a]"] {
      let err = Path::parse(bad).unwrap_err();
      assert!(
        matches!(err, Error::InvalidPath { .. }),
        "{bad:?} should be rejected, got {err:?}"
      );
    }
  }

  #[test]
  fn extracts_through_arrays() {
    let root = submission();
    let path = Path::parse("answers.Non_Compliance.values[0].Reason.value").unwrap();
    assert_eq!(path.extract(&root), Some(&json!("Test 1")));
  }

  #[test]
  fn misses_resolve_to_none() {
    let root = submission();
    for miss in [
      "answers.Missing.value",
      "answers.Non_Compliance.values[1].Reason.value",
      "answers.Job_Type[0]",
      "answers.Job_Type.value.deeper",
      "metadata.submission_id[0]",
    ] {
      let path = Path::parse(miss).unwrap();
      assert_eq!(path.extract(&root), None, "{miss}");
    }
  }

  #[test]
  fn deserializes_from_string() {
    let path: Path = serde_json::from_value(json!("metadata.submission_id")).unwrap();
    assert_eq!(path.to_string(), "metadata.submission_id");
    assert!(serde_json::from_value::<Path>(json!("a[")).is_err());
  }
}
