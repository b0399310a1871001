//! [`TrackerConfig`]: the immutable configuration threaded into every
//! pipeline.
//!
//! Every field has a default matching the production audit form, so a config
//! file only needs to name what it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
  path::{Path, Segment},
  store::TableKind,
};

// ─── Table names ─────────────────────────────────────────────────────────────

/// Store-level names of the five logical tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
  pub panel:               String,
  pub electrical:          String,
  pub resolved_panel:      String,
  pub resolved_electrical: String,
  pub summary:             String,
}

impl Default for TableNames {
  fn default() -> Self {
    Self {
      panel:               "Non-compliant Panel Installations".into(),
      electrical:          "Non-compliant Electrical Installations".into(),
      resolved_panel:      "Resolved Non-compliant Panel Installations".into(),
      resolved_electrical: "Resolved Non-compliant Electrical Installations".into(),
      summary:             "Summary".into(),
    }
  }
}

// ─── Reserved columns ────────────────────────────────────────────────────────

/// Names of the management columns carried by active and archive tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
  pub resolved:  String,
  pub comment:   String,
  pub timestamp: String,
  /// The stored column archival routes on.
  pub job_type:  String,
}

impl Default for ColumnNames {
  fn default() -> Self {
    Self {
      resolved:  "Resolved".into(),
      comment:   "Comment".into(),
      timestamp: "Timestamp".into(),
      job_type:  "answers.Job_Type.value".into(),
    }
  }
}

impl ColumnNames {
  /// Header of a freshly created active or archive table.
  pub fn reserved(&self) -> Vec<String> {
    vec![self.resolved.clone(), self.comment.clone(), self.timestamp.clone()]
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Where ingestion reads the routing fields from, and what they must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classification {
  pub job_type_path:     Path,
  pub authorised_path:   Path,
  /// Job type value that routes to the panel tables.
  pub installation:      String,
}

impl Default for Classification {
  fn default() -> Self {
    Self {
      job_type_path:   answer("Job_Type"),
      authorised_path: answer("Authorised_for_NC"),
      installation:    "Installation".into(),
    }
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// How an extracted value is written into a summary cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFormat {
  /// The extracted value as-is.
  #[default]
  Raw,
  /// `"yes"` when the value is truthy, `"no"` otherwise.
  YesNo,
}

/// One column of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryColumn {
  pub name:   String,
  /// `None` leaves the column permanently empty.
  #[serde(default)]
  pub path:   Option<Path>,
  #[serde(default)]
  pub format: ColumnFormat,
}

impl SummaryColumn {
  fn mapped(name: &str, path: Path, format: ColumnFormat) -> Self {
    Self { name: name.into(), path: Some(path), format }
  }

  /// A column reading `answers.<name>.value`.
  fn answer(name: &str, format: ColumnFormat) -> Self { Self::mapped(name, answer(name), format) }

  fn unmapped(name: &str) -> Self {
    Self { name: name.into(), path: None, format: ColumnFormat::Raw }
  }
}

fn default_summary_columns() -> Vec<SummaryColumn> {
  use ColumnFormat::{Raw, YesNo};
  vec![
    SummaryColumn::answer("Audit_Date", Raw),
    SummaryColumn::answer("Install_date", Raw),
    SummaryColumn::answer("Auditor", Raw),
    SummaryColumn::answer("Job_Type", Raw),
    SummaryColumn::answer("Installer", Raw),
    SummaryColumn::answer("Compliant", YesNo),
    SummaryColumn::mapped(
      "Non_Compliance.Reason",
      first_item_answer("Non_Compliance", "Reason"),
      Raw,
    ),
    SummaryColumn::mapped(
      "Non_Compliance.Severity",
      first_item_answer("Non_Compliance", "Severity"),
      Raw,
    ),
    SummaryColumn::answer("Site", Raw),
    SummaryColumn::answer("Job_No", Raw),
    SummaryColumn::answer("Plot_No", Raw),
    SummaryColumn::unmapped("Team"),
    SummaryColumn::answer("Audit_Type", Raw),
    SummaryColumn::answer("Authorised_for_NC", Raw),
    SummaryColumn::answer("Remedial_Required", YesNo),
    SummaryColumn::answer("Remedial_Details", Raw),
    SummaryColumn::answer("Notes", Raw),
    SummaryColumn::mapped(
      "submissionid",
      Path::from_segments(vec![field("metadata"), field("submission_id")]),
      Raw,
    ),
  ]
}

fn field(name: &str) -> Segment { Segment::Field(name.to_owned()) }

/// `answers.<name>.value`
fn answer(name: &str) -> Path {
  Path::from_segments(vec![field("answers"), field(name), field("value")])
}

/// `answers.<list>.values[0].<name>.value`
fn first_item_answer(list: &str, name: &str) -> Path {
  Path::from_segments(vec![
    field("answers"),
    field(list),
    field("values"),
    Segment::Index(0),
    field(name),
    field("value"),
  ])
}

// ─── TrackerConfig ───────────────────────────────────────────────────────────

/// Everything the pipelines need to know that is not in the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  pub tables:            TableNames,
  pub columns:           ColumnNames,
  pub classification:    Classification,
  pub summary_columns:   Vec<SummaryColumn>,
  /// How long a pipeline waits for its lock before giving up.
  pub lock_timeout_secs: u64,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      tables:            TableNames::default(),
      columns:           ColumnNames::default(),
      classification:    Classification::default(),
      summary_columns:   default_summary_columns(),
      lock_timeout_secs: 30,
    }
  }
}

impl TrackerConfig {
  pub fn table_name(&self, kind: TableKind) -> &str {
    match kind {
      TableKind::Panel => &self.tables.panel,
      TableKind::Electrical => &self.tables.electrical,
      TableKind::ResolvedPanel => &self.tables.resolved_panel,
      TableKind::ResolvedElectrical => &self.tables.resolved_electrical,
      TableKind::Summary => &self.tables.summary,
    }
  }

  pub fn lock_timeout(&self) -> Duration { Duration::from_secs(self.lock_timeout_secs) }

  /// Summary header, in fixed column order.
  pub fn summary_header(&self) -> Vec<String> {
    self.summary_columns.iter().map(|c| c.name.clone()).collect()
  }

  /// Archive table that receives a resolved row with this job type.
  pub fn archive_for(&self, job_type: &str) -> TableKind {
    if job_type == self.classification.installation {
      TableKind::ResolvedPanel
    } else {
      TableKind::ResolvedElectrical
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn defaults_match_the_audit_form() {
    let config = TrackerConfig::default();
    assert_eq!(config.summary_columns.len(), 18);
    assert_eq!(config.summary_header()[6], "Non_Compliance.Reason");
    assert!(config.summary_columns[11].path.is_none());
    assert_eq!(config.lock_timeout(), Duration::from_secs(30));
    assert_eq!(config.columns.reserved(), ["Resolved", "Comment", "Timestamp"]);
  }

  #[test]
  fn default_paths_render_as_written_on_the_form() {
    let config = TrackerConfig::default();
    let path = |i: usize| config.summary_columns[i].path.as_ref().unwrap().to_string();

    assert_eq!(config.classification.job_type_path.to_string(), "answers.Job_Type.value");
    assert_eq!(path(0), "answers.Audit_Date.value");
    assert_eq!(path(6), "answers.Non_Compliance.values[0].Reason.value");
    assert_eq!(path(17), "metadata.submission_id");

    // Every default reparses to the same path.
    for column in &config.summary_columns {
      if let Some(p) = &column.path {
        assert_eq!(&Path::parse(&p.to_string()).unwrap(), p, "{}", column.name);
      }
    }
  }

  #[test]
  fn partial_overrides_keep_other_defaults() {
    let config: TrackerConfig = serde_json::from_value(json!({
      "tables": { "summary": "Audit Summary" },
      "lock_timeout_secs": 5,
    }))
    .unwrap();

    assert_eq!(config.table_name(TableKind::Summary), "Audit Summary");
    assert_eq!(config.table_name(TableKind::Panel), "Non-compliant Panel Installations");
    assert_eq!(config.lock_timeout_secs, 5);
    assert_eq!(config.summary_columns.len(), 18);
  }

  #[test]
  fn archive_routing_keys_on_installation() {
    let config = TrackerConfig::default();
    assert_eq!(config.archive_for("Installation"), TableKind::ResolvedPanel);
    assert_eq!(config.archive_for("Electrical"), TableKind::ResolvedElectrical);
    assert_eq!(config.archive_for(""), TableKind::ResolvedElectrical);
  }
}
