//! The ingestion pipeline: classify a submission, then flatten it into a new
//! row of the matching active table, widening the table's header as needed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::{
  Error, Result,
  config::TrackerConfig,
  flatten::flatten,
  schema::SchemaRegistry,
  store::{TableKind, TableStore},
  submission::Submission,
  value::{Cell, Row},
};

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
  pub kind:          TableKind,
  pub table:         String,
  /// Data row index of the appended row.
  pub row:           usize,
  pub added_columns: Vec<String>,
}

/// Pick the active table for `submission`.
///
/// Authorised installations go to the panel table; every other combination
/// goes to the electrical table. A missing job type is fatal.
pub fn classify(config: &TrackerConfig, submission: &Submission) -> Result<TableKind> {
  let rules = &config.classification;

  let job_type = match submission.get(&rules.job_type_path) {
    None | Some(Value::Null) => {
      return Err(Error::MalformedSubmission(format!(
        "{} is missing",
        rules.job_type_path
      )));
    }
    Some(Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
  };

  let authorised = submission
    .get(&rules.authorised_path)
    .is_some_and(is_affirmative);

  Ok(if job_type == rules.installation && authorised {
    TableKind::Panel
  } else {
    TableKind::Electrical
  })
}

/// `true`, or a string reading `yes` / `true` in any case.
fn is_affirmative(value: &Value) -> bool {
  match value {
    Value::Bool(b) => *b,
    Value::String(s) => {
      let s = s.trim().to_ascii_lowercase();
      s == "yes" || s == "true"
    }
    _ => false,
  }
}

/// Place `cell` at `index`, growing the buffer with empty cells.
fn set(row: &mut Row, index: usize, cell: Cell) {
  if row.len() <= index {
    row.resize(index + 1, Cell::Empty);
  }
  row[index] = cell;
}

/// Ingest `submission` into its active table, stamping it with `now`.
///
/// Classification happens before any write, so a malformed submission leaves
/// the store untouched.
pub async fn ingest<S: TableStore>(
  store: &S,
  config: &TrackerConfig,
  submission: &Submission,
  now: DateTime<Utc>,
) -> Result<IngestOutcome> {
  let kind = classify(config, submission)?;
  let table = config.table_name(kind);
  let columns = &config.columns;

  if store
    .create_table(table, columns.reserved())
    .await
    .map_err(Error::store)?
  {
    tracing::info!(table, "created active table");
  }

  let mut schema = SchemaRegistry::load(store, table).await?;
  let mut row = Row::new();

  let sections = [
    (Submission::METADATA, submission.metadata()),
    (Submission::ANSWERS, submission.answers()),
  ];
  for (prefix, section) in sections {
    let Some(section) = section else { continue };
    for (path, cell) in flatten(prefix, section) {
      let index = schema.ensure_column(&path).await?;
      set(&mut row, index, cell);
    }
  }

  let timestamp = schema.ensure_column(&columns.timestamp).await?;
  set(&mut row, timestamp, Cell::Timestamp(now));

  let resolved = schema.ensure_column(&columns.resolved).await?;
  schema.ensure_column(&columns.comment).await?;

  // Never longer than the header; trailing unset cells read as empty.
  row.resize(schema.len(), Cell::Empty);

  let index = store.append_row(table, row).await.map_err(Error::store)?;
  store
    .insert_checkbox(table, index, resolved)
    .await
    .map_err(Error::store)?;

  tracing::info!(
    table,
    row = index,
    added_columns = schema.added().len(),
    "ingested submission"
  );

  Ok(IngestOutcome {
    kind,
    table: table.to_owned(),
    row: index,
    added_columns: schema.added().to_vec(),
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn with_answers(answers: Value) -> Submission {
    Submission::new(json!({ "metadata": {}, "answers": answers }))
  }

  #[test]
  fn authorised_installation_routes_to_panel() {
    let config = TrackerConfig::default();
    for auth in [json!("YES"), json!("yes"), json!(" True "), json!(true)] {
      let s = with_answers(json!({
        "Job_Type": { "value": "Installation" },
        "Authorised_for_NC": { "value": auth },
      }));
      assert_eq!(classify(&config, &s).unwrap(), TableKind::Panel, "{auth}");
    }
  }

  #[test]
  fn everything_else_routes_to_electrical() {
    let config = TrackerConfig::default();
    let cases = [
      json!({ "Job_Type": { "value": "Installation" }, "Authorised_for_NC": { "value": "no" } }),
      json!({ "Job_Type": { "value": "Installation" } }),
      json!({ "Job_Type": { "value": "Electrical" }, "Authorised_for_NC": { "value": "YES" } }),
      json!({ "Job_Type": { "value": "installation" }, "Authorised_for_NC": { "value": "YES" } }),
    ];
    for answers in cases {
      let s = with_answers(answers.clone());
      assert_eq!(classify(&config, &s).unwrap(), TableKind::Electrical, "{answers}");
    }
  }

  #[test]
  fn missing_job_type_is_malformed() {
    let config = TrackerConfig::default();
    for answers in [
      json!({}),
      json!({ "Job_Type": {} }),
      json!({ "Job_Type": { "value": null } }),
    ] {
      let err = classify(&config, &with_answers(answers)).unwrap_err();
      assert!(matches!(err, Error::MalformedSubmission(_)));
    }
    let no_answers = Submission::new(json!({ "metadata": {} }));
    assert!(classify(&config, &no_answers).is_err());
  }
}
