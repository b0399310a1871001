//! The summary projection: one fixed-width row per submission.

use serde_json::Value;

use crate::{
  Error, Result,
  config::{ColumnFormat, SummaryColumn, TrackerConfig},
  store::{TableKind, TableStore},
  submission::Submission,
  value::{Cell, Row},
};

/// Loose truthiness for yes/no columns.
fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => matches!(
      s.trim().to_ascii_lowercase().as_str(),
      "yes" | "true" | "y" | "1"
    ),
    _ => false,
  }
}

fn project_column(column: &SummaryColumn, submission: &Submission) -> Cell {
  let Some(path) = &column.path else {
    return Cell::Empty;
  };
  let value = submission.get(path);
  match column.format {
    ColumnFormat::YesNo => {
      let label = if value.is_some_and(is_truthy) { "yes" } else { "no" };
      Cell::from(label)
    }
    ColumnFormat::Raw => value.map(Cell::from_json).unwrap_or_default(),
  }
}

/// Build the summary row for `submission`. Its length is always the number
/// of configured summary columns.
pub fn project(config: &TrackerConfig, submission: &Submission) -> Row {
  config
    .summary_columns
    .iter()
    .map(|column| project_column(column, submission))
    .collect()
}

/// Append the summary row for `submission`, creating the summary table with
/// its fixed header on first use. Returns the data row index.
pub async fn append_summary<S: TableStore>(
  store: &S,
  config: &TrackerConfig,
  submission: &Submission,
) -> Result<usize> {
  let table = config.table_name(TableKind::Summary);

  if store
    .create_table(table, config.summary_header())
    .await
    .map_err(Error::store)?
  {
    tracing::info!(table, "created summary table");
  }

  let row = store
    .append_row(table, project(config, submission))
    .await
    .map_err(Error::store)?;
  tracing::debug!(table, row, "appended summary row");
  Ok(row)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn full_submission() -> Submission {
    Submission::new(json!({
      "metadata": { "submission_id": "97026957" },
      "answers": {
        "Job_Type": { "value": "Installation" },
        "Compliant": { "value": false },
        "Remedial_Required": { "value": true },
        "Plot_No": { "value": 99 },
        "Non_Compliance": {
          "values": [{ "Reason": { "value": "Test 1" }, "Severity": { "value": "1" } }],
        },
      },
    }))
  }

  fn cell<'a>(config: &TrackerConfig, row: &'a Row, name: &str) -> &'a Cell {
    let index = config
      .summary_columns
      .iter()
      .position(|c| c.name == name)
      .unwrap();
    &row[index]
  }

  #[test]
  fn yes_no_columns_are_normalised() {
    let config = TrackerConfig::default();
    let row = project(&config, &full_submission());

    assert_eq!(cell(&config, &row, "Compliant"), &Cell::from("no"));
    assert_eq!(cell(&config, &row, "Remedial_Required"), &Cell::from("yes"));
  }

  #[test]
  fn values_pass_through_and_misses_are_empty() {
    let config = TrackerConfig::default();
    let row = project(&config, &full_submission());

    assert_eq!(cell(&config, &row, "Job_Type"), &Cell::from("Installation"));
    assert_eq!(cell(&config, &row, "Plot_No"), &Cell::Integer(99));
    assert_eq!(cell(&config, &row, "Non_Compliance.Reason"), &Cell::from("Test 1"));
    assert_eq!(cell(&config, &row, "submissionid"), &Cell::from("97026957"));
    assert_eq!(cell(&config, &row, "Auditor"), &Cell::Empty);
    assert_eq!(cell(&config, &row, "Team"), &Cell::Empty);
  }

  #[test]
  fn width_is_fixed_regardless_of_input() {
    let config = TrackerConfig::default();
    let width = config.summary_columns.len();

    let empty = Submission::new(json!({}));
    let odd = Submission::new(json!({ "answers": [1, 2, 3], "extra": { "a": 1 } }));

    assert_eq!(project(&config, &empty).len(), width);
    assert_eq!(project(&config, &odd).len(), width);
    assert_eq!(project(&config, &full_submission()).len(), width);
  }

  #[test]
  fn absent_yes_no_reads_no() {
    let config = TrackerConfig::default();
    let row = project(&config, &Submission::new(json!({})));
    assert_eq!(cell(&config, &row, "Compliant"), &Cell::from("no"));
  }

  #[test]
  fn truthiness() {
    for v in [json!(true), json!(1), json!("Yes"), json!("TRUE"), json!("y")] {
      assert!(is_truthy(&v), "{v}");
    }
    for v in [json!(false), json!(0), json!("no"), json!(""), json!(null), json!([1])] {
      assert!(!is_truthy(&v), "{v}");
    }
  }
}
