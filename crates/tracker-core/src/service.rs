//! [`Tracker`], the entry points the outer layers call.
//!
//! Ingestion and archival each run under their own [`NamedLock`], so two
//! submissions never interleave their header extensions and two archival
//! passes never interleave their moves. Resolving a row takes both, always
//! ingestion first, since row indices are only stable while no archival pass
//! is deleting rows. Archival never takes the ingestion lock.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::{
  Error, Result,
  archive::{self, ArchiveReport},
  config::TrackerConfig,
  ingest::{IngestOutcome, ingest},
  lock::NamedLock,
  notify::{Notifier, debug_message},
  store::{TableKind, TableSnapshot, TableStore},
  submission::Submission,
  summary::append_summary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
  #[serde(flatten)]
  pub ingest:      IngestOutcome,
  pub summary_row: usize,
}

/// Shared handle over a store, its configuration and both locks.
///
/// Cloning is cheap; clones share the store and the locks.
pub struct Tracker<S> {
  store:     Arc<S>,
  config:    Arc<TrackerConfig>,
  notifier:  Option<Arc<dyn Notifier>>,
  ingestion: NamedLock,
  archival:  NamedLock,
}

impl<S> Clone for Tracker<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      config:    Arc::clone(&self.config),
      notifier:  self.notifier.clone(),
      ingestion: self.ingestion.clone(),
      archival:  self.archival.clone(),
    }
  }
}

impl<S: TableStore> Tracker<S> {
  pub fn new(store: Arc<S>, config: TrackerConfig) -> Self {
    Self {
      store,
      config: Arc::new(config),
      notifier: None,
      ingestion: NamedLock::new("ingestion"),
      archival: NamedLock::new("archival"),
    }
  }

  /// Send a debug notification for every accepted submission.
  pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
    self.notifier = Some(notifier);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &TrackerConfig { &self.config }

  /// Ingest `submission` and append its summary row.
  ///
  /// Returns [`Error::LockTimeout`] without touching the store when another
  /// submission holds the ingestion lock for longer than the configured wait.
  pub async fn submit(&self, submission: &Submission) -> Result<SubmitOutcome> {
    let _guard = self.ingestion.acquire(self.config.lock_timeout()).await?;

    if let Some(notifier) = &self.notifier {
      let (subject, body) = debug_message(submission);
      notifier.notify(&subject, &body);
    }

    let ingest = ingest(&*self.store, &self.config, submission, Utc::now()).await?;
    let summary_row = append_summary(&*self.store, &self.config, submission).await?;

    Ok(SubmitOutcome { ingest, summary_row })
  }

  /// Run one archival pass, or return [`Error::LockTimeout`] if another pass
  /// is still running after the configured wait.
  pub async fn run_archival(&self) -> Result<ArchiveReport> {
    let _guard = self.archival.acquire(self.config.lock_timeout()).await?;
    Ok(archive::archive_resolved(&*self.store, &self.config).await)
  }

  /// Mark a row resolved.
  ///
  /// `row` is an index into the table as last read; it stays valid only
  /// until the next archival pass removes rows above it. Holding both locks
  /// keeps a pass from shifting the table between the bounds check and the
  /// write, and keeps header extensions out too.
  pub async fn resolve_row(
    &self,
    kind: TableKind,
    row: usize,
    comment: Option<String>,
  ) -> Result<()> {
    let timeout = self.config.lock_timeout();
    let _ingestion = self.ingestion.acquire(timeout).await?;
    let _archival = self.archival.acquire(timeout).await?;
    archive::resolve_row(&*self.store, &self.config, kind, row, comment).await
  }

  pub async fn read_table(&self, kind: TableKind) -> Result<TableSnapshot> {
    let name = self.config.table_name(kind);
    let header = self
      .store
      .read_header(name)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::TableNotFound(name.to_owned()))?;
    let rows = self.store.read_rows(name).await.map_err(Error::store)?;
    Ok(TableSnapshot { name: name.to_owned(), header, rows })
  }
}
