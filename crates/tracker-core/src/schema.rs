//! [`SchemaRegistry`]: the ordered column set of one table.
//!
//! Columns are only ever appended. A column's position, once assigned, never
//! changes, and every extension is written through to the store's header
//! before the registry reports the new position.

use std::collections::HashMap;

use crate::{Error, Result, store::TableStore};

pub struct SchemaRegistry<'s, S> {
  store:     &'s S,
  table:     String,
  columns:   Vec<String>,
  positions: HashMap<String, usize>,
  added:     Vec<String>,
}

impl<'s, S: TableStore> SchemaRegistry<'s, S> {
  /// Read the current header of `table`.
  pub async fn load(store: &'s S, table: &str) -> Result<Self> {
    let header = store
      .read_header(table)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::TableNotFound(table.to_owned()))?;
    Ok(Self::from_header(store, table, header))
  }

  /// Wrap a header that was already read from `store`.
  pub fn from_header(store: &'s S, table: &str, header: Vec<String>) -> Self {
    let mut positions = HashMap::with_capacity(header.len());
    for (i, name) in header.iter().enumerate() {
      // Duplicate names from an external edit: the first one wins.
      positions.entry(name.clone()).or_insert(i);
    }
    Self {
      store,
      table: table.to_owned(),
      columns: header,
      positions,
      added: Vec::new(),
    }
  }

  pub fn table(&self) -> &str { &self.table }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  pub fn position(&self, name: &str) -> Option<usize> { self.positions.get(name).copied() }

  /// Columns appended through this registry, in the order they were added.
  pub fn added(&self) -> &[String] { &self.added }

  /// Return the position of `name`, appending it to the header first if the
  /// table does not have it yet.
  pub async fn ensure_column(&mut self, name: &str) -> Result<usize> {
    if let Some(existing) = self.position(name) {
      return Ok(existing);
    }

    let index = self.columns.len();
    self
      .store
      .write_header_cell(&self.table, index, name.to_owned())
      .await
      .map_err(Error::store)?;

    self.columns.push(name.to_owned());
    self.positions.insert(name.to_owned(), index);
    self.added.push(name.to_owned());
    tracing::debug!(table = %self.table, column = name, index, "added column");
    Ok(index)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  async fn store_with(header: &[&str]) -> MemoryStore {
    let store = MemoryStore::new();
    store
      .create_table("t", header.iter().map(|s| s.to_string()).collect())
      .await
      .unwrap();
    store
  }

  #[tokio::test]
  async fn ensure_is_idempotent() {
    let store = store_with(&["Resolved", "Comment", "Timestamp"]).await;
    let mut schema = SchemaRegistry::load(&store, "t").await.unwrap();

    let first = schema.ensure_column("answers.Site.value").await.unwrap();
    let header_once = store.read_header("t").await.unwrap();
    let second = schema.ensure_column("answers.Site.value").await.unwrap();
    let header_twice = store.read_header("t").await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 3);
    assert_eq!(header_once, header_twice);
    assert_eq!(schema.added(), ["answers.Site.value"]);
  }

  #[tokio::test]
  async fn existing_columns_keep_their_position() {
    let store = store_with(&["Resolved", "Comment", "Timestamp"]).await;
    let mut schema = SchemaRegistry::load(&store, "t").await.unwrap();

    assert_eq!(schema.ensure_column("Timestamp").await.unwrap(), 2);
    assert!(schema.added().is_empty());
  }

  #[tokio::test]
  async fn first_ensure_order_is_column_order() {
    let store = store_with(&[]).await;
    let mut schema = SchemaRegistry::load(&store, "t").await.unwrap();

    for name in ["b", "a", "c", "a"] {
      schema.ensure_column(name).await.unwrap();
    }

    assert_eq!(
      store.read_header("t").await.unwrap().unwrap(),
      ["b", "a", "c"]
    );
  }

  #[tokio::test]
  async fn duplicate_header_names_resolve_to_first() {
    let store = store_with(&["x", "y", "x"]).await;
    let schema = SchemaRegistry::load(&store, "t").await.unwrap();
    assert_eq!(schema.position("x"), Some(0));
  }

  #[tokio::test]
  async fn missing_table_is_reported() {
    let store = MemoryStore::new();
    let err = SchemaRegistry::load(&store, "nope").await.err().unwrap();
    assert!(matches!(err, Error::TableNotFound(t) if t == "nope"));
  }
}
