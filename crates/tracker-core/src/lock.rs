//! Named mutual-exclusion locks with a bounded wait.
//!
//! A pipeline run holds its lock for its whole duration. The guard releases
//! the lock when dropped, on every exit path.

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{Error, Result};

/// Proof that a [`NamedLock`] is held.
pub type LockGuard = OwnedMutexGuard<()>;

#[derive(Debug, Clone)]
pub struct NamedLock {
  name:  &'static str,
  inner: Arc<Mutex<()>>,
}

impl NamedLock {
  pub fn new(name: &'static str) -> Self { Self { name, inner: Arc::new(Mutex::new(())) } }

  pub fn name(&self) -> &'static str { self.name }

  /// Wait at most `wait` for the lock.
  pub async fn acquire(&self, wait: Duration) -> Result<LockGuard> {
    tracing::debug!(lock = self.name, "acquiring lock");
    match tokio::time::timeout(wait, self.inner.clone().lock_owned()).await {
      Ok(guard) => {
        tracing::debug!(lock = self.name, "acquired lock");
        Ok(guard)
      }
      Err(_) => {
        tracing::warn!(lock = self.name, ?wait, "lock wait timed out");
        Err(Error::LockTimeout { lock: self.name, waited: wait })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn second_holder_times_out() {
    let lock = NamedLock::new("ingestion");
    let _held = lock.acquire(Duration::from_millis(10)).await.unwrap();

    let err = lock.acquire(Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, Error::LockTimeout { lock: "ingestion", .. }));
  }

  #[tokio::test]
  async fn dropping_the_guard_releases() {
    let lock = NamedLock::new("archival");
    drop(lock.acquire(Duration::from_millis(10)).await.unwrap());
    assert!(lock.acquire(Duration::from_millis(10)).await.is_ok());
  }

  #[tokio::test]
  async fn clones_share_the_lock() {
    let lock = NamedLock::new("ingestion");
    let other = lock.clone();
    let _held = lock.acquire(Duration::from_millis(10)).await.unwrap();
    assert!(other.acquire(Duration::from_millis(10)).await.is_err());
  }
}
