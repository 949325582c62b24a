//! JSON-file backed key/value caches for tips and insights.
//!
//! The whole map lives in memory and is rewritten to disk after every insert.
//! Writes go to `<file>.tmp` first and are renamed over the target, so a crash
//! mid-write leaves the previous file intact.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::error::Result;

pub struct JsonFileCache<V> {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, V>>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    write_lock: Mutex<()>,
}

impl<V> JsonFileCache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Empty cache that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_entries(path.into(), BTreeMap::new())
    }

    /// Seed the cache from `path`.
    ///
    /// A missing file yields an empty cache. So does a file that is not a
    /// valid JSON object of entries, after a warning; the next insert
    /// overwrites it.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, V>>(&bytes) {
                Ok(entries) => {
                    tracing::info!(path = %path.display(), entries = entries.len(), "Loaded cache");
                    entries
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Cache file is malformed, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No cache file yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self::with_entries(path, entries))
    }

    fn with_entries(path: PathBuf, entries: BTreeMap<String, V>) -> Self {
        Self {
            path,
            entries: RwLock::new(entries),
            key_locks: Mutex::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Store `value` and persist the whole cache.
    pub async fn insert(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.entries.write().await.insert(key.into(), value);
        self.persist().await
    }

    pub async fn persist(&self) -> Result<()> {
        let _writer = self.write_lock.lock().await;

        let json = {
            let entries = self.entries.read().await;
            serde_json::to_vec_pretty(&*entries)?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }

    /// Lock shared by every caller working on `key`.
    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.key_locks
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Return the entry for `key`, or run `init` once and store its value.
    ///
    /// Concurrent callers for the same key wait on the key lock and then see
    /// the stored value, so `init` runs at most once per key per process.
    /// The flag is `true` when the value came from the cache.
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: &str, init: F) -> Result<(V, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok((value, true));
        }

        let lock = self.key_lock(key).await;
        let outcome: Result<(V, bool)> = async {
            let _guard = lock.lock().await;

            if let Some(value) = self.get(key).await {
                return Ok((value, true));
            }

            let value = init().await?;
            self.insert(key, value.clone()).await?;
            Ok((value, false))
        }
        .await;

        self.release_key_lock(key, lock).await;
        outcome
    }

    /// Drop the table entry for `key` once no other caller holds its lock.
    async fn release_key_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.key_locks.lock().await;
        let current = matches!(locks.get(key), Some(entry) if Arc::ptr_eq(entry, &lock));
        // one reference in the table, one here
        if current && Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        // drop our clone while the table is still locked
        drop(lock);
        drop(locks);
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
