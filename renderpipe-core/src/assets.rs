use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Error, Result};

/// Where asset text comes from. The cache only ever calls this on a miss.
pub trait AssetSource: Send + Sync {
    fn read(&self, path: &Path) -> std::io::Result<String>;
}

/// Reads assets straight from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl AssetSource for FsSource {
    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Raw and JSON-decoded reads of files under a root, memoized per name until
/// [`AssetCache::flush`].
///
/// Failed reads and failed decodes are never stored, so the next access
/// retries. Two threads missing on the same key both read and the last
/// insert wins.
pub struct AssetCache {
    root: PathBuf,
    source: Arc<dyn AssetSource>,
    raw: RwLock<HashMap<String, Arc<str>>>,
    parsed: RwLock<HashMap<String, Value>>,
}

impl AssetCache {
    pub fn new<P: AsRef<Path>>(root: P, source: Arc<dyn AssetSource>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            source,
            raw: RwLock::new(HashMap::new()),
            parsed: RwLock::new(HashMap::new()),
        }
    }

    /// Text of `root/name`.
    pub fn read(&self, name: &str) -> Result<Arc<str>> {
        if let Some(text) = self.raw.read().get(name) {
            return Ok(Arc::clone(text));
        }

        let path = self.root.join(name);
        let text: Arc<str> = self
            .source
            .read(&path)
            .map_err(|e| Error::io(path, e))?
            .into();

        tracing::debug!(asset = name, "cached raw asset");
        self.raw.write().insert(name.to_string(), Arc::clone(&text));
        Ok(text)
    }

    /// `root/name` decoded as JSON. Shares the raw entry with [`AssetCache::read`].
    pub fn read_json(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.parsed.read().get(name) {
            return Ok(value.clone());
        }

        let text = self.read(name)?;
        let value: Value = serde_json::from_str(&text).map_err(|source| Error::Parse {
            name: name.to_string(),
            source,
        })?;

        tracing::debug!(asset = name, "cached parsed asset");
        self.parsed.write().insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Drops every raw and parsed entry.
    ///
    /// Not synchronized with reads that are already past their cache lookup;
    /// those finish with what they fetched and may re-populate their key.
    pub fn flush(&self) {
        self.raw.write().clear();
        self.parsed.write().clear();
    }

    pub fn len(&self) -> usize {
        self.raw.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("root", &self.root)
            .field("raw", &self.raw.read().len())
            .field("parsed", &self.parsed.read().len())
            .finish()
    }
}
