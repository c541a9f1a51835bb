//! Persistence of category preferences.
//!
//! The selection is stored as a JSON array of category ids in a single
//! key-value slot. [`SelectionStore`] owns the encoding and absorbs every
//! failure: a bad stored value loads as "nothing saved", and a failed write
//! is logged and otherwise ignored.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::fs;

/// Slot key the selection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "nextcard-categories";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid stored format: {0}")]
    InvalidFormat(String),

    #[error("Stored selection is empty")]
    EmptySelection,
}

/// A durable string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` means nothing has been stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Overwrite a slot.
    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).set(key, value).await
    }
}

/// In-process store. Contents live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot already filled.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.slots_mut().insert(key.into(), value.into());
        store
    }

    /// Read a slot without going through the async interface.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.slots_mut().get(key).cloned()
    }

    fn slots_mut(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds valid strings.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.slots_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that keeps each slot in its own JSON file under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a slot.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        let sanitized = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>();
        self.dir.join(format!("{sanitized}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.slot_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.slot_path(key), value).await?;
        Ok(())
    }
}

/// Encode a selection for storage.
pub fn encode_selection<S: AsRef<str>>(ids: &[S]) -> Result<String, PersistError> {
    let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    Ok(serde_json::to_string(&ids)?)
}

/// Decode a stored selection.
///
/// The value must be a non-empty JSON array of strings.
pub fn decode_selection(raw: &str) -> Result<Vec<String>, PersistError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(PersistError::InvalidFormat(format!(
                "expected an array of category ids, found {}",
                json_kind(&other)
            )))
        }
    };

    let ids = items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(id) => Ok(id),
            other => Err(PersistError::InvalidFormat(format!(
                "expected a category id string, found {}",
                json_kind(&other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(PersistError::EmptySelection);
    }
    Ok(ids)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Loads and saves the category selection through a [`KeyValueStore`].
pub struct SelectionStore {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl SelectionStore {
    pub fn new(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self::from_boxed(Box::new(store), key)
    }

    pub fn from_boxed(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored selection.
    ///
    /// Returns `None` when nothing is stored or the stored value can't be
    /// decoded; read and decode failures are logged, not returned.
    pub async fn load(&self) -> Option<Vec<String>> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No saved categories");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read saved categories");
                return None;
            }
        };

        match decode_selection(&raw) {
            Ok(ids) => {
                tracing::debug!(key = %self.key, count = ids.len(), "Loaded saved categories");
                Some(ids)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to parse saved categories");
                None
            }
        }
    }

    /// Write the selection, logging rather than returning any failure.
    pub async fn save<S: AsRef<str>>(&self, ids: &[S]) {
        if let Err(e) = self.try_save(ids).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to save categories");
        }
    }

    /// Write the selection and report failures.
    pub async fn try_save<S: AsRef<str>>(&self, ids: &[S]) -> Result<(), PersistError> {
        let encoded = encode_selection(ids)?;
        self.store.set(&self.key, &encoded).await
    }
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_encode_selection() {
        assert_eq!(
            encode_selection(&["starter", "deep"]).unwrap(),
            r#"["starter","deep"]"#
        );
    }

    #[test]
    fn test_decode_selection() {
        assert_eq!(
            decode_selection(r#"["starter", "deep"]"#).unwrap(),
            vec!["starter", "deep"]
        );
    }

    #[test]
    fn test_decode_rejects_bad_values() {
        assert!(matches!(decode_selection("not json"), Err(PersistError::Json(_))));
        assert!(matches!(decode_selection(""), Err(PersistError::Json(_))));
        assert!(matches!(
            decode_selection(r#"{"ids": ["starter"]}"#),
            Err(PersistError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_selection(r#"["starter", 3]"#),
            Err(PersistError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_selection(r#""starter""#),
            Err(PersistError::InvalidFormat(_))
        ));
        assert!(matches!(decode_selection("[]"), Err(PersistError::EmptySelection)));
    }

    #[test]
    fn test_slot_path_sanitizes_key() {
        let store = FileStore::new("/prefs");
        let path = store.slot_path("nextcard-categories");
        assert!(path.to_string_lossy().ends_with("nextcard-categories.json"));

        let path = store.slot_path("../escape me");
        assert!(path.to_string_lossy().ends_with("___escape_me.json"));
        assert!(path.starts_with("/prefs"));
    }

    #[tokio::test]
    async fn test_round_trip_through_memory_store() {
        let store = SelectionStore::new(MemoryStore::new(), DEFAULT_STORAGE_KEY);
        assert_eq!(store.load().await, None);

        store.save(&["deep", "starter", "fun"]).await;
        let loaded: BTreeSet<String> = store.load().await.unwrap().into_iter().collect();
        let expected: BTreeSet<String> = ["deep", "starter", "fun"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn test_corrupt_value_loads_as_absent() {
        for raw in ["{{{", "", "[]", "42", r#"[null]"#] {
            let store = SelectionStore::new(MemoryStore::with_value("k", raw), "k");
            assert_eq!(store.load().await, None, "raw value {raw:?}");
        }
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("prefs");
        let files = FileStore::new(&dir);

        // Missing file reads as nothing stored
        assert!(files.get("slot").await.unwrap().is_none());

        files.set("slot", r#"["deep"]"#).await.expect("Set should succeed");
        assert!(files.slot_path("slot").exists());
        assert_eq!(files.get("slot").await.unwrap().as_deref(), Some(r#"["deep"]"#));

        let store = SelectionStore::new(files, "slot");
        store.save(&["fun"]).await;
        assert_eq!(store.load().await, Some(vec!["fun".to_string()]));
    }

    #[tokio::test]
    async fn test_file_store_write_failure_is_reported() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // A regular file where the directory should be makes every write fail.
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "x").expect("Write should succeed");

        let store = SelectionStore::new(FileStore::new(&blocker), "slot");
        assert!(matches!(store.try_save(&["deep"]).await, Err(PersistError::Io(_))));

        // The absorbing variant just logs.
        store.save(&["deep"]).await;
    }
}
