//! Testing utilities for Next Card.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedIndices` to replay exact draw outcomes
//! - `FailingStore` to exercise write and read failures
//! - `TestHarness` for scripted selection scenarios
//! - Assertion helpers for verifying session state

use crate::catalog::{Catalog, Category, DisplayMeta};
use crate::draw::IndexSource;
use crate::persist::{KeyValueStore, MemoryStore, PersistError, DEFAULT_STORAGE_KEY};
use crate::session::{DeckSession, SessionConfig};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// An index source that returns scripted values in order.
///
/// Values are reduced modulo the pool length. Once the script runs out it
/// keeps returning 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIndices {
    values: VecDeque<usize>,
}

impl ScriptedIndices {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Add a value to the end of the script.
    pub fn push(&mut self, value: usize) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl IndexSource for ScriptedIndices {
    fn next_index(&mut self, len: usize) -> usize {
        self.values.pop_front().unwrap_or(0) % len.max(1)
    }
}

/// A store whose reads and/or writes always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl FailingStore {
    /// Fails every operation.
    pub fn new() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
        }
    }

    /// Reads succeed with nothing stored; writes fail.
    pub fn writes_only() -> Self {
        Self {
            fail_reads: false,
            fail_writes: true,
        }
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
        if self.fail_reads {
            Err(PersistError::Io(std::io::Error::other("read refused")))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), PersistError> {
        if self.fail_writes {
            Err(PersistError::Io(std::io::Error::other("write refused")))
        } else {
            Ok(())
        }
    }
}

/// Two-category catalog: `starter: ["Hi"]`, `deep: ["Why?"]`.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        Category::new("starter", "Starter")
            .with_meta(DisplayMeta::new(
                "bg-blue-500 text-white",
                "from-blue-50 via-sky-50 to-blue-100",
            ))
            .with_prompts(["Hi"]),
        Category::new("deep", "Deep")
            .with_meta(DisplayMeta::new(
                "bg-purple-600 text-white",
                "from-purple-50 via-violet-50 to-indigo-100",
            ))
            .with_prompts(["Why?"]),
    ])
    .unwrap_or_else(|e| panic!("sample catalog is valid: {e}"))
}

/// Test harness for running selection scenarios against a shared store.
pub struct TestHarness {
    /// The session under test.
    pub session: DeckSession,
    /// The store backing the session, still readable from the test.
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Start a session over [`sample_catalog`] with nothing saved.
    pub async fn new() -> Self {
        Self::with_catalog(sample_catalog()).await
    }

    /// Start a session over a custom catalog with nothing saved.
    pub async fn with_catalog(catalog: Catalog) -> Self {
        Self::build(catalog, Arc::new(MemoryStore::new()), Vec::new()).await
    }

    /// Start a session whose store already holds `raw` in the default slot.
    pub async fn with_saved(catalog: Catalog, raw: &str) -> Self {
        let store = Arc::new(MemoryStore::with_value(DEFAULT_STORAGE_KEY, raw));
        Self::build(catalog, store, Vec::new()).await
    }

    /// Start a session that draws the scripted indices in order.
    pub async fn with_script(catalog: Catalog, indices: Vec<usize>) -> Self {
        Self::build(catalog, Arc::new(MemoryStore::new()), indices).await
    }

    async fn build(catalog: Catalog, store: Arc<MemoryStore>, indices: Vec<usize>) -> Self {
        let session = DeckSession::start_with_source(
            catalog,
            Arc::clone(&store),
            SessionConfig::new(),
            Box::new(ScriptedIndices::new(indices)),
        )
        .await;
        Self { session, store }
    }

    /// Toggle a category and return the harness for chaining.
    pub async fn toggle(&mut self, id: &str) -> &mut Self {
        self.session.toggle_category(id).await;
        self
    }

    /// Raw value in the default storage slot.
    pub fn saved_raw(&self) -> Option<String> {
        self.store.peek(DEFAULT_STORAGE_KEY)
    }

    /// Saved ids as a set, if the slot holds a valid selection.
    pub fn saved_set(&self) -> Option<BTreeSet<String>> {
        self.saved_raw()
            .and_then(|raw| crate::persist::decode_selection(&raw).ok())
            .map(|ids| ids.into_iter().collect())
    }

    /// Current selection as a set.
    pub fn selected_set(&self) -> BTreeSet<String> {
        self.session.selection().iter().map(String::from).collect()
    }

    /// Pool prompt texts in order.
    pub fn pool_texts(&self) -> Vec<String> {
        self.session.pool().iter().map(|c| c.text.clone()).collect()
    }

    /// Assert the selection holds exactly `ids`.
    pub fn assert_selected(&self, ids: &[&str]) {
        let expected: BTreeSet<String> = ids.iter().map(|s| s.to_string()).collect();
        assert_eq!(self.selected_set(), expected, "unexpected selection");
    }

    /// Assert the displayed card's text.
    pub fn assert_card(&self, text: &str) {
        let card = self
            .session
            .current_card()
            .unwrap_or_else(|| panic!("expected card {text:?}, none displayed"));
        assert_eq!(card.text, text);
    }
}
