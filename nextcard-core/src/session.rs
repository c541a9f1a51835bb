//! DeckSession - the primary public API for Next Card.
//!
//! A session owns the catalog, the category selection, the current pool and
//! the displayed card. Every selection change is saved, the pool is rebuilt
//! and a fresh card is drawn, in that order.

use crate::catalog::Catalog;
use crate::draw::{self, BackdropCycle, DrawError, IndexSource, RngSource, DEFAULT_BACKDROP};
use crate::persist::{KeyValueStore, SelectionStore, DEFAULT_STORAGE_KEY};
use crate::pool::{build_pool, Card};
use crate::selection::{Selection, Toggle};

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key-value slot the selection is stored under.
    pub storage_key: String,

    /// Seed for the draw generator. Entropy is used when unset.
    pub seed: Option<u64>,

    /// Skip the displayed card when drawing, if another card is available.
    pub avoid_repeats: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed: None,
            avoid_repeats: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage slot key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Seed the draw generator for reproducible sessions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Avoid drawing the same card twice in a row.
    pub fn with_avoid_repeats(mut self, avoid: bool) -> Self {
        self.avoid_repeats = avoid;
        self
    }
}

/// A Next Card session.
pub struct DeckSession {
    catalog: Catalog,
    selection: Selection,
    pool: Vec<Card>,
    current: Option<Card>,
    store: SelectionStore,
    source: Box<dyn IndexSource>,
    backdrop: BackdropCycle,
    config: SessionConfig,
}

impl DeckSession {
    /// Start a session, restoring the saved selection and drawing a first card.
    pub async fn start(
        catalog: Catalog,
        store: impl KeyValueStore + 'static,
        config: SessionConfig,
    ) -> Self {
        let source: Box<dyn IndexSource> = match config.seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };
        Self::start_with_source(catalog, store, config, source).await
    }

    /// Start a session drawing from the given index source.
    pub async fn start_with_source(
        catalog: Catalog,
        store: impl KeyValueStore + 'static,
        config: SessionConfig,
        source: Box<dyn IndexSource>,
    ) -> Self {
        let store = SelectionStore::new(store, config.storage_key.clone());
        let selection = store
            .load()
            .await
            .and_then(Selection::from_ids)
            .unwrap_or_default();

        tracing::info!(
            categories = catalog.len(),
            selected = ?selection.ids(),
            "Starting session"
        );

        let pool = build_pool(&catalog, selection.ids());
        let mut session = Self {
            catalog,
            selection,
            pool,
            current: None,
            store,
            source,
            backdrop: BackdropCycle::default(),
            config,
        };
        if let Err(e) = session.draw_next() {
            tracing::warn!(error = %e, "No card to show at start");
        }
        session
    }

    /// Toggle a category on or off.
    ///
    /// The new selection is saved, the pool rebuilt and a new card drawn.
    /// If the new pool is empty the displayed card stays as it was.
    pub async fn toggle_category(&mut self, id: &str) -> Toggle {
        if !self.catalog.contains(id) {
            tracing::debug!(id, "Toggling a category the catalog doesn't have");
        }

        let change = self.selection.toggle(id);
        tracing::debug!(id, ?change, selected = ?self.selection.ids(), "Selection changed");

        self.store.save(self.selection.ids()).await;
        self.pool = build_pool(&self.catalog, self.selection.ids());
        if let Err(e) = self.draw_next() {
            tracing::warn!(error = %e, "Keeping the current card");
        }
        change
    }

    /// Draw a new card with the selection unchanged.
    pub fn request_draw(&mut self) -> Result<&Card, DrawError> {
        self.draw_next()?;
        self.current.as_ref().ok_or(DrawError::EmptyPool)
    }

    fn draw_next(&mut self) -> Result<(), DrawError> {
        let card = if self.config.avoid_repeats {
            draw::draw_avoiding(&self.pool, self.current.as_ref(), self.source.as_mut())?
        } else {
            draw::draw(&self.pool, self.source.as_mut())?
        };
        self.current = Some(card.clone());
        self.backdrop.advance();
        Ok(())
    }

    /// The card on display, if one has been drawn.
    pub fn current_card(&self) -> Option<&Card> {
        self.current.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Cards eligible for the current selection.
    pub fn pool(&self) -> &[Card] {
        &self.pool
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Backdrop style for the displayed card.
    pub fn backdrop(&self) -> &str {
        self.current
            .as_ref()
            .map(|card| card.meta.gradient.as_str())
            .filter(|gradient| !gradient.is_empty())
            .unwrap_or(DEFAULT_BACKDROP)
    }

    pub fn backdrop_phase(&self) -> u64 {
        self.backdrop.phase()
    }

    /// Successful draws this session.
    pub fn draw_count(&self) -> u64 {
        self.backdrop.count()
    }
}

impl std::fmt::Debug for DeckSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckSession")
            .field("selection", &self.selection)
            .field("pool_size", &self.pool.len())
            .field("current", &self.current)
            .field("draw_count", &self.backdrop.count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
