//! Category selection and card drawing engine for Next Card.
//!
//! This crate provides:
//! - A read-only prompt catalog with category display metadata
//! - Category selection that is never empty
//! - Pool building and uniform random draws with an injectable source
//! - Persistence of the selection in a key-value slot
//!
//! # Quick Start
//!
//! ```ignore
//! use nextcard_core::{Catalog, DeckSession, FileStore, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::builtin()?;
//!     let store = FileStore::new("prefs");
//!
//!     let mut session = DeckSession::start(catalog, store, SessionConfig::new()).await;
//!     session.toggle_category("deep").await;
//!
//!     if let Some(card) = session.current_card() {
//!         println!("{card}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod draw;
pub mod persist;
pub mod pool;
pub mod selection;
pub mod session;
pub mod testing;

// Primary public API
pub use catalog::{Catalog, CatalogError, Category, DisplayMeta};
pub use draw::{DrawError, IndexSource, RngSource};
pub use persist::{FileStore, KeyValueStore, MemoryStore, PersistError, SelectionStore};
pub use pool::{build_pool, Card};
pub use selection::{Selection, Toggle, STARTER_CATEGORY};
pub use session::{DeckSession, SessionConfig};
pub use testing::{ScriptedIndices, TestHarness};
