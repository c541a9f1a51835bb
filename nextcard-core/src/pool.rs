//! Pool building: the cards eligible for the current selection.

use crate::catalog::{Catalog, Category, DisplayMeta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One drawable prompt together with the category it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub text: String,
    pub category_id: String,
    pub category_name: String,
    pub meta: DisplayMeta,
}

impl Card {
    fn from_prompt(category: &Category, prompt: &str) -> Self {
        Self {
            text: prompt.to_string(),
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            meta: category.meta.clone(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category_name, self.text)
    }
}

/// Build the pool for a selection.
///
/// Cards come out in catalog order, and each category's prompts keep their
/// own order. Selected ids the catalog doesn't know contribute nothing, and
/// an empty selection yields an empty pool.
pub fn build_pool<S: AsRef<str>>(catalog: &Catalog, selected: &[S]) -> Vec<Card> {
    catalog
        .categories()
        .iter()
        .filter(|category| selected.iter().any(|id| id.as_ref() == category.id))
        .flat_map(|category| {
            category
                .prompts
                .iter()
                .map(move |prompt| Card::from_prompt(category, prompt))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Category::new("starter", "Starter")
                .with_meta(DisplayMeta::new("blue", "sky"))
                .with_prompts(["A", "B"]),
            Category::new("deep", "Deep")
                .with_meta(DisplayMeta::new("purple", "violet"))
                .with_prompts(["C"]),
            Category::new("fun", "Fun").with_prompts(["D", "E"]),
        ])
        .unwrap()
    }

    fn texts(pool: &[Card]) -> Vec<(&str, &str)> {
        pool.iter()
            .map(|c| (c.text.as_str(), c.category_id.as_str()))
            .collect()
    }

    #[test]
    fn test_union_in_catalog_order() {
        let pool = build_pool(&catalog(), &["starter", "deep"]);
        assert_eq!(
            texts(&pool),
            vec![("A", "starter"), ("B", "starter"), ("C", "deep")]
        );
    }

    #[test]
    fn test_selection_order_does_not_matter() {
        let catalog = catalog();
        let forward = build_pool(&catalog, &["starter", "fun"]);
        let backward = build_pool(&catalog, &["fun", "starter"]);
        assert_eq!(forward, backward);
        assert_eq!(
            texts(&forward),
            vec![("A", "starter"), ("B", "starter"), ("D", "fun"), ("E", "fun")]
        );
    }

    #[test]
    fn test_cards_carry_category_meta() {
        let pool = build_pool(&catalog(), &["deep"]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].category_name, "Deep");
        assert_eq!(pool[0].meta, DisplayMeta::new("purple", "violet"));
    }

    #[test]
    fn test_empty_selection_gives_empty_pool() {
        let empty: [&str; 0] = [];
        assert!(build_pool(&catalog(), &empty).is_empty());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let pool = build_pool(&catalog(), &["nope", "deep"]);
        assert_eq!(texts(&pool), vec![("C", "deep")]);
        assert!(build_pool(&catalog(), &["nope"]).is_empty());
    }

    #[test]
    fn test_duplicate_selection_ids_do_not_duplicate_cards() {
        let pool = build_pool(&catalog(), &["deep", "deep"]);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_card_display() {
        let pool = build_pool(&catalog(), &["deep"]);
        assert_eq!(pool[0].to_string(), "[Deep] C");
    }
}
