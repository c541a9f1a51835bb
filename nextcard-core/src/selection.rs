//! Category selection state.
//!
//! The selection is never empty: removing the last active category puts
//! the starter category back.

use serde::Serialize;

/// Category selected when nothing else is.
pub const STARTER_CATEGORY: &str = "starter";

/// What a toggle did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The category was not active and now is.
    Added,
    /// The category was active and has been removed.
    Removed,
    /// The category was the only active one; the selection fell back to the starter.
    Reset,
}

/// The set of active category ids, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<String>,
}

#[allow(clippy::len_without_is_empty)]
impl Selection {
    /// The default selection: just the starter category.
    pub fn starter() -> Self {
        Self {
            ids: vec![STARTER_CATEGORY.to_string()],
        }
    }

    /// Restore a selection from stored ids.
    ///
    /// Returns `None` if no ids remain once duplicates and blanks are dropped.
    pub fn from_ids<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if !id.trim().is_empty() && !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            None
        } else {
            Some(Self { ids: unique })
        }
    }

    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: &str) -> Toggle {
        match self.ids.iter().position(|existing| existing == id) {
            Some(index) => {
                self.ids.remove(index);
                if self.ids.is_empty() {
                    self.ids.push(STARTER_CATEGORY.to_string());
                    Toggle::Reset
                } else {
                    Toggle::Removed
                }
            }
            None => {
                self.ids.push(id.to_string());
                Toggle::Added
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Always at least one.
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::starter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn members(selection: &Selection) -> BTreeSet<&str> {
        selection.iter().collect()
    }

    #[test]
    fn test_default_is_starter() {
        let selection = Selection::default();
        assert_eq!(selection.ids(), &["starter".to_string()]);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_add_then_remove() {
        let mut selection = Selection::starter();
        assert_eq!(selection.toggle("deep"), Toggle::Added);
        assert!(selection.contains("deep"));
        assert_eq!(selection.toggle("deep"), Toggle::Removed);
        assert!(!selection.contains("deep"));
        assert_eq!(members(&selection), BTreeSet::from(["starter"]));
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut selection = Selection::from_ids(["starter", "fun"]).unwrap();
        let before: BTreeSet<String> = selection.iter().map(String::from).collect();

        selection.toggle("deep");
        selection.toggle("deep");
        let after: BTreeSet<String> = selection.iter().map(String::from).collect();
        assert_eq!(after, before);

        selection.toggle("fun");
        selection.toggle("fun");
        let after: BTreeSet<String> = selection.iter().map(String::from).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_removing_last_falls_back_to_starter() {
        let mut selection = Selection::from_ids(["deep"]).unwrap();
        assert_eq!(selection.toggle("deep"), Toggle::Reset);
        assert_eq!(members(&selection), BTreeSet::from(["starter"]));

        // Toggling back adds alongside the starter rather than restoring {deep}.
        assert_eq!(selection.toggle("deep"), Toggle::Added);
        assert_eq!(members(&selection), BTreeSet::from(["starter", "deep"]));
    }

    #[test]
    fn test_removing_lone_starter_keeps_starter() {
        let mut selection = Selection::starter();
        assert_eq!(selection.toggle("starter"), Toggle::Reset);
        assert_eq!(members(&selection), BTreeSet::from(["starter"]));
    }

    #[test]
    fn test_never_empty_under_random_toggles() {
        let ids = ["starter", "fun", "deep", "memories", "future", "unknown"];
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..50 {
            let mut selection = Selection::starter();
            for _ in 0..200 {
                let id = ids[rng.gen_range(0..ids.len())];
                selection.toggle(id);
                assert!(selection.len() >= 1);
            }
        }
    }

    #[test]
    fn test_from_ids_dedupes_and_rejects_empty() {
        let selection = Selection::from_ids(["deep", "fun", "deep", ""]).unwrap();
        assert_eq!(selection.ids(), &["deep".to_string(), "fun".to_string()]);

        assert!(Selection::from_ids(Vec::<String>::new()).is_none());
        assert!(Selection::from_ids([""]).is_none());
    }

    #[test]
    fn test_from_ids_rejects_whitespace_ids() {
        assert!(Selection::from_ids(["  ", "\t"]).is_none());
        let selection = Selection::from_ids(["  ", "deep"]).unwrap();
        assert_eq!(selection.ids(), &["deep".to_string()]);
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut selection = Selection::starter();
        selection.toggle("fun");
        selection.toggle("deep");
        let order: Vec<&str> = selection.iter().collect();
        assert_eq!(order, vec!["starter", "fun", "deep"]);
    }

    #[test]
    fn test_serializes_as_id_array() {
        let selection = Selection::from_ids(["starter", "deep"]).unwrap();
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"["starter","deep"]"#
        );
    }
}
