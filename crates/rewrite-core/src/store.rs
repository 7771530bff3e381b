//! Modification store
//!
//! An insertion-ordered collection of overrides, keyed by id. There is a
//! single local actor (the UI thread of control), so every operation is
//! synchronous and last-write-wins; rapid repeated upserts (one per
//! keystroke) each fully replace the previous entry.

use serde::{Deserialize, Serialize};

use crate::modification::Modification;

/// The store's mutation surface as explicit command messages. Callers may
/// use these or the equivalent direct methods; the contract is identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreCommand {
    Upsert { modification: Modification },
    Delete { id: String },
    UndoLast,
    ClearAll,
}

/// Ordered collection of user-authored overrides.
///
/// Insertion order is creation order and drives both per-page paint order
/// and `undo_last`. Overrides live independently of page visibility:
/// scrolling a page away discards nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModificationStore {
    entries: Vec<Modification>,
}

impl ModificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the override, or fully replace the entry with the same id.
    ///
    /// Replacement keeps the entry's original position so paint order and
    /// undo order are unaffected by later edits to the same override.
    /// Callers pass a complete object; partial merges are their concern.
    pub fn upsert(&mut self, modification: Modification) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|m| m.id == modification.id)
        {
            debug_assert_eq!(
                existing.page_index, modification.page_index,
                "an override must not move across pages"
            );
            *existing = modification;
        } else {
            self.entries.push(modification);
        }
    }

    /// Remove the entry with the given id. No-op when absent.
    pub fn delete(&mut self, id: &str) -> bool {
        if let Some(pos) = self.entries.iter().position(|m| m.id == id) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove the most recently inserted entry, store-wide. No-op on an
    /// empty store.
    pub fn undo_last(&mut self) -> Option<Modification> {
        self.entries.pop()
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Dispatch a command message.
    pub fn apply(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::Upsert { modification } => self.upsert(modification),
            StoreCommand::Delete { id } => {
                self.delete(&id);
            }
            StoreCommand::UndoLast => {
                self.undo_last();
            }
            StoreCommand::ClearAll => self.clear_all(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Modification> {
        self.entries.iter().find(|m| m.id == id)
    }

    /// The overrides for one page, in insertion order.
    pub fn by_page(&self, page_index: u32) -> Vec<&Modification> {
        self.entries
            .iter()
            .filter(|m| m.page_index == page_index)
            .collect()
    }

    pub fn entries(&self) -> &[Modification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::{Modification, ModificationKind};
    use pretty_assertions::assert_eq;

    fn insertion(id: &str, page: u32) -> Modification {
        Modification::insertion(id.to_string(), page, 10.0, 20.0)
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("a", 0));
        assert_eq!(store.len(), 1);

        let mut changed = insertion("a", 0);
        changed.text = "edited".to_string();
        store.upsert(changed);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().text, "edited");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("a", 0));
        let snapshot = store.entries().to_vec();

        store.upsert(insertion("a", 0));
        assert_eq!(store.entries(), snapshot.as_slice());
    }

    #[test]
    fn test_replacement_preserves_insertion_order() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("a", 0));
        store.upsert(insertion("b", 0));

        let mut a2 = insertion("a", 0);
        a2.text = "later".to_string();
        store.upsert(a2);

        let ids: Vec<&str> = store.entries().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("a", 0));
        assert!(!store.delete("nope"));
        assert_eq!(store.len(), 1);
        assert!(store.delete("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_undo_is_monotonic() {
        let mut store = ModificationStore::new();
        for i in 0..4 {
            store.upsert(insertion(&format!("m{}", i), 0));
        }
        for remaining in (0..4).rev() {
            store.undo_last();
            assert_eq!(store.len(), remaining);
        }
        assert!(store.undo_last().is_none());
    }

    #[test]
    fn test_undo_removes_by_insertion_order_not_page() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("first", 3));
        store.upsert(insertion("second", 0));

        let undone = store.undo_last().unwrap();
        assert_eq!(undone.id, "second");
        assert_eq!(store.entries()[0].id, "first");
    }

    #[test]
    fn test_by_page_filters_in_insertion_order() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("p0-a", 0));
        store.upsert(insertion("p1-a", 1));
        store.upsert(insertion("p0-b", 0));

        let page0: Vec<&str> = store.by_page(0).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(page0, vec!["p0-a", "p0-b"]);
        assert_eq!(store.by_page(2).len(), 0);
    }

    #[test]
    fn test_rapid_upserts_last_write_wins() {
        let mut store = ModificationStore::new();
        for text in ["H", "He", "Hel", "Hell", "Hello"] {
            let mut m = insertion("typing", 0);
            m.text = text.to_string();
            store.upsert(m);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("typing").unwrap().text, "Hello");
    }

    #[test]
    fn test_commands_match_direct_calls() {
        let mut direct = ModificationStore::new();
        let mut via_commands = ModificationStore::new();

        direct.upsert(insertion("a", 0));
        direct.upsert(insertion("b", 0));
        direct.delete("a");
        direct.undo_last();

        via_commands.apply(StoreCommand::Upsert {
            modification: insertion("a", 0),
        });
        via_commands.apply(StoreCommand::Upsert {
            modification: insertion("b", 0),
        });
        via_commands.apply(StoreCommand::Delete {
            id: "a".to_string(),
        });
        via_commands.apply(StoreCommand::UndoLast);

        assert_eq!(direct.entries(), via_commands.entries());
        via_commands.apply(StoreCommand::ClearAll);
        assert!(via_commands.is_empty());
    }

    #[test]
    fn test_command_deserializes_tagged() {
        let cmd: StoreCommand = serde_json::from_str(r#"{"type":"UndoLast"}"#).unwrap();
        assert!(matches!(cmd, StoreCommand::UndoLast));

        let cmd: StoreCommand =
            serde_json::from_str(r#"{"type":"Delete","id":"orig-0-100-700"}"#).unwrap();
        assert!(matches!(cmd, StoreCommand::Delete { .. }));
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = ModificationStore::new();
        store.upsert(insertion("a", 0));
        store.upsert(insertion("b", 2));

        let json = store.to_json().unwrap();
        let restored = ModificationStore::from_json(&json).unwrap();
        assert_eq!(store.entries(), restored.entries());
    }

    #[test]
    fn test_edit_kind_survives_round_trip_through_store() {
        let mut store = ModificationStore::new();
        let mut m = insertion("e", 0);
        m.kind = ModificationKind::Edit;
        store.upsert(m);
        assert_eq!(store.get("e").unwrap().kind, ModificationKind::Edit);
    }
}
