//! Key-ordered instrument selections used for favorites and comparison.

use crate::core::instrument::{Instrument, MarketSnapshot};
use tracing::debug;

/// Maximum number of instruments shown side by side.
pub const COMPARISON_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The selection is full; nothing changed.
    Rejected,
}

/// Insertion-ordered set of instruments, unique by key, optionally capped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<Instrument>,
    capacity: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// Removes the entry sharing `item`'s key, or appends `item` when there is room.
    pub fn toggle(&mut self, item: Instrument) -> Toggle {
        if let Some(index) = self.position(item.key()) {
            let removed = self.items.remove(index);
            debug!(key = removed.key(), "Selection REMOVE");
            return Toggle::Removed;
        }

        if self.capacity.is_some_and(|cap| self.items.len() >= cap) {
            debug!(key = item.key(), "Selection full, ignoring add");
            return Toggle::Rejected;
        }

        debug!(key = item.key(), "Selection ADD");
        self.items.push(item);
        Toggle::Added
    }

    /// Swaps every entry for its fresh record, keeping entries that have no
    /// match in `snapshot` unchanged.
    pub fn reconcile(&mut self, snapshot: &MarketSnapshot) {
        for item in &mut self.items {
            let fresh = match item {
                Instrument::Mep(q) => snapshot
                    .find_mep(&q.ticker)
                    .map(|m| Instrument::Mep(m.clone())),
                Instrument::Equity(q) => snapshot
                    .find_equity(&q.symbol)
                    .map(|e| Instrument::Equity(e.clone())),
            };
            match fresh {
                Some(fresh) => *item = fresh,
                None => debug!(key = item.key(), "No fresh record, keeping stale entry"),
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Instrument> {
        self.items.iter().find(|i| i.key() == key)
    }

    pub fn items(&self) -> &[Instrument] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|i| i.key() == key)
    }
}
