use crate::ItemId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interaction type recorded in the event log. Labels match exactly;
/// `"Transaction"` is an [`EventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    View,
    AddToCart,
    Transaction,
    Other(String),
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "view" => EventKind::View,
            "addtocart" => EventKind::AddToCart,
            "transaction" => EventKind::Transaction,
            _ => EventKind::Other(s),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::View => f.write_str("view"),
            EventKind::AddToCart => f.write_str("addtocart"),
            EventKind::Transaction => f.write_str("transaction"),
            EventKind::Other(s) => f.write_str(s),
        }
    }
}

/// One row of the event log. Extra columns (`timestamp`, `visitorid`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "itemid", alias = "item_id")]
    pub item_id: ItemId,
    pub event: EventKind,
}

impl Event {
    #[must_use]
    pub fn new(item_id: ItemId, event: EventKind) -> Self {
        Self { item_id, event }
    }

    #[inline]
    #[must_use]
    pub fn is_transaction(&self) -> bool {
        self.event == EventKind::Transaction
    }
}

/// Per-item count of `transaction` events
#[derive(Debug, Clone, Default)]
pub struct PurchaseCounts {
    counts: AHashMap<ItemId, u64>,
}

impl PurchaseCounts {
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut counts = AHashMap::new();
        for event in events.into_iter().filter(|e| e.is_transaction()) {
            *counts.entry(event.item_id).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Purchases of an item; items never bought count as zero.
    #[inline]
    #[must_use]
    pub fn get(&self, id: ItemId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of transactions counted
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u64)> + '_ {
        self.counts.iter().map(|(id, n)| (*id, *n))
    }
}

impl FromIterator<(ItemId, u64)> for PurchaseCounts {
    fn from_iter<T: IntoIterator<Item = (ItemId, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}
