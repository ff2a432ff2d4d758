use crate::{Catalog, Event, ItemId, PurchaseCounts, SimilarityMatrix};

/// The four precomputed tables, with the event log reduced to purchase counts.
///
/// Built once at startup and shared read-only for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Model {
    similarity: SimilarityMatrix,
    catalog: Catalog,
    purchases: PurchaseCounts,
}

impl Model {
    pub fn new<'a, E>(similarity: SimilarityMatrix, catalog: Catalog, events: E) -> Self
    where
        E: IntoIterator<Item = &'a Event>,
    {
        Self::with_purchases(similarity, catalog, PurchaseCounts::from_events(events))
    }

    #[must_use]
    pub fn with_purchases(
        similarity: SimilarityMatrix,
        catalog: Catalog,
        purchases: PurchaseCounts,
    ) -> Self {
        Self {
            similarity,
            catalog,
            purchases,
        }
    }

    #[inline]
    #[must_use]
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn purchases(&self) -> &PurchaseCounts {
        &self.purchases
    }

    /// Items that can be queried: the similarity matrix axis
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        self.similarity.items()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.similarity.contains(id)
    }

    /// Whether the id appears in any table
    #[must_use]
    pub fn knows(&self, id: ItemId) -> bool {
        self.similarity.contains(id)
            || self.catalog.category_of(id).is_some()
            || self.purchases.get(id) > 0
    }
}
