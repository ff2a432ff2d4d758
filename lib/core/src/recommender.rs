//! Recommendation selection
//!
//! Two ranked lists are produced for a query item:
//!
//! - **bought together**: other items whose similarity to the query reaches the
//!   threshold, restricted to the query's category when it has one, best first.
//! - **fallback**: the most purchased members of the query's category that are
//!   also on the similarity axis.
//!
//! Ties keep matrix column order (bought together) and category member order
//! (fallback), since both sorts are stable.

use crate::filter::{Candidate, CatalogFilter, Filter, FilterCondition};
use crate::{Category, Error, ItemId, Model, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_FALLBACK_LIMIT: usize = 4;

/// Service-wide selection defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendConfig {
    pub top_n: usize,
    pub threshold: f64,
    pub fallback_limit: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            threshold: DEFAULT_THRESHOLD,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

/// A lookup request; unset fields fall back to [`RecommendConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub item_id: ItemId,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl Query {
    #[must_use]
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            top_n: None,
            threshold: None,
        }
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub selected_item: ItemId,
    pub items_bought_together: Vec<ItemId>,
    pub similar_items_in_category: Vec<ItemId>,
}

pub struct Recommender {
    model: Arc<Model>,
    config: RecommendConfig,
}

impl Recommender {
    pub fn new(model: Arc<Model>, config: RecommendConfig) -> Self {
        Self { model, config }
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Checked lookup: unknown items are reported instead of answered with empty lists.
    pub fn recommend(&self, query: &Query) -> Result<Recommendation> {
        let top_n = query.top_n.unwrap_or(self.config.top_n);
        let threshold = query.threshold.unwrap_or(self.config.threshold);

        if !threshold.is_finite() {
            return Err(Error::InvalidRequest(format!(
                "threshold must be finite, got {}",
                threshold
            )));
        }
        if !self.model.contains(query.item_id) {
            return Err(Error::ItemNotFound(query.item_id.to_string()));
        }

        Ok(self.select(query.item_id, top_n, threshold))
    }

    /// Unchecked lookup. An unknown item yields empty lists.
    #[must_use]
    pub fn select(&self, item_id: ItemId, top_n: usize, threshold: f64) -> Recommendation {
        let category = self.model.catalog().category_of(item_id);

        let items_bought_together = self
            .bought_together(item_id, category, top_n, threshold)
            .into_iter()
            .map(|c| c.id)
            .collect();

        let similar_items_in_category = match category {
            Some(category) => self.fallback(item_id, category),
            None => Vec::new(),
        };

        Recommendation {
            selected_item: item_id,
            items_bought_together,
            similar_items_in_category,
        }
    }

    /// Similarity-ranked candidates, best first, at most `top_n`
    #[must_use]
    pub fn bought_together(
        &self,
        item_id: ItemId,
        category: Option<&Category>,
        top_n: usize,
        threshold: f64,
    ) -> Vec<Candidate> {
        let Some(row) = self.model.similarity().row(item_id) else {
            return Vec::new();
        };

        let mut conditions = vec![
            FilterCondition::MinScore(threshold),
            FilterCondition::Exclude(item_id),
        ];
        if let Some(category) = category {
            conditions.push(FilterCondition::InCategory(category.clone()));
        }
        let filter = CatalogFilter::new(self.model.catalog(), FilterCondition::And(conditions));

        let mut candidates: Vec<Candidate> = row
            .map(|(id, score)| Candidate::new(id, score))
            .filter(|c| filter.matches(c))
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(top_n);
        candidates
    }

    /// Most purchased members of `category`, excluding the query item and
    /// anything missing from the similarity axis
    #[must_use]
    pub fn fallback(&self, item_id: ItemId, category: &Category) -> Vec<ItemId> {
        let similarity = self.model.similarity();
        let purchases = self.model.purchases();

        let mut members: Vec<ItemId> = self
            .model
            .catalog()
            .items_in(category)
            .iter()
            .copied()
            .filter(|id| *id != item_id && similarity.contains(*id))
            .collect();

        members.sort_by_key(|id| Reverse(purchases.get(*id)));
        members.truncate(self.config.fallback_limit);
        members
    }
}
