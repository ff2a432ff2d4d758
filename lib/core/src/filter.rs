// Candidate filters applied to a similarity row
use crate::{Catalog, Category, ItemId};

/// An item paired with its similarity to the query item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: ItemId,
    pub score: f64,
}

impl Candidate {
    #[inline]
    #[must_use]
    pub fn new(id: ItemId, score: f64) -> Self {
        Self { id, score }
    }
}

pub trait Filter {
    fn matches(&self, candidate: &Candidate) -> bool;
}

#[derive(Debug, Clone)]
pub enum FilterCondition {
    /// score >= threshold; NaN scores never match
    MinScore(f64),
    Exclude(ItemId),
    InCategory(Category),
    And(Vec<FilterCondition>),
}

/// Evaluates a [`FilterCondition`] against the catalog
pub struct CatalogFilter<'a> {
    catalog: &'a Catalog,
    condition: FilterCondition,
}

impl<'a> CatalogFilter<'a> {
    pub fn new(catalog: &'a Catalog, condition: FilterCondition) -> Self {
        Self { catalog, condition }
    }

    fn matches_condition(&self, condition: &FilterCondition, candidate: &Candidate) -> bool {
        match condition {
            FilterCondition::MinScore(threshold) => candidate.score >= *threshold,
            FilterCondition::Exclude(id) => candidate.id != *id,
            FilterCondition::InCategory(category) => self
                .catalog
                .category_of(candidate.id)
                .map(|c| c == category)
                .unwrap_or(false),
            FilterCondition::And(conditions) => conditions
                .iter()
                .all(|c| self.matches_condition(c, candidate)),
        }
    }
}

impl Filter for CatalogFilter<'_> {
    fn matches(&self, candidate: &Candidate) -> bool {
        self.matches_condition(&self.condition, candidate)
    }
}
