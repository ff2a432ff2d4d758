use crate::{Category, ItemId};
use ahash::{AHashMap, AHashSet};

/// Item/category relations: item -> category and category -> member items.
///
/// Blank category labels are dropped on construction so that a lookup never
/// returns a category that carries no information.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    item_to_category: AHashMap<ItemId, Category>,
    category_to_items: AHashMap<Category, Vec<ItemId>>,
}

impl Catalog {
    pub fn new<I, C>(item_to_category: I, category_to_items: C) -> Self
    where
        I: IntoIterator<Item = (ItemId, Category)>,
        C: IntoIterator<Item = (Category, Vec<ItemId>)>,
    {
        let item_to_category = item_to_category
            .into_iter()
            .filter(|(_, category)| !category.is_blank())
            .collect();

        let category_to_items = category_to_items
            .into_iter()
            .filter(|(category, _)| !category.is_blank())
            .map(|(category, items)| {
                let mut seen = AHashSet::with_capacity(items.len());
                let members: Vec<ItemId> = items.into_iter().filter(|id| seen.insert(*id)).collect();
                (category, members)
            })
            .collect();

        Self {
            item_to_category,
            category_to_items,
        }
    }

    #[inline]
    #[must_use]
    pub fn category_of(&self, id: ItemId) -> Option<&Category> {
        self.item_to_category.get(&id)
    }

    /// Members of a category in their stored order; empty for unknown categories.
    #[must_use]
    pub fn items_in(&self, category: &Category) -> &[ItemId] {
        self.category_to_items
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_to_category.len()
    }

    #[inline]
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.category_to_items.len()
    }

    pub fn item_categories(&self) -> impl Iterator<Item = (&ItemId, &Category)> {
        self.item_to_category.iter()
    }

    pub fn category_members(&self) -> impl Iterator<Item = (&Category, &Vec<ItemId>)> {
        self.category_to_items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_categories_are_dropped() {
        let catalog = Catalog::new(
            vec![
                (ItemId::new(1), Category::new("a")),
                (ItemId::new(2), Category::new("")),
            ],
            vec![(Category::new(""), vec![ItemId::new(2)])],
        );

        assert_eq!(catalog.category_of(ItemId::new(1)), Some(&Category::new("a")));
        assert_eq!(catalog.category_of(ItemId::new(2)), None);
        assert_eq!(catalog.category_count(), 0);
    }

    #[test]
    fn test_members_are_deduplicated_in_order() {
        let catalog = Catalog::new(
            Vec::new(),
            vec![(
                Category::new("a"),
                vec![ItemId::new(3), ItemId::new(1), ItemId::new(3), ItemId::new(2)],
            )],
        );

        assert_eq!(
            catalog.items_in(&Category::new("a")),
            &[ItemId::new(3), ItemId::new(1), ItemId::new(2)]
        );
        assert!(catalog.items_in(&Category::new("missing")).is_empty());
    }
}
