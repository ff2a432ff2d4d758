//! # cobuy Core
//!
//! Core library for the cobuy recommendation service.
//!
//! This crate provides the read-only tables and the selection routine:
//!
//! - [`SimilarityMatrix`] - Square item-item cosine similarity table
//! - [`Catalog`] - Item -> category and category -> items relations
//! - [`PurchaseCounts`] - Per-item transaction counts derived from the event log
//! - [`Model`] - The tables bundled together, immutable once built
//! - [`Recommender`] - "Bought together" and category fallback selection
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cobuy_core::{
//!     Catalog, Category, Event, EventKind, ItemId, Model, Query, RecommendConfig,
//!     Recommender, SimilarityMatrix,
//! };
//!
//! let items = vec![ItemId::new(1), ItemId::new(2)];
//! let similarity = SimilarityMatrix::from_rows(
//!     items.clone(),
//!     vec![vec![1.0, 0.9], vec![0.9, 1.0]],
//! ).unwrap();
//!
//! let shoes = Category::new("shoes");
//! let catalog = Catalog::new(
//!     items.iter().map(|id| (*id, shoes.clone())),
//!     vec![(shoes.clone(), items.clone())],
//! );
//! let events = vec![Event::new(ItemId::new(2), EventKind::Transaction)];
//!
//! let model = Arc::new(Model::new(similarity, catalog, &events));
//! let recommender = Recommender::new(model, RecommendConfig::default());
//!
//! let rec = recommender.recommend(&Query::new(ItemId::new(1))).unwrap();
//! assert_eq!(rec.items_bought_together, vec![ItemId::new(2)]);
//! assert_eq!(rec.similar_items_in_category, vec![ItemId::new(2)]);
//! ```

pub mod catalog;
pub mod error;
pub mod events;
pub mod filter;
pub mod item;
pub mod model;
pub mod recommender;
pub mod similarity;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use events::{Event, EventKind, PurchaseCounts};
pub use filter::{Candidate, CatalogFilter, Filter, FilterCondition};
pub use item::{Category, ItemId};
pub use model::Model;
pub use recommender::{
    Query, RecommendConfig, Recommendation, Recommender, DEFAULT_FALLBACK_LIMIT,
    DEFAULT_THRESHOLD, DEFAULT_TOP_N,
};
pub use similarity::{MatrixData, SimilarityMatrix};
