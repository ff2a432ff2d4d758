//! # cobuy
//!
//! An item-to-item recommendation lookup service.
//!
//! Given a catalog item, cobuy answers with
//!
//! - items **bought together** with it, read from a precomputed cosine
//!   similarity matrix and kept within the item's category, and
//! - a **fallback** list of the most purchased items in the same category.
//!
//! All tables are produced upstream and loaded once; lookups never mutate them.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cobuy --data-dir ./models --http-port 8000
//! curl -X POST localhost:8000/recommend -H 'content-type: application/json' \
//!      -d '{"item_id": 461686, "top_n": 5, "threshold": 0.75}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use cobuy::prelude::*;
//! use std::sync::Arc;
//!
//! let model = ArtifactStore::new("./models").load().unwrap();
//! let recommender = Recommender::new(Arc::new(model), RecommendConfig::default());
//!
//! let rec = recommender.recommend(&Query::new(ItemId::new(461686))).unwrap();
//! println!("{:?}", rec.items_bought_together);
//! ```
//!
//! ## Crate Structure
//!
//! - `cobuy-core` - Tables (similarity matrix, catalog, purchase counts) and selection
//! - `cobuy-storage` - Artifact loading, checksum manifests, model bundles
//! - `cobuy-api` - REST API

// Re-export core types
pub use cobuy_core::{
    Catalog, Category, Event, EventKind, ItemId, Model, PurchaseCounts, SimilarityMatrix,
    Query, RecommendConfig, Recommendation, Recommender,
    Error, Result,
};

// Re-export storage
pub use cobuy_storage::{ArtifactStore, Manifest, ModelBundle, StorageError};

// Re-export API
pub use cobuy_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, Category, Event, EventKind, ItemId, Model, PurchaseCounts, SimilarityMatrix,
        Query, RecommendConfig, Recommendation, Recommender,
        Error, Result,
        ArtifactStore, Manifest, ModelBundle, StorageError,
        RestApi,
    };
}
