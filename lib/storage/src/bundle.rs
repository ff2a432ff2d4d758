use crate::error::{Result, StorageError};
use chrono::{DateTime, Utc};
use cobuy_core::{Catalog, Category, ItemId, Model, PurchaseCounts, SimilarityMatrix};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BUNDLE_FILE: &str = "model.bundle";

/// Bumped whenever the on-disk layout changes
pub const BUNDLE_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct BundleData {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<u64>,
    pub cells: Vec<f64>,
    pub item_categories: Vec<(u64, String)>,
    pub category_items: Vec<(String, Vec<u64>)>,
    pub purchases: Vec<(u64, u64)>,
}

impl BundleData {
    pub fn from_model(model: &Model) -> Self {
        let similarity = model.similarity();
        let catalog = model.catalog();

        Self {
            version: BUNDLE_VERSION,
            created_at: Utc::now(),
            items: similarity.items().iter().map(|id| id.get()).collect(),
            cells: similarity.cells().to_vec(),
            item_categories: catalog
                .item_categories()
                .map(|(id, c)| (id.get(), c.as_str().to_string()))
                .collect(),
            category_items: catalog
                .category_members()
                .map(|(c, items)| {
                    (
                        c.as_str().to_string(),
                        items.iter().map(|id| id.get()).collect(),
                    )
                })
                .collect(),
            purchases: model
                .purchases()
                .iter()
                .map(|(id, n)| (id.get(), n))
                .collect(),
        }
    }

    pub fn into_model(self) -> Result<Model> {
        if self.version != BUNDLE_VERSION {
            return Err(StorageError::Bundle(format!(
                "unsupported bundle version {} (expected {})",
                self.version, BUNDLE_VERSION
            )));
        }

        let similarity = SimilarityMatrix::new(
            self.items.into_iter().map(ItemId::new).collect(),
            self.cells,
        )?;
        let catalog = Catalog::new(
            self.item_categories
                .into_iter()
                .map(|(id, c)| (ItemId::new(id), Category::new(c))),
            self.category_items.into_iter().map(|(c, items)| {
                (Category::new(c), items.into_iter().map(ItemId::new).collect())
            }),
        );
        let purchases: PurchaseCounts = self
            .purchases
            .into_iter()
            .map(|(id, n)| (ItemId::new(id), n))
            .collect();

        Ok(Model::with_purchases(similarity, catalog, purchases))
    }
}

/// Single-file bincode snapshot of a parsed model
pub struct ModelBundle {
    path: PathBuf,
}

impl ModelBundle {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write to a temporary file, then rename over the bundle
    pub fn save(&self, model: &Model) -> Result<()> {
        let data = bincode::serialize(&BundleData::from_model(model))
            .map_err(|e| StorageError::Bundle(format!("serialization error: {}", e)))?;

        let temp_file = self.path.with_extension("tmp");
        std::fs::write(&temp_file, &data)?;
        std::fs::rename(&temp_file, &self.path)?;

        tracing::info!(path = %self.path.display(), bytes = data.len(), "model bundle saved");
        Ok(())
    }

    pub fn load(&self) -> Result<Model> {
        if !self.exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }

        let data = std::fs::read(&self.path)?;
        let bundle: BundleData = bincode::deserialize(&data)
            .map_err(|e| StorageError::Bundle(format!("deserialization error: {}", e)))?;

        tracing::info!(
            path = %self.path.display(),
            created_at = %bundle.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
            "loading model bundle"
        );
        bundle.into_model()
    }
}
