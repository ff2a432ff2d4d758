use crate::artifact::{self, Artifact};
use crate::bundle::{ModelBundle, BUNDLE_FILE};
use crate::error::Result;
use crate::manifest::{Manifest, MANIFEST_FILE};
use cobuy_core::{Catalog, Category, ItemId, MatrixData, Model, SimilarityMatrix};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, warn};

/// Locates and loads the precomputed tables from a data directory
pub struct ArtifactStore {
    data_dir: PathBuf,
    bundle: ModelBundle,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let bundle = ModelBundle::new(data_dir.join(BUNDLE_FILE));
        Self { data_dir, bundle }
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[inline]
    #[must_use]
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Load the model, preferring a bundle that is newer than every source file
    pub fn load(&self) -> Result<Model> {
        if self.bundle_is_fresh() {
            match self.bundle.load() {
                Ok(model) => {
                    log_model(&model);
                    return Ok(model);
                }
                Err(e) => warn!("Ignoring unreadable model bundle: {}", e),
            }
        }
        self.load_sources()
    }

    /// Parse the four artifacts, verifying them against `manifest.json` when present
    pub fn load_sources(&self) -> Result<Model> {
        let started = Instant::now();
        info!("Loading artifacts from {:?}", self.data_dir);

        // existence first, so a missing file is reported before any parsing
        let similarity_path = Artifact::Similarity.require(&self.data_dir)?;
        let item_category_path = Artifact::ItemToCategory.require(&self.data_dir)?;
        let category_items_path = Artifact::CategoryToItems.require(&self.data_dir)?;
        let events_path = Artifact::Events.require(&self.data_dir)?;

        if let Some(manifest) = Manifest::load(&self.data_dir)? {
            manifest.verify(&self.data_dir)?;
            debug!("Verified {} artifact checksums", manifest.files.len());
        }

        let matrix: MatrixData = artifact::read_json(&similarity_path)?;
        let similarity = SimilarityMatrix::from_data(matrix)?;

        let item_to_category: HashMap<ItemId, Category> = artifact::read_json(&item_category_path)?;
        let category_to_items: HashMap<Category, Vec<ItemId>> =
            artifact::read_json(&category_items_path)?;
        let catalog = Catalog::new(item_to_category, category_to_items);

        let events = artifact::read_events(&events_path)?;
        debug!("Read {} events", events.len());

        let model = Model::new(similarity, catalog, &events);
        log_model(&model);
        info!("Artifacts loaded in {:?}", started.elapsed());
        Ok(model)
    }

    /// Persist `model` as a bundle next to the artifacts
    pub fn save_bundle(&self, model: &Model) -> Result<()> {
        self.bundle.save(model)
    }

    /// The bundle is used only when it is strictly newer than every source
    /// artifact and `manifest.json`. Equal or unreadable times count as stale.
    fn bundle_is_fresh(&self) -> bool {
        let Some(bundle_time) = modified(self.bundle.path()) else {
            return false;
        };

        let manifest = self.data_dir.join(MANIFEST_FILE);
        let manifest = manifest.exists().then_some(manifest);

        Artifact::ALL
            .iter()
            .filter_map(|kind| kind.locate(&self.data_dir))
            .chain(manifest)
            .all(|path| modified(&path).is_some_and(|source_time| source_time < bundle_time))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn log_model(model: &Model) {
    info!(
        items = model.similarity().len(),
        categorised = model.catalog().item_count(),
        categories = model.catalog().category_count(),
        purchased_items = model.purchases().len(),
        transactions = model.purchases().total(),
        "Model ready"
    );
}
