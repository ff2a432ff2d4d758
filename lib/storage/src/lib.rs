pub mod artifact;
pub mod bundle;
pub mod error;
pub mod manager;
pub mod manifest;

pub use artifact::Artifact;
pub use bundle::{BundleData, ModelBundle, BUNDLE_FILE, BUNDLE_VERSION};
pub use error::{Result, StorageError};
pub use manager::ArtifactStore;
pub use manifest::{sha256_file, Manifest, MANIFEST_FILE};
