// Readers for the precomputed artifact files
use crate::error::{Result, StorageError};
use cobuy_core::Event;
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// The four tables the service is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Similarity,
    ItemToCategory,
    CategoryToItems,
    Events,
}

impl Artifact {
    pub const ALL: [Artifact; 4] = [
        Artifact::Similarity,
        Artifact::ItemToCategory,
        Artifact::CategoryToItems,
        Artifact::Events,
    ];

    /// Accepted file names, in lookup order
    pub fn file_names(self) -> &'static [&'static str] {
        match self {
            Artifact::Similarity => &["item_similarity.json", "item_similarity.json.gz"],
            Artifact::ItemToCategory => &["item_to_category.json", "item_to_category.json.gz"],
            Artifact::CategoryToItems => &["category_to_items.json", "category_to_items.json.gz"],
            Artifact::Events => &[
                "events.json",
                "events.json.gz",
                "events.jsonl",
                "events.jsonl.gz",
            ],
        }
    }

    /// First existing file for this artifact in `dir`
    pub fn locate(self, dir: &Path) -> Option<PathBuf> {
        self.file_names()
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Like [`Artifact::locate`], but a missing file is an error naming the primary file
    pub fn require(self, dir: &Path) -> Result<PathBuf> {
        self.locate(dir)
            .ok_or_else(|| StorageError::NotFound(dir.join(self.file_names()[0])))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

fn is_json_lines(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.ends_with(".jsonl") || name.ends_with(".jsonl.gz")
}

/// Open a file, transparently decompressing `.gz`
pub fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
        _ => StorageError::Io(e),
    })?;

    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = open(path)?;
    serde_json::from_reader(reader).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the event log, either a JSON array or one JSON object per line
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    if !is_json_lines(path) {
        return read_json(path);
    }

    let reader = open(path)?;
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<Event>()
        .map(|event| {
            event.map_err(|source| StorageError::Parse {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}
