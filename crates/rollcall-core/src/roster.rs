//! The roster of known identities: one reference embedding per person,
//! loaded once per run and immutable afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embedder::Embedder;
use crate::types::Embedding;

/// Reference images are matched by extension, case-insensitively.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("reading faces directory {path}: {source}")]
    DirUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("duplicate identity name: {0}")]
    DuplicateName(String),
    #[error("embedding for {name} has dimension {got}, roster uses {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("identity {0} has an empty embedding")]
    EmptyEmbedding(String),
}

/// One enrolled person: name (from the reference image's file stem) plus
/// reference embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownIdentity {
    pub name: String,
    pub embedding: Embedding,
}

/// The set of known identities, in load order. Load order is the matcher's
/// tie-break order, so it must be stable: directory loads sort reference
/// files lexicographically by file name.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<KnownIdentity>,
    model_id: Option<String>,
}

impl Roster {
    /// Load reference embeddings from a directory of images, one identity
    /// per file. A file the embedder cannot handle is skipped with a
    /// warning; so is one whose embedding dimension disagrees with the rest.
    /// Only an unreadable directory fails the load.
    pub fn load(dir: &Path, embedder: &dyn Embedder) -> Result<Self, RosterError> {
        let entries = std::fs::read_dir(dir).map_err(|source| RosterError::DirUnreadable {
            path: dir.display().to_string(),
            source,
        })?;

        let mut files: Vec<std::path::PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));

        let mut roster = Roster::default();
        for path in files {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping reference image with unusable file name");
                continue;
            };

            let embedding = match embedder.represent(&path) {
                Ok(embedding) => embedding,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping reference image");
                    continue;
                }
            };

            match roster.push(name.to_string(), embedding) {
                Ok(()) => tracing::info!(name, "reference embedding loaded"),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping reference image");
                }
            }
        }

        if roster.is_empty() {
            tracing::warn!(dir = %dir.display(), "no reference embeddings loaded");
        }
        Ok(roster)
    }

    /// Build a roster from precomputed (name, vector) pairs, preserving
    /// their order. Unlike [`Roster::load`], malformed entries here mean a
    /// malformed input file, so they fail instead of being skipped.
    pub fn from_entries<I>(entries: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut roster = Roster::default();
        for (name, values) in entries {
            roster.push(name, Embedding::new(values))?;
        }
        Ok(roster)
    }

    /// Tag the roster with the embedding model that produced its vectors.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    fn push(&mut self, name: String, embedding: Embedding) -> Result<(), RosterError> {
        if embedding.is_empty() {
            return Err(RosterError::EmptyEmbedding(name));
        }
        if let Some(expected) = self.dimension() {
            if embedding.len() != expected {
                return Err(RosterError::DimensionMismatch {
                    name,
                    expected,
                    got: embedding.len(),
                });
            }
        }
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(RosterError::DuplicateName(name));
        }
        self.entries.push(KnownIdentity { name, embedding });
        Ok(())
    }

    /// Identities in load order.
    pub fn identities(&self) -> &[KnownIdentity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// An empty roster is a valid, explicit state: matching against it
    /// short-circuits to "no possible match".
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension shared by every entry; `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.embedding.len())
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
