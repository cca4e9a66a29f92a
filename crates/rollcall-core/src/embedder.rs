//! Collaborator boundary for embedding extraction.
//!
//! The core never selects or tunes an embedding model; it only requires that
//! every embedding produced within one run has the same dimension.

use std::path::Path;

use thiserror::Error;

use crate::types::Embedding;

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("no face found in {0}")]
    NoFaceDetected(String),
    #[error("embedding backend: {0}")]
    Backend(String),
}

/// Produces exactly one embedding per reference image.
pub trait Embedder {
    fn represent(&self, image: &Path) -> Result<Embedding, EmbedderError>;
}
