//! JSON exchange formats produced by the external detector/embedder tool.
//!
//! Two documents cross the collaborator boundary: a roster export (one
//! embedding per reference image) and a per-photo face scan. Both carry the
//! embedding model's identifier so mixed-model input can be refused.

use rollcall_core::FaceRegion;
use serde::Deserialize;

/// Export of the reference faces directory.
#[derive(Debug, Deserialize)]
pub struct RosterFile {
    /// Embedding model that produced the vectors.
    #[serde(default)]
    pub model: Option<String>,
    pub entries: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub embedding: Vec<f32>,
}

/// Faces detected and embedded in one photo.
#[derive(Debug, Deserialize)]
pub struct PhotoScan {
    #[serde(default)]
    pub model: Option<String>,
    /// Photo pixel dimensions; optional because `--image` can supply them.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub faces: Vec<ScannedFace>,
}

#[derive(Debug, Deserialize)]
pub struct ScannedFace {
    pub facial_area: FaceRegion,
    pub embedding: Vec<f32>,
}
