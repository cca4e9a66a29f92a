//! rollcall-core — identity matching for photo-based attendance.
//!
//! Given a roster of known-identity embeddings and the embeddings of faces
//! detected in a group photo, decides which detections belong to which
//! identity. Face detection and embedding extraction live behind the
//! [`Embedder`] collaborator boundary; this crate only compares vectors.

pub mod embedder;
pub mod matcher;
pub mod metric;
pub mod report;
pub mod roster;
pub mod types;

pub use embedder::{Embedder, EmbedderError};
pub use matcher::{MatchError, Matcher, RecognitionConfig};
pub use roster::{KnownIdentity, Roster, RosterError};
pub use types::{BoundingBox, Detection, Embedding, FaceRegion, MatchResult};
