use serde::{Deserialize, Serialize};

/// Face embedding vector of model-defined length.
///
/// All embeddings compared against each other must come from the same
/// embedding model and therefore share one length; mixing models is rejected
/// at the matcher and at the input boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A face region as reported by a detector backend.
///
/// Backends disagree on the wire shape: some report top-left plus size,
/// others two corner points. Both resolve to the same [`BoundingBox`] via
/// [`FaceRegion::normalize`]; nothing downstream branches on the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceRegion {
    TopLeftSize { x: i64, y: i64, w: i64, h: i64 },
    Corners { x1: i64, y1: i64, x2: i64, y2: i64 },
}

impl FaceRegion {
    /// Resolve to a box clamped inside an `image_width` × `image_height`
    /// image, with width and height at least 1.
    pub fn normalize(self, image_width: u32, image_height: u32) -> BoundingBox {
        let (x, y, w, h) = match self {
            FaceRegion::TopLeftSize { x, y, w, h } => (x, y, w, h),
            FaceRegion::Corners { x1, y1, x2, y2 } => {
                (x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
            }
        };

        let image_w = i64::from(image_width);
        let image_h = i64::from(image_height);
        let x = x.clamp(0, (image_w - 1).max(0));
        let y = y.clamp(0, (image_h - 1).max(0));
        let w = w.clamp(1, (image_w - x).max(1));
        let h = h.clamp(1, (image_h - y).max(1));

        BoundingBox {
            x: x as u32,
            y: y as u32,
            width: w as u32,
            height: h as u32,
        }
    }
}

/// Pixel-space bounding box of one detected face, normalized to top-left
/// plus size and guaranteed to lie within its source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One detected face in a photo: where it is and what it looks like.
/// Lives only for the recognition call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub embedding: Embedding,
}

/// Outcome of matching one detection against the roster.
///
/// `identity` is populated only for accepted matches; the name of a
/// nearest-but-rejected candidate is discarded, never reported.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub detection: Detection,
    pub identity: Option<String>,
    pub distance: f32,
    pub confidence: f32,
    pub accepted: bool,
}
