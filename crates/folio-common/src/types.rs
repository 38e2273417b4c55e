use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::BlockId;

/// A rectangle in viewport coordinates. For embedded views this is always
/// the *visible, clipped* rectangle, never the raw element rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Which layout rendition of a block a view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    Preview,
    Full,
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutVariant::Preview => write!(f, "preview"),
            LayoutVariant::Full => write!(f, "full"),
        }
    }
}

/// Identity of one embedded view, stable for the lifetime of its
/// placeholder. Derived from the owning block, optionally qualified by
/// layout variant (`<blockId>` or `<blockId>:preview` / `<blockId>:full`).
/// Never reused across unrelated content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The view for a block's sole rendition.
    pub fn for_block(block: &BlockId) -> Self {
        Self(block.as_str().to_string())
    }

    /// The view for one layout rendition of a block.
    pub fn for_block_variant(block: &BlockId, variant: LayoutVariant) -> Self {
        Self(format!("{}:{}", block.as_str(), variant))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
