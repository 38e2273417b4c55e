//! Shared vocabulary for Folio crates: block and view identity, viewport
//! geometry, and the common error type.

pub mod errors;
pub mod id;
pub mod types;

pub use errors::EmbedError;
pub use id::{new_id, BlockId};
pub use types::{LayoutVariant, Rect, ViewId};

pub type Result<T> = std::result::Result<T, EmbedError>;
