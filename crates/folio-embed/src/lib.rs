//! Embedded browser-block synchronization for Folio documents.
//!
//! Keeps each out-of-process native web view aligned with its placeholder
//! in the document surface:
//! - Viewport measurement (clipped visible bounds, de-duplicated emissions)
//! - Bounds/URL update channel to the privileged view host
//! - Per-view initialization state machine with stall timeout and retry
//! - Classification of navigation failures into user-facing errors
//! - Wire contracts for the view host process

pub mod channel;
pub mod classify;
pub mod config;
pub mod events;
pub mod host;
pub mod lifecycle;
pub mod protocol;
pub mod registry;
pub mod viewport;

pub use channel::{is_supported_url, UpdateChannel, UpdateOrigin, ViewRecord};
pub use classify::{classify, ClassifiedError, RawFailure};
pub use config::EmbedConfig;
pub use events::{EmbedEvent, EventBus};
pub use host::ViewHost;
pub use lifecycle::{InitStatus, LifecycleState};
pub use protocol::{BackNavigation, DevtoolsStatus, HostEvent, HostRequest, InitProgress};
pub use registry::EmbedRegistry;
pub use viewport::{clip_to_viewport, PlaceholderProbe, Viewport, ViewportTracker};
