//! Round-trip operations on the privileged view host.

use async_trait::async_trait;

use folio_common::{Result, ViewId};

use crate::protocol::{BackNavigation, DevtoolsStatus};

/// Request/response surface of the view host.
///
/// Every call is asynchronous and fallible, and its response may interleave
/// arbitrarily with `HostEvent`s for the same view; callers must not assume
/// any ordering between a response and locally observed state transitions.
#[async_trait]
pub trait ViewHost: Send + Sync {
    /// Ask the view to navigate back one history entry.
    async fn navigate_back(&self, view_id: &ViewId) -> Result<BackNavigation>;

    /// Whether the view's devtools panel is open.
    async fn devtools_state(&self, view_id: &ViewId) -> Result<DevtoolsStatus>;

    /// Toggle the view's devtools panel.
    async fn toggle_devtools(&self, view_id: &ViewId) -> Result<DevtoolsStatus>;
}
