//! Embedded view coordination.
//!
//! `EmbedRegistry` is the one owner of per-view state: the update channel's
//! records, each view's lifecycle state machine, and the outbound message
//! queue. The UI lifecycle calls `mount`/`unmount`, the layout layer feeds
//! measured bounds and local URL changes, host events are applied in
//! arrival order, and an event bus carries status changes back to the UI.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, warn};

use folio_common::{EmbedError, Rect, Result, ViewId};

use crate::channel::{is_supported_url, UpdateChannel, UpdateOrigin};
use crate::classify::{classify, RawFailure};
use crate::config::EmbedConfig;
use crate::events::{EmbedEvent, EventBus};
use crate::host::ViewHost;
use crate::lifecycle::{InitStatus, LifecycleState};
use crate::protocol::{BackNavigation, DevtoolsStatus, HostEvent, HostRequest};

struct EmbedInstance {
    lifecycle: LifecycleState,
    can_go_back: bool,
}

pub struct EmbedRegistry {
    views: HashMap<ViewId, EmbedInstance>,
    channel: UpdateChannel,
    outbound: Arc<Mutex<Vec<HostRequest>>>,
    bus: EventBus,
    config: EmbedConfig,
}

impl EmbedRegistry {
    pub fn new(config: EmbedConfig) -> Self {
        let channel = UpdateChannel::new();
        let outbound = channel.outbound();
        Self {
            views: HashMap::new(),
            channel,
            outbound,
            bus: EventBus::new(64),
            config,
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EmbedEvent> {
        self.bus.subscribe()
    }

    /// Drain all pending outbound messages, in send order.
    pub fn drain_outbound(&self) -> Vec<HostRequest> {
        self.channel.drain_outbound()
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn is_mounted(&self, view_id: &ViewId) -> bool {
        self.views.contains_key(view_id)
    }

    pub fn count(&self) -> usize {
        self.views.len()
    }

    pub fn status(&self, view_id: &ViewId) -> Option<&InitStatus> {
        self.views.get(view_id).map(|v| v.lifecycle.status())
    }

    pub fn can_go_back(&self, view_id: &ViewId) -> bool {
        self.views.get(view_id).map(|v| v.can_go_back).unwrap_or(false)
    }

    /// Register a newly mounted placeholder. No host traffic happens until
    /// both a URL and bounds are known.
    pub fn mount(&mut self, view_id: ViewId) {
        if self.views.contains_key(&view_id) {
            warn!(view = %view_id, "placeholder mounted twice; ids must not be shared");
            return;
        }
        debug!(view = %view_id, "placeholder mounted");
        self.channel.open(view_id.clone());
        self.views.insert(
            view_id,
            EmbedInstance {
                lifecycle: LifecycleState::new(self.config.init_timeout()),
                can_go_back: false,
            },
        );
    }

    /// Discard all local state for an unmounted placeholder and tell the
    /// host to destroy the native view. Removal is best-effort and sent
    /// exactly once; the host treats it as idempotent.
    pub fn unmount(&mut self, view_id: &ViewId) {
        if self.views.remove(view_id).is_none() {
            warn!(view = %view_id, "unmount for unknown view ignored");
            return;
        }
        self.channel.close(view_id);

        debug!(view = %view_id, "placeholder unmounted, removing view");
        if let Ok(mut queue) = self.outbound.lock() {
            queue.push(HostRequest::RemoveView {
                view_id: view_id.clone(),
            });
        }
        self.bus.publish(EmbedEvent::ViewRemoved(view_id.clone()));
    }

    /// A local (document-driven) URL change: the block's content URL was
    /// set or edited. Unsupported URLs never reach the host; they become an
    /// invalid-url error immediately.
    pub fn set_url(&mut self, view_id: &ViewId, url: &str, now: Instant) {
        let Some(instance) = self.views.get_mut(view_id) else {
            warn!(view = %view_id, url, "url change for unmounted view ignored");
            return;
        };

        if !is_supported_url(url) {
            if instance.lifecycle.fail(classify(&RawFailure::invalid_url(url))) {
                let status = instance.lifecycle.status().clone();
                self.bus.publish(EmbedEvent::StatusChanged {
                    view_id: view_id.clone(),
                    status,
                });
            }
            return;
        }

        if self.channel.handle_url_change(view_id, url, UpdateOrigin::Local) {
            self.note_update_sent(view_id, now);
        }
    }

    /// A measured bounds emission from the placeholder's viewport tracker.
    pub fn observe_bounds(&mut self, view_id: &ViewId, bounds: Rect, now: Instant) {
        if !self.views.contains_key(view_id) {
            warn!(view = %view_id, "bounds for unmounted view ignored");
            return;
        }
        if self.channel.handle_bounds_change(view_id, bounds) {
            self.note_update_sent(view_id, now);
        }
    }

    /// Apply a host event in arrival order. The state machines tolerate
    /// duplicate and late events, so defects in arrival order cannot
    /// downgrade success or overwrite a first error.
    pub fn apply_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::ViewInitialized {
                view_id,
                success,
                status,
                error,
                error_code,
                error_description,
                url,
            } => {
                let Some(instance) = self.views.get_mut(&view_id) else {
                    warn!(view = %view_id, "initialization report for unknown view ignored");
                    return;
                };
                let changed = if success {
                    instance.lifecycle.advance(status)
                } else {
                    let failure = RawFailure {
                        code: error_code,
                        description: error_description,
                        url,
                        message: error,
                    };
                    instance.lifecycle.fail(classify(&failure))
                };
                if changed {
                    let status = instance.lifecycle.status().clone();
                    self.bus.publish(EmbedEvent::StatusChanged { view_id, status });
                }
            }
            HostEvent::NavigationUpdate {
                view_id,
                url,
                can_go_back,
            } => {
                let Some(instance) = self.views.get_mut(&view_id) else {
                    warn!(view = %view_id, "navigation update for unknown view ignored");
                    return;
                };
                instance.can_go_back = can_go_back;
                // External origin: recorded for change detection, never
                // echoed back to the host.
                self.channel
                    .handle_url_change(&view_id, &url, UpdateOrigin::External);
                self.bus.publish(EmbedEvent::NavigationChanged {
                    view_id,
                    url,
                    can_go_back,
                });
            }
            HostEvent::Unknown => {
                debug!("unknown host event ignored");
            }
        }
    }

    /// Stall sweep, driven by the app's frame tick with an injected clock.
    pub fn poll(&mut self, now: Instant) {
        let mut stalled: Vec<(ViewId, InitStatus)> = Vec::new();
        for (view_id, instance) in self.views.iter_mut() {
            let url = self
                .channel
                .record(view_id)
                .and_then(|r| r.last_known_url.clone());
            if instance.lifecycle.poll_stall(now, url) {
                stalled.push((view_id.clone(), instance.lifecycle.status().clone()));
            }
        }
        for (view_id, status) in stalled {
            self.bus.publish(EmbedEvent::StatusChanged { view_id, status });
        }
    }

    /// User-invoked retry from an error panel. Resets the state machine to
    /// `Idle` and clears the channel's flushed memory; the placeholder
    /// component re-feeds the last measured bounds (clearing its tracker's
    /// de-dup memory), and that next flush re-triggers creation. Retry
    /// itself never talks to the host.
    pub fn retry(&mut self, view_id: &ViewId) -> Result<()> {
        let instance = self
            .views
            .get_mut(view_id)
            .ok_or_else(|| EmbedError::UnknownView(view_id.to_string()))?;

        if !instance.lifecycle.retry() {
            debug!(view = %view_id, "retry outside error state ignored");
            return Ok(());
        }
        self.channel.mark_stale(view_id);

        let status = instance.lifecycle.status().clone();
        self.bus.publish(EmbedEvent::StatusChanged {
            view_id: view_id.clone(),
            status,
        });
        Ok(())
    }

    /// Ask the host to navigate the view back one history entry.
    pub async fn navigate_back(
        &mut self,
        host: &dyn ViewHost,
        view_id: &ViewId,
    ) -> Result<BackNavigation> {
        if !self.views.contains_key(view_id) {
            return Err(EmbedError::UnknownView(view_id.to_string()));
        }
        let response = host.navigate_back(view_id).await?;
        if let Some(instance) = self.views.get_mut(view_id) {
            instance.can_go_back = response.can_go_back;
        }
        Ok(response)
    }

    pub async fn devtools_state(
        &self,
        host: &dyn ViewHost,
        view_id: &ViewId,
    ) -> Result<DevtoolsStatus> {
        if !self.views.contains_key(view_id) {
            return Err(EmbedError::UnknownView(view_id.to_string()));
        }
        host.devtools_state(view_id).await
    }

    pub async fn toggle_devtools(
        &self,
        host: &dyn ViewHost,
        view_id: &ViewId,
    ) -> Result<DevtoolsStatus> {
        if !self.views.contains_key(view_id) {
            return Err(EmbedError::UnknownView(view_id.to_string()));
        }
        host.toggle_devtools(view_id).await
    }

    fn note_update_sent(&mut self, view_id: &ViewId, now: Instant) {
        let Some(instance) = self.views.get_mut(view_id) else {
            return;
        };
        if instance.lifecycle.note_update_sent(now) {
            let status = instance.lifecycle.status().clone();
            self.bus.publish(EmbedEvent::StatusChanged {
                view_id: view_id.clone(),
                status,
            });
        }
    }
}
