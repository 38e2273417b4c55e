//! Bounds/URL update channel.
//!
//! Holds the latest known URL and bounds per view and flushes a combined
//! `update-view` to the host only when both are known and at least one has
//! actually changed. Upstream measurement already de-duplicates by value, so
//! no batching window is needed; one logical change is one outbound message.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use folio_common::{Rect, ViewId};

use crate::protocol::HostRequest;

/// URL prefixes an embedded view may display. Everything else is rejected
/// client-side before any host traffic.
pub const SUPPORTED_URL_PREFIXES: &[&str] = &["https://", "http://", "about:blank"];

/// Check whether a URL may be handed to the view host.
pub fn is_supported_url(url: &str) -> bool {
    SUPPORTED_URL_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Where a URL change came from. External changes (host-reported
/// navigation) are recorded for change detection but never echoed back to
/// the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    Local,
    External,
}

/// Latest known URL and bounds for one embedded view, plus the last flushed
/// pair used for change detection. Owned exclusively by the channel.
#[derive(Debug, Clone, Default)]
pub struct ViewRecord {
    pub last_known_url: Option<String>,
    pub last_known_bounds: Option<Rect>,
    flushed: Option<(String, Rect)>,
}

/// Outbound sink shared with the transport layer; drained in send order.
pub type OutboundQueue = Arc<Mutex<Vec<HostRequest>>>;

pub struct UpdateChannel {
    records: HashMap<ViewId, ViewRecord>,
    outbound: OutboundQueue,
}

impl UpdateChannel {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            outbound: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the outbound queue, for the transport to drain.
    pub fn outbound(&self) -> OutboundQueue {
        Arc::clone(&self.outbound)
    }

    /// Drain all pending outbound messages.
    pub fn drain_outbound(&self) -> Vec<HostRequest> {
        let mut queue = self.outbound.lock().unwrap();
        std::mem::take(&mut *queue)
    }

    /// Create the record for a newly mounted placeholder.
    pub fn open(&mut self, view_id: ViewId) {
        self.records.entry(view_id).or_default();
    }

    /// Drop the record for an unmounted placeholder. Returns whether a
    /// record existed.
    pub fn close(&mut self, view_id: &ViewId) -> bool {
        self.records.remove(view_id).is_some()
    }

    pub fn record(&self, view_id: &ViewId) -> Option<&ViewRecord> {
        self.records.get(view_id)
    }

    /// Record a URL change and attempt a flush. Returns true when an
    /// `update-view` was sent.
    pub fn handle_url_change(&mut self, view_id: &ViewId, url: &str, origin: UpdateOrigin) -> bool {
        if !is_supported_url(url) {
            warn!(view = %view_id, url, "unsupported url not recorded");
            return false;
        }
        let Some(record) = self.records.get_mut(view_id) else {
            warn!(view = %view_id, "url change for unknown view ignored");
            return false;
        };
        record.last_known_url = Some(url.to_string());

        match origin {
            UpdateOrigin::Local => self.try_flush(view_id),
            // The host already knows where it navigated.
            UpdateOrigin::External => false,
        }
    }

    /// Record a bounds change and attempt a flush. Returns true when an
    /// `update-view` was sent.
    pub fn handle_bounds_change(&mut self, view_id: &ViewId, bounds: Rect) -> bool {
        let Some(record) = self.records.get_mut(view_id) else {
            warn!(view = %view_id, "bounds change for unknown view ignored");
            return false;
        };
        record.last_known_bounds = Some(bounds);
        self.try_flush(view_id)
    }

    /// Clear the flushed memory so the next flush is not suppressed even if
    /// URL and bounds are unchanged. Used by the retry flow.
    pub fn mark_stale(&mut self, view_id: &ViewId) {
        if let Some(record) = self.records.get_mut(view_id) {
            record.flushed = None;
        }
    }

    /// Flush when both fields are known and the pair differs from what was
    /// last sent. A url-only or bounds-only record never flushes: the host
    /// must never see a view with undefined geometry or undefined content.
    fn try_flush(&mut self, view_id: &ViewId) -> bool {
        let Some(record) = self.records.get_mut(view_id) else {
            return false;
        };
        let (Some(url), Some(bounds)) = (record.last_known_url.clone(), record.last_known_bounds)
        else {
            return false;
        };

        let pair = (url, bounds);
        if record.flushed.as_ref() == Some(&pair) {
            return false;
        }
        record.flushed = Some(pair.clone());
        let (url, bounds) = pair;

        debug!(view = %view_id, url = %url, ?bounds, "flushing update-view");
        let message = HostRequest::UpdateView {
            view_id: view_id.clone(),
            url,
            bounds,
        };
        if let Ok(mut queue) = self.outbound.lock() {
            queue.push(message);
        }
        true
    }
}

impl Default for UpdateChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewId {
        ViewId::new("block-1:preview")
    }

    fn bounds() -> Rect {
        Rect::new(10.0, 20.0, 300.0, 200.0)
    }

    // -- URL policy --

    #[test]
    fn allows_http_https_and_about_blank() {
        assert!(is_supported_url("https://example.com/page"));
        assert!(is_supported_url("http://localhost:8080"));
        assert!(is_supported_url("about:blank"));
    }

    #[test]
    fn blocks_script_file_and_garbage_urls() {
        assert!(!is_supported_url("javascript:alert(1)"));
        assert!(!is_supported_url("data:text/html,<h1>x</h1>"));
        assert!(!is_supported_url("file:///etc/passwd"));
        assert!(!is_supported_url(""));
        assert!(!is_supported_url("not-a-url"));
    }

    // -- Flush gating --

    #[test]
    fn url_only_never_flushes() {
        let mut channel = UpdateChannel::new();
        channel.open(view());

        assert!(!channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local));
        assert!(channel.drain_outbound().is_empty());
    }

    #[test]
    fn bounds_only_never_flushes() {
        let mut channel = UpdateChannel::new();
        channel.open(view());

        assert!(!channel.handle_bounds_change(&view(), bounds()));
        assert!(channel.drain_outbound().is_empty());
    }

    #[test]
    fn flushes_once_both_fields_known() {
        let mut channel = UpdateChannel::new();
        channel.open(view());

        channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local);
        assert!(channel.handle_bounds_change(&view(), bounds()));

        let sent = channel.drain_outbound();
        assert_eq!(
            sent,
            vec![HostRequest::UpdateView {
                view_id: view(),
                url: "https://example.com".into(),
                bounds: bounds(),
            }]
        );
    }

    #[test]
    fn identical_bounds_flush_exactly_once() {
        let mut channel = UpdateChannel::new();
        channel.open(view());
        channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local);

        assert!(channel.handle_bounds_change(&view(), bounds()));
        assert!(!channel.handle_bounds_change(&view(), bounds()));
        assert!(!channel.handle_bounds_change(&view(), bounds()));

        assert_eq!(channel.drain_outbound().len(), 1);
    }

    #[test]
    fn changed_bounds_flush_again() {
        let mut channel = UpdateChannel::new();
        channel.open(view());
        channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local);
        channel.handle_bounds_change(&view(), bounds());

        assert!(channel.handle_bounds_change(&view(), Rect::new(10.0, 120.0, 300.0, 200.0)));
        assert_eq!(channel.drain_outbound().len(), 2);
    }

    #[test]
    fn changed_url_flushes_with_same_bounds() {
        let mut channel = UpdateChannel::new();
        channel.open(view());
        channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local);
        channel.handle_bounds_change(&view(), bounds());

        assert!(channel.handle_url_change(&view(), "https://example.org", UpdateOrigin::Local));
        let sent = channel.drain_outbound();
        assert_eq!(sent.len(), 2);
        match &sent[1] {
            HostRequest::UpdateView { url, .. } => assert_eq!(url, "https://example.org"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    // -- Origin tagging --

    #[test]
    fn external_url_is_recorded_but_not_flushed() {
        let mut channel = UpdateChannel::new();
        channel.open(view());
        channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local);
        channel.handle_bounds_change(&view(), bounds());
        channel.drain_outbound();

        // Host navigated on its own; we must not echo it back.
        assert!(!channel.handle_url_change(
            &view(),
            "https://example.com/next",
            UpdateOrigin::External
        ));
        assert!(channel.drain_outbound().is_empty());

        // But the stored value tracked it, so re-announcing the same URL
        // locally is not a change.
        assert_eq!(
            channel.record(&view()).unwrap().last_known_url.as_deref(),
            Some("https://example.com/next")
        );
    }

    // -- Unsupported URLs --

    #[test]
    fn unsupported_url_is_not_recorded() {
        let mut channel = UpdateChannel::new();
        channel.open(view());

        assert!(!channel.handle_url_change(&view(), "javascript:alert(1)", UpdateOrigin::Local));
        assert!(channel.record(&view()).unwrap().last_known_url.is_none());
    }

    // -- Retry support --

    #[test]
    fn mark_stale_forces_identical_reflush() {
        let mut channel = UpdateChannel::new();
        channel.open(view());
        channel.handle_url_change(&view(), "https://example.com", UpdateOrigin::Local);
        channel.handle_bounds_change(&view(), bounds());
        channel.drain_outbound();

        channel.mark_stale(&view());
        assert!(channel.handle_bounds_change(&view(), bounds()));
        assert_eq!(channel.drain_outbound().len(), 1);
    }

    // -- Record lifecycle --

    #[test]
    fn close_drops_the_record() {
        let mut channel = UpdateChannel::new();
        channel.open(view());
        assert!(channel.close(&view()));
        assert!(!channel.close(&view()));

        assert!(!channel.handle_bounds_change(&view(), bounds()));
        assert!(channel.drain_outbound().is_empty());
    }

    #[test]
    fn views_do_not_share_records() {
        let mut channel = UpdateChannel::new();
        let a = ViewId::new("block-1");
        let b = ViewId::new("block-2");
        channel.open(a.clone());
        channel.open(b.clone());

        channel.handle_url_change(&a, "https://example.com", UpdateOrigin::Local);
        channel.handle_bounds_change(&a, bounds());
        // b still has nothing; a's flush must be the only message.
        channel.handle_bounds_change(&b, bounds());

        let sent = channel.drain_outbound();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].view_id(), &a);
    }
}
