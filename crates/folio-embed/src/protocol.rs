//! Wire contracts between the document surface and the view host process.
//!
//! The host owns the actual native views. Everything crossing the process
//! boundary is one of these messages; nothing else is shared. Requests and
//! events for a single view are applied in arrival order, but the two
//! directions interleave arbitrarily.

use serde::{Deserialize, Serialize};

use folio_common::{Rect, ViewId};

/// Sub-progress the host reports while a view initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitProgress {
    /// A fresh native view was created for this id.
    Created,
    /// The host still had a live view for this id and reused it.
    Existing,
    /// The view finished loading its content.
    Loaded,
}

/// Messages the document surface sends to the view host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum HostRequest {
    /// Create or reposition a view. Only sent once both URL and bounds are
    /// known and at least one of them changed.
    UpdateView {
        view_id: ViewId,
        url: String,
        bounds: Rect,
    },
    /// Destroy the view. Idempotent on the host side.
    RemoveView { view_id: ViewId },
    NavigateBack { view_id: ViewId },
    DevtoolsToggle { view_id: ViewId },
    DevtoolsState { view_id: ViewId },
}

impl HostRequest {
    pub fn view_id(&self) -> &ViewId {
        match self {
            HostRequest::UpdateView { view_id, .. }
            | HostRequest::RemoveView { view_id }
            | HostRequest::NavigateBack { view_id }
            | HostRequest::DevtoolsToggle { view_id }
            | HostRequest::DevtoolsState { view_id } => view_id,
        }
    }
}

/// Events the view host reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum HostEvent {
    /// Initialization / navigation outcome for a view.
    ViewInitialized {
        view_id: ViewId,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<InitProgress>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_code: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// The view navigated; keeps the back affordance in sync.
    NavigationUpdate {
        view_id: ViewId,
        url: String,
        can_go_back: bool,
    },
    #[serde(other)]
    Unknown,
}

/// Response to `navigate-back`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackNavigation {
    pub success: bool,
    pub can_go_back: bool,
}

/// Response to `devtools-toggle` / `devtools-state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevtoolsStatus {
    pub success: bool,
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_view_wire_shape() {
        let msg = HostRequest::UpdateView {
            view_id: ViewId::new("block-1:preview"),
            url: "https://example.com".into(),
            bounds: Rect::new(10.0, 20.0, 300.0, 200.0),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "update-view");
        assert_eq!(json["data"]["viewId"], "block-1:preview");
        assert_eq!(json["data"]["url"], "https://example.com");
        assert_eq!(json["data"]["bounds"]["width"], 300.0);
    }

    #[test]
    fn remove_view_wire_shape() {
        let msg = HostRequest::RemoveView {
            view_id: ViewId::new("block-1"),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "remove-view");
        assert_eq!(json["data"]["viewId"], "block-1");
    }

    #[test]
    fn view_initialized_success_deserializes() {
        let json = r#"{
            "type": "view-initialized",
            "data": {"viewId": "v1", "success": true, "status": "created"}
        }"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            HostEvent::ViewInitialized {
                view_id: ViewId::new("v1"),
                success: true,
                status: Some(InitProgress::Created),
                error: None,
                error_code: None,
                error_description: None,
                url: None,
            }
        );
    }

    #[test]
    fn view_initialized_failure_deserializes() {
        let json = r#"{
            "type": "view-initialized",
            "data": {
                "viewId": "v1",
                "success": false,
                "errorCode": -105,
                "errorDescription": "ERR_NAME_NOT_RESOLVED",
                "url": "https://bad.example"
            }
        }"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        match event {
            HostEvent::ViewInitialized {
                success,
                error_code,
                error_description,
                ..
            } => {
                assert!(!success);
                assert_eq!(error_code, Some(-105));
                assert_eq!(error_description.as_deref(), Some("ERR_NAME_NOT_RESOLVED"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn navigation_update_deserializes() {
        let json = r#"{
            "type": "navigation-update",
            "data": {"viewId": "v1", "url": "https://example.com/a", "canGoBack": true}
        }"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            HostEvent::NavigationUpdate {
                view_id: ViewId::new("v1"),
                url: "https://example.com/a".into(),
                can_go_back: true,
            }
        );
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"some-future-event","data":null}"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, HostEvent::Unknown);
    }

    #[test]
    fn request_view_id_accessor() {
        let id = ViewId::new("v9");
        let msg = HostRequest::NavigateBack {
            view_id: id.clone(),
        };
        assert_eq!(msg.view_id(), &id);
    }

    #[test]
    fn devtools_status_omits_absent_error() {
        let status = DevtoolsStatus {
            success: true,
            is_open: false,
            error: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["isOpen"], false);
        assert!(json.get("error").is_none());
    }
}
