//! In-process events for the UI layer (error panel, back affordance).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use folio_common::ViewId;

use crate::lifecycle::InitStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EmbedEvent {
    StatusChanged {
        view_id: ViewId,
        status: InitStatus,
    },
    NavigationChanged {
        view_id: ViewId,
        url: String,
        can_go_back: bool,
    },
    ViewRemoved(ViewId),
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<EmbedEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EmbedEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: EmbedEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(EmbedEvent::StatusChanged {
            view_id: ViewId::new("v1"),
            status: InitStatus::Initialized,
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            EmbedEvent::StatusChanged {
                status: InitStatus::Initialized,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers_see_removal() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(EmbedEvent::ViewRemoved(ViewId::new("v1")));

        assert!(matches!(rx1.recv().await.unwrap(), EmbedEvent::ViewRemoved(_)));
        assert!(matches!(rx2.recv().await.unwrap(), EmbedEvent::ViewRemoved(_)));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        let count = bus.publish(EmbedEvent::ViewRemoved(ViewId::new("v1")));
        assert_eq!(count, 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomeNewEventWeNeverHeardOf","data":null}"#;
        let event: EmbedEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, EmbedEvent::Unknown));
    }
}
