//! User-feedback event broadcasting.
//!
//! The coordinator surfaces everything the user should see (accepted scans,
//! success and error alerts, re-arming) through a broadcast bus, decoupling
//! it from whatever renders the feedback: terminal output, a WebSocket
//! forwarder, or a test harness. Events emitted while nobody is subscribed
//! are dropped, which is exactly the behavior wanted for a session whose
//! front-end has already been torn down.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity. Slow subscribers past this start missing
/// events (lag).
const DEFAULT_CAPACITY: usize = 256;

/// Severity of a user-facing alert, mirroring the toast styles of the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    Info,
    Error,
}

/// A user-visible feedback event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UiEvent {
    /// Capture session started.
    ScannerStarted,

    /// Capture session stopped.
    ScannerStopped,

    /// A decode was accepted and its payload is being submitted.
    ScanAccepted { url: String },

    /// A toast-style message for the user.
    Alert { level: AlertLevel, message: String },

    /// The post-submission cooldown elapsed; the session accepts scans again.
    Rearmed,
}

/// Broadcast bus for [`UiEvent`]s.
///
/// Built on a tokio broadcast channel so multiple consumers can observe the
/// same session concurrently.
pub struct EventBus {
    sender: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it; with no
    /// subscribers the event is dropped and 0 is returned.
    pub fn emit(&self, event: UiEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Convenience for emitting an [`UiEvent::Alert`].
    pub fn alert(&self, level: AlertLevel, message: impl Into<String>) -> usize {
        self.emit(UiEvent::Alert {
            level,
            message: message.into(),
        })
    }

    /// Subscribe to all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(UiEvent::ScanAccepted {
            url: "http://fazenda.example/nfce?p=1".to_string(),
        });

        match rx.recv().await.unwrap() {
            UiEvent::ScanAccepted { url } => {
                assert_eq!(url, "http://fazenda.example/nfce?p=1")
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_see_the_same_event() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let delivered = bus.alert(AlertLevel::Success, "saved");
        assert_eq!(delivered, 2);

        assert!(matches!(rx1.recv().await.unwrap(), UiEvent::Alert { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), UiEvent::Alert { .. }));
    }

    #[test]
    fn emit_without_subscribers_drops_event() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(UiEvent::Rearmed), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_value(UiEvent::Alert {
            level: AlertLevel::Error,
            message: "timeout".to_string(),
        })
        .unwrap();

        assert_eq!(json["kind"], "alert");
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "timeout");
    }
}
