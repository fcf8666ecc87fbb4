//! In-process event fan-out over a tokio broadcast channel

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{DomainError, KeyEvent, KeyEventPublisher};

const DEFAULT_CAPACITY: usize = 256;

/// Publishes key events to every live subscriber
///
/// For callers that embed the key service and consume events in-process;
/// see `create_key_service_with_events`. Slow subscribers lag and lose the
/// oldest events; publishing never waits.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<KeyEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<KeyEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl KeyEventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: KeyEvent) -> Result<(), DomainError> {
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "Key event broadcast"),
            // No subscribers: nothing to deliver
            Err(_) => debug!("Key event dropped, no subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, Application, ApplicationId, Key, KeyEventKind, KeyMaterial};

    fn event() -> KeyEvent {
        let app = Application::new(ApplicationId::new(1), "myproj", "myapp");
        let key = Key::new(app.id(), "app-deploy", KeyMaterial::ssh("ssh-rsa AAAA", "private"));
        KeyEvent::key_added("myproj", &app, key, Actor::new("alice"))
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let publisher = BroadcastEventPublisher::default();
        assert_eq!(publisher.subscriber_count(), 0);
        assert!(publisher.publish(event()).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = BroadcastEventPublisher::new(4);
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();

        let sent = event();
        publisher.publish(sent.clone()).await.unwrap();

        let received = first.recv().await.unwrap();
        assert_eq!(received.id(), sent.id());
        assert_eq!(received.kind(), KeyEventKind::KeyAdded);
        assert_eq!(second.recv().await.unwrap().id(), sent.id());
    }
}
