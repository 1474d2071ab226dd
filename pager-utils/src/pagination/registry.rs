//! Routes incoming interaction events to the live session bound to a message.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{
    RwLock,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use twilight_model::id::{Id, marker::MessageMarker};

use super::{error::PaginationError, event::InteractionEvent};

type Subscribers = HashMap<Id<MessageMarker>, UnboundedSender<InteractionEvent>>;

/// In-memory table of live sessions keyed by message.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new event queue to `message_id`.
    ///
    /// Fails when a live session already owns the message. A queue whose
    /// receiver has gone away is replaced.
    pub async fn subscribe(
        &self,
        message_id: Id<MessageMarker>,
    ) -> Result<UnboundedReceiver<InteractionEvent>, PaginationError> {
        let mut subscribers = self.subscribers.write().await;

        if subscribers
            .get(&message_id)
            .is_some_and(|sender| !sender.is_closed())
        {
            return Err(PaginationError::AlreadySubscribed {
                message_id: message_id.get(),
            });
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        subscribers.insert(message_id, sender);

        Ok(receiver)
    }

    /// Remove the queue bound to `message_id`. Returns `false` if none was bound.
    pub async fn unsubscribe(&self, message_id: Id<MessageMarker>) -> bool {
        self.subscribers.write().await.remove(&message_id).is_some()
    }

    /// Queue `event` for the session owning its message.
    ///
    /// Hands the event back when no live session owns the message, so the
    /// caller can answer it.
    pub async fn deliver(&self, event: InteractionEvent) -> Result<(), InteractionEvent> {
        let subscribers = self.subscribers.read().await;
        match subscribers.get(&event.message.message_id) {
            Some(sender) => sender.send(event).map_err(|rejected| rejected.0),
            None => Err(event),
        }
    }

    pub async fn contains(&self, message_id: Id<MessageMarker>) -> bool {
        self.subscribers
            .read()
            .await
            .get(&message_id)
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Number of bound messages.
    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::event::{Input, MessageRef};

    fn event(message_id: u64) -> InteractionEvent {
        InteractionEvent {
            actor: Id::new(42),
            message: MessageRef::new(Id::new(1), Id::new(message_id)),
            input: Input::Button("next".to_owned()),
            reply: None,
        }
    }

    #[tokio::test]
    async fn delivers_to_the_subscribed_message_only() {
        let registry = SessionRegistry::new();
        let mut events = registry.subscribe(Id::new(10)).await.unwrap();

        assert!(registry.deliver(event(10)).await.is_ok());
        assert_eq!(events.recv().await, Some(event(10)));

        let returned = registry.deliver(event(11)).await.unwrap_err();
        assert_eq!(returned, event(11));
    }

    #[tokio::test]
    async fn second_subscription_for_live_message_fails() {
        let registry = SessionRegistry::new();
        let _events = registry.subscribe(Id::new(10)).await.unwrap();

        assert!(matches!(
            registry.subscribe(Id::new(10)).await,
            Err(PaginationError::AlreadySubscribed { message_id: 10 })
        ));
    }

    #[tokio::test]
    async fn stale_subscription_is_replaced() {
        let registry = SessionRegistry::new();
        drop(registry.subscribe(Id::new(10)).await.unwrap());

        assert!(!registry.contains(Id::new(10)).await);
        assert!(registry.deliver(event(10)).await.is_err());
        assert!(registry.subscribe(Id::new(10)).await.is_ok());
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_message() {
        let registry = SessionRegistry::new();
        let _events = registry.subscribe(Id::new(10)).await.unwrap();

        assert!(registry.unsubscribe(Id::new(10)).await);
        assert!(!registry.unsubscribe(Id::new(10)).await);
        assert!(registry.is_empty().await);
    }
}
