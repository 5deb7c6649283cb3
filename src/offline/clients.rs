use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub url: Option<String>,
}

/// Messages the worker posts to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    SyncComplete,
    UpdatesAvailable { updates: serde_json::Value },
    ShowNotification { notification: Notification },
    OpenWindow { url: String },
}

struct ClientHandle {
    sender: mpsc::UnboundedSender<ClientMessage>,
    controlled: bool,
}

/// Connected clients. The worker only talks to them through message
/// channels.
#[derive(Default)]
pub struct Clients {
    inner: RwLock<HashMap<Uuid, ClientHandle>>,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<ClientMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.inner.write().await.insert(
            id,
            ClientHandle {
                sender,
                controlled: false,
            },
        );
        (id, receiver)
    }

    pub async fn unregister(&self, id: &Uuid) {
        self.inner.write().await.remove(id);
    }

    /// Takes control of every registered client. Returns how many were
    /// claimed.
    pub async fn claim(&self) -> usize {
        let mut inner = self.inner.write().await;
        for handle in inner.values_mut() {
            handle.controlled = true;
        }
        inner.len()
    }

    pub async fn is_controlled(&self, id: &Uuid) -> bool {
        self.inner
            .read()
            .await
            .get(id)
            .is_some_and(|handle| handle.controlled)
    }

    /// Sends `message` to every client, dropping those whose receiver is
    /// gone. Returns the number of deliveries.
    pub async fn post_all(&self, message: ClientMessage) -> usize {
        let mut inner = self.inner.write().await;
        inner.retain(|_, handle| handle.sender.send(message.clone()).is_ok());
        inner.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// A registered client's message feed. Dropping it unregisters the client.
pub struct Subscription {
    id: Uuid,
    clients: Arc<Clients>,
    receiver: mpsc::UnboundedReceiver<ClientMessage>,
}

impl Subscription {
    pub async fn open(clients: Arc<Clients>) -> Self {
        let (id, receiver) = clients.register().await;
        Self {
            id,
            clients,
            receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn recv(&mut self) -> Option<ClientMessage> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Outside a runtime the closed channel is pruned by the next post_all.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let clients = self.clients.clone();
            let id = self.id;
            handle.spawn(async move {
                clients.unregister(&id).await;
            });
        }
    }
}
