//! WebSocket Connection Hub
//!
//! Manages all WebSocket connections, subscriptions, and message broadcasting.
//! Uses tokio broadcast channels for in-process listeners.
//!
//! Lock order: `subscriptions` before `connections`, never the reverse.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use uuid::Uuid;

use super::messages::{
    ServerMessage, WsEvent, TOPIC_ADMIN_ACTIVITY, TOPIC_AGGREGATES, TOPIC_CAMPAIGNS,
    TOPIC_DONATIONS, TOPIC_HIGHLIGHT, TOPIC_SYSTEM,
};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Every topic a client may subscribe to, wildcards included
const TOPICS: [&str; 8] = [
    TOPIC_DONATIONS,
    TOPIC_HIGHLIGHT,
    TOPIC_AGGREGATES,
    "feed.*",
    TOPIC_ADMIN_ACTIVITY,
    "admin.*",
    TOPIC_CAMPAIGNS,
    TOPIC_SYSTEM,
];

/// Manages all WebSocket connections and subscriptions
pub struct ConnectionHub {
    inner: Arc<HubInner>,
    /// Broadcast channel for in-process listeners
    broadcast_tx: broadcast::Sender<WsEvent>,
    /// Queue drained by the single delivery task, started on first publish
    delivery_tx: OnceLock<mpsc::UnboundedSender<WsEvent>>,
    config: HubConfig,
}

/// Shared connection state, cloned into broadcast tasks
#[derive(Default)]
struct HubInner {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Topic subscriptions: Topic → Set of ConnectionIds
    subscriptions: RwLock<HashMap<String, HashSet<ConnectionId>>>,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Capacity of the broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            broadcast_capacity: 1024,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Topics this connection is subscribed to
    pub subscriptions: HashSet<String>,
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            inner: Arc::new(HubInner::default()),
            broadcast_tx,
            delivery_tx: OnceLock::new(),
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.inner.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(
            id.clone(),
            ConnectionHandle {
                sender,
                subscriptions: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %id, "WebSocket connected");
        Ok(id)
    }

    /// Unregister a connection and clean up its subscriptions
    pub async fn unregister(&self, id: &str) {
        let mut subs = self.inner.subscriptions.write().await;
        let handle = self.inner.connections.write().await.remove(id);

        if let Some(handle) = handle {
            for topic in handle.subscriptions {
                if let Some(subscribers) = subs.get_mut(&topic) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        subs.remove(&topic);
                    }
                }
            }
        }

        tracing::info!(connection_id = %id, "WebSocket disconnected");
    }

    /// Subscribe a connection to topics
    ///
    /// Unknown topics are skipped; the returned list holds the accepted ones.
    pub async fn subscribe(
        &self,
        id: &str,
        topics: Vec<String>,
    ) -> Result<Vec<String>, HubError> {
        let mut subs = self.inner.subscriptions.write().await;
        let mut connections = self.inner.connections.write().await;
        let handle = connections
            .get_mut(id)
            .ok_or(HubError::ConnectionNotFound)?;

        let mut subscribed = Vec::new();

        for topic in topics {
            if !is_valid_topic(&topic) {
                tracing::warn!(topic = %topic, "Invalid topic ignored");
                continue;
            }

            handle.subscriptions.insert(topic.clone());
            subs.entry(topic.clone())
                .or_default()
                .insert(id.to_string());

            subscribed.push(topic);
        }

        tracing::debug!(
            connection_id = %id,
            topics = ?subscribed,
            "Subscribed to topics"
        );

        Ok(subscribed)
    }

    /// Unsubscribe a connection from topics
    pub async fn unsubscribe(
        &self,
        id: &str,
        topics: Vec<String>,
    ) -> Result<Vec<String>, HubError> {
        let mut subs = self.inner.subscriptions.write().await;
        let mut connections = self.inner.connections.write().await;
        let handle = connections
            .get_mut(id)
            .ok_or(HubError::ConnectionNotFound)?;

        let mut unsubscribed = Vec::new();

        for topic in topics {
            if handle.subscriptions.remove(&topic) {
                if let Some(subscribers) = subs.get_mut(&topic) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        subs.remove(&topic);
                    }
                }
                unsubscribed.push(topic);
            }
        }

        tracing::debug!(
            connection_id = %id,
            topics = ?unsubscribed,
            "Unsubscribed from topics"
        );

        Ok(unsubscribed)
    }

    /// Deliver an event to all subscribers of its topic
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn broadcast(&self, event: &WsEvent) -> usize {
        self.inner.deliver(event).await
    }

    /// Publish an event without waiting for delivery
    ///
    /// Safe to call from synchronous code running inside the runtime. Events
    /// reach subscribers in the order they were published.
    pub fn publish(&self, event: WsEvent) {
        let _ = self.broadcast_tx.send(event.clone());

        if self.delivery_queue().send(event).is_err() {
            tracing::warn!("Delivery task stopped, event dropped");
        }
    }

    /// Publish a batch of events in order
    pub fn publish_all(&self, events: impl IntoIterator<Item = WsEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    fn delivery_queue(&self) -> &mpsc::UnboundedSender<WsEvent> {
        self.delivery_tx.get_or_init(|| {
            let (tx, mut rx) = mpsc::unbounded_channel::<WsEvent>();
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    inner.deliver(&event).await;
                }
            });
            tx
        })
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.inner.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Receiver for every published event, regardless of subscriptions
    pub fn subscribe_broadcast(&self) -> broadcast::Receiver<WsEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.inner.connections.read().await.len()
    }

    /// Get subscription count for a topic
    pub async fn subscription_count(&self, topic: &str) -> usize {
        self.inner
            .subscriptions
            .read()
            .await
            .get(topic)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

impl HubInner {
    async fn deliver(&self, event: &WsEvent) -> usize {
        let ids: HashSet<ConnectionId> = {
            let subs = self.subscriptions.read().await;
            let mut ids = HashSet::new();
            if let Some(direct) = subs.get(&event.topic) {
                ids.extend(direct.iter().cloned());
            }
            // "feed.*" matches "feed.donations"
            if let Some((prefix, _)) = event.topic.split_once('.') {
                if let Some(wildcard) = subs.get(&format!("{prefix}.*")) {
                    ids.extend(wildcard.iter().cloned());
                }
            }
            ids
        };

        let connections = self.connections.read().await;
        let mut sent = 0;
        for id in &ids {
            if let Some(handle) = connections.get(id) {
                if handle.sender.send(event.message.clone()).is_ok() {
                    sent += 1;
                }
            }
        }

        if sent > 0 {
            tracing::trace!(topic = %event.topic, subscribers = sent, "Broadcast event");
        }
        sent
    }
}

/// Topics a client may subscribe to
///
/// - `feed.*`, `feed.donations`, `feed.highlight`, `feed.aggregates`
/// - `admin.*`, `admin.activity`
/// - `campaigns`
/// - `system`
pub fn is_valid_topic(topic: &str) -> bool {
    TOPICS.contains(&topic)
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{PlatformStats, SampleId};
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.broadcast_capacity, 1024);
    }

    #[test]
    fn test_valid_topics() {
        assert!(is_valid_topic("feed.donations"));
        assert!(is_valid_topic("feed.*"));
        assert!(is_valid_topic("admin.activity"));
        assert!(is_valid_topic("campaigns"));
        assert!(is_valid_topic("system"));

        assert!(is_valid_topic("admin.*"));

        assert!(!is_valid_topic("feed."));
        assert!(!is_valid_topic("feed.bogus"));
        assert!(!is_valid_topic("admin.anything"));
        assert!(!is_valid_topic("invalid"));
        assert!(!is_valid_topic(""));
        assert!(!is_valid_topic("metrics.mood"));
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();

        let subscribed = hub
            .subscribe(
                &id,
                vec!["feed.donations".to_string(), "bogus".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(subscribed, vec!["feed.donations"]);
        assert_eq!(hub.subscription_count("feed.donations").await, 1);

        let unsubscribed = hub
            .unsubscribe(&id, vec!["feed.donations".to_string()])
            .await
            .unwrap();
        assert_eq!(unsubscribed, vec!["feed.donations"]);
        assert_eq!(hub.subscription_count("feed.donations").await, 0);

        hub.unregister(&id).await;
    }

    #[tokio::test]
    async fn test_unregister_cleans_subscriptions() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        hub.subscribe(&id, vec!["system".to_string()]).await.unwrap();
        hub.unregister(&id).await;

        assert_eq!(hub.subscription_count("system").await, 0);
        assert!(matches!(
            hub.subscribe(&id, vec!["system".to_string()]).await,
            Err(HubError::ConnectionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let config = HubConfig {
            max_connections: 2,
            broadcast_capacity: 16,
        };
        let hub = ConnectionHub::new(config);

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();

        let id1 = hub.register(tx1).await.unwrap();
        let id2 = hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        let err = result.unwrap_err();
        assert!(matches!(err, HubError::TooManyConnections(2)));
        assert_eq!(err.to_string(), "Too many connections (limit: 2)");

        hub.unregister(&id1).await;
        hub.unregister(&id2).await;
    }

    #[tokio::test]
    async fn test_broadcast_to_subscribers() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        let id1 = hub.register(tx1).await.unwrap();
        let id2 = hub.register(tx2).await.unwrap();

        // Only id1 follows aggregates
        hub.subscribe(&id1, vec!["feed.aggregates".to_string()])
            .await
            .unwrap();

        let sent = hub.broadcast(&WsEvent::aggregates(PlatformStats::default())).await;
        assert_eq!(sent, 1);

        assert!(matches!(
            rx1.try_recv(),
            Ok(ServerMessage::Aggregates { .. })
        ));
        assert!(rx2.try_recv().is_err());

        hub.unregister(&id1).await;
        hub.unregister(&id2).await;
    }

    #[tokio::test]
    async fn test_wildcard_subscription() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        // Both a direct and a wildcard match still deliver once
        hub.subscribe(
            &id,
            vec!["feed.*".to_string(), "feed.highlight".to_string()],
        )
        .await
        .unwrap();

        let sent = hub.broadcast(&WsEvent::highlight_cleared(SampleId(7))).await;
        assert_eq!(sent, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        // Wildcards do not cross prefixes
        let sent = hub.broadcast(&WsEvent::system("hello")).await;
        assert_eq!(sent, 0);

        hub.unregister(&id).await;
    }

    #[tokio::test]
    async fn test_publish_reaches_broadcast_listeners() {
        let hub = ConnectionHub::new(HubConfig::default());
        let mut listener = hub.subscribe_broadcast();

        hub.publish(WsEvent::system("started"));

        let event = listener.recv().await.unwrap();
        assert_eq!(event.topic, "system");
    }

    #[tokio::test]
    async fn test_published_events_arrive_in_order() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        hub.subscribe(&id, vec!["feed.*".to_string(), "system".to_string()])
            .await
            .unwrap();

        hub.publish_all((0..50).map(|i| {
            if i % 2 == 0 {
                WsEvent::highlight_cleared(SampleId(i))
            } else {
                WsEvent::system(&i.to_string())
            }
        }));

        for i in 0..50i64 {
            let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            match message {
                ServerMessage::HighlightCleared { id } => assert_eq!(id, SampleId(i)),
                ServerMessage::System { message } => assert_eq!(message, i.to_string()),
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_subscribe_and_broadcast() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let mut tasks = Vec::new();

        for _ in 0..8 {
            let hub = Arc::clone(&hub);
            tasks.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                let id = hub.register(tx).await.unwrap();
                for _ in 0..200 {
                    hub.subscribe(&id, vec!["feed.*".to_string()]).await.unwrap();
                    hub.unsubscribe(&id, vec!["feed.*".to_string()]).await.unwrap();
                }
                hub.unregister(&id).await;
            }));
        }
        for _ in 0..4 {
            let hub = Arc::clone(&hub);
            tasks.push(tokio::spawn(async move {
                for _ in 0..200 {
                    hub.broadcast(&WsEvent::aggregates(PlatformStats::default())).await;
                }
            }));
        }

        let all = futures_util::future::join_all(tasks);
        let results = tokio::time::timeout(Duration::from_secs(30), all)
            .await
            .expect("hub deadlocked");
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(hub.connection_count().await, 0);
    }
}
