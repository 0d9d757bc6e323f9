//! WebSocket Real-Time Streaming
//!
//! Pushes live dashboard updates to connected clients.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages all active connections and subscriptions
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Topics
//!
//! Clients connect to `/api/v1/ws` and can subscribe to:
//! - `feed.*` - every live feed update
//! - `feed.donations` - new donations with the updated chart point
//! - `feed.highlight` - highlight expiry for the newest donation
//! - `feed.aggregates` - per-hour, per-minute and to-date counters
//! - `admin.activity` - admin console actions
//! - `campaigns` - newly created campaigns
//! - `system` - system events
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8090/api/v1/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['feed.*']}));
//!   ws.send(JSON.stringify({type: 'snapshot'}));
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{is_valid_topic, ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{
    ClientMessage, ServerMessage, WsEvent, TOPIC_ADMIN_ACTIVITY, TOPIC_AGGREGATES,
    TOPIC_CAMPAIGNS, TOPIC_DONATIONS, TOPIC_HIGHLIGHT, TOPIC_SYSTEM,
};
