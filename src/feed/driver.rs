//! Async feed driver
//!
//! Runs a `Dashboard` on its own tokio task. The task is the only owner of the
//! dashboard; readers get snapshots through a `watch` channel and live events
//! through the WebSocket hub.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use super::clock::Clock;
use super::dashboard::{Dashboard, DashboardSnapshot, FeedEvent};
use super::error::{FeedError, FeedResult};
use crate::websocket::{ConnectionHub, WsEvent};

/// Handle to a running feed task
pub struct FeedHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Dashboard>,
    snapshots: watch::Receiver<DashboardSnapshot>,
}

impl FeedHandle {
    /// Latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every change
    pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    /// Unmount the dashboard and wait for the task to finish
    ///
    /// Returns the stopped dashboard; it has no pending timers.
    pub async fn shutdown(mut self) -> FeedResult<Dashboard> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        self.task
            .await
            .map_err(|e| FeedError::DriverStopped(e.to_string()))
    }
}

/// Mount `dashboard` and drive it from `clock` until shut down
pub fn spawn_feed(
    mut dashboard: Dashboard,
    clock: Arc<dyn Clock>,
    hub: Arc<ConnectionHub>,
) -> FeedResult<FeedHandle> {
    if !dashboard.is_mounted() {
        dashboard.mount(clock.now_ms())?;
    }

    let (snapshot_tx, snapshot_rx) = watch::channel(dashboard.snapshot());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(run_feed(dashboard, clock, hub, snapshot_tx, shutdown_rx));

    Ok(FeedHandle {
        shutdown_tx: Some(shutdown_tx),
        task,
        snapshots: snapshot_rx,
    })
}

async fn run_feed(
    mut dashboard: Dashboard,
    clock: Arc<dyn Clock>,
    hub: Arc<ConnectionHub>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> Dashboard {
    tracing::info!("Feed driver started");

    loop {
        let events = dashboard.advance(clock.now_ms());
        if !events.is_empty() {
            hub.publish_all(events.iter().map(feed_event_to_ws));
            snapshot_tx.send_replace(dashboard.snapshot());
        }

        let Some(deadline) = dashboard.next_deadline() else {
            // Nothing scheduled; wait for shutdown only
            let _ = (&mut shutdown_rx).await;
            break;
        };

        let wait_ms = (deadline - clock.now_ms()).max(0) as u64;
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(wait_ms)) => {}
            _ = &mut shutdown_rx => break,
        }
    }

    dashboard.unmount();
    snapshot_tx.send_replace(dashboard.snapshot());
    hub.publish(WsEvent::system("feed stopped"));

    tracing::info!(
        pending_timers = dashboard.pending_timers(),
        "Feed driver stopped"
    );
    dashboard
}

/// Map a feed event onto its WebSocket topic
pub fn feed_event_to_ws(event: &FeedEvent) -> WsEvent {
    match event {
        FeedEvent::Donation(update) => WsEvent::donation(update),
        FeedEvent::HighlightCleared { id } => WsEvent::highlight_cleared(*id),
        FeedEvent::Aggregates(stats) => WsEvent::aggregates(*stats),
    }
}
