use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::route::MatchedRoute;

/// Buffered notifications per subscriber before lagging ones start losing events.
pub const EVENT_CAPACITY: usize = 64;

/// RouteChanged
///
/// Broadcast after a route's content has been rendered. Subscribers (SEO
/// tags, analytics, reading progress) react without the router knowing them.
#[derive(Debug, Clone)]
pub struct RouteChanged {
    pub navigation_id: Uuid,
    pub matched: MatchedRoute,
    pub at: DateTime<Utc>,
}

impl RouteChanged {
    pub fn new(matched: MatchedRoute) -> Self {
        Self {
            navigation_id: Uuid::new_v4(),
            matched,
            at: Utc::now(),
        }
    }
}

pub fn channel() -> broadcast::Sender<RouteChanged> {
    broadcast::channel(EVENT_CAPACITY).0
}

/// spawn_route_logger
///
/// Analytics sink: records every route change as a structured log line.
pub fn spawn_route_logger(
    mut events: broadcast::Receiver<RouteChanged>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(
                    target: "analytics",
                    navigation_id = %event.navigation_id,
                    path = %event.matched.path,
                    route = %event.matched.route.path,
                    layout = event.matched.layout().as_str(),
                    at = %event.at.to_rfc3339(),
                    "route changed"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "analytics", skipped, "route logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
