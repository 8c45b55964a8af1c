//! Server-Sent Events (SSE) utilities
//!
//! Streams one session's events to a browser with a periodic heartbeat.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::events::EventBus;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Create an SSE stream of events for a single session
///
/// Sends a `ConnectionStatus` event first, then every event on `bus` whose
/// session id matches. Ends when the bus is dropped.
pub fn create_session_sse_stream(
    bus: &EventBus,
    session_id: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to session {}", session_id);
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if event.session_id() != session_id {
                        continue;
                    }
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            debug!("SSE: Sending {} for session {}", event.event_type(), session_id);
                            yield Ok(Event::default().event(event.event_type()).data(json));
                        }
                        Err(e) => warn!("SSE: Failed to serialize event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE: Client for session {} lagged, skipped {} events", session_id, skipped);
                }
                Err(RecvError::Closed) => {
                    info!("SSE: Event bus closed, ending stream for session {}", session_id);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
