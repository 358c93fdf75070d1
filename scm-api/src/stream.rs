use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/stream", get(change_stream))
}

/// Row-level changes as server-sent events named `<table>.<op>`.
/// A client that falls behind gets a `resync` event and should refresh.
async fn change_stream(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("SSE client subscribed");
    let rx = state.changes.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        let event = match result {
            Ok(change) => Event::default()
                .event(change.event_name())
                .json_data(&change)
                .ok()?,
            Err(e) => {
                warn!("SSE client lagged: {}", e);
                Event::default().event("resync").data("lagged")
            }
        };
        Some(Ok::<Event, Infallible>(event))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
