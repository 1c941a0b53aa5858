//! Package event stream endpoint (SSE).
//!
//! Bridges an engine [`engine::Subscription`] into a server-sent event
//! stream. Ownership filtering already happened on the publish side, so
//! everything received here is for the caller's eyes. Dropping the stream
//! (client disconnect) drops the subscription, which unsubscribes.

use std::convert::Infallible;

use api_types::event::PackageEvent;
use axum::{
    Extension,
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};

use engine::Account;

use crate::{packages::package_view, server::ServerState};

pub async fn subscribe(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.engine.subscribe_package_events(&account);

    let stream = async_stream::stream! {
        while let Some(event) = subscription.recv().await {
            let view = PackageEvent {
                package: package_view(event.package),
            };
            let event = match serde_json::to_string(&view) {
                Ok(json) => Event::default().data(json),
                Err(err) => {
                    tracing::error!("failed to serialize package event: {err}");
                    continue;
                }
            };
            yield Ok(event);
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
