use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::accounts;
use crate::state::AppState;

// GET /api/events (SSE stream of the caller's notifications)
#[derive(Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
    pub last_id: Option<i64>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource can't set headers, so the session token comes in the query
    let token = query.token.as_deref().unwrap_or("");

    // Subscribe before the catch-up read, under the lock notify() holds
    let (user, catchup, rx) = {
        let db = state.lock_db()?;
        let user = accounts::current_user(&db, token)?;
        let rx = state.notifications_tx.subscribe();
        let catchup = queries::get_notifications_since(&db, &user.id, query.last_id.unwrap_or(0))?;
        (user, catchup, rx)
    };

    // Live items already sent by the catch-up are skipped
    let seen_up_to = catchup
        .last()
        .map(|n| n.id)
        .unwrap_or_else(|| query.last_id.unwrap_or(0));

    let catchup_stream = tokio_stream::iter(catchup.into_iter().map(|n| {
        let data = serde_json::to_string(&n).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data).event("notification"))
    }));

    let user_id = user.id;
    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(n) if n.user_id == user_id && n.id > seen_up_to => {
            let data = serde_json::to_string(&n).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("notification")))
        }
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}
