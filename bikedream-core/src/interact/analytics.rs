//! Fire-and-forget analytics.
//!
//! Handlers enqueue events onto an unbounded channel; a background drain
//! task writes them to the store. Handler latency never depends on the
//! analytics write, and a failed write never fails a request.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::model::{AnalyticsEvent, EventKind};
use crate::store::Store;

#[derive(Clone)]
pub struct AnalyticsSink {
    tx: mpsc::UnboundedSender<AnalyticsEvent>,
}

impl AnalyticsSink {
    /// Spawn the drain task and return the sink. Must be called within a
    /// tokio runtime.
    pub fn spawn(store: Arc<Store>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AnalyticsEvent>();
        let _ = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let id = event.id.clone();
                if let Err(e) = store.analytics.insert(id, event).await {
                    // Best-effort by contract; log and move on.
                    log::debug!("Dropped analytics event: {e}");
                }
            }
        });
        Self { tx }
    }

    /// Enqueue an event. Errors (a closed drain) are swallowed.
    pub fn record(&self, kind: EventKind, user_id: Option<String>, payload: serde_json::Value) {
        let event = AnalyticsEvent {
            id: Uuid::new_v4().to_string(),
            user_id,
            kind,
            payload,
            created_at: Utc::now(),
        };
        let _ = self.tx.send(event);
    }
}
