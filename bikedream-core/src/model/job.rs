//! Daily-update job records and analytics events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Counters accumulated over one update pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStats {
    pub manufacturers_processed: u64,
    pub records_updated: u64,
    pub price_changes: u64,
    pub spec_changes: u64,
    pub regional_updates: u64,
    pub errors: u64,
}

impl UpdateStats {
    pub fn absorb(&mut self, other: &UpdateStats) {
        self.manufacturers_processed += other.manufacturers_processed;
        self.records_updated += other.records_updated;
        self.price_changes += other.price_changes;
        self.spec_changes += other.spec_changes;
        self.regional_updates += other.regional_updates;
        self.errors += other.errors;
    }
}

/// One run of the daily update. At most one job is Running at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJob {
    pub id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub stats: UpdateStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Cooperative cancellation flag; the worker checks it between
    /// manufacturer batches.
    #[serde(default)]
    pub cancel_requested: bool,
}

impl UpdateJob {
    pub fn start() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            status: JobStatus::Running,
            stats: UpdateStats::default(),
            failure_reason: None,
            cancel_requested: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Search,
    PageView,
    Action,
    MotorcycleClick,
}

/// Best-effort analytics event. Writes are fire-and-forget and never fail
/// a foreground request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub kind: EventKind,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
