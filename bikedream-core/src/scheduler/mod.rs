//! Background daily-update scheduler.
//!
//! The daily job reconciles the catalog against simulated manufacturer
//! feeds. It is single-flight: while a job is Running, new triggers are
//! rejected with a Conflict carrying the running job's id. The job takes
//! no catalog-wide lock, so foreground requests are never blocked.

mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::error::{ApiError, ApiResult};
use crate::model::{Availability, JobStatus, UpdateJob};
use crate::query::SuggestionIndex;
use crate::store::Store;

/// One per-region availability override, as reported by the
/// regional-customizations endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RegionalCustomization {
    pub motorcycle_id: String,
    pub manufacturer: String,
    pub model: String,
    pub region: String,
    pub status: Availability,
    pub rationale: String,
}

pub struct UpdateScheduler {
    store: Arc<Store>,
    suggestions: Arc<SuggestionIndex>,
    config: SchedulerConfig,
    /// Single-flight gate. The job record is the durable truth; this flag
    /// closes the window between the running-job scan and the insert.
    running: AtomicBool,
}

impl UpdateScheduler {
    pub fn new(
        store: Arc<Store>,
        suggestions: Arc<SuggestionIndex>,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self { store, suggestions, config, running: AtomicBool::new(false) })
    }

    /// Start an update pass. Returns the new job record immediately; the
    /// pass itself runs in the background. A second trigger while a job
    /// is Running fails with Conflict carrying the running job's id.
    pub async fn trigger(self: &Arc<Self>) -> ApiResult<UpdateJob> {
        if self.running.swap(true, Ordering::AcqRel) {
            let running_id = self
                .store
                .jobs
                .scan_filter(|j| j.status == JobStatus::Running)
                .await
                .into_iter()
                .map(|j| j.id)
                .next()
                .unwrap_or_default();
            return Err(ApiError::conflict("update job", running_id));
        }

        let job = UpdateJob::start();
        if let Err(e) = self.store.jobs.insert(job.id.clone(), job.clone()).await {
            self.running.store(false, Ordering::Release);
            return Err(e.into());
        }

        let scheduler = Arc::clone(self);
        let job_id = job.id.clone();
        let _ = tokio::spawn(async move {
            let status =
                worker::run_job(scheduler.store.clone(), job_id.clone(), scheduler.config.workers)
                    .await;
            if status == JobStatus::Completed {
                // The pass mutated the catalog; refresh the typeahead index.
                let all = scheduler.store.motorcycles.scan().await;
                scheduler.suggestions.rebuild(&all);
            }
            scheduler.running.store(false, Ordering::Release);
            log::info!("Update job {job_id} finished: {status:?}");
        });

        Ok(job)
    }

    /// Request cooperative cancellation of a running job.
    pub async fn cancel(&self, job_id: &str) -> ApiResult<UpdateJob> {
        let job = self
            .store
            .jobs
            .update(job_id, |j| {
                if j.status == JobStatus::Running {
                    j.cancel_requested = true;
                }
                j.clone()
            })
            .await
            .map_err(|_| ApiError::not_found("update job"))?;

        if job.status != JobStatus::Running {
            return Err(ApiError::conflict("update job", job_id.to_string()));
        }
        Ok(job)
    }

    pub async fn job(&self, job_id: &str) -> ApiResult<UpdateJob> {
        self.store.jobs.get(job_id).await.ok_or_else(|| ApiError::not_found("update job"))
    }

    /// Most recent jobs first.
    pub async fn history(&self, limit: usize) -> Vec<UpdateJob> {
        let mut jobs = self.store.jobs.scan().await;
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then_with(|| a.id.cmp(&b.id)));
        jobs.truncate(limit);
        jobs
    }

    /// Every regional availability override, optionally filtered to one
    /// region.
    pub async fn regional_customizations(
        &self,
        region: Option<&str>,
    ) -> Vec<RegionalCustomization> {
        let mut out = Vec::new();
        for m in self.store.motorcycles.scan().await {
            for (code, entry) in &m.availability_by_region {
                if region.map_or(true, |r| r.eq_ignore_ascii_case(code)) {
                    out.push(RegionalCustomization {
                        motorcycle_id: m.id.clone(),
                        manufacturer: m.manufacturer.clone(),
                        model: m.model.clone(),
                        region: code.clone(),
                        status: entry.status,
                        rationale: entry.rationale.clone(),
                    });
                }
            }
        }
        out.sort_by(|a, b| {
            a.motorcycle_id.cmp(&b.motorcycle_id).then_with(|| a.region.cmp(&b.region))
        });
        out
    }

    /// Spawn the time-based schedule. The first pass fires one full
    /// interval after startup.
    pub fn spawn_schedule(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let every = Duration::from_secs(scheduler.config.interval_secs);
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match scheduler.trigger().await {
                    Ok(job) => log::info!("Scheduled update pass started: {}", job.id),
                    Err(ApiError::Conflict { id, .. }) => {
                        log::warn!("Skipped scheduled update pass; job {id} still running");
                    }
                    Err(e) => log::error!("Scheduled update pass failed to start: {e}"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::motorcycle::tests::sample;

    async fn scheduler_with_catalog(n: usize) -> Arc<UpdateScheduler> {
        let store = Store::new();
        for i in 0..n {
            let mut m = sample(&format!("m-{i}"));
            m.manufacturer = format!("Maker-{}", i % 3);
            store.motorcycles.insert(m.id.clone(), m).await.unwrap();
        }
        UpdateScheduler::new(store, Arc::new(SuggestionIndex::new()), SchedulerConfig::default())
    }

    async fn wait_until_finished(scheduler: &UpdateScheduler, job_id: &str) -> UpdateJob {
        for _ in 0..200 {
            let job = scheduler.job(job_id).await.unwrap();
            if job.status != JobStatus::Running {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} did not finish in time");
    }

    #[tokio::test]
    async fn test_single_flight() {
        let scheduler = scheduler_with_catalog(30).await;

        let first = scheduler.trigger().await.unwrap();
        assert_eq!(first.status, JobStatus::Running);

        // An immediate second trigger conflicts, carrying the first id.
        match scheduler.trigger().await {
            Err(ApiError::Conflict { id, .. }) => assert_eq!(id, first.id),
            other => panic!("expected conflict, got {other:?}"),
        }

        let finished = wait_until_finished(&scheduler, &first.id).await;
        assert_eq!(finished.status, JobStatus::Completed);

        // Once finished, a fresh trigger yields a new job.
        let second = scheduler.trigger().await.unwrap();
        assert_ne!(second.id, first.id);
        wait_until_finished(&scheduler, &second.id).await;
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let scheduler = scheduler_with_catalog(3).await;
        let first = scheduler.trigger().await.unwrap();
        wait_until_finished(&scheduler, &first.id).await;
        let second = scheduler.trigger().await.unwrap();
        wait_until_finished(&scheduler, &second.id).await;

        let history = scheduler.history(10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(scheduler.history(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_of_finished_job_conflicts() {
        let scheduler = scheduler_with_catalog(2).await;
        let job = scheduler.trigger().await.unwrap();
        wait_until_finished(&scheduler, &job.id).await;

        assert!(matches!(
            scheduler.cancel(&job.id).await.unwrap_err(),
            ApiError::Conflict { .. }
        ));
        assert!(matches!(
            scheduler.cancel("ghost").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_regional_customizations_filter() {
        let scheduler = scheduler_with_catalog(0).await;
        let mut m = sample("m-1");
        m.availability_by_region.insert(
            "IN".to_string(),
            crate::model::RegionalAvailability {
                status: Availability::NotAvailableInRegion,
                rationale: "norms".to_string(),
            },
        );
        m.availability_by_region.insert(
            "US".to_string(),
            crate::model::RegionalAvailability {
                status: Availability::Limited,
                rationale: "allocation".to_string(),
            },
        );
        scheduler.store.motorcycles.insert(m.id.clone(), m).await.unwrap();

        assert_eq!(scheduler.regional_customizations(None).await.len(), 2);
        let only_in = scheduler.regional_customizations(Some("IN")).await;
        assert_eq!(only_in.len(), 1);
        assert_eq!(only_in[0].region, "IN");
    }
}
