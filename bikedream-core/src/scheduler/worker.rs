//! The update pass itself: per-manufacturer refresh against the simulated
//! feeds.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{region, Availability, JobStatus, RegionalAvailability, UpdateStats};
use crate::store::Store;

/// Run one update pass for `job_id`. Manufacturers are processed in
/// parallel batches of `workers`; the cooperative cancel flag is checked
/// between batches. Returns the final status that was written.
pub async fn run_job(store: Arc<Store>, job_id: String, workers: usize) -> JobStatus {
    let manufacturers = {
        let mut names: Vec<String> =
            store.motorcycles.scan().await.into_iter().map(|m| m.manufacturer).collect();
        names.sort_unstable();
        names.dedup();
        names
    };
    log::info!("Update job {job_id}: {} manufacturers, {} workers", manufacturers.len(), workers);

    for batch in manufacturers.chunks(workers.max(1)) {
        // Cooperative cancellation between manufacturer batches.
        let canceled = store
            .jobs
            .get(&job_id)
            .await
            .map_or(false, |j| j.cancel_requested);
        if canceled {
            finalize(&store, &job_id, JobStatus::Failed, Some("canceled".to_string())).await;
            log::warn!("Update job {job_id} canceled");
            return JobStatus::Failed;
        }

        let mut handles = Vec::with_capacity(batch.len());
        for manufacturer in batch {
            let store = store.clone();
            let manufacturer = manufacturer.clone();
            handles.push(tokio::spawn(async move {
                refresh_manufacturer(&store, &manufacturer).await
            }));
        }

        for handle in handles {
            let stats = match handle.await {
                Ok(stats) => stats,
                Err(e) => {
                    log::error!("Update worker panicked: {e}");
                    UpdateStats { errors: 1, ..Default::default() }
                }
            };
            let _ = store.jobs.update(&job_id, |j| j.stats.absorb(&stats)).await;
        }
    }

    finalize(&store, &job_id, JobStatus::Completed, None).await;
    JobStatus::Completed
}

async fn finalize(store: &Store, job_id: &str, status: JobStatus, reason: Option<String>) {
    let _ = store
        .jobs
        .update(job_id, |j| {
            j.status = status;
            j.finished_at = Some(Utc::now());
            j.failure_reason = reason.clone();
        })
        .await;
}

/// Apply the simulated feed for one manufacturer. Each record receives
/// exactly one update (price, spec or regional) and a fresh
/// `last_updated_at`. Records are written one at a time; readers observe
/// each record pre- or post-update, never a torn state.
async fn refresh_manufacturer(store: &Store, manufacturer: &str) -> UpdateStats {
    let mut rng = StdRng::from_entropy();
    let mut stats = UpdateStats { manufacturers_processed: 1, ..Default::default() };

    let ids: Vec<String> = store
        .motorcycles
        .scan_filter(|m| m.manufacturer == manufacturer)
        .await
        .into_iter()
        .map(|m| m.id)
        .collect();

    for id in ids {
        let kind = rng.gen_range(0..10u8);
        let result = match kind {
            // Price drift, bounded to +/-15% of the current price.
            0..=4 => {
                let factor = 1.0 + rng.gen_range(-0.15..=0.15);
                store
                    .motorcycles
                    .update(&id, |m| {
                        m.price_usd = ((m.price_usd * factor).max(0.0) * 100.0).round() / 100.0;
                        m.last_updated_at = Some(Utc::now());
                    })
                    .await
                    .map(|()| {
                        stats.price_changes += 1;
                    })
            }
            // One numeric spec nudged within +/-5%.
            5..=7 => {
                let factor = 1.0 + rng.gen_range(-0.05..=0.05);
                let which = rng.gen_range(0..5u8);
                store
                    .motorcycles
                    .update(&id, |m| {
                        let spec = match which {
                            0 => &mut m.specs.horsepower,
                            1 => &mut m.specs.torque_nm,
                            2 => &mut m.specs.top_speed_kmh,
                            3 => &mut m.specs.weight_kg,
                            _ => &mut m.specs.mileage_kmpl,
                        };
                        *spec = (*spec * factor * 10.0).round() / 10.0;
                        m.last_updated_at = Some(Utc::now());
                    })
                    .await
                    .map(|()| {
                        stats.spec_changes += 1;
                    })
            }
            // Set or clear a regional availability override.
            _ => {
                let region = region::REGIONS[rng.gen_range(0..region::REGIONS.len())];
                let set = rng.gen_bool(0.5);
                let status = match rng.gen_range(0..3u8) {
                    0 => Availability::Available,
                    1 => Availability::Limited,
                    _ => Availability::NotAvailableInRegion,
                };
                store
                    .motorcycles
                    .update(&id, |m| {
                        if set {
                            m.availability_by_region.insert(
                                region.code.to_string(),
                                RegionalAvailability {
                                    status,
                                    rationale: "manufacturer supply update".to_string(),
                                },
                            );
                        } else {
                            m.availability_by_region.remove(region.code);
                        }
                        m.last_updated_at = Some(Utc::now());
                    })
                    .await
                    .map(|()| {
                        stats.regional_updates += 1;
                    })
            }
        };

        match result {
            Ok(()) => stats.records_updated += 1,
            Err(e) => {
                log::error!("Update of {id} failed: {e}");
                stats.errors += 1;
            }
        }
    }
    stats
}
