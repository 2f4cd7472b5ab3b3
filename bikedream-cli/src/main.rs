//! BikeDream server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use bikedream_core::auth::AuthService;
use bikedream_core::http::{AppState, HttpServer};
use bikedream_core::{seed, BikeDreamConfig, Store};

#[derive(Parser)]
#[command(name = "bikedream", about = "Motorcycle catalog and rider community service")]
struct Args {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "bikedream.toml")]
    config: PathBuf,

    /// Override the listening port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Install the built-in catalog roster when the store is empty.
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = BikeDreamConfig::load_from(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.display().to_string();
    }
    config.validate()?;

    let data_dir = PathBuf::from(&config.storage.data_dir);
    let store = Store::new();
    store
        .load_snapshot(&data_dir)
        .await
        .with_context(|| format!("load snapshot from {}", data_dir.display()))?;

    if args.seed && store.motorcycles.is_empty() {
        seed::apply(&store).await;
    }

    let state = AppState::with_store(store.clone(), config.clone())
        .await
        .map_err(|e| anyhow::anyhow!("engine startup failed: {e}"))?;

    // Background tasks: session sweep, scheduled update passes, periodic
    // snapshots.
    let _sweeper = AuthService::spawn_session_sweeper(
        store.clone(),
        Duration::from_secs(config.auth.session_sweep_interval_secs),
    );
    let _schedule = if config.scheduler.enabled {
        Some(state.scheduler.spawn_schedule())
    } else {
        None
    };
    if config.storage.snapshot_interval_secs > 0 {
        spawn_snapshot_timer(
            store.clone(),
            data_dir.clone(),
            Duration::from_secs(config.storage.snapshot_interval_secs),
        );
    }

    println!("🏍️  BikeDream");
    println!("==============");
    println!("🌐 Listening on http://{}", config.server.listen_addr());
    println!("💾 Data dir: {}", data_dir.display());
    println!("📦 Catalog: {} motorcycles", store.motorcycles.len());
    println!();

    let server = HttpServer::new(state);
    let outcome = tokio::select! {
        result = server.serve() => result,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutdown signal received");
            Ok(())
        }
    };

    // Final snapshot on the way out.
    if let Err(e) = store.save_snapshot(&data_dir).await {
        log::error!("Final snapshot failed: {e}");
    }
    outcome
}

fn spawn_snapshot_timer(store: Arc<Store>, dir: PathBuf, every: Duration) {
    let _ = tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup does not
        // rewrite what was just loaded.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = store.save_snapshot(&dir).await {
                log::error!("Periodic snapshot failed: {e}");
            }
        }
    });
}
