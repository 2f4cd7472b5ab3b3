//! JSON-lines snapshot persistence.
//!
//! Each collection is dumped to `<data_dir>/<collection>.jsonl`, one
//! document per line. Snapshots are written atomically (temp file +
//! rename) so a crash mid-write never corrupts the previous snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Collection, Store};

fn collection_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.jsonl"))
}

async fn save_collection<T>(dir: &Path, coll: &Collection<T>) -> Result<()>
where
    T: Clone + Send + Sync + Serialize + 'static,
{
    let entries = coll.scan_entries().await;
    let mut out = String::new();
    for (id, doc) in &entries {
        let line = serde_json::to_string(&(id, doc))
            .with_context(|| format!("serialize {}/{id}", coll.name()))?;
        out.push_str(&line);
        out.push('\n');
    }

    let path = collection_path(dir, coll.name());
    let tmp = path.with_extension("jsonl.tmp");
    tokio::fs::write(&tmp, out)
        .await
        .with_context(|| format!("write snapshot {}", tmp.display()))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .with_context(|| format!("commit snapshot {}", path.display()))?;
    Ok(())
}

async fn load_collection<T>(dir: &Path, coll: &Collection<T>) -> Result<usize>
where
    T: Clone + Send + Sync + DeserializeOwned + 'static,
{
    let path = collection_path(dir, coll.name());
    if !path.exists() {
        return Ok(0);
    }
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("read snapshot {}", path.display()))?;

    let mut loaded = 0usize;
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, doc): (String, T) = serde_json::from_str(line).with_context(|| {
            format!("parse {} line {}", path.display(), lineno + 1)
        })?;
        coll.put(id, doc).await;
        loaded += 1;
    }
    Ok(loaded)
}

impl Store {
    /// Dump every collection to `dir`.
    pub async fn save_snapshot(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create data dir {}", dir.display()))?;

        save_collection(dir, &self.motorcycles).await?;
        save_collection(dir, &self.users).await?;
        save_collection(dir, &self.sessions).await?;
        save_collection(dir, &self.favorites).await?;
        save_collection(dir, &self.ratings).await?;
        save_collection(dir, &self.comments).await?;
        save_collection(dir, &self.banners).await?;
        save_collection(dir, &self.garage).await?;
        save_collection(dir, &self.groups).await?;
        save_collection(dir, &self.achievements).await?;
        save_collection(dir, &self.user_achievements).await?;
        save_collection(dir, &self.counters).await?;
        save_collection(dir, &self.requests).await?;
        save_collection(dir, &self.jobs).await?;
        save_collection(dir, &self.analytics).await?;
        Ok(())
    }

    /// Load every collection found under `dir` and rebuild the derived
    /// indexes. Missing files are treated as empty collections, so a
    /// fresh data directory loads cleanly.
    pub async fn load_snapshot(&self, dir: &Path) -> Result<usize> {
        let mut total = 0usize;
        total += load_collection(dir, &self.motorcycles).await?;
        total += load_collection(dir, &self.users).await?;
        total += load_collection(dir, &self.sessions).await?;
        total += load_collection(dir, &self.favorites).await?;
        total += load_collection(dir, &self.ratings).await?;
        total += load_collection(dir, &self.comments).await?;
        total += load_collection(dir, &self.banners).await?;
        total += load_collection(dir, &self.garage).await?;
        total += load_collection(dir, &self.groups).await?;
        total += load_collection(dir, &self.achievements).await?;
        total += load_collection(dir, &self.user_achievements).await?;
        total += load_collection(dir, &self.counters).await?;
        total += load_collection(dir, &self.requests).await?;
        total += load_collection(dir, &self.jobs).await?;
        total += load_collection(dir, &self.analytics).await?;

        self.rebuild_email_index().await;
        log::info!("Loaded {} documents from {}", total, dir.display());
        Ok(total)
    }
}
