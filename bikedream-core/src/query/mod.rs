//! Catalog query engine: predicate compilation, deterministic sorting,
//! pagination, typeahead suggestions, category summaries and pricing
//! snapshots.

pub mod filter;
pub mod page;
pub mod pricing;
pub mod sort;
pub mod suggest;
pub mod summary;

pub use filter::{MotorcycleFilter, QueryParams};
pub use page::{paginate, PageInfo, PageRequest, DEFAULT_LIMIT, MAX_LIMIT};
pub use pricing::{regional_quotes, VendorQuote};
pub use sort::{sort_motorcycles, SortKey, SortOrder};
pub use suggest::{Suggestion, SuggestionIndex, SuggestionKind};
pub use summary::{category_summary, CategorySummary};

use std::sync::Arc;

use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::model::{Category, Motorcycle};
use crate::store::Store;

/// Upper bound on side-by-side comparisons.
const MAX_COMPARE: usize = 4;
/// Featured records per category in the summary payload.
const SUMMARY_TOP_K: usize = 4;

/// Value ranges and distinct names offered to filter UIs.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub manufacturers: Vec<String>,
    pub categories: Vec<&'static str>,
    pub year_range: (i32, i32),
    pub price_range: (f64, f64),
}

/// The catalog read surface.
pub struct CatalogQuery {
    store: Arc<Store>,
    suggestions: Arc<SuggestionIndex>,
}

impl CatalogQuery {
    pub fn new(store: Arc<Store>, suggestions: Arc<SuggestionIndex>) -> Self {
        Self { store, suggestions }
    }

    /// Run the full filter → sort → paginate pipeline.
    ///
    /// When a region is selected, each returned record's availability is
    /// replaced by its regional override so clients see the availability
    /// that applies to them.
    pub async fn list(
        &self,
        filter: &MotorcycleFilter,
        sort_key: SortKey,
        order: SortOrder,
        page: &PageRequest,
    ) -> (Vec<Motorcycle>, PageInfo) {
        let mut items = self.store.motorcycles.scan_filter(|m| filter.matches(m)).await;
        sort_motorcycles(&mut items, sort_key, order);
        let (mut items, info) = paginate(items, page);

        if let Some(region) = filter.region.as_deref() {
            for m in &mut items {
                m.availability = m.availability_for(Some(region));
            }
        }
        (items, info)
    }

    /// Fetch one record, with the regional availability override applied.
    pub async fn get(&self, id: &str, region: Option<&str>) -> ApiResult<Motorcycle> {
        let mut m = self
            .store
            .motorcycles
            .get(id)
            .await
            .ok_or_else(|| ApiError::not_found("motorcycle"))?;
        if region.is_some() {
            m.availability = m.availability_for(region);
        }
        Ok(m)
    }

    /// Side-by-side comparison payload for up to [`MAX_COMPARE`] ids.
    pub async fn compare(&self, ids: &[String]) -> ApiResult<Vec<Motorcycle>> {
        if ids.is_empty() {
            return Err(ApiError::invalid("ids", "at least one id is required"));
        }
        if ids.len() > MAX_COMPARE {
            return Err(ApiError::invalid(
                "ids",
                format!("at most {MAX_COMPARE} motorcycles can be compared"),
            ));
        }
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.get(id, None).await?);
        }
        Ok(out)
    }

    pub async fn filter_options(&self) -> FilterOptions {
        let all = self.store.motorcycles.scan().await;

        let mut manufacturers: Vec<String> =
            all.iter().map(|m| m.manufacturer.clone()).collect();
        manufacturers.sort_unstable();
        manufacturers.dedup();

        let year_range = all
            .iter()
            .fold(None::<(i32, i32)>, |acc, m| match acc {
                None => Some((m.year, m.year)),
                Some((lo, hi)) => Some((lo.min(m.year), hi.max(m.year))),
            })
            .unwrap_or((0, 0));
        let price_range = all
            .iter()
            .fold(None::<(f64, f64)>, |acc, m| match acc {
                None => Some((m.price_usd, m.price_usd)),
                Some((lo, hi)) => Some((lo.min(m.price_usd), hi.max(m.price_usd))),
            })
            .unwrap_or((0.0, 0.0));

        FilterOptions {
            manufacturers,
            categories: Category::ALL.iter().map(|c| c.as_str()).collect(),
            year_range,
            price_range,
        }
    }

    /// Distinct specialisation tags across the corpus.
    pub async fn features(&self) -> Vec<String> {
        let all = self.store.motorcycles.scan().await;
        let mut tags: Vec<String> =
            all.iter().flat_map(|m| m.specialisations.iter().cloned()).collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    pub async fn summary(
        &self,
        region: Option<&str>,
        hide_unavailable: bool,
    ) -> Vec<CategorySummary> {
        let all = self.store.motorcycles.scan().await;
        category_summary(&all, region, hide_unavailable, SUMMARY_TOP_K)
    }

    pub fn suggest(&self, q: &str, limit: usize) -> Vec<Suggestion> {
        self.suggestions.suggest(q, limit)
    }

    pub async fn pricing(&self, id: &str, region: &str) -> ApiResult<Vec<VendorQuote>> {
        let m = self.get(id, None).await?;
        regional_quotes(&m, region)
    }

    /// Rebuild the suggestion index from the current catalog. Called
    /// after every catalog mutation.
    pub async fn rebuild_suggestions(&self) {
        let all = self.store.motorcycles.scan().await;
        self.suggestions.rebuild(&all);
    }
}
