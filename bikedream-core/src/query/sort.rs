//! Deterministic sort composition.
//!
//! Every sort breaks remaining ties on the stable identifier (ascending)
//! so a given corpus always paginates identically.

use std::cmp::Ordering;

use crate::error::{ApiError, ApiResult};
use crate::model::Motorcycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Dual-level sort: year descending, price ascending, id ascending.
    /// The requested direction is ignored; the key defines its own.
    Default,
    Year,
    PriceUsd,
    Horsepower,
    UserInterestScore,
}

impl SortKey {
    pub fn parse(s: &str) -> ApiResult<SortKey> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(SortKey::Default),
            "year" => Ok(SortKey::Year),
            "price_usd" | "price" => Ok(SortKey::PriceUsd),
            "horsepower" => Ok(SortKey::Horsepower),
            "user_interest_score" => Ok(SortKey::UserInterestScore),
            other => Err(ApiError::invalid("sort_by", format!("unknown sort key `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> ApiResult<SortOrder> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ApiError::invalid("sort_order", format!("unknown sort order `{other}`"))),
        }
    }
}

/// Sort records in place by the given key and direction.
pub fn sort_motorcycles(items: &mut [Motorcycle], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| compare(a, b, key, order));
}

fn compare(a: &Motorcycle, b: &Motorcycle, key: SortKey, order: SortOrder) -> Ordering {
    let primary = match key {
        SortKey::Default => {
            return b
                .year
                .cmp(&a.year)
                .then_with(|| a.price_usd.total_cmp(&b.price_usd))
                .then_with(|| a.id.cmp(&b.id));
        }
        SortKey::Year => a.year.cmp(&b.year),
        SortKey::PriceUsd => a.price_usd.total_cmp(&b.price_usd),
        SortKey::Horsepower => a.specs.horsepower.total_cmp(&b.specs.horsepower),
        SortKey::UserInterestScore => a.user_interest_score.cmp(&b.user_interest_score),
    };
    let directed = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    directed.then_with(|| a.id.cmp(&b.id))
}
