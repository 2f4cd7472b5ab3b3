//! Cached vendor pricing snapshots.
//!
//! Quotes are derived from the USD base price via the region's currency
//! factor plus a stable per-(vendor, motorcycle) spread, so repeated calls
//! return the same snapshot. These are cached figures, not live vendor
//! prices.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::model::{region, Availability, Motorcycle};

/// Dealer names quoted per region.
const VENDORS: &[&str] = &["MotoHub", "RideDirect", "TwoWheel Traders"];

/// One cached vendor quote.
#[derive(Debug, Clone, Serialize)]
pub struct VendorQuote {
    pub vendor: String,
    pub region: String,
    pub currency: String,
    pub price: f64,
    pub in_stock: bool,
    pub quoted_at: DateTime<Utc>,
}

/// Vendor quotes for one motorcycle in one region.
pub fn regional_quotes(m: &Motorcycle, region_code: &str) -> ApiResult<Vec<VendorQuote>> {
    let region = region::lookup(region_code)
        .ok_or_else(|| ApiError::invalid("region", format!("unknown region code `{region_code}`")))?;

    let availability = m.availability_for(Some(region.code));
    let in_stock = matches!(availability, Availability::Available | Availability::Limited);
    let quoted_at = Utc::now();

    Ok(VENDORS
        .iter()
        .map(|vendor| {
            let price = m.price_usd * region.price_factor * vendor_spread(vendor, &m.id);
            VendorQuote {
                vendor: vendor.to_string(),
                region: region.code.to_string(),
                currency: region.currency.to_string(),
                price: (price * 100.0).round() / 100.0,
                in_stock,
                quoted_at,
            }
        })
        .collect())
}

/// Stable multiplier in 0.97..=1.03 derived from (vendor, motorcycle).
fn vendor_spread(vendor: &str, motorcycle_id: &str) -> f64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    vendor.hash(&mut hasher);
    motorcycle_id.hash(&mut hasher);
    let bucket = (hasher.finish() % 61) as f64; // 0..=60
    0.97 + bucket * 0.001
}
