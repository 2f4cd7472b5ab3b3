//! Catalog records: motorcycles, their technical specs and availability.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::model::region;

/// Motorcycle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Sport,
    Cruiser,
    Touring,
    Adventure,
    Naked,
    Vintage,
    Scooter,
    Standard,
    Enduro,
    Motocross,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Sport,
        Category::Cruiser,
        Category::Touring,
        Category::Adventure,
        Category::Naked,
        Category::Vintage,
        Category::Scooter,
        Category::Standard,
        Category::Enduro,
        Category::Motocross,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sport => "Sport",
            Category::Cruiser => "Cruiser",
            Category::Touring => "Touring",
            Category::Adventure => "Adventure",
            Category::Naked => "Naked",
            Category::Vintage => "Vintage",
            Category::Scooter => "Scooter",
            Category::Standard => "Standard",
            Category::Enduro => "Enduro",
            Category::Motocross => "Motocross",
        }
    }

    /// Parse a category name, case-insensitively.
    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Availability status, globally or within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Limited,
    Discontinued,
    NotAvailableInRegion,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::Limited => "Limited",
            Availability::Discontinued => "Discontinued",
            Availability::NotAvailableInRegion => "NotAvailableInRegion",
        }
    }
}

/// Technical specification block. All numeric fields use the unit named in
/// the field suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSpecs {
    pub displacement_cc: f64,
    pub horsepower: f64,
    pub torque_nm: f64,
    pub top_speed_kmh: f64,
    pub weight_kg: f64,
    pub fuel_capacity_l: f64,
    pub mileage_kmpl: f64,
    pub transmission_type: String,
    pub gear_count: u8,
    pub ground_clearance_mm: f64,
    pub seat_height_mm: f64,
    pub abs_available: bool,
    pub braking_system: String,
    pub suspension_type: String,
    pub tyre_type: String,
    pub wheel_size_in: f64,
    pub headlight_type: String,
    pub fuel_type: String,
}

/// A per-region availability override with the reason it was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalAvailability {
    pub status: Availability,
    pub rationale: String,
}

/// A catalog record.
///
/// Records are created by seeding or the update scheduler and mutated only
/// by the scheduler or an admin; they are never physically deleted.
/// `average_rating` and `total_ratings` are derived from the rating set and
/// maintained by the interaction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motorcycle {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub year: i32,
    pub category: Category,
    pub description: String,
    pub image_url: String,
    pub price_usd: f64,
    pub availability: Availability,
    pub specs: TechSpecs,
    /// Capability tags. Older dumps used `features` for this field; the
    /// alias migrates them on deserialization.
    #[serde(alias = "features")]
    #[serde(default)]
    pub specialisations: BTreeSet<String>,
    #[serde(default)]
    pub availability_by_region: BTreeMap<String, RegionalAvailability>,
    pub user_interest_score: u8,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: u64,
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Motorcycle {
    /// The availability a viewer in `region` should see: the regional
    /// override when one exists, the global status otherwise.
    pub fn availability_for(&self, region: Option<&str>) -> Availability {
        region
            .and_then(|code| self.availability_by_region.get(code))
            .map(|r| r.status)
            .unwrap_or(self.availability)
    }

    /// True when the record should be hidden for `region` under
    /// `hide_unavailable`: globally discontinued, or regionally marked as
    /// not available.
    pub fn hidden_for(&self, region: Option<&str>) -> bool {
        if self.availability == Availability::Discontinued {
            return true;
        }
        matches!(
            region.and_then(|code| self.availability_by_region.get(code)),
            Some(r) if r.status == Availability::NotAvailableInRegion
        )
    }

    /// Validate the record's own invariants. Used on seed and admin writes.
    pub fn validate(&self) -> ApiResult<()> {
        let max_year = Utc::now().year() + 2;
        if self.year < 1900 || self.year > max_year {
            return Err(ApiError::validation(
                "year",
                format!("must be between 1900 and {}", max_year),
            ));
        }
        if self.price_usd < 0.0 {
            return Err(ApiError::validation("price_usd", "must be non-negative"));
        }
        if self.user_interest_score > 100 {
            return Err(ApiError::validation("user_interest_score", "must be at most 100"));
        }
        for code in self.availability_by_region.keys() {
            if region::lookup(code).is_none() {
                return Err(ApiError::validation(
                    "availability_by_region",
                    format!("unknown region code {code}"),
                ));
            }
        }
        Ok(())
    }
}
