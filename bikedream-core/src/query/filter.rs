//! Filter specification over the catalog.
//!
//! All fields are optional and combined with AND. Malformed values
//! (unparseable numbers, unknown enum values) surface as `InvalidInput`
//! naming the offending field; a query never fails internally because of
//! filter content.

use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};
use crate::model::{region, Category, Motorcycle};

/// Query parameters as decoded by the HTTP layer.
pub type QueryParams = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct MotorcycleFilter {
    pub search: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<Category>,
    pub feature: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub displacement_min: Option<f64>,
    pub displacement_max: Option<f64>,
    pub horsepower_min: Option<f64>,
    pub horsepower_max: Option<f64>,
    pub mileage_min: Option<f64>,
    pub mileage_max: Option<f64>,
    pub ground_clearance_min: Option<f64>,
    pub ground_clearance_max: Option<f64>,
    pub seat_height_min: Option<f64>,
    pub seat_height_max: Option<f64>,
    pub transmission_type: Option<String>,
    pub braking_system: Option<String>,
    pub fuel_type: Option<String>,
    pub abs_available: Option<bool>,
    pub hide_unavailable: bool,
    /// Canonical uppercase region code.
    pub region: Option<String>,
}

fn parse_i32(params: &QueryParams, key: &str) -> ApiResult<Option<i32>> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ApiError::invalid(key, format!("`{raw}` is not an integer"))),
    }
}

fn parse_f64(params: &QueryParams, key: &str) -> ApiResult<Option<f64>> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::invalid(key, format!("`{raw}` is not a number")))?;
            if !value.is_finite() {
                return Err(ApiError::invalid(key, "must be a finite number"));
            }
            Ok(Some(value))
        }
    }
}

fn parse_bool(params: &QueryParams, key: &str) -> ApiResult<Option<bool>> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(ApiError::invalid(key, format!("`{raw}` is not a boolean"))),
        },
    }
}

fn non_blank(params: &QueryParams, key: &str) -> Option<String> {
    params.get(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl MotorcycleFilter {
    /// Build a filter from decoded query parameters.
    pub fn from_query(params: &QueryParams) -> ApiResult<Self> {
        let category = match non_blank(params, "category") {
            None => None,
            Some(raw) => Some(
                Category::parse(&raw)
                    .ok_or_else(|| ApiError::invalid("category", format!("unknown category `{raw}`")))?,
            ),
        };

        let region = match non_blank(params, "region") {
            None => None,
            Some(raw) => Some(
                region::normalize(&raw)
                    .ok_or_else(|| ApiError::invalid("region", format!("unknown region code `{raw}`")))?,
            ),
        };

        Ok(Self {
            search: non_blank(params, "search"),
            manufacturer: non_blank(params, "manufacturer"),
            category,
            feature: non_blank(params, "features"),
            year_min: parse_i32(params, "year_min")?,
            year_max: parse_i32(params, "year_max")?,
            price_min: parse_f64(params, "price_min")?,
            price_max: parse_f64(params, "price_max")?,
            displacement_min: parse_f64(params, "displacement_min")?,
            displacement_max: parse_f64(params, "displacement_max")?,
            horsepower_min: parse_f64(params, "horsepower_min")?,
            horsepower_max: parse_f64(params, "horsepower_max")?,
            mileage_min: parse_f64(params, "mileage_min")?,
            mileage_max: parse_f64(params, "mileage_max")?,
            ground_clearance_min: parse_f64(params, "ground_clearance_min")?,
            ground_clearance_max: parse_f64(params, "ground_clearance_max")?,
            seat_height_min: parse_f64(params, "seat_height_min")?,
            seat_height_max: parse_f64(params, "seat_height_max")?,
            transmission_type: non_blank(params, "transmission_type"),
            braking_system: non_blank(params, "braking_system"),
            fuel_type: non_blank(params, "fuel_type"),
            abs_available: parse_bool(params, "abs_available")?,
            hide_unavailable: parse_bool(params, "hide_unavailable")?.unwrap_or(false),
            region,
        })
    }

    /// Evaluate the filter against one record.
    pub fn matches(&self, m: &Motorcycle) -> bool {
        if let Some(q) = &self.search {
            let q = q.to_lowercase();
            let hit = m.manufacturer.to_lowercase().contains(&q)
                || m.model.to_lowercase().contains(&q)
                || m.description.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        if let Some(manufacturer) = &self.manufacturer {
            if !m.manufacturer.eq_ignore_ascii_case(manufacturer) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if m.category != category {
                return false;
            }
        }
        if let Some(feature) = &self.feature {
            if !m.specialisations.iter().any(|t| t.eq_ignore_ascii_case(feature)) {
                return false;
            }
        }

        if !in_range_i32(m.year, self.year_min, self.year_max) {
            return false;
        }
        if !in_range(m.price_usd, self.price_min, self.price_max) {
            return false;
        }
        if !in_range(m.specs.displacement_cc, self.displacement_min, self.displacement_max) {
            return false;
        }
        if !in_range(m.specs.horsepower, self.horsepower_min, self.horsepower_max) {
            return false;
        }
        if !in_range(m.specs.mileage_kmpl, self.mileage_min, self.mileage_max) {
            return false;
        }
        if !in_range(
            m.specs.ground_clearance_mm,
            self.ground_clearance_min,
            self.ground_clearance_max,
        ) {
            return false;
        }
        if !in_range(m.specs.seat_height_mm, self.seat_height_min, self.seat_height_max) {
            return false;
        }

        if let Some(t) = &self.transmission_type {
            if !m.specs.transmission_type.eq_ignore_ascii_case(t) {
                return false;
            }
        }
        if let Some(b) = &self.braking_system {
            if !m.specs.braking_system.eq_ignore_ascii_case(b) {
                return false;
            }
        }
        if let Some(f) = &self.fuel_type {
            if !m.specs.fuel_type.eq_ignore_ascii_case(f) {
                return false;
            }
        }
        if let Some(abs) = self.abs_available {
            if m.specs.abs_available != abs {
                return false;
            }
        }

        if self.hide_unavailable && m.hidden_for(self.region.as_deref()) {
            return false;
        }

        true
    }
}

fn in_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
}

fn in_range_i32(value: i32, min: Option<i32>, max: Option<i32>) -> bool {
    min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
}
