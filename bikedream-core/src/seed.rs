//! Built-in catalog roster for first-run seeding.
//!
//! The roster is deterministic: ids are stable slugs, so re-seeding an
//! already seeded store inserts nothing.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    Availability, Category, Motorcycle, RegionalAvailability, TechSpecs,
};
use crate::store::Store;

struct SeedSpec {
    manufacturer: &'static str,
    model: &'static str,
    year: i32,
    category: Category,
    price_usd: f64,
    displacement_cc: f64,
    horsepower: f64,
    seat_height_mm: f64,
    mileage_kmpl: f64,
    interest: u8,
    tags: &'static [&'static str],
    /// (region, unavailable?) overrides.
    regions: &'static [(&'static str, bool)],
}

const ROSTER: &[SeedSpec] = &[
    SeedSpec { manufacturer: "Yamaha", model: "MT-09", year: 2024, category: Category::Naked, price_usd: 9999.0, displacement_cc: 890.0, horsepower: 117.0, seat_height_mm: 825.0, mileage_kmpl: 18.0, interest: 88, tags: &["ABS", "Quickshifter", "Ride-by-wire"], regions: &[] },
    SeedSpec { manufacturer: "Yamaha", model: "R1", year: 2023, category: Category::Sport, price_usd: 17999.0, displacement_cc: 998.0, horsepower: 200.0, seat_height_mm: 855.0, mileage_kmpl: 14.0, interest: 92, tags: &["ABS", "Traction Control", "Quickshifter"], regions: &[("IN", true)] },
    SeedSpec { manufacturer: "Yamaha", model: "Tenere 700", year: 2024, category: Category::Adventure, price_usd: 10799.0, displacement_cc: 689.0, horsepower: 72.0, seat_height_mm: 875.0, mileage_kmpl: 21.0, interest: 85, tags: &["ABS", "Rally Mode"], regions: &[] },
    SeedSpec { manufacturer: "Honda", model: "CB500X", year: 2024, category: Category::Adventure, price_usd: 7299.0, displacement_cc: 471.0, horsepower: 47.0, seat_height_mm: 830.0, mileage_kmpl: 27.0, interest: 74, tags: &["ABS"], regions: &[] },
    SeedSpec { manufacturer: "Honda", model: "Gold Wing", year: 2023, category: Category::Touring, price_usd: 25300.0, displacement_cc: 1833.0, horsepower: 125.0, seat_height_mm: 745.0, mileage_kmpl: 17.0, interest: 70, tags: &["ABS", "DCT", "Cruise Control"], regions: &[("IN", true), ("BR", true)] },
    SeedSpec { manufacturer: "Honda", model: "CBR650R", year: 2024, category: Category::Sport, price_usd: 9899.0, displacement_cc: 649.0, horsepower: 94.0, seat_height_mm: 810.0, mileage_kmpl: 20.0, interest: 80, tags: &["ABS", "Slipper Clutch"], regions: &[] },
    SeedSpec { manufacturer: "Kawasaki", model: "Ninja ZX-6R", year: 2024, category: Category::Sport, price_usd: 11299.0, displacement_cc: 636.0, horsepower: 127.0, seat_height_mm: 830.0, mileage_kmpl: 17.0, interest: 86, tags: &["ABS", "Traction Control", "Quickshifter"], regions: &[] },
    SeedSpec { manufacturer: "Kawasaki", model: "Versys 650", year: 2023, category: Category::Touring, price_usd: 8899.0, displacement_cc: 649.0, horsepower: 66.0, seat_height_mm: 845.0, mileage_kmpl: 22.0, interest: 68, tags: &["ABS"], regions: &[] },
    SeedSpec { manufacturer: "Kawasaki", model: "KLX300R", year: 2024, category: Category::Enduro, price_usd: 5599.0, displacement_cc: 292.0, horsepower: 33.0, seat_height_mm: 925.0, mileage_kmpl: 28.0, interest: 55, tags: &[], regions: &[("GB", true)] },
    SeedSpec { manufacturer: "Suzuki", model: "V-Strom 800DE", year: 2024, category: Category::Adventure, price_usd: 11349.0, displacement_cc: 776.0, horsepower: 83.0, seat_height_mm: 855.0, mileage_kmpl: 22.0, interest: 77, tags: &["ABS", "Ride Modes"], regions: &[] },
    SeedSpec { manufacturer: "Suzuki", model: "Hayabusa", year: 2023, category: Category::Sport, price_usd: 18799.0, displacement_cc: 1340.0, horsepower: 188.0, seat_height_mm: 800.0, mileage_kmpl: 15.0, interest: 90, tags: &["ABS", "Launch Control", "Cruise Control"], regions: &[] },
    SeedSpec { manufacturer: "Ducati", model: "Monster", year: 2024, category: Category::Naked, price_usd: 12995.0, displacement_cc: 937.0, horsepower: 111.0, seat_height_mm: 820.0, mileage_kmpl: 17.0, interest: 84, tags: &["ABS", "Traction Control", "Ride-by-wire"], regions: &[] },
    SeedSpec { manufacturer: "Ducati", model: "Multistrada V4", year: 2024, category: Category::Adventure, price_usd: 26995.0, displacement_cc: 1158.0, horsepower: 170.0, seat_height_mm: 840.0, mileage_kmpl: 15.0, interest: 87, tags: &["ABS", "Radar Cruise", "Quickshifter"], regions: &[("BR", true)] },
    SeedSpec { manufacturer: "BMW", model: "R 1250 GS", year: 2023, category: Category::Adventure, price_usd: 17995.0, displacement_cc: 1254.0, horsepower: 136.0, seat_height_mm: 850.0, mileage_kmpl: 19.0, interest: 91, tags: &["ABS", "Dynamic ESA", "Cruise Control"], regions: &[] },
    SeedSpec { manufacturer: "BMW", model: "G 310 R", year: 2024, category: Category::Naked, price_usd: 4995.0, displacement_cc: 313.0, horsepower: 34.0, seat_height_mm: 785.0, mileage_kmpl: 30.0, interest: 60, tags: &["ABS"], regions: &[] },
    SeedSpec { manufacturer: "Royal Enfield", model: "Himalayan 450", year: 2024, category: Category::Adventure, price_usd: 5799.0, displacement_cc: 452.0, horsepower: 40.0, seat_height_mm: 825.0, mileage_kmpl: 30.0, interest: 82, tags: &["ABS", "Tripper Navigation"], regions: &[] },
    SeedSpec { manufacturer: "Royal Enfield", model: "Classic 350", year: 2023, category: Category::Vintage, price_usd: 4499.0, displacement_cc: 349.0, horsepower: 20.0, seat_height_mm: 805.0, mileage_kmpl: 35.0, interest: 78, tags: &[], regions: &[] },
    SeedSpec { manufacturer: "KTM", model: "390 Duke", year: 2024, category: Category::Naked, price_usd: 5899.0, displacement_cc: 399.0, horsepower: 45.0, seat_height_mm: 820.0, mileage_kmpl: 28.0, interest: 81, tags: &["ABS", "Quickshifter", "Ride-by-wire"], regions: &[] },
    SeedSpec { manufacturer: "KTM", model: "450 SX-F", year: 2024, category: Category::Motocross, price_usd: 11299.0, displacement_cc: 450.0, horsepower: 63.0, seat_height_mm: 958.0, mileage_kmpl: 12.0, interest: 58, tags: &[], regions: &[("JP", true)] },
    SeedSpec { manufacturer: "Harley-Davidson", model: "Fat Boy 114", year: 2023, category: Category::Cruiser, price_usd: 20999.0, displacement_cc: 1868.0, horsepower: 94.0, seat_height_mm: 675.0, mileage_kmpl: 18.0, interest: 72, tags: &["ABS", "Cruise Control"], regions: &[("IN", true)] },
    SeedSpec { manufacturer: "Vespa", model: "GTS 300", year: 2024, category: Category::Scooter, price_usd: 7949.0, displacement_cc: 278.0, horsepower: 24.0, seat_height_mm: 790.0, mileage_kmpl: 31.0, interest: 64, tags: &["ABS"], regions: &[] },
    SeedSpec { manufacturer: "Triumph", model: "Bonneville T120", year: 2023, category: Category::Standard, price_usd: 12895.0, displacement_cc: 1200.0, horsepower: 80.0, seat_height_mm: 790.0, mileage_kmpl: 21.0, interest: 75, tags: &["ABS", "Heated Grips"], regions: &[] },
];

fn slug(manufacturer: &str, model: &str, year: i32) -> String {
    let normalize = |s: &str| s.to_lowercase().replace([' ', '/'], "-");
    format!("{}-{}-{}", normalize(manufacturer), normalize(model), year)
}

fn build(spec: &SeedSpec) -> Motorcycle {
    let mut availability_by_region = BTreeMap::new();
    for (code, unavailable) in spec.regions {
        availability_by_region.insert(
            code.to_string(),
            RegionalAvailability {
                status: if *unavailable {
                    Availability::NotAvailableInRegion
                } else {
                    Availability::Available
                },
                rationale: if *unavailable {
                    "not homologated for this market".to_string()
                } else {
                    "available through local dealers".to_string()
                },
            },
        );
    }

    Motorcycle {
        id: slug(spec.manufacturer, spec.model, spec.year),
        manufacturer: spec.manufacturer.to_string(),
        model: spec.model.to_string(),
        year: spec.year,
        category: spec.category,
        description: format!(
            "{} {} {} - {} class machine from the factory catalog.",
            spec.year,
            spec.manufacturer,
            spec.model,
            spec.category.as_str()
        ),
        image_url: format!(
            "https://images.bikedream.example/{}.jpg",
            slug(spec.manufacturer, spec.model, spec.year)
        ),
        price_usd: spec.price_usd,
        availability: Availability::Available,
        specs: TechSpecs {
            displacement_cc: spec.displacement_cc,
            horsepower: spec.horsepower,
            torque_nm: (spec.horsepower * 0.85 * 10.0).round() / 10.0,
            top_speed_kmh: (spec.horsepower * 1.9 + 80.0).round(),
            weight_kg: (spec.displacement_cc * 0.12 + 120.0).round(),
            fuel_capacity_l: 14.0,
            mileage_kmpl: spec.mileage_kmpl,
            transmission_type: "Manual".to_string(),
            gear_count: 6,
            ground_clearance_mm: if spec.category == Category::Adventure { 220.0 } else { 140.0 },
            seat_height_mm: spec.seat_height_mm,
            abs_available: spec.tags.contains(&"ABS"),
            braking_system: if spec.tags.contains(&"ABS") {
                "Dual Disc ABS".to_string()
            } else {
                "Disc".to_string()
            },
            suspension_type: "Telescopic Fork".to_string(),
            tyre_type: "Tubeless".to_string(),
            wheel_size_in: 17.0,
            headlight_type: "LED".to_string(),
            fuel_type: "Petrol".to_string(),
        },
        specialisations: spec.tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        availability_by_region,
        user_interest_score: spec.interest,
        average_rating: 0.0,
        total_ratings: 0,
        last_updated_at: None,
    }
}

/// Insert every roster record not already present. Returns the number
/// inserted.
pub async fn apply(store: &Store) -> usize {
    let mut inserted = 0;
    for spec in ROSTER {
        let motorcycle = build(spec);
        if store.motorcycles.insert(motorcycle.id.clone(), motorcycle).await.is_ok() {
            inserted += 1;
        }
    }
    if inserted > 0 {
        log::info!("Seeded {inserted} motorcycles");
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = Store::new();
        let first = apply(&store).await;
        assert_eq!(first, ROSTER.len());
        assert_eq!(apply(&store).await, 0);
        assert_eq!(store.motorcycles.len(), ROSTER.len());
    }

    #[test]
    fn test_roster_records_validate() {
        for spec in ROSTER {
            let m = build(spec);
            m.validate().unwrap_or_else(|e| panic!("{} failed validation: {e}", m.id));
        }
    }

    #[test]
    fn test_roster_ids_unique() {
        let mut ids: Vec<String> = ROSTER.iter().map(|s| slug(s.manufacturer, s.model, s.year)).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }
}
