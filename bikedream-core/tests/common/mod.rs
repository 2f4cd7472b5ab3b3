//! Shared fixtures for the API test suites.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::BodyExt;

use bikedream_core::http::{dispatch, respond, ApiRequest, AppState, RequestContext};
use bikedream_core::model::{
    Availability, Category, Motorcycle, RegionalAvailability, Role, TechSpecs,
};
use bikedream_core::BikeDreamConfig;

/// App state with a cheap password profile so tests stay fast.
pub async fn test_state() -> Arc<AppState> {
    let mut config = BikeDreamConfig::default();
    config.auth.argon2_memory_kib = 8;
    config.auth.argon2_iterations = 1;
    AppState::new(config).await.unwrap()
}

/// A plain catalog record for fixtures.
pub fn bike(id: &str, year: i32, price: f64) -> Motorcycle {
    Motorcycle {
        id: id.to_string(),
        manufacturer: "Yamaha".to_string(),
        model: format!("Model {id}"),
        year,
        category: Category::Naked,
        description: "Fixture motorcycle".to_string(),
        image_url: "https://img.example/fixture.jpg".to_string(),
        price_usd: price,
        availability: Availability::Available,
        specs: TechSpecs {
            displacement_cc: 890.0,
            horsepower: 117.0,
            torque_nm: 93.0,
            top_speed_kmh: 230.0,
            weight_kg: 193.0,
            fuel_capacity_l: 14.0,
            mileage_kmpl: 18.0,
            transmission_type: "Manual".to_string(),
            gear_count: 6,
            ground_clearance_mm: 140.0,
            seat_height_mm: 825.0,
            abs_available: true,
            braking_system: "Dual Disc".to_string(),
            suspension_type: "USD Fork".to_string(),
            tyre_type: "Tubeless".to_string(),
            wheel_size_in: 17.0,
            headlight_type: "LED".to_string(),
            fuel_type: "Petrol".to_string(),
        },
        specialisations: BTreeSet::new(),
        availability_by_region: BTreeMap::new(),
        user_interest_score: 50,
        average_rating: 0.0,
        total_ratings: 0,
        last_updated_at: None,
    }
}

/// Mark a record unavailable in one region.
pub fn exclude_in_region(m: &mut Motorcycle, region: &str) {
    m.availability_by_region.insert(
        region.to_string(),
        RegionalAvailability {
            status: Availability::NotAvailableInRegion,
            rationale: "not homologated".to_string(),
        },
    );
}

/// Insert fixtures and refresh the typeahead index.
pub async fn seed_bikes(state: &AppState, bikes: Vec<Motorcycle>) {
    for m in bikes {
        state.store.motorcycles.insert(m.id.clone(), m).await.unwrap();
    }
    state.catalog.rebuild_suggestions().await;
}

/// Register an account and return a context authenticated as it.
pub async fn register_as(state: &AppState, email: &str, role: Role) -> RequestContext {
    let outcome = state.auth.register(email, "password123", "Test Rider").await.unwrap();
    if role != Role::User {
        state.store.users.update(&outcome.user.id, |u| u.role = role).await.unwrap();
    }
    let user = state.store.users.get(&outcome.user.id).await.unwrap();
    RequestContext::new(Some(user), Some(outcome.session_id))
}

/// Request builder for dispatch-level tests.
pub struct Call {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    body: Bytes,
    ctx: RequestContext,
}

pub fn get(path: &str) -> Call {
    Call::new(Method::GET, path)
}

pub fn post(path: &str) -> Call {
    Call::new(Method::POST, path)
}

pub fn put(path: &str) -> Call {
    Call::new(Method::PUT, path)
}

pub fn delete(path: &str) -> Call {
    Call::new(Method::DELETE, path)
}

impl Call {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: HashMap::new(),
            body: Bytes::new(),
            ctx: RequestContext::anonymous(),
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self
    }

    pub fn as_user(mut self, ctx: &RequestContext) -> Self {
        self.ctx = ctx.clone();
        self
    }

    /// Dispatch and return the mapped status plus decoded JSON body.
    pub async fn send(self, state: &AppState) -> (StatusCode, serde_json::Value) {
        let correlation_id = self.ctx.correlation_id.clone();
        let request = ApiRequest {
            method: self.method,
            path: self.path,
            query: self.query,
            body: self.body,
            ctx: self.ctx,
        };
        let response = match dispatch(state, &request).await {
            Ok(response) => response,
            Err(e) => respond::error(&e, &correlation_id),
        };
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}
