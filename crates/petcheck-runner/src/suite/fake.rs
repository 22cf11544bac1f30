//! In-memory pet store used by the suite tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use petcheck_core::{ApiRequest, ApiResponse};
use serde_json::{Value, json};

use crate::transport::{Transport, TransportError};

#[derive(Default)]
struct State {
    pets: BTreeMap<i64, Value>,
    orders: BTreeMap<i64, Value>,
    users: BTreeMap<String, Value>,
}

#[derive(Default)]
pub struct FakePetStore {
    state: Mutex<State>,
    numeric_category_name: bool,
    extra_pet_field: bool,
    unreachable: bool,
    reject_updates: bool,
    default_headers: BTreeMap<String, String>,
}

fn api(code: u16, kind: &str, message: impl Into<String>) -> Value {
    json!({"code": code, "type": kind, "message": message.into()})
}

fn ok(message: impl Into<String>) -> (u16, Value) {
    (200, api(200, "unknown", message))
}

fn not_found(message: &str) -> (u16, Value) {
    (404, api(1, "error", message))
}

fn bad_input() -> (u16, Value) {
    (500, api(500, "unknown", "something bad happened"))
}

fn numeric(body: Option<&Value>, fields: &[&str]) -> Option<Value> {
    let body = body?;
    fields
        .iter()
        .all(|f| body.get(*f).is_some_and(Value::is_number))
        .then(|| body.clone())
}

impl FakePetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `category.name` as a number.
    pub fn with_numeric_category_name(mut self) -> Self {
        self.numeric_category_name = true;
        self
    }

    /// Serve pets with an undeclared `nickname` field.
    pub fn with_extra_pet_field(mut self) -> Self {
        self.extra_pet_field = true;
        self
    }

    /// Header added to every request, like a configured `api_key`.
    pub fn with_default_header(mut self, key: &str, value: &str) -> Self {
        self.default_headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Answer every PUT with a 500.
    pub fn rejecting_updates(mut self) -> Self {
        self.reject_updates = true;
        self
    }

    /// Fail every request at the transport level.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn render_pet(&self, pet: &Value) -> Value {
        let mut pet = pet.clone();
        if self.numeric_category_name {
            pet["category"]["name"] = json!(7);
        }
        if self.extra_pet_field {
            pet["nickname"] = json!("buddy");
        }
        pet
    }

    fn route(&self, state: &mut State, request: &ApiRequest) -> (u16, Value) {
        let segments: Vec<&str> = request.endpoint.trim_start_matches('/').split('/').collect();
        let body = request.body.as_ref();
        let query = |key: &str| {
            request
                .query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };

        if self.reject_updates && request.method == "PUT" {
            return bad_input();
        }

        match (request.method.as_str(), segments.as_slice()) {
            ("POST" | "PUT", ["pet"]) => match numeric(body, &["id"]) {
                Some(pet) => {
                    let id = pet["id"].as_i64().unwrap();
                    state.pets.insert(id, pet.clone());
                    (200, self.render_pet(&pet))
                }
                None => bad_input(),
            },
            ("GET", ["pet", "findByStatus"]) => {
                let status = query("status");
                let pets = state
                    .pets
                    .values()
                    .filter(|p| p["status"] == status.as_str())
                    .map(|p| self.render_pet(p))
                    .collect();
                (200, Value::Array(pets))
            }
            ("GET", ["pet", id]) => match id.parse().ok().and_then(|id: i64| state.pets.get(&id)) {
                Some(pet) => (200, self.render_pet(pet)),
                None => not_found("Pet not found"),
            },
            ("DELETE", ["pet", id]) => {
                match id.parse().ok().and_then(|id: i64| state.pets.remove(&id)) {
                    Some(_) => ok(*id),
                    None => (404, Value::Null),
                }
            }
            ("GET", ["store", "inventory"]) => {
                let mut counts = BTreeMap::from([("available".to_string(), 0)]);
                for pet in state.pets.values() {
                    let status = pet["status"].as_str().unwrap_or("unknown").to_string();
                    *counts.entry(status).or_insert(0) += 1;
                }
                (200, json!(counts))
            }
            ("POST", ["store", "order"]) => match numeric(body, &["id", "petId", "quantity"]) {
                Some(order) => {
                    state.orders.insert(order["id"].as_i64().unwrap(), order.clone());
                    (200, order)
                }
                None => bad_input(),
            },
            ("GET", ["store", "order", id]) => {
                match id.parse().ok().and_then(|id: i64| state.orders.get(&id)) {
                    Some(order) => (200, order.clone()),
                    None => not_found("Order not found"),
                }
            }
            ("DELETE", ["store", "order", id]) => {
                match id.parse().ok().and_then(|id: i64| state.orders.remove(&id)) {
                    Some(_) => ok(*id),
                    None => not_found("Order Not Found"),
                }
            }
            ("POST", ["user"]) => match numeric(body, &["id", "userStatus"]) {
                Some(user) => {
                    let name = user["username"].as_str().unwrap_or_default().to_string();
                    let id = user["id"].to_string();
                    state.users.insert(name, user);
                    ok(id)
                }
                None => bad_input(),
            },
            ("GET", ["user", "login"]) => ok(format!(
                "logged in user session:{}",
                query("username").len() * 1000
            )),
            ("GET", ["user", "logout"]) => ok("ok"),
            ("GET", ["user", name]) => match state.users.get(*name) {
                Some(user) => (200, user.clone()),
                None => not_found("User not found"),
            },
            ("PUT", ["user", name]) => match numeric(body, &["id", "userStatus"]) {
                Some(user) => {
                    let id = user["id"].to_string();
                    state.users.insert((*name).to_string(), user);
                    ok(id)
                }
                None => bad_input(),
            },
            ("DELETE", ["user", name]) => match state.users.remove(*name) {
                Some(_) => ok(*name),
                None => (404, Value::Null),
            },
            _ => (404, api(404, "unknown", "unknown route")),
        }
    }
}

impl Transport for FakePetStore {
    fn base_url(&self) -> &str {
        "http://fake.petstore/v2"
    }

    fn prepare(&self, request: &ApiRequest) -> ApiRequest {
        request.clone().with_default_headers(&self.default_headers)
    }

    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        if self.unreachable {
            return Err(TransportError::Http(format!(
                "{}: connection refused",
                request.label()
            )));
        }
        let mut state = self.state.lock().unwrap();
        let (status, body) = self.route(&mut state, request);

        let mut response = ApiResponse::json(status, body)
            .with_header("access-control-allow-origin", "*")
            .with_header("access-control-allow-methods", "GET, POST, DELETE, PUT")
            .with_header("access-control-allow-headers", "Content-Type, api_key, Authorization")
            .with_header("date", "Sat, 17 Oct 2026 12:00:00 GMT");
        if request.endpoint == "/user/login" {
            response = response
                .with_header("x-rate-limit", "5000")
                .with_header("x-expires-after", "Sat Oct 17 13:00:00 UTC 2026");
        }
        Ok(response)
    }
}
