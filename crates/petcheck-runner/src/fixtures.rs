//! Random pet / order / user payloads
//!
//! Valid generators follow the pet-store models field for field (struct
//! order = wire order, so serialized text is stable) and carry exactly one
//! photo URL and one tag, matching the schema DB's `photoUrls.0` and
//! `tags.0.*` keys. Invalid generators break exactly one field's type.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const PET_NAMES: &[&str] = &["rex", "luna", "milo", "bella", "otis", "nala", "ziggy"];
const CATEGORIES: &[&str] = &["dogs", "cats", "birds", "fish", "reptiles"];
const TAGS: &[&str] = &["friendly", "trained", "young", "senior", "vaccinated"];
const FIRST_NAMES: &[&str] = &["ada", "grace", "linus", "ken", "barbara", "dennis"];
const LAST_NAMES: &[&str] = &["lovelace", "hopper", "torvalds", "thompson", "liskov"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl PetStatus {
    pub const ALL: [PetStatus; 3] = [Self::Available, Self::Pending, Self::Sold];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub category: Category,
    pub name: String,
    pub photo_urls: Vec<String>,
    pub tags: Vec<Tag>,
    pub status: PetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Approved,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub pet_id: i64,
    pub quantity: i32,
    pub ship_date: String,
    pub status: OrderStatus,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub user_status: i32,
}

/// Convert a fixture to its wire JSON.
pub fn to_json<T: Serialize>(fixture: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(fixture)
}

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Ids stay well inside the server's int64 range and away from small
/// ids other clients tend to reuse.
fn random_id(rng: &mut impl Rng) -> i64 {
    rng.gen_range(100_000..1_000_000_000)
}

fn random_alnum(rng: &mut impl Rng, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

#[must_use]
pub fn pet(rng: &mut impl Rng) -> Pet {
    Pet {
        id: random_id(rng),
        category: Category {
            id: rng.gen_range(1..100),
            name: pick(rng, CATEGORIES).to_string(),
        },
        name: format!("{}-{}", pick(rng, PET_NAMES), random_alnum(rng, 4)),
        photo_urls: vec![format!("https://example.com/photos/{}.jpg", random_alnum(rng, 8))],
        tags: vec![Tag {
            id: rng.gen_range(1..100),
            name: pick(rng, TAGS).to_string(),
        }],
        status: PetStatus::ALL[rng.gen_range(0..PetStatus::ALL.len())],
    }
}

#[must_use]
pub fn order(rng: &mut impl Rng, pet_id: i64) -> Order {
    Order {
        id: rng.gen_range(1..=10),
        pet_id,
        quantity: rng.gen_range(1..=5),
        ship_date: format!(
            "2024-{:02}-{:02}T12:00:00.000+0000",
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        ),
        status: OrderStatus::Placed,
        complete: rng.gen_bool(0.5),
    }
}

#[must_use]
pub fn user(rng: &mut impl Rng) -> User {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let username = format!("{first}_{}", random_alnum(rng, 6));
    User {
        id: random_id(rng),
        email: format!("{username}@example.com"),
        username,
        first_name: first.to_string(),
        last_name: last.to_string(),
        password: random_alnum(rng, 12),
        phone: format!("555{:07}", rng.gen_range(0..10_000_000)),
        user_status: rng.gen_range(0..=2),
    }
}

/// A pet whose `id` is a non-numeric string.
#[must_use]
pub fn invalid_pet(rng: &mut impl Rng) -> Value {
    let mut value = to_json(&pet(rng)).unwrap_or_else(|_| json!({}));
    value["id"] = json!(format!("not-a-number-{}", random_alnum(rng, 4)));
    value
}

/// An order whose `quantity` is a string.
#[must_use]
pub fn invalid_order(rng: &mut impl Rng, pet_id: i64) -> Value {
    let mut value = to_json(&order(rng, pet_id)).unwrap_or_else(|_| json!({}));
    value["quantity"] = json!("many");
    value
}

/// A user whose `userStatus` is a string.
#[must_use]
pub fn invalid_user(rng: &mut impl Rng) -> Value {
    let mut value = to_json(&user(rng)).unwrap_or_else(|_| json!({}));
    value["userStatus"] = json!("active");
    value
}
