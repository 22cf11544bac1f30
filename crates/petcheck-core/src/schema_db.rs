//! Schema DB: declared field types per service / endpoint / method
//!
//! The reference data maps flattened keys to type tags:
//!
//! ```json
//! {"petstore": {"/pet": {"POST": {
//!     "body": {"id": "number", "category.name": "string"},
//!     "headers": {"content-type": "string"}
//! }}}}
//! ```
//!
//! Validation compares a flattened payload against those declarations in
//! one of two modes: subset (declared keys only) or exact (undeclared
//! payload keys are reported too).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::flatten::flatten;
use crate::mismatch::{Location, Mismatch};
use crate::report::Report;

/// Reference data compiled into the binary.
const BUILTIN_SCHEMA_DB: &str = include_str!("../data/schema_db.json");

static BUILTIN: LazyLock<Result<SchemaStore, String>> =
    LazyLock::new(|| SchemaStore::from_json(BUILTIN_SCHEMA_DB).map_err(|e| e.to_string()));

/// Runtime type tag of a value, as a dynamic "type of" would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Boolean,
    /// Objects, arrays and null
    Object,
    /// Never produced from a decoded value; accepted in schema data
    Undefined,
}

impl SchemaType {
    /// Tag of a decoded JSON value. Null is an object.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null | Value::Array(_) | Value::Object(_) => Self::Object,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat key → declared type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaEntry {
    fields: Vec<(String, SchemaType)>,
}

impl SchemaEntry {
    #[must_use]
    pub fn new(fields: Vec<(String, SchemaType)>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<SchemaType> {
        self.fields
            .iter()
            .find_map(|(k, t)| (k == key).then_some(*t))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SchemaType)> {
        self.fields.iter().map(|(k, t)| (k.as_str(), *t))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SchemaType)> for SchemaEntry {
    fn from_iter<I: IntoIterator<Item = (K, SchemaType)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }
}

impl Serialize for SchemaEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, t) in &self.fields {
            map.serialize_entry(k, t)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = SchemaEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of flat keys to type names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SchemaEntry, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, ty)) = map.next_entry::<String, SchemaType>()? {
                    fields.push((key, ty));
                }
                Ok(SchemaEntry { fields })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

/// Declared body and header types for one endpoint + method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSchema {
    #[serde(default)]
    pub body: SchemaEntry,
    #[serde(default)]
    pub headers: SchemaEntry,
}

type MethodMap = BTreeMap<String, EndpointSchema>;
type EndpointMap = BTreeMap<String, MethodMap>;

/// service → endpoint → method → schema. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaStore {
    services: BTreeMap<String, EndpointMap>,
}

/// What to validate in one [`SchemaStore::validate`] call.
///
/// Unset payloads are skipped. Exact flags default to subset mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidation<'a> {
    pub body: Option<&'a Value>,
    pub headers: Option<&'a Value>,
    pub body_exact: bool,
    pub headers_exact: bool,
}

impl<'a> SchemaValidation<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: &'a Value) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use]
    pub fn body_exact(mut self, exact: bool) -> Self {
        self.body_exact = exact;
        self
    }

    #[must_use]
    pub fn headers_exact(mut self, exact: bool) -> Self {
        self.headers_exact = exact;
        self
    }
}

impl SchemaStore {
    /// The reference data shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns error if the embedded data does not parse.
    pub fn builtin() -> Result<&'static SchemaStore, SchemaError> {
        BUILTIN
            .as_ref()
            .map_err(|e| SchemaError::Parse(format!("builtin schema DB: {e}")))
    }

    /// Parse reference data from JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid schema DB.
    pub fn from_json(content: &str) -> Result<Self, SchemaError> {
        let store: Self =
            serde_json::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Ok(store.normalized())
    }

    /// Parse reference data from YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid schema DB.
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        let store: Self =
            serde_yml::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Ok(store.normalized())
    }

    /// Load reference data from a JSON or YAML file.
    ///
    /// Extension decides first (`.yaml`/`.yml`/`.json`); otherwise a leading
    /// `{` means JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(path.to_path_buf(), e.to_string()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ if content.trim_start().starts_with('{') => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Methods are stored uppercase.
    fn normalized(mut self) -> Self {
        for endpoints in self.services.values_mut() {
            for methods in endpoints.values_mut() {
                *methods = std::mem::take(methods)
                    .into_iter()
                    .map(|(m, s)| (m.to_ascii_uppercase(), s))
                    .collect();
            }
        }
        self
    }

    /// Insert or replace one declaration.
    pub fn insert(&mut self, service: &str, endpoint: &str, method: &str, schema: EndpointSchema) {
        self.services
            .entry(service.to_string())
            .or_default()
            .entry(endpoint.to_string())
            .or_default()
            .insert(method.to_ascii_uppercase(), schema);
    }

    /// Look up the declaration for a service / endpoint / method triple.
    ///
    /// # Errors
    ///
    /// Returns error naming the first level that is not declared.
    pub fn lookup(
        &self,
        service: &str,
        endpoint: &str,
        method: &str,
    ) -> Result<&EndpointSchema, SchemaError> {
        let endpoints = self
            .services
            .get(service)
            .ok_or_else(|| SchemaError::UnknownService(service.to_string()))?;
        let methods = endpoints
            .get(endpoint)
            .ok_or_else(|| SchemaError::UnknownEndpoint {
                service: service.to_string(),
                endpoint: endpoint.to_string(),
            })?;
        methods
            .get(&method.to_ascii_uppercase())
            .ok_or_else(|| SchemaError::UnknownMethod {
                service: service.to_string(),
                endpoint: endpoint.to_string(),
                method: method.to_string(),
            })
    }

    /// Validate payloads against the declared schema.
    ///
    /// Body checks run before header checks; within each, declared keys are
    /// checked in declaration order, then (exact mode) undeclared payload
    /// keys in payload order.
    ///
    /// # Errors
    ///
    /// Returns error if the triple is not declared. Mismatches are never
    /// errors.
    pub fn validate(
        &self,
        service: &str,
        endpoint: &str,
        method: &str,
        check: &SchemaValidation<'_>,
    ) -> Result<Report, SchemaError> {
        let schema = self.lookup(service, endpoint, method)?;
        let mut mismatches = Vec::new();

        if let Some(body) = check.body {
            compare(&schema.body, body, Location::Body, check.body_exact, &mut mismatches);
        }
        if let Some(headers) = check.headers {
            compare(
                &schema.headers,
                headers,
                Location::Headers,
                check.headers_exact,
                &mut mismatches,
            );
        }

        Ok(Report::new(mismatches))
    }
}

fn compare(
    declared: &SchemaEntry,
    actual: &Value,
    location: Location,
    exact: bool,
    out: &mut Vec<Mismatch>,
) {
    let flat = flatten(actual);

    for (key, expected) in declared.iter() {
        match flat.get(key) {
            Some(leaf) => {
                let actual = SchemaType::of(leaf);
                if actual != expected {
                    out.push(Mismatch::TypeMismatch {
                        location,
                        key: key.to_string(),
                        expected,
                        actual,
                    });
                }
            }
            None => out.push(Mismatch::MissingField {
                location,
                key: key.to_string(),
                expected,
            }),
        }
    }

    if exact {
        for key in flat.keys().filter(|k| !declared.contains(k)) {
            out.push(Mismatch::ExtraField {
                location,
                key: key.clone(),
            });
        }
    }
}

/// Validate against the builtin schema DB.
///
/// # Errors
///
/// Returns error if the builtin data is broken or the triple is not declared.
pub fn schema_validation(
    service: &str,
    endpoint: &str,
    method: &str,
    check: &SchemaValidation<'_>,
) -> Result<Report, SchemaError> {
    SchemaStore::builtin()?.validate(service, endpoint, method, check)
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema DB has no service '{0}'")]
    UnknownService(String),
    #[error("Schema DB has no endpoint '{endpoint}' for service '{service}'")]
    UnknownEndpoint { service: String, endpoint: String },
    #[error("Schema DB has no method '{method}' for '{service}' {endpoint}")]
    UnknownMethod {
        service: String,
        endpoint: String,
        method: String,
    },
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
