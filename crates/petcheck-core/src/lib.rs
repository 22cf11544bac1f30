//! petcheck-core: response verification and schema validation
//!
//! This crate provides the verification engine of the conformance harness:
//! flattening of nested responses, status and substring checks, the schema
//! DB with subset/exact validation, and compilation of mismatches into a
//! single report string.

pub mod config;
pub mod flatten;
pub mod http;
pub mod mismatch;
pub mod reqlog;
pub mod report;
pub mod schema_db;
pub mod summary;
pub mod verify;

pub use config::{Config, ConfigError};
pub use flatten::flatten;
pub use http::{ApiRequest, ApiResponse};
pub use mismatch::{Location, Mismatch};
pub use reqlog::{LogError, RequestLog};
pub use report::{NO_MISMATCH, Report, compile_results};
pub use schema_db::{
    EndpointSchema, SchemaEntry, SchemaError, SchemaStore, SchemaType, SchemaValidation,
    schema_validation,
};
pub use summary::{RunSummary, ScenarioOutcome, ScenarioStatus, SuiteOutcome};
pub use verify::{
    Expectations, multi_point_verification, verify_expected_text, verify_status_code,
    verify_unexpected_text,
};
