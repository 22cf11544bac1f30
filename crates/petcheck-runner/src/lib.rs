//! petcheck-runner: executes conformance suites against a live pet store
//!
//! The [`Transport`] sends requests, [`fixtures`] builds payloads, and the
//! [`suite`] module drives the pet, store and user scenarios through the
//! verification engine in `petcheck-core`.

pub mod fixtures;
pub mod suite;
pub mod transport;

pub use suite::{Ctx, RunnerError, Scenario, ScenarioError, Suite, SuiteRunner};
pub use transport::{HttpTransport, Transport, TransportError};
