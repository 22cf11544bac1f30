//! Scenario suites for the pet, store and user resources
//!
//! A scenario sends one or more requests through the [`Transport`], logs
//! each exchange, and returns the merged verification [`Report`].
//! Scenarios run sequentially; later scenarios reuse the pet / order /
//! user created by earlier ones, creating their own when needed.

mod pet;
mod store;
mod user;

#[cfg(test)]
mod fake;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use petcheck_core::{
    ApiRequest, ApiResponse, Config, Expectations, LogError, Report, RequestLog, RunSummary,
    ScenarioOutcome, ScenarioStatus, SchemaError, SchemaStore, SchemaValidation, SuiteOutcome,
    multi_point_verification,
};

use crate::fixtures::{Order, Pet, User};
use crate::transport::{HttpTransport, Transport, TransportError};

/// A resource suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    Pet,
    Store,
    User,
}

impl Suite {
    #[must_use]
    pub const fn all() -> [Suite; 3] {
        [Self::Pet, Self::Store, Self::User]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pet => "pet",
            Self::Store => "store",
            Self::User => "user",
        }
    }

    #[must_use]
    pub fn scenarios(self) -> &'static [Scenario] {
        match self {
            Self::Pet => pet::SCENARIOS,
            Self::Store => store::SCENARIOS,
            Self::User => user::SCENARIOS,
        }
    }
}

impl FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pet" => Ok(Self::Pet),
            "store" => Ok(Self::Store),
            "user" => Ok(Self::User),
            other => Err(format!("unknown suite '{other}' (expected pet, store, user)")),
        }
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A named scenario.
pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&mut Ctx<'_>) -> Result<Report, ScenarioError>,
}

/// Everything a scenario needs: transport, log, schema DB, fixture RNG,
/// and the entities created so far in this suite.
pub struct Ctx<'a> {
    transport: &'a dyn Transport,
    log: Option<&'a RequestLog>,
    store: &'a SchemaStore,
    service: &'a str,
    pub rng: SmallRng,
    pub pet: Option<Pet>,
    pub order: Option<Order>,
    pub user: Option<User>,
}

impl Ctx<'_> {
    /// Send and log one request. The log records the request as sent,
    /// transport default headers included. Log failures only warn.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub fn send(&mut self, request: &ApiRequest) -> Result<ApiResponse, ScenarioError> {
        let request = self.transport.prepare(request);
        let response = self.transport.send(&request)?;
        if let Some(log) = self.log {
            if let Err(e) = log.record(self.transport.base_url(), &request, &response) {
                eprintln!("    warning: request log: {e}");
            }
        }
        Ok(response)
    }

    /// Multi-point verification of `response`.
    #[must_use]
    pub fn verify(&self, response: &ApiResponse, expect: &Expectations) -> Report {
        multi_point_verification(response, expect)
    }

    /// Schema validation of the response body and headers.
    ///
    /// Headers are always checked in subset mode: servers add transport
    /// headers (date, server, ...) that no schema DB declares.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint / method is not in the schema DB.
    pub fn schema(
        &self,
        response: &ApiResponse,
        endpoint: &str,
        method: &str,
        body_exact: bool,
    ) -> Result<Report, ScenarioError> {
        let headers = response.headers_json();
        let check = SchemaValidation::new()
            .body(&response.body)
            .headers(&headers)
            .body_exact(body_exact);
        Ok(self.store.validate(self.service, endpoint, method, &check)?)
    }

    /// Multi-point verification followed by schema validation.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint / method is not in the schema DB.
    pub fn check(
        &self,
        response: &ApiResponse,
        expect: &Expectations,
        endpoint: &str,
        method: &str,
        body_exact: bool,
    ) -> Result<Report, ScenarioError> {
        let report = self.verify(response, expect);
        Ok(report.merge(self.schema(response, endpoint, method, body_exact)?))
    }
}

/// Runs suites against one transport and schema DB.
pub struct SuiteRunner {
    transport: Box<dyn Transport>,
    store: SchemaStore,
    service: String,
    log_dir: Option<PathBuf>,
    mask_headers: bool,
    seed: Option<u64>,
    quiet: bool,
}

impl SuiteRunner {
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, store: SchemaStore, service: &str) -> Self {
        Self {
            transport,
            store,
            service: service.to_string(),
            log_dir: None,
            mask_headers: true,
            seed: None,
            quiet: false,
        }
    }

    /// Runner over HTTP with the config's schema DB, log dir and seed.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the schema DB
    /// cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self, RunnerError> {
        let transport = HttpTransport::from_config(config)?;
        let store = config.schema_store()?;
        Ok(Self::new(Box::new(transport), store, &config.service)
            .with_log_dir(Some(config.log_dir.clone()), config.mask_headers)
            .with_seed(config.seed))
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: Option<PathBuf>, mask_headers: bool) -> Self {
        self.log_dir = dir;
        self.mask_headers = mask_headers;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run the given suites in order.
    ///
    /// # Errors
    ///
    /// Returns error if a request log cannot be created.
    pub fn run(&self, suites: &[Suite]) -> Result<RunSummary, RunnerError> {
        let mut outcomes = Vec::with_capacity(suites.len());
        for &suite in suites {
            outcomes.push(self.run_suite(suite)?);
        }
        Ok(RunSummary {
            base_url: self.transport.base_url().to_string(),
            suites: outcomes,
        })
    }

    /// Run every scenario of one suite. Scenario errors are recorded, not
    /// propagated.
    ///
    /// # Errors
    ///
    /// Returns error if the request log cannot be created.
    pub fn run_suite(&self, suite: Suite) -> Result<SuiteOutcome, RunnerError> {
        let log = match &self.log_dir {
            Some(dir) => Some(RequestLog::new(dir, suite.name(), self.mask_headers)?),
            None => None,
        };
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut ctx = Ctx {
            transport: self.transport.as_ref(),
            log: log.as_ref(),
            store: &self.store,
            service: &self.service,
            rng,
            pet: None,
            order: None,
            user: None,
        };

        if !self.quiet {
            eprintln!("Suite {suite} ({} scenarios)", suite.scenarios().len());
        }

        let mut scenarios = Vec::new();
        for scenario in suite.scenarios() {
            let start = Instant::now();
            let result = (scenario.run)(&mut ctx);
            let elapsed = start.elapsed().as_secs_f64();
            let outcome = match result {
                Ok(report) => ScenarioOutcome::from_report(scenario.name, report, elapsed),
                Err(e) => ScenarioOutcome::from_error(scenario.name, &e, elapsed),
            };
            if !self.quiet {
                eprintln!("  {:<5} {} ({elapsed:.2}s)", outcome.status, scenario.name);
                if outcome.status != ScenarioStatus::Pass {
                    for line in outcome.detail.lines() {
                        eprintln!("        {line}");
                    }
                }
            }
            scenarios.push(outcome);
        }

        let outcome = SuiteOutcome {
            suite: suite.name().to_string(),
            scenarios,
            log_file: log.map(|l| l.path().display().to_string()),
        };
        if !self.quiet {
            eprintln!(
                "  {suite}: {} passed, {} failed, {} errors",
                outcome.count(ScenarioStatus::Pass),
                outcome.count(ScenarioStatus::Fail),
                outcome.count(ScenarioStatus::Error)
            );
        }
        Ok(outcome)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Fixture serialization failed: {0}")]
    Fixture(#[from] serde_json::Error),
    #[error("Setup failed: {0}")]
    Setup(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Create the setup entity with `request` and require a 200.
fn setup_request(ctx: &mut Ctx<'_>, request: &ApiRequest) -> Result<ApiResponse, ScenarioError> {
    let response = ctx.send(request)?;
    if response.status_code != 200 {
        return Err(ScenarioError::Setup(format!(
            "{} returned {}",
            request.label(),
            response.status_code
        )));
    }
    Ok(response)
}
