//! petcheck CLI - pet-store API conformance with schema validation

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use petcheck_core::{Config, ScenarioStatus, SchemaValidation};
use petcheck_runner::{Suite, SuiteRunner};

#[derive(Parser)]
#[command(name = "petcheck")]
#[command(about = "Pet-store API conformance with schema validation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run conformance suites against the configured server
    Run {
        /// Suites to run: pet, store, user (default: all)
        #[arg(short, long = "suite")]
        suites: Vec<Suite>,

        /// Config file (default: .petcheck.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the configured base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Override the configured fixture seed
        #[arg(long)]
        seed: Option<u64>,

        /// Do not write request logs
        #[arg(long)]
        no_log: bool,
    },

    /// Validate a saved response body against the schema DB
    Check {
        /// Endpoint template, e.g. "/pet/{petId}"
        #[arg(short, long)]
        endpoint: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Service name (default: from config)
        #[arg(short, long)]
        service: Option<String>,

        /// Also report fields the schema DB does not declare
        #[arg(long)]
        exact: bool,

        /// JSON object of response headers to validate as well
        #[arg(long)]
        headers: Option<PathBuf>,

        /// Config file (default: .petcheck.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Response body (JSON)
        file: PathBuf,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the run summary
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let cfg = match path {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::load_default()?,
    };
    Ok(cfg)
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            suites,
            config,
            base_url,
            seed,
            no_log,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(url) = base_url {
                cfg.base_url = url;
            }
            if seed.is_some() {
                cfg.seed = seed;
            }

            let suites = if suites.is_empty() {
                Suite::all().to_vec()
            } else {
                suites
            };

            let quiet = cli.output == OutputFormat::Silent;
            if !quiet {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url);
                eprintln!("  service:  {}", cfg.service);
                if let Some(db) = &cfg.schema_db {
                    eprintln!("  schema:   {}", db.display());
                }
                if !cfg.headers.is_empty() {
                    eprintln!("  headers:  {} configured", cfg.headers.len());
                }
                if let Some(seed) = cfg.seed {
                    eprintln!("  seed:     {seed}");
                }
                eprintln!();
            }

            let log_dir = (!no_log).then(|| cfg.log_dir.clone());
            let runner = SuiteRunner::from_config(&cfg)?
                .with_log_dir(log_dir, cfg.mask_headers)
                .with_quiet(quiet);

            let start = Instant::now();
            let summary = runner.run(&suites)?;
            let duration_secs = start.elapsed().as_secs_f64();
            let exit_code = summary.exit_code();

            match cli.output {
                OutputFormat::Terminal => {
                    let passed = summary.count(ScenarioStatus::Pass);
                    let failed = summary.count(ScenarioStatus::Fail);
                    let errors = summary.count(ScenarioStatus::Error);
                    let icon = match exit_code {
                        0 => "PASS",
                        1 => "FAIL",
                        _ => "ERROR",
                    };
                    println!(
                        "\n{icon}: {passed}/{} scenarios passed ({duration_secs:.1}s)",
                        summary.total()
                    );
                    println!("  Failures: {failed}, errors: {errors}");
                    println!("  Exit code: {exit_code}");

                    for suite in &summary.suites {
                        let broken: Vec<_> = suite
                            .scenarios
                            .iter()
                            .filter(|s| s.status != ScenarioStatus::Pass)
                            .collect();
                        if !broken.is_empty() {
                            println!("\n{} ({}):", suite.suite, broken.len());
                            for s in broken {
                                println!("  [{}] {}", s.status, s.name);
                                for line in s.detail.lines() {
                                    println!("         {line}");
                                }
                            }
                        }
                        if let Some(log) = &suite.log_file {
                            println!("Request log: {log}");
                        }
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                OutputFormat::Silent => {}
            }

            Ok(exit_code)
        }

        Commands::Check {
            endpoint,
            method,
            service,
            exact,
            headers,
            config,
            file,
        } => {
            let cfg = load_config(config.as_deref())?;
            let store = cfg.schema_store()?;
            let service = service.unwrap_or(cfg.service);

            let body = read_json(&file)?;
            let headers = headers.as_deref().map(read_json).transpose()?;

            let mut check = SchemaValidation::new().body(&body).body_exact(exact);
            if let Some(headers) = &headers {
                check = check.headers(headers);
            }
            let report = store.validate(&service, &endpoint, &method, &check)?;

            match cli.output {
                OutputFormat::Terminal => println!("{report}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Silent => {}
            }
            Ok(i32::from(!report.is_pass()))
        }

        Commands::Init => {
            let config_path = ".petcheck.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: server to test");
            println!("  - headers: api_key and other auth headers");
            println!("  - schema_db: custom schema DB (optional)");
            println!("  - seed: reproducible fixtures (optional)");
            Ok(0)
        }

        Commands::Schema => {
            let schema = petcheck_core::summary::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}
