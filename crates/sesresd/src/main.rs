// # sesresd - SES custom-resource runner
//
// Thin integration layer only: reads one CloudFormation custom-resource
// request envelope, runs the dispatcher, and prints the final response
// envelope as JSON on stdout. All reconciliation logic lives in
// sesres-core and sesres-handlers.
//
// The runner owns the async re-invocation loop: while a handler suspends
// the result (identity still pending verification), sesresd sleeps for
// the wait hint and resubmits the computed next request.
//
// ## Usage
//
// ```bash
// sesresd request.json      # read the envelope from a file
// sesresd < request.json    # or from stdin
// ```
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `INTERVAL_IN_SECONDS`: verification poll interval (default: 15)

use anyhow::{Context, Result};
use std::env;
use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sesres_aws::AwsClients;
use sesres_core::engine::Dispatcher;
use sesres_core::envelope::ResourceRequest;
use sesres_core::registry::HandlerRegistry;
use sesres_handlers::register_all_with_poll_interval;

/// Exit codes for sesresd
#[derive(Debug, Clone, Copy)]
enum SesresExitCode {
    /// Ran to completion and printed a response envelope
    CleanShutdown = 0,
    /// Invalid configuration or request envelope
    ConfigError = 1,
    /// Runtime failure before a response could be produced
    RuntimeError = 2,
}

impl From<SesresExitCode> for ExitCode {
    fn from(code: SesresExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Runner configuration, loaded from environment variables
struct Config {
    log_level: String,
    poll_interval_secs: u64,
    /// Optional path to the request envelope; stdin when absent
    request_path: Option<String>,
}

impl Config {
    fn from_env() -> Result<Self> {
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let poll_interval_secs = match env::var("INTERVAL_IN_SECONDS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("INTERVAL_IN_SECONDS is not a number: {}", raw))?,
            Err(_) => 15,
        };

        let mut args = env::args().skip(1);
        let request_path = args.next();
        if let Some(extra) = args.next() {
            anyhow::bail!("unexpected extra argument: {}", extra);
        }

        Ok(Self {
            log_level,
            poll_interval_secs,
            request_path,
        })
    }

    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if !(1..=3600).contains(&self.poll_interval_secs) {
            anyhow::bail!(
                "INTERVAL_IN_SECONDS must be between 1 and 3600. Got: {}",
                self.poll_interval_secs
            );
        }

        Ok(())
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn read_request(config: &Config) -> Result<ResourceRequest> {
    let raw = match &config.request_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request envelope from {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request envelope from stdin")?;
            buf
        }
    };

    serde_json::from_str(&raw).context("failed to parse request envelope")
}

async fn run(config: &Config, request: ResourceRequest) -> Result<()> {
    let clients = Arc::new(AwsClients::new().await);
    let registry = Arc::new(HandlerRegistry::new());
    register_all_with_poll_interval(
        &registry,
        clients,
        Duration::from_secs(config.poll_interval_secs),
    );
    let dispatcher = Dispatcher::new(registry);

    let mut outcome = dispatcher.dispatch(request).await;
    while let Some(reinvocation) = outcome.reinvocation.take() {
        info!(
            attempt = reinvocation.request.attempt,
            delay_secs = reinvocation.delay.as_secs(),
            "result suspended, waiting before re-invocation"
        );
        tokio::time::sleep(reinvocation.delay).await;
        outcome = dispatcher.dispatch(reinvocation.request).await;
    }

    let rendered = serde_json::to_string_pretty(&outcome.response)
        .context("failed to serialize response envelope")?;
    println!("{}", rendered);
    Ok(())
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SesresExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return SesresExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SesresExitCode::ConfigError.into();
    }

    let request = match read_request(&config) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Request error: {}", e);
            return SesresExitCode::ConfigError.into();
        }
    };

    info!("Starting sesresd");
    info!(
        resource_type = %request.resource_type,
        operation = ?request.operation,
        "request envelope loaded"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return SesresExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(&config, request)) {
        Ok(()) => SesresExitCode::CleanShutdown.into(),
        Err(e) => {
            eprintln!("Runtime error: {:#}", e);
            SesresExitCode::RuntimeError.into()
        }
    }
}
