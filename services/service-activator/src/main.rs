//! service-activator
//!
//! Lambda function that scales an ECS service from zero to one task.
//! Configuration is read once from the environment at cold start; each
//! invocation performs one activation.
//!
//! Outside Lambda, `service-activator invoke` runs a single activation and
//! exits. `--dry-run` swaps ECS for an in-memory orchestrator.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use service_activator::handler::{function_handler, ActivationResponse};
use service_activator::{Config, EcsOrchestrator, MockOrchestrator, Orchestrator, ServiceActivator};

#[derive(Parser)]
#[command(name = "service-activator", about = "Scale an idle ECS service to one task")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the Lambda runtime loop (default).
    Serve,

    /// Run one activation now and exit.
    Invoke {
        /// Use an in-memory orchestrator instead of ECS.
        #[arg(long)]
        dry_run: bool,

        /// Desired count the in-memory service starts with (dry run only).
        #[arg(long, default_value_t = 0)]
        desired_count: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    // Load configuration before any client exists
    let config = service_activator::config::load()?;
    info!(
        region = %config.region,
        cluster = %config.service.cluster,
        service = %config.service.service,
        task_definition = %config.service.task_definition,
        subnet = %config.placement.subnet,
        security_groups = ?config.placement.security_groups,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Invoke {
            dry_run,
            desired_count,
        } => invoke(config, dry_run, desired_count).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let orchestrator = EcsOrchestrator::connect(&config.region).await;
    let activator = Arc::new(ServiceActivator::new(config, Arc::new(orchestrator)));

    info!("Starting Lambda runtime");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let activator = Arc::clone(&activator);
        async move {
            function_handler(&activator, event.payload)
                .await
                .map_err(lambda_runtime::Error::from)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}

async fn invoke(config: Config, dry_run: bool, desired_count: u32) -> Result<()> {
    let orchestrator: Arc<dyn Orchestrator> = if dry_run {
        info!(desired_count, "Dry run against in-memory orchestrator");
        Arc::new(MockOrchestrator::new(desired_count))
    } else {
        Arc::new(EcsOrchestrator::connect(&config.region).await)
    };

    let activator = ServiceActivator::new(config, orchestrator);
    let response: ActivationResponse = function_handler(&activator, Value::Null).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
