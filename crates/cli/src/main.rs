//! adoservicehooks CLI entry point.
//!
//! This binary is the composition root for the provider. Responsibilities:
//!
//! 1. **Wire observability**: configure `tracing-subscriber` with a JSON layer
//!    on stderr. All `tracing` events emitted by every crate in the workspace
//!    flow through this layer; stdout is reserved for the response document.
//! 2. **Resolve configuration**: `--organization` / `--pat` / `--base-url`,
//!    with environment fallback handled by [`provider::ProviderConfig`].
//! 3. **Dispatch**: read plan/state JSON, call the named resource's lifecycle
//!    operation, and print `{"state": ..., "diagnostics": [...]}`.
//!
//! A lifecycle failure is reported as diagnostics with exit code 1. Problems
//! with the invocation itself (unreadable files, unknown resource type) are
//! plain errors on stderr.

use std::{
    io::Read,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use provider::{ConfiguredProvider, Provider, ProviderConfig, Schema};
use serde::Serialize;
use serde_json::Value;
use servicehooks::{Diagnostic, ServiceHooksError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "adoservicehooks", version, about = "Reconcile Azure DevOps service hook subscriptions")]
struct Cli {
    /// Azure DevOps organization. Falls back to ADOWEBHOOKS_ORGANIZATION.
    #[arg(long, global = true)]
    organization: Option<String>,

    /// Personal access token. Falls back to ADOWEBHOOKS_PAT.
    #[arg(long, global = true)]
    pat: Option<String>,

    /// Server root, for Azure DevOps Server installations.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Lifecycle(Lifecycle),

    /// Print the provider's resource schemas.
    Schema,
}

/// Commands that act on one resource through a configured provider.
#[derive(Debug, Subcommand)]
enum Lifecycle {
    /// Create the remote entity described by a plan.
    Create {
        #[arg(long)]
        resource: String,
        /// Plan JSON file, or `-` for stdin.
        #[arg(long)]
        plan: PathBuf,
    },
    /// Refresh prior state from the remote entity.
    Read {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Replace the remote entity named by prior state with a plan.
    Update {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        plan: PathBuf,
        #[arg(long)]
        state: PathBuf,
    },
    Delete {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Produce state for an existing remote entity.
    Import {
        #[arg(long)]
        resource: String,
        id: String,
    },
}

#[derive(Debug, Serialize)]
struct ProviderInfo<'a> {
    type_name: &'static str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response<'a> {
    Schema {
        provider: ProviderInfo<'a>,
        resources: Vec<&'static Schema>,
    },
    Outcome {
        state: Option<Value>,
        diagnostics: Vec<Diagnostic>,
    },
}

impl Response<'_> {
    fn succeeded(state: Option<Value>) -> Self {
        Self::Outcome {
            state,
            diagnostics: Vec::new(),
        }
    }

    fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self::Outcome {
            state: None,
            diagnostics,
        }
    }

    fn is_failure(&self) -> bool {
        matches!(self, Self::Outcome { diagnostics, .. } if !diagnostics.is_empty())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let provider = Provider::new(env!("CARGO_PKG_VERSION"));

    let response = run(&provider, cli).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(if response.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(provider: &Provider, cli: Cli) -> anyhow::Result<Response<'_>> {
    let lifecycle = match cli.command {
        Command::Lifecycle(lifecycle) => lifecycle,
        Command::Schema => {
            return Ok(Response::Schema {
                provider: ProviderInfo {
                    type_name: provider.type_name(),
                    version: provider.version(),
                },
                resources: provider.schemas().to_vec(),
            });
        }
    };

    let config = ProviderConfig {
        organization: cli.organization,
        pat: cli.pat,
        base_url: cli.base_url,
    };
    let configured = match provider.configure(&config) {
        Ok(configured) => configured,
        Err(e) => {
            error!(error = %e, "Provider configuration failed");
            return Ok(Response::failed(e.diagnostics()));
        }
    };

    Ok(match dispatch(&configured, lifecycle).await? {
        Ok(state) => Response::succeeded(state),
        Err(e) => {
            error!(error = %e, "Resource operation failed");
            Response::failed(e.diagnostics())
        }
    })
}

/// Runs one lifecycle operation. The outer error is an invocation problem;
/// the inner one is the operation's own failure.
async fn dispatch(
    configured: &ConfiguredProvider,
    command: Lifecycle,
) -> anyhow::Result<Result<Option<Value>, ServiceHooksError>> {
    let lookup = |type_name: &str| {
        configured.resource(type_name).with_context(|| {
            let known: Vec<_> = configured.resources().iter().map(|r| r.type_name()).collect();
            format!(
                "unknown resource type `{type_name}`; expected one of: {}",
                known.join(", ")
            )
        })
    };

    let result = match command {
        Lifecycle::Create { resource, plan } => {
            let plan = read_json(&plan)?;
            info!(resource, "Create");
            lookup(&resource)?.create(&plan).await.map(Some)
        }
        Lifecycle::Read { resource, state } => {
            let state = read_json(&state)?;
            lookup(&resource)?.read(&state).await.map(Some)
        }
        Lifecycle::Update {
            resource,
            plan,
            state,
        } => {
            if is_stdin(&plan) && is_stdin(&state) {
                bail!("--plan and --state cannot both be read from stdin");
            }
            let (plan, state) = (read_json(&plan)?, read_json(&state)?);
            info!(resource, "Update");
            lookup(&resource)?.update(&plan, &state).await.map(Some)
        }
        Lifecycle::Delete { resource, state } => {
            let state = read_json(&state)?;
            info!(resource, "Delete");
            lookup(&resource)?.delete(&state).await.map(|()| None)
        }
        Lifecycle::Import { resource, id } => {
            info!(resource, id, "Import");
            lookup(&resource)?.import(&id).await.map(Some)
        }
    };
    Ok(result)
}

fn is_stdin(path: &Path) -> bool {
    path == Path::new("-")
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
