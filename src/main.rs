//! Scriptbridge CLI entry point.
//!
//! Performs one complete bridge sequence on behalf of the embedding
//! application: register the diagnostics module, boot the runtime, import
//! the guest script, call the requested function, print the result, and
//! tear the runtime down.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scriptbridge_common::BridgeConfig;
use scriptbridge_core::ScriptRuntime;
use scriptbridge_host::diagnostics_module;

#[derive(Parser, Debug)]
#[command(
    name = "scriptbridge",
    about = "Invoke a function in a guest script module"
)]
struct Args {
    /// Script module to import (searched as <name>.wasm / <name>.wat).
    #[arg(long, default_value = "guest")]
    module: String,

    /// Function to invoke inside the module.
    #[arg(long, default_value = "compute")]
    function: String,

    /// Integer arguments passed to the function.
    #[arg(default_values_t = [3_i64, 8_i64])]
    args: Vec<i64>,

    /// Runtime-home override (beats SCRIPTBRIDGE_HOME and the baked-in default).
    #[arg(long)]
    home: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scriptbridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    if args.home.is_some() {
        config.home_override = args.home.clone();
    }

    let mut runtime = ScriptRuntime::new(config);
    runtime
        .register_native_module(diagnostics_module())
        .context("registering diagnostics module")?;
    runtime.initialize().context("initializing runtime")?;

    let outcome = runtime
        .invoker()
        .context("obtaining invoker")?
        .invoke(&args.module, &args.function, args.args.as_slice());

    // Teardown happens regardless of the call outcome; a finalize failure is
    // reported but must not mask the call result.
    if let Err(e) = runtime.finalize() {
        error!(error = %e, "finalize reported an error");
    }

    let value = outcome.with_context(|| format!("invoking {}::{}", args.module, args.function))?;

    info!(
        module = %args.module,
        function = %args.function,
        value,
        "invocation completed"
    );
    println!("{value}");

    Ok(())
}
