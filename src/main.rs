//! Photogen - photo generation server.

use std::path::Path;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use photogen::cli::Cli;
use photogen::config::{self, Config};
use photogen::context::ServiceContext;
use photogen::model::ProviderConfig;
use photogen::{server, PhotoError, PhotoService};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.default_log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), PhotoError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(PhotoError::Config)?;
    let mut settings = config.resolve().map_err(PhotoError::Config)?;
    cli.apply_overrides(&mut settings.server);

    if cli.list_providers {
        for line in plan_lines(&settings.provider_plan()) {
            println!("{line}");
        }
        return Ok(());
    }

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("PHOTOGEN_REPLAY").ok();
    let is_recording = std::env::var("PHOTOGEN_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        info!(cassette = %cassette_path, "replaying provider outcomes");
        (ServiceContext::replaying(&settings, Path::new(cassette_path))?, None)
    } else if is_recording {
        info!("recording provider outcomes");
        let (ctx, session) = ServiceContext::recording(&settings);
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&settings), None)
    };

    let service = Arc::new(PhotoService::from_context(ctx, &settings));
    for provider in service.plan() {
        info!(
            provider = %provider.id,
            priority = provider.priority,
            enabled = provider.enabled,
            bypass = provider.bypass,
            "provider configured"
        );
    }

    server::serve(service, &settings.server).await?;

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!("Cassette saved: {}", path.display()),
            Err(e) => warn!("failed to save cassette: {e}"),
        }
    }

    Ok(())
}

fn plan_lines(plan: &[ProviderConfig]) -> Vec<String> {
    plan.iter()
        .map(|p| {
            let state = match (p.enabled, p.bypass) {
                (false, _) => "missing key",
                (true, true) => "bypassed",
                (true, false) => "active",
            };
            format!("{}\tpriority={}\t{state}", p.id, p.priority)
        })
        .collect()
}
