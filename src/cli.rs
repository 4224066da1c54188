//! CLI argument parsing with clap.

use clap::Parser;

use crate::config::ServerConfig;

/// Photo generation server - pairs a visitor photo with a golfer.
#[derive(Parser, Debug)]
#[command(name = "photogen", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Bind address (overrides `server.host`).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides `server.port` and `PORT`).
    #[arg(long)]
    pub port: Option<u16>,

    /// Print the resolved provider plan and exit.
    #[arg(long)]
    pub list_providers: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the resolved server settings.
    pub fn apply_overrides(&self, server: &mut ServerConfig) {
        if let Some(ref host) = self.host {
            server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "photogen=debug,tower_http=debug"
        } else {
            "photogen=info,tower_http=info"
        }
    }
}
