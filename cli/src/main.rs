//! OCPP webhook receiver — CLI server
//!
//! ```sh
//! # Run with default config (~/.config/ocpp-webhook/config.toml)
//! ocpp-webhook
//!
//! # Custom config path and port
//! ocpp-webhook --config /etc/ocpp-webhook/config.toml --port 8080
//!
//! # Plain-text blocks, Response colored by payload status
//! ocpp-webhook --no-color --response-color status-accepted
//!
//! # Validate config without starting
//! ocpp-webhook --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use ocpp_webhook::config::AppConfig;
use ocpp_webhook::server::{init_tracing, install_panic_hook, ServerHandle};
use ocpp_webhook::support::errors::AppError;
use ocpp_webhook::ResponseColorPolicy;

/// Log OCPP station events received over a webhook.
#[derive(Parser, Debug)]
#[command(
    name = "ocpp-webhook",
    version,
    about = "Webhook receiver that logs OCPP charging-station events",
    long_about = "Accepts POST /webhook notifications about station connections \
                  and OCPP messages and prints each one as a color-coded block.\n\n\
                  Default config: ~/.config/ocpp-webhook/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML). Defaults to
    /// `$OCPP_WEBHOOK_CONFIG`, then `~/.config/ocpp-webhook/config.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print blocks without ANSI colors.
    #[arg(long)]
    no_color: bool,

    /// How Response frames are colored: `always` or `status-accepted`.
    #[arg(long)]
    response_color: Option<ResponseColorPolicy>,

    /// Disable the `/metrics` endpoint.
    #[arg(long)]
    no_metrics: bool,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(ocpp_webhook::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    install_panic_hook();

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("{}", e);
            if cli.check {
                return Err(AppError::from(e).into());
            }
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(host) = cli.host {
        info!("CLI override: host = {}", host);
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if cli.no_color {
        info!("CLI override: ansi = false");
        config.render.ansi = false;
    }
    if let Some(policy) = cli.response_color {
        info!("CLI override: response_color = {}", policy);
        config.render.response_color = policy;
    }
    if cli.no_metrics {
        info!("CLI override: metrics disabled");
        config.metrics.enabled = false;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file    : {}", config_path.display());
        println!("   Listen address : {}", config.server.address());
        println!("   Log level      : {}", config.logging.level);
        println!("   ANSI colors    : {}", config.render.ansi);
        println!("   Response color : {}", config.render.response_color);
        println!("   Metrics        : {}", config.metrics.enabled);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(config).await?;
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "ocpp-webhook",
            "--config",
            "/etc/ocpp-webhook/config.toml",
            "--port",
            "8080",
            "--no-color",
            "--response-color",
            "status-accepted",
            "--check",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/ocpp-webhook/config.toml")));
        assert_eq!(cli.port, Some(8080));
        assert!(cli.no_color);
        assert_eq!(cli.response_color, Some(ResponseColorPolicy::StatusAccepted));
        assert!(cli.check);
        assert!(!cli.no_metrics);
    }

    #[test]
    fn rejects_unknown_response_color() {
        let result = Cli::try_parse_from(["ocpp-webhook", "--response-color", "sometimes"]);
        assert!(result.is_err());
    }
}
