//! Webhook server runtime.
//!
//! [`ServerHandle`] owns the listener lifecycle: it wires the webhook service
//! to stdout, mounts the router, prints the startup banner and drives
//! graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{Renderer, StdoutSink, SystemClock, WebhookService};
use crate::config::AppConfig;
use crate::interfaces::http::create_router;
use crate::support::errors::AppError;
use crate::support::shutdown::ShutdownCoordinator;

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running webhook server.
///
/// # Examples
///
/// ```rust,no_run
/// use ocpp_webhook::server::ServerHandle;
/// use ocpp_webhook::AppConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(AppConfig::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Address the listener is bound to.
    pub local_addr: SocketAddr,

    shutdown: ShutdownCoordinator,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Bind the listener, print the banner and start serving.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        info!("Starting OCPP webhook receiver...");

        let metrics = if config.metrics.enabled {
            Some(prometheus_handle()?)
        } else {
            None
        };

        let service = WebhookService::new(
            Renderer::new(config.render_options()),
            Arc::new(SystemClock),
            Arc::new(StdoutSink),
        )
        .shared();
        info!(
            "Rendering with ansi={} response_color={}",
            config.render.ansi, config.render.response_color
        );

        let router = create_router(service.clone(), metrics);

        let listener = TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("Webhook server listening on http://{}", local_addr);
        service.announce(&local_addr.to_string());

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let signal = shutdown.signal();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    signal.wait().await;
                    info!("🛑 HTTP server received shutdown signal");
                })
                .await;
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Run until the server stops on its own or shutdown is triggered, then
    /// give in-flight requests up to `shutdown_timeout` seconds to finish.
    pub async fn wait(self) {
        let Self {
            shutdown, mut task, ..
        } = self;
        let signal = shutdown.signal();

        tokio::select! {
            result = &mut task => {
                if let Err(e) = result {
                    error!("HTTP server task panicked: {}", e);
                } else {
                    warn!("HTTP server stopped without a shutdown signal");
                }
                return;
            }
            _ = signal.wait() => {}
        }

        shutdown
            .shutdown_with_cleanup(async move {
                if let Err(e) = task.await {
                    error!("HTTP server task panicked: {}", e);
                }
            })
            .await;

        info!("👋 OCPP webhook receiver shutdown complete");
    }
}

/// The global metrics recorder can only be installed once per process.
fn prometheus_handle() -> Result<PrometheusHandle, AppError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Metrics(e.to_string()))?;
    info!("📊 Prometheus metrics recorder installed");

    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}

/// Log panics from any thread instead of only printing them to stderr.
///
/// Panicking tasks and handlers do not take the server down: tokio isolates
/// spawned tasks and the router catches handler panics.
pub fn install_panic_hook() {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let location = info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            error!(location = %location, "Uncaught panic: {}", info);
        }));
    });
}
