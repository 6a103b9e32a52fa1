//! Daemon orchestration -- assembly, channel wiring, and lifecycle management.
//!
//! The [`Orchestrator`] is the central coordinator of `logcaster-daemon`.
//! It loads configuration, seeds the in-memory store, wires the dispatcher
//! to the control listener, and manages startup/shutdown ordering.
//!
//! # Shutdown Order
//!
//! 1. Control listener (stop accepting new commands)
//! 2. Dispatcher (cancel all runners, wait for them to finish)

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use logcaster_core::command::Command;
use logcaster_core::config::LogcasterConfig;
use logcaster_core::metrics as m;
use logcaster_core::store::MemoryStore;
use logcaster_engine::{ControlListener, Dispatcher, NetSender};

use crate::metrics_server;
use crate::pid;
use crate::seed;

/// The main daemon orchestrator.
///
/// Owns the store, the dispatcher, and the control listener, and runs
/// the main signal loop until shutdown.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: LogcasterConfig,
    /// Shared job/template store.
    store: Arc<MemoryStore>,
    /// Dispatcher, consumed when `run()` spawns it.
    dispatcher: Option<Dispatcher>,
    /// Command channel into the dispatcher. Dropping the last sender
    /// shuts the dispatcher down.
    command_tx: Option<mpsc::Sender<Command>>,
    /// Cancels the control listener and auxiliary tasks.
    cancel_token: CancellationToken,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Load configuration from a file and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read, parsed, or
    /// validated, or if seed files are invalid.
    #[allow(dead_code)] // Public API for tests
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = LogcasterConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config).await
    }

    /// Build from an already-loaded configuration.
    pub async fn build_from_config(config: LogcasterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        // Install metrics recorder before anything records
        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            record_daemon_metrics();
        }

        let store = Arc::new(MemoryStore::new());
        seed::load_seed(&config.seed, &store).await?;

        let sender = Arc::new(NetSender::new(config.engine.connect_timeout_secs));

        let (dispatcher, command_tx) = Dispatcher::builder()
            .store(store.clone())
            .sender(sender)
            .max_active_jobs(config.engine.max_active_jobs)
            .command_capacity(config.control.channel_capacity)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build dispatcher: {}", e))?;

        tracing::info!(
            control_bind = %config.control.bind,
            max_active_jobs = config.engine.max_active_jobs,
            "orchestrator initialized"
        );

        Ok(Self {
            config,
            store,
            dispatcher: Some(dispatcher),
            command_tx: Some(command_tx),
            cancel_token: CancellationToken::new(),
            start_time: Instant::now(),
        })
    }

    /// Start the dispatcher and control listener and block until a
    /// shutdown signal is received.
    ///
    /// # Shutdown Triggers
    ///
    /// - `SIGTERM` (from systemd, Docker, or `kill`)
    /// - `SIGINT` (Ctrl+C)
    pub async fn run(&mut self) -> Result<()> {
        if !self.config.general.pid_file.is_empty() {
            let path = Path::new(&self.config.general.pid_file);
            pid::write_pid_file(path)?;
        }

        let dispatcher = self
            .dispatcher
            .take()
            .ok_or_else(|| anyhow::anyhow!("orchestrator already ran"))?;
        let dispatcher_task = tokio::spawn(dispatcher.run());

        let command_tx = self
            .command_tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("orchestrator already ran"))?;

        let control = ControlListener::new(
            self.config.control.bind.clone(),
            command_tx.clone(),
            self.cancel_token.child_token(),
        );
        let control_task = tokio::spawn(async move {
            if let Err(e) = control.run().await {
                tracing::error!(error = %e, "control listener failed");
            }
        });

        let uptime_task = if self.config.metrics.enabled {
            Some(spawn_uptime_updater(
                self.start_time,
                self.cancel_token.child_token(),
            ))
        } else {
            None
        };

        tracing::info!("entering main event loop");
        let signal = wait_for_shutdown_signal().await?;
        tracing::info!(signal = signal, "shutdown signal received");

        // Stop accepting new commands, then let the dispatcher drain
        self.cancel_token.cancel();
        let _ = control_task.await;
        if let Some(task) = uptime_task {
            let _ = task.await;
        }

        drop(command_tx);
        if let Err(e) = dispatcher_task.await {
            tracing::error!(error = %e, "dispatcher task join failed");
        }

        if !self.config.general.pid_file.is_empty() {
            let path = Path::new(&self.config.general.pid_file);
            pid::remove_pid_file(path);
        }

        tracing::info!("daemon shut down");
        Ok(())
    }

    /// Get a reference to the loaded configuration.
    #[allow(dead_code)] // Public API for introspection
    pub fn config(&self) -> &LogcasterConfig {
        &self.config
    }

    /// Get a handle to the shared store.
    #[allow(dead_code)] // Public API for tests
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Record daemon-level metrics once at startup.
fn record_daemon_metrics() {
    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Spawn a background task that periodically updates the uptime metric.
///
/// Updates every 10 seconds to keep the metric fresh for Prometheus scrapes.
fn spawn_uptime_updater(
    start_time: Instant,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}
