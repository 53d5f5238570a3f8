//! API server assembly: store, middleware, and the serve loop.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use rollcall_core::Result;
use rollcall_service::{HeaderStatus, RegistrationService};
use rollcall_sheets::{GoogleSheetsStore, MemorySheetStore, SheetStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Backend, ServerConfig};
use crate::cors::cors_layer;
use crate::routes::{self, AppState};

/// Rollcall API server.
pub struct Server {
    config: ServerConfig,
    service: RegistrationService,
}

impl Server {
    /// Creates a server around an existing service.
    pub fn new(config: ServerConfig, service: RegistrationService) -> Self {
        Self { config, service }
    }

    /// Connects to the configured backend and prepares the contacts tab.
    ///
    /// Fails when the configuration is invalid or the spreadsheet cannot be
    /// reached. A failure to write the header row is logged and ignored.
    pub async fn from_config(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let store = connect(&config).await?;
        let service = RegistrationService::new(store, config.spreadsheet_id(), &config.sheet_name)
            .with_serialized_writes(config.serialize_writes);

        if let HeaderStatus::Skipped { reason } = service.ensure_headers().await {
            tracing::warn!(reason = %reason, "Continuing without header row");
        }
        Ok(Self::new(config, service))
    }

    /// Configuration this server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Router with CORS and request tracing applied.
    pub fn router(self) -> Result<Router> {
        let cors = cors_layer(&self.config.cors_origins)?;
        Ok(routes::router(AppState::new(self.service))
            .layer(cors)
            .layer(TraceLayer::new_for_http()))
    }

    /// Serves on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        tracing::info!(addr = %listener.local_addr()?, "Rollcall API listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Builds the configured spreadsheet store.
///
/// The Google store is checked with a metadata request so bad credentials or
/// a wrong spreadsheet id fail at startup.
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn SheetStore>> {
    match config.backend {
        Backend::Google => {
            let credentials = config.google.credentials()?;
            tracing::info!(credentials = credentials.kind(), "Connecting to Google Sheets");
            let store = GoogleSheetsStore::new(config.spreadsheet_id(), credentials)?;
            store.verify_access().await?;
            tracing::info!(spreadsheet_id = %store.spreadsheet_id(), "Google Sheets API initialized");
            Ok(Arc::new(store))
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory store; contacts are lost on exit");
            Ok(Arc::new(MemorySheetStore::new().with_sheet(&config.sheet_name)))
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutting down gracefully");
}
