//! fluesterkasten-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt Router und Server fuer
//! Integrationstests bereit.

pub mod config;
pub mod relay;
pub mod verzeichnis;
pub mod ws;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use relay::FrameVerteiler;
use verzeichnis::SchluesselAblage;

/// Geteilter Zustand aller Handler
#[derive(Clone)]
pub struct AppState {
    pub verteiler: FrameVerteiler,
    pub ablage: SchluesselAblage,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn neu(config: ServerConfig) -> Self {
        Self {
            verteiler: FrameVerteiler::neu(),
            ablage: SchluesselAblage::neu(),
            config: Arc::new(config),
        }
    }
}

/// Erstellt den vollstaendigen Router (Relay + Verzeichnis)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws/:username", get(ws::ws_handler))
        .route("/public_key", put(verzeichnis::put_public_key))
        .route("/public_key/:username", get(verzeichnis::get_public_key))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        // Browser-Clients kommen vom Vite-Dev-Server; Origins sind hier egal
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health – Health-Check-Endpunkt
async fn health() -> axum::response::Json<serde_json::Value> {
    axum::response::Json(serde_json::json!({ "status": "ok" }))
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den HTTP/WebSocket-Server und laeuft bis zum Shutdown-Signal
    pub async fn starten(self) -> Result<()> {
        let adresse = self.config.bind_adresse();
        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %adresse,
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let state = AppState::neu(self.config);
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(&adresse).await?;
        tracing::info!(adresse = %adresse, "Relay und Schluessel-Verzeichnis bereit");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Wartet auf Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Shutdown-Signal nicht verfuegbar");
    } else {
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
    }
}
