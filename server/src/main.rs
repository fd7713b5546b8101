//! Fluesterkasten Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use fluesterkasten_server::config::{LoggingEinstellungen, ServerConfig};
use fluesterkasten_server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("FLUESTER_CONFIG")
        .unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ServerConfig::laden(&config_pfad)?;

    // Logging initialisieren
    logging_initialisieren(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Fluesterkasten Server wird initialisiert"
    );

    // Server starten
    let server = Server::neu(config);
    server.starten().await?;

    Ok(())
}

/// Initialisiert tracing-subscriber mit Level, Format und optionaler Log-Datei
fn logging_initialisieren(logging: &LoggingEinstellungen) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let ergebnis = match &logging.datei {
        Some(pfad) => {
            let datei = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(pfad)
                .map_err(|e| anyhow::anyhow!("Log-Datei '{pfad}' nicht beschreibbar: {e}"))?;
            let writer = std::sync::Arc::new(datei);
            match logging.format.as_str() {
                "json" => fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .try_init(),
                _ => fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .try_init(),
            }
        }
        None => match logging.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_target(true)
                .try_init(),
        },
    };

    ergebnis.map_err(|e| anyhow::anyhow!("Logging-Initialisierung fehlgeschlagen: {e}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
