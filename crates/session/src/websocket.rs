//! WebSocket-Transport zum Relay
//!
//! Verbindet sich mit `ws://<relay>/ws/<benutzername>` und tauscht
//! Text-Frames aus. Nicht-Text-Frames (Binaer, Ping/Pong) werden
//! uebersprungen; ein Close-Frame beendet den Empfang.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use fluesterkasten_core::Benutzername;

use crate::transport::{Transport, TransportError, TransportResult};

/// WebSocket-Verbindung zum Fluesterkasten-Relay
pub struct WebSocketTransport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    verbunden: bool,
}

impl WebSocketTransport {
    /// Baut die Verbindung zum Relay auf
    ///
    /// `relay_url` ist die Basis-URL (z.B. `ws://localhost:8000`); der
    /// Pfad `/ws/<benutzername>` wird angehaengt.
    pub async fn verbinden(
        relay_url: &str,
        benutzername: &Benutzername,
    ) -> TransportResult<Self> {
        let url = format!("{}/ws/{}", relay_url.trim_end_matches('/'), benutzername);
        tracing::info!(url = %url, "Verbinde mit Relay");

        let (ws, _) = connect_async(&url)
            .await
            .map_err(|e| TransportError::VerbindungFehlgeschlagen(e.to_string()))?;

        Ok(Self { ws, verbunden: true })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn senden(&mut self, zeile: &str) -> TransportResult<()> {
        if !self.verbunden {
            return Err(TransportError::Getrennt);
        }
        self.ws
            .send(Message::Text(zeile.to_string()))
            .await
            .map_err(|e| TransportError::SendenFehlgeschlagen(e.to_string()))
    }

    async fn empfangen(&mut self) -> TransportResult<Option<String>> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(zeile))) => return Ok(Some(zeile)),
                Some(Ok(Message::Close(_))) | None => {
                    self.verbunden = false;
                    return Ok(None);
                }
                // Binaer- und Kontroll-Frames gehoeren nicht zum Protokoll
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.verbunden = false;
                    return Err(TransportError::EmpfangenFehlgeschlagen(e.to_string()));
                }
            }
        }
    }

    async fn schliessen(&mut self) -> TransportResult<()> {
        self.verbunden = false;
        self.ws
            .close(None)
            .await
            .map_err(|e| TransportError::SendenFehlgeschlagen(e.to_string()))
    }

    fn ist_verbunden(&self) -> bool {
        self.verbunden
    }
}
