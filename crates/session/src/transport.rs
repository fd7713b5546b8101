//! Transport-Abstraktion
//!
//! Der Transport ist ein persistenter, geordneter, bidirektionaler Kanal
//! fuer UTF-8-Textzeilen, beim Verbinden an den lokalen Benutzernamen
//! gebunden. Er bewegt nur Text; jegliche Kryptografie passiert darueber.
//!
//! Frames werden in Empfangsreihenfolge geliefert, ohne Umordnung oder
//! Pufferung. Ein `None` aus [`Transport::empfangen`] signalisiert den
//! Verbindungsabbau; eine Wiederverbindungs-Strategie gehoert nicht hierher.

use async_trait::async_trait;
use thiserror::Error;

/// Fehler auf dem Transport-Kanal
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Verbindung fehlgeschlagen: {0}")]
    VerbindungFehlgeschlagen(String),

    #[error("Verbindung getrennt")]
    Getrennt,

    #[error("Senden fehlgeschlagen: {0}")]
    SendenFehlgeschlagen(String),

    #[error("Empfangen fehlgeschlagen: {0}")]
    EmpfangenFehlgeschlagen(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Abstrakter Text-Frame-Transport zum Relay
#[async_trait]
pub trait Transport: Send {
    /// Sendet eine Textzeile an den Relay
    async fn senden(&mut self, zeile: &str) -> TransportResult<()>;

    /// Wartet auf die naechste Textzeile
    ///
    /// Gibt `None` zurueck wenn die Gegenseite die Verbindung geschlossen
    /// hat. In-Flight-Operationen werden dadurch sauber abgebrochen.
    async fn empfangen(&mut self) -> TransportResult<Option<String>>;

    /// Schliesst die Verbindung
    async fn schliessen(&mut self) -> TransportResult<()>;

    /// Prueft ob die Verbindung noch besteht
    fn ist_verbunden(&self) -> bool;
}

// ---------------------------------------------------------------------------
// In-Memory-Transport (fuer Tests)
// ---------------------------------------------------------------------------

use tokio::sync::mpsc;

/// Erstellt ein Paar verbundener In-Memory-Transports
///
/// Die eine Seite spielt den Client, die andere den Relay. Simuliert eine
/// geordnete, verlustfreie Verbindung ueber Kanaele.
pub fn memory_paar() -> (MemoryTransport, MemoryTransport) {
    let (tx1, rx1) = mpsc::channel(100);
    let (tx2, rx2) = mpsc::channel(100);

    (
        MemoryTransport { tx: tx1, rx: rx2, verbunden: true },
        MemoryTransport { tx: tx2, rx: rx1, verbunden: true },
    )
}

/// In-Memory-Endpunkt eines Transport-Paars
pub struct MemoryTransport {
    tx: mpsc::Sender<String>,
    rx: mpsc::Receiver<String>,
    verbunden: bool,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn senden(&mut self, zeile: &str) -> TransportResult<()> {
        if !self.verbunden {
            return Err(TransportError::Getrennt);
        }
        self.tx
            .send(zeile.to_string())
            .await
            .map_err(|_| TransportError::SendenFehlgeschlagen("Kanal geschlossen".to_string()))
    }

    async fn empfangen(&mut self) -> TransportResult<Option<String>> {
        if !self.verbunden {
            return Ok(None);
        }
        Ok(self.rx.recv().await)
    }

    async fn schliessen(&mut self) -> TransportResult<()> {
        self.verbunden = false;
        Ok(())
    }

    fn ist_verbunden(&self) -> bool {
        self.verbunden
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
