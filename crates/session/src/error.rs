//! Fehlertypen fuer die Sitzungssteuerung

use thiserror::Error;

use crate::directory::VerzeichnisFehler;
use crate::transport::TransportError;
use fluesterkasten_crypto::CryptoError;

/// Fehler in der Sitzungssteuerung
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation erfordert eine bestehende Transport-Verbindung
    #[error("Nicht mit dem Relay verbunden")]
    NichtVerbunden,

    /// Senden ohne aktiven Sitzungs-Schluessel. Wird dem Benutzer als
    /// "keine Session" angezeigt; es geht kein Frame auf den Draht.
    #[error("Keine aktive Session – zuerst einen Empfaenger hinzufuegen")]
    KeineSession,

    /// Peer-Schluessel konnte nicht beschafft werden ("Empfaenger konnte
    /// nicht gesetzt werden"); es wurde kein Austausch begonnen.
    #[error("Schluessel-Verzeichnis: {0}")]
    Verzeichnis(#[from] VerzeichnisFehler),

    #[error("Transport: {0}")]
    Transport(#[from] TransportError),

    #[error("Krypto: {0}")]
    Krypto(#[from] CryptoError),

    /// Eine abgesetzte Hintergrund-Operation wurde abgebrochen
    #[error("Hintergrund-Task abgebrochen: {0}")]
    TaskAbgebrochen(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
