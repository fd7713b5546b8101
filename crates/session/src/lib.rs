//! # fluesterkasten-session
//!
//! Client-seitige Sitzungssteuerung: eine logische Sitzung pro Prozess mit
//! einer Transport-Verbindung, einer aktiven Identitaet und dem
//! Schluessel-Bestand der laufenden Konversationen.
//!
//! ## Module
//! - `controller` - SessionController-Zustandsmaschine (Frame-Dispatch)
//! - `key_store`  - Bestand der installierten Sitzungs-Schluessel
//! - `directory`  - Schnittstelle zum Schluessel-Verzeichnis (extern)
//! - `transport`  - Transport-Abstraktion (+ In-Memory-Paar fuer Tests)
//! - `websocket`  - WebSocket-Transport zum Relay
//! - `error`      - Fehlertypen

pub mod controller;
pub mod directory;
pub mod error;
pub mod key_store;
pub mod transport;
pub mod websocket;

// Bequeme Re-Exports
pub use controller::{SessionController, SitzungsEreignis, SitzungsZustand};
pub use directory::{MemoryVerzeichnis, SchluesselVerzeichnis, VerzeichnisFehler};
pub use error::{SessionError, SessionResult};
pub use key_store::SchluesselBestand;
pub use transport::{memory_paar, MemoryTransport, Transport, TransportError};
pub use websocket::WebSocketTransport;
