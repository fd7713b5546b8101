//! # fluesterkasten-crypto
//!
//! Hybride E2E-Verschluesselung fuer Fluesterkasten.
//!
//! Der Server leitet Frames blind weiter und sieht weder Klartext noch
//! symmetrisches Schluesselmaterial. Chat-Text wird mit einem symmetrischen
//! Sitzungs-Schluessel (AES-256-GCM) verschluesselt; der Sitzungs-Schluessel
//! selbst wird mit dem oeffentlichen RSA-Schluessel des Empfaengers
//! eingewickelt (RSA-OAEP/SHA-256) und ueber den Relay transportiert.
//!
//! ## Module
//! - `identity` - RSA-Langzeitschluessel eines Clients (PEM-Export)
//! - `exchange` - Sitzungs-Schluessel erzeugen, ein- und auswickeln
//! - `cipher`   - Chat-Text versiegeln und oeffnen (AEAD)
//! - `types`    - Gemeinsame Typen (SessionKey, Nonce, SecretBytes, etc.)
//! - `error`    - Fehlertypen

pub mod cipher;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod types;

// Bequeme Re-Exports
pub use cipher::{open, seal};
pub use error::{CryptoError, CryptoResult};
pub use exchange::{initiate, respond};
pub use identity::Identity;
pub use types::{Nonce, SecretBytes, SessionKey, SessionKeyAlgorithm, WrappedKey};
