//! fluesterkasten-protocol – Draht-Format des Relay-Protokolls
//!
//! Dieses Crate definiert die drei Frame-Formen, die zwischen Client und
//! Relay als UTF-8-Textzeilen ausgetauscht werden, sowie deren
//! Klassifizierung und Konstruktion.

pub mod frame;

pub use frame::{ausgehend_nachricht, ausgehend_schluessel, Frame, ENCRYPTED_PRAEFIX, KEY_PRAEFIX};
