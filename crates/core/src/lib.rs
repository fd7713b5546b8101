//! fluesterkasten-core – Gemeinsame Typen fuer Fluesterkasten
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Fluesterkasten-Crates gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{Benutzername, UngueltigerBenutzername};
