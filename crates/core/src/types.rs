//! Gemeinsame Typen fuer Fluesterkasten
//!
//! Der Benutzername verwendet das Newtype-Pattern, damit validierte und
//! unvalidierte Namen zur Compilezeit unterscheidbar bleiben. Auf dem Draht
//! erscheinen Benutzernamen in Klartext-Frames, daher ist das erlaubte
//! Alphabet bewusst eng (alphanumerisch plus Unterstrich).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fehler bei der Validierung eines Benutzernamens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Ungueltiger Benutzername: {0:?}")]
pub struct UngueltigerBenutzername(pub String);

/// Validierter Benutzername (nicht leer, nur `[A-Za-z0-9_]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Benutzername(String);

impl Benutzername {
    /// Validiert und erstellt einen Benutzernamen
    pub fn neu(name: impl Into<String>) -> Result<Self, UngueltigerBenutzername> {
        let name = name.into();
        if name.is_empty() || !name.chars().all(Self::zeichen_erlaubt) {
            return Err(UngueltigerBenutzername(name));
        }
        Ok(Self(name))
    }

    /// Prueft ob ein Zeichen im Benutzernamen erlaubt ist
    pub fn zeichen_erlaubt(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    /// Gibt den Namen als String-Slice zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Benutzername {
    type Error = UngueltigerBenutzername;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::neu(value)
    }
}

impl From<Benutzername> for String {
    fn from(name: Benutzername) -> Self {
        name.0
    }
}

impl std::fmt::Display for Benutzername {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gueltige_namen_akzeptiert() {
        for name in ["alice", "Bob_42", "x", "0_0"] {
            assert!(Benutzername::neu(name).is_ok(), "{name} sollte gueltig sein");
        }
    }

    #[test]
    fn ungueltige_namen_abgelehnt() {
        for name in ["", "alice bob", "a:b", "ümlaut", "[KEY]"] {
            assert!(Benutzername::neu(name).is_err(), "{name:?} sollte ungueltig sein");
        }
    }

    #[test]
    fn display_gibt_rohnamen() {
        let name = Benutzername::neu("carol").unwrap();
        assert_eq!(name.to_string(), "carol");
        assert_eq!(name.as_str(), "carol");
    }
}
