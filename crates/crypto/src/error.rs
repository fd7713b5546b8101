//! Fehlertypen fuer das Kryptografie-Subsystem
//!
//! Jeder Fehlerpfad laesst das System ohne aktives, unverifiziertes
//! Schluesselmaterial zurueck. Kein Fehler darf Klartext aus
//! unauthentifiziertem Ciphertext liefern oder einen Sitzungs-Schluessel
//! erfinden.

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Entropie-/Provider-Ausfall bei der Schluessel-Generierung.
    /// Fatal fuer den Identitaets-Aufbau, kein Retry.
    #[error("Schluessel-Generierung fehlgeschlagen: {0}")]
    SchluesselGenerierung(String),

    /// PEM-Export des oeffentlichen Schluessels fehlgeschlagen
    #[error("Schluessel-Export fehlgeschlagen: {0}")]
    SchluesselExport(String),

    /// Der oeffentliche Schluessel des Peers ist kein gueltiges PEM/SPKI.
    /// Behebbar: der Benutzer kann den Empfaenger erneut setzen.
    #[error("Peer-Schluessel ungueltig: {0}")]
    PeerSchluesselFormat(String),

    /// Asymmetrisches Einwickeln des Sitzungs-Schluessels fehlgeschlagen
    #[error("Schluessel-Einwickeln fehlgeschlagen: {0}")]
    Einwickeln(String),

    /// Asymmetrisches Auswickeln fehlgeschlagen (falscher Schluessel,
    /// korrupter Ciphertext oder Padding-Ablehnung). Der Aufrufer muss das
    /// als "keine Session verfuegbar" behandeln, nicht als Absturz.
    #[error("Schluessel-Auswickeln fehlgeschlagen: {0}")]
    Auswickeln(String),

    /// Versiegeln einer Nachricht fehlgeschlagen
    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    /// Auth-Tag einer Nachricht verifiziert nicht (Manipulation, falscher
    /// Schluessel oder verkuerzter Payload). Isoliert auf die betroffene
    /// Nachricht, die Session bleibt bestehen.
    #[error("Authentifizierung fehlgeschlagen: {0}")]
    Authentifizierung(String),

    #[error("Ungueltige Schluessel-Laenge: erwartet {erwartet}, erhalten {erhalten}")]
    UngueltigeSchluesselLaenge { erwartet: usize, erhalten: usize },

    #[error("Ungueltige Daten: {0}")]
    UngueltigeDaten(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
