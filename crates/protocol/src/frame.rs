//! Frame-Klassifizierung fuer Relay-Textzeilen
//!
//! Jede Zeile auf dem Draht ist zustandslos und selbstbeschreibend; der
//! gesamte Sitzungszustand lebt clientseitig. Drei Formen werden erkannt
//! (exakte, case-sensitive Literale):
//!
//! ```text
//! [KEY] <base64>                      Schluessel-Austausch-Umschlag
//! [Encrypted] <absender>:  <base64>   Verschluesselte Nachricht (nur Empfang)
//! <beliebiger Text>                   Hinweis, unveraendert durchgereicht
//! ```
//!
//! Die Pruef-Reihenfolge ist fest: zuerst das `[KEY] `-Praefix, dann das
//! `[Encrypted]`-Muster, zuletzt der Hinweis-Fallback. Ausgehend produziert
//! der Client rohes Base64 ohne Praefix fuer Nachrichten (das
//! `[Encrypted] <absender>: `-Praefix haengt der Relay auf dem Empfangsweg
//! an) und `[KEY] <base64>` fuer den Schluessel-Austausch.

use fluesterkasten_core::Benutzername;

/// Literal-Praefix fuer Schluessel-Austausch-Frames
pub const KEY_PRAEFIX: &str = "[KEY] ";

/// Literal-Praefix fuer verschluesselte Nachrichten (Empfangsweg)
pub const ENCRYPTED_PRAEFIX: &str = "[Encrypted] ";

/// Klassifiziertes eingehendes Frame
///
/// Wird im Controller per erschoepfendem `match` konsumiert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `[KEY] <base64>` – eingewickelter Sitzungs-Schluessel
    SchluesselAustausch {
        /// Base64-Payload hinter dem Praefix (Dekodierung macht der Aufrufer)
        payload: String,
    },
    /// `[Encrypted] <absender>:  <base64>` – versiegelte Chat-Nachricht
    Verschluesselt {
        absender: Benutzername,
        payload: String,
    },
    /// Unstrukturierter System-/Statustext, nicht kryptografisch verarbeitet
    Hinweis(String),
}

impl Frame {
    /// Klassifiziert eine eingehende Textzeile
    ///
    /// Die Reihenfolge ist relevant: ein fehlgeformtes Schluessel-Frame darf
    /// nicht stillschweigend als Hinweis durchrutschen, daher wird das
    /// `[KEY] `-Praefix vor dem `[Encrypted]`-Muster geprueft und behaelt
    /// seine Klassifizierung auch bei leerem oder kaputtem Payload.
    pub fn parse(zeile: &str) -> Frame {
        if let Some(payload) = zeile.strip_prefix(KEY_PRAEFIX) {
            return Frame::SchluesselAustausch {
                payload: payload.to_string(),
            };
        }

        if let Some(frame) = Self::parse_verschluesselt(zeile) {
            return frame;
        }

        Frame::Hinweis(zeile.to_string())
    }

    /// Versucht das Muster `[Encrypted] \w+:\s+.+` zu erkennen
    fn parse_verschluesselt(zeile: &str) -> Option<Frame> {
        let rest = zeile.strip_prefix(ENCRYPTED_PRAEFIX)?;

        // Absender: ein oder mehr Wort-Zeichen bis zum Doppelpunkt
        let doppelpunkt = rest.find(':')?;
        let absender = Benutzername::neu(&rest[..doppelpunkt]).ok()?;

        // Nach dem Doppelpunkt: mindestens ein Whitespace, dann der Payload
        let nach_doppelpunkt = &rest[doppelpunkt + 1..];
        let payload = nach_doppelpunkt.trim_start();
        if payload.len() == nach_doppelpunkt.len() || payload.is_empty() {
            return None;
        }

        Some(Frame::Verschluesselt {
            absender,
            payload: payload.to_string(),
        })
    }
}

/// Baut das ausgehende Schluessel-Austausch-Frame
pub fn ausgehend_schluessel(payload_b64: &str) -> String {
    format!("{KEY_PRAEFIX}{payload_b64}")
}

/// Baut das ausgehende Nachrichten-Frame (rohes Base64 ohne Praefix)
///
/// Die Absender-Markierung uebernimmt der Relay auf dem Empfangsweg.
pub fn ausgehend_nachricht(payload_b64: &str) -> String {
    payload_b64.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
