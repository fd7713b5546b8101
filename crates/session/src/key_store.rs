//! Bestand der installierten Sitzungs-Schluessel
//!
//! Das Draht-Format traegt bei eingehenden `[KEY]`-Frames keinen Absender,
//! daher kann die Responder-Seite empfangene Schluessel keinem Peer
//! zuordnen. Der Bestand fuehrt deshalb zweierlei:
//!
//! - eine Peer-Zuordnung fuer Schluessel, deren Gegenseite bekannt ist
//!   (lokal initiierte Austausche), und
//! - den einen "aktiven" Schluessel, den der letzte Austausch (egal welcher
//!   Richtung) installiert hat.
//!
//! Beim Entschluesseln wird zuerst der Absender in der Zuordnung gesucht,
//! dann auf den aktiven Schluessel zurueckgefallen. Jede Installation
//! ersetzt den aktiven Schluessel; der ersetzte ist unwiederbringlich weg,
//! aeltere Ciphertexte darunter bleiben unlesbar.

use std::collections::HashMap;

use fluesterkasten_core::Benutzername;
use fluesterkasten_crypto::SessionKey;

/// Der aktuell aktive Sitzungs-Schluessel
#[derive(Debug, Clone)]
pub struct AktiveSession {
    /// Gegenseite, falls bekannt (nur bei lokal initiierten Austauschen)
    pub peer: Option<Benutzername>,
    /// Das Schluesselmaterial
    pub schluessel: SessionKey,
    /// `false` fuer optimistisch installierte Initiator-Schluessel: der
    /// Peer hat nie bestaetigt, dass er den Umschlag auswickeln konnte
    pub bestaetigt: bool,
}

/// Schluessel-Bestand des lokalen Clients
#[derive(Debug, Default)]
pub struct SchluesselBestand {
    pro_peer: HashMap<Benutzername, SessionKey>,
    aktiv: Option<AktiveSession>,
}

impl SchluesselBestand {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Installiert einen lokal initiierten Schluessel (optimistisch)
    ///
    /// Der Schluessel wird sofort aktiv, bevor die Gegenseite irgendetwas
    /// bestaetigt hat; der Eintrag bleibt als unbestaetigt markiert.
    pub fn installiere_initiiert(&mut self, peer: Benutzername, schluessel: SessionKey) {
        self.pro_peer.insert(peer.clone(), schluessel.clone());
        self.aktiv = Some(AktiveSession {
            peer: Some(peer),
            schluessel,
            bestaetigt: false,
        });
    }

    /// Installiert einen per `[KEY]`-Frame empfangenen Schluessel
    ///
    /// Der Absender ist auf dem Draht nicht attribuiert, daher ohne
    /// Peer-Zuordnung.
    pub fn installiere_empfangen(&mut self, schluessel: SessionKey) {
        self.aktiv = Some(AktiveSession {
            peer: None,
            schluessel,
            bestaetigt: true,
        });
    }

    /// Sucht den Schluessel fuer eine eingehende Nachricht
    ///
    /// Erst die Peer-Zuordnung, dann der aktive Schluessel als Rueckfall.
    pub fn schluessel_fuer(&self, absender: &Benutzername) -> Option<&SessionKey> {
        self.pro_peer
            .get(absender)
            .or_else(|| self.aktiv.as_ref().map(|a| &a.schluessel))
    }

    /// Gibt die aktive Session zurueck
    pub fn aktive(&self) -> Option<&AktiveSession> {
        self.aktiv.as_ref()
    }

    /// Prueft ob ein aktiver Schluessel installiert ist
    pub fn hat_session(&self) -> bool {
        self.aktiv.is_some()
    }

    /// Verwirft saemtliches Schluesselmaterial
    ///
    /// Ein schlichtes Drop; die Schluessel-Container nullen ihren Inhalt
    /// beim Drop, eine weitergehende Garantie gibt es nicht.
    pub fn leeren(&mut self) {
        self.pro_peer.clear();
        self.aktiv = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
