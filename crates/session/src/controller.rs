//! SessionController – Zustandsmaschine der Client-Sitzung
//!
//! Der Controller ist der einzige Besitzer des Sitzungszustands (Identitaet,
//! Schluessel-Bestand, Empfaenger-Label). Alle UI-Absichten und alle
//! Transport-Frames laufen durch seine `&mut self`-Methoden und sind damit
//! automatisch serialisiert; zwei nebenlaeufige Schluessel-Installationen
//! koennen nicht miteinander rennen.
//!
//! ## State Machine
//! ```text
//! Getrennt -> VerbundenOhneSession -> VerbundenMitSession
//!    ^              ^    |                  |      ^|
//!    |              |    +--- Austausch ----+      || (re-entrant bei
//!    +--- Transport-Ende (jeder Zustand)           +| neuem Austausch)
//! ```
//!
//! Teure Schluessel-Operationen (RSA ein-/auswickeln) laufen via
//! `spawn_blocking` abseits des Frame-Empfangspfads; ihr Ergebnis wird erst
//! nach Abschluss auf den Zustand angewendet. Frames werden in
//! Ankunftsreihenfolge verarbeitet.

use std::sync::Arc;

use fluesterkasten_core::Benutzername;
use fluesterkasten_crypto::{cipher, exchange, Identity, WrappedKey};
use fluesterkasten_protocol::{ausgehend_nachricht, ausgehend_schluessel, Frame};

use crate::directory::SchluesselVerzeichnis;
use crate::error::{SessionError, SessionResult};
use crate::key_store::SchluesselBestand;
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Zustand und Ereignisse
// ---------------------------------------------------------------------------

/// Zustand der Client-Sitzung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitzungsZustand {
    /// Keine Transport-Verbindung
    Getrennt,
    /// Verbunden, aber kein Sitzungs-Schluessel installiert
    VerbundenOhneSession,
    /// Verbunden mit aktivem Sitzungs-Schluessel
    VerbundenMitSession,
}

/// Ereignis fuer das Transkript der Anwendung
///
/// Der Controller produziert strukturierte Ereignisse; die Darstellung
/// (hier via `Display`) ist Sache der Oberflaeche.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitzungsEreignis {
    /// Entschluesselte Nachricht eines Peers
    Nachricht { absender: Benutzername, text: String },
    /// Eine einzelne Nachricht konnte nicht entschluesselt werden;
    /// die Session ist davon nicht betroffen
    EntschluesselungsFehler { absender: Benutzername },
    /// Unstrukturierter Relay-Text (Join/Leave etc.)
    Hinweis(String),
    /// Ein eingehender Sitzungs-Schluessel wurde installiert
    SchluesselEmpfangen,
    /// Ein eingehender Sitzungs-Schluessel konnte nicht ausgewickelt
    /// werden; es ist kein Schluessel mehr aktiv
    SchluesselAustauschFehlgeschlagen,
    /// Empfaenger gesetzt und neuer Sitzungs-Schluessel geteilt
    EmpfaengerGesetzt { peer: Benutzername },
}

impl std::fmt::Display for SitzungsEreignis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SitzungsEreignis::Nachricht { absender, text } => {
                write!(f, "{absender}: {text}")
            }
            SitzungsEreignis::EntschluesselungsFehler { absender } => {
                write!(f, "{absender}: [Entschluesselungsfehler]")
            }
            SitzungsEreignis::Hinweis(text) => f.write_str(text),
            SitzungsEreignis::SchluesselEmpfangen => {
                f.write_str("Sitzungs-Schluessel empfangen.")
            }
            SitzungsEreignis::SchluesselAustauschFehlgeschlagen => f.write_str(
                "Eingehender Sitzungs-Schluessel konnte nicht ausgewickelt werden. \
                 Haben sich beide Seiten gegenseitig hinzugefuegt?",
            ),
            SitzungsEreignis::EmpfaengerGesetzt { peer } => {
                write!(f, "Empfaenger auf \"{peer}\" gesetzt. Neuer Sitzungs-Schluessel geteilt.")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Steuert eine logische Client-Sitzung gegen Transport und Verzeichnis
pub struct SessionController<T, V>
where
    T: Transport,
    V: SchluesselVerzeichnis,
{
    identitaet: Arc<Identity>,
    transport: T,
    verzeichnis: V,
    bestand: SchluesselBestand,
    zustand: SitzungsZustand,
    empfaenger: Option<Benutzername>,
}

impl<T, V> SessionController<T, V>
where
    T: Transport,
    V: SchluesselVerzeichnis,
{
    /// Erstellt einen Controller ueber einem bereits verbundenen Transport
    pub fn neu(identitaet: Identity, transport: T, verzeichnis: V) -> Self {
        Self {
            identitaet: Arc::new(identitaet),
            transport,
            verzeichnis,
            bestand: SchluesselBestand::neu(),
            zustand: SitzungsZustand::VerbundenOhneSession,
            empfaenger: None,
        }
    }

    /// Aktueller Sitzungszustand
    pub fn zustand(&self) -> SitzungsZustand {
        self.zustand
    }

    /// Aktuelles Empfaenger-Label (zuletzt gesetzter Peer)
    pub fn empfaenger(&self) -> Option<&Benutzername> {
        self.empfaenger.as_ref()
    }

    /// Lokale Identitaet
    pub fn identitaet(&self) -> &Identity {
        &self.identitaet
    }

    /// Meldet den eigenen oeffentlichen Schluessel beim Verzeichnis
    ///
    /// Wird einmal nach dem Verbindungsaufbau aufgerufen.
    pub async fn identitaet_veroeffentlichen(&self) -> SessionResult<()> {
        let pem = self.identitaet.public_key_pem()?;
        self.verzeichnis
            .veroeffentlichen(self.identitaet.benutzername(), &pem)
            .await?;
        tracing::info!(
            benutzer = %self.identitaet.benutzername(),
            "Oeffentlicher Schluessel veroeffentlicht"
        );
        Ok(())
    }

    /// Setzt einen Empfaenger und teilt einen frischen Sitzungs-Schluessel
    ///
    /// Holt den Peer-Schluessel aus dem Verzeichnis, startet den Austausch,
    /// sendet das `[KEY]`-Frame und installiert den neuen Schluessel sofort
    /// als aktiv (optimistisch, ohne Bestaetigung der Gegenseite). Schlaegt
    /// irgendein Schritt fehl, wird nichts installiert und der bisherige
    /// Zustand bleibt unveraendert.
    pub async fn empfaenger_hinzufuegen(
        &mut self,
        peer: Benutzername,
    ) -> SessionResult<SitzungsEreignis> {
        if self.zustand == SitzungsZustand::Getrennt || !self.transport.ist_verbunden() {
            return Err(SessionError::NichtVerbunden);
        }

        let pem = self.verzeichnis.abrufen(&peer).await?;

        // RSA-Einwickeln abseits des Empfangspfads
        let (session_key, wrapped) = tokio::task::spawn_blocking(move || {
            exchange::initiate(&pem)
        })
        .await
        .map_err(|e| SessionError::TaskAbgebrochen(e.to_string()))??;

        self.transport
            .senden(&ausgehend_schluessel(&wrapped.als_base64()))
            .await?;

        self.bestand.installiere_initiiert(peer.clone(), session_key);
        self.empfaenger = Some(peer.clone());
        self.zustand = SitzungsZustand::VerbundenMitSession;

        tracing::info!(peer = %peer, "Sitzungs-Schluessel geteilt");
        Ok(SitzungsEreignis::EmpfaengerGesetzt { peer })
    }

    /// Versiegelt und sendet einen Chat-Text
    ///
    /// Nur mit aktiver Session erlaubt; sonst geht kein Frame auf den Draht
    /// und der Aufrufer bekommt [`SessionError::KeineSession`] zur Anzeige.
    pub async fn senden(&mut self, text: &str) -> SessionResult<()> {
        if self.zustand != SitzungsZustand::VerbundenMitSession {
            return Err(SessionError::KeineSession);
        }
        let aktive = self.bestand.aktive().ok_or(SessionError::KeineSession)?;

        let payload = cipher::seal(&aktive.schluessel, text)?;
        self.transport
            .senden(&ausgehend_nachricht(&payload))
            .await?;
        Ok(())
    }

    /// Wartet auf das naechste Transport-Frame und verarbeitet es
    ///
    /// Gibt `None` zurueck wenn der Transport geschlossen wurde; die
    /// Sitzung ist dann getrennt und saemtliches Schluesselmaterial
    /// verworfen.
    pub async fn naechstes_ereignis(&mut self) -> SessionResult<Option<SitzungsEreignis>> {
        match self.transport.empfangen().await? {
            Some(zeile) => Ok(Some(self.frame_verarbeiten(&zeile).await?)),
            None => {
                self.verbindung_beendet();
                Ok(None)
            }
        }
    }

    /// Verarbeitet eine einzelne eingehende Textzeile
    pub async fn frame_verarbeiten(&mut self, zeile: &str) -> SessionResult<SitzungsEreignis> {
        match Frame::parse(zeile) {
            Frame::SchluesselAustausch { payload } => {
                self.schluessel_frame_verarbeiten(payload).await
            }
            Frame::Verschluesselt { absender, payload } => {
                Ok(self.verschluesseltes_frame_verarbeiten(absender, &payload))
            }
            Frame::Hinweis(text) => Ok(SitzungsEreignis::Hinweis(text)),
        }
    }

    /// Trennt die Verbindung und verwirft den Sitzungszustand
    pub async fn trennen(&mut self) -> SessionResult<()> {
        let ergebnis = self.transport.schliessen().await;
        self.verbindung_beendet();
        ergebnis.map_err(SessionError::from)
    }

    // -----------------------------------------------------------------------
    // Interne Frame-Verarbeitung
    // -----------------------------------------------------------------------

    /// Eingehendes `[KEY]`-Frame: auswickeln und installieren
    async fn schluessel_frame_verarbeiten(
        &mut self,
        payload: String,
    ) -> SessionResult<SitzungsEreignis> {
        let identitaet = Arc::clone(&self.identitaet);

        // RSA-Auswickeln abseits des Empfangspfads; das Ergebnis wird erst
        // nach Abschluss auf den Zustand angewendet
        let ergebnis = tokio::task::spawn_blocking(move || {
            let wrapped = WrappedKey::aus_base64(&payload)?;
            exchange::respond(&wrapped, identitaet.private_key())
        })
        .await
        .map_err(|e| SessionError::TaskAbgebrochen(e.to_string()))?;

        match ergebnis {
            Ok(session_key) => {
                self.bestand.installiere_empfangen(session_key);
                self.zustand = SitzungsZustand::VerbundenMitSession;
                tracing::info!("Eingehender Sitzungs-Schluessel installiert");
                Ok(SitzungsEreignis::SchluesselEmpfangen)
            }
            Err(e) => {
                // Kein unverifiziertes Schluesselmaterial zuruecklassen
                self.bestand.leeren();
                self.zustand = SitzungsZustand::VerbundenOhneSession;
                tracing::warn!(fehler = %e, "Sitzungs-Schluessel nicht auswickelbar");
                Ok(SitzungsEreignis::SchluesselAustauschFehlgeschlagen)
            }
        }
    }

    /// Eingehendes `[Encrypted]`-Frame: oeffnen und anzeigen
    ///
    /// Fehler sind auf die einzelne Nachricht beschraenkt und aendern den
    /// Zustand nicht.
    fn verschluesseltes_frame_verarbeiten(
        &mut self,
        absender: Benutzername,
        payload: &str,
    ) -> SitzungsEreignis {
        let Some(schluessel) = self.bestand.schluessel_fuer(&absender) else {
            tracing::debug!(absender = %absender, "Nachricht ohne Session empfangen");
            return SitzungsEreignis::EntschluesselungsFehler { absender };
        };

        match cipher::open(schluessel, payload) {
            Ok(text) => SitzungsEreignis::Nachricht { absender, text },
            Err(e) => {
                tracing::debug!(absender = %absender, fehler = %e, "Nachricht nicht lesbar");
                SitzungsEreignis::EntschluesselungsFehler { absender }
            }
        }
    }

    /// Transport-Ende: Schluessel und Empfaenger-Label verwerfen
    fn verbindung_beendet(&mut self) {
        self.zustand = SitzungsZustand::Getrennt;
        self.bestand.leeren();
        self.empfaenger = None;
        tracing::info!("Verbindung beendet, Sitzungszustand verworfen");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
