//! Frame-Verteiler – Sendet Textzeilen an alle verbundenen Clients
//!
//! Der FrameVerteiler verwaltet die Send-Queues aller verbundenen Clients
//! und stellt Methoden bereit, um Zeilen an alle oder an alle ausser einem
//! zu senden. Der Relay liest Chat-Inhalte nie; er bewegt nur Text.
//!
//! ## Verteilung
//! - An alle Clients: `an_alle_senden`
//! - An alle ausser einen: `an_alle_ausser_senden` (Schluessel-Frames gehen
//!   nie an ihren Absender zurueck)

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;

use fluesterkasten_core::Benutzername;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Client
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue eines verbundenen Clients
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub benutzer: Benutzername,
    pub tx: mpsc::Sender<String>,
}

impl ClientSender {
    /// Reiht eine Zeile nicht-blockierend beim Client ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, zeile: &str) -> bool {
        match self.tx.try_send(zeile.to_string()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(benutzer = %self.benutzer, "Send-Queue voll – Zeile verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(benutzer = %self.benutzer, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FrameVerteiler
// ---------------------------------------------------------------------------

/// Zentraler Verteiler fuer alle verbundenen Clients
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct FrameVerteiler {
    clients: Arc<DashMap<Benutzername, ClientSender>>,
}

impl FrameVerteiler {
    /// Erstellt einen neuen FrameVerteiler
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert einen neuen Client und gibt seine Empfangs-Queue zurueck
    ///
    /// Die WebSocket-Verbindung liest aus dieser Queue und sendet die Zeilen
    /// als Text-Frames an den Browser. Die Registrierung ist atomar: ist der
    /// Name bereits belegt, kommt `None` zurueck und der bestehende Eintrag
    /// bleibt unangetastet. Ein Ueberschreiben wuerde die Queue des ersten
    /// Clients verwaisen lassen und sein Aufraeumen den Eintrag des zweiten
    /// entfernen.
    pub fn client_registrieren(&self, benutzer: Benutzername) -> Option<mpsc::Receiver<String>> {
        match self.clients.entry(benutzer.clone()) {
            Entry::Occupied(_) => {
                tracing::warn!(benutzer = %benutzer, "Benutzername bereits registriert");
                None
            }
            Entry::Vacant(eintrag) => {
                let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
                eintrag.insert(ClientSender { benutzer: benutzer.clone(), tx });
                tracing::debug!(benutzer = %benutzer, "Client im Verteiler registriert");
                Some(rx)
            }
        }
    }

    /// Entfernt einen Client aus dem Verteiler
    pub fn client_entfernen(&self, benutzer: &Benutzername) {
        self.clients.remove(benutzer);
        tracing::debug!(benutzer = %benutzer, "Client aus Verteiler entfernt");
    }

    /// Sendet eine Zeile an alle verbundenen Clients
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, zeile: &str) -> usize {
        let mut gesendet = 0;
        self.clients.iter().for_each(|entry| {
            if entry.value().senden(zeile) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Sendet eine Zeile an alle verbundenen Clients ausser einem
    pub fn an_alle_ausser_senden(&self, ausgeschlossen: &Benutzername, zeile: &str) -> usize {
        let mut gesendet = 0;
        self.clients.iter().for_each(|entry| {
            if entry.key() == ausgeschlossen {
                return;
            }
            if entry.value().senden(zeile) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der registrierten Clients zurueck
    pub fn client_anzahl(&self) -> usize {
        self.clients.len()
    }

    /// Prueft ob ein Client registriert ist
    pub fn ist_registriert(&self, benutzer: &Benutzername) -> bool {
        self.clients.contains_key(benutzer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Benutzername {
        Benutzername::neu(s).unwrap()
    }

    #[tokio::test]
    async fn client_registrieren_und_senden() {
        let verteiler = FrameVerteiler::neu();

        let mut rx = verteiler.client_registrieren(name("alice")).unwrap();
        assert!(verteiler.ist_registriert(&name("alice")));

        let gesendet = verteiler.an_alle_senden("hallo");
        assert_eq!(gesendet, 1);

        let empfangen = rx.try_recv().expect("Zeile muss vorhanden sein");
        assert_eq!(empfangen, "hallo");
    }

    #[tokio::test]
    async fn an_alle_senden_erreicht_jeden() {
        let verteiler = FrameVerteiler::neu();

        let namen = ["a", "b", "c", "d", "e"];
        let mut receivers: Vec<_> = namen
            .iter()
            .map(|n| verteiler.client_registrieren(name(n)).unwrap())
            .collect();

        let gesendet = verteiler.an_alle_senden("rundruf");
        assert_eq!(gesendet, 5);

        for rx in &mut receivers {
            assert_eq!(rx.try_recv().unwrap(), "rundruf");
        }
    }

    #[tokio::test]
    async fn an_alle_ausser_senden_ueberspringt_absender() {
        let verteiler = FrameVerteiler::neu();

        let mut rx_alice = verteiler.client_registrieren(name("alice")).unwrap();
        let mut rx_bob = verteiler.client_registrieren(name("bob")).unwrap();

        // alice ist der Absender und bekommt die Zeile nicht
        let gesendet = verteiler.an_alle_ausser_senden(&name("alice"), "[KEY] QUJD");
        assert_eq!(gesendet, 1);

        assert!(rx_alice.try_recv().is_err(), "Absender darf nichts empfangen");
        assert_eq!(rx_bob.try_recv().unwrap(), "[KEY] QUJD");
    }

    #[tokio::test]
    async fn client_entfernen() {
        let verteiler = FrameVerteiler::neu();

        let _rx = verteiler.client_registrieren(name("alice")).unwrap();
        assert_eq!(verteiler.client_anzahl(), 1);

        verteiler.client_entfernen(&name("alice"));
        assert!(!verteiler.ist_registriert(&name("alice")));
        assert_eq!(verteiler.client_anzahl(), 0);
    }

    #[tokio::test]
    async fn doppelte_registrierung_verdraengt_ersten_client_nicht() {
        let verteiler = FrameVerteiler::neu();

        let mut rx_erster = verteiler.client_registrieren(name("alice")).unwrap();
        // Zweiter Versuch unter demselben Namen wird abgewiesen
        assert!(verteiler.client_registrieren(name("alice")).is_none());
        assert_eq!(verteiler.client_anzahl(), 1);

        // Der erste Client bleibt erreichbar, seine Queue ist nicht verwaist
        assert_eq!(verteiler.an_alle_senden("hallo"), 1);
        assert_eq!(rx_erster.try_recv().unwrap(), "hallo");

        // Nach dem regulaeren Aufraeumen des ersten Clients ist der Name
        // wieder frei
        verteiler.client_entfernen(&name("alice"));
        assert!(verteiler.client_registrieren(name("alice")).is_some());
    }

    #[tokio::test]
    async fn volle_queue_verwirft_statt_zu_blockieren() {
        let verteiler = FrameVerteiler::neu();
        let _rx = verteiler.client_registrieren(name("alice")).unwrap();

        for _ in 0..SEND_QUEUE_GROESSE {
            assert_eq!(verteiler.an_alle_senden("x"), 1);
        }
        // Queue ist voll; die Zeile wird verworfen statt den Relay zu blockieren
        assert_eq!(verteiler.an_alle_senden("ueberlauf"), 0);
    }
}
