//! Schnittstelle zum Schluessel-Verzeichnis
//!
//! Das Verzeichnis (Benutzername -> PEM des oeffentlichen Schluessels) ist
//! ein externer Kollaborateur und wird hier nur als schmale Schnittstelle
//! konsumiert. Auf dem Relay-Server liegt es hinter
//! `PUT /public_key` / `GET /public_key/{username}`.
//!
//! Explizite Vertrauensgrenze: ein vom Verzeichnis geliefertes PEM wird
//! unveraendert uebernommen. Es findet keine Fingerprint- oder
//! Zertifikatspruefung statt; diese Schnittstelle IST die Vertrauensannahme,
//! nicht eine fehlende Pruefung.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use fluesterkasten_core::Benutzername;

/// Fehler beim Zugriff auf das Schluessel-Verzeichnis
#[derive(Debug, Error)]
pub enum VerzeichnisFehler {
    /// Kein oeffentlicher Schluessel fuer den Benutzer hinterlegt
    #[error("Kein oeffentlicher Schluessel fuer {0:?} hinterlegt")]
    NichtGefunden(String),

    /// Verzeichnis nicht erreichbar
    #[error("Verzeichnis nicht erreichbar: {0}")]
    Netzwerk(String),
}

/// Schmale Schnittstelle zum Schluessel-Verzeichnis
#[async_trait]
pub trait SchluesselVerzeichnis: Send + Sync {
    /// Hinterlegt den eigenen oeffentlichen Schluessel (PEM)
    ///
    /// Wird einmal nach dem Identitaets-Aufbau aufgerufen.
    async fn veroeffentlichen(
        &self,
        benutzer: &Benutzername,
        public_key_pem: &str,
    ) -> Result<(), VerzeichnisFehler>;

    /// Holt den oeffentlichen Schluessel eines Peers (PEM)
    ///
    /// Ein Fehler hier wird dem Benutzer als "Empfaenger konnte nicht
    /// gesetzt werden" angezeigt; es wird kein Austausch begonnen.
    async fn abrufen(&self, benutzer: &Benutzername) -> Result<String, VerzeichnisFehler>;
}

#[async_trait]
impl<V: SchluesselVerzeichnis> SchluesselVerzeichnis for std::sync::Arc<V> {
    async fn veroeffentlichen(
        &self,
        benutzer: &Benutzername,
        public_key_pem: &str,
    ) -> Result<(), VerzeichnisFehler> {
        (**self).veroeffentlichen(benutzer, public_key_pem).await
    }

    async fn abrufen(&self, benutzer: &Benutzername) -> Result<String, VerzeichnisFehler> {
        (**self).abrufen(benutzer).await
    }
}

// ---------------------------------------------------------------------------
// In-Memory-Verzeichnis (fuer Tests)
// ---------------------------------------------------------------------------

/// Prozess-lokales Verzeichnis fuer Tests
#[derive(Default)]
pub struct MemoryVerzeichnis {
    schluessel: DashMap<String, String>,
}

impl MemoryVerzeichnis {
    pub fn neu() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchluesselVerzeichnis for MemoryVerzeichnis {
    async fn veroeffentlichen(
        &self,
        benutzer: &Benutzername,
        public_key_pem: &str,
    ) -> Result<(), VerzeichnisFehler> {
        self.schluessel
            .insert(benutzer.to_string(), public_key_pem.to_string());
        Ok(())
    }

    async fn abrufen(&self, benutzer: &Benutzername) -> Result<String, VerzeichnisFehler> {
        self.schluessel
            .get(benutzer.as_str())
            .map(|eintrag| eintrag.value().clone())
            .ok_or_else(|| VerzeichnisFehler::NichtGefunden(benutzer.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn veroeffentlichen_und_abrufen() {
        let verzeichnis = MemoryVerzeichnis::neu();
        let alice = Benutzername::neu("alice").unwrap();

        verzeichnis
            .veroeffentlichen(&alice, "-----BEGIN PUBLIC KEY-----")
            .await
            .unwrap();

        let pem = verzeichnis.abrufen(&alice).await.unwrap();
        assert_eq!(pem, "-----BEGIN PUBLIC KEY-----");
    }

    #[tokio::test]
    async fn unbekannter_benutzer_nicht_gefunden() {
        let verzeichnis = MemoryVerzeichnis::neu();
        let bob = Benutzername::neu("bob").unwrap();

        let result = verzeichnis.abrufen(&bob).await;
        assert!(matches!(result, Err(VerzeichnisFehler::NichtGefunden(_))));
    }

    #[tokio::test]
    async fn erneutes_veroeffentlichen_ueberschreibt() {
        let verzeichnis = MemoryVerzeichnis::neu();
        let alice = Benutzername::neu("alice").unwrap();

        verzeichnis.veroeffentlichen(&alice, "alt").await.unwrap();
        verzeichnis.veroeffentlichen(&alice, "neu").await.unwrap();
        assert_eq!(verzeichnis.abrufen(&alice).await.unwrap(), "neu");
    }
}
