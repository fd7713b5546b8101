//! Schluessel-Verzeichnis – HTTP-Endpunkte und Ablage
//!
//! Benutzername -> PEM des oeffentlichen Schluessels, rein im
//! Prozess-Speicher. Clients hinterlegen ihren Schluessel nach dem
//! Verbindungsaufbau per `PUT /public_key` und holen Peer-Schluessel
//! per `GET /public_key/{username}`.
//!
//! Das Verzeichnis prueft nichts ausser dem Benutzernamen; was als PEM
//! hinterlegt wird, wird unveraendert ausgeliefert.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use fluesterkasten_core::Benutzername;

use crate::AppState;

// ---------------------------------------------------------------------------
// Ablage
// ---------------------------------------------------------------------------

/// Prozess-lokale Schluessel-Ablage
///
/// Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct SchluesselAblage {
    eintraege: Arc<DashMap<String, String>>,
}

impl SchluesselAblage {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Hinterlegt einen oeffentlichen Schluessel; ueberschreibt still
    pub fn hinterlegen(&self, benutzer: &Benutzername, public_key_pem: String) {
        self.eintraege.insert(benutzer.to_string(), public_key_pem);
    }

    /// Holt den hinterlegten Schluessel eines Benutzers
    pub fn abrufen(&self, benutzer: &str) -> Option<String> {
        self.eintraege.get(benutzer).map(|e| e.value().clone())
    }

    pub fn anzahl(&self) -> usize {
        self.eintraege.len()
    }
}

// ---------------------------------------------------------------------------
// HTTP-Handler
// ---------------------------------------------------------------------------

/// Request-/Response-Body fuer die Verzeichnis-Endpunkte
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicKeyEintrag {
    pub username: String,
    pub public_key: String,
}

/// PUT /public_key – Hinterlegt den oeffentlichen Schluessel eines Benutzers
pub async fn put_public_key(
    State(state): State<AppState>,
    Json(eintrag): Json<PublicKeyEintrag>,
) -> Response {
    let benutzer = match Benutzername::neu(&eintrag.username) {
        Ok(b) => b,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": e.to_string() })),
            )
                .into_response();
        }
    };

    state.ablage.hinterlegen(&benutzer, eintrag.public_key);
    tracing::info!(benutzer = %benutzer, "Oeffentlicher Schluessel hinterlegt");

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Public key saved" })),
    )
        .into_response()
}

/// GET /public_key/{username} – Liefert den hinterlegten Schluessel
pub async fn get_public_key(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    match state.ablage.abrufen(&username) {
        Some(public_key) => Json(PublicKeyEintrag { username, public_key }).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Public key not found" })),
        )
            .into_response(),
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

    #[test]
    fn hinterlegen_und_abrufen() {
        let ablage = SchluesselAblage::neu();
        ablage.hinterlegen(&name("alice"), "-----BEGIN PUBLIC KEY-----".into());

        assert_eq!(
            ablage.abrufen("alice").as_deref(),
            Some("-----BEGIN PUBLIC KEY-----")
        );
        assert_eq!(ablage.anzahl(), 1);
    }

    #[test]
    fn unbekannter_benutzer_liefert_nichts() {
        let ablage = SchluesselAblage::neu();
        assert!(ablage.abrufen("bob").is_none());
    }

    #[test]
    fn erneutes_hinterlegen_ueberschreibt() {
        let ablage = SchluesselAblage::neu();
        ablage.hinterlegen(&name("alice"), "alt".into());
        ablage.hinterlegen(&name("alice"), "neu".into());

        assert_eq!(ablage.abrufen("alice").as_deref(), Some("neu"));
        assert_eq!(ablage.anzahl(), 1);
    }
}
