//! WebSocket-Endpunkt des Relays (`/ws/{username}`)
//!
//! Der Relay kennt keine Schluessel und keinen Klartext. Er klassifiziert
//! eingehende Zeilen nur nach dem `[KEY] `-Praefix:
//!
//! - `[KEY] <b64>` geht unveraendert an alle Clients ausser den Absender.
//!   Der Absender hat den Schluessel bereits installiert; ein Echo wuerde
//!   bei ihm als nicht auswickelbar gelten und die frische Session kippen.
//! - Jede andere Zeile geht als `[Encrypted] {username}: {text}` an alle
//!   Clients, den Absender eingeschlossen.
//!
//! Zusaetzlich verteilt der Relay Join-/Leave-Hinweise als nackten Text.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};

use fluesterkasten_core::Benutzername;
use fluesterkasten_protocol::{ENCRYPTED_PRAEFIX, KEY_PRAEFIX};

use crate::relay::FrameVerteiler;
use crate::AppState;

/// GET /ws/{username} – WebSocket-Upgrade fuer einen Chat-Client
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    let benutzer = match Benutzername::neu(&username) {
        Ok(b) => b,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    // Ein Benutzername, eine Verbindung. Nur der schnelle Pfad fuer das
    // 409; verbindlich entscheidet die atomare Registrierung nach dem
    // Upgrade, da bis dahin weitere Verbindungen eintreffen koennen.
    if state.verteiler.ist_registriert(&benutzer) {
        tracing::warn!(benutzer = %benutzer, "Benutzername bereits verbunden");
        return (StatusCode::CONFLICT, "Benutzername bereits verbunden").into_response();
    }

    if state.verteiler.client_anzahl() >= state.config.server.max_clients as usize {
        tracing::warn!(benutzer = %benutzer, "Client-Limit erreicht");
        return (StatusCode::SERVICE_UNAVAILABLE, "Server voll").into_response();
    }

    let verteiler = state.verteiler.clone();
    ws.on_upgrade(move |socket| client_verbindung(socket, benutzer, verteiler))
}

/// Lebenszyklus einer Client-Verbindung
///
/// Liest parallel aus der Send-Queue (Verteiler -> Browser) und vom
/// Socket (Browser -> Verteiler), bis eine der Seiten die Verbindung
/// beendet.
async fn client_verbindung(
    mut socket: WebSocket,
    benutzer: Benutzername,
    verteiler: FrameVerteiler,
) {
    // Verbindlicher Duplikat-Check: eine gleichzeitige Verbindung mit
    // demselben Namen kann den Vorab-Check im Handler ueberholt haben
    let Some(mut queue) = verteiler.client_registrieren(benutzer.clone()) else {
        tracing::warn!(benutzer = %benutzer, "Benutzername zwischenzeitlich verbunden");
        let _ = socket.send(Message::Close(None)).await;
        return;
    };
    verteiler.an_alle_senden(&format!("{benutzer} joined the chat"));
    tracing::info!(benutzer = %benutzer, clients = verteiler.client_anzahl(), "Client verbunden");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            ausgehend = queue.recv() => {
                match ausgehend {
                    Some(zeile) => {
                        if sink.send(Message::Text(zeile)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            eingehend = stream.next() => {
                match eingehend {
                    Some(Ok(Message::Text(text))) => {
                        zeile_verteilen(&verteiler, &benutzer, &text);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Binaer- und Kontroll-Frames gehoeren nicht zum Protokoll
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(benutzer = %benutzer, fehler = %e, "WebSocket-Fehler");
                        break;
                    }
                }
            }
        }
    }

    verteiler.client_entfernen(&benutzer);
    verteiler.an_alle_senden(&format!("{benutzer} left the chat"));
    tracing::info!(benutzer = %benutzer, clients = verteiler.client_anzahl(), "Client getrennt");
}

/// Klassifiziert eine Client-Zeile und verteilt sie
fn zeile_verteilen(verteiler: &FrameVerteiler, benutzer: &Benutzername, text: &str) {
    if text.starts_with(KEY_PRAEFIX) {
        // Schluessel-Frames unveraendert weiterreichen, nie an den Absender
        let empfaenger = verteiler.an_alle_ausser_senden(benutzer, text);
        tracing::debug!(benutzer = %benutzer, empfaenger, "Schluessel-Frame weitergereicht");
    } else {
        verteiler.an_alle_senden(&format!("{ENCRYPTED_PRAEFIX}{benutzer}: {text}"));
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
    async fn key_frame_geht_nicht_an_absender() {
        let verteiler = FrameVerteiler::neu();
        let mut rx_alice = verteiler.client_registrieren(name("alice")).unwrap();
        let mut rx_bob = verteiler.client_registrieren(name("bob")).unwrap();

        zeile_verteilen(&verteiler, &name("alice"), "[KEY] QUJD");

        assert_eq!(rx_bob.try_recv().unwrap(), "[KEY] QUJD");
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn chat_zeile_wird_umhuellt_und_an_alle_verteilt() {
        let verteiler = FrameVerteiler::neu();
        let mut rx_alice = verteiler.client_registrieren(name("alice")).unwrap();
        let mut rx_bob = verteiler.client_registrieren(name("bob")).unwrap();

        zeile_verteilen(&verteiler, &name("alice"), "c2VjcmV0");

        let erwartet = "[Encrypted] alice: c2VjcmV0";
        assert_eq!(rx_alice.try_recv().unwrap(), erwartet);
        assert_eq!(rx_bob.try_recv().unwrap(), erwartet);
    }

    #[tokio::test]
    async fn key_praefix_ist_exakt() {
        let verteiler = FrameVerteiler::neu();
        let mut rx_bob = verteiler.client_registrieren(name("bob")).unwrap();

        // "[key] " (klein) ist kein Schluessel-Frame und wird umhuellt
        zeile_verteilen(&verteiler, &name("alice"), "[key] QUJD");
        assert_eq!(rx_bob.try_recv().unwrap(), "[Encrypted] alice: [key] QUJD");
    }
}
