//! Sitzungs-Schluessel-Austausch (RSA-OAEP)
//!
//! Der Initiator erzeugt einen frischen symmetrischen Schluessel und wickelt
//! dessen rohe Bytes mit dem oeffentlichen RSA-Schluessel des Peers ein.
//! Der Responder wickelt mit seinem privaten Schluessel aus und
//! rekonstruiert daraus denselben Sitzungs-Schluessel.
//!
//! ## Ablauf
//! 1. Initiator: `initiate(peer_pem)` -> (neuer SessionKey, WrappedKey)
//! 2. WrappedKey geht als `[KEY] <base64>`-Frame ueber den Relay
//! 3. Responder: `respond(wrapped, private_key)` -> SessionKey
//!
//! Bei 2048-Bit-OAEP/SHA-256 liegt das Plaintext-Maximum bei 190 Bytes,
//! weit ueber den 32 Schluessel-Bytes. Das Einwickeln wird trotzdem als
//! pruefbarer Fehlerpfad behandelt, nicht als Annahme.

use rand::rngs::OsRng;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::types::{SessionKey, WrappedKey};

/// Startet einen Schluessel-Austausch in Richtung eines Peers
///
/// Parst das PEM des Peer-Schluessels (Rahmen und Whitespace entfernen,
/// Base64 zu DER, Import als OAEP/SHA-256-Schluessel), erzeugt einen neuen
/// 256-Bit-Sitzungs-Schluessel und wickelt dessen rohe Bytes ein.
///
/// Gibt sowohl den neuen lokalen Schluessel (zur sofortigen Installation)
/// als auch den zu uebertragenden Umschlag zurueck.
///
/// # Fehler
/// - [`CryptoError::PeerSchluesselFormat`] bei ungueltigem oder leerem PEM
/// - [`CryptoError::Einwickeln`] wenn die RSA-Verschluesselung fehlschlaegt
pub fn initiate(peer_public_key_pem: &str) -> CryptoResult<(SessionKey, WrappedKey)> {
    let pem = peer_public_key_pem.trim();
    if pem.is_empty() {
        return Err(CryptoError::PeerSchluesselFormat(
            "leerer Peer-Schluessel".to_string(),
        ));
    }

    let peer_key = RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| CryptoError::PeerSchluesselFormat(e.to_string()))?;

    let session_key = SessionKey::generieren();

    let ciphertext = peer_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), session_key.key_bytes.as_bytes())
        .map_err(|e| CryptoError::Einwickeln(e.to_string()))?;

    tracing::debug!(
        ciphertext_len = ciphertext.len(),
        "Sitzungs-Schluessel eingewickelt"
    );

    Ok((session_key, WrappedKey { ciphertext }))
}

/// Wickelt einen eingehenden Sitzungs-Schluessel aus
///
/// Entschluesselt den Ciphertext mit dem lokalen privaten Schluessel und
/// importiert die rohen Bytes als AES-256-GCM-Schluessel.
///
/// # Fehler
/// [`CryptoError::Auswickeln`] bei falschem Schluessel, korruptem Ciphertext
/// oder OAEP-Padding-Ablehnung. Der Aufrufer behandelt das als "keine
/// Session verfuegbar".
pub fn respond(wrapped: &WrappedKey, private_key: &RsaPrivateKey) -> CryptoResult<SessionKey> {
    let raw = private_key
        .decrypt(Oaep::new::<Sha256>(), &wrapped.ciphertext)
        .map_err(|e| CryptoError::Auswickeln(e.to_string()))?;

    SessionKey::aus_bytes(raw)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use fluesterkasten_core::Benutzername;

    fn identity(name: &str) -> Identity {
        Identity::generieren(Benutzername::neu(name).unwrap()).unwrap()
    }

    #[test]
    fn wrap_unwrap_roundtrip() {
        let bob = identity("bob");
        let pem = bob.public_key_pem().unwrap();

        let (session_key, wrapped) = initiate(&pem).unwrap();
        let recovered = respond(&wrapped, bob.private_key()).unwrap();

        // Byte-fuer-Byte identisches Schluesselmaterial
        assert_eq!(
            recovered.key_bytes.as_bytes(),
            session_key.key_bytes.as_bytes()
        );
    }

    #[test]
    fn jeder_austausch_erzeugt_frischen_schluessel() {
        let bob = identity("bob");
        let pem = bob.public_key_pem().unwrap();

        let (key1, _) = initiate(&pem).unwrap();
        let (key2, _) = initiate(&pem).unwrap();
        assert_ne!(key1.key_bytes.as_bytes(), key2.key_bytes.as_bytes());
    }

    #[test]
    fn pem_ohne_rahmen_abgelehnt() {
        let bob = identity("bob");
        let pem = bob.public_key_pem().unwrap();
        let ohne_rahmen: String = pem
            .lines()
            .filter(|z| !z.starts_with("-----"))
            .collect::<Vec<_>>()
            .join("\n");

        let result = initiate(&ohne_rahmen);
        assert!(matches!(result, Err(CryptoError::PeerSchluesselFormat(_))));
    }

    #[test]
    fn korruptes_base64_abgelehnt() {
        let bob = identity("bob");
        let pem = bob.public_key_pem().unwrap().replace('M', "?");

        let result = initiate(&pem);
        assert!(matches!(result, Err(CryptoError::PeerSchluesselFormat(_))));
    }

    #[test]
    fn leerer_peer_schluessel_abgelehnt() {
        assert!(matches!(
            initiate(""),
            Err(CryptoError::PeerSchluesselFormat(_))
        ));
        assert!(matches!(
            initiate("   \n  "),
            Err(CryptoError::PeerSchluesselFormat(_))
        ));
    }

    #[test]
    fn falscher_privater_schluessel_schlaegt_fehl() {
        let bob = identity("bob");
        let mallory = identity("mallory");

        let (_, wrapped) = initiate(&bob.public_key_pem().unwrap()).unwrap();
        let result = respond(&wrapped, mallory.private_key());
        assert!(matches!(result, Err(CryptoError::Auswickeln(_))));
    }

    #[test]
    fn korrupter_ciphertext_schlaegt_fehl() {
        let bob = identity("bob");
        let (_, mut wrapped) = initiate(&bob.public_key_pem().unwrap()).unwrap();
        wrapped.ciphertext[0] ^= 0xFF;

        let result = respond(&wrapped, bob.private_key());
        assert!(matches!(result, Err(CryptoError::Auswickeln(_))));
    }
}
