//! Chat-Text versiegeln und oeffnen (AES-256-GCM)
//!
//! ## Draht-Format
//! ```text
//! base64( [nonce(12)] [ciphertext + auth_tag(16)] )
//! ```
//!
//! Pro Aufruf wird eine frische Zufalls-Nonce gezogen. Der Klartext wird als
//! UTF-8 verschluesselt; der Auth-Tag haengt am Ciphertext (AEAD).

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{CryptoError, CryptoResult};
use crate::types::{Nonce, SessionKey, SessionKeyAlgorithm, NONCE_LAENGE};

/// Versiegelt einen Chat-Text unter dem aktiven Sitzungs-Schluessel
///
/// Zieht fuer jeden Aufruf eine frische 96-Bit-Zufalls-Nonce, verschluesselt
/// die UTF-8-Kodierung des Texts und liefert `base64(nonce || ciphertext)`
/// als Draht-Payload.
pub fn seal(key: &SessionKey, klartext: &str) -> CryptoResult<String> {
    let nonce = Nonce::zufaellig();

    let ciphertext = match key.algorithm {
        SessionKeyAlgorithm::Aes256Gcm => {
            let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.key_bytes.as_bytes()));
            cipher
                .encrypt(AesNonce::from_slice(nonce.as_bytes()), klartext.as_bytes())
                .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?
        }
    };

    let mut kombiniert = Vec::with_capacity(NONCE_LAENGE + ciphertext.len());
    kombiniert.extend_from_slice(nonce.as_bytes());
    kombiniert.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(kombiniert))
}

/// Oeffnet einen versiegelten Draht-Payload
///
/// Dekodiert Base64, trennt die ersten 12 Bytes als Nonce ab und
/// entschluesselt den Rest mit Tag-Verifikation.
///
/// # Fehler
/// [`CryptoError::Authentifizierung`] wenn der Payload kuerzer als die Nonce
/// ist, kein gueltiges Base64 traegt oder der Auth-Tag nicht verifiziert.
/// Der Aufrufer rendert das als sichtbaren Fehler an der betroffenen
/// Nachricht und bricht die Session nicht ab.
pub fn open(key: &SessionKey, payload_b64: &str) -> CryptoResult<String> {
    let raw = BASE64
        .decode(payload_b64)
        .map_err(|e| CryptoError::Authentifizierung(format!("Base64: {e}")))?;

    if raw.len() < NONCE_LAENGE {
        return Err(CryptoError::Authentifizierung(format!(
            "Payload kuerzer als Nonce ({} Bytes)",
            raw.len()
        )));
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LAENGE);

    let klartext_bytes = match key.algorithm {
        SessionKeyAlgorithm::Aes256Gcm => {
            let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.key_bytes.as_bytes()));
            cipher
                .decrypt(AesNonce::from_slice(nonce_bytes), ciphertext)
                .map_err(|e| CryptoError::Authentifizierung(e.to_string()))?
        }
    };

    String::from_utf8(klartext_bytes)
        .map_err(|e| CryptoError::UngueltigeDaten(format!("Kein UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roundtrip() {
        let key = SessionKey::generieren();
        let klartext = "Hallo, Fluesterkasten!";

        let payload = seal(&key, klartext).unwrap();
        let geoeffnet = open(&key, &payload).unwrap();
        assert_eq!(geoeffnet, klartext);
    }

    #[test]
    fn roundtrip_leerer_text() {
        let key = SessionKey::generieren();
        let payload = seal(&key, "").unwrap();
        assert_eq!(open(&key, &payload).unwrap(), "");
    }

    #[test]
    fn roundtrip_mehrbyte_zeichen() {
        let key = SessionKey::generieren();
        let klartext = "Grüße 👋 – δοκιμή 試験";

        let payload = seal(&key, klartext).unwrap();
        assert_eq!(open(&key, &payload).unwrap(), klartext);
    }

    #[test]
    fn nonces_paarweise_verschieden() {
        let key = SessionKey::generieren();
        let mut gesehen = HashSet::new();

        for _ in 0..10_000 {
            let payload = seal(&key, "x").unwrap();
            let raw = BASE64.decode(payload).unwrap();
            let nonce: [u8; NONCE_LAENGE] = raw[..NONCE_LAENGE].try_into().unwrap();
            assert!(gesehen.insert(nonce), "Nonce-Kollision");
        }
    }

    #[test]
    fn jedes_bit_flippen_wird_erkannt() {
        let key = SessionKey::generieren();
        let payload = seal(&key, "hi").unwrap();
        let raw = BASE64.decode(&payload).unwrap();

        // Jedes einzelne Bit in Ciphertext und Tag kippen
        for byte_idx in NONCE_LAENGE..raw.len() {
            for bit in 0..8 {
                let mut manipuliert = raw.clone();
                manipuliert[byte_idx] ^= 1 << bit;
                let result = open(&key, &BASE64.encode(&manipuliert));
                assert!(
                    matches!(result, Err(CryptoError::Authentifizierung(_))),
                    "Bit-Flip an Byte {byte_idx} Bit {bit} nicht erkannt"
                );
            }
        }
    }

    #[test]
    fn falscher_schluessel_schlaegt_fehl() {
        let key1 = SessionKey::generieren();
        let key2 = SessionKey::generieren();

        let payload = seal(&key1, "geheim").unwrap();
        let result = open(&key2, &payload);
        assert!(matches!(result, Err(CryptoError::Authentifizierung(_))));
    }

    #[test]
    fn verkuerzter_payload_schlaegt_fehl() {
        let key = SessionKey::generieren();
        // Kuerzer als die Nonce
        let zu_kurz = BASE64.encode([0u8; 5]);
        let result = open(&key, &zu_kurz);
        assert!(matches!(result, Err(CryptoError::Authentifizierung(_))));
    }

    #[test]
    fn ungueltiges_base64_schlaegt_fehl() {
        let key = SessionKey::generieren();
        let result = open(&key, "das ist kein base64 €");
        assert!(matches!(result, Err(CryptoError::Authentifizierung(_))));
    }
}
