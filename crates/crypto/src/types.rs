//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Laenge des Sitzungs-Schluessels in Bytes (AES-256)
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Laenge der Nonce in Bytes (96 Bit, AES-GCM)
pub const NONCE_LAENGE: usize = 12;

/// Sicherer Schluessel-Container (wird beim Drop genullt)
#[derive(Clone)]
pub struct SecretBytes(Vec<u8>);

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Eine kryptografische Nonce (Number used once)
///
/// Wird fuer jede versiegelte Nachricht frisch aus dem OS-Zufall gezogen.
/// Nonce-Wiederverwendung unter demselben Schluessel waere ein harter
/// Korrektheitsbruch, daher gibt es keinen deterministischen Konstruktor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce {
    pub bytes: [u8; NONCE_LAENGE],
}

impl Nonce {
    /// Zieht eine frische Zufalls-Nonce aus dem OS-Zufallsgenerator
    pub fn zufaellig() -> Self {
        let mut bytes = [0u8; NONCE_LAENGE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LAENGE] {
        &self.bytes
    }
}

/// Algorithmus fuer Sitzungs-Schluessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionKeyAlgorithm {
    /// AES-256-GCM mit 96-Bit-Nonce
    #[default]
    Aes256Gcm,
}

/// Symmetrischer Sitzungs-Schluessel fuer eine Konversation
///
/// Lebt nur im Prozess-Speicher fuer die Dauer der Sitzung. Wird er durch
/// einen neuen Austausch ersetzt, ist der alte unwiederbringlich verloren --
/// aeltere Ciphertexte darunter sind dann nicht mehr entschluesselbar.
#[derive(Debug, Clone)]
pub struct SessionKey {
    /// Rohes Schluesselmaterial (32 Bytes)
    pub key_bytes: SecretBytes,
    /// Algorithmus-Kennung
    pub algorithm: SessionKeyAlgorithm,
}

impl SessionKey {
    /// Erzeugt einen frischen 256-Bit-Schluessel aus dem OS-Zufall
    pub fn generieren() -> Self {
        let mut bytes = vec![0u8; SCHLUESSEL_LAENGE];
        OsRng.fill_bytes(&mut bytes);
        Self {
            key_bytes: SecretBytes::new(bytes),
            algorithm: SessionKeyAlgorithm::default(),
        }
    }

    /// Rekonstruiert einen Schluessel aus rohen Bytes (Responder-Seite)
    pub fn aus_bytes(bytes: Vec<u8>) -> CryptoResult<Self> {
        if bytes.len() != SCHLUESSEL_LAENGE {
            return Err(CryptoError::UngueltigeSchluesselLaenge {
                erwartet: SCHLUESSEL_LAENGE,
                erhalten: bytes.len(),
            });
        }
        Ok(Self {
            key_bytes: SecretBytes::new(bytes),
            algorithm: SessionKeyAlgorithm::default(),
        })
    }
}

/// Asymmetrisch eingewickelter Sitzungs-Schluessel
///
/// Existiert nur im Transit und wird nach dem Auswickeln verworfen.
#[derive(Debug, Clone)]
pub struct WrappedKey {
    /// RSA-OAEP-Ciphertext ueber die rohen Schluessel-Bytes
    pub ciphertext: Vec<u8>,
}

impl WrappedKey {
    /// Kodiert den Ciphertext fuer den Draht (Base64)
    pub fn als_base64(&self) -> String {
        BASE64.encode(&self.ciphertext)
    }

    /// Dekodiert einen Draht-Payload
    pub fn aus_base64(payload: &str) -> CryptoResult<Self> {
        let ciphertext = BASE64
            .decode(payload)
            .map_err(|e| CryptoError::UngueltigeDaten(format!("Base64: {e}")))?;
        Ok(Self { ciphertext })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
