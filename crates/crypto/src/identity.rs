//! Langzeit-Identitaetsschluessel (RSA-2048)
//!
//! Jeder Client erzeugt beim Login ein RSA-Schluessel-Paar. Der oeffentliche
//! Schluessel wird als PEM (SPKI) an das Schluessel-Verzeichnis gemeldet,
//! der private Schluessel verbleibt ausschliesslich im Prozess-Speicher und
//! wird nie serialisiert.
//!
//! Das Schluessel-Paar dient nur zum Einwickeln des symmetrischen
//! Sitzungs-Schluessels (RSA-OAEP/SHA-256), nie zum direkten Verschluesseln
//! von Chat-Inhalten.

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use fluesterkasten_core::Benutzername;

use crate::error::{CryptoError, CryptoResult};

/// Modulus-Groesse des RSA-Schluessels in Bit
pub const MODULUS_BITS: usize = 2048;

/// Langzeit-Identitaet eines Clients
///
/// Wird einmal pro Login-Sitzung erzeugt und beim Logout bzw. Prozess-Ende
/// verworfen.
pub struct Identity {
    benutzername: Benutzername,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl Identity {
    /// Generiert ein frisches 2048-Bit-RSA-Schluessel-Paar
    ///
    /// Schlaegt mit [`CryptoError::SchluesselGenerierung`] fehl wenn der
    /// Zufallsgenerator bzw. Krypto-Provider nicht verfuegbar ist.
    pub fn generieren(benutzername: Benutzername) -> CryptoResult<Self> {
        let private_key = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS)
            .map_err(|e| CryptoError::SchluesselGenerierung(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        tracing::debug!(benutzer = %benutzername, "RSA-Identitaet erzeugt");

        Ok(Self {
            benutzername,
            private_key,
            public_key,
        })
    }

    /// Gibt den Benutzernamen dieser Identitaet zurueck
    pub fn benutzername(&self) -> &Benutzername {
        &self.benutzername
    }

    /// Exportiert den oeffentlichen Schluessel als PEM (SPKI)
    ///
    /// Base64-Body mit 64 Zeichen pro Zeile, gerahmt von
    /// `-----BEGIN PUBLIC KEY-----` / `-----END PUBLIC KEY-----`.
    /// Deterministisch fuer denselben Schluessel; dient nur dem Transport
    /// zum Verzeichnis, nie dem Identitaetsvergleich.
    pub fn public_key_pem(&self) -> CryptoResult<String> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::SchluesselExport(e.to_string()))
    }

    /// Privater Schluessel zum Auswickeln eingehender Sitzungs-Schluessel
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Identity {{ benutzername: {}, key: [RSA-{} PRIVATE] }}",
            self.benutzername, MODULUS_BITS
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
