//! Password protection of RSA private keys.
//!
//! The adapter owns the key-derivation contract (password rules, PBKDF2
//! iteration count, fresh salt and IV per encryption); the RSA backend does
//! the PKCS#8 PBES2 encryption itself.

use rand_core::{OsRng, RngCore};

use crate::key::is_pem_block;
use crate::{KeyError, PemKdfParams, Result, RsaBackend, RsaKeyPair};

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
pub const MIN_PBKDF2_ITERATIONS: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PemEncryptor {
    iterations: u32,
}

impl Default for PemEncryptor {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl PemEncryptor {
    pub fn new(iterations: u32) -> Result<Self> {
        check_iterations(iterations)?;
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn encrypt(
        &self,
        backend: &dyn RsaBackend,
        private_pem: &str,
        password: &str,
    ) -> Result<String> {
        check_password(password)?;
        let plain = is_pem_block(private_pem, "PRIVATE KEY")
            && !is_pem_block(private_pem, "ENCRYPTED PRIVATE KEY");
        if !plain {
            return Err(KeyError::MalformedInput(
                "expected an unencrypted PEM private key".into(),
            ));
        }

        let mut kdf = PemKdfParams {
            iterations: self.iterations,
            salt: [0u8; 16],
            iv: [0u8; 16],
        };
        OsRng
            .try_fill_bytes(&mut kdf.salt)
            .map_err(|_| KeyError::Crypto("salt generation"))?;
        OsRng
            .try_fill_bytes(&mut kdf.iv)
            .map_err(|_| KeyError::Crypto("iv generation"))?;

        backend.encrypt_pem(private_pem, password.as_bytes(), &kdf)
    }

    pub fn decrypt(
        &self,
        backend: &dyn RsaBackend,
        encrypted_pem: &str,
        password: &str,
    ) -> Result<RsaKeyPair> {
        check_password(password)?;
        if !is_pem_block(encrypted_pem, "ENCRYPTED PRIVATE KEY") {
            return Err(KeyError::MalformedInput(
                "expected an ENCRYPTED PRIVATE KEY PEM block".into(),
            ));
        }
        backend.decrypt_pem(encrypted_pem, password.as_bytes())
    }
}

pub fn check_iterations(iterations: u32) -> Result<()> {
    if iterations < MIN_PBKDF2_ITERATIONS {
        return Err(KeyError::Config(format!(
            "pem_kdf_iterations must be at least {MIN_PBKDF2_ITERATIONS}, got {iterations}"
        )));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(KeyError::MalformedInput("password must not be empty".into()));
    }
    Ok(())
}
