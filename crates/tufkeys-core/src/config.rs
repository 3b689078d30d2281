use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::factory::check_rsa_bits;
use crate::pem::{check_iterations, DEFAULT_PBKDF2_ITERATIONS};
use crate::registry::{PORTABLE_ED25519_BACKEND, RUSTCRYPTO};
use crate::{KeyError, Result, DEFAULT_RSA_KEY_BITS};

pub const CONFIG_PATH_ENV: &str = "TUFKEYS_CONFIG";
pub const RSA_BACKEND_ENV: &str = "TUFKEYS_RSA_BACKEND";
pub const ED25519_BACKEND_ENV: &str = "TUFKEYS_ED25519_BACKEND";

/// Which backend serves each key family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSelection {
    pub rsa: String,
    pub ed25519: String,
}

impl Default for BackendSelection {
    fn default() -> Self {
        Self {
            rsa: RUSTCRYPTO.to_string(),
            ed25519: PORTABLE_ED25519_BACKEND.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub rsa_backend: String,
    pub ed25519_backend: String,
    pub rsa_default_bits: usize,
    pub pem_kdf_iterations: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        let selection = BackendSelection::default();
        Self {
            rsa_backend: selection.rsa,
            ed25519_backend: selection.ed25519,
            rsa_default_bits: DEFAULT_RSA_KEY_BITS,
            pem_kdf_iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl CryptoConfig {
    /// Resolve configuration from, in order: `path`, the `TUFKEYS_CONFIG`
    /// file, the per-user config file when it exists, then defaults. Backend
    /// names can be overridden from the environment afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| KeyError::Config(format!("read {}: {err}", path.display())))?;
        debug!(path = %path.display(), "loaded crypto config");
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|err| KeyError::Config(err.to_string()))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rsa) = lookup(RSA_BACKEND_ENV).filter(|v| !v.is_empty()) {
            self.rsa_backend = rsa;
        }
        if let Some(ed25519) = lookup(ED25519_BACKEND_ENV).filter(|v| !v.is_empty()) {
            self.ed25519_backend = ed25519;
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_rsa_bits(self.rsa_default_bits)
            .map_err(|err| KeyError::Config(format!("rsa_default_bits: {err}")))?;
        check_iterations(self.pem_kdf_iterations)
    }

    pub fn selection(&self) -> BackendSelection {
        BackendSelection {
            rsa: self.rsa_backend.clone(),
            ed25519: self.ed25519_backend.clone(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("tufkeys").join("config.json"))
}
