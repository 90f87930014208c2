//! Anti-forgery tokens for state-changing requests.
//!
//! A token is an HMAC over the caller identity, the path it may be posted
//! to and the time it was issued, so nothing needs to be stored per token.
//! The key it is derived from is the only persisted piece.

use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use storage::Db;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

pub const KEY_LEN: usize = 32;
const SETTINGS_KEY: &str = "csrf-key";
/// How far in the future an issue time may be before the token is refused.
const CLOCK_SKEW_MS: i64 = 60_000;

#[derive(Clone, PartialEq, Eq)]
pub struct CsrfKey([u8; KEY_LEN]);

impl CsrfKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Anything that is not exactly [`KEY_LEN`] bytes is not a key.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; KEY_LEN]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CsrfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfKey(..)")
    }
}

/// Where the key survives restarts.
pub enum KeyStore {
    /// Hex encoded in the settings table.
    Settings(Db),
    /// Raw bytes in a file only the service user can read.
    File(PathBuf),
}

impl KeyStore {
    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match self {
            KeyStore::Settings(db) => {
                let value = db.get_setting(SETTINGS_KEY).await?;
                if value.is_empty() {
                    return Ok(None);
                }
                Ok(hex::decode(value).ok())
            }
            KeyStore::File(path) => match tokio::fs::read(path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    async fn write(&self, key: &CsrfKey) -> anyhow::Result<()> {
        match self {
            KeyStore::Settings(db) => db.set_setting(SETTINGS_KEY, &hex::encode(key.as_bytes())).await,
            KeyStore::File(path) => {
                tokio::fs::write(path, key.as_bytes()).await?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
                }
                Ok(())
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            KeyStore::Settings(_) => "settings table".to_string(),
            KeyStore::File(path) => path.display().to_string(),
        }
    }
}

/// Loads the persisted key, or generates and persists a new one when it
/// is missing, unreadable or the wrong length. A new key invalidates every
/// token already handed out. Failing to persist is fatal.
pub async fn load_or_generate_key(store: &KeyStore) -> anyhow::Result<CsrfKey> {
    match store.read().await {
        Ok(Some(bytes)) => {
            if let Some(key) = CsrfKey::from_bytes(&bytes) {
                return Ok(key);
            }
            warn!(
                "CSRF key in {} has wrong length ({} bytes), regenerating",
                store.describe(),
                bytes.len()
            );
        }
        Ok(None) => {}
        Err(e) => warn!("Could not read CSRF key from {}: {:?}", store.describe(), e),
    }

    info!("Generating new CSRF key");
    let key = CsrfKey::generate();
    store
        .write(&key)
        .await
        .with_context(|| format!("Failed to persist CSRF key to {}", store.describe()))?;
    Ok(key)
}

#[derive(Clone)]
pub struct CsrfGuard {
    key: Arc<CsrfKey>,
    ttl_ms: i64,
}

impl CsrfGuard {
    pub fn new(key: CsrfKey, ttl: std::time::Duration) -> Self {
        Self {
            key: Arc::new(key),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Issues a token that may be posted to `action` by `identity`.
    pub fn generate(&self, identity: &str, action: &str) -> String {
        self.generate_at(identity, action, Utc::now().timestamp_millis())
    }

    pub fn validate(&self, token: &str, identity: &str, action: &str) -> bool {
        self.validate_at(token, identity, action, Utc::now().timestamp_millis())
    }

    fn generate_at(&self, identity: &str, action: &str, issued_ms: i64) -> String {
        let tag = self.mac(identity, action, issued_ms).finalize().into_bytes();
        format!("{}:{}", URL_SAFE_NO_PAD.encode(tag), issued_ms)
    }

    fn validate_at(&self, token: &str, identity: &str, action: &str, now_ms: i64) -> bool {
        let Some((tag, issued)) = token.rsplit_once(':') else {
            return false;
        };
        let Ok(issued_ms) = issued.parse::<i64>() else {
            return false;
        };
        if issued_ms > now_ms.saturating_add(CLOCK_SKEW_MS) {
            return false;
        }
        if now_ms.saturating_sub(issued_ms) >= self.ttl_ms {
            return false;
        }
        let Ok(tag) = URL_SAFE_NO_PAD.decode(tag) else {
            return false;
        };
        self.mac(identity, action, issued_ms).verify_slice(&tag).is_ok()
    }

    fn mac(&self, identity: &str, action: &str, issued_ms: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .expect("HMAC accepts keys of any length");
        update_field(&mut mac, identity.as_bytes());
        update_field(&mut mac, action.as_bytes());
        mac.update(&issued_ms.to_be_bytes());
        mac
    }
}

// length prefix so no two (identity, action) pairs share a message
fn update_field(mac: &mut HmacSha256, field: &[u8]) {
    mac.update(&(field.len() as u64).to_be_bytes());
    mac.update(field);
}
