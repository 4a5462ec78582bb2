//! Storage for temporary credential secrets.
//!
//! The secret of a temporary credential has to survive the trip through the
//! user's browser. Native callers that never give up control can keep it in
//! [`MemoryCredentialStore`]; web callers lose their in-process state at the
//! redirect and keep it in an encrypted cookie with [`CookieCredentialStore`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use tracing::{debug, warn};

use crate::{Error, Result};

pub const COOKIE_KEY_SIZE: usize = 32;
const XNONCE_SIZE: usize = 24;
const DEFAULT_COOKIE_PREFIX: &str = "oauth_tc_";
const DEFAULT_COOKIE_MAX_AGE: u64 = 15 * 60;

/// Keeps temporary credential secrets between `begin_authorization` and
/// `complete_authorization`, keyed by the temporary token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn put(&self, correlation_id: &str, secret: &str) -> Result<()>;

    /// `None` for unknown, removed or unreadable entries.
    async fn get(&self, correlation_id: &str) -> Result<Option<String>>;

    /// Removing an unknown id is not an error.
    async fn remove(&self, correlation_id: &str) -> Result<()>;
}

#[async_trait]
impl<T> CredentialStore for Arc<T>
where
    T: CredentialStore + ?Sized,
{
    async fn put(&self, correlation_id: &str, secret: &str) -> Result<()> {
        (**self).put(correlation_id, secret).await
    }

    async fn get(&self, correlation_id: &str) -> Result<Option<String>> {
        (**self).get(correlation_id).await
    }

    async fn remove(&self, correlation_id: &str) -> Result<()> {
        (**self).remove(correlation_id).await
    }
}

#[async_trait]
impl<T> CredentialStore for &T
where
    T: CredentialStore + ?Sized,
{
    async fn put(&self, correlation_id: &str, secret: &str) -> Result<()> {
        (**self).put(correlation_id, secret).await
    }

    async fn get(&self, correlation_id: &str) -> Result<Option<String>> {
        (**self).get(correlation_id).await
    }

    async fn remove(&self, correlation_id: &str) -> Result<()> {
        (**self).remove(correlation_id).await
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Store("credential store lock poisoned".to_string())
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("len", &self.len())
            .finish()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn put(&self, correlation_id: &str, secret: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(correlation_id.to_string(), secret.to_string());
        Ok(())
    }

    async fn get(&self, correlation_id: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(poisoned)?
            .get(correlation_id)
            .cloned())
    }

    async fn remove(&self, correlation_id: &str) -> Result<()> {
        self.entries.lock().map_err(poisoned)?.remove(correlation_id);
        Ok(())
    }
}

/// Cookie-backed store for web callers.
///
/// Each secret is sealed with XChaCha20-Poly1305 using the correlation id as
/// associated data, so a cookie cannot be replayed under another token.
/// Build one per incoming HTTP request from its `Cookie` header, then copy
/// [`take_set_cookie_headers`](Self::take_set_cookie_headers) into the
/// response.
pub struct CookieCredentialStore {
    cipher: XChaCha20Poly1305,
    prefix: String,
    max_age: u64,
    secure: bool,
    jar: Mutex<BTreeMap<String, String>>,
    outgoing: Mutex<Vec<String>>,
}

impl CookieCredentialStore {
    pub fn new(key: &[u8; COOKIE_KEY_SIZE]) -> Self {
        CookieCredentialStore {
            cipher: XChaCha20Poly1305::new(Key::from_slice(key)),
            prefix: DEFAULT_COOKIE_PREFIX.to_string(),
            max_age: DEFAULT_COOKIE_MAX_AGE,
            secure: true,
            jar: Mutex::new(BTreeMap::new()),
            outgoing: Mutex::new(Vec::new()),
        }
    }

    /// Fails with `Error::Configuration` unless `key` is exactly 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        if key.len() != COOKIE_KEY_SIZE {
            return Err(Error::Configuration(format!(
                "cookie key must be {} bytes, got {}",
                COOKIE_KEY_SIZE,
                key.len()
            )));
        }
        let mut bytes = [0u8; COOKIE_KEY_SIZE];
        bytes.copy_from_slice(key);
        Ok(Self::new(&bytes))
    }

    pub fn generate_key() -> [u8; COOKIE_KEY_SIZE] {
        let mut key = [0u8; COOKIE_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    pub fn cookie_prefix<T: Into<String>>(mut self, prefix: T) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Drop the `Secure` attribute, for plain-http development servers.
    pub fn insecure(mut self) -> Self {
        self.secure = false;
        self
    }

    /// Loads the cookies of an incoming `Cookie: a=b; c=d` header.
    pub fn with_request_cookies(self, cookie_header: &str) -> Self {
        if let Ok(mut jar) = self.jar.lock() {
            for pair in cookie_header.split(';') {
                let mut parts = pair.trim().splitn(2, '=');
                if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                    if name.starts_with(&self.prefix) {
                        jar.insert(name.to_string(), value.trim_matches('"').to_string());
                    }
                }
            }
        }
        self
    }

    /// `Set-Cookie` header values produced since the last call.
    pub fn take_set_cookie_headers(&self) -> Vec<String> {
        self.outgoing
            .lock()
            .map(|mut outgoing| std::mem::take(&mut *outgoing))
            .unwrap_or_default()
    }

    fn cookie_name(&self, correlation_id: &str) -> String {
        format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(correlation_id))
    }

    fn set_cookie(&self, name: &str, value: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly{}; SameSite=Lax",
            name, value, max_age, secure
        )
    }

    fn seal(&self, correlation_id: &str, secret: &str) -> Result<String> {
        let mut nonce = [0u8; XNONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: secret.as_bytes(),
                    aad: correlation_id.as_bytes(),
                },
            )
            .map_err(|_| Error::Store("failed to seal temporary credential".to_string()))?;
        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn open(&self, correlation_id: &str, value: &str) -> Option<String> {
        let sealed = URL_SAFE_NO_PAD.decode(value).ok()?;
        if sealed.len() <= XNONCE_SIZE {
            return None;
        }
        let (nonce, ciphertext) = sealed.split_at(XNONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: correlation_id.as_bytes(),
                },
            )
            .ok()?;
        String::from_utf8(plaintext).ok()
    }
}

impl fmt::Debug for CookieCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieCredentialStore")
            .field("prefix", &self.prefix)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialStore for CookieCredentialStore {
    async fn put(&self, correlation_id: &str, secret: &str) -> Result<()> {
        let name = self.cookie_name(correlation_id);
        let value = self.seal(correlation_id, secret)?;
        let header = self.set_cookie(&name, &value, self.max_age);
        self.jar.lock().map_err(poisoned)?.insert(name, value);
        self.outgoing.lock().map_err(poisoned)?.push(header);
        Ok(())
    }

    async fn get(&self, correlation_id: &str) -> Result<Option<String>> {
        let name = self.cookie_name(correlation_id);
        let value = match self.jar.lock().map_err(poisoned)?.get(&name) {
            Some(value) => value.clone(),
            None => return Ok(None),
        };
        let secret = self.open(correlation_id, &value);
        if secret.is_none() {
            warn!(cookie = %name, "discarding unreadable temporary credential cookie");
        }
        Ok(secret)
    }

    async fn remove(&self, correlation_id: &str) -> Result<()> {
        let name = self.cookie_name(correlation_id);
        if self.jar.lock().map_err(poisoned)?.remove(&name).is_some() {
            debug!(cookie = %name, "expiring temporary credential cookie");
            let header = self.set_cookie(&name, "", 0);
            self.outgoing.lock().map_err(poisoned)?.push(header);
        }
        Ok(())
    }
}
