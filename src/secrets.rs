use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub trait SecretsProvider {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str);

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)>;

    fn get_token_option_pair<'a>(&'a self) -> (Option<&'a str>, Option<&'a str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or_else(|| (None, None))
    }
}

pub trait TokenSecretsProvider {
    fn get_token_pair<'a>(&'a self) -> (&'a str, &'a str);
}

/// Consumer key and secret issued when the application was registered.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerCredential {
    key: String,
    secret: String,
}

impl ConsumerCredential {
    /// Fails with `Error::Configuration` when either half is empty.
    pub fn new<TKey, TSecret>(key: TKey, secret: TSecret) -> Result<Self>
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        let credential = ConsumerCredential {
            key: key.into(),
            secret: secret.into(),
        };
        credential.validate()?;
        Ok(credential)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::Configuration("consumer key is empty".to_string()));
        }
        if self.secret.trim().is_empty() {
            return Err(Error::Configuration(
                "consumer secret is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Borrows the credential as signing secrets without a token.
    pub fn secrets(&self) -> Secrets<'_, ()> {
        Secrets::new(self.key.as_str(), self.secret.as_str())
    }
}

impl fmt::Debug for ConsumerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredential")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Token and secret issued by the temporary credential endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredential {
    pub token: String,
    pub secret: String,
    pub callback_confirmed: bool,
}

impl fmt::Debug for TemporaryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredential")
            .field("token", &self.token)
            .field("callback_confirmed", &self.callback_confirmed)
            .finish_non_exhaustive()
    }
}

impl TokenSecretsProvider for TemporaryCredential {
    fn get_token_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.token, &self.secret)
    }
}

/// Long-lived token obtained at the end of the handshake.
///
/// Provider specific fields (`screen_name`, `user_id`, ...) stay in
/// `extra_data`. The caller owns persistence of this value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
    #[serde(default)]
    pub extra_data: HashMap<String, String>,
}

impl AccessToken {
    pub fn new<TKey, TSecret>(token: TKey, secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        AccessToken {
            token: token.into(),
            secret: secret.into(),
            extra_data: HashMap::new(),
        }
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra_data.get(key).map(String::as_str)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &self.token)
            .field("extra_data", &self.extra_data)
            .finish_non_exhaustive()
    }
}

impl TokenSecretsProvider for AccessToken {
    fn get_token_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.token, &self.secret)
    }
}

#[derive(Debug, Clone)]
pub struct Secrets<'a, T> {
    token: T,
    token_secret: T,
    consumer_key: Cow<'a, str>,
    consumer_secret: Cow<'a, str>,
}

impl<'a> Secrets<'a, ()> {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            token: (),
            token_secret: (),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn token<TKey, TSecret>(
        self,
        token: TKey,
        token_secret: TSecret,
    ) -> Secrets<'a, Cow<'a, str>>
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            token: token.into(),
            token_secret: token_secret.into(),
            consumer_key: self.consumer_key,
            consumer_secret: self.consumer_secret,
        }
    }

    /// Attaches a temporary credential or access token.
    pub fn with_token<T>(self, provider: &'a T) -> Secrets<'a, Cow<'a, str>>
    where
        T: TokenSecretsProvider,
    {
        let (token, token_secret) = provider.get_token_pair();
        self.token(token, token_secret)
    }
}

impl SecretsProvider for Secrets<'_, ()> {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)> {
        None
    }
}

impl SecretsProvider for Secrets<'_, Cow<'_, str>> {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)> {
        Some((&self.token, &self.token_secret))
    }
}

impl TokenSecretsProvider for Secrets<'_, Cow<'_, str>> {
    fn get_token_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.token, &self.token_secret)
    }
}
