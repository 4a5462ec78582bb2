//! Consumer configuration.
//!
//! Values come from any key/value source: a deserialized config file, the
//! environment, or a closure over the application's own settings. The
//! consumer secret is only validated here, never logged.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Client, Consumer, ConsumerCredential, CredentialStore, Error, ReqwestTransport, Result,
    ServiceDescription,
};

const CONSUMER_KEY: &str = "consumer_key";
const CONSUMER_SECRET: &str = "consumer_secret";
const REQUEST_TOKEN_URL: &str = "request_token_url";
const AUTHORIZE_URL: &str = "authorize_url";
const ACCESS_TOKEN_URL: &str = "access_token_url";
const TIMEOUT_SECS: &str = "timeout_secs";
const USER_AGENT: &str = "user_agent";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default)]
    pub service: ServiceDescription,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl fmt::Debug for ConsumerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("service", &self.service)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ConsumerConfig {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        ConsumerConfig {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            service: ServiceDescription::default(),
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }

    /// Reads `consumer_key`, `consumer_secret` and the optional
    /// `request_token_url`, `authorize_url`, `access_token_url`,
    /// `timeout_secs`, `user_agent` through `lookup`.
    ///
    /// Missing endpoints fall back to Twitter's.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| Error::Configuration(format!("{} is not set", key)))
        };
        let mut config = ConsumerConfig::new(required(CONSUMER_KEY)?, required(CONSUMER_SECRET)?);

        let defaults = ServiceDescription::default();
        config.service = ServiceDescription::new(
            lookup(REQUEST_TOKEN_URL).unwrap_or(defaults.request_token_url),
            lookup(AUTHORIZE_URL).unwrap_or(defaults.authorize_url),
            lookup(ACCESS_TOKEN_URL).unwrap_or(defaults.access_token_url),
        );
        if let Some(timeout) = lookup(TIMEOUT_SECS) {
            config.timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::Configuration(format!("{} must be a number, got: {}", TIMEOUT_SECS, timeout))
            })?;
        }
        config.user_agent = lookup(USER_AGENT);
        config.validate()?;
        Ok(config)
    }

    /// Same as [`from_lookup`](Self::from_lookup) with upper-cased keys read
    /// from the environment, e.g. `TWITTER_CONSUMER_KEY` for prefix `TWITTER`.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(|key| {
            std::env::var(format!("{}_{}", prefix, key.to_uppercase())).ok()
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.credential()?;
        self.service.validate()?;
        if self.timeout_secs == 0 {
            return Err(Error::Configuration(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fails fast on an empty key or secret.
    pub fn credential(&self) -> Result<ConsumerCredential> {
        ConsumerCredential::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
    }

    pub fn transport(&self) -> Result<ReqwestTransport> {
        ReqwestTransport::with_timeout(self.timeout(), self.user_agent.as_deref())
    }

    pub fn consumer<S: CredentialStore>(&self, store: S) -> Result<Consumer<S>> {
        self.validate()?;
        Ok(Consumer::with_transport(
            self.credential()?,
            self.service.clone(),
            store,
            self.transport()?,
        ))
    }

    pub fn client(&self) -> Result<Client> {
        Ok(Client::with_transport(self.credential()?, self.transport()?))
    }
}
