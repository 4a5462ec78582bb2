/*!
reqwest-oauth1-consumer: the OAuth 1.0a consumer side, on top of reqwest.

# Overview

This library runs the three-legged OAuth 1.0a handshake (temporary
credential, user authorization, access token) and signs API calls with
HMAC-SHA1 once a user has authorized the application. Signing is
self-contained; HTTP goes through [`Transport`], implemented for
[reqwest](https://crates.io/crates/reqwest) by [`ReqwestTransport`].

The temporary secret has to survive the browser round trip to the
provider. It lives in a [`CredentialStore`]: [`MemoryCredentialStore`] for
native applications, [`CookieCredentialStore`] when the callback may land on
another process.

# How to use

## Basic usecase 1 - Acquiring OAuth token & secret

```rust,ignore
use reqwest_oauth1_consumer::{
    ConsumerCredential, Consumer, MemoryCredentialStore, ServiceDescription,
};

let credential = ConsumerCredential::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;
let consumer = Consumer::new(
    credential,
    ServiceDescription::twitter(),
    MemoryCredentialStore::new(),
);

// step 1 & 2: acquire a temporary credential and send the user away
let redirect = consumer
    .begin_authorization("https://example.com/callback", false)
    .await?;
println!("please access to: {}", redirect);

// step 3: the provider calls back with oauth_token & oauth_verifier
let callback = "https://example.com/callback?oauth_token=...&oauth_verifier=...";
match consumer.complete_authorization(callback).await? {
    Some(token) => println!("welcome, {:?}", token.extra("screen_name")),
    None => println!("authorization denied"),
}
```

## Basic usecase 2 - sending the tweet

```rust,ignore
use reqwest_oauth1_consumer::{AccessToken, Client, ConsumerCredential};

let credential = ConsumerCredential::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;
let token = AccessToken::new("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let client = Client::new(credential);
let resp = client
    .post("https://api.twitter.com/1.1/statuses/update.json", &token)
    .form(&[("status", "Hello, Twitter!")])
    .send()
    .await?;
```
*/
mod client;
mod config;
mod consumer;
mod error;
mod request;
mod secrets;
mod signer;
mod store;
mod token_reader;
mod transport;

// exposed to external program
pub use client::{Client, ParameterTransmission};
pub use config::ConsumerConfig;
pub use consumer::{
    AuthorizationRequest, AuthorizationResponse, Callback, Consumer, HandshakeState,
    ServiceDescription,
};
pub use error::{
    BoxError, Error, HandshakeError, Result, SignError, SignResult, TokenReaderError,
    TokenReaderResult,
};
pub use request::RequestBuilder;
pub use secrets::{
    AccessToken, ConsumerCredential, Secrets, SecretsProvider, TemporaryCredential,
    TokenSecretsProvider,
};
pub use signer::{
    generate_nonce, normalize_url, percent_encode, sign, signature_base_string, OAuthParameters,
    SignedRequest, Signer,
};
pub use store::{CookieCredentialStore, CredentialStore, MemoryCredentialStore, COOKIE_KEY_SIZE};
pub use token_reader::{TokenReader, TokenResponse};
pub use transport::{
    FileAttachment, RequestBody, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_callback_confirmed`.
pub const OAUTH_CALLBACK_CONFIRMED_KEY: &str = "oauth_callback_confirmed";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_token_secret`.
pub const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";
/// Query parameter Twitter adds to the callback when the user declines.
pub const OAUTH_DENIED_KEY: &str = "denied";
/// The only supported signature method.
pub const HMAC_SHA1: &str = "HMAC-SHA1";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
