//! The three-legged handshake.

use std::collections::HashMap;
use std::sync::Mutex;

use http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{
    AccessToken, ConsumerCredential, CredentialStore, Error, HandshakeError, OAuthParameters,
    ReqwestTransport, RequestBody, Result, SignError, Signer, TemporaryCredential, TokenReader,
    Transport, TransportRequest, TransportResponse, OAUTH_DENIED_KEY, OAUTH_TOKEN_KEY,
    OAUTH_VERIFIER_KEY,
};

const FORCE_LOGIN_KEY: &str = "force_login";
const TWITTER_REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";
const TWITTER_AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authorize";
const TWITTER_AUTHENTICATE_URL: &str = "https://api.twitter.com/oauth/authenticate";
const TWITTER_ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";

/// The three endpoints of an OAuth 1.0a provider.
///
/// "Sign in with Twitter" differs from the classic flow only by its
/// authorization endpoint, see [`ServiceDescription::twitter_sign_in`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescription {
    pub request_token_url: String,
    pub authorize_url: String,
    pub access_token_url: String,
}

impl ServiceDescription {
    pub fn new<TRequest, TAuthorize, TAccess>(
        request_token_url: TRequest,
        authorize_url: TAuthorize,
        access_token_url: TAccess,
    ) -> Self
    where
        TRequest: Into<String>,
        TAuthorize: Into<String>,
        TAccess: Into<String>,
    {
        ServiceDescription {
            request_token_url: request_token_url.into(),
            authorize_url: authorize_url.into(),
            access_token_url: access_token_url.into(),
        }
    }

    /// Twitter, user authorizes the application on every handshake.
    pub fn twitter() -> Self {
        Self::new(
            TWITTER_REQUEST_TOKEN_URL,
            TWITTER_AUTHORIZE_URL,
            TWITTER_ACCESS_TOKEN_URL,
        )
    }

    /// "Sign in with Twitter": already authorized users are sent straight back.
    pub fn twitter_sign_in() -> Self {
        Self::new(
            TWITTER_REQUEST_TOKEN_URL,
            TWITTER_AUTHENTICATE_URL,
            TWITTER_ACCESS_TOKEN_URL,
        )
    }

    /// Fails with `Error::Configuration` if an endpoint does not parse.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in &[
            ("request_token_url", &self.request_token_url),
            ("authorize_url", &self.authorize_url),
            ("access_token_url", &self.access_token_url),
        ] {
            Url::parse(url)
                .map_err(|e| Error::Configuration(format!("{} {:?} : {}", name, url, e)))?;
        }
        Ok(())
    }
}

impl Default for ServiceDescription {
    fn default() -> Self {
        Self::twitter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    TemporaryCredentialRequested,
    AwaitingUserAuthorization,
    Completed,
    Failed,
}

impl HandshakeState {
    /// `Completed` or `Failed`: no further step follows on this handshake.
    pub fn is_terminal(self) -> bool {
        matches!(self, HandshakeState::Completed | HandshakeState::Failed)
    }
}

/// Input for the authorization redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub temporary_credential: TemporaryCredential,
    pub callback_url: String,
    pub force_reauth: bool,
}

/// What the service appended to the callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub token: String,
    pub verifier: String,
    pub extra_data: HashMap<String, String>,
}

/// Outcome of reading a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Authorized(AuthorizationResponse),
    /// The user refused; carries the temporary token when the service names it.
    Denied(Option<String>),
    /// Not an OAuth callback at all.
    Unrecognized,
}

impl AuthorizationResponse {
    /// Parses a full callback URL or its bare query string.
    pub fn from_callback(callback: &str) -> Callback {
        let query = match callback.find('?') {
            Some(index) => &callback[index + 1..],
            None if callback.contains("://") => "",
            None => callback,
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        if let Some(denied) = params.remove(OAUTH_DENIED_KEY) {
            return Callback::Denied(Some(denied).filter(|t| !t.is_empty()));
        }
        match (
            params.remove(OAUTH_TOKEN_KEY),
            params.remove(OAUTH_VERIFIER_KEY),
        ) {
            (Some(token), Some(verifier)) if !token.is_empty() && !verifier.is_empty() => {
                Callback::Authorized(AuthorizationResponse {
                    token,
                    verifier,
                    extra_data: params,
                })
            }
            (Some(token), _) if !token.is_empty() => Callback::Denied(Some(token)),
            _ => Callback::Unrecognized,
        }
    }
}

/// Drives the handshake for one application.
///
/// Nothing that is needed to finish a handshake lives in the `Consumer`
/// itself: the temporary secret goes to the [`CredentialStore`], so the
/// callback can be served by another instance or another process.
#[derive(Debug)]
pub struct Consumer<S, T = ReqwestTransport> {
    credential: ConsumerCredential,
    service: ServiceDescription,
    store: S,
    transport: T,
    state: Mutex<HandshakeState>,
}

impl<S> Consumer<S, ReqwestTransport>
where
    S: CredentialStore,
{
    pub fn new(credential: ConsumerCredential, service: ServiceDescription, store: S) -> Self {
        Consumer::with_transport(credential, service, store, ReqwestTransport::new())
    }
}

impl<S, T> Consumer<S, T>
where
    S: CredentialStore,
    T: Transport,
{
    pub fn with_transport(
        credential: ConsumerCredential,
        service: ServiceDescription,
        store: S,
        transport: T,
    ) -> Self {
        Consumer {
            credential,
            service,
            store,
            transport,
            state: Mutex::new(HandshakeState::Idle),
        }
    }

    pub fn credential(&self) -> &ConsumerCredential {
        &self.credential
    }

    pub fn service(&self) -> &ServiceDescription {
        &self.service
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// State of the handshake last driven through this instance.
    ///
    /// A `Consumer` shared between users runs their handshakes interleaved;
    /// this then reflects whichever handshake moved last. Per-user progress is
    /// the result of each `begin_authorization` / `complete_authorization`
    /// call, not this value.
    pub fn state(&self) -> HandshakeState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(HandshakeState::Failed)
    }

    fn transition(&self, next: HandshakeState) {
        if let Ok(mut state) = self.state.lock() {
            debug!(from = ?*state, to = ?next, "handshake transition");
            *state = next;
        }
    }

    fn fail<E: Into<Error>>(&self, err: E) -> Error {
        self.transition(HandshakeState::Failed);
        let err = err.into();
        warn!(error = %err, "handshake failed");
        err
    }

    /// Step 1 and 2: obtain a temporary credential, remember its secret and
    /// return the URL the user has to visit.
    #[instrument(skip(self))]
    pub async fn begin_authorization(&self, callback_url: &str, force_reauth: bool) -> Result<Url> {
        self.transition(HandshakeState::TemporaryCredentialRequested);

        let temporary = self
            .request_temporary_credential(callback_url)
            .await
            .map_err(|e| self.fail(e))?;
        self.store
            .put(&temporary.token, &temporary.secret)
            .await
            .map_err(|e| self.fail(e))?;
        self.transition(HandshakeState::AwaitingUserAuthorization);
        info!(token = %temporary.token, "temporary credential issued");

        self.authorization_url(&AuthorizationRequest {
            temporary_credential: temporary,
            callback_url: callback_url.to_string(),
            force_reauth,
        })
    }

    async fn request_temporary_credential(&self, callback_url: &str) -> Result<TemporaryCredential> {
        let secrets = self.credential.secrets();
        let params = OAuthParameters::new().callback(callback_url);
        let response = self
            .post_signed(
                &Signer::new(&secrets, params),
                &self.service.request_token_url,
            )
            .await
            .map_err(|e| temporary_rejected(None, e.to_string()))?;

        if !response.is_success() {
            return Err(temporary_rejected(Some(response.status), response.body));
        }
        let temporary = response
            .parse_oauth_token()
            .map_err(|e| temporary_rejected(Some(response.status), e.to_string()))?
            .into_temporary_credential();
        if !temporary.callback_confirmed {
            return Err(HandshakeError::CallbackNotConfirmed.into());
        }
        Ok(temporary)
    }

    /// The authorization endpoint with `oauth_token` (and `force_login=true`).
    pub fn authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
        let mut url = Url::parse(&self.service.authorize_url)
            .map_err(|e| SignError::InvalidUrl(self.service.authorize_url.clone(), e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(OAUTH_TOKEN_KEY, &request.temporary_credential.token);
            if request.force_reauth {
                query.append_pair(FORCE_LOGIN_KEY, "true");
            }
        }
        Ok(url)
    }

    /// Step 3: turn the callback into an access token.
    ///
    /// Returns `Ok(None)` when the user denied access or `callback` carries no
    /// OAuth parameters; the store is left untouched since such a callback
    /// proves nothing about who sent it. Stale entries go away through
    /// [`abandon_authorization`](Self::abandon_authorization) or cookie expiry.
    /// An `oauth_token` the store does not know fails with
    /// `HandshakeError::UnknownTemporaryCredential` before anything is sent.
    #[instrument(skip(self, callback))]
    pub async fn complete_authorization(&self, callback: &str) -> Result<Option<AccessToken>> {
        let response = match AuthorizationResponse::from_callback(callback) {
            Callback::Authorized(response) => response,
            Callback::Denied(token) => {
                info!(token = ?token, "user denied authorization");
                return Ok(None);
            }
            Callback::Unrecognized => {
                debug!("callback carries no oauth parameters");
                return Ok(None);
            }
        };

        let stored = self
            .store
            .get(&response.token)
            .await
            .map_err(|e| self.fail(e))?;
        let secret = match stored {
            Some(secret) => secret,
            None => {
                return Err(self.fail(HandshakeError::UnknownTemporaryCredential(
                    response.token,
                )))
            }
        };
        let temporary = TemporaryCredential {
            token: response.token,
            secret,
            callback_confirmed: true,
        };

        let access = self
            .exchange(&temporary, &response.verifier)
            .await
            .map_err(|e| self.fail(e))?;
        // best effort: the remote has already spent the temporary token
        if let Err(err) = self.store.remove(&temporary.token).await {
            warn!(token = %temporary.token, error = %err, "failed to remove temporary credential");
        }
        self.transition(HandshakeState::Completed);
        info!(extra = ?access.extra_data.keys().collect::<Vec<_>>(), "access token issued");
        Ok(Some(access))
    }

    async fn exchange(&self, temporary: &TemporaryCredential, verifier: &str) -> Result<AccessToken> {
        let secrets = self.credential.secrets().with_token(temporary);
        let params = OAuthParameters::new().verifier(verifier);
        let response = self
            .post_signed(&Signer::new(&secrets, params), &self.service.access_token_url)
            .await
            .map_err(|e| access_rejected(None, e.to_string()))?;

        if !response.is_success() {
            return Err(access_rejected(Some(response.status), response.body));
        }
        let access = response
            .parse_oauth_token()
            .map_err(|e| access_rejected(Some(response.status), e.to_string()))?
            .into_access_token();
        Ok(access)
    }

    /// Forget a handshake that will not be completed.
    pub async fn abandon_authorization(&self, token: &str) -> Result<()> {
        self.store.remove(token).await?;
        self.transition(HandshakeState::Failed);
        Ok(())
    }

    async fn post_signed<P>(&self, signer: &Signer<'_, P>, endpoint: &str) -> Result<TransportResponse>
    where
        P: crate::SecretsProvider,
    {
        let url = Url::parse(endpoint)
            .map_err(|e| SignError::InvalidUrl(endpoint.to_string(), e.to_string()))?;
        let no_payload: &[(&str, &str)] = &[];
        let header = signer.generate_signature(&Method::POST, &url, no_payload)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&header).map_err(Error::transport)?,
        );
        self.transport
            .execute(TransportRequest {
                method: Method::POST,
                url,
                headers,
                body: RequestBody::Empty,
                timeout: None,
            })
            .await
    }
}

fn temporary_rejected(status: Option<http::StatusCode>, detail: String) -> Error {
    HandshakeError::TemporaryCredentialRejected { status, detail }.into()
}

fn access_rejected(status: Option<http::StatusCode>, detail: String) -> Error {
    HandshakeError::AccessTokenRejected { status, detail }.into()
}
