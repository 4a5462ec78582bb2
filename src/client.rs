// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use http::{Method, StatusCode};
use tracing::instrument;
use url::Url;

use crate::{
    AccessToken, ConsumerCredential, FileAttachment, ReqwestTransport, Result, SignError,
    Transport,
};

use super::request::RequestBuilder;

/// Where the signed protocol parameters travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterTransmission {
    /// `Authorization: OAuth ...`
    AuthorizationHeader,
    /// Appended to the query string.
    QueryString,
}

impl Default for ParameterTransmission {
    fn default() -> Self {
        ParameterTransmission::AuthorizationHeader
    }
}

/// Signs API calls on behalf of users who completed the handshake.
///
/// The client holds no per-user state; the access token is passed to every
/// request, so one client serves any number of users concurrently.
#[derive(Debug)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
    credential: ConsumerCredential,
    sign_multipart_fields: bool,
    realm: Option<String>,
    transmission: ParameterTransmission,
}

impl Client<ReqwestTransport> {
    /// Constructs a new `Client`.
    ///
    /// This method calls reqwest::Client::new() internally.
    pub fn new(credential: ConsumerCredential) -> Self {
        Client::with_transport(credential, ReqwestTransport::new())
    }

    /// Constructs a new `Client` with specifying inner `reqwest::Client`.
    pub fn new_with_client(credential: ConsumerCredential, client: reqwest::Client) -> Self {
        Client::with_transport(credential, ReqwestTransport::new_with_client(client))
    }
}

impl<T> Client<T>
where
    T: Transport,
{
    pub fn with_transport(credential: ConsumerCredential, transport: T) -> Self {
        Client {
            transport,
            credential,
            sign_multipart_fields: false,
            realm: None,
            transmission: ParameterTransmission::default(),
        }
    }

    /// Also sign the text fields of multipart uploads.
    ///
    /// Off by default: only the OAuth and query parameters of a multipart
    /// request are signed, which is what Twitter's upload endpoints expect.
    pub fn sign_multipart_fields(mut self, enabled: bool) -> Self {
        self.sign_multipart_fields = enabled;
        self
    }

    pub fn transmission_mode(mut self, transmission: ParameterTransmission) -> Self {
        self.transmission = transmission;
        self
    }

    /// `realm` sent with every request. Never signed.
    pub fn realm<R: Into<String>>(mut self, realm: R) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn credential(&self) -> &ConsumerCredential {
        &self.credential
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn signs_multipart_fields(&self) -> bool {
        self.sign_multipart_fields
    }

    pub fn realm_value(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn transmission(&self) -> ParameterTransmission {
        self.transmission
    }

    /// Convenience method to make a `GET` request to a URL.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn get<'a, U: AsRef<str>>(
        &'a self,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        self.request(Method::GET, url, token)
    }

    /// Convenience method to make a `POST` request to a URL.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn post<'a, U: AsRef<str>>(
        &'a self,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        self.request(Method::POST, url, token)
    }

    /// Convenience method to make a `PUT` request to a URL.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn put<'a, U: AsRef<str>>(
        &'a self,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        self.request(Method::PUT, url, token)
    }

    /// Convenience method to make a `PATCH` request to a URL.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn patch<'a, U: AsRef<str>>(
        &'a self,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        self.request(Method::PATCH, url, token)
    }

    /// Convenience method to make a `DELETE` request to a URL.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn delete<'a, U: AsRef<str>>(
        &'a self,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        self.request(Method::DELETE, url, token)
    }

    /// Convenience method to make a `HEAD` request to a URL.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn head<'a, U: AsRef<str>>(
        &'a self,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        self.request(Method::HEAD, url, token)
    }

    /// Start building a `Request` with the `Method` and `Url`.
    ///
    /// Returns a `RequestBuilder`, which will allow setting headers and
    /// request body before sending.
    ///
    /// # Errors
    ///
    /// The request fails on `send` whenever supplied `Url` cannot be parsed.
    pub fn request<'a, U: AsRef<str>>(
        &'a self,
        method: Method,
        url: U,
        token: &'a AccessToken,
    ) -> RequestBuilder<'a, T> {
        let url = url.as_ref();
        let parsed =
            Url::parse(url).map_err(|e| SignError::InvalidUrl(url.to_string(), e.to_string()));
        RequestBuilder::new(self, token, method, parsed)
    }

    /// One-shot authenticated call.
    ///
    /// `form_params` become the url-encoded body, or the text parts of a
    /// multipart body when `file` is given. Non-2xx answers are returned as
    /// `Error::Remote`.
    #[instrument(
        level = "debug",
        skip(self, access_token, form_params, file),
        fields(token = %access_token.token)
    )]
    pub async fn call(
        &self,
        method: Method,
        url: &str,
        access_token: &AccessToken,
        form_params: Option<&[(&str, &str)]>,
        file: Option<FileAttachment>,
    ) -> Result<(StatusCode, String)> {
        let mut builder = self.request(method, url, access_token);
        if let Some(form_params) = form_params {
            builder = builder.form(form_params);
        }
        if let Some(file) = file {
            builder = builder.file(file);
        }
        builder.send_text().await
    }
}
