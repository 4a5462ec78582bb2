// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use std::convert::TryFrom;
use std::time::Duration;

use http::{
    header::{HeaderName, HeaderValue, AUTHORIZATION},
    HeaderMap, Method, StatusCode,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    AccessToken, Client, Error, FileAttachment, OAuthParameters, ParameterTransmission,
    RequestBody, Result, SignError, SignedRequest, Signer, Transport, TransportRequest,
    TransportResponse,
};

/// A request signed with an access token on `send`.
pub struct RequestBuilder<'a, T> {
    client: &'a Client<T>,
    token: &'a AccessToken,
    method: Method,
    url: std::result::Result<Url, SignError>,
    form: Vec<(String, String)>,
    file: Option<FileAttachment>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    error: Option<Error>,
}

impl<'a, T> RequestBuilder<'a, T>
where
    T: Transport,
{
    pub(crate) fn new(
        client: &'a Client<T>,
        token: &'a AccessToken,
        method: Method,
        url: std::result::Result<Url, SignError>,
    ) -> Self {
        RequestBuilder {
            client,
            token,
            method,
            url,
            form: Vec::new(),
            file: None,
            headers: HeaderMap::new(),
            timeout: None,
            error: None,
        }
    }

    fn fail(mut self, err: Error) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    /// Modify the query string of the URL.
    ///
    /// Modifies the URL of this request, adding the parameters provided.
    /// This method appends and does not overwrite. This means that it can
    /// be called multiple times and that existing query parameters are not
    /// overwritten if the same key is used. The key will simply show up
    /// twice in the query string.
    /// Calling `.query(&[("foo", "a"), ("foo", "b")])` gives `"foo=a&foo=b"`.
    ///
    /// Query parameters are always part of the signature.
    pub fn query<S: Serialize + ?Sized>(mut self, query: &S) -> Self {
        let url = match self.url {
            Ok(ref mut url) => url,
            Err(_) => return self,
        };
        let result = {
            let mut pairs = url.query_pairs_mut();
            let serializer = serde_urlencoded::Serializer::new(&mut pairs);
            query.serialize(serializer).map(|_| ())
        };
        // cleanup
        if let Some("") = url.query() {
            url.set_query(None);
        }
        match result {
            Ok(()) => self,
            Err(err) => self.fail(SignError::UnencodableParameter(err.to_string()).into()),
        }
    }

    /// Send a form body.
    ///
    /// Without a file attachment the body is `application/x-www-form-urlencoded`
    /// and every field is signed. With one, the fields become the text parts
    /// of the multipart body.
    pub fn form<S: Serialize + ?Sized>(mut self, form: &S) -> Self {
        let encoded = match serde_urlencoded::to_string(form) {
            Ok(encoded) => encoded,
            Err(err) => return self.fail(SignError::UnencodableParameter(err.to_string()).into()),
        };
        self.form
            .extend(url::form_urlencoded::parse(encoded.as_bytes()).into_owned());
        self
    }

    /// Attach a file, turning the body into `multipart/form-data`.
    ///
    /// The file bytes never take part in the signature.
    pub fn file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    /// Add a `Header` to this Request.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let name = match HeaderName::try_from(key) {
            Ok(name) => name,
            Err(err) => return self.fail(Error::transport(Into::<http::Error>::into(err))),
        };
        let value = match HeaderValue::try_from(value) {
            Ok(value) => value,
            Err(err) => return self.fail(Error::transport(Into::<http::Error>::into(err))),
        };
        self.headers.append(name, value);
        self
    }

    /// Add a set of Headers to the existing ones on this Request.
    ///
    /// The headers will be merged in to any already set.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Enables a request timeout.
    ///
    /// The timeout is applied from the when the request starts connecting
    /// until the response body has finished.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parameters that take part in the signature besides the query.
    fn signed_payload(&self) -> &[(String, String)] {
        match self.file {
            Some(_) if !self.client.signs_multipart_fields() => &[],
            _ => &self.form,
        }
    }

    /// Signs the request with a fresh nonce and timestamp.
    pub fn sign(&self) -> Result<SignedRequest> {
        let url = self.url.as_ref().map_err(Clone::clone)?;
        let secrets = self.client.credential().secrets().with_token(self.token);
        let mut params = OAuthParameters::new();
        if let Some(realm) = self.client.realm_value() {
            params = params.realm(realm);
        }
        let signed =
            Signer::new(&secrets, params).sign_request(&self.method, url, self.signed_payload())?;
        Ok(signed)
    }

    /// Signs and assembles the request without sending it.
    pub fn build(self) -> Result<TransportRequest> {
        let signed = self.sign();
        let RequestBuilder {
            method,
            url,
            form,
            file,
            mut headers,
            timeout,
            error,
            client,
            ..
        } = self;
        if let Some(err) = error {
            return Err(err);
        }
        let signed = signed?;
        let mut url = url?;

        match client.transmission() {
            ParameterTransmission::AuthorizationHeader => {
                let value = HeaderValue::from_str(&signed.authorization_header())
                    .map_err(Error::transport)?;
                headers.insert(AUTHORIZATION, value);
            }
            ParameterTransmission::QueryString => {
                url.query_pairs_mut().extend_pairs(signed.query_pairs());
            }
        }

        let body = match file {
            Some(file) => RequestBody::Multipart { fields: form, file },
            None if form.is_empty() => RequestBody::Empty,
            None => RequestBody::Form(form),
        };
        Ok(TransportRequest {
            method,
            url,
            headers,
            body,
            timeout,
        })
    }

    /// Constructs the Request and sends it to the target URL.
    ///
    /// # Errors
    ///
    /// Non-2xx answers become `Error::Remote`; 401 and 403 are reported by
    /// [`Error::is_authorization_failure`]. Nothing is retried.
    #[instrument(skip(self), fields(method = %self.method))]
    pub async fn send(self) -> Result<TransportResponse> {
        let client = self.client;
        let request = self.build()?;
        let response = client.transport().execute(request).await?;
        if response.is_success() {
            debug!(status = %response.status, "request succeeded");
            Ok(response)
        } else {
            warn!(status = %response.status, "service rejected request");
            Err(Error::Remote {
                status: response.status,
                body: response.body,
            })
        }
    }

    /// Like [`send`](Self::send), returning the status and the body.
    pub async fn send_text(self) -> Result<(StatusCode, String)> {
        let response = self.send().await?;
        Ok((response.status, response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{header_param, ScriptedTransport};
    use crate::ConsumerCredential;

    fn client(transport: ScriptedTransport) -> Client<ScriptedTransport> {
        Client::with_transport(ConsumerCredential::new("ck", "cs").unwrap(), transport)
    }

    #[test]
    fn capture_get_query() {
        let client = client(ScriptedTransport::new());
        let token = AccessToken::new("tok2", "sec2");
        let request = client
            .get("https://photos.example.net/photos?file=vacation.jpg", &token)
            .query(&[("size", "original")])
            .build()
            .unwrap();
        assert_eq!(
            request.url.query(),
            Some("file=vacation.jpg&size=original")
        );
        assert_eq!(request.body, RequestBody::Empty);
        assert!(request.headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn capture_body() {
        let client = client(ScriptedTransport::new());
        let token = AccessToken::new("tok2", "sec2");
        let request = client
            .post("https://api.twitter.com/1.1/statuses/update.json", &token)
            .form(&[
                ("include_entities", "true"),
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ])
            .build()
            .unwrap();
        assert_eq!(
            request.body,
            RequestBody::Form(vec![
                ("include_entities".to_string(), "true".to_string()),
                (
                    "status".to_string(),
                    "Hello Ladies + Gentlemen, a signed OAuth request!".to_string()
                ),
            ])
        );
    }

    #[test]
    fn form_fields_are_signed_but_file_bytes_are_not() {
        let client = client(ScriptedTransport::new());
        let token = AccessToken::new("tok2", "sec2");
        let url = "https://api.twitter.com/1.1/account/update_profile_image.json";

        let plain = client.post(url, &token).form(&[("skip_status", "true")]);
        assert_eq!(plain.signed_payload().len(), 1);

        let upload = client
            .post(url, &token)
            .form(&[("skip_status", "true")])
            .file(FileAttachment::new("image", "me.png", vec![1, 2, 3]));
        assert!(upload.signed_payload().is_empty());
        match upload.build().unwrap().body {
            RequestBody::Multipart { fields, file } => {
                assert_eq!(fields, vec![("skip_status".to_string(), "true".to_string())]);
                assert_eq!(file.bytes, vec![1, 2, 3]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let client = client_signing_fields();
        let upload = client
            .post(url, &token)
            .form(&[("skip_status", "true")])
            .file(FileAttachment::new("image", "me.png", vec![1, 2, 3]));
        assert_eq!(upload.signed_payload().len(), 1);
    }

    fn client_signing_fields() -> Client<ScriptedTransport> {
        client(ScriptedTransport::new()).sign_multipart_fields(true)
    }

    #[test]
    fn query_transmission_moves_parameters_into_url() {
        let client = client(ScriptedTransport::new())
            .transmission_mode(ParameterTransmission::QueryString);
        let token = AccessToken::new("tok2", "sec2");
        let request = client
            .get("https://api.twitter.com/1.1/statuses/home_timeline.json?count=5", &token)
            .build()
            .unwrap();
        assert!(!request.headers.contains_key(AUTHORIZATION));
        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("count".to_string(), "5".to_string()));
        for key in &["oauth_consumer_key", "oauth_nonce", "oauth_signature", "oauth_token"] {
            assert!(pairs.iter().any(|(k, _)| k == key), "{} missing", key);
        }
    }

    #[test]
    fn invalid_input_surfaces_as_sign_error() {
        let client = client(ScriptedTransport::new());
        let token = AccessToken::new("tok2", "sec2");
        assert!(matches!(
            client.get("not a url", &token).build(),
            Err(Error::Signer(SignError::InvalidUrl(_, _)))
        ));
        assert!(matches!(
            client
                .get("https://example.com/", &token)
                .query(&[("oauth_timestamp", "1")])
                .build(),
            Err(Error::Signer(SignError::UnconfigurableParameter(_)))
        ));
        assert!(matches!(
            client
                .get("https://example.com/", &token)
                .header("bad header", "x")
                .build(),
            Err(Error::Transport(_))
        ));
    }

    #[tokio::test]
    async fn send_maps_status_codes() {
        let client = client(
            ScriptedTransport::new()
                .respond(StatusCode::OK, "[]")
                .respond(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        );
        let token = AccessToken::new("tok2", "sec2");

        let (status, body) = client
            .get("https://api.twitter.com/1.1/statuses/home_timeline.json", &token)
            .send_text()
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");

        let err = client
            .get("https://api.twitter.com/1.1/statuses/home_timeline.json", &token)
            .send()
            .await
            .unwrap_err();
        assert!(err.is_authorization_failure());

        let header = client.transport().authorization(0);
        assert_eq!(header_param(&header, "oauth_token").as_deref(), Some("tok2"));
    }
}
