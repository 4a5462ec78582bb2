use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;
use url::Url;

use crate::{
    SecretsProvider, SignError, SignResult, HMAC_SHA1, OAUTH_CALLBACK_KEY, OAUTH_CONSUMER_KEY,
    OAUTH_KEY_PREFIX, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY,
    OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY, OAUTH_VERSION_KEY, REALM_KEY,
};

/// RFC 3986 unreserved characters stay as they are; everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LENGTH: usize = 32;

/// Parameters the signer fills in itself. Callers may not pass them in.
const GENERATED_PARAMETERS: &[&str] = &[
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE_KEY,
    OAUTH_SIGNATURE_KEY,
    OAUTH_SIGNATURE_METHOD_KEY,
    OAUTH_TIMESTAMP_KEY,
    OAUTH_TOKEN_KEY,
    OAUTH_VERSION_KEY,
];

/// Parameters a request may legitimately carry outside the Authorization header.
const PASS_THROUGH_PARAMETERS: &[&str] = &[OAUTH_CALLBACK_KEY, OAUTH_VERIFIER_KEY];

/// Percent-encodes `input` with the OAuth rules (RFC 5849, section 3.6).
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Base string URI: scheme and host lowercased, default port dropped, no query.
pub fn normalize_url(url: &Url) -> SignResult<String> {
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SignError::InvalidUrl(
                url.to_string(),
                format!("unsupported scheme {}", other),
            ))
        }
    }
    let host = url
        .host_str()
        .ok_or_else(|| SignError::InvalidUrl(url.to_string(), "missing host".to_string()))?;
    // `Url` already omits the port when it is the scheme default.
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    Ok(format!(
        "{}://{}{}{}",
        url.scheme(),
        host.to_lowercase(),
        port,
        url.path()
    ))
}

/// Builds the signature base string.
///
/// `parameters` holds the oauth_* protocol parameters and any form body
/// parameters; query parameters are taken from `url` itself. Pairs are
/// encoded first and then sorted by key, then by value.
pub fn signature_base_string<K, V>(
    method: &Method,
    url: &Url,
    parameters: &[(K, V)],
) -> SignResult<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let base_url = normalize_url(url)?;

    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .chain(
            parameters
                .iter()
                .filter(|(k, _)| k.as_ref() != OAUTH_SIGNATURE_KEY && k.as_ref() != REALM_KEY)
                .map(|(k, v)| (percent_encode(k.as_ref()), percent_encode(v.as_ref()))),
        )
        .collect();
    encoded.sort();

    let normalized_parameters = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.as_str().to_uppercase(),
        percent_encode(&base_url),
        percent_encode(&normalized_parameters)
    ))
}

/// Computes an HMAC-SHA1 signature for an outgoing request.
///
/// `parameters` must already contain the oauth_* protocol parameters.
/// An empty consumer secret is legal and yields a key starting with `&`.
pub fn sign<K, V>(
    method: &str,
    url: &str,
    parameters: &[(K, V)],
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> SignResult<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let method = parse_method(method)?;
    let url = Url::parse(url).map_err(|e| SignError::InvalidUrl(url.to_string(), e.to_string()))?;
    let base_string = signature_base_string(&method, &url, parameters)?;
    hmac_sha1(&signing_key(consumer_secret, token_secret), &base_string)
}

pub(crate) fn parse_method(method: &str) -> SignResult<Method> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| SignError::InvalidMethod(method.to_string()))
}

fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or(""))
    )
}

fn hmac_sha1(key: &str, data: &str) -> SignResult<String> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| SignError::InvalidKey(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Random alphanumeric nonce.
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

fn current_timestamp() -> SignResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SignError::InvalidTimestamp(e.to_string()))
}

/// One signed outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: Method,
    url: Url,
    timestamp: u64,
    nonce: String,
    signature: String,
    realm: Option<String>,
    oauth_parameters: Vec<(String, String)>,
}

impl SignedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// oauth_* parameters that went into the signature, sorted by key.
    pub fn oauth_parameters(&self) -> &[(String, String)] {
        &self.oauth_parameters
    }

    /// All protocol parameters including `oauth_signature`, sorted by key.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.oauth_parameters.clone();
        pairs.push((OAUTH_SIGNATURE_KEY.to_string(), self.signature.clone()));
        pairs.sort();
        pairs
    }

    /// `OAuth realm="...", oauth_consumer_key="...", ...`
    pub fn authorization_header(&self) -> String {
        let realm = self
            .realm
            .as_ref()
            .map(|realm| (REALM_KEY.to_string(), realm.clone()));
        let items = realm
            .into_iter()
            .chain(self.query_pairs())
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(&k), percent_encode(&v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {}", items)
    }
}

#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a>,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: OAuthParameters<'a>) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Signs a request whose `payload` holds the form-encoded body parameters
    /// (pass nothing for multipart bodies). Query parameters come from `url`.
    pub fn sign_request<K, V>(
        &self,
        method: &Method,
        url: &Url,
        payload: &[(K, V)],
    ) -> SignResult<SignedRequest>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();

        let query_keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        for key in query_keys
            .iter()
            .map(String::as_str)
            .chain(payload.iter().map(|(k, _)| k.as_ref()))
        {
            check_parameter(key)?;
        }

        let timestamp = match self.parameters.timestamp {
            Some(timestamp) => timestamp,
            None => current_timestamp()?,
        };
        let nonce = match self.parameters.nonce {
            Some(ref nonce) => nonce.to_string(),
            None => generate_nonce(),
        };

        let mut oauth_parameters =
            self.parameters
                .build_protocol_parameters(consumer_key, token, &nonce, timestamp);
        oauth_parameters.sort();

        let signed: Vec<(&str, &str)> = oauth_parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(payload.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
            .collect();
        let base_string = signature_base_string(method, url, &signed)?;
        let signature = hmac_sha1(&signing_key(consumer_secret, token_secret), &base_string)?;

        Ok(SignedRequest {
            method: method.clone(),
            url: url.clone(),
            timestamp,
            nonce,
            signature,
            realm: self.parameters.realm.as_ref().map(|r| r.to_string()),
            oauth_parameters,
        })
    }

    /// Returns the value for the `Authorization` header.
    pub fn generate_signature<K, V>(
        &self,
        method: &Method,
        url: &Url,
        payload: &[(K, V)],
    ) -> SignResult<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(self.sign_request(method, url, payload)?.authorization_header())
    }
}

fn check_parameter(key: &str) -> SignResult<()> {
    if !key.starts_with(OAUTH_KEY_PREFIX) || PASS_THROUGH_PARAMETERS.contains(&key) {
        Ok(())
    } else if GENERATED_PARAMETERS.contains(&key) {
        Err(SignError::UnconfigurableParameter(key.to_string()))
    } else {
        Err(SignError::UnknownParameter(key.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
}

impl<'a> Default for OAuthParameters<'a> {
    fn default() -> Self {
        OAuthParameters {
            callback: None,
            nonce: None,
            realm: None,
            timestamp: None,
            verifier: None,
            version: true,
        }
    }
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_callback value
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value
    ///
    /// Only meant for reproducing known signatures; a fixed nonce must never
    /// be reused against a live service.
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value (sent in the header, never signed)
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// set the oauth_version value (boolean)
    ///
    /// # Note
    /// When the version has value `true` (the default), oauth_version will be
    /// set with "1.0". Otherwise, oauth_version will not be included in your
    /// request.
    pub fn version<T>(self, version: T) -> Self
    where
        T: Into<bool>,
    {
        OAuthParameters {
            version: version.into(),
            ..self
        }
    }

    fn build_protocol_parameters(
        &self,
        consumer_key: &str,
        token: Option<&str>,
        nonce: &str,
        timestamp: u64,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            (OAUTH_CONSUMER_KEY.to_string(), consumer_key.to_string()),
            (OAUTH_NONCE_KEY.to_string(), nonce.to_string()),
            (OAUTH_SIGNATURE_METHOD_KEY.to_string(), HMAC_SHA1.to_string()),
            (OAUTH_TIMESTAMP_KEY.to_string(), timestamp.to_string()),
        ];
        if let Some(ref callback) = self.callback {
            params.push((OAUTH_CALLBACK_KEY.to_string(), callback.to_string()));
        }
        if let Some(token) = token {
            params.push((OAUTH_TOKEN_KEY.to_string(), token.to_string()));
        }
        if let Some(ref verifier) = self.verifier {
            params.push((OAUTH_VERIFIER_KEY.to_string(), verifier.to_string()));
        }
        if self.version {
            params.push((OAUTH_VERSION_KEY.to_string(), "1.0".to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Secrets;

    const NO_PAYLOAD: &[(&str, &str)] = &[];

    fn twitter_status_update() -> (Url, Vec<(&'static str, &'static str)>) {
        (
            Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap(),
            vec![
                ("include_entities", "true"),
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ],
        )
    }

    #[test]
    fn percent_encode_follows_rfc3986() {
        // https://developer.twitter.com/en/docs/authentication/oauth-1-0a/percent-encoding-parameters
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
        assert_eq!(percent_encode("test-value_1.2~"), "test-value_1.2~");
    }

    #[test]
    fn normalize_url_drops_default_port_and_query() {
        let url = Url::parse("HTTP://Example.COM:80/r%20v/X?id=123#frag").unwrap();
        assert_eq!(normalize_url(&url).unwrap(), "http://example.com/r%20v/X");

        let url = Url::parse("https://www.example.net:8080/?q=1").unwrap();
        assert_eq!(normalize_url(&url).unwrap(), "https://www.example.net:8080/");

        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(normalize_url(&url), Err(SignError::InvalidUrl(_, _))));
    }

    #[test]
    fn base_string_matches_twitter_documentation() {
        // https://developer.twitter.com/en/docs/authentication/oauth-1-0a/creating-a-signature
        let (url, body) = twitter_status_update();
        let mut params = body;
        params.extend_from_slice(&[
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ]);
        let base = signature_base_string(&Method::POST, &url, &params).unwrap();
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );

        let signature = sign(
            "post",
            url.as_str(),
            &params,
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            Some("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
        )
        .unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn sign_post_body() {
        let (url, body) = twitter_status_update();
        let secrets = Secrets::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let params = OAuthParameters::new()
            .nonce("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .timestamp(1_318_622_958u64);

        let signed = Signer::new(&secrets, params)
            .sign_request(&Method::POST, &url, &body)
            .unwrap();
        assert_eq!(signed.signature(), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
        assert_eq!(signed.timestamp(), 1_318_622_958);
        assert_eq!(
            signed.nonce(),
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"
        );
    }

    #[test]
    fn sign_post_query() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let params = OAuthParameters::new()
            .nonce("wIjqoS")
            .timestamp(137_131_200u64)
            .callback("http://printer.example.com/ready")
            .realm("photos")
            .version(false);
        let url = Url::parse("https://photos.example.net/initiate").unwrap();

        let header = Signer::new(&secrets, params)
            .generate_signature(&Method::POST, &url, NO_PAYLOAD)
            .unwrap();
        assert!(header.starts_with("OAuth realm=\"photos\", "));
        assert!(header.contains("oauth_callback=\"http%3A%2F%2Fprinter.example.com%2Fready\""));
        assert!(header.contains("oauth_signature=\"74KNZJeDHnMBp0EMJ9ZHt%2FXKycU%3D\""));
        assert!(!header.contains("oauth_version"));
    }

    #[test]
    fn sign_get_query() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let params = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .realm("Photos")
            .version(false);
        let url =
            Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original").unwrap();

        let signed = Signer::new(&secrets, params)
            .sign_request(&Method::GET, &url, NO_PAYLOAD)
            .unwrap();
        assert_eq!(signed.signature(), "MdpQcU8iPSUjWoN/UDMsK2sui9I=");

        let pairs = signed.query_pairs();
        assert!(pairs.contains(&("oauth_token".to_string(), "nnch734d00sl2jdk".to_string())));
        assert!(pairs.contains(&(
            "oauth_signature".to_string(),
            "MdpQcU8iPSUjWoN/UDMsK2sui9I=".to_string()
        )));
        assert!(!pairs.iter().any(|(k, _)| k == "realm"));
    }

    #[test]
    fn signature_is_deterministic_and_sensitive() {
        let params = vec![("oauth_nonce", "n"), ("a", "1"), ("b", "2")];
        let first = sign("GET", "https://example.com/p", &params, "cs", Some("ts")).unwrap();
        let second = sign("GET", "https://example.com/p", &params, "cs", Some("ts")).unwrap();
        assert_eq!(first, second);

        let changed = vec![("oauth_nonce", "n"), ("a", "1"), ("b", "3")];
        let other = sign("GET", "https://example.com/p", &changed, "cs", Some("ts")).unwrap();
        assert_ne!(first, other);

        let other_secret = sign("GET", "https://example.com/p", &params, "cs", None).unwrap();
        assert_ne!(first, other_secret);
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let url = Url::parse("https://example.com/resource?z=last&a=first").unwrap();
        let forward = vec![("b", "2"), ("a", "1"), ("a", "0"), ("c", "3")];
        let mut backward = forward.clone();
        backward.reverse();

        let left = signature_base_string(&Method::GET, &url, &forward).unwrap();
        let right = signature_base_string(&Method::GET, &url, &backward).unwrap();
        assert_eq!(left, right);
        assert!(left.ends_with("a%3D0%26a%3D1%26a%3Dfirst%26b%3D2%26c%3D3%26z%3Dlast"));
    }

    #[test]
    fn empty_consumer_secret_is_allowed() {
        assert_eq!(signing_key("", None), "&");
        assert_eq!(signing_key("c s", Some("t&s")), "c%20s&t%26s");
        assert!(sign("GET", "https://example.com/", NO_PAYLOAD, "", None).is_ok());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            sign("GET", "not a url", NO_PAYLOAD, "cs", None),
            Err(SignError::InvalidUrl(_, _))
        ));
        assert!(matches!(
            sign("", "https://example.com/", NO_PAYLOAD, "cs", None),
            Err(SignError::InvalidMethod(_))
        ));

        let secrets = Secrets::new("ck", "cs");
        let signer = Signer::new(&secrets, OAuthParameters::new());
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            signer.sign_request(&Method::POST, &url, &[("oauth_nonce", "mine")]),
            Err(SignError::UnconfigurableParameter("oauth_nonce".to_string()))
        );
        assert_eq!(
            signer.sign_request(&Method::POST, &url, &[("oauth_bogus", "1")]),
            Err(SignError::UnknownParameter("oauth_bogus".to_string()))
        );
        assert!(signer
            .sign_request(&Method::POST, &url, &[("oauth_verifier", "v1")])
            .is_ok());
    }

    #[test]
    fn fresh_nonce_per_signature() {
        let secrets = Secrets::new("ck", "cs").token("tok", "sec");
        let params = OAuthParameters::new().timestamp(1_600_000_000u64);
        let signer = Signer::new(&secrets, params);
        let url = Url::parse("https://example.com/api").unwrap();

        let first = signer.sign_request(&Method::GET, &url, NO_PAYLOAD).unwrap();
        let second = signer.sign_request(&Method::GET, &url, NO_PAYLOAD).unwrap();
        assert_eq!(first.timestamp(), second.timestamp());
        assert_ne!(first.nonce(), second.nonce());
        assert_ne!(first.signature(), second.signature());
        assert_eq!(first.nonce().len(), NONCE_LENGTH);
        assert!(first.nonce().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn header_lists_protocol_parameters() {
        let secrets = Secrets::new("ck", "cs").token("tok", "TOKEN-SECRET-VALUE");
        let signer = Signer::new(&secrets, OAuthParameters::new());
        let url = Url::parse("https://example.com/api").unwrap();
        let header = signer
            .generate_signature(&Method::GET, &url, NO_PAYLOAD)
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\", "));
        for key in &[
            "oauth_nonce=",
            "oauth_signature=",
            "oauth_signature_method=\"HMAC-SHA1\"",
            "oauth_timestamp=",
            "oauth_token=\"tok\"",
            "oauth_version=\"1.0\"",
        ] {
            assert!(header.contains(key), "{} missing from {}", key, header);
        }
        assert!(!header.contains("TOKEN-SECRET-VALUE"));
    }
}
