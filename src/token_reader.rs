use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::{
    AccessToken, TemporaryCredential, TokenReaderError, TokenReaderResult, TransportResponse,
    OAUTH_CALLBACK_CONFIRMED_KEY, OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY,
};

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

impl TokenResponse {
    /// `true` when the service acknowledged the `oauth_callback`.
    pub fn callback_confirmed(&self) -> bool {
        self.remain
            .get(OAUTH_CALLBACK_CONFIRMED_KEY)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn into_temporary_credential(self) -> TemporaryCredential {
        let callback_confirmed = self.callback_confirmed();
        TemporaryCredential {
            token: self.oauth_token,
            secret: self.oauth_token_secret,
            callback_confirmed,
        }
    }

    /// Everything except the token pair lands in `extra_data`.
    pub fn into_access_token(self) -> AccessToken {
        AccessToken {
            token: self.oauth_token,
            secret: self.oauth_token_secret,
            extra_data: self.remain,
        }
    }
}

impl FromStr for TokenResponse {
    type Err = TokenReaderError;

    fn from_str(s: &str) -> TokenReaderResult<Self> {
        read_oauth_token(s)
    }
}

/// Add parse_oauth_token feature to a transport response.
// this trait is sealed
pub trait TokenReader: private::Sealed {
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse>;
}

impl TokenReader for TransportResponse {
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse> {
        read_oauth_token(&self.body)
    }
}

fn read_oauth_token(text: &str) -> TokenReaderResult<TokenResponse> {
    let mut destructured = url::form_urlencoded::parse(text.trim().as_bytes())
        .into_owned()
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_KEY,
            text.to_string(),
        )),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text.to_string(),
        )),
    }
}

mod private {
    use crate::TransportResponse;

    pub trait Sealed {}
    impl Sealed for TransportResponse {}
}

#[cfg(test)]
mod test {
    use http::StatusCode;

    use super::*;

    #[test]
    fn parse_response_typical() {
        let resp_str_sample = "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&oauth_callback_confirmed=true";
        for parsed in &[
            read_oauth_token(resp_str_sample).unwrap(),
            serde_urlencoded::from_str::<TokenResponse>(resp_str_sample).unwrap(),
        ] {
            assert_eq!(
                parsed.oauth_token,
                "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik"
            );
            assert_eq!(
                parsed.oauth_token_secret,
                "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM"
            );
            assert_eq!(parsed.remain.len(), 1);
            assert!(parsed.callback_confirmed());
        }
    }

    #[test]
    fn parse_response_edge() {
        let resp_str_sample = "oauth_token==&oauth_token_secret=&keyonly=&keyonly2&=&&";
        let parsed = read_oauth_token(resp_str_sample).unwrap();
        assert_eq!(parsed.oauth_token, "=");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 3);
        assert_eq!(parsed.remain.get("keyonly").unwrap(), "");
        assert_eq!(parsed.remain.get("keyonly2").unwrap(), "");
        assert_eq!(parsed.remain.get("").unwrap(), "");
        assert!(!parsed.callback_confirmed());
    }

    #[test]
    fn parse_decodes_values() {
        let parsed: TokenResponse =
            "oauth_token=a%2Fb&oauth_token_secret=c+d&screen_name=J%C3%BCrgen\n"
                .parse()
                .unwrap();
        assert_eq!(parsed.oauth_token, "a/b");
        assert_eq!(parsed.oauth_token_secret, "c d");
        assert_eq!(parsed.remain.get("screen_name").unwrap(), "Jürgen");
    }

    #[test]
    fn parse_minimal() {
        let parsed = read_oauth_token("oauth_token&oauth_token_secret").unwrap();
        assert_eq!(parsed.oauth_token, "");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 0);
    }

    #[test]
    fn parse_token_notfound() {
        let resp_str_sample = "oauth_token_secret=";
        match read_oauth_token(resp_str_sample) {
            Err(TokenReaderError::TokenKeyNotFound(key, resp_str)) => {
                assert_eq!(key, OAUTH_TOKEN_KEY);
                assert_eq!(resp_str, resp_str_sample)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_token_secret_notfound() {
        let resp_str_sample = "oauth_token=";
        match read_oauth_token(resp_str_sample) {
            Err(TokenReaderError::TokenKeyNotFound(key, resp_str)) => {
                assert_eq!(key, OAUTH_TOKEN_SECRET_KEY);
                assert_eq!(resp_str, resp_str_sample)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn converts_into_credentials() {
        let response = TransportResponse {
            status: StatusCode::OK,
            body: "oauth_token=tok2&oauth_token_secret=sec2&screen_name=alice&user_id=42"
                .to_string(),
        };
        let access = response.parse_oauth_token().unwrap().into_access_token();
        assert_eq!(access.token, "tok2");
        assert_eq!(access.secret, "sec2");
        assert_eq!(access.extra("screen_name"), Some("alice"));
        assert_eq!(access.extra("user_id"), Some("42"));
        assert_eq!(access.extra_data.len(), 2);

        let temporary: TemporaryCredential =
            "oauth_token=tok1&oauth_token_secret=sec1&oauth_callback_confirmed=false"
                .parse::<TokenResponse>()
                .unwrap()
                .into_temporary_credential();
        assert_eq!(temporary.token, "tok1");
        assert!(!temporary.callback_confirmed);
    }
}
