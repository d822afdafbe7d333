//! HTTP Basic credentials and challenges.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::Engine;

/// A login and password presented inline with a request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub login: String,
    pub password: String,
}

impl core::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    /// Reads `Authorization: Basic <base64(login:password)>`.
    ///
    /// Anything malformed counts as no credentials at all.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (login, password) = decoded.split_once(':')?;

        Some(Self {
            login: login.to_string(),
            password: password.to_string(),
        })
    }

    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.login, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

/// `WWW-Authenticate` value asking a client to retry with Basic credentials.
pub fn challenge(realm: &str) -> HeaderValue {
    let escaped = realm.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_str(&format!("Basic realm=\"{escaped}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic realm=\"Application\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn parse(value: &str) -> Option<BasicCredentials> {
        BasicCredentials::from_headers(&headers(value))
    }

    #[test]
    fn parses_basic_header() {
        // admin:taliesin
        let creds = parse("Basic YWRtaW46dGFsaWVzaW4=").unwrap();
        assert_eq!(creds.login, "admin");
        assert_eq!(creds.password, "taliesin");
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = BasicCredentials {
            login: "cwl1".to_string(),
            password: "a:b:c".to_string(),
        };
        let parsed = parse(&creds.encode()).unwrap();
        assert_eq!(parsed, creds);
    }

    #[test]
    fn malformed_headers_are_ignored() {
        assert!(BasicCredentials::from_headers(&HeaderMap::new()).is_none());
        assert!(parse("Bearer abc").is_none());
        assert!(parse("Basic !!!").is_none());
        // "nocolon"
        assert!(parse("Basic bm9jb2xvbg==").is_none());
    }

    #[test]
    fn challenge_names_realm() {
        assert_eq!(challenge("Web Password"), "Basic realm=\"Web Password\"");
    }

    #[test]
    fn debug_hides_password() {
        let creds = BasicCredentials {
            login: "admin".to_string(),
            password: "taliesin".to_string(),
        };
        assert!(!format!("{creds:?}").contains("taliesin"));
    }
}
