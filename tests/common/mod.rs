use http::HeaderMap;
use http::header::{COOKIE, HOST, HeaderValue, SET_COOKIE};
use sigcookie::config::{Config, CookieOptions, DEFAULT_COOKIE_CONFIG};
use sigcookie::security::crypto::DEFAULT_PROVIDER;
use std::collections::HashMap;
use std::sync::Arc;

pub fn create_test_config(secret: &str) -> Arc<Config> {
    Arc::new(Config {
        cookie_secret: secret.to_string(),
        cipher_keys: vec![
            (DEFAULT_PROVIDER.to_string(), "default-cipher".to_string()),
            ("legacy".to_string(), "legacy-cipher".to_string()),
        ],
        cookies: HashMap::from([
            (
                DEFAULT_COOKIE_CONFIG.to_string(),
                CookieOptions {
                    lifetime: Some(3600),
                    path: Some("/".to_string()),
                    ..Default::default()
                },
            ),
            (
                "cart".to_string(),
                CookieOptions {
                    serialize: Some(true),
                    lifetime: Some(600),
                    ..Default::default()
                },
            ),
            (
                "profile".to_string(),
                serde_json::from_str(r#"{"encrypted": "legacy", "secure": true}"#).unwrap(),
            ),
        ]),
        log_format: "pretty".to_string(),
    })
}

/// Builds request headers the way a browser would send them.
pub fn request_headers(host: &str, cookie_header: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HOST, HeaderValue::from_str(host).unwrap());
    if let Some(cookie) = cookie_header {
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
    }
    headers
}

/// Turns response `Set-Cookie` headers into the next request's `Cookie` header,
/// dropping cookies the server expired.
pub fn browser_cookie_header(response: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = response
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|line| !line.contains("Max-Age=0"))
        .filter_map(|line| line.split(';').next())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
