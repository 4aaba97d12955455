//! Request/response cookie context.
//!
//! The accessor never touches headers directly; it goes through
//! [`CookieContext`]. [`HttpExchange`] is the `http`-crate implementation:
//! it parses `Cookie` request headers and collects `Set-Cookie` lines.

use http::HeaderMap;
use http::header::{COOKIE, HOST, HeaderValue, SET_COOKIE};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::debug;

use crate::config::{CookieError, Result};

/// Bytes that cannot appear verbatim in a cookie value.
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

const EXPIRED: &str = "Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0";

/// When a written cookie stops being sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Until the browser closes.
    Session,
    /// After this many seconds.
    After(u64),
    /// Already in the past; the client drops the cookie.
    Expired,
}

impl Expiry {
    /// Maps a lifetime in seconds: 0 is a session cookie, negative is expired.
    #[must_use]
    pub fn from_lifetime(secs: i64) -> Self {
        match u64::try_from(secs) {
            Ok(0) => Self::Session,
            Ok(secs) => Self::After(secs),
            Err(_) => Self::Expired,
        }
    }
}

/// A single cookie write.
#[derive(Debug, Clone, Copy)]
pub struct SetCookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub expiry: Expiry,
    pub path: &'a str,
    pub domain: &'a str,
    pub secure: bool,
    pub http_only: bool,
}

impl SetCookie<'_> {
    /// Formats the `Set-Cookie` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut line = format!(
            "{}={}",
            self.name,
            utf8_percent_encode(self.value, COOKIE_VALUE)
        );
        match self.expiry {
            Expiry::Session => {}
            Expiry::After(secs) => {
                let _ = write!(line, "; Max-Age={secs}");
            }
            Expiry::Expired => {
                let _ = write!(line, "; {EXPIRED}");
            }
        }
        if !self.path.is_empty() {
            let _ = write!(line, "; Path={}", self.path);
        }
        if !self.domain.is_empty() {
            let _ = write!(line, "; Domain={}", self.domain);
        }
        if self.secure {
            line.push_str("; Secure");
        }
        if self.http_only {
            line.push_str("; HttpOnly");
        }
        line
    }
}

/// Host request/response state a cookie accessor reads from and writes to.
pub trait CookieContext {
    /// Host of the current request, used as the default cookie domain.
    fn host(&self) -> &str;

    /// Raw (already percent-decoded) request cookie value.
    fn raw_cookie(&self, name: &str) -> Option<&str>;

    /// Emits a cookie write. Returns `false` if the write was refused.
    fn set_cookie(&mut self, cookie: &SetCookie<'_>) -> bool;

    /// Forgets the request-side value of `name`.
    fn unset_raw_cookie(&mut self, name: &str);
}

/// Cookie state of one HTTP request/response exchange.
#[derive(Debug, Clone, Default)]
pub struct HttpExchange {
    host: String,
    request_cookies: HashMap<String, String>,
    set_cookies: Vec<String>,
    headers_sent: bool,
}

impl HttpExchange {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Builds the exchange from request headers (`Host` and every `Cookie`).
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(strip_port)
            .unwrap_or_default();

        let mut exchange = Self::new(host);
        for header in headers.get_all(COOKIE) {
            if let Ok(s) = header.to_str() {
                exchange.parse_cookie_header(s);
            }
        }
        exchange
    }

    /// Adds the pairs of a raw `Cookie` header. The first value of a name wins.
    pub fn parse_cookie_header(&mut self, header: &str) {
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            match percent_decode_str(value.trim()).decode_utf8() {
                Ok(decoded) => {
                    self.request_cookies
                        .entry(name.to_string())
                        .or_insert_with(|| decoded.into_owned());
                }
                Err(_) => debug!(cookie = %name, "Skipping cookie with undecodable value"),
            }
        }
    }

    /// Sets a request-side cookie, as if the client had sent it.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_cookies.insert(name.into(), value.into());
        self
    }

    /// `Set-Cookie` header values emitted so far.
    #[must_use]
    pub fn set_cookie_headers(&self) -> &[String] {
        &self.set_cookies
    }

    #[must_use]
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Appends the collected `Set-Cookie` headers to a response header map.
    ///
    /// Later cookie writes on this exchange are refused.
    ///
    /// # Errors
    ///
    /// Returns `CookieError::Header` if a line is not a valid header value.
    pub fn write_headers(&mut self, headers: &mut HeaderMap) -> Result<()> {
        for line in &self.set_cookies {
            let value = HeaderValue::from_str(line)
                .map_err(|e| CookieError::Header(format!("invalid Set-Cookie value: {e}")))?;
            headers.append(SET_COOKIE, value);
        }
        self.headers_sent = true;
        Ok(())
    }
}

impl CookieContext for HttpExchange {
    fn host(&self) -> &str {
        &self.host
    }

    fn raw_cookie(&self, name: &str) -> Option<&str> {
        self.request_cookies.get(name).map(String::as_str)
    }

    fn set_cookie(&mut self, cookie: &SetCookie<'_>) -> bool {
        if self.headers_sent {
            debug!(cookie = %cookie.name, "Cookie write after headers were sent");
            return false;
        }
        if [cookie.path, cookie.domain]
            .iter()
            .any(|attr| attr.contains(';') || attr.chars().any(char::is_control))
        {
            return false;
        }

        let line = cookie.header_value();
        if HeaderValue::from_str(&line).is_err() {
            return false;
        }
        self.set_cookies.push(line);

        if cookie.expiry == Expiry::Expired {
            self.request_cookies.remove(cookie.name);
        } else {
            self.request_cookies
                .insert(cookie.name.to_string(), cookie.value.to_string());
        }
        true
    }

    fn unset_raw_cookie(&mut self, name: &str) {
        self.request_cookies.remove(name);
    }
}

fn strip_port(host: &str) -> String {
    if let Some(rest) = host.strip_prefix('[') {
        return rest
            .split_once(']')
            .map_or(host, |(addr, _)| addr)
            .to_string();
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name.to_string(),
        _ => host.to_string(),
    }
}
