//! Cookie jar backed by request and response headers

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use warden_auth_core::CookieJar;

use crate::state::AppState;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Reads cookies from the request, collects `Set-Cookie` lines for the response
#[derive(Debug, Clone, Default)]
pub struct HeaderCookieJar {
    incoming: HashMap<String, String>,
    outgoing: Vec<String>,
    secure: bool,
}

impl HeaderCookieJar {
    /// Parse every `Cookie` header. The first occurrence of a name wins.
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let mut incoming = HashMap::new();
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    incoming
                        .entry(name.trim().to_string())
                        .or_insert_with(|| value.trim().to_string());
                }
            }
        }
        Self {
            incoming,
            outgoing: Vec::new(),
            secure,
        }
    }

    /// Attach collected `Set-Cookie` headers to a response
    pub fn apply(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        for cookie in self.outgoing {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::error!(error = %e, "Dropping unencodable cookie"),
            }
        }
        response
    }

    /// `Set-Cookie` lines queued so far
    #[cfg(test)]
    pub fn pending(&self) -> &[String] {
        &self.outgoing
    }

    fn attributes(&self) -> &'static str {
        if self.secure {
            "; Path=/; HttpOnly; SameSite=Lax; Secure"
        } else {
            "; Path=/; HttpOnly; SameSite=Lax"
        }
    }
}

impl CookieJar for HeaderCookieJar {
    fn read(&self, name: &str) -> Option<String> {
        self.incoming.get(name).cloned()
    }

    fn write(&mut self, name: &str, value: &str, expires: DateTime<Utc>) {
        self.outgoing.push(format!(
            "{name}={value}; Expires={}{}",
            expires.format(HTTP_DATE),
            self.attributes()
        ));
        self.incoming.insert(name.to_string(), value.to_string());
    }

    fn clear(&mut self, name: &str) {
        self.outgoing.push(format!(
            "{name}=; Expires={EPOCH_HTTP_DATE}; Max-Age=0{}",
            self.attributes()
        ));
        self.incoming.remove(name);
    }
}

impl<S> FromRequestParts<S> for HeaderCookieJar
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(Self::from_headers(&parts.headers, app_state.config.cookie_secure))
    }
}
