//! Cookie transport seam

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Default name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Read, write and clear named cookies for one request/response pair
pub trait CookieJar {
    fn read(&self, name: &str) -> Option<String>;
    fn write(&mut self, name: &str, value: &str, expires: DateTime<Utc>);
    fn clear(&mut self, name: &str);
}

/// In-memory jar. Writes are visible to later reads, like a browser that
/// replays whatever it was last told to store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, (String, Option<DateTime<Utc>>)>,
    cleared: Vec<String>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar preloaded with one cookie, as if sent by the browser
    pub fn with_cookie(name: &str, value: &str) -> Self {
        let mut jar = Self::new();
        jar.cookies.insert(name.to_string(), (value.to_string(), None));
        jar
    }

    /// Expiry given on the last write of `name`
    pub fn expires(&self, name: &str) -> Option<DateTime<Utc>> {
        self.cookies.get(name).and_then(|(_, expires)| *expires)
    }

    /// Whether `name` was cleared at any point
    pub fn was_cleared(&self, name: &str) -> bool {
        self.cleared.iter().any(|c| c == name)
    }
}

impl CookieJar for MemoryCookieJar {
    fn read(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|(value, _)| value.clone())
    }

    fn write(&mut self, name: &str, value: &str, expires: DateTime<Utc>) {
        self.cookies
            .insert(name.to_string(), (value.to_string(), Some(expires)));
    }

    fn clear(&mut self, name: &str) {
        self.cookies.remove(name);
        self.cleared.push(name.to_string());
    }
}
