use std::fmt;

/// Names of the two session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieName {
    /// Carries the short-lived access token
    Authentication,
    /// Carries the longer-lived refresh token
    Refresh,
}

impl CookieName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookieName::Authentication => "Authentication",
            CookieName::Refresh => "Refresh",
        }
    }
}

impl fmt::Display for CookieName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session cookie directive.
///
/// Renders as `<name>=<value>; HttpOnly; Path=/; Max-Age=<seconds>`.
/// Browsers parse this literally: attribute order and the `HttpOnly` flag are
/// part of the contract. A clearing directive has an empty value and `Max-Age=0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: CookieName,
    pub value: String,
    pub max_age_seconds: u64,
}

impl SessionCookie {
    /// Cookie carrying a token for `max_age_seconds`.
    pub fn issue(name: CookieName, token: impl Into<String>, max_age_seconds: u64) -> Self {
        Self {
            name,
            value: token.into(),
            max_age_seconds,
        }
    }

    /// Directive instructing the holder to drop the cookie immediately.
    pub fn clear(name: CookieName) -> Self {
        Self {
            name,
            value: String::new(),
            max_age_seconds: 0,
        }
    }

    /// `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; HttpOnly; Path=/; Max-Age={}",
            self.name, self.value, self.max_age_seconds
        )
    }
}

/// Clearing directives for both session cookies, `Authentication` first.
pub fn clearing_cookies() -> [SessionCookie; 2] {
    [
        SessionCookie::clear(CookieName::Authentication),
        SessionCookie::clear(CookieName::Refresh),
    ]
}

/// Find a cookie value in a `Cookie` request header (`a=1; b=2`).
///
/// Returns `None` when the cookie is absent or empty.
pub fn find_cookie<'a>(cookie_header: &'a str, name: CookieName) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name.as_str())
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
