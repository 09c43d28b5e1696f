//! Same-origin URL handling.
//!
//! Parsing and relative resolution follow the WHATWG URL standard (via the
//! `url` crate), so paths and queries come out percent-encoded exactly as
//! the browser reports them in `location.href`. Only URLs with a host are
//! modeled: opaque references such as `mailto:` or `tel:` never resolve,
//! which is what the link filters need.

use std::fmt;

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// Lowercased scheme (e.g. `"https"`).
    pub scheme: String,
    /// Lowercased host.
    pub host: String,
    /// Explicit port, `None` when absent or equal to the scheme default.
    pub port: Option<u16>,
    /// Percent-encoded path starting with `/`.
    pub path: String,
    /// Query string without the leading `?`; an empty query is `None`.
    pub query: Option<String>,
    /// Fragment without the leading `#`; an empty fragment is `None`.
    pub fragment: Option<String>,
}

impl Url {
    /// Parse an absolute `scheme://host[:port]/path?query#fragment` URL.
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = ::url::Url::parse(url.trim()).ok()?;
        Self::from_parsed(&parsed)
    }

    /// Resolve an `href` against this base URL.
    ///
    /// Returns `None` for empty input and for opaque references
    /// (`mailto:`, `tel:`, `javascript:`...).
    pub fn resolve(&self, relative: &str) -> Option<Url> {
        let relative = relative.trim();
        if relative.is_empty() {
            return None;
        }
        let base = ::url::Url::parse(&self.to_string()).ok()?;
        let joined = base.join(relative).ok()?;
        Self::from_parsed(&joined)
    }

    fn from_parsed(parsed: &::url::Url) -> Option<Url> {
        if parsed.cannot_be_a_base() {
            return None;
        }
        let host = parsed.host_str().filter(|h| !h.is_empty())?;
        Some(Url {
            scheme: parsed.scheme().to_string(),
            host: host.to_ascii_lowercase(),
            port: parsed.port(),
            path: parsed.path().to_string(),
            query: non_empty(parsed.query()),
            fragment: non_empty(parsed.fragment()),
        })
    }

    /// Directory portion of the path, up to and including the last `/`.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "/",
        }
    }

    /// `scheme://host[:port]`.
    pub fn origin(&self) -> String {
        let mut s = format!("{}://{}", self.scheme, self.host);
        if let Some(port) = self.port {
            s.push_str(&format!(":{port}"));
        }
        s
    }

    pub fn same_origin(&self, other: &Url) -> bool {
        self.scheme == other.scheme && self.host == other.host && self.port == other.port
    }

    /// `?query`, or the empty string.
    pub fn search(&self) -> String {
        self.query
            .as_ref()
            .map(|q| format!("?{q}"))
            .unwrap_or_default()
    }

    /// `#fragment`, or the empty string.
    pub fn hash(&self) -> String {
        self.fragment
            .as_ref()
            .map(|f| format!("#{f}"))
            .unwrap_or_default()
    }

    /// Path, query and fragment as written into history entries.
    pub fn relative_ref(&self) -> String {
        format!("{}{}{}", self.path, self.search(), self.hash())
    }

    /// Copy of this URL with another path.
    pub fn with_path(&self, path: &str) -> Url {
        Url {
            path: path.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.relative_ref())
    }
}

fn non_empty(part: Option<&str>) -> Option<String> {
    part.filter(|p| !p.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://np.example/services/mapping.html").unwrap()
    }

    #[test]
    fn parse_full_url() {
        let url = Url::parse("https://NP.example/pricing?plan=pro#faq").unwrap();
        assert_eq!(url.scheme, "https");
        assert_eq!(url.host, "np.example");
        assert_eq!(url.port, None);
        assert_eq!(url.path, "/pricing");
        assert_eq!(url.query.as_deref(), Some("plan=pro"));
        assert_eq!(url.fragment.as_deref(), Some("faq"));
    }

    #[test]
    fn parse_bare_host_has_root_path() {
        let url = Url::parse("http://localhost:8080").unwrap();
        assert_eq!(url.path, "/");
        assert_eq!(url.port, Some(8080));
    }

    #[test]
    fn default_port_is_dropped() {
        let a = Url::parse("https://np.example:443/").unwrap();
        let b = Url::parse("https://np.example/").unwrap();
        assert_eq!(a.port, None);
        assert!(a.same_origin(&b));
    }

    #[test]
    fn rejects_non_urls() {
        assert!(Url::parse("").is_none());
        assert!(Url::parse("/pricing").is_none());
        assert!(Url::parse("mailto:team@np.example").is_none());
        assert!(Url::parse("file:///srv/site/index.html").is_none());
    }

    #[test]
    fn resolve_absolute_path() {
        let r = base().resolve("/pricing.html").unwrap();
        assert_eq!(r.to_string(), "https://np.example/pricing.html");
    }

    #[test]
    fn resolve_relative_path() {
        let r = base().resolve("drones").unwrap();
        assert_eq!(r.path, "/services/drones");
        let r = base().resolve("../about").unwrap();
        assert_eq!(r.path, "/about");
        let r = base().resolve("./").unwrap();
        assert_eq!(r.path, "/services/");
    }

    #[test]
    fn resolve_query_only_keeps_path() {
        let r = base().resolve("?tab=2").unwrap();
        assert_eq!(r.path, "/services/mapping.html");
        assert_eq!(r.query.as_deref(), Some("tab=2"));
    }

    #[test]
    fn resolve_fragment_only_keeps_query() {
        let url = Url::parse("https://np.example/a?x=1").unwrap();
        let r = url.resolve("#top").unwrap();
        assert_eq!(r.relative_ref(), "/a?x=1#top");
    }

    #[test]
    fn resolve_protocol_relative() {
        let r = base().resolve("//cdn.example/app.js").unwrap();
        assert_eq!(r.scheme, "https");
        assert_eq!(r.host, "cdn.example");
        assert!(!r.same_origin(&base()));
    }

    #[test]
    fn resolve_absolute_url() {
        let r = base().resolve("http://np.example/contact").unwrap();
        assert_eq!(r.scheme, "http");
        assert!(!r.same_origin(&base()));
    }

    #[test]
    fn opaque_schemes_do_not_resolve() {
        assert!(base().resolve("mailto:team@np.example").is_none());
        assert!(base().resolve("tel:+10000000").is_none());
        assert!(base().resolve("javascript:void(0)").is_none());
        assert!(base().resolve("   ").is_none());
    }

    #[test]
    fn colon_in_path_is_not_a_scheme() {
        let r = base().resolve("/docs/a:b").unwrap();
        assert_eq!(r.path, "/docs/a:b");
    }

    #[test]
    fn display_and_origin() {
        let url = Url::parse("http://localhost:8080/x?q=1#f").unwrap();
        assert_eq!(url.origin(), "http://localhost:8080");
        assert_eq!(url.to_string(), "http://localhost:8080/x?q=1#f");
        assert_eq!(url.search(), "?q=1");
        assert_eq!(url.hash(), "#f");
    }

    #[test]
    fn dotdot_cannot_escape_root() {
        let r = base().resolve("../../../../x").unwrap();
        assert_eq!(r.path, "/x");
    }

    #[test]
    fn paths_are_percent_encoded_like_location() {
        let r = base().resolve("/our team").unwrap();
        assert_eq!(r.path, "/our%20team");
        let r = base().resolve("/о").unwrap();
        assert_eq!(r.path, "/%D0%BE");
        let r = base().resolve("/our%20team").unwrap();
        assert_eq!(r.path, "/our%20team");
        assert_eq!(
            Url::parse("https://np.example/our team?q=a b").unwrap().to_string(),
            "https://np.example/our%20team?q=a%20b"
        );
    }

    #[test]
    fn empty_query_and_fragment_are_absent() {
        let home = Url::parse("https://np.example/").unwrap();
        let r = home.resolve("/?").unwrap();
        assert_eq!(r.query, None);
        let r = home.resolve("/#").unwrap();
        assert_eq!(r.fragment, None);
        assert_eq!(r, home);
        assert_eq!(Url::parse("https://np.example/a?#").unwrap().relative_ref(), "/a");
    }
}
