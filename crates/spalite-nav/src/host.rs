//! Seams between the navigation core and its environment.
//!
//! [`PageHost`] is the live document plus window (DOM, history, location,
//! scrolling). [`PageFetcher`] is the network. The browser binding
//! implements both with `web-sys`; the headless driver and the tests
//! implement them in memory.
//!
//! All methods take `&self`: hosts are single-threaded and use interior
//! mutability, so a navigation suspended at a fetch never holds a borrow.

use futures::future::LocalBoxFuture;

use spalite_types::error::{FetchError, Result};

/// How a swap records itself in session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// User-initiated: push a new entry.
    Push,
    /// History replay (back/forward): replace the current entry.
    Replace,
}

/// A page request issued by the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL of the page resource.
    pub url: String,
    /// Extra request headers (the request-origin marker).
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Always `GET`.
    pub const METHOD: &'static str = "GET";

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A completed page response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome of a single page request.
pub type FetchResult = std::result::Result<FetchResponse, FetchError>;

/// Network access for page documents.
///
/// Implementations send same-origin credentials and bypass the HTTP cache.
/// Dropping the returned future abandons the request; implementations that
/// can abort the underlying transport should do so on drop.
pub trait PageFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult>;
}

/// The live document and window.
pub trait PageHost {
    /// Current `location.href`.
    fn location(&self) -> String;

    /// Whether the current document has the content region.
    fn has_content_region(&self) -> bool;

    /// Replace the content region's inner markup.
    fn replace_content(&self, inner_html: &str) -> Result<()>;

    /// Current `document.title`.
    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    /// Push or replace a history entry for `url` (path, query and fragment)
    /// tagged as app-driven.
    fn write_history(&self, mode: NavigationMode, url: &str) -> Result<()>;

    fn scroll_to_top(&self);

    /// Toggle the busy indicator on the document element.
    fn set_busy(&self, busy: bool);

    /// Raw `href` of every anchor in document order (`None` when absent).
    fn anchor_hrefs(&self) -> Vec<Option<String>>;

    /// Set or clear the current-page marker on the anchor at `index` of
    /// [`PageHost::anchor_hrefs`].
    fn set_anchor_current(&self, index: usize, current: bool);

    /// Broadcast the page-changed event on the global scope.
    fn dispatch_page_changed(&self, url: &str);

    /// Full native navigation; the page is expected to unload.
    fn assign_location(&self, href: &str);
}
