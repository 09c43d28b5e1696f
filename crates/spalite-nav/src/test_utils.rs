//! Shared fixtures for the controller tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};

use spalite_types::config::NavConfig;
use spalite_types::error::FetchError;

use crate::controller::NavigationController;
use crate::headless::HeadlessPage;
use crate::host::{FetchRequest, FetchResponse, FetchResult, PageFetcher};

pub const ORIGIN: &str = "https://np.example";
pub const REGION: &str = "main-content";

/// A full page with chrome around the content region.
pub fn page_html(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{title}</title></head><body>\
         <nav><a href=\"/\">Home</a><a href=\"/pricing\">Pricing</a>\
         <a href=\"/services\">Services</a><a href=\"/about\">About</a></nav>\
         <main id=\"{REGION}\">{body}</main>\
         <footer><a href=\"mailto:hi@np.example\">Mail</a></footer></body></html>"
    )
}

/// A tab that natively loaded the home page.
pub fn home_page() -> HeadlessPage {
    HeadlessPage::load(
        &format!("{ORIGIN}/"),
        &page_html("Home", "<h1>Home</h1>"),
        REGION,
    )
}

/// Serves a fixed set of pages; anything else is a 404.
#[derive(Clone, Default)]
pub struct StaticFetcher {
    pages: Rc<RefCell<HashMap<String, FetchResponse>>>,
    requests: Rc<RefCell<Vec<FetchRequest>>>,
}

impl StaticFetcher {
    /// Serve `html` at `path` (origin-relative fetch path).
    pub fn with_page(self, path: &str, html: impl Into<String>) -> Self {
        self.pages
            .borrow_mut()
            .insert(format!("{ORIGIN}{path}"), FetchResponse::ok(html));
        self
    }

    pub fn with_response(self, path: &str, response: FetchResponse) -> Self {
        self.pages
            .borrow_mut()
            .insert(format!("{ORIGIN}{path}"), response);
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }
}

impl PageFetcher for StaticFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult> {
        // Static servers ignore the query when picking the file.
        let path = request.url.split('?').next().unwrap_or_default();
        let response = self
            .pages
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| FetchResponse::with_status(404));
        self.requests.borrow_mut().push(request);
        future::ready(Ok(response)).boxed_local()
    }
}

/// Fetches that settle only when the test says so.
#[derive(Clone, Default)]
pub struct DeferredFetcher {
    pending: Rc<RefCell<Vec<(String, oneshot::Sender<FetchResult>)>>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl DeferredFetcher {
    /// Settle the oldest outstanding request for `path`. Returns whether
    /// one was found; a request whose future was dropped still counts.
    pub fn resolve(&self, path: &str, result: FetchResult) -> bool {
        let url = format!("{ORIGIN}{path}");
        let mut pending = self.pending.borrow_mut();
        let Some(index) = pending.iter().position(|(u, _)| *u == url) else {
            return false;
        };
        let (_, sender) = pending.remove(index);
        let _ = sender.send(result);
        true
    }

    pub fn resolve_page(&self, path: &str, html: impl Into<String>) -> bool {
        self.resolve(path, Ok(FetchResponse::ok(html)))
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn outstanding(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl PageFetcher for DeferredFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.requests.borrow_mut().push(request.url.clone());
        self.pending.borrow_mut().push((request.url, tx));
        rx.map(|settled| {
            settled.unwrap_or_else(|_| Err(FetchError::Transport("request dropped".into())))
        })
        .boxed_local()
    }
}

pub fn controller<F: PageFetcher>(fetcher: F) -> NavigationController<HeadlessPage, F> {
    controller_on(home_page(), fetcher)
}

pub fn controller_on<F: PageFetcher>(
    page: HeadlessPage,
    fetcher: F,
) -> NavigationController<HeadlessPage, F> {
    NavigationController::new(NavConfig::default(), page, fetcher).unwrap()
}
