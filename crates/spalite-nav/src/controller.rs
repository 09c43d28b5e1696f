//! Navigation controller: in-place page swaps with cancellation, stale
//! response suppression, click throttling and an LRU page cache.
//!
//! The controller is constructed once per page session and shared (behind
//! an `Rc`) by the event handlers of the host. Every navigation bumps a
//! sequence counter and replaces the single live abort handle, so the
//! document and history always reflect the most recently *initiated*
//! navigation even when an older request settles later.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use futures::future::{AbortHandle, AbortRegistration, Abortable};

use spalite_types::config::NavConfig;
use spalite_types::error::{FetchError, NavigationFailure, Result};
use spalite_types::input::{AnchorSnapshot, ClickDecision, ClickEvent, PointerButton};

use crate::cache::PageCache;
use crate::document::PagePayload;
use crate::host::{FetchRequest, NavigationMode, PageFetcher, PageHost};
use crate::links;
use crate::path::PathNormalizer;
use crate::url::Url;

/// What a call to [`NavigationController::navigate`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Content swapped in place; carries the new display URL.
    Swapped { url: String },
    /// Target is the page already shown; nothing happened.
    Unchanged,
    /// A newer navigation superseded this one after its result arrived.
    Stale,
    /// The navigation failed. Every kind except
    /// [`NavigationFailure::Cancelled`] has already triggered a native
    /// page load.
    Failed(NavigationFailure),
}

/// Payload of the page-changed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChanged {
    /// Absolute display URL of the new page.
    pub url: String,
}

type PageChangedListener = Rc<dyn Fn(&PageChanged)>;

/// Orchestrates in-place navigation for one page session.
pub struct NavigationController<H, F> {
    config: NavConfig,
    normalizer: PathNormalizer,
    host: H,
    fetcher: F,
    cache: RefCell<PageCache>,
    /// Identity of the most recently initiated navigation.
    seq: Cell<u64>,
    /// Abort handle of the outstanding navigation fetch.
    inflight: RefCell<Option<AbortHandle>>,
    /// Timestamp of the last accepted link click.
    last_click_ms: Cell<Option<f64>>,
    /// Fetch URLs with a hover prefetch in progress.
    prefetching: RefCell<HashSet<String>>,
    listeners: RefCell<Vec<PageChangedListener>>,
}

impl<H: PageHost, F: PageFetcher> NavigationController<H, F> {
    /// Build a controller after validating `config`.
    pub fn new(config: NavConfig, host: H, fetcher: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: PathNormalizer::from_config(&config),
            cache: RefCell::new(PageCache::new(config.cache_capacity)),
            config,
            host,
            fetcher,
            seq: Cell::new(0),
            inflight: RefCell::new(None),
            last_click_ms: Cell::new(None),
            prefetching: RefCell::new(HashSet::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    /// Number of cached pages.
    pub fn cached_pages(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Whether the page behind `href` is cached (no recency change).
    pub fn is_cached(&self, href: &str) -> bool {
        self.current_location()
            .and_then(|loc| loc.resolve(href))
            .is_some_and(|url| self.cache.borrow().contains(&self.fetch_url(&url).to_string()))
    }

    /// Cached fetch URLs, most recently used first.
    pub fn cached_urls(&self) -> Vec<String> {
        self.cache
            .borrow()
            .keys_by_recency()
            .map(str::to_string)
            .collect()
    }

    /// Forget every cached page.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        log::debug!("Page cache cleared");
    }

    /// Sequence number of the most recently initiated navigation.
    pub fn sequence(&self) -> u64 {
        self.seq.get()
    }

    /// Initial pass over the page: mark the current link.
    pub fn start(&self) {
        let marked = self.update_active_links();
        log::debug!(
            "Navigation layer ready, {marked} current link(s), page cache of {}",
            self.cache.borrow().capacity()
        );
    }

    /// Subscribe to successful swaps.
    pub fn on_page_changed(&self, listener: impl Fn(&PageChanged) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Recompute the current-page marker on every anchor.
    pub fn update_active_links(&self) -> usize {
        links::update_active_links(&self.host, &self.normalizer)
    }

    // -------------------------------------------------------------------
    // Event entry points
    // -------------------------------------------------------------------

    /// Decide whether a click becomes an in-place navigation.
    ///
    /// Accepted clicks closer than `click_throttle_ms` to the previous one
    /// are suppressed: default prevented, no navigation.
    pub fn handle_click(&self, event: &ClickEvent) -> ClickDecision {
        if event.default_prevented
            || event.button != PointerButton::Primary
            || event.modifiers.any()
        {
            return ClickDecision::Ignore;
        }
        let Some(anchor) = event.anchor.as_ref() else {
            return ClickDecision::Ignore;
        };
        let Some(target) = self.interceptable_target(anchor) else {
            return ClickDecision::Ignore;
        };

        if let Some(last) = self.last_click_ms.get() {
            let elapsed = event.timestamp_ms - last;
            if (0.0..f64::from(self.config.click_throttle_ms)).contains(&elapsed) {
                log::debug!("Click on {target} throttled ({elapsed:.0} ms after previous)");
                return ClickDecision::Suppress;
            }
        }
        self.last_click_ms.set(Some(event.timestamp_ms));
        ClickDecision::Intercept(target.to_string())
    }

    /// Back/forward: reload the address the browser moved to, replacing
    /// the history entry instead of pushing one.
    pub async fn handle_popstate(&self) -> NavigationOutcome {
        let href = self.host.location();
        self.navigate(&href, NavigationMode::Replace).await
    }

    /// Fetch and cache the page behind a hovered link.
    ///
    /// Never touches the in-flight navigation or the recency of cached
    /// pages; failures are dropped. Returns whether a page was added.
    pub async fn prefetch(&self, anchor: &AnchorSnapshot) -> bool {
        let Some(target) = self.interceptable_target(anchor) else {
            return false;
        };
        let key = self.fetch_url(&target).to_string();
        if self.cache.borrow().contains(&key) || !self.prefetching.borrow_mut().insert(key.clone())
        {
            return false;
        }

        let result = self.fetcher.fetch(self.request_for(&key)).await;
        self.prefetching.borrow_mut().remove(&key);

        match result {
            Ok(response) if response.is_success() => {
                let payload = PagePayload::parse(response.body, &self.config.content_region_id);
                self.cache.borrow_mut().insert(key.clone(), Rc::new(payload));
                log::debug!("Prefetched {key}");
                true
            },
            Ok(response) => {
                log::debug!("Prefetch of {key} returned HTTP {}", response.status);
                false
            },
            Err(e) => {
                log::debug!("Prefetch of {key} failed: {e}");
                false
            },
        }
    }

    // -------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------

    /// Navigate in place to `href` (resolved against the current location).
    pub async fn navigate(&self, href: &str, mode: NavigationMode) -> NavigationOutcome {
        let Some(location) = self.current_location() else {
            log::warn!("Unparseable location, loading {href} natively");
            self.host.assign_location(href);
            return NavigationOutcome::Failed(NavigationFailure::StructuralMismatch(
                "current location is not a URL".to_string(),
            ));
        };
        let Some(requested) = location.resolve(href) else {
            log::warn!("Cannot resolve {href}, loading it natively");
            self.host.assign_location(href);
            return NavigationOutcome::Failed(NavigationFailure::StructuralMismatch(format!(
                "unresolvable href {href}"
            )));
        };

        let display = requested.with_path(&self.normalizer.to_display_path(&requested.path));
        if mode == NavigationMode::Push
            && display.path == self.normalizer.to_display_path(&location.path)
            && display.query == location.query
        {
            return NavigationOutcome::Unchanged;
        }

        // Only one request may be outstanding.
        if let Some(previous) = self.inflight.borrow_mut().take() {
            previous.abort();
        }
        let (handle, registration) = AbortHandle::new_pair();
        *self.inflight.borrow_mut() = Some(handle.clone());
        let seq = self.seq.get() + 1;
        self.seq.set(seq);
        self.host.set_busy(true);
        log::debug!("Navigation #{seq} to {display} ({mode:?})");

        let loaded = if self.host.has_content_region() {
            self.load(&self.fetch_url(&requested), registration).await
        } else {
            Err(NavigationFailure::StructuralMismatch(format!(
                "current page has no #{}",
                self.config.content_region_id
            )))
        };

        let outcome = if handle.is_aborted() || matches!(loaded, Err(NavigationFailure::Cancelled)) {
            NavigationOutcome::Failed(NavigationFailure::Cancelled)
        } else if seq != self.seq.get() {
            log::debug!("Navigation #{seq} superseded, result discarded");
            NavigationOutcome::Stale
        } else {
            match loaded.and_then(|payload| self.swap(&payload, &display, mode)) {
                Ok(url) => NavigationOutcome::Swapped { url },
                Err(failure) => NavigationOutcome::Failed(failure),
            }
        };

        if let NavigationOutcome::Failed(failure) = &outcome
            && failure.needs_fallback()
        {
            self.fallback(&requested, failure);
        }

        if seq == self.seq.get() {
            self.host.set_busy(false);
            self.inflight.borrow_mut().take();
        }
        outcome
    }

    /// Serve from cache or fetch, parse, and cache.
    async fn load(
        &self,
        fetch_url: &Url,
        registration: AbortRegistration,
    ) -> std::result::Result<Rc<PagePayload>, NavigationFailure> {
        let key = fetch_url.to_string();
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(payload) = cached {
            log::debug!("Page cache hit for {key}");
            return Ok(payload);
        }

        let request = self.request_for(&key);
        let response = match Abortable::new(self.fetcher.fetch(request), registration).await {
            Ok(result) => result?,
            Err(_aborted) => return Err(NavigationFailure::Cancelled),
        };
        if !response.is_success() {
            return Err(FetchError::Http {
                status: response.status,
            }
            .into());
        }

        let payload = Rc::new(PagePayload::parse(
            response.body,
            &self.config.content_region_id,
        ));
        if !payload.has_content() {
            log::debug!("{key} has no #{}", self.config.content_region_id);
        }
        self.cache.borrow_mut().insert(key, Rc::clone(&payload));
        Ok(payload)
    }

    /// Apply a payload to the live document.
    fn swap(
        &self,
        payload: &PagePayload,
        display: &Url,
        mode: NavigationMode,
    ) -> std::result::Result<String, NavigationFailure> {
        let Some(content) = payload.content.as_deref() else {
            return Err(NavigationFailure::StructuralMismatch(format!(
                "fetched page has no #{}",
                self.config.content_region_id
            )));
        };
        self.host
            .replace_content(content)
            .map_err(|e| NavigationFailure::StructuralMismatch(e.to_string()))?;

        let title = payload.title.clone().unwrap_or_else(|| self.host.title());
        self.host.set_title(&title);

        if let Err(e) = self.host.write_history(mode, &display.relative_ref()) {
            log::warn!("History update for {display} failed: {e}");
        }
        self.host.scroll_to_top();
        self.update_active_links();

        let url = display.to_string();
        log::info!("Swapped to {url} \"{title}\"");
        self.notify(&url);
        Ok(url)
    }

    fn notify(&self, url: &str) {
        self.host.dispatch_page_changed(url);
        let event = PageChanged {
            url: url.to_string(),
        };
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Recover by letting the browser load the requested address.
    fn fallback(&self, requested: &Url, failure: &NavigationFailure) {
        log::warn!("Falling back to native navigation to {requested}: {failure}");
        self.host.assign_location(&requested.to_string());
    }

    // -------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------

    fn current_location(&self) -> Option<Url> {
        Url::parse(&self.host.location())
    }

    fn interceptable_target(&self, anchor: &AnchorSnapshot) -> Option<Url> {
        let location = self.current_location()?;
        links::interceptable_target(anchor, &location, &self.normalizer)
    }

    /// Resource URL for a page; fragments never reach the network.
    fn fetch_url(&self, url: &Url) -> Url {
        let mut fetch = url.with_path(&self.normalizer.to_fetch_path(&url.path));
        fetch.fragment = None;
        fetch
    }

    fn request_for(&self, url: &str) -> FetchRequest {
        FetchRequest {
            url: url.to_string(),
            headers: vec![(
                self.config.request_marker_header.clone(),
                self.config.request_marker_value.clone(),
            )],
        }
    }
}
