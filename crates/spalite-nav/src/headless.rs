//! In-memory page host.
//!
//! [`HeadlessPage`] models one browser tab: a session history stack, the
//! document title, the content region, the anchors outside it, and a log of
//! everything the navigation layer asked the "browser" to do. It backs the
//! headless driver and the controller tests.

use std::cell::RefCell;

use spalite_types::error::{Result, SpaError};

use crate::host::{NavigationMode, PageHost};
use crate::html;
use crate::url::Url;

/// A single entry in the session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Absolute URL.
    pub url: String,
    /// Written by the navigation layer rather than a native load.
    pub app_driven: bool,
}

/// Back/forward stacks around the current entry.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    back_stack: Vec<HistoryEntry>,
    forward_stack: Vec<HistoryEntry>,
    current: HistoryEntry,
}

impl SessionHistory {
    /// History of a tab that natively loaded `url`.
    pub fn new(url: &str) -> Self {
        Self {
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
            current: HistoryEntry {
                url: url.to_string(),
                app_driven: false,
            },
        }
    }

    /// Push a new entry, clearing the forward stack.
    pub fn push(&mut self, url: &str) {
        let previous = std::mem::replace(
            &mut self.current,
            HistoryEntry {
                url: url.to_string(),
                app_driven: true,
            },
        );
        self.back_stack.push(previous);
        self.forward_stack.clear();
    }

    /// Overwrite the current entry in place.
    pub fn replace(&mut self, url: &str) {
        self.current = HistoryEntry {
            url: url.to_string(),
            app_driven: true,
        };
    }

    /// Step back. Returns the new current URL, or `None` at the start.
    pub fn go_back(&mut self) -> Option<&str> {
        let prev = self.back_stack.pop()?;
        let current = std::mem::replace(&mut self.current, prev);
        self.forward_stack.push(current);
        Some(&self.current.url)
    }

    /// Step forward. Returns the new current URL, or `None` at the end.
    pub fn go_forward(&mut self) -> Option<&str> {
        let next = self.forward_stack.pop()?;
        let current = std::mem::replace(&mut self.current, next);
        self.back_stack.push(current);
        Some(&self.current.url)
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.current
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.back_stack.len() + 1 + self.forward_stack.len()
    }

    /// Never empty; provided for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entries oldest first.
    pub fn entries(&self) -> Vec<&HistoryEntry> {
        self.back_stack
            .iter()
            .chain(std::iter::once(&self.current))
            .chain(self.forward_stack.iter().rev())
            .collect()
    }
}

#[derive(Debug)]
struct PageState {
    history: SessionHistory,
    title: String,
    /// `None` when the document has no content region.
    content: Option<String>,
    /// Anchors outside the content region (header, footer).
    chrome_links: Vec<String>,
    current_marks: Vec<bool>,
    busy: bool,
    scroll_resets: usize,
    native_loads: Vec<String>,
    events: Vec<String>,
}

/// In-memory [`PageHost`].
#[derive(Debug)]
pub struct HeadlessPage {
    state: RefCell<PageState>,
}

impl HeadlessPage {
    /// A tab that natively loaded `html` from `url`.
    pub fn load(url: &str, html: &str, region_id: &str) -> Self {
        let content = html::inner_html_by_id(html, region_id).map(str::to_string);
        let outside = match &content {
            Some(inner) => html.replacen(inner.as_str(), "", 1),
            None => html.to_string(),
        };
        Self {
            state: RefCell::new(PageState {
                history: SessionHistory::new(url),
                title: html::title_text(html).unwrap_or_default(),
                content,
                chrome_links: html::anchor_hrefs(&outside),
                current_marks: Vec::new(),
                busy: false,
                scroll_resets: 0,
                native_loads: Vec::new(),
                events: Vec::new(),
            }),
        }
    }

    /// Simulate the browser back button. Returns the new location; the
    /// caller is expected to run the popstate handler next.
    pub fn go_back(&self) -> Option<String> {
        self.state.borrow_mut().history.go_back().map(str::to_string)
    }

    /// Simulate the browser forward button.
    pub fn go_forward(&self) -> Option<String> {
        self.state
            .borrow_mut()
            .history
            .go_forward()
            .map(str::to_string)
    }

    pub fn content(&self) -> Option<String> {
        self.state.borrow().content.clone()
    }

    pub fn history(&self) -> SessionHistory {
        self.state.borrow().history.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    pub fn scroll_resets(&self) -> usize {
        self.state.borrow().scroll_resets
    }

    /// Addresses handed to a full native navigation, oldest first.
    pub fn native_loads(&self) -> Vec<String> {
        self.state.borrow().native_loads.clone()
    }

    /// URLs carried by dispatched page-changed events, oldest first.
    pub fn page_events(&self) -> Vec<String> {
        self.state.borrow().events.clone()
    }

    /// `href`s currently carrying the current-page marker.
    pub fn current_links(&self) -> Vec<String> {
        let hrefs = self.anchor_hrefs();
        let state = self.state.borrow();
        hrefs
            .into_iter()
            .zip(state.current_marks.iter())
            .filter(|(_, marked)| **marked)
            .filter_map(|(href, _)| href)
            .collect()
    }
}

impl PageHost for HeadlessPage {
    fn location(&self) -> String {
        self.state.borrow().history.current().url.clone()
    }

    fn has_content_region(&self) -> bool {
        self.state.borrow().content.is_some()
    }

    fn replace_content(&self, inner_html: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.content.as_mut() {
            Some(content) => {
                *content = inner_html.to_string();
                Ok(())
            },
            None => Err(SpaError::Host("content region missing".to_string())),
        }
    }

    fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.state.borrow_mut().title = title.to_string();
    }

    fn write_history(&self, mode: NavigationMode, url: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let base = Url::parse(&state.history.current().url)
            .ok_or_else(|| SpaError::Host("current history entry is not a URL".to_string()))?;
        let resolved = base
            .resolve(url)
            .filter(|u| u.same_origin(&base))
            .ok_or_else(|| SpaError::Host(format!("cannot write cross-origin entry {url}")))?
            .to_string();
        match mode {
            NavigationMode::Push => state.history.push(&resolved),
            NavigationMode::Replace => state.history.replace(&resolved),
        }
        Ok(())
    }

    fn scroll_to_top(&self) {
        self.state.borrow_mut().scroll_resets += 1;
    }

    fn set_busy(&self, busy: bool) {
        self.state.borrow_mut().busy = busy;
    }

    fn anchor_hrefs(&self) -> Vec<Option<String>> {
        let state = self.state.borrow();
        let in_content = state
            .content
            .as_deref()
            .map(html::anchor_hrefs)
            .unwrap_or_default();
        state
            .chrome_links
            .iter()
            .cloned()
            .chain(in_content)
            .map(Some)
            .collect()
    }

    fn set_anchor_current(&self, index: usize, current: bool) {
        let mut state = self.state.borrow_mut();
        if state.current_marks.len() <= index {
            state.current_marks.resize(index + 1, false);
        }
        state.current_marks[index] = current;
    }

    fn dispatch_page_changed(&self, url: &str) {
        self.state.borrow_mut().events.push(url.to_string());
    }

    fn assign_location(&self, href: &str) {
        self.state.borrow_mut().native_loads.push(href.to_string());
    }
}
