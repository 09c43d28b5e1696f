//! [`PageHost`] over the live browser document.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, Element, NodeList, Window};

use spalite_nav::config::NavConfig;
use spalite_nav::error::{Result, SpaError};
use spalite_nav::host::{NavigationMode, PageHost};

/// The current document and window.
pub struct DomPage {
    window: Window,
    document: Document,
    region_id: String,
    busy_attribute: String,
    marker_attribute: String,
    marker_value: String,
    page_event: String,
    /// Anchors as of the last `anchor_hrefs` call; indices passed to
    /// `set_anchor_current` refer to this list.
    anchors: RefCell<Option<NodeList>>,
}

impl DomPage {
    pub fn new(window: Window, document: Document, config: &NavConfig) -> Self {
        Self {
            window,
            document,
            region_id: config.content_region_id.clone(),
            busy_attribute: config.busy_attribute.clone(),
            marker_attribute: config.current_marker_attribute.clone(),
            marker_value: config.current_marker_value.clone(),
            page_event: config.page_event.clone(),
            anchors: RefCell::new(None),
        }
    }

    fn region(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.region_id)
    }

    fn history_state() -> JsValue {
        let state = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&state, &"spa".into(), &JsValue::TRUE);
        state.into()
    }
}

fn js_error(context: &str, err: &JsValue) -> SpaError {
    SpaError::Host(format!("{context}: {err:?}"))
}

impl PageHost for DomPage {
    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn has_content_region(&self) -> bool {
        self.region().is_some()
    }

    fn replace_content(&self, inner_html: &str) -> Result<()> {
        let region = self
            .region()
            .ok_or_else(|| SpaError::Host(format!("#{} not found", self.region_id)))?;
        region.set_inner_html(inner_html);
        Ok(())
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn write_history(&self, mode: NavigationMode, url: &str) -> Result<()> {
        let history = self
            .window
            .history()
            .map_err(|e| js_error("history unavailable", &e))?;
        let state = Self::history_state();
        match mode {
            NavigationMode::Push => history.push_state_with_url(&state, "", Some(url)),
            NavigationMode::Replace => history.replace_state_with_url(&state, "", Some(url)),
        }
        .map_err(|e| js_error("history update rejected", &e))
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn set_busy(&self, busy: bool) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        let result = if busy {
            root.set_attribute(&self.busy_attribute, "true")
        } else {
            root.remove_attribute(&self.busy_attribute)
        };
        if let Err(e) = result {
            log::debug!("Busy flag not updated: {e:?}");
        }
    }

    fn anchor_hrefs(&self) -> Vec<Option<String>> {
        let Ok(anchors) = self.document.query_selector_all("a") else {
            return Vec::new();
        };
        let hrefs = (0..anchors.length())
            .map(|i| {
                anchors
                    .item(i)
                    .and_then(|node| node.dyn_into::<Element>().ok())
                    .and_then(|el| el.get_attribute("href"))
            })
            .collect();
        *self.anchors.borrow_mut() = Some(anchors);
        hrefs
    }

    fn set_anchor_current(&self, index: usize, current: bool) {
        let anchors = self.anchors.borrow();
        let Some(element) = anchors
            .as_ref()
            .and_then(|list| list.item(u32::try_from(index).ok()?))
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            return;
        };
        let result = if current {
            element.set_attribute(&self.marker_attribute, &self.marker_value)
        } else {
            element.remove_attribute(&self.marker_attribute)
        };
        if let Err(e) = result {
            log::debug!("Current-page marker not updated: {e:?}");
        }
    }

    fn dispatch_page_changed(&self, url: &str) {
        let detail = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&detail, &"url".into(), &url.into());
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(&self.page_event, &init) {
            Ok(event) => {
                if let Err(e) = self.window.dispatch_event(&event) {
                    log::warn!("Dispatching {} failed: {e:?}", self.page_event);
                }
            },
            Err(e) => log::warn!("Cannot create {} event: {e:?}", self.page_event),
        }
    }

    fn assign_location(&self, href: &str) {
        if let Err(e) = self.window.location().assign(href) {
            log::error!("Native navigation to {href} failed: {e:?}");
        }
    }
}
