//! spalite browser binding.
//!
//! Loaded as a module on every page of the site. On start it reads the
//! optional `<script type="application/json" id="spalite-config">` block,
//! builds a [`NavigationController`] over the live document and installs
//! the click, popstate and hover listeners that drive it.

mod dom;
mod fetch;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlAnchorElement, MouseEvent, Window};

use spalite_nav::config::NavConfig;
use spalite_nav::input::{AnchorSnapshot, ClickDecision, ClickEvent, Modifiers, PointerButton};
use spalite_nav::{NavigationController, NavigationMode, PathNormalizer};

pub use dom::DomPage;
pub use fetch::DomFetcher;

/// Id of the inline JSON config block.
pub const CONFIG_ELEMENT_ID: &str = "spalite-config";

type WebController = NavigationController<DomPage, DomFetcher>;
type Listener = Closure<dyn FnMut(Event)>;

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<WebController>>> = const { RefCell::new(None) };
    static LISTENERS: RefCell<Vec<Listener>> = const { RefCell::new(Vec::new()) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if CONTROLLER.with(|slot| slot.borrow().is_some()) {
        return Ok(());
    }

    let config = read_config(&document);
    let page = DomPage::new(window.clone(), document.clone(), &config);
    let controller = NavigationController::new(config, page, DomFetcher::new(window.clone()))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let controller = Rc::new(controller);
    controller.start();

    install_listeners(&window, &document, &controller)?;
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
    log::info!("spalite navigation active");
    Ok(())
}

/// Clean display path for `path` (`/pricing.html` -> `/pricing`), using
/// the active configuration once started.
#[wasm_bindgen(js_name = toDisplayPath)]
pub fn to_display_path(path: &str) -> String {
    with_normalizer(|n| n.to_display_path(path))
}

/// Resource path serving `path` (`/pricing` -> `/pricing.html`).
#[wasm_bindgen(js_name = toFetchPath)]
pub fn to_fetch_path(path: &str) -> String {
    with_normalizer(|n| n.to_fetch_path(path))
}

/// Drop every cached page, e.g. after content was edited in place.
#[wasm_bindgen(js_name = clearPageCache)]
pub fn clear_page_cache() {
    CONTROLLER.with(|slot| {
        if let Some(controller) = slot.borrow().as_ref() {
            controller.clear_cache();
        }
    });
}

fn with_normalizer<T>(f: impl FnOnce(&PathNormalizer) -> T) -> T {
    CONTROLLER.with(|slot| match slot.borrow().as_ref() {
        Some(controller) => f(controller.normalizer()),
        None => f(&PathNormalizer::default()),
    })
}

fn read_config(document: &Document) -> NavConfig {
    let Some(source) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return NavConfig::default();
    };
    match NavConfig::from_json(&source).and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring #{CONFIG_ELEMENT_ID}: {e}");
            NavConfig::default()
        },
    }
}

// ---------------------------------------------------------------------------
// Event wiring
// ---------------------------------------------------------------------------

fn install_listeners(
    window: &Window,
    document: &Document,
    controller: &Rc<WebController>,
) -> Result<(), JsValue> {
    let ctl = Rc::clone(controller);
    let on_click = Listener::wrap(Box::new(move |event: Event| handle_click(&ctl, &event)));
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

    let ctl = Rc::clone(controller);
    let on_popstate = Listener::wrap(Box::new(move |_event: Event| {
        let ctl = Rc::clone(&ctl);
        spawn_local(async move {
            ctl.handle_popstate().await;
        });
    }));
    window.add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())?;

    let ctl = Rc::clone(controller);
    let on_hover = Listener::wrap(Box::new(move |event: Event| {
        let Some(anchor) = anchor_from_event(&event) else {
            return;
        };
        let snapshot = snapshot(&anchor);
        let ctl = Rc::clone(&ctl);
        spawn_local(async move {
            ctl.prefetch(&snapshot).await;
        });
    }));
    document.add_event_listener_with_callback("mouseover", on_hover.as_ref().unchecked_ref())?;

    LISTENERS.with(|slot| slot.borrow_mut().extend([on_click, on_popstate, on_hover]));
    Ok(())
}

fn handle_click(controller: &Rc<WebController>, event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let click = ClickEvent {
        button: PointerButton::from_dom(mouse.button()),
        modifiers: Modifiers {
            meta: mouse.meta_key(),
            ctrl: mouse.ctrl_key(),
            shift: mouse.shift_key(),
            alt: mouse.alt_key(),
        },
        default_prevented: event.default_prevented(),
        timestamp_ms: event.time_stamp(),
        anchor: anchor_from_event(event).map(|a| snapshot(&a)),
    };

    let decision = controller.handle_click(&click);
    if decision.prevents_default() {
        event.prevent_default();
    }
    if let ClickDecision::Intercept(href) = decision {
        let ctl = Rc::clone(controller);
        spawn_local(async move {
            ctl.navigate(&href, NavigationMode::Push).await;
        });
    }
}

/// Nearest anchor at or above the event target.
fn anchor_from_event(event: &Event) -> Option<HtmlAnchorElement> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest("a").ok()??.dyn_into::<HtmlAnchorElement>().ok()
}

fn snapshot(anchor: &HtmlAnchorElement) -> AnchorSnapshot {
    AnchorSnapshot {
        href: anchor.get_attribute("href"),
        target: anchor.get_attribute("target"),
        rel: anchor.get_attribute("rel"),
        download: anchor.has_attribute("download"),
    }
}
