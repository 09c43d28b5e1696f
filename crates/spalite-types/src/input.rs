//! Host-agnostic pointer input.
//!
//! The browser binding maps native `MouseEvent`s and the anchor under the
//! pointer to these types. The navigation core never sees DOM objects.

use serde::{Deserialize, Serialize};

/// Mouse buttons as reported by `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Back,
    Forward,
    Other(i16),
}

impl PointerButton {
    /// Map the DOM `button` code.
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => PointerButton::Primary,
            1 => PointerButton::Auxiliary,
            2 => PointerButton::Secondary,
            3 => PointerButton::Back,
            4 => PointerButton::Forward,
            other => PointerButton::Other(other),
        }
    }
}

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Modifiers = Modifiers {
        meta: false,
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub fn any(&self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// The attributes of an `<a>` element that decide interception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorSnapshot {
    /// Raw `href` attribute, unresolved.
    pub href: Option<String>,
    /// Raw `target` attribute.
    pub target: Option<String>,
    /// Raw `rel` attribute.
    pub rel: Option<String>,
    /// Whether a `download` attribute is present.
    pub download: bool,
}

impl AnchorSnapshot {
    /// Anchor with only an `href`.
    pub fn with_href(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            ..Self::default()
        }
    }

    /// `target` is empty or `_self`.
    pub fn targets_current_frame(&self) -> bool {
        match self.target.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(t) => t.eq_ignore_ascii_case("_self"),
        }
    }

    /// `rel` lists the `external` keyword.
    pub fn is_external(&self) -> bool {
        self.rel
            .as_deref()
            .is_some_and(|rel| rel.to_ascii_lowercase().contains("external"))
    }
}

/// A click as seen by the navigation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub button: PointerButton,
    pub modifiers: Modifiers,
    /// Another handler already called `preventDefault()`.
    pub default_prevented: bool,
    /// Event timestamp in milliseconds (`Event.timeStamp`).
    pub timestamp_ms: f64,
    /// Closest `<a>` ancestor of the event target, if any.
    pub anchor: Option<AnchorSnapshot>,
}

impl ClickEvent {
    /// A plain primary-button click on `anchor` at `timestamp_ms`.
    pub fn primary(anchor: AnchorSnapshot, timestamp_ms: f64) -> Self {
        Self {
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            default_prevented: false,
            timestamp_ms,
            anchor: Some(anchor),
        }
    }
}

/// What the host should do with a click after the controller looked at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDecision {
    /// Let the browser handle it.
    Ignore,
    /// Prevent the default action and do nothing else (throttled).
    Suppress,
    /// Prevent the default action and navigate to the contained href.
    Intercept(String),
}

impl ClickDecision {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, ClickDecision::Ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_button_codes() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Auxiliary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(7), PointerButton::Other(7));
    }

    #[test]
    fn modifiers_any() {
        assert!(!Modifiers::NONE.any());
        let m = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        assert!(m.any());
    }

    #[test]
    fn target_frame_detection() {
        let mut a = AnchorSnapshot::with_href("/pricing");
        assert!(a.targets_current_frame());
        a.target = Some("_SELF".into());
        assert!(a.targets_current_frame());
        a.target = Some("_blank".into());
        assert!(!a.targets_current_frame());
        a.target = Some("  ".into());
        assert!(a.targets_current_frame());
    }

    #[test]
    fn external_rel_detection() {
        let mut a = AnchorSnapshot::with_href("/pricing");
        assert!(!a.is_external());
        a.rel = Some("noopener External".into());
        assert!(a.is_external());
    }

    #[test]
    fn decisions_that_prevent_default() {
        assert!(!ClickDecision::Ignore.prevents_default());
        assert!(ClickDecision::Suppress.prevents_default());
        assert!(ClickDecision::Intercept("/a".into()).prevents_default());
    }

    #[test]
    fn primary_click_builder() {
        let e = ClickEvent::primary(AnchorSnapshot::with_href("/a"), 12.5);
        assert_eq!(e.button, PointerButton::Primary);
        assert!(!e.modifiers.any());
        assert!(!e.default_prevented);
        assert_eq!(e.anchor.unwrap().href.as_deref(), Some("/a"));
    }
}
