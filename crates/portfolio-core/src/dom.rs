#![forbid(unsafe_code)]

//! DOM capability interface.
//!
//! Components never touch a browser directly. Everything they read or mutate
//! goes through [`Dom`], which the web crate implements over `web-sys` and the
//! tests implement with an in-memory document.
//!
//! The trait has two halves:
//! - **document access**: queries, classes, attributes, styles, scrolling,
//!   dialogs and console output;
//! - **wiring hooks**: `attach_listener` / `create_observer` / `observe` and
//!   friends. The runtime calls these when a component subscribes so the host
//!   can connect real browser callbacks. Delivery always flows back through
//!   [`crate::page::Page`], never through the hook itself.

use core::fmt;

use crate::config::ObserverOptions;

/// Identifier of a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

/// Identifier of an intersection observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

/// Document loading phase (`document.readyState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Parse the DOM string form. Unknown values are treated as `Complete`.
    #[must_use]
    pub fn from_dom_str(s: &str) -> Self {
        match s {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }
}

/// Scroll animation requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<E> {
    Window,
    Document,
    Element(E),
}

impl<E> Target<E> {
    /// The element, if this target is one.
    #[must_use]
    pub fn element(&self) -> Option<&E> {
        match self {
            Self::Element(el) => Some(el),
            Self::Window | Self::Document => None,
        }
    }
}

/// Event types the page subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    DomContentLoaded,
    Load,
    Scroll,
    Click,
    Submit,
    KeyDown,
}

impl EventType {
    /// Name used with `addEventListener`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::Load => "load",
            Self::Scroll => "scroll",
            Self::Click => "click",
            Self::Submit => "submit",
            Self::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DOM event as seen by components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    DomContentLoaded,
    Load,
    Scroll,
    Click,
    Submit,
    /// `KeyboardEvent.key`.
    KeyDown { key: String },
}

impl DomEvent {
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::DomContentLoaded => EventType::DomContentLoaded,
            Self::Load => EventType::Load,
            Self::Scroll => EventType::Scroll,
            Self::Click => EventType::Click,
            Self::Submit => EventType::Submit,
            Self::KeyDown { .. } => EventType::KeyDown,
        }
    }

    /// Convenience constructor for key presses.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }
}

/// One entry of an intersection observer callback batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
}

impl<E> IntersectionEntry<E> {
    #[must_use]
    pub fn entering(target: E) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }

    #[must_use]
    pub fn leaving(target: E) -> Self {
        Self {
            target,
            is_intersecting: false,
        }
    }
}

/// Access to the host document.
///
/// Implementations must treat every operation on a missing or detached
/// element as a no-op. Components rely on that instead of error handling.
pub trait Dom {
    /// Opaque element handle.
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    // -- document ----------------------------------------------------------

    fn ready_state(&self) -> ReadyState;
    fn body(&self) -> Option<Self::Element>;
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Resolve an in-page fragment (`#about`) to its element.
    ///
    /// The fragment is an identifier, never a selector: `#a.b` looks up the
    /// id `a.b`. A bare `#` or an empty identifier resolves to nothing.
    fn resolve_fragment(&self, fragment: &str) -> Option<Self::Element> {
        let id = fragment.strip_prefix('#').unwrap_or(fragment);
        if id.is_empty() {
            return None;
        }
        self.element_by_id(id)
    }

    // -- elements ----------------------------------------------------------

    fn attribute(&self, el: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&mut self, el: &Self::Element, name: &str, value: &str);
    fn has_class(&self, el: &Self::Element, class: &str) -> bool;
    fn add_class(&mut self, el: &Self::Element, class: &str);
    fn remove_class(&mut self, el: &Self::Element, class: &str);

    /// Flip `class`. Returns whether the class is present afterwards.
    fn toggle_class(&mut self, el: &Self::Element, class: &str) -> bool {
        if self.has_class(el, class) {
            self.remove_class(el, class);
            false
        } else {
            self.add_class(el, class);
            true
        }
    }

    /// Set an inline style property. An empty value clears it.
    fn set_style(&mut self, el: &Self::Element, property: &str, value: &str);
    fn remove_element(&mut self, el: &Self::Element);
    fn is_connected(&self, el: &Self::Element) -> bool;
    fn offset_top(&self, el: &Self::Element) -> f64;
    fn reset_form(&mut self, el: &Self::Element);

    // -- window ------------------------------------------------------------

    /// Vertical scroll offset of the viewport (`window.pageYOffset`).
    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
    /// Blocking acknowledgment dialog.
    fn alert(&mut self, message: &str);
    fn supports_intersection_observer(&self) -> bool;
    /// Styled developer console line (`console.log("%c" + text, css)`).
    fn console_styled(&mut self, text: &str, css: &str);

    // -- wiring hooks ------------------------------------------------------

    fn attach_listener(&mut self, id: ListenerId, target: &Target<Self::Element>, event: EventType);
    fn detach_listener(&mut self, id: ListenerId);
    fn create_observer(&mut self, id: ObserverId, options: &ObserverOptions);
    fn observe(&mut self, id: ObserverId, el: &Self::Element);
    fn unobserve(&mut self, id: ObserverId, el: &Self::Element);
    fn disconnect_observer(&mut self, id: ObserverId);
}
