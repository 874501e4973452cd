#![forbid(unsafe_code)]

//! [`Dom`] over `web-sys`.
//!
//! Wiring hooks create JS closures that hold a weak reference to the page.
//! Each native listener delivers to its own [`ListenerId`] only; the browser
//! supplies the fan-out across listeners on the same target.
//! Every delivery goes through [`pump`], which advances the page clock to
//! `performance.now()`, runs the delivery, then re-arms the single wakeup
//! timeout to the next pending page timer.
//!
//! A closure is never dropped while it might be on the JS stack: detached
//! callbacks are parked and released on the next pump.

use std::cell::RefCell;
use std::rc::Weak;

use core::time::Duration;

use js_sys::{Array, Reflect};
use portfolio_core::config::ObserverOptions;
use portfolio_core::dom::{
    Dom, DomEvent, EventType, IntersectionEntry, ListenerId, ObserverId, ReadyState,
    ScrollBehavior, Target,
};
use portfolio_core::page::Page;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, ScrollToOptions, Window,
};

pub(crate) type WeakPage = Weak<RefCell<Page<WebDom>>>;

type EventCallback = Closure<dyn FnMut(Event)>;
type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct AttachedListener {
    id: ListenerId,
    target: EventTarget,
    event: EventType,
    callback: EventCallback,
}

struct AttachedObserver {
    id: ObserverId,
    observer: IntersectionObserver,
    callback: ObserverCallback,
}

/// Browser document bound to one page.
pub struct WebDom {
    window: Window,
    document: Document,
    page: WeakPage,
    listeners: Vec<AttachedListener>,
    observers: Vec<AttachedObserver>,
    retired_listeners: Vec<EventCallback>,
    retired_observers: Vec<ObserverCallback>,
    wakeup: Option<Closure<dyn FnMut()>>,
    wakeup_handle: Option<i32>,
}

impl core::fmt::Debug for WebDom {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebDom")
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .field("wakeup_handle", &self.wakeup_handle)
            .finish()
    }
}

fn warn_js(op: &'static str, err: &JsValue) {
    tracing::warn!(op, error = ?err, "dom call failed");
}

impl WebDom {
    pub(crate) fn new(window: Window, document: Document, page: WeakPage) -> Self {
        Self {
            window,
            document,
            page,
            listeners: Vec::new(),
            observers: Vec::new(),
            retired_listeners: Vec::new(),
            retired_observers: Vec::new(),
            wakeup: None,
            wakeup_handle: None,
        }
    }

    /// `performance.now()` as a page timestamp.
    pub(crate) fn now(&self) -> Duration {
        let millis = self
            .window
            .performance()
            .map_or(0.0, |performance| performance.now());
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }

    /// Replace the pending wakeup with one firing after `delay`, if any.
    fn schedule_wakeup(&mut self, delay: Option<Duration>) {
        if let Some(handle) = self.wakeup_handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let Some(delay) = delay else {
            return;
        };

        let weak = self.page.clone();
        let callback = self
            .wakeup
            .get_or_insert_with(|| Closure::new(move || pump(&weak, |_| {})));
        // Round up so the wakeup never lands just before the deadline.
        let millis = (delay.as_secs_f64() * 1000.0).ceil().min(f64::from(i32::MAX)) as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            ) {
            Ok(handle) => self.wakeup_handle = Some(handle),
            Err(err) => warn_js("setTimeout", &err),
        }
    }

    fn release_retired(&mut self) {
        self.retired_listeners.clear();
        self.retired_observers.clear();
    }

    fn event_target(&self, target: &Target<Element>) -> EventTarget {
        match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
            Target::Element(el) => el.clone().into(),
        }
    }

    fn observer(&self, id: ObserverId) -> Option<&IntersectionObserver> {
        self.observers
            .iter()
            .find(|attached| attached.id == id)
            .map(|attached| &attached.observer)
    }
}

impl Drop for WebDom {
    fn drop(&mut self) {
        for attached in &self.listeners {
            if let Err(err) = attached.target.remove_event_listener_with_callback(
                attached.event.as_str(),
                attached.callback.as_ref().unchecked_ref(),
            ) {
                warn_js("removeEventListener", &err);
            }
        }
        for attached in &self.observers {
            attached.observer.disconnect();
        }
        if let Some(handle) = self.wakeup_handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// Translate a browser event for a listener registered as `kind`.
fn to_dom_event(kind: EventType, event: &Event) -> Option<DomEvent> {
    Some(match kind {
        EventType::DomContentLoaded => DomEvent::DomContentLoaded,
        EventType::Load => DomEvent::Load,
        EventType::Scroll => DomEvent::Scroll,
        EventType::Click => DomEvent::Click,
        EventType::Submit => DomEvent::Submit,
        EventType::KeyDown => DomEvent::key(event.dyn_ref::<KeyboardEvent>()?.key()),
    })
}

fn to_web_behavior(behavior: ScrollBehavior) -> web_sys::ScrollBehavior {
    match behavior {
        ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
    }
}

/// Run `deliver` against the live page at the current time.
///
/// Drops the delivery if the page is gone or already borrowed (a nested
/// browser callback during an in-progress delivery).
pub(crate) fn pump(page: &WeakPage, deliver: impl FnOnce(&mut Page<WebDom>)) {
    let Some(shared) = page.upgrade() else {
        return;
    };
    let Ok(mut page) = shared.try_borrow_mut() else {
        tracing::warn!("page busy; dropping nested delivery");
        return;
    };

    page.dom_mut().release_retired();
    let now = page.dom().now();
    page.advance_to(now);
    deliver(&mut page);
    rearm(&mut page);
}

/// Point the wakeup timeout at the page's next deadline.
pub(crate) fn rearm(page: &mut Page<WebDom>) {
    let now = page.now();
    let delay = page.next_deadline().map(|due| due.saturating_sub(now));
    page.dom_mut().schedule_wakeup(delay);
}

impl Dom for WebDom {
    type Element = Element;

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_dom_str(&self.document.ready_state())
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn query_selector(&self, selector: &str) -> Option<Element> {
        match self.document.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(selector, error = ?err, "invalid selector");
                None
            }
        }
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(selector, error = ?err, "invalid selector");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|idx| list.item(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn attribute(&self, el: &Element, name: &str) -> Option<String> {
        el.get_attribute(name)
    }

    fn set_attribute(&mut self, el: &Element, name: &str, value: &str) {
        if let Err(err) = el.set_attribute(name, value) {
            warn_js("setAttribute", &err);
        }
    }

    fn has_class(&self, el: &Element, class: &str) -> bool {
        el.class_list().contains(class)
    }

    fn add_class(&mut self, el: &Element, class: &str) {
        if let Err(err) = el.class_list().add_1(class) {
            warn_js("classList.add", &err);
        }
    }

    fn remove_class(&mut self, el: &Element, class: &str) {
        if let Err(err) = el.class_list().remove_1(class) {
            warn_js("classList.remove", &err);
        }
    }

    fn toggle_class(&mut self, el: &Element, class: &str) -> bool {
        match el.class_list().toggle(class) {
            Ok(present) => present,
            Err(err) => {
                warn_js("classList.toggle", &err);
                self.has_class(el, class)
            }
        }
    }

    fn set_style(&mut self, el: &Element, property: &str, value: &str) {
        let Some(el) = el.dyn_ref::<HtmlElement>() else {
            return;
        };
        // An empty value removes the declaration.
        if let Err(err) = el.style().set_property(property, value) {
            warn_js("style.setProperty", &err);
        }
    }

    fn remove_element(&mut self, el: &Element) {
        el.remove();
    }

    fn is_connected(&self, el: &Element) -> bool {
        el.is_connected()
    }

    fn offset_top(&self, el: &Element) -> f64 {
        el.dyn_ref::<HtmlElement>()
            .map_or(0.0, |el| f64::from(el.offset_top()))
    }

    fn reset_form(&mut self, el: &Element) {
        if let Some(form) = el.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or_default()
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(to_web_behavior(behavior));
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn alert(&mut self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            warn_js("alert", &err);
        }
    }

    fn supports_intersection_observer(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn console_styled(&mut self, text: &str, css: &str) {
        web_sys::console::log_2(
            &JsValue::from_str(&format!("%c{text}")),
            &JsValue::from_str(css),
        );
    }

    fn attach_listener(&mut self, id: ListenerId, target: &Target<Element>, event: EventType) {
        let event_target = self.event_target(target);
        let weak = self.page.clone();
        let routed = target.clone();
        let callback = EventCallback::new(move |raw: Event| {
            let Some(dom_event) = to_dom_event(event, &raw) else {
                return;
            };
            pump(&weak, |page| {
                if page.dispatch_listener(id, &routed, &dom_event).default_prevented {
                    raw.prevent_default();
                }
            });
        });

        if let Err(err) = event_target
            .add_event_listener_with_callback(event.as_str(), callback.as_ref().unchecked_ref())
        {
            warn_js("addEventListener", &err);
            return;
        }
        tracing::trace!(listener = id.0, %event, "attached");
        self.listeners.push(AttachedListener {
            id,
            target: event_target,
            event,
            callback,
        });
    }

    fn detach_listener(&mut self, id: ListenerId) {
        let Some(pos) = self.listeners.iter().position(|attached| attached.id == id) else {
            return;
        };
        let attached = self.listeners.remove(pos);
        if let Err(err) = attached.target.remove_event_listener_with_callback(
            attached.event.as_str(),
            attached.callback.as_ref().unchecked_ref(),
        ) {
            warn_js("removeEventListener", &err);
        }
        self.retired_listeners.push(attached.callback);
    }

    fn create_observer(&mut self, id: ObserverId, options: &ObserverOptions) {
        let weak = self.page.clone();
        let callback = ObserverCallback::new(move |entries: Array, _observer: IntersectionObserver| {
            let batch: Vec<IntersectionEntry<Element>> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionEntry {
                    target: entry.target(),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect();
            pump(&weak, |page| {
                page.deliver_intersections(id, batch);
            });
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_string());
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => self.observers.push(AttachedObserver {
                id,
                observer,
                callback,
            }),
            Err(err) => warn_js("new IntersectionObserver", &err),
        }
    }

    fn observe(&mut self, id: ObserverId, el: &Element) {
        if let Some(observer) = self.observer(id) {
            observer.observe(el);
        }
    }

    fn unobserve(&mut self, id: ObserverId, el: &Element) {
        if let Some(observer) = self.observer(id) {
            observer.unobserve(el);
        }
    }

    fn disconnect_observer(&mut self, id: ObserverId) {
        let Some(pos) = self.observers.iter().position(|attached| attached.id == id) else {
            return;
        };
        let attached = self.observers.remove(pos);
        attached.observer.disconnect();
        self.retired_observers.push(attached.callback);
    }
}
