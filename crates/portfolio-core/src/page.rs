#![forbid(unsafe_code)]

//! Host-driven page runtime.
//!
//! [`Page`] owns the document handle, the components, and the bookkeeping for
//! listeners, observers and timers. It never blocks and never reads a wall
//! clock. The host drives it:
//!
//! 1. [`Page::start`] once. Mounting happens now, or on `DOMContentLoaded`
//!    when the document is still loading.
//! 2. [`Page::dispatch`] for every DOM event the host receives, or
//!    [`Page::dispatch_listener`] when the host wires one native listener per
//!    registered listener.
//! 3. [`Page::deliver_intersections`] for every observer callback batch.
//! 4. [`Page::advance_to`] / [`Page::advance_time`] to fire due timers, and
//!    [`Page::next_deadline`] to know when to call back.
//!
//! # Example
//!
//! ```
//! use portfolio_core::config::PageConfig;
//! use portfolio_core::dom::{DomEvent, Target};
//! use portfolio_core::page::Page;
//! use portfolio_core::testing::FakeDocument;
//! use core::time::Duration;
//!
//! let mut doc = FakeDocument::new();
//! let nav = doc.add("nav", &[("class", "navbar")]);
//!
//! let mut page = Page::new(doc, PageConfig::default());
//! page.start();
//!
//! page.dom_mut().set_scroll_y(250.0);
//! page.dispatch(&Target::Window, &DomEvent::Scroll);
//! assert!(page.dom().classes(nav).contains(&"navbar--scrolled".to_string()));
//!
//! page.advance_time(Duration::from_millis(16));
//! ```

use core::time::Duration;

use crate::components::{
    Component, ConsoleMessage, ContactForm, Context, EasterEgg, LazyLoadImages, Navigation,
    Preloader, ScrollAnimations, SmoothScroll,
};
use crate::config::PageConfig;
use crate::dom::{
    Dom, DomEvent, EventType, IntersectionEntry, ListenerId, ObserverId, ReadyState, Target,
};
use crate::registry::{Matched, Owner, Registry};
use crate::timer::TimerQueue;

/// Result of a single [`Page::dispatch`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Number of listeners the event was delivered to.
    pub delivered: u32,
    /// Some listener asked to cancel the browser default action.
    pub default_prevented: bool,
}

/// The page application: every component plus the machinery that routes
/// deliveries to them.
pub struct Page<D: Dom> {
    dom: D,
    config: PageConfig,
    registry: Registry<D::Element>,
    timers: TimerQueue<Owner>,
    components: Vec<Box<dyn Component<D>>>,
    started: bool,
    mounted: bool,
}

impl<D: Dom> Page<D> {
    #[must_use]
    pub fn new(dom: D, config: PageConfig) -> Self {
        Self {
            dom,
            config,
            registry: Registry::new(),
            timers: TimerQueue::new(),
            components: Vec::new(),
            started: false,
            mounted: false,
        }
    }

    /// Mount the components now, or once the DOM is ready.
    ///
    /// Calling this more than once has no effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        if self.dom.ready_state() == ReadyState::Loading {
            tracing::debug!("document loading, deferring mount to DOMContentLoaded");
            let id = self.registry.add_listener(
                Owner::Page,
                Target::Document,
                EventType::DomContentLoaded,
                true,
            );
            self.dom
                .attach_listener(id, &Target::Document, EventType::DomContentLoaded);
        } else {
            self.mount_components();
        }
    }

    fn mount_components(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        self.mount_one(|cx| Preloader::mount(cx));
        self.mount_one(|cx| Navigation::mount(cx));
        self.mount_one(|cx| SmoothScroll::mount(cx));
        self.mount_one(|cx| ContactForm::mount(cx));
        self.mount_one(|cx| ScrollAnimations::mount(cx));
        self.mount_one(|cx| LazyLoadImages::mount(cx));
        self.mount_one(|cx| EasterEgg::mount(cx));
        self.mount_one(|cx| ConsoleMessage::mount(cx));

        tracing::info!(
            components = self.components.len(),
            listeners = self.registry.listener_count(),
            observers = self.registry.observer_count(),
            "portfolio initialized"
        );
    }

    fn mount_one<C, F>(&mut self, mount: F)
    where
        C: Component<D> + 'static,
        F: FnOnce(&mut Context<'_, D>) -> C,
    {
        let owner = Owner::Component(self.components.len());
        let mut cx = Context::new(
            &mut self.dom,
            &mut self.registry,
            &mut self.timers,
            &self.config,
            owner,
        );
        let component = mount(&mut cx);
        tracing::debug!(
            component = Component::<D>::name(&component),
            inert = Component::<D>::is_inert(&component),
            listeners = self.registry.listeners_of(owner),
            "component mounted"
        );
        self.components.push(Box::new(component));
    }

    /// Deliver `event` on `target` to every matching listener in
    /// registration order.
    ///
    /// For hosts that attach one native listener per `(target, event)`.
    pub fn dispatch(&mut self, target: &Target<D::Element>, event: &DomEvent) -> DispatchOutcome {
        let matched = self.registry.take_matching(target, event.event_type());
        let mut outcome = DispatchOutcome::default();
        for listener in matched {
            self.deliver(listener, target, event, &mut outcome);
        }
        outcome
    }

    /// Deliver `event` to listener `id` only.
    ///
    /// For hosts that attach one native listener per [`ListenerId`], as the
    /// browser binding does; the browser then supplies the fan-out and the
    /// registration order. Nothing is delivered if `id` was removed or is
    /// registered for a different target or event.
    pub fn dispatch_listener(
        &mut self,
        id: ListenerId,
        target: &Target<D::Element>,
        event: &DomEvent,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if let Some(listener) = self.registry.take_listener(id, target, event.event_type()) {
            self.deliver(listener, target, event, &mut outcome);
        }
        outcome
    }

    fn deliver(
        &mut self,
        listener: Matched,
        target: &Target<D::Element>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    ) {
        outcome.delivered += 1;
        if listener.removed {
            self.dom.detach_listener(listener.id);
        }
        match listener.owner {
            Owner::Page => {
                if *event == DomEvent::DomContentLoaded {
                    self.mount_components();
                }
            }
            Owner::Component(idx) => {
                let Some(component) = self.components.get_mut(idx) else {
                    return;
                };
                let mut cx = Context::new(
                    &mut self.dom,
                    &mut self.registry,
                    &mut self.timers,
                    &self.config,
                    listener.owner,
                );
                component.on_event(&mut cx, target, event);
                outcome.default_prevented |= cx.default_prevented();
            }
        }
    }

    /// Deliver one observer callback batch. Entries for elements the
    /// observer no longer watches are dropped first. Returns the number of
    /// entries delivered.
    pub fn deliver_intersections(
        &mut self,
        observer: ObserverId,
        entries: Vec<IntersectionEntry<D::Element>>,
    ) -> usize {
        let entries = self.registry.filter_observed(observer, entries);
        if entries.is_empty() {
            return 0;
        }
        let Some(owner @ Owner::Component(idx)) = self.registry.observer_owner(observer) else {
            return 0;
        };
        let Some(component) = self.components.get_mut(idx) else {
            return 0;
        };
        let mut cx = Context::new(
            &mut self.dom,
            &mut self.registry,
            &mut self.timers,
            &self.config,
            owner,
        );
        component.on_intersection(&mut cx, observer, &entries);
        entries.len()
    }

    /// Move the clock to `now`, firing every timer due on the way. Returns
    /// the number of timers fired.
    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some((timer, owner)) = self.timers.pop_due(now) {
            fired += 1;
            let Owner::Component(idx) = owner else {
                continue;
            };
            let Some(component) = self.components.get_mut(idx) else {
                continue;
            };
            let mut cx = Context::new(
                &mut self.dom,
                &mut self.registry,
                &mut self.timers,
                &self.config,
                owner,
            );
            component.on_timer(&mut cx, timer);
        }
        self.timers.settle(now);
        if fired > 0 {
            tracing::trace!(fired, now_ms = now.as_millis() as u64, "timers fired");
        }
        fired
    }

    /// Advance the clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) -> usize {
        self.advance_to(self.timers.now().saturating_add(dt))
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Due time of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Detach every listener and observer from the host document and cancel
    /// pending timers.
    ///
    /// Components stay mounted but receive nothing further.
    pub fn shutdown(&mut self) {
        for id in self.registry.listener_ids() {
            self.dom.detach_listener(id);
        }
        for id in self.registry.observer_ids() {
            self.dom.disconnect_observer(id);
        }
        self.registry.clear();
        let cancelled = self.timers.cancel_all();
        tracing::debug!(cancelled, "page shut down");
    }

    // -- inspection --------------------------------------------------------

    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Component names in mount order.
    #[must_use]
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Components that found nothing to wire up.
    #[must_use]
    pub fn inert_components(&self) -> Vec<&'static str> {
        self.components
            .iter()
            .filter(|c| c.is_inert())
            .map(|c| c.name())
            .collect()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    /// Listeners registered by the component named `name`.
    #[must_use]
    pub fn listeners_of(&self, name: &str) -> usize {
        self.components
            .iter()
            .position(|c| c.name() == name)
            .map_or(0, |idx| self.registry.listeners_of(Owner::Component(idx)))
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registry.observer_count()
    }

    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.registry.observed_count()
    }
}

impl<D: Dom + core::fmt::Debug> core::fmt::Debug for Page<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Page")
            .field("dom", &self.dom)
            .field("components", &self.component_names())
            .field("listeners", &self.registry.listener_count())
            .field("observers", &self.registry.observer_count())
            .field("pending_timers", &self.timers.len())
            .field("mounted", &self.mounted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDocument;
    use pretty_assertions::assert_eq;

    const MOUNT_ORDER: [&str; 8] = [
        "preloader",
        "navigation",
        "smooth_scroll",
        "contact_form",
        "scroll_animations",
        "lazy_images",
        "easter_egg",
        "console_message",
    ];

    #[test]
    fn mounts_immediately_when_dom_ready() {
        let mut page = Page::new(FakeDocument::new(), PageConfig::default());
        page.start();
        assert!(page.is_mounted());
        assert_eq!(page.component_names(), MOUNT_ORDER.to_vec());
    }

    #[test]
    fn defers_mount_until_dom_content_loaded() {
        let mut doc = FakeDocument::new();
        doc.set_ready_state(ReadyState::Loading);
        let mut page = Page::new(doc, PageConfig::default());
        page.start();
        assert!(!page.is_mounted());
        assert_eq!(page.listener_count(), 1);
        assert_eq!(page.dom().console_lines().len(), 0);

        let outcome = page.dispatch(&Target::Document, &DomEvent::DomContentLoaded);
        assert_eq!(outcome.delivered, 1);
        assert!(page.is_mounted());
        assert_eq!(page.component_names(), MOUNT_ORDER.to_vec());
        assert_eq!(page.dom().console_lines().len(), 3);

        // The readiness listener was one-shot.
        page.dispatch(&Target::Document, &DomEvent::DomContentLoaded);
        assert_eq!(page.component_names().len(), 8);
    }

    #[test]
    fn start_is_idempotent() {
        let mut page = Page::new(FakeDocument::new(), PageConfig::default());
        page.start();
        page.start();
        assert_eq!(page.component_names().len(), 8);
        assert_eq!(page.dom().console_lines().len(), 3);
    }

    #[test]
    fn empty_document_leaves_most_components_inert() {
        let mut page = Page::new(FakeDocument::new(), PageConfig::default());
        page.start();
        assert_eq!(
            page.inert_components(),
            vec![
                "preloader",
                "navigation",
                "smooth_scroll",
                "contact_form",
                "scroll_animations",
                "lazy_images",
            ]
        );
        // Only the easter egg's document keydown listener remains.
        assert_eq!(page.listener_count(), 1);
        assert_eq!(page.observer_count(), 0);
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn shutdown_detaches_everything() {
        let mut doc = FakeDocument::new();
        doc.add("nav", &[("class", "navbar")]);
        doc.add("section", &[("id", "about")]);
        doc.add("div", &[("id", "preloader")]);
        let mut page = Page::new(doc, PageConfig::default());
        page.start();
        assert!(page.dom().attached_listeners() > 0);
        assert_eq!(page.dom().observer_count(), 1);
        assert_eq!(page.pending_timers(), 1);

        page.shutdown();
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.dom().attached_listeners(), 0);
        assert_eq!(page.dom().observer_count(), 0);
        assert_eq!(page.pending_timers(), 0);
        let outcome = page.dispatch(&Target::Window, &DomEvent::Scroll);
        assert_eq!(outcome.delivered, 0);
    }
}
