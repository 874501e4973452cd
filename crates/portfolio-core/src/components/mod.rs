#![forbid(unsafe_code)]

//! Page components.
//!
//! Each component is mounted once with a [`Context`], subscribes to whatever
//! it needs, and from then on only reacts to deliveries routed by the page.
//! Components never see each other; the document is their only shared state.
//! A component whose anchor elements are missing subscribes to nothing.

pub mod console_message;
pub mod contact_form;
pub mod easter_egg;
pub mod lazy_images;
pub mod navigation;
pub mod preloader;
pub mod scroll_animations;
pub mod smooth_scroll;

use core::time::Duration;

pub use console_message::ConsoleMessage;
pub use contact_form::ContactForm;
pub use easter_egg::{EasterEgg, KeySequenceStep, KeySequenceTracker};
pub use lazy_images::LazyLoadImages;
pub use navigation::Navigation;
pub use preloader::Preloader;
pub use scroll_animations::ScrollAnimations;
pub use smooth_scroll::SmoothScroll;

use crate::config::{ObserverOptions, PageConfig};
use crate::dom::{Dom, DomEvent, EventType, IntersectionEntry, ListenerId, ObserverId, Target};
use crate::registry::{Owner, Registry};
use crate::timer::{TimerId, TimerQueue};

/// Capabilities handed to a component while it mounts or handles a delivery.
pub struct Context<'a, D: Dom> {
    dom: &'a mut D,
    registry: &'a mut Registry<D::Element>,
    timers: &'a mut TimerQueue<Owner>,
    config: &'a PageConfig,
    owner: Owner,
    default_prevented: bool,
}

impl<'a, D: Dom> Context<'a, D> {
    pub(crate) fn new(
        dom: &'a mut D,
        registry: &'a mut Registry<D::Element>,
        timers: &'a mut TimerQueue<Owner>,
        config: &'a PageConfig,
        owner: Owner,
    ) -> Self {
        Self {
            dom,
            registry,
            timers,
            config,
            owner,
            default_prevented: false,
        }
    }

    #[must_use]
    pub fn dom(&self) -> &D {
        &*self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut *self.dom
    }

    #[must_use]
    pub fn config(&self) -> &'a PageConfig {
        self.config
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Subscribe to `event` on `target` for the lifetime of the page.
    pub fn listen(&mut self, target: Target<D::Element>, event: EventType) -> ListenerId {
        self.subscribe(target, event, false)
    }

    /// Subscribe to the first `event` on `target` only.
    pub fn listen_once(&mut self, target: Target<D::Element>, event: EventType) -> ListenerId {
        self.subscribe(target, event, true)
    }

    fn subscribe(&mut self, target: Target<D::Element>, event: EventType, once: bool) -> ListenerId {
        let id = self
            .registry
            .add_listener(self.owner, target.clone(), event, once);
        self.dom.attach_listener(id, &target, event);
        tracing::trace!(listener = id.0, %event, once, "listener attached");
        id
    }

    pub fn create_observer(&mut self, options: ObserverOptions) -> ObserverId {
        let id = self.registry.add_observer(self.owner);
        self.dom.create_observer(id, &options);
        tracing::trace!(
            observer = id.0,
            threshold = options.threshold,
            root_margin = %options.root_margin,
            "observer created"
        );
        id
    }

    pub fn observe(&mut self, observer: ObserverId, el: &D::Element) {
        if self.registry.observe(observer, el.clone()) {
            self.dom.observe(observer, el);
        }
    }

    pub fn unobserve(&mut self, observer: ObserverId, el: &D::Element) {
        if self.registry.unobserve(observer, el) {
            self.dom.unobserve(observer, el);
        }
    }

    /// Fire-and-forget timer delivered back to this component.
    pub fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.timers.schedule(delay, self.owner)
    }

    /// Cancel the browser's default action for the event being handled.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub(crate) fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A mounted page component.
///
/// All handlers default to no-ops so components only implement what they
/// subscribe to.
pub trait Component<D: Dom> {
    fn name(&self) -> &'static str;

    /// Whether the component found nothing to wire up.
    fn is_inert(&self) -> bool {
        false
    }

    fn on_event(&mut self, cx: &mut Context<'_, D>, target: &Target<D::Element>, event: &DomEvent) {
        let _ = (cx, target, event);
    }

    fn on_intersection(
        &mut self,
        cx: &mut Context<'_, D>,
        observer: ObserverId,
        entries: &[IntersectionEntry<D::Element>],
    ) {
        let _ = (cx, observer, entries);
    }

    fn on_timer(&mut self, cx: &mut Context<'_, D>, timer: TimerId) {
        let _ = (cx, timer);
    }
}
