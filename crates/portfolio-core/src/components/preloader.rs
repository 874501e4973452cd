#![forbid(unsafe_code)]

//! Loading overlay.
//!
//! Marks the body busy while the page loads. On the window `load` event it
//! waits the grace delay, hides the overlay, clears the busy marker, and
//! after the removal delay detaches the overlay from the document.

use crate::components::{Component, Context};
use crate::dom::{Dom, DomEvent, EventType, ReadyState, Target};
use crate::timer::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for `load`.
    Loading,
    /// Grace timer pending.
    Grace(TimerId),
    /// Hidden, removal timer pending.
    Hiding(TimerId),
    Done,
}

#[derive(Debug)]
pub struct Preloader<E> {
    element: Option<E>,
    phase: Phase,
}

impl<E: Clone + PartialEq> Preloader<E> {
    pub fn mount<D: Dom<Element = E>>(cx: &mut Context<'_, D>) -> Self {
        let config = cx.config();
        let Some(element) = cx.dom().query_selector(&config.selectors.preloader) else {
            return Self {
                element: None,
                phase: Phase::Done,
            };
        };

        if let Some(body) = cx.dom().body() {
            cx.dom_mut().add_class(&body, &config.classes.body_loading);
        }

        // `load` already fired; waiting for it would keep the overlay forever.
        let phase = if cx.dom().ready_state() == ReadyState::Complete {
            Phase::Grace(cx.set_timeout(config.timings.preloader_grace))
        } else {
            cx.listen_once(Target::Window, EventType::Load);
            Phase::Loading
        };

        Self {
            element: Some(element),
            phase,
        }
    }

    fn hide<D: Dom<Element = E>>(&mut self, cx: &mut Context<'_, D>) {
        let Some(element) = self.element.clone() else {
            return;
        };
        let config = cx.config();
        cx.dom_mut()
            .add_class(&element, &config.classes.preloader_hidden);
        if let Some(body) = cx.dom().body() {
            cx.dom_mut().remove_class(&body, &config.classes.body_loading);
        }
        self.phase = Phase::Hiding(cx.set_timeout(config.timings.preloader_removal));
        tracing::debug!("preloader hidden");
    }
}

impl<D: Dom> Component<D> for Preloader<D::Element> {
    fn name(&self) -> &'static str {
        "preloader"
    }

    fn is_inert(&self) -> bool {
        self.element.is_none()
    }

    fn on_event(&mut self, cx: &mut Context<'_, D>, _target: &Target<D::Element>, event: &DomEvent) {
        if *event == DomEvent::Load && self.phase == Phase::Loading {
            let grace = cx.config().timings.preloader_grace;
            self.phase = Phase::Grace(cx.set_timeout(grace));
        }
    }

    fn on_timer(&mut self, cx: &mut Context<'_, D>, timer: TimerId) {
        match self.phase {
            Phase::Grace(id) if id == timer => self.hide(cx),
            Phase::Hiding(id) if id == timer => {
                self.phase = Phase::Done;
                if let Some(element) = self.element.take()
                    && cx.dom().is_connected(&element)
                {
                    cx.dom_mut().remove_element(&element);
                    tracing::debug!("preloader removed");
                }
            }
            _ => {}
        }
    }
}
