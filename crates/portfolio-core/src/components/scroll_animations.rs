#![forbid(unsafe_code)]

//! One-shot reveal of cards as they scroll into view.
//!
//! Targets start transparent and shifted down. When an observer batch reports
//! a target intersecting, the reveal is scheduled `index * stagger` later,
//! where `index` is the entry's position in the batch, and the target is
//! unobserved immediately so it is revealed exactly once.

use crate::components::{Component, Context};
use crate::dom::{Dom, IntersectionEntry, ObserverId};
use crate::timer::TimerId;

#[derive(Debug)]
pub struct ScrollAnimations<E> {
    observer: Option<ObserverId>,
    pending: Vec<(TimerId, E)>,
}

impl<E: Clone + PartialEq> ScrollAnimations<E> {
    pub fn mount<D: Dom<Element = E>>(cx: &mut Context<'_, D>) -> Self {
        let config = cx.config();
        let targets = cx
            .dom()
            .query_selector_all(&config.selectors.animate_on_scroll);
        if targets.is_empty() {
            return Self {
                observer: None,
                pending: Vec::new(),
            };
        }

        let observer = cx.create_observer(config.observers.reveal);
        let style = &config.reveal;
        for el in &targets {
            let dom = cx.dom_mut();
            dom.set_style(el, "opacity", &style.hidden_opacity);
            dom.set_style(el, "transform", &style.hidden_transform);
            dom.set_style(el, "transition", &style.transition);
            cx.observe(observer, el);
        }
        tracing::debug!(targets = targets.len(), "reveal targets prepared");

        Self {
            observer: Some(observer),
            pending: Vec::new(),
        }
    }
}

impl<D: Dom> Component<D> for ScrollAnimations<D::Element> {
    fn name(&self) -> &'static str {
        "scroll_animations"
    }

    fn is_inert(&self) -> bool {
        self.observer.is_none()
    }

    fn on_intersection(
        &mut self,
        cx: &mut Context<'_, D>,
        observer: ObserverId,
        entries: &[IntersectionEntry<D::Element>],
    ) {
        if self.observer != Some(observer) {
            return;
        }
        let stagger = cx.config().timings.reveal_stagger;
        for (index, entry) in entries.iter().enumerate() {
            if !entry.is_intersecting {
                continue;
            }
            let delay = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            let timer = cx.set_timeout(delay);
            self.pending.push((timer, entry.target.clone()));
            cx.unobserve(observer, &entry.target);
        }
    }

    fn on_timer(&mut self, cx: &mut Context<'_, D>, timer: TimerId) {
        let Some(pos) = self.pending.iter().position(|(id, _)| *id == timer) else {
            return;
        };
        let (_, el) = self.pending.remove(pos);
        let style = &cx.config().reveal;
        let dom = cx.dom_mut();
        dom.set_style(&el, "opacity", &style.shown_opacity);
        dom.set_style(&el, "transform", &style.shown_transform);
    }
}
