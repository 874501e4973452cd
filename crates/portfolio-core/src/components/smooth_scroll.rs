#![forbid(unsafe_code)]

//! In-page anchor navigation with smooth scrolling.

use crate::components::{Component, Context};
use crate::dom::{Dom, DomEvent, EventType, ScrollBehavior, Target};

#[derive(Debug)]
pub struct SmoothScroll<E> {
    anchors: Vec<E>,
}

impl<E: Clone + PartialEq> SmoothScroll<E> {
    pub fn mount<D: Dom<Element = E>>(cx: &mut Context<'_, D>) -> Self {
        let anchors = cx
            .dom()
            .query_selector_all(&cx.config().selectors.in_page_anchor);
        for anchor in &anchors {
            cx.listen(Target::Element(anchor.clone()), EventType::Click);
        }
        Self { anchors }
    }
}

impl<D: Dom> Component<D> for SmoothScroll<D::Element> {
    fn name(&self) -> &'static str {
        "smooth_scroll"
    }

    fn is_inert(&self) -> bool {
        self.anchors.is_empty()
    }

    fn on_event(&mut self, cx: &mut Context<'_, D>, target: &Target<D::Element>, event: &DomEvent) {
        let (DomEvent::Click, Target::Element(anchor)) = (event, target) else {
            return;
        };
        if !self.anchors.contains(anchor) {
            return;
        }
        // Default navigation is cancelled even when the fragment is dangling.
        cx.prevent_default();

        let Some(href) = cx.dom().attribute(anchor, "href") else {
            return;
        };
        let Some(section) = cx.dom().resolve_fragment(&href) else {
            tracing::trace!(%href, "anchor target not found");
            return;
        };
        let top = cx.dom().offset_top(&section) - cx.config().timings.header_offset_px;
        cx.dom_mut().scroll_to(top, ScrollBehavior::Smooth);
    }
}
