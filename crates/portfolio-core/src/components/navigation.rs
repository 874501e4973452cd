#![forbid(unsafe_code)]

//! Navbar behaviour: mobile menu toggle, active-link tracking and the
//! scrolled style.

use crate::components::{Component, Context};
use crate::dom::{Dom, DomEvent, EventType, IntersectionEntry, ObserverId, Target};

#[derive(Debug)]
pub struct Navigation<E> {
    navbar: Option<E>,
    toggle: Option<E>,
    menu: Option<E>,
    links: Vec<E>,
    sections: Option<ObserverId>,
}

impl<E: Clone + PartialEq> Navigation<E> {
    pub fn mount<D: Dom<Element = E>>(cx: &mut Context<'_, D>) -> Self {
        let config = cx.config();
        let selectors = &config.selectors;
        let mut nav = Self {
            navbar: cx.dom().query_selector(&selectors.navbar),
            toggle: cx.dom().query_selector(&selectors.menu_toggle),
            menu: cx.dom().query_selector(&selectors.nav_menu),
            links: cx.dom().query_selector_all(&selectors.nav_link),
            sections: None,
        };

        // Menu toggle. Link clicks only close the menu when a toggle exists.
        if let Some(toggle) = nav.toggle.clone() {
            cx.listen(Target::Element(toggle), EventType::Click);
            for link in &nav.links {
                cx.listen(Target::Element(link.clone()), EventType::Click);
            }
        }

        // Active-link tracking.
        let sections = cx.dom().query_selector_all(&selectors.sections);
        if !sections.is_empty() {
            let observer = cx.create_observer(config.observers.active_section);
            for section in &sections {
                cx.observe(observer, section);
            }
            nav.sections = Some(observer);
        }

        // Scrolled style. Runs on every scroll event, unthrottled.
        if nav.navbar.is_some() {
            cx.listen(Target::Window, EventType::Scroll);
        }

        nav
    }

    fn toggle_menu<D: Dom<Element = E>>(&self, cx: &mut Context<'_, D>) {
        let classes = &cx.config().classes;
        if let Some(menu) = &self.menu {
            cx.dom_mut().toggle_class(menu, &classes.menu_active);
        }
        if let Some(toggle) = &self.toggle {
            cx.dom_mut().toggle_class(toggle, &classes.toggle_active);
        }
    }

    fn close_menu<D: Dom<Element = E>>(&self, cx: &mut Context<'_, D>) {
        let classes = &cx.config().classes;
        if let Some(menu) = &self.menu {
            cx.dom_mut().remove_class(menu, &classes.menu_active);
        }
        if let Some(toggle) = &self.toggle {
            cx.dom_mut().remove_class(toggle, &classes.toggle_active);
        }
    }

    /// Mark the link pointing at `#id` active and every other link inactive.
    fn set_active_link<D: Dom<Element = E>>(&self, cx: &mut Context<'_, D>, id: &str) {
        let active = &cx.config().classes.link_active;
        let fragment = format!("#{id}");
        for link in &self.links {
            cx.dom_mut().remove_class(link, active);
            if cx.dom().attribute(link, "href").as_deref() == Some(fragment.as_str()) {
                cx.dom_mut().add_class(link, active);
            }
        }
    }

    fn update_scrolled<D: Dom<Element = E>>(&self, cx: &mut Context<'_, D>) {
        let Some(navbar) = &self.navbar else {
            return;
        };
        let config = cx.config();
        if cx.dom().scroll_y() > config.timings.scrolled_threshold_px {
            cx.dom_mut().add_class(navbar, &config.classes.navbar_scrolled);
        } else {
            cx.dom_mut()
                .remove_class(navbar, &config.classes.navbar_scrolled);
        }
    }
}

impl<D: Dom> Component<D> for Navigation<D::Element> {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn is_inert(&self) -> bool {
        self.toggle.is_none() && self.navbar.is_none() && self.sections.is_none()
    }

    fn on_event(&mut self, cx: &mut Context<'_, D>, target: &Target<D::Element>, event: &DomEvent) {
        match (event, target) {
            (DomEvent::Scroll, Target::Window) => self.update_scrolled(cx),
            (DomEvent::Click, Target::Element(el)) if self.toggle.as_ref() == Some(el) => {
                self.toggle_menu(cx);
            }
            (DomEvent::Click, Target::Element(el)) if self.links.contains(el) => {
                self.close_menu(cx);
            }
            _ => {}
        }
    }

    fn on_intersection(
        &mut self,
        cx: &mut Context<'_, D>,
        observer: ObserverId,
        entries: &[IntersectionEntry<D::Element>],
    ) {
        if self.sections != Some(observer) {
            return;
        }
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if let Some(id) = cx.dom().attribute(&entry.target, "id") {
                tracing::trace!(section = %id, "section visible");
                self.set_active_link(cx, &id);
            }
        }
    }
}
