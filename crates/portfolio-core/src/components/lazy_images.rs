#![forbid(unsafe_code)]

//! Deferred image loading.
//!
//! Only active when the host supports intersection observation; otherwise
//! the page's own fallback shows the images.

use crate::components::{Component, Context};
use crate::dom::{Dom, IntersectionEntry, ObserverId};

const DEFERRED_SRC: &str = "data-src";

#[derive(Debug)]
pub struct LazyLoadImages {
    observer: Option<ObserverId>,
}

impl LazyLoadImages {
    pub fn mount<D: Dom>(cx: &mut Context<'_, D>) -> Self {
        if !cx.dom().supports_intersection_observer() {
            tracing::debug!("intersection observer unavailable, lazy loading disabled");
            return Self { observer: None };
        }
        let config = cx.config();
        let images = cx.dom().query_selector_all(&config.selectors.lazy_image);
        if images.is_empty() {
            return Self { observer: None };
        }
        let observer = cx.create_observer(config.observers.lazy_image);
        for img in &images {
            cx.observe(observer, img);
        }
        Self {
            observer: Some(observer),
        }
    }
}

impl<D: Dom> Component<D> for LazyLoadImages {
    fn name(&self) -> &'static str {
        "lazy_images"
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
        let loaded = &cx.config().classes.image_loaded;
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let img = &entry.target;
            if let Some(src) = cx.dom().attribute(img, DEFERRED_SRC) {
                cx.dom_mut().set_attribute(img, "src", &src);
            }
            cx.dom_mut().add_class(img, loaded);
            cx.unobserve(observer, img);
        }
    }
}
