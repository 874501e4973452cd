#![forbid(unsafe_code)]

//! Contact form stub.
//!
//! Submissions are intercepted, acknowledged with a dialog, and the form is
//! cleared. Nothing is sent anywhere; the acknowledgment says so.

use crate::components::{Component, Context};
use crate::dom::{Dom, DomEvent, EventType, Target};

#[derive(Debug)]
pub struct ContactForm<E> {
    form: Option<E>,
}

impl<E: Clone + PartialEq> ContactForm<E> {
    pub fn mount<D: Dom<Element = E>>(cx: &mut Context<'_, D>) -> Self {
        let form = cx
            .dom()
            .query_selector(&cx.config().selectors.contact_form);
        if let Some(form) = &form {
            cx.listen(Target::Element(form.clone()), EventType::Submit);
        }
        Self { form }
    }
}

impl<D: Dom> Component<D> for ContactForm<D::Element> {
    fn name(&self) -> &'static str {
        "contact_form"
    }

    fn is_inert(&self) -> bool {
        self.form.is_none()
    }

    fn on_event(&mut self, cx: &mut Context<'_, D>, target: &Target<D::Element>, event: &DomEvent) {
        let Some(form) = &self.form else {
            return;
        };
        if *event != DomEvent::Submit || target.element() != Some(form) {
            return;
        }
        cx.prevent_default();
        let ack = &cx.config().messages.contact_ack;
        cx.dom_mut().alert(ack);
        cx.dom_mut().reset_form(form);
        tracing::debug!("contact form acknowledged");
    }
}
