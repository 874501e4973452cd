#![forbid(unsafe_code)]

//! Developer console banner.

use crate::components::{Component, Context};
use crate::dom::Dom;

#[derive(Debug, Default)]
pub struct ConsoleMessage;

impl ConsoleMessage {
    pub fn mount<D: Dom>(cx: &mut Context<'_, D>) -> Self {
        for line in &cx.config().messages.banner {
            cx.dom_mut().console_styled(&line.text, &line.css);
        }
        Self
    }
}

impl<D: Dom> Component<D> for ConsoleMessage {
    fn name(&self) -> &'static str {
        "console_message"
    }
}
