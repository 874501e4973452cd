#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use portfolio_core::page::Page;
use wasm_bindgen::prelude::*;

use crate::instance::ActivePage;
use crate::web_dom::{WebDom, rearm};

thread_local! {
    static ACTIVE: RefCell<ActivePage<Page<WebDom>>> = const { RefCell::new(ActivePage::new()) };
    static AUTOSTARTED: RefCell<Option<PortfolioApp>> = const { RefCell::new(None) };
}

/// Running portfolio page bound to `window.document`.
#[wasm_bindgen]
pub struct PortfolioApp {
    page: Rc<RefCell<Page<WebDom>>>,
}

#[wasm_bindgen]
impl PortfolioApp {
    /// Build and start the page.
    ///
    /// `options` is an optional plain object (or JSON string) of config
    /// overrides. Rejects with a message when the overrides are invalid or
    /// there is no document. A page already bound to the document, including
    /// the auto-started one, is torn down first.
    pub fn start(options: Option<JsValue>) -> Result<PortfolioApp, JsValue> {
        let json = options.as_ref().and_then(options_json);
        let config = crate::options::page_config(json.as_deref())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let page = Rc::new_cyclic(|weak| {
            RefCell::new(Page::new(WebDom::new(window, document, weak.clone()), config))
        });
        ACTIVE.with(|active| active.borrow_mut().replace(&page));
        drop(AUTOSTARTED.with(|slot| slot.borrow_mut().take()));
        {
            let mut page = page.borrow_mut();
            let now = page.dom().now();
            page.advance_to(now);
            page.start();
            rearm(&mut page);
        }
        Ok(Self { page })
    }

    /// Whether the components have been mounted (after `DOMContentLoaded`).
    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.page
            .try_borrow()
            .map(|page| page.is_mounted())
            .unwrap_or(false)
    }

    /// Explicit teardown for JS callers. Detaches every listener and observer
    /// and cancels pending timers.
    pub fn destroy(&mut self) {
        match self.page.try_borrow_mut() {
            Ok(mut page) => {
                page.shutdown();
                rearm(&mut page);
            }
            Err(_) => tracing::warn!("destroy called during delivery; ignored"),
        }
    }
}

/// JSON text for an options value. Strings pass through; objects are
/// stringified; `null`/`undefined` mean no overrides.
fn options_json(value: &JsValue) -> Option<String> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    if let Some(text) = value.as_string() {
        return Some(text);
    }
    match js_sys::JSON::stringify(value) {
        Ok(text) => text.as_string(),
        Err(err) => {
            tracing::warn!(error = ?err, "options are not JSON-serializable");
            None
        }
    }
}

#[wasm_bindgen(start)]
pub fn boot() {
    crate::logging::install();
    if cfg!(feature = "autostart") {
        match PortfolioApp::start(None) {
            Ok(app) => AUTOSTARTED.with(|slot| *slot.borrow_mut() = Some(app)),
            Err(err) => tracing::error!(error = ?err, "portfolio failed to start"),
        }
    }
}
