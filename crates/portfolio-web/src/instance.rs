//! One live page per document.
//!
//! The start entry may already have mounted a page when JS calls
//! `PortfolioApp.start(options)`. Both would wire the same document, so a new
//! page always tears the previous one down before it starts.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use portfolio_core::dom::Dom;
use portfolio_core::page::Page;

/// Something bound to the document that can let go of it.
pub trait Teardown {
    fn teardown(&mut self);
}

impl<D: Dom> Teardown for Page<D> {
    fn teardown(&mut self) {
        self.shutdown();
    }
}

/// Tracks the page currently bound to the document.
#[derive(Debug)]
pub struct ActivePage<T> {
    current: Weak<RefCell<T>>,
}

impl<T> Default for ActivePage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ActivePage<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Weak::new(),
        }
    }

    #[must_use]
    pub fn is_active(&self, page: &Rc<RefCell<T>>) -> bool {
        self.current
            .upgrade()
            .is_some_and(|current| Rc::ptr_eq(&current, page))
    }
}

impl<T: Teardown> ActivePage<T> {
    /// Make `page` the active page, tearing down the previous one if it is
    /// still alive. Returns whether a previous page was torn down.
    pub fn replace(&mut self, page: &Rc<RefCell<T>>) -> bool {
        let previous = self.current.upgrade();
        self.current = Rc::downgrade(page);
        let Some(previous) = previous.filter(|prev| !Rc::ptr_eq(prev, page)) else {
            return false;
        };
        match previous.try_borrow_mut() {
            Ok(mut previous) => {
                previous.teardown();
                tracing::info!("previous page torn down");
                true
            }
            Err(_) => {
                tracing::warn!("previous page busy; left attached");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Bound {
        torn_down: u32,
    }

    impl Teardown for Bound {
        fn teardown(&mut self) {
            self.torn_down += 1;
        }
    }

    #[test]
    fn first_page_replaces_nothing() {
        let mut active = ActivePage::new();
        let page = Rc::new(RefCell::new(Bound::default()));
        assert!(!active.replace(&page));
        assert!(active.is_active(&page));
        assert_eq!(page.borrow().torn_down, 0);
    }

    #[test]
    fn second_page_tears_down_first() {
        let mut active = ActivePage::new();
        let first = Rc::new(RefCell::new(Bound::default()));
        let second = Rc::new(RefCell::new(Bound::default()));
        active.replace(&first);

        assert!(active.replace(&second));
        assert_eq!(first.borrow().torn_down, 1);
        assert_eq!(second.borrow().torn_down, 0);
        assert!(active.is_active(&second));
        assert!(!active.is_active(&first));
    }

    #[test]
    fn replacing_with_same_page_is_a_no_op() {
        let mut active = ActivePage::new();
        let page = Rc::new(RefCell::new(Bound::default()));
        active.replace(&page);
        assert!(!active.replace(&page));
        assert_eq!(page.borrow().torn_down, 0);
    }

    #[test]
    fn dropped_page_is_not_torn_down() {
        let mut active = ActivePage::new();
        let first = Rc::new(RefCell::new(Bound::default()));
        active.replace(&first);
        drop(first);
        let second = Rc::new(RefCell::new(Bound::default()));
        assert!(!active.replace(&second));
    }
}
