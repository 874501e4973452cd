#![forbid(unsafe_code)]

//! Listener and observer bookkeeping.
//!
//! The registry is the page-side mirror of what has been wired into the host
//! document. Delivery order for listeners is registration order.

use crate::dom::{EventType, IntersectionEntry, ListenerId, ObserverId, Target};

/// Who receives a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The page itself (deferred mounting).
    Page,
    /// Component at this mount index.
    Component(usize),
}

#[derive(Debug, Clone)]
struct Listener<E> {
    id: ListenerId,
    owner: Owner,
    target: Target<E>,
    event: EventType,
    once: bool,
}

#[derive(Debug, Clone)]
struct Observer<E> {
    id: ObserverId,
    owner: Owner,
    observed: Vec<E>,
}

/// Listener matched by [`Registry::take_matching`] or
/// [`Registry::take_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matched {
    pub id: ListenerId,
    pub owner: Owner,
    /// The listener was one-shot and has been removed.
    pub removed: bool,
}

#[derive(Debug, Clone)]
pub struct Registry<E> {
    listeners: Vec<Listener<E>>,
    observers: Vec<Observer<E>>,
    next_listener: u32,
    next_observer: u32,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            observers: Vec::new(),
            next_listener: 0,
            next_observer: 0,
        }
    }
}

impl<E: Clone + PartialEq> Registry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &mut self,
        owner: Owner,
        target: Target<E>,
        event: EventType,
        once: bool,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            owner,
            target,
            event,
            once,
        });
        id
    }

    /// Collect listeners for `(target, event)` in registration order,
    /// dropping one-shot listeners as they match.
    pub fn take_matching(&mut self, target: &Target<E>, event: EventType) -> Vec<Matched> {
        let mut matched = Vec::new();
        self.listeners.retain(|l| {
            if l.event != event || l.target != *target {
                return true;
            }
            matched.push(Matched {
                id: l.id,
                owner: l.owner,
                removed: l.once,
            });
            !l.once
        });
        matched
    }

    /// Match the single listener `id` against `(target, event)`, dropping it
    /// if it was one-shot. `None` if it is gone or registered for something
    /// else.
    pub fn take_listener(
        &mut self,
        id: ListenerId,
        target: &Target<E>,
        event: EventType,
    ) -> Option<Matched> {
        let idx = self
            .listeners
            .iter()
            .position(|l| l.id == id && l.event == event && l.target == *target)?;
        let listener = &self.listeners[idx];
        let matched = Matched {
            id,
            owner: listener.owner,
            removed: listener.once,
        };
        if matched.removed {
            self.listeners.remove(idx);
        }
        Some(matched)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of listeners owned by `owner`.
    #[must_use]
    pub fn listeners_of(&self, owner: Owner) -> usize {
        self.listeners.iter().filter(|l| l.owner == owner).count()
    }

    #[must_use]
    pub fn listener_ids(&self) -> Vec<ListenerId> {
        self.listeners.iter().map(|l| l.id).collect()
    }

    // -- observers ---------------------------------------------------------

    pub fn add_observer(&mut self, owner: Owner) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer {
            id,
            owner,
            observed: Vec::new(),
        });
        id
    }

    fn observer_mut(&mut self, id: ObserverId) -> Option<&mut Observer<E>> {
        self.observers.iter_mut().find(|o| o.id == id)
    }

    /// Start observing `el`. Returns `false` if it was already observed or
    /// the observer is unknown.
    pub fn observe(&mut self, id: ObserverId, el: E) -> bool {
        match self.observer_mut(id) {
            Some(obs) if !obs.observed.contains(&el) => {
                obs.observed.push(el);
                true
            }
            _ => false,
        }
    }

    pub fn unobserve(&mut self, id: ObserverId, el: &E) -> bool {
        let Some(obs) = self.observer_mut(id) else {
            return false;
        };
        let before = obs.observed.len();
        obs.observed.retain(|o| o != el);
        obs.observed.len() != before
    }

    #[must_use]
    pub fn observer_owner(&self, id: ObserverId) -> Option<Owner> {
        self.observers.iter().find(|o| o.id == id).map(|o| o.owner)
    }

    #[must_use]
    pub fn is_observed(&self, id: ObserverId, el: &E) -> bool {
        self.observers
            .iter()
            .any(|o| o.id == id && o.observed.contains(el))
    }

    /// Keep only entries whose target `id` still observes.
    #[must_use]
    pub fn filter_observed(
        &self,
        id: ObserverId,
        entries: Vec<IntersectionEntry<E>>,
    ) -> Vec<IntersectionEntry<E>> {
        entries
            .into_iter()
            .filter(|entry| self.is_observed(id, &entry.target))
            .collect()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Total elements observed across every observer.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observers.iter().map(|o| o.observed.len()).sum()
    }

    #[must_use]
    pub fn observer_ids(&self) -> Vec<ObserverId> {
        self.observers.iter().map(|o| o.id).collect()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
        self.observers.clear();
    }
}
