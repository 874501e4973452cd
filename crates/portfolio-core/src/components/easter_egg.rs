#![forbid(unsafe_code)]

//! Key sequence easter egg.
//!
//! [`KeySequenceTracker`] is a cursor over a fixed sequence of
//! `KeyboardEvent.key` values. The component feeds it every `keydown` on the
//! document and plays the flourish when the sequence completes.
//!
//! # Invariants
//!
//! 1. The cursor is always `< sequence.len()` between calls.
//! 2. Any key that is not the expected next step resets the cursor to zero,
//!    even if it matches the first step. There is no partial credit.
//! 3. Completion resets the cursor, so back-to-back sequences each complete.

use crate::components::{Component, Context};
use crate::dom::{Dom, DomEvent, EventType, Target};
use crate::timer::TimerId;

// ---------------------------------------------------------------------------
// KeySequenceTracker
// ---------------------------------------------------------------------------

/// Outcome of feeding one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySequenceStep {
    /// Matched the next step; `progress` steps are now matched.
    Advanced { progress: usize },
    /// Matched the final step. The cursor is back at zero.
    Completed,
    /// Mismatch. The cursor is back at zero.
    Reset,
}

#[derive(Debug, Clone)]
pub struct KeySequenceTracker {
    sequence: Vec<String>,
    index: usize,
}

impl KeySequenceTracker {
    /// Track `sequence`. An empty sequence never completes.
    #[must_use]
    pub fn new(sequence: Vec<String>) -> Self {
        Self { sequence, index: 0 }
    }

    /// Number of steps matched so far.
    #[must_use]
    pub fn progress(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn feed(&mut self, key: &str) -> KeySequenceStep {
        if self.sequence.get(self.index).map(String::as_str) != Some(key) {
            self.index = 0;
            return KeySequenceStep::Reset;
        }
        self.index += 1;
        if self.index == self.sequence.len() {
            self.index = 0;
            KeySequenceStep::Completed
        } else {
            KeySequenceStep::Advanced {
                progress: self.index,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EasterEgg
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct EasterEgg {
    tracker: KeySequenceTracker,
    flourishes: Vec<TimerId>,
}

impl EasterEgg {
    pub fn mount<D: Dom>(cx: &mut Context<'_, D>) -> Self {
        let sequence = cx.config().easter_egg.sequence.clone();
        cx.listen(Target::Document, EventType::KeyDown);
        Self {
            tracker: KeySequenceTracker::new(sequence),
            flourishes: Vec::new(),
        }
    }

    fn activate<D: Dom>(&mut self, cx: &mut Context<'_, D>) {
        tracing::info!("easter egg activated");
        let config = cx.config();
        if let Some(body) = cx.dom().body() {
            cx.dom_mut()
                .set_style(&body, "animation", &config.easter_egg.animation);
        }
        let timer = cx.set_timeout(config.timings.flourish);
        self.flourishes.push(timer);
    }
}

impl<D: Dom> Component<D> for EasterEgg {
    fn name(&self) -> &'static str {
        "easter_egg"
    }

    fn on_event(&mut self, cx: &mut Context<'_, D>, target: &Target<D::Element>, event: &DomEvent) {
        let (DomEvent::KeyDown { key }, Target::Document) = (event, target) else {
            return;
        };
        match self.tracker.feed(key) {
            KeySequenceStep::Completed => self.activate(cx),
            KeySequenceStep::Advanced { progress } => {
                tracing::trace!(progress, "key sequence advanced");
            }
            KeySequenceStep::Reset => {}
        }
    }

    fn on_timer(&mut self, cx: &mut Context<'_, D>, timer: TimerId) {
        let Some(pos) = self.flourishes.iter().position(|id| *id == timer) else {
            return;
        };
        self.flourishes.remove(pos);
        if let Some(body) = cx.dom().body() {
            cx.dom_mut().set_style(&body, "animation", "");
        }
        let message = &cx.config().messages.easter_egg;
        cx.dom_mut().alert(message);
    }
}
