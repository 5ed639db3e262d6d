//! Turns raw key events into placements.
//!
//! The [`Dispatcher`] owns the finished [`KeyBindingTable`] and a
//! [`Placer`].  Each time the windowing connection becomes readable the host
//! loop calls [`Dispatcher::drain`], which consumes *every* pending event:
//! readiness is reported once per batch, so anything left in the queue
//! would otherwise sit there until the next unrelated wake-up.

use crate::bindings::KeyBindingTable;
use crate::keys::InputEvent;
use crate::placement::{Placement, Placer};
use crate::traits::{Desktop, EventSource};
use log::debug;

pub struct Dispatcher<D: Desktop> {
    bindings: KeyBindingTable,
    placer: Placer<D>,
}

impl<D: Desktop> Dispatcher<D> {
    pub fn new(bindings: KeyBindingTable, placer: Placer<D>) -> Self {
        Self { bindings, placer }
    }

    pub fn bindings(&self) -> &KeyBindingTable {
        &self.bindings
    }

    pub fn placer(&self) -> &Placer<D> {
        &self.placer
    }

    /// Handle one event.  Returns the placement when the event was a press
    /// of a bound key, `None` otherwise.
    pub fn handle(&self, event: InputEvent) -> Option<Placement> {
        let InputEvent::KeyPress(keycode) = event else {
            return None;
        };
        let name = self.bindings.get(keycode)?;
        debug!(
            "keycode {} ({}) -> {}",
            keycode,
            self.bindings.modifiers(keycode).unwrap_or_default(),
            name
        );
        Some(self.placer.resolve_and_apply(name))
    }

    /// Process every event already queued on `source`, in arrival order.
    ///
    /// Returns how many events were consumed.  A source error ends the
    /// drain and is returned; events handled before it stay handled.
    pub fn drain<S: EventSource>(&self, source: &mut S) -> Result<usize, S::Error> {
        let mut count = 0;
        while let Some(event) = source.poll_event()? {
            count += 1;
            self.handle(event);
        }
        Ok(count)
    }
}

/// Throw away everything queued before the dispatcher is installed.
///
/// Returns how many events were dropped.
pub fn discard_pending<S: EventSource>(source: &mut S) -> Result<usize, S::Error> {
    let mut dropped = 0;
    while source.poll_event()?.is_some() {
        dropped += 1;
    }
    if dropped > 0 {
        debug!("discarded {} stale events", dropped);
    }
    Ok(dropped)
}
