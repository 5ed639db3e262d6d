//! Keycode → layout binding table.
//!
//! Built once at startup from the [`Catalog`]: each entry's key name is
//! prefixed with the shared modifier accelerator, parsed, translated to a
//! keycode and grabbed on the root window.  The finished table is
//! read-only and is handed to the [`Dispatcher`](crate::dispatch::Dispatcher).

use crate::catalog::Catalog;
use crate::keys::{parse_accelerator, Keycode, ModMask};
use crate::traits::KeyGrabber;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Errors that abort binding.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The keyboard mapping could not be read.
    #[error("keyboard mapping lookup failed: {0}")]
    Backend(String),
    /// Not a single catalog entry could be bound.
    #[error("none of the {0} layouts could be bound to a key")]
    NoBindings(usize),
}

/// Immutable mapping from keycode to layout name.
#[derive(Debug, Clone, Default)]
pub struct KeyBindingTable {
    bindings: HashMap<Keycode, String>,
    modifiers: HashMap<Keycode, ModMask>,
}

impl KeyBindingTable {
    /// Resolve and grab every catalog entry's accelerator.
    ///
    /// Entries whose accelerator does not parse, whose keysym has no
    /// keycode on this keyboard, or whose grab is refused are dropped with a
    /// warning; binding continues with the rest.  When two entries resolve
    /// to the same keycode the later one in catalog order wins, also with a
    /// warning.  Fails if the keyboard mapping cannot be read or if nothing
    /// could be bound.
    pub fn build<G: KeyGrabber>(
        catalog: &Catalog,
        prefix: &str,
        grabber: &G,
    ) -> Result<Self, BindingError> {
        let mut table = Self::default();

        for entry in catalog.iter() {
            let text = format!("{}{}", prefix, entry.accelerator);
            let accel = match parse_accelerator(&text) {
                Ok(a) => a,
                Err(e) => {
                    warn!("layout {:?} not bound: {}", entry.name, e);
                    continue;
                }
            };

            let keycode = match grabber
                .keysym_to_keycode(accel.keysym)
                .map_err(|e| BindingError::Backend(e.to_string()))?
            {
                Some(k) => k,
                None => {
                    warn!(
                        "layout {:?} not bound: no key produces {} (keysym 0x{:x})",
                        entry.name, entry.accelerator, accel.keysym
                    );
                    continue;
                }
            };

            if let Err(e) = grabber.grab_key(keycode, accel.modifiers) {
                warn!("layout {:?} not bound: grabbing {} failed: {}", entry.name, text, e);
                continue;
            }
            debug!("grabbed {} as keycode {} for {:?}", text, keycode, entry.name);

            if let Some(previous) = table.bindings.insert(keycode, entry.name.clone()) {
                warn!(
                    "keycode {} was bound to {:?}, now bound to {:?}",
                    keycode, previous, entry.name
                );
            }
            table.modifiers.insert(keycode, accel.modifiers);
        }

        if table.bindings.is_empty() {
            return Err(BindingError::NoBindings(catalog.len()));
        }
        info!("bound {} of {} layouts", table.len(), catalog.len());
        Ok(table)
    }

    /// Layout bound to `keycode`, if any.
    pub fn get(&self, keycode: Keycode) -> Option<&str> {
        self.bindings.get(&keycode).map(String::as_str)
    }

    /// Modifiers grabbed together with `keycode`.
    pub fn modifiers(&self, keycode: Keycode) -> Option<ModMask> {
        self.modifiers.get(&keycode).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Keycode, &str)> {
        self.bindings.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
