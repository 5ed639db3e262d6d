//! **winsplit** — numpad hotkeys that snap the active window into place.
//!
//! `Ctrl+Alt+<keypad digit>` moves the focused window to the matching
//! region of its monitor's work area (7 = top left, 6 = right, …).
//! Pressing the same key again cycles to a wider alternative; once the
//! window sits on the last alternative further presses leave it alone.
//!
//! # Architecture
//!
//! Data flows one way:
//!
//! ```text
//! Catalog ──(startup)──> KeyBindingTable ──> Dispatcher ──> Placer ──> Desktop
//! ```
//!
//! * [`catalog`] — the static table of named layouts.
//! * [`bindings`] — keycode → layout map, built once by grabbing keys.
//! * [`dispatch`] — drains key events and forwards bound presses.
//! * [`placement`] — picks a candidate rectangle and moves the window.
//! * [`mainloop`] — hooks the dispatcher into the host main loop.
//!
//! The windowing system is reached only through the traits in [`traits`];
//! [`x11`] implements them for X11.

pub mod bindings;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod geometry;
pub mod keys;
pub mod mainloop;
pub mod placement;
pub mod traits;
pub mod x11;
