//! Traits that decouple the dispatcher from the windowing system.
//!
//! The binding table, the [`Placer`](crate::placement::Placer) and the
//! [`Dispatcher`](crate::dispatch::Dispatcher) only depend on these
//! abstractions.  The X11 backend in [`x11`](crate::x11) implements them for
//! real; the tests implement them with recording doubles.

use crate::geometry::Rect;
use crate::keys::{InputEvent, Keycode, Keysym, ModMask};

/// Registers global key grabs with the windowing system.
pub trait KeyGrabber {
    type Error: std::error::Error + 'static;

    /// Translate a keysym to the keycode that produces it on the current
    /// keyboard mapping, or `None` if no key does.
    fn keysym_to_keycode(&self, keysym: Keysym) -> Result<Option<Keycode>, Self::Error>;

    /// Grab `keycode` + `modifiers` on the root window so that presses are
    /// delivered to us instead of the focused client.
    fn grab_key(&self, keycode: Keycode, modifiers: ModMask) -> Result<(), Self::Error>;
}

/// The queue of events coming from the windowing connection.
///
/// There is exactly one queue per connection.  Readiness is signalled once
/// per batch, so consumers must keep polling until it reports `None`.
pub trait EventSource {
    type Error: std::error::Error + 'static;

    /// Return the next already-received event without blocking.
    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;

    /// Block until the next event arrives.
    fn wait_event(&mut self) -> Result<InputEvent, Self::Error>;
}

/// `_NET_WM_WINDOW_TYPE` classification of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Normal,
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
}

/// EWMH hint names the placer requires the window manager to support.
pub const NET_ACTIVE_WINDOW: &str = "_NET_ACTIVE_WINDOW";
pub const NET_WM_WINDOW_TYPE: &str = "_NET_WM_WINDOW_TYPE";

/// The desktop shell: active window, monitors, and window geometry.
///
/// Every method performs a fresh query; nothing is cached between key
/// presses because the active window may change at any time.
pub trait Desktop {
    /// Opaque window handle.
    type Window: Copy + std::fmt::Debug;
    type Error: std::error::Error + 'static;

    /// The currently focused window, if any.
    fn active_window(&self) -> Result<Option<Self::Window>, Self::Error>;

    /// Whether the window manager advertises support for `hint`
    /// (e.g. [`NET_ACTIVE_WINDOW`]).
    fn supports_hint(&self, hint: &str) -> Result<bool, Self::Error>;

    fn window_type(&self, window: Self::Window) -> Result<WindowType, Self::Error>;

    /// Index of the monitor that holds most of `window`.
    fn monitor_at_window(&self, window: Self::Window) -> Result<usize, Self::Error>;

    /// Usable area of `monitor`, excluding panels and docks.
    fn monitor_work_area(&self, monitor: usize) -> Result<Rect, Self::Error>;

    /// Outer rectangle of `window` including decorations, in root
    /// coordinates.
    fn frame_extents(&self, window: Self::Window) -> Result<Rect, Self::Error>;

    fn unmaximize(&self, window: Self::Window) -> Result<(), Self::Error>;

    /// Drop any client-side shadow margins so frame queries report the
    /// visible rectangle.
    fn clear_shadow(&self, window: Self::Window) -> Result<(), Self::Error>;

    /// Root-relative position of the client area's top-left corner.
    fn origin(&self, window: Self::Window) -> Result<(i32, i32), Self::Error>;

    /// Root-relative position of the frame's top-left corner.
    fn root_origin(&self, window: Self::Window) -> Result<(i32, i32), Self::Error>;

    fn move_resize(&self, window: Self::Window, rect: Rect) -> Result<(), Self::Error>;
}
