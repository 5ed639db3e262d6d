//! X11 implementations of the collaborator traits.
//!
//! [`X11Display`](display::X11Display) owns the connection and implements
//! [`KeyGrabber`](crate::traits::KeyGrabber) and
//! [`EventSource`](crate::traits::EventSource);
//! [`X11Desktop`](desktop::X11Desktop) shares that connection and
//! implements [`Desktop`](crate::traits::Desktop) on top of EWMH hints and
//! RandR monitors.
//!
//! Nothing outside this module should reference X11 directly.

pub mod desktop;
pub mod display;

use x11rb::errors::{ConnectError, ConnectionError, ReplyError};

pub use desktop::X11Desktop;
pub use display::X11Display;

/// Errors that can occur when talking to the X server.
#[derive(Debug, thiserror::Error)]
pub enum X11Error {
    #[error("cannot connect to X server: {0}")]
    Connect(#[from] ConnectError),
    #[error("X connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("X request failed: {0}")]
    Reply(#[from] ReplyError),
    #[error("no monitor with index {0}")]
    NoMonitor(usize),
}
