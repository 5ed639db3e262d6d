//! The X connection: key grabs and the event queue.

use super::{X11Desktop, X11Error};
use crate::keys::{InputEvent, Keycode, Keysym, ModMask};
use crate::traits::{EventSource, KeyGrabber};
use log::{debug, info, warn};
use std::os::unix::io::{AsRawFd, RawFd};
use std::rc::Rc;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ChangeWindowAttributesAux, ConnectionExt as _, EventMask, GrabMode, Window};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

/// Connection to the X server, listening for key presses on the root window.
///
/// Single-threaded: the connection is shared with [`X11Desktop`] through an
/// [`Rc`].
pub struct X11Display {
    conn: Rc<RustConnection>,
    screen_num: usize,
    root: Window,
}

impl X11Display {
    /// Connect to `$DISPLAY` and select key-press events on the root window.
    pub fn connect() -> Result<Self, X11Error> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let root = conn.setup().roots[screen_num].root;
        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::KEY_PRESS),
        )?;
        conn.flush()?;
        info!("connected to X server (screen {}, root 0x{:x})", screen_num, root);
        Ok(Self {
            conn: Rc::new(conn),
            screen_num,
            root,
        })
    }

    /// A desktop-shell handle sharing this connection.
    pub fn desktop(&self) -> Result<X11Desktop, X11Error> {
        X11Desktop::new(Rc::clone(&self.conn), self.screen_num)
    }

    /// File descriptor that becomes readable when events arrive.
    pub fn raw_fd(&self) -> RawFd {
        self.conn.stream().as_raw_fd()
    }
}

impl KeyGrabber for X11Display {
    type Error = X11Error;

    fn keysym_to_keycode(&self, keysym: Keysym) -> Result<Option<Keycode>, X11Error> {
        let setup = self.conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let mapping = self
            .conn
            .get_keyboard_mapping(min, max - min + 1)?
            .reply()?;
        Ok(keycode_for_keysym(
            min,
            mapping.keysyms_per_keycode,
            &mapping.keysyms,
            keysym,
        ))
    }

    /// Grab and wait for the server's verdict, so a combination another
    /// client already holds fails here with `BadAccess`.
    fn grab_key(&self, keycode: Keycode, modifiers: ModMask) -> Result<(), X11Error> {
        self.conn
            .grab_key(
                true,
                self.root,
                xproto::ModMask::from(modifiers.bits()),
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .check()?;
        Ok(())
    }
}

impl EventSource for X11Display {
    type Error = X11Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, X11Error> {
        Ok(self.conn.poll_for_event()?.map(translate))
    }

    fn wait_event(&mut self) -> Result<InputEvent, X11Error> {
        Ok(translate(self.conn.wait_for_event()?))
    }
}

fn translate(event: Event) -> InputEvent {
    match event {
        Event::KeyPress(e) => InputEvent::KeyPress(e.detail),
        Event::KeyRelease(e) => InputEvent::KeyRelease(e.detail),
        Event::Error(e) => {
            warn!("X error: {:?}", e);
            InputEvent::Other
        }
        other => {
            debug!("ignoring {:?}", other);
            InputEvent::Other
        }
    }
}

/// Find the keycode producing `keysym` in a `GetKeyboardMapping` reply.
///
/// Earlier columns win over later ones (an unshifted match beats a shifted
/// one), then lower keycodes over higher ones.
fn keycode_for_keysym(
    min_keycode: Keycode,
    keysyms_per_keycode: u8,
    keysyms: &[Keysym],
    keysym: Keysym,
) -> Option<Keycode> {
    let per = keysyms_per_keycode as usize;
    if per == 0 {
        return None;
    }
    (0..per)
        .find_map(|col| {
            keysyms
                .chunks(per)
                .position(|row| row.get(col) == Some(&keysym))
        })
        .and_then(|row| Keycode::try_from(row + min_keycode as usize).ok())
}
