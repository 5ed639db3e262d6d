//! [`Desktop`] implementation backed by EWMH hints and RandR.
//!
//! Everything is queried fresh from the server on every call: the active
//! window, its frame, and the monitor layout can all change between two
//! key presses.

use super::X11Error;
use crate::geometry::Rect;
use crate::traits::{Desktop, WindowType};
use log::debug;
use std::rc::Rc;
use x11rb::connection::Connection;
use x11rb::errors::ConnectionError;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ClientMessageEvent, ConfigureWindowAux, ConnectionExt as _, EventMask, PropMode,
    Window,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

// Atoms interned once at startup.
x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        _NET_SUPPORTED,
        _NET_ACTIVE_WINDOW,
        _NET_CURRENT_DESKTOP,
        _NET_WORKAREA,
        _NET_FRAME_EXTENTS,
        _NET_WM_STATE,
        _NET_WM_STATE_MAXIMIZED_VERT,
        _NET_WM_STATE_MAXIMIZED_HORZ,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DESKTOP,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_WINDOW_TYPE_TOOLBAR,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _GTK_FRAME_EXTENTS,
    }
}

/// `_NET_WM_STATE` client message action.
const NET_WM_STATE_REMOVE: u32 = 0;
/// Source indication for EWMH requests: a normal application.
const SOURCE_APPLICATION: u32 = 1;

/// The desktop shell as seen through the X server.
pub struct X11Desktop {
    conn: Rc<RustConnection>,
    screen_num: usize,
    root: Window,
    atoms: Atoms,
}

impl X11Desktop {
    pub fn new(conn: Rc<RustConnection>, screen_num: usize) -> Result<Self, X11Error> {
        let root = conn.setup().roots[screen_num].root;
        let atoms = Atoms::new(conn.as_ref())?.reply()?;
        Ok(Self {
            conn,
            screen_num,
            root,
            atoms,
        })
    }

    /// Read a 32-bit-format property; missing properties read as empty.
    fn property32(&self, window: Window, property: Atom, type_: AtomEnum) -> Result<Vec<u32>, X11Error> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, 1024)?
            .reply()?;
        Ok(reply.value32().map(|v| v.collect()).unwrap_or_default())
    }

    fn screen_rect(&self) -> Rect {
        let screen = &self.conn.setup().roots[self.screen_num];
        Rect::new(
            0,
            0,
            screen.width_in_pixels.into(),
            screen.height_in_pixels.into(),
        )
    }

    /// Active monitors from RandR, or the whole screen when RandR is not
    /// available or reports nothing.
    fn monitors(&self) -> Result<Vec<Rect>, X11Error> {
        let monitors: Vec<Rect> = match self.conn.randr_get_monitors(self.root, true) {
            Ok(cookie) => cookie
                .reply()?
                .monitors
                .iter()
                .map(|m| Rect::new(m.x.into(), m.y.into(), m.width.into(), m.height.into()))
                .collect(),
            Err(ConnectionError::UnsupportedExtension) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if monitors.is_empty() {
            return Ok(vec![self.screen_rect()]);
        }
        Ok(monitors)
    }

    /// The window-manager frame around `window`: its ancestor that is a
    /// direct child of the root.
    fn frame_window(&self, window: Window) -> Result<Window, X11Error> {
        let mut current = window;
        loop {
            let tree = self.conn.query_tree(current)?.reply()?;
            if tree.parent == tree.root || tree.parent == x11rb::NONE {
                return Ok(current);
            }
            current = tree.parent;
        }
    }
}

impl Desktop for X11Desktop {
    type Window = Window;
    type Error = X11Error;

    fn active_window(&self) -> Result<Option<Window>, X11Error> {
        let value = self.property32(self.root, self.atoms._NET_ACTIVE_WINDOW, AtomEnum::WINDOW)?;
        Ok(value.first().copied().filter(|&w| w != x11rb::NONE))
    }

    fn supports_hint(&self, hint: &str) -> Result<bool, X11Error> {
        let atom = self.conn.intern_atom(true, hint.as_bytes())?.reply()?.atom;
        if atom == x11rb::NONE {
            return Ok(false);
        }
        let supported = self.property32(self.root, self.atoms._NET_SUPPORTED, AtomEnum::ATOM)?;
        Ok(supported.contains(&atom))
    }

    fn window_type(&self, window: Window) -> Result<WindowType, X11Error> {
        let types = self.property32(window, self.atoms._NET_WM_WINDOW_TYPE, AtomEnum::ATOM)?;
        let a = &self.atoms;
        let known = [
            (a._NET_WM_WINDOW_TYPE_DESKTOP, WindowType::Desktop),
            (a._NET_WM_WINDOW_TYPE_DOCK, WindowType::Dock),
            (a._NET_WM_WINDOW_TYPE_TOOLBAR, WindowType::Toolbar),
            (a._NET_WM_WINDOW_TYPE_MENU, WindowType::Menu),
            (a._NET_WM_WINDOW_TYPE_UTILITY, WindowType::Utility),
            (a._NET_WM_WINDOW_TYPE_SPLASH, WindowType::Splash),
            (a._NET_WM_WINDOW_TYPE_DIALOG, WindowType::Dialog),
        ];
        // The property lists types in order of preference.
        let kind = types
            .iter()
            .find_map(|t| known.iter().find(|(atom, _)| atom == t).map(|(_, kind)| *kind))
            .unwrap_or(WindowType::Normal);
        Ok(kind)
    }

    fn monitor_at_window(&self, window: Window) -> Result<usize, X11Error> {
        let frame = self.frame_extents(window)?;
        Ok(monitor_for(&self.monitors()?, &frame))
    }

    fn monitor_work_area(&self, monitor: usize) -> Result<Rect, X11Error> {
        let bounds = *self
            .monitors()?
            .get(monitor)
            .ok_or(X11Error::NoMonitor(monitor))?;
        let desktop = self
            .property32(self.root, self.atoms._NET_CURRENT_DESKTOP, AtomEnum::CARDINAL)?
            .first()
            .copied()
            .unwrap_or(0) as usize;
        let workarea = self.property32(self.root, self.atoms._NET_WORKAREA, AtomEnum::CARDINAL)?;
        Ok(work_area_for(bounds, &workarea, desktop))
    }

    fn frame_extents(&self, window: Window) -> Result<Rect, X11Error> {
        let frame = self.frame_window(window)?;
        let geom = self.conn.get_geometry(frame)?.reply()?;
        let origin = self.conn.translate_coordinates(frame, self.root, 0, 0)?.reply()?;
        let mut rect = Rect::new(
            origin.dst_x.into(),
            origin.dst_y.into(),
            geom.width.into(),
            geom.height.into(),
        );
        if frame == window {
            // Not reparented: the WM may still draw decorations and report
            // them as left, right, top, bottom.
            let extents = self.property32(window, self.atoms._NET_FRAME_EXTENTS, AtomEnum::CARDINAL)?;
            rect = grow_by_extents(rect, &extents);
        }
        Ok(rect)
    }

    fn unmaximize(&self, window: Window) -> Result<(), X11Error> {
        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms._NET_WM_STATE,
            [
                NET_WM_STATE_REMOVE,
                self.atoms._NET_WM_STATE_MAXIMIZED_VERT,
                self.atoms._NET_WM_STATE_MAXIMIZED_HORZ,
                SOURCE_APPLICATION,
                0,
            ],
        );
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            &event,
        )?;
        Ok(())
    }

    fn clear_shadow(&self, window: Window) -> Result<(), X11Error> {
        let current = self.property32(window, self.atoms._GTK_FRAME_EXTENTS, AtomEnum::CARDINAL)?;
        if current.is_empty() {
            return Ok(());
        }
        debug!("clearing shadow margins {:?} on 0x{:x}", current, window);
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms._GTK_FRAME_EXTENTS,
            AtomEnum::CARDINAL,
            &[0, 0, 0, 0],
        )?;
        Ok(())
    }

    fn origin(&self, window: Window) -> Result<(i32, i32), X11Error> {
        let reply = self.conn.translate_coordinates(window, self.root, 0, 0)?.reply()?;
        Ok((reply.dst_x.into(), reply.dst_y.into()))
    }

    fn root_origin(&self, window: Window) -> Result<(i32, i32), X11Error> {
        let frame = self.frame_extents(window)?;
        Ok((frame.x, frame.y))
    }

    fn move_resize(&self, window: Window, rect: Rect) -> Result<(), X11Error> {
        let aux = ConfigureWindowAux::new()
            .x(rect.x)
            .y(rect.y)
            .width(rect.width.max(1) as u32)
            .height(rect.height.max(1) as u32);
        self.conn.configure_window(window, &aux)?;
        self.conn.flush()?;
        Ok(())
    }
}

/// Index of the monitor with the largest overlap with `frame`; the first
/// monitor when the frame is entirely off-screen.
fn monitor_for(monitors: &[Rect], frame: &Rect) -> usize {
    let mut best = (0, 0);
    for (index, monitor) in monitors.iter().enumerate() {
        let area = monitor.overlap_area(frame);
        if area > best.1 {
            best = (index, area);
        }
    }
    best.0
}

/// Grow a client rectangle by `_NET_FRAME_EXTENTS` (left, right, top,
/// bottom).  Anything but four values leaves it unchanged; the property is
/// client-writable, so the arithmetic saturates.
fn grow_by_extents(rect: Rect, extents: &[u32]) -> Rect {
    let &[left, right, top, bottom] = extents else {
        return rect;
    };
    let [left, right, top, bottom] =
        [left, right, top, bottom].map(|v| i32::try_from(v).unwrap_or(i32::MAX));
    Rect::new(
        rect.x.saturating_sub(left),
        rect.y.saturating_sub(top),
        rect.width.saturating_add(left).saturating_add(right),
        rect.height.saturating_add(top).saturating_add(bottom),
    )
}

/// Clip a monitor to the `_NET_WORKAREA` rectangle of `desktop`.
///
/// `_NET_WORKAREA` holds one `x, y, width, height` quadruple per desktop and
/// spans all monitors, so it is intersected with the monitor bounds.  When
/// the hint is missing or does not overlap the monitor, the full monitor is
/// used.
fn work_area_for(monitor: Rect, workarea: &[u32], desktop: usize) -> Rect {
    let quad = workarea
        .chunks_exact(4)
        .nth(desktop)
        .or_else(|| workarea.chunks_exact(4).next());
    match quad {
        Some(q) => {
            let area = Rect::new(q[0] as i32, q[1] as i32, q[2] as i32, q[3] as i32);
            monitor.intersect(&area).unwrap_or(monitor)
        }
        None => monitor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: Rect = Rect::new(0, 0, 1920, 1080);
    const RIGHT: Rect = Rect::new(1920, 0, 2560, 1440);

    #[test]
    fn monitor_with_most_overlap_wins() {
        let window = Rect::new(1800, 100, 400, 300);
        assert_eq!(monitor_for(&[LEFT, RIGHT], &window), 1);
        let window = Rect::new(1700, 100, 400, 300);
        assert_eq!(monitor_for(&[LEFT, RIGHT], &window), 0);
    }

    #[test]
    fn off_screen_window_maps_to_first_monitor() {
        let window = Rect::new(-5000, -5000, 100, 100);
        assert_eq!(monitor_for(&[LEFT, RIGHT], &window), 0);
    }

    #[test]
    fn frame_extents_grow_the_client_rect() {
        let client = Rect::new(100, 130, 800, 600);
        assert_eq!(
            grow_by_extents(client, &[2, 2, 30, 2]),
            Rect::new(98, 100, 804, 632)
        );
        assert_eq!(grow_by_extents(client, &[]), client);
        assert_eq!(grow_by_extents(client, &[1, 2, 3]), client);
    }

    #[test]
    fn bogus_frame_extents_saturate() {
        let client = Rect::new(-10, 0, 800, 600);
        let grown = grow_by_extents(client, &[u32::MAX, u32::MAX, 0x8000_0000, 1]);
        assert_eq!(grown, Rect::new(i32::MIN, -i32::MAX, i32::MAX, i32::MAX));
    }

    #[test]
    fn work_area_clips_panel_from_monitor() {
        // A 32 px top panel across both monitors.
        let workarea = [0, 32, 4480, 1408];
        assert_eq!(work_area_for(LEFT, &workarea, 0), Rect::new(0, 32, 1920, 1048));
        assert_eq!(work_area_for(RIGHT, &workarea, 0), Rect::new(1920, 32, 2560, 1408));
    }

    #[test]
    fn work_area_uses_current_desktop_quad() {
        let workarea = [0, 0, 1920, 1080, 0, 40, 1920, 1040];
        assert_eq!(work_area_for(LEFT, &workarea, 1), Rect::new(0, 40, 1920, 1040));
        // Out-of-range desktop falls back to the first quad.
        assert_eq!(work_area_for(LEFT, &workarea, 7), LEFT);
    }

    #[test]
    fn missing_work_area_is_whole_monitor() {
        assert_eq!(work_area_for(RIGHT, &[], 0), RIGHT);
        assert_eq!(work_area_for(RIGHT, &[0, 0, 1920, 1080], 0), RIGHT);
    }
}
