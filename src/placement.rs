//! Resolve a layout name to a rectangle and move the active window there.
//!
//! [`Placer`] reacts to a layout name by reading the active window's frame
//! and its monitor's work area from a [`Desktop`], converting the layout's
//! candidates to pixels and applying the first one that is far enough from
//! where the window already is.
//!
//! # Cycling
//!
//! A candidate is "near" the window when the Manhattan distance between the
//! two rectangles is at most the threshold (200 px by default).  The scan
//! starts right after the last candidate the window is near, so repeated
//! presses walk the list:
//!
//! ```text
//! press 1: window far from everything  -> candidate 0
//! press 2: window near candidate 0     -> candidate 1
//! press 3: window near candidate 1     -> no change
//! ```
//!
//! Candidates that are themselves near the window are skipped, so a window
//! that already sits on candidate 0 by accident goes straight to
//! candidate 1.

use crate::catalog::Catalog;
use crate::geometry::Rect;
use crate::traits::{Desktop, WindowType, NET_ACTIVE_WINDOW, NET_WM_WINDOW_TYPE};
use log::{debug, error, info};

/// Distance (in pixels, summed over x/y/width/height) under which a window
/// counts as already placed on a candidate.
pub const DEFAULT_THRESHOLD: u32 = 200;

/// A failure while placing a window.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("unknown layout {0:?}")]
    UnknownLayout(String),
    #[error("desktop error: {0}")]
    Desktop(String),
}

/// What a single [`Placer::resolve_and_apply`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The window was moved to candidate `index`.
    Moved { index: usize, rect: Rect },
    /// The window already sits on the last reachable candidate.
    Unchanged,
    /// No suitable active window; nothing was touched.
    NoWindow,
    /// An error was caught and logged.
    Failed,
}

/// Places the active window according to a [`Catalog`].
pub struct Placer<D: Desktop> {
    desktop: D,
    catalog: Catalog,
    threshold: u32,
}

impl<D: Desktop> Placer<D> {
    pub fn new(desktop: D, catalog: Catalog) -> Self {
        Self {
            desktop,
            catalog,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Override the "already placed" distance threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Place the active window for layout `name`.
    ///
    /// Never fails: errors from the desktop are logged, reported on stdout
    /// and turned into [`Placement::Failed`] so the event loop keeps going.
    pub fn resolve_and_apply(&self, name: &str) -> Placement {
        match self.try_place(name) {
            Ok(placement) => placement,
            Err(e) => {
                error!("placing {:?} failed: {}", name, e);
                println!("Unable to move window: {}", e);
                Placement::Failed
            }
        }
    }

    fn try_place(&self, name: &str) -> Result<Placement, PlacementError> {
        let entry = self
            .catalog
            .get(name)
            .ok_or_else(|| PlacementError::UnknownLayout(name.to_string()))?;

        let Some(window) = self.active_window()? else {
            debug!("{}: no suitable active window", name);
            return Ok(Placement::NoWindow);
        };

        let monitor = self.desktop.monitor_at_window(window).map_err(desktop_err)?;
        let frame = self.desktop.frame_extents(window).map_err(desktop_err)?;
        let work_area = self.desktop.monitor_work_area(monitor).map_err(desktop_err)?;
        debug!(
            "{}: window {:?} frame {} on monitor {} (work area {})",
            name, window, frame, monitor, work_area
        );

        let targets: Vec<Rect> = entry
            .candidates
            .iter()
            .map(|pct| pct.to_absolute(&work_area))
            .collect();

        match select_candidate(&targets, &frame, self.threshold) {
            Some(index) => {
                let rect = targets[index];
                apply(&self.desktop, window, rect).map_err(desktop_err)?;
                info!("{}: moved window to candidate {} ({})", name, index, rect);
                Ok(Placement::Moved { index, rect })
            }
            None => {
                debug!("{}: window already placed", name);
                Ok(Placement::Unchanged)
            }
        }
    }

    /// The focused window, provided the window manager supports the EWMH
    /// hints we rely on and the window is not the desktop background.
    fn active_window(&self) -> Result<Option<D::Window>, PlacementError> {
        let Some(window) = self.desktop.active_window().map_err(desktop_err)? else {
            return Ok(None);
        };
        for hint in [NET_ACTIVE_WINDOW, NET_WM_WINDOW_TYPE] {
            if !self.desktop.supports_hint(hint).map_err(desktop_err)? {
                debug!("window manager does not support {}", hint);
                return Ok(None);
            }
        }
        if self.desktop.window_type(window).map_err(desktop_err)? == WindowType::Desktop {
            return Ok(None);
        }
        Ok(Some(window))
    }
}

fn desktop_err<E: std::error::Error>(e: E) -> PlacementError {
    PlacementError::Desktop(e.to_string())
}

/// Pick the candidate to apply for a window currently at `current`.
///
/// Returns the first candidate after the last near one (or from the start
/// when none is near) whose distance exceeds `threshold`.
pub fn select_candidate(targets: &[Rect], current: &Rect, threshold: u32) -> Option<usize> {
    let start = targets
        .iter()
        .rposition(|t| t.distance(current) <= threshold)
        .map_or(0, |i| i + 1);
    (start..targets.len()).find(|&i| targets[i].distance(current) > threshold)
}

/// Move and resize `window` so that its frame covers `rect`.
///
/// The window is unmaximized and stripped of shadow margins first.  The
/// title bar height is taken off the requested height because the request
/// sizes the client area while `rect` describes the frame.
pub fn apply<D: Desktop>(desktop: &D, window: D::Window, rect: Rect) -> Result<(), D::Error> {
    desktop.unmaximize(window)?;
    desktop.clear_shadow(window)?;
    let (_, client_y) = desktop.origin(window)?;
    let (_, frame_y) = desktop.root_origin(window)?;
    let title_bar = client_y - frame_y;
    desktop.move_resize(
        window,
        Rect::new(rect.x, rect.y, rect.width, rect.height - title_bar),
    )
}
