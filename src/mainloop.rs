//! Driving the [`Dispatcher`] from a host main loop.
//!
//! With the `glib-loop` feature (the default) the X connection's file
//! descriptor is watched from the GLib main loop and every readiness
//! notification drains the queue.  Without it, a plain blocking loop waits
//! on the connection instead.  Either way there is a single thread and the
//! loop only ends when the connection goes away or fails.

use crate::dispatch::Dispatcher;
use crate::traits::{Desktop, EventSource};
use log::info;
use std::os::unix::io::RawFd;

/// Why the main loop stopped.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("connection to the display was closed")]
    Disconnected,
    #[error("event source failed: {0}")]
    Source(String),
}

/// Handle one readiness notification on the connection.
///
/// `hung_up` is set when the host loop saw the descriptor close.  Otherwise
/// every pending event is drained.  `Ok` carries the number of events
/// consumed and means the watch should stay armed; any error is fatal.
pub fn on_ready<D, S>(dispatcher: &Dispatcher<D>, source: &mut S, hung_up: bool) -> Result<usize, LoopError>
where
    D: Desktop,
    S: EventSource,
{
    if hung_up {
        return Err(LoopError::Disconnected);
    }
    dispatcher
        .drain(source)
        .map_err(|e| LoopError::Source(e.to_string()))
}

/// Watch `fd` from the GLib main loop and drain `source` whenever it is
/// readable.  Blocks until the connection hangs up or stops delivering
/// events.
#[cfg(feature = "glib-loop")]
pub fn run<D, S>(dispatcher: Dispatcher<D>, mut source: S, fd: RawFd) -> Result<(), LoopError>
where
    D: Desktop + 'static,
    S: EventSource + 'static,
{
    use gtk4::glib;
    use log::error;
    use std::cell::RefCell;
    use std::rc::Rc;

    let main_loop = glib::MainLoop::new(None, false);
    let quit = main_loop.clone();
    let failure: Rc<RefCell<Option<LoopError>>> = Rc::new(RefCell::new(None));
    let stored = Rc::clone(&failure);

    glib::unix_fd_add_local(
        fd,
        glib::IOCondition::IN | glib::IOCondition::HUP | glib::IOCondition::ERR,
        move |_, condition| {
            let hung_up = condition.intersects(glib::IOCondition::HUP | glib::IOCondition::ERR);
            match on_ready(&dispatcher, &mut source, hung_up) {
                Ok(_) => glib::ControlFlow::Continue,
                Err(e) => {
                    error!("{} ({:?})", e, condition);
                    *stored.borrow_mut() = Some(e);
                    quit.quit();
                    glib::ControlFlow::Break
                }
            }
        },
    );

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
    Err(failure.take().unwrap_or(LoopError::Disconnected))
}

/// Block on `source`, handling each event and then everything queued
/// behind it.  Returns only when the source fails.
#[cfg(not(feature = "glib-loop"))]
pub fn run<D, S>(dispatcher: Dispatcher<D>, mut source: S, _fd: RawFd) -> Result<(), LoopError>
where
    D: Desktop,
    S: EventSource,
{
    info!("entering blocking event loop");
    loop {
        let event = source
            .wait_event()
            .map_err(|e| LoopError::Source(e.to_string()))?;
        dispatcher.handle(event);
        on_ready(&dispatcher, &mut source, false)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::KeyBindingTable;
    use crate::catalog::Catalog;
    use crate::keys::InputEvent;
    use crate::placement::Placer;
    use crate::traits::mock::{MockGrabber, RecorderDesktop, ScriptedEvents};

    fn dispatcher() -> Dispatcher<RecorderDesktop> {
        let catalog = Catalog::builtin().unwrap();
        let bindings =
            KeyBindingTable::build(&catalog, "<Ctrl><Mod1><Mod2>", &MockGrabber::keypad()).unwrap();
        Dispatcher::new(bindings, Placer::new(RecorderDesktop::default(), catalog))
    }

    #[test]
    fn readable_source_is_drained_and_watch_stays_armed() {
        let d = dispatcher();
        let mut src = ScriptedEvents::new([InputEvent::KeyPress(79), InputEvent::KeyRelease(79)]);
        assert_eq!(on_ready(&d, &mut src, false).unwrap(), 2);
        assert_eq!(on_ready(&d, &mut src, false).unwrap(), 0);
        assert_eq!(d.placer().desktop().moves().len(), 1);
    }

    #[test]
    fn hang_up_stops_without_reading() {
        let d = dispatcher();
        let mut src = ScriptedEvents::new([InputEvent::KeyPress(79)]);
        let err = on_ready(&d, &mut src, true).unwrap_err();
        assert!(matches!(err, LoopError::Disconnected));
        assert_eq!(src.queue.len(), 1);
        assert!(d.placer().desktop().moves().is_empty());
    }

    #[test]
    fn failing_source_stops_the_watch() {
        let d = dispatcher();
        let mut src = ScriptedEvents {
            broken: true,
            ..ScriptedEvents::default()
        };
        let err = on_ready(&d, &mut src, false).unwrap_err();
        assert!(matches!(err, LoopError::Source(_)));
    }

    #[cfg(not(feature = "glib-loop"))]
    #[test]
    fn blocking_loop_handles_until_source_fails() {
        let source = ScriptedEvents::new([InputEvent::KeyPress(79), InputEvent::KeyPress(79)]);
        let err = run(dispatcher(), source, -1).unwrap_err();
        assert!(matches!(err, LoopError::Source(_)));
    }
}
