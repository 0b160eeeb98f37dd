//! Routes host callbacks to the handler until the first fatal error.
//!
//! Once a callback fails the host is asked to stop, but messages already
//! queued behind the failure still arrive. None of them reach the handler.

use super::session::InputHandler;
use super::types::InputEvent;
use crate::error::MonitorError;
use std::ops::ControlFlow;

pub struct Dispatcher {
    handler: Box<dyn InputHandler>,
    fatal: Option<MonitorError>,
}

impl Dispatcher {
    pub fn new(handler: Box<dyn InputHandler>) -> Self {
        Self {
            handler,
            fatal: None,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.fatal.is_some()
    }

    /// Reads one event and hands it to the handler.
    ///
    /// `read` is not called once stopped. Returns `Break` exactly once, on
    /// the call that stopped dispatch; the host must then end its loop.
    pub fn input<F>(&mut self, read: F) -> ControlFlow<()>
    where
        F: FnOnce() -> Result<Option<InputEvent>, MonitorError>,
    {
        if self.is_stopped() {
            return ControlFlow::Continue(());
        }
        match read() {
            Ok(Some(event)) => {
                self.handler.on_input(&event);
                ControlFlow::Continue(())
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(error) => self.fail(error),
        }
    }

    /// Ends the current tick. Same contract as [`input`](Self::input).
    pub fn tick(&mut self) -> ControlFlow<()> {
        if self.is_stopped() {
            return ControlFlow::Continue(());
        }
        match self.handler.on_tick() {
            Ok(()) => ControlFlow::Continue(()),
            Err(error) => self.fail(error.into()),
        }
    }

    /// Lets the handler flush. Runs even after a fatal error.
    pub fn shutdown(&mut self) {
        self.handler.on_shutdown();
    }

    /// The error that stopped dispatch, if any.
    pub fn into_fatal(self) -> Option<MonitorError> {
        self.fatal
    }

    fn fail(&mut self, error: MonitorError) -> ControlFlow<()> {
        tracing::error!(%error, "Stopping activity monitor");
        self.fatal = Some(error);
        ControlFlow::Break(())
    }
}
