//! Hidden message-only window hosting the monitor.
//!
//! The window owns the [`InputHandler`] together with the raw input
//! registration and the tick timer, and its window procedure is the only
//! place the handler is called from. A fatal error posts WM_QUIT and stops
//! all further dispatch. Destroying the window releases the subscriptions
//! before the handler sees `on_shutdown`.

use super::raw_input::{read_input_event, RawInputRegistration, RawInputRelease};
use super::timer::{TickTimer, TICK_TIMER_ID};
use crate::error::MonitorError;
use crate::monitor::dispatch::Dispatcher;
use crate::monitor::session::InputHandler;
use std::ffi::c_void;
use std::ops::ControlFlow;
use std::time::Duration;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetWindowLongPtrW, PostQuitMessage,
    RegisterClassW, SetWindowLongPtrW, UnregisterClassW, CREATESTRUCTW, GWLP_USERDATA,
    HWND_MESSAGE, WINDOW_EX_STYLE, WINDOW_STYLE, WM_DESTROY, WM_INPUT, WM_NCCREATE,
    WM_NCDESTROY, WM_TIMER, WNDCLASSW,
};

const CLASS_NAME: PCWSTR = w!("ActivityMonitorRawInput");

/// Subscriptions that must be released when the window goes away.
struct Subscriptions {
    _raw_input: RawInputRegistration,
    _timer: TickTimer,
}

/// Everything the window procedure needs, reachable via `GWLP_USERDATA`.
struct WindowState {
    dispatcher: Dispatcher,
    subscriptions: Option<Subscriptions>,
}

fn quit_on_break(flow: ControlFlow<()>) {
    if flow.is_break() {
        unsafe { PostQuitMessage(1) };
    }
}

/// Message-only window that routes raw input and timer messages to a
/// handler.
pub struct MessageWindow {
    hwnd: HWND,
    instance: HINSTANCE,
    state: *mut WindowState,
}

impl MessageWindow {
    /// Registers the window class and creates the window.
    pub fn create(handler: Box<dyn InputHandler>) -> Result<Self, MonitorError> {
        let instance: HINSTANCE = unsafe { GetModuleHandleW(None)? }.into();

        let class = WNDCLASSW {
            lpfnWndProc: Some(window_proc),
            hInstance: instance,
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        if unsafe { RegisterClassW(&class) } == 0 {
            return Err(windows::core::Error::from_win32().into());
        }

        let state = Box::into_raw(Box::new(WindowState {
            dispatcher: Dispatcher::new(handler),
            subscriptions: None,
        }));

        let created = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                CLASS_NAME,
                w!("Activity Monitor"),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                None,
                instance,
                Some(state as *const c_void),
            )
        };

        match created {
            Ok(hwnd) => {
                tracing::debug!(?hwnd, "Message window created");
                Ok(Self {
                    hwnd,
                    instance,
                    state,
                })
            }
            Err(e) => {
                unsafe {
                    drop(Box::from_raw(state));
                    let _ = UnregisterClassW(CLASS_NAME, instance);
                }
                Err(e.into())
            }
        }
    }

    /// Subscribes to raw input and starts the tick timer.
    pub fn start(&mut self, tick_interval: Duration) -> Result<(), MonitorError> {
        let raw_input = RawInputRegistration::register(self.hwnd)?;
        let timer = TickTimer::start(self.hwnd, tick_interval)?;

        // SAFETY: the state outlives the window and is only touched on this thread
        let state = unsafe { &mut *self.state };
        state.subscriptions = Some(Subscriptions {
            _raw_input: raw_input,
            _timer: timer,
        });
        Ok(())
    }

    /// Destroys the window and returns the fatal error raised while it ran,
    /// if any.
    pub fn close(mut self) -> Result<(), MonitorError> {
        match self.destroy() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn destroy(&mut self) -> Option<MonitorError> {
        if self.state.is_null() {
            return None;
        }

        unsafe {
            if let Err(e) = DestroyWindow(self.hwnd) {
                tracing::error!(error = ?e, "Failed to destroy message window");
            }
            let _ = UnregisterClassW(CLASS_NAME, self.instance);
        }

        let state = unsafe { Box::from_raw(self.state) };
        self.state = std::ptr::null_mut();
        state.dispatcher.into_fatal()
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        if let Some(error) = self.destroy() {
            tracing::error!(%error, "Message window dropped with an unreported error");
        }
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        let create = &*(lparam.0 as *const CREATESTRUCTW);
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowState;
    let Some(state) = state.as_mut() else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    match msg {
        WM_INPUT => {
            let _release = RawInputRelease::new(hwnd, wparam, lparam);
            quit_on_break(state.dispatcher.input(|| read_input_event(lparam)));
            LRESULT(0)
        }
        WM_TIMER if wparam.0 == TICK_TIMER_ID => {
            quit_on_break(state.dispatcher.tick());
            LRESULT(0)
        }
        WM_DESTROY => {
            // Drop order: raw input first, then the timer
            state.subscriptions = None;
            state.dispatcher.shutdown();
            LRESULT(0)
        }
        WM_NCDESTROY => {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
