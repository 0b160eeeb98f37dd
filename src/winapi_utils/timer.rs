//! Tick timer.
//!
//! A window timer posts WM_TIMER to the message loop. The system coalesces
//! pending WM_TIMER messages, so a stalled loop sees one late tick rather
//! than a backlog.

use std::time::Duration;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{KillTimer, SetTimer};

/// Timer ID used for the tick timer on the monitor window.
pub const TICK_TIMER_ID: usize = 1;

/// RAII guard for a window timer. Kills the timer when dropped.
pub struct TickTimer {
    hwnd: HWND,
    id: usize,
}

impl TickTimer {
    /// Starts a periodic timer posting WM_TIMER with `TICK_TIMER_ID`.
    pub fn start(hwnd: HWND, interval: Duration) -> windows::core::Result<Self> {
        let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        let id = unsafe { SetTimer(hwnd, TICK_TIMER_ID, millis, None) };
        if id == 0 {
            return Err(windows::core::Error::from_win32());
        }

        tracing::debug!(interval_ms = millis, "Tick timer started");
        Ok(Self { hwnd, id })
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        match unsafe { KillTimer(self.hwnd, self.id) } {
            Ok(()) => tracing::debug!("Tick timer stopped"),
            Err(e) => tracing::error!(error = ?e, "Failed to kill tick timer"),
        }
    }
}
