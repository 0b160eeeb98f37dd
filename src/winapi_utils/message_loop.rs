//! Windows message loop utilities.
//!
//! Raw input and timer messages are delivered to the hidden window through
//! this loop, so every callback of the monitor runs on the thread that
//! calls [`run_message_loop`].

use std::sync::atomic::{AtomicU32, Ordering};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW, TranslateMessage, MSG,
    PM_NOREMOVE, WM_QUIT,
};

/// Stores the loop thread ID for cross-thread quit signaling.
static LOOP_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Makes the calling thread the target of [`post_quit_message`].
///
/// Creates the thread's message queue so a quit posted before
/// [`run_message_loop`] starts is kept rather than lost. Call this before
/// installing anything that may post from another thread.
pub fn bind_loop_thread() -> u32 {
    let thread_id = unsafe { GetCurrentThreadId() };

    let mut msg = MSG::default();
    unsafe {
        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
    }

    LOOP_THREAD_ID.store(thread_id, Ordering::SeqCst);
    thread_id
}

/// Runs the message loop until WM_QUIT is received.
///
/// Returns the exit code carried by WM_QUIT.
///
/// # Errors
/// Returns the last OS error if `GetMessageW` fails, which only happens on
/// invalid arguments.
pub fn run_message_loop() -> windows::core::Result<i32> {
    let thread_id = bind_loop_thread();
    tracing::debug!(thread_id, "Message loop starting");

    let mut msg = MSG::default();

    let result = loop {
        // GetMessageW returns positive for a message, 0 for WM_QUIT, -1 on error
        match unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 {
            -1 => break Err(windows::core::Error::from_win32()),
            0 => break Ok(msg.wParam.0 as i32),
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    };

    LOOP_THREAD_ID.store(0, Ordering::SeqCst);
    tracing::debug!(?result, "Message loop exited");
    result
}

/// Posts WM_QUIT to the loop thread.
///
/// Safe to call from any thread, e.g. a Ctrl+C handler.
pub fn post_quit_message(exit_code: i32) {
    let thread_id = LOOP_THREAD_ID.load(Ordering::SeqCst);

    if thread_id == 0 {
        tracing::warn!("No message loop thread bound, cannot post quit message");
        return;
    }

    let result = unsafe {
        PostThreadMessageW(
            thread_id,
            WM_QUIT,
            WPARAM(exit_code as usize),
            LPARAM(0),
        )
    };

    match result {
        Ok(()) => tracing::debug!(exit_code, thread_id, "Posted quit message"),
        Err(e) => tracing::error!(?e, "Failed to post quit message to loop thread"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_posted_before_loop_starts_is_kept() {
        bind_loop_thread();
        post_quit_message(7);
        assert_eq!(run_message_loop().unwrap(), 7);
        assert_eq!(LOOP_THREAD_ID.load(Ordering::SeqCst), 0);
    }
}
