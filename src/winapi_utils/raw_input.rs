//! Raw input registration and decoding.
//!
//! Keyboard and mouse raw input is registered with `RIDEV_INPUTSINK` so the
//! hidden window receives it regardless of focus. Each WM_INPUT is decoded
//! into a platform-independent [`InputEvent`].

use crate::contract::check_copied;
use crate::error::MonitorError;
use crate::monitor::types::{DeviceHandle, DeviceKind, InputEvent};
use std::ffi::c_void;
use std::mem::size_of;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Input::{
    GetRawInputData, RegisterRawInputDevices, HRAWINPUT, RAWINPUT, RAWINPUTDEVICE,
    RAWINPUTDEVICE_FLAGS, RAWINPUTHEADER, RIDEV_INPUTSINK, RIDEV_REMOVE, RID_HEADER, RID_INPUT,
};
use windows::Win32::UI::WindowsAndMessaging::{DefWindowProcW, WM_INPUT};

// HID usage page and usages for generic desktop devices
const HID_USAGE_PAGE_GENERIC: u16 = 0x01;
const HID_USAGE_GENERIC_MOUSE: u16 = 0x02;
const HID_USAGE_GENERIC_KEYBOARD: u16 = 0x06;

fn generic_devices(flags: RAWINPUTDEVICE_FLAGS, target: HWND) -> [RAWINPUTDEVICE; 2] {
    [HID_USAGE_GENERIC_KEYBOARD, HID_USAGE_GENERIC_MOUSE].map(|usage| RAWINPUTDEVICE {
        usUsagePage: HID_USAGE_PAGE_GENERIC,
        usUsage: usage,
        dwFlags: flags,
        hwndTarget: target,
    })
}

/// RAII guard for the keyboard and mouse raw input registration.
///
/// Removes the registration when dropped so no stale subscription outlives
/// the window.
pub struct RawInputRegistration {
    _private: (),
}

impl RawInputRegistration {
    /// Registers keyboards and mice, delivering WM_INPUT to `hwnd`.
    pub fn register(hwnd: HWND) -> windows::core::Result<Self> {
        let devices = generic_devices(RIDEV_INPUTSINK, hwnd);
        unsafe { RegisterRawInputDevices(&devices, size_of::<RAWINPUTDEVICE>() as u32)? };

        tracing::info!("Raw input registered for keyboard and mouse");
        Ok(Self { _private: () })
    }
}

impl Drop for RawInputRegistration {
    fn drop(&mut self) {
        // RIDEV_REMOVE requires a null target
        let devices = generic_devices(RIDEV_REMOVE, HWND::default());
        match unsafe { RegisterRawInputDevices(&devices, size_of::<RAWINPUTDEVICE>() as u32) } {
            Ok(()) => tracing::info!("Raw input unregistered"),
            Err(e) => tracing::error!(error = ?e, "Failed to unregister raw input"),
        }
    }
}

/// Hands a WM_INPUT message back to `DefWindowProcW` when dropped.
///
/// The system frees the raw input buffer there, so this must run on every
/// path out of the WM_INPUT handler.
pub struct RawInputRelease {
    hwnd: HWND,
    wparam: WPARAM,
    lparam: LPARAM,
}

impl RawInputRelease {
    pub fn new(hwnd: HWND, wparam: WPARAM, lparam: LPARAM) -> Self {
        Self {
            hwnd,
            wparam,
            lparam,
        }
    }
}

impl Drop for RawInputRelease {
    fn drop(&mut self) {
        unsafe {
            DefWindowProcW(self.hwnd, WM_INPUT, self.wparam, self.lparam);
        }
    }
}

/// Decodes the raw input referenced by a WM_INPUT `lparam`.
///
/// Returns `Ok(None)` when the data cannot be read; the event is dropped.
///
/// # Errors
/// Returns a contract violation if the system reports copying more bytes
/// than the buffer it was given.
pub fn read_input_event(lparam: LPARAM) -> Result<Option<InputEvent>, MonitorError> {
    let handle = HRAWINPUT(lparam.0 as *mut c_void);
    let header_size = size_of::<RAWINPUTHEADER>() as u32;

    let mut header = RAWINPUTHEADER::default();
    let mut size = header_size;
    let copied = unsafe {
        GetRawInputData(
            handle,
            RID_HEADER,
            Some(&mut header as *mut RAWINPUTHEADER as *mut c_void),
            &mut size,
            header_size,
        )
    };

    if copied == u32::MAX {
        tracing::warn!(
            error = %windows::core::Error::from_win32(),
            "GetRawInputData failed to read header"
        );
        return Ok(None);
    }
    check_copied("GetRawInputData header", copied, header_size)?;

    let kind = DeviceKind::from_raw(header.dwType);
    let device = DeviceHandle(header.hDevice.0 as usize);

    let mouse_buttons_changed = match kind {
        DeviceKind::Mouse => match read_mouse_button_flags(handle)? {
            Some(flags) => flags != 0,
            None => return Ok(None),
        },
        _ => false,
    };

    Ok(Some(InputEvent {
        device,
        kind,
        mouse_buttons_changed,
    }))
}

/// Reads the full mouse payload and returns its button transition flags.
fn read_mouse_button_flags(handle: HRAWINPUT) -> Result<Option<u16>, MonitorError> {
    let buffer_size = size_of::<RAWINPUT>() as u32;

    let mut input = RAWINPUT::default();
    let mut size = buffer_size;
    let copied = unsafe {
        GetRawInputData(
            handle,
            RID_INPUT,
            Some(&mut input as *mut RAWINPUT as *mut c_void),
            &mut size,
            size_of::<RAWINPUTHEADER>() as u32,
        )
    };

    if copied == u32::MAX {
        tracing::warn!(
            error = %windows::core::Error::from_win32(),
            "GetRawInputData failed to read mouse data"
        );
        return Ok(None);
    }
    check_copied("GetRawInputData", copied, buffer_size)?;

    // usButtonFlags also carries wheel movement
    let flags = unsafe { input.data.mouse.Anonymous.Anonymous.usButtonFlags };
    Ok(Some(flags))
}
