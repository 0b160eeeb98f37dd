//! Raw input device metadata.
//!
//! Implements [`DeviceQuery`] over `GetRawInputDeviceInfoW` and enumerates
//! attached devices, with their names and HID product strings, for
//! `--list-devices`.

use crate::contract::{check_copied, fill_growing, FillError};
use crate::error::MonitorError;
use crate::listing::{KeyboardRecord, MouseRecord, SubRecord};
use crate::monitor::classifier::{DeviceInfoReply, DeviceQuery};
use crate::monitor::types::{DeviceHandle, DeviceKind};
use std::ffi::c_void;
use std::mem::size_of;
use windows::core::HSTRING;
use windows::Win32::Devices::HumanInterfaceDevice::HidD_GetProductString;
use windows::Win32::Foundation::{CloseHandle, ERROR_INSUFFICIENT_BUFFER, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::UI::Input::{
    GetRawInputDeviceInfoW, GetRawInputDeviceList, RAWINPUTDEVICELIST, RID_DEVICE_INFO,
    RIDI_DEVICEINFO, RIDI_DEVICENAME,
};

fn raw_handle(device: DeviceHandle) -> HANDLE {
    HANDLE(device.0 as *mut c_void)
}

fn record_size() -> u32 {
    size_of::<RID_DEVICE_INFO>() as u32
}

/// Reads the device info record, returning it with the byte count copied.
fn read_device_info(device: DeviceHandle) -> Option<(u32, RID_DEVICE_INFO)> {
    let mut info = RID_DEVICE_INFO {
        cbSize: record_size(),
        ..Default::default()
    };
    let mut size = record_size();

    let copied = unsafe {
        GetRawInputDeviceInfoW(
            raw_handle(device),
            RIDI_DEVICEINFO,
            Some(&mut info as *mut RID_DEVICE_INFO as *mut c_void),
            &mut size,
        )
    };

    if copied == 0 || copied == u32::MAX {
        tracing::debug!(
            device = %device,
            error = %windows::core::Error::from_win32(),
            "GetRawInputDeviceInfoW failed"
        );
        return None;
    }
    Some((copied, info))
}

/// Device metadata straight from the raw input API.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32DeviceQuery;

impl DeviceQuery for Win32DeviceQuery {
    fn record_size(&self) -> u32 {
        record_size()
    }

    fn device_info(&self, device: DeviceHandle) -> Option<DeviceInfoReply> {
        let (copied, info) = read_device_info(device)?;

        let reported_type = info.dwType.0;
        let (keyboard_keys_total, mouse_buttons) = match DeviceKind::from_raw(reported_type) {
            DeviceKind::Keyboard => (unsafe { info.Anonymous.keyboard.dwNumberOfKeysTotal }, 0),
            DeviceKind::Mouse => (0, unsafe { info.Anonymous.mouse.dwNumberOfButtons }),
            DeviceKind::Other => (0, 0),
        };

        Some(DeviceInfoReply {
            bytes_copied: copied,
            reported_size: info.cbSize,
            reported_type,
            keyboard_keys_total,
            mouse_buttons,
        })
    }
}

/// Reads the keyboard or mouse part of the device info record.
///
/// Only meaningful once [`classify`](crate::monitor::classify) accepted the
/// record; returns `None` for other HID devices or when the query fails.
pub fn device_sub_record(device: DeviceHandle) -> Option<SubRecord> {
    let (_, info) = read_device_info(device)?;

    match DeviceKind::from_raw(info.dwType.0) {
        DeviceKind::Keyboard => {
            let keyboard = unsafe { info.Anonymous.keyboard };
            Some(SubRecord::Keyboard(KeyboardRecord {
                keyboard_type: keyboard.dwType,
                subtype: keyboard.dwSubType,
                mode: keyboard.dwKeyboardMode,
                function_keys: keyboard.dwNumberOfFunctionKeys,
                indicators: keyboard.dwNumberOfIndicators,
                keys_total: keyboard.dwNumberOfKeysTotal,
            }))
        }
        DeviceKind::Mouse => {
            let mouse = unsafe { info.Anonymous.mouse };
            Some(SubRecord::Mouse(MouseRecord {
                id: mouse.dwId,
                buttons: mouse.dwNumberOfButtons,
                sample_rate: mouse.dwSampleRate,
                horizontal_wheel: mouse.fHasHorizontalWheel.as_bool(),
            }))
        }
        DeviceKind::Other => None,
    }
}

/// One attached raw input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDevice {
    pub handle: DeviceHandle,
    pub kind: DeviceKind,
}

/// Enumerates all raw input devices.
///
/// # Errors
/// Fails if the API errors for any reason other than a short buffer, or if it
/// answers inconsistently about how much room it needs.
pub fn list_devices() -> Result<Vec<RawDevice>, MonitorError> {
    let entry_size = size_of::<RAWINPUTDEVICELIST>() as u32;

    let fill = |entries: &mut [RAWINPUTDEVICELIST], count: &mut u32| {
        let returned =
            unsafe { GetRawInputDeviceList(Some(entries.as_mut_ptr()), count, entry_size) };
        if returned != u32::MAX {
            return Ok(returned);
        }

        let error = windows::core::Error::from_win32();
        if error.code() == ERROR_INSUFFICIENT_BUFFER.to_hresult() {
            Err(FillError::InsufficientBuffer)
        } else {
            Err(FillError::Failed(error))
        }
    };
    let entries = fill_growing("GetRawInputDeviceList", fill)?;

    tracing::debug!(count = entries.len(), "Enumerated raw input devices");

    Ok(entries
        .iter()
        .map(|entry| RawDevice {
            handle: DeviceHandle(entry.hDevice.0 as usize),
            kind: DeviceKind::from_raw(entry.dwType.0),
        })
        .collect())
}

/// Gets the device interface name, e.g. `\\?\HID#VID_046D&PID_C52B...`.
///
/// Returns `Ok(None)` if the name cannot be read.
pub fn device_name(device: DeviceHandle) -> Result<Option<String>, MonitorError> {
    let mut chars: u32 = 0;
    unsafe {
        GetRawInputDeviceInfoW(raw_handle(device), RIDI_DEVICENAME, None, &mut chars);
    }
    if chars == 0 {
        return Ok(None);
    }

    let mut buffer: Vec<u16> = vec![0; chars as usize];
    let copied = unsafe {
        GetRawInputDeviceInfoW(
            raw_handle(device),
            RIDI_DEVICENAME,
            Some(buffer.as_mut_ptr() as *mut c_void),
            &mut chars,
        )
    };

    if copied == 0 || copied == u32::MAX {
        return Ok(None);
    }
    check_copied("GetRawInputDeviceInfoW", copied, buffer.len() as u32)?;

    let name = String::from_utf16_lossy(&buffer[..copied as usize]);
    Ok(Some(name.trim_end_matches('\0').to_string()))
}

/// Open handle to a HID device file. Closed on drop.
struct DeviceFile(HANDLE);

impl DeviceFile {
    /// Opens the device for attribute queries only.
    ///
    /// Keyboards and mice are held exclusively by the system, so no read or
    /// write access is requested.
    fn open(name: &str) -> windows::core::Result<Self> {
        let handle = unsafe {
            CreateFileW(
                &HSTRING::from(name),
                0,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                FILE_FLAGS_AND_ATTRIBUTES(0),
                HANDLE::default(),
            )?
        };
        Ok(Self(handle))
    }
}

impl Drop for DeviceFile {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

// HID strings are capped at 126 characters plus the terminator
const HID_STRING_CHARS: usize = 127;

/// Gets the HID product string of the device behind an interface name.
///
/// Failures are logged and yield `None`; plenty of devices have no product
/// string or refuse to be opened.
pub fn product_string(name: &str) -> Option<String> {
    let file = match DeviceFile::open(name) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(device = name, error = %e, "Cannot open device for product string");
            return None;
        }
    };

    let mut buffer = [0u16; HID_STRING_CHARS];
    let ok = unsafe {
        HidD_GetProductString(
            file.0,
            buffer.as_mut_ptr() as *mut c_void,
            (buffer.len() * size_of::<u16>()) as u32,
        )
    };
    if !ok.as_bool() {
        tracing::debug!(
            device = name,
            error = %windows::core::Error::from_win32(),
            "HidD_GetProductString failed"
        );
        return None;
    }

    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    let product = String::from_utf16_lossy(&buffer[..len]);
    (!product.is_empty()).then_some(product)
}
