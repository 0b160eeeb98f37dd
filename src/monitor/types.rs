//! Data types shared by the filtering and aggregation core.
//!
//! These are deliberately free of any Win32 types so the core can be
//! exercised on every platform.

use std::fmt;

/// Raw input type code for mice.
pub const RAW_TYPE_MOUSE: u32 = 0;

/// Raw input type code for keyboards.
pub const RAW_TYPE_KEYBOARD: u32 = 1;

/// Kind of device an input event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Keyboard,
    Mouse,
    /// Any HID that is neither a keyboard nor a mouse.
    Other,
}

impl DeviceKind {
    /// Maps a raw input type code to a device kind.
    pub fn from_raw(code: u32) -> Self {
        match code {
            RAW_TYPE_MOUSE => Self::Mouse,
            RAW_TYPE_KEYBOARD => Self::Keyboard,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyboard => f.write_str("keyboard"),
            Self::Mouse => f.write_str("mouse"),
            Self::Other => f.write_str("other HID"),
        }
    }
}

/// Opaque identifier of the device that produced an event.
///
/// A zero handle marks input injected by software (no physical device).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceHandle(pub usize);

impl DeviceHandle {
    /// The null handle carried by synthetic input.
    pub const SYNTHETIC: Self = Self(0);

    /// Returns true for the null handle.
    pub fn is_synthetic(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One raw keyboard or mouse event, as delivered by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub device: DeviceHandle,
    pub kind: DeviceKind,
    /// Whether any button (or wheel) state changed. Only meaningful for mice.
    pub mouse_buttons_changed: bool,
}

impl InputEvent {
    pub fn keyboard(device: DeviceHandle) -> Self {
        Self {
            device,
            kind: DeviceKind::Keyboard,
            mouse_buttons_changed: false,
        }
    }

    pub fn mouse_click(device: DeviceHandle) -> Self {
        Self {
            device,
            kind: DeviceKind::Mouse,
            mouse_buttons_changed: true,
        }
    }

    pub fn mouse_move(device: DeviceHandle) -> Self {
        Self {
            device,
            kind: DeviceKind::Mouse,
            mouse_buttons_changed: false,
        }
    }
}

/// Classified device metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub kind: DeviceKind,

    /// Total key count for keyboards, button count for mice.
    /// `None` for other HIDs.
    pub capacity: Option<u32>,
}

/// A tick during which the user was active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActivityRecord {
    /// Seconds since the Unix epoch at flush time.
    pub timestamp: i64,
}

impl fmt::Display for ActivityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_from_raw() {
        assert_eq!(DeviceKind::from_raw(0), DeviceKind::Mouse);
        assert_eq!(DeviceKind::from_raw(1), DeviceKind::Keyboard);
        assert_eq!(DeviceKind::from_raw(2), DeviceKind::Other);
        assert_eq!(DeviceKind::from_raw(77), DeviceKind::Other);
    }

    #[test]
    fn test_synthetic_handle() {
        assert!(DeviceHandle::SYNTHETIC.is_synthetic());
        assert!(DeviceHandle::default().is_synthetic());
        assert!(!DeviceHandle(0x1234).is_synthetic());
    }

    #[test]
    fn test_record_displays_bare_timestamp() {
        let record = ActivityRecord {
            timestamp: 1_700_000_000,
        };
        assert_eq!(record.to_string(), "1700000000");
    }
}
