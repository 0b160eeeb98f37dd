//! Device descriptions printed by `--list-devices`.

use crate::monitor::classifier::ClassifyError;
use crate::monitor::types::{DeviceHandle, DeviceKind};
use std::fmt;

/// Keyboard part of the device info record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardRecord {
    pub keyboard_type: u32,
    pub subtype: u32,
    pub mode: u32,
    pub function_keys: u32,
    pub indicators: u32,
    pub keys_total: u32,
}

/// Mouse part of the device info record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseRecord {
    pub id: u32,
    pub buttons: u32,
    pub sample_rate: u32,
    pub horizontal_wheel: bool,
}

/// The kind-specific part of a device info record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubRecord {
    Keyboard(KeyboardRecord),
    Mouse(MouseRecord),
}

/// Everything known about one attached device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceListing {
    pub handle: DeviceHandle,
    pub kind: DeviceKind,
    pub name: Option<String>,

    /// HID product string, if the device could be opened and has one.
    pub product: Option<String>,

    /// `None` for devices that are neither keyboards nor mice.
    pub record: Option<Result<SubRecord, ClassifyError>>,
}

impl fmt::Display for DeviceListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device {} ({})", self.handle, self.kind)?;
        writeln!(
            f,
            "  Name:        {}",
            self.name.as_deref().unwrap_or("<unavailable>")
        )?;
        if let Some(product) = &self.product {
            writeln!(f, "  Product:     {product}")?;
        }

        match &self.record {
            None => Ok(()),
            Some(Err(e)) => writeln!(f, "  Error:       {e}"),
            Some(Ok(SubRecord::Keyboard(keyboard))) => {
                writeln!(
                    f,
                    "  Type:        {}, subtype {}, mode {}",
                    keyboard.keyboard_type, keyboard.subtype, keyboard.mode
                )?;
                writeln!(f, "  Keys:        {}", keyboard.keys_total)?;
                writeln!(f, "  Function:    {}", keyboard.function_keys)?;
                writeln!(f, "  Indicators:  {}", keyboard.indicators)
            }
            Some(Ok(SubRecord::Mouse(mouse))) => {
                writeln!(f, "  Mouse id:    {}", mouse.id)?;
                writeln!(f, "  Buttons:     {}", mouse.buttons)?;
                writeln!(f, "  Sample rate: {}", mouse.sample_rate)?;
                writeln!(
                    f,
                    "  H. wheel:    {}",
                    if mouse.horizontal_wheel { "yes" } else { "no" }
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(kind: DeviceKind, record: Option<Result<SubRecord, ClassifyError>>) -> DeviceListing {
        DeviceListing {
            handle: DeviceHandle(0x1a2b),
            kind,
            name: Some(r"\\?\HID#VID_046D&PID_C52B".to_string()),
            product: None,
            record,
        }
    }

    #[test]
    fn test_keyboard_listing_shows_whole_record() {
        let mut device = listing(
            DeviceKind::Keyboard,
            Some(Ok(SubRecord::Keyboard(KeyboardRecord {
                keyboard_type: 81,
                subtype: 0,
                mode: 1,
                function_keys: 12,
                indicators: 3,
                keys_total: 104,
            }))),
        );
        device.product = Some("USB Receiver".to_string());

        assert_eq!(
            device.to_string(),
            "Device 0x1a2b (keyboard)\n\
             \x20 Name:        \\\\?\\HID#VID_046D&PID_C52B\n\
             \x20 Product:     USB Receiver\n\
             \x20 Type:        81, subtype 0, mode 1\n\
             \x20 Keys:        104\n\
             \x20 Function:    12\n\
             \x20 Indicators:  3\n"
        );
    }

    #[test]
    fn test_mouse_listing_shows_whole_record() {
        let device = listing(
            DeviceKind::Mouse,
            Some(Ok(SubRecord::Mouse(MouseRecord {
                id: 256,
                buttons: 5,
                sample_rate: 0,
                horizontal_wheel: true,
            }))),
        );
        let text = device.to_string();

        assert!(text.contains("  Mouse id:    256\n"));
        assert!(text.contains("  Buttons:     5\n"));
        assert!(text.contains("  Sample rate: 0\n"));
        assert!(text.ends_with("  H. wheel:    yes\n"));
        assert!(!text.contains("Product"));
    }

    #[test]
    fn test_missing_name_and_classification_error() {
        let mut device = listing(
            DeviceKind::Mouse,
            Some(Err(ClassifyError::QueryFailed(DeviceHandle(0x1a2b)))),
        );
        device.name = None;

        assert_eq!(
            device.to_string(),
            "Device 0x1a2b (mouse)\n\
             \x20 Name:        <unavailable>\n\
             \x20 Error:       device info query failed for 0x1a2b\n"
        );
    }

    #[test]
    fn test_other_devices_have_no_record() {
        let device = listing(DeviceKind::Other, None);
        assert_eq!(device.to_string().lines().count(), 2);
    }
}
