//! Device classification.
//!
//! Resolves a device handle to its kind and capacity by querying the
//! environment, and checks the reply for self-consistency before trusting it.
//! Virtual and misbehaving HID drivers do return odd records, so every
//! failed check is reported individually.

use super::types::{DeviceHandle, DeviceInfo, DeviceKind};
use std::fmt;
use thiserror::Error;

/// Raw device metadata as returned by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceInfoReply {
    /// Number of bytes the query actually copied.
    pub bytes_copied: u32,

    /// Size the record reports for itself.
    pub reported_size: u32,

    /// Raw type code the record reports.
    pub reported_type: u32,

    /// Total number of keys (keyboard sub-record).
    pub keyboard_keys_total: u32,

    /// Number of buttons (mouse sub-record).
    pub mouse_buttons: u32,
}

/// Source of device metadata.
pub trait DeviceQuery {
    /// Size in bytes of the fixed device info record.
    fn record_size(&self) -> u32;

    /// Fetches the record for a device. `None` when the query failed.
    fn device_info(&self, device: DeviceHandle) -> Option<DeviceInfoReply>;
}

/// A single failed consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("query copied {actual} bytes, expected {expected}")]
    ByteCount { expected: u32, actual: u32 },

    #[error("record reports size {actual}, expected {expected}")]
    SizeField { expected: u32, actual: u32 },

    #[error("record reports kind {reported}, event header says {expected}")]
    KindMismatch {
        expected: DeviceKind,
        reported: DeviceKind,
    },
}

/// Why a device could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("synthetic device (null handle)")]
    SyntheticDevice,

    #[error("device info query failed for {0}")]
    QueryFailed(DeviceHandle),

    #[error("inconsistent device info: {}", Listing(.0))]
    Inconsistent(Vec<Inconsistency>),
}

struct Listing<'a>(&'a [Inconsistency]);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Classifies the device behind `device`.
///
/// `kind` is the kind already known from the event header; the record must
/// agree with it. A synthetic handle is rejected without querying.
pub fn classify<Q: DeviceQuery + ?Sized>(
    query: &Q,
    device: DeviceHandle,
    kind: DeviceKind,
) -> Result<DeviceInfo, ClassifyError> {
    if device.is_synthetic() {
        return Err(ClassifyError::SyntheticDevice);
    }

    let reply = query.device_info(device).ok_or_else(|| {
        tracing::warn!(device = %device, "Device info query failed");
        ClassifyError::QueryFailed(device)
    })?;

    let failures = check_reply(&reply, query.record_size(), kind);
    if !failures.is_empty() {
        for failure in &failures {
            tracing::warn!(device = %device, %failure, "Inconsistent device info");
        }
        return Err(ClassifyError::Inconsistent(failures));
    }

    let capacity = match kind {
        DeviceKind::Keyboard => Some(reply.keyboard_keys_total),
        DeviceKind::Mouse => Some(reply.mouse_buttons),
        DeviceKind::Other => None,
    };

    Ok(DeviceInfo { kind, capacity })
}

/// Runs all three checks; none of them short-circuits the others.
fn check_reply(reply: &DeviceInfoReply, expected: u32, kind: DeviceKind) -> Vec<Inconsistency> {
    let mut failures = Vec::new();

    if reply.bytes_copied != expected {
        failures.push(Inconsistency::ByteCount {
            expected,
            actual: reply.bytes_copied,
        });
    }

    if reply.reported_size != expected {
        failures.push(Inconsistency::SizeField {
            expected,
            actual: reply.reported_size,
        });
    }

    let reported = DeviceKind::from_raw(reply.reported_type);
    if reported != kind {
        failures.push(Inconsistency::KindMismatch {
            expected: kind,
            reported,
        });
    }

    failures
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::monitor::types::{RAW_TYPE_KEYBOARD, RAW_TYPE_MOUSE};
    use std::cell::Cell;
    use std::collections::HashMap;

    pub(crate) const RECORD_SIZE: u32 = 32;

    /// In-memory device table that counts how often it is queried.
    #[derive(Default)]
    pub(crate) struct FakeQuery {
        pub devices: HashMap<DeviceHandle, DeviceInfoReply>,
        pub calls: Cell<usize>,
    }

    impl FakeQuery {
        pub fn with_keyboard(mut self, device: usize, keys: u32) -> Self {
            self.devices.insert(
                DeviceHandle(device),
                DeviceInfoReply {
                    bytes_copied: RECORD_SIZE,
                    reported_size: RECORD_SIZE,
                    reported_type: RAW_TYPE_KEYBOARD,
                    keyboard_keys_total: keys,
                    mouse_buttons: 0,
                },
            );
            self
        }

        pub fn with_mouse(mut self, device: usize, buttons: u32) -> Self {
            self.devices.insert(
                DeviceHandle(device),
                DeviceInfoReply {
                    bytes_copied: RECORD_SIZE,
                    reported_size: RECORD_SIZE,
                    reported_type: RAW_TYPE_MOUSE,
                    keyboard_keys_total: 0,
                    mouse_buttons: buttons,
                },
            );
            self
        }

        pub fn with_reply(mut self, device: usize, reply: DeviceInfoReply) -> Self {
            self.devices.insert(DeviceHandle(device), reply);
            self
        }
    }

    impl DeviceQuery for FakeQuery {
        fn record_size(&self) -> u32 {
            RECORD_SIZE
        }

        fn device_info(&self, device: DeviceHandle) -> Option<DeviceInfoReply> {
            self.calls.set(self.calls.get() + 1);
            self.devices.get(&device).copied()
        }
    }

    #[test]
    fn test_classify_keyboard_uses_total_keys() {
        let query = FakeQuery::default().with_keyboard(7, 104);
        let info = classify(&query, DeviceHandle(7), DeviceKind::Keyboard).unwrap();
        assert_eq!(info.kind, DeviceKind::Keyboard);
        assert_eq!(info.capacity, Some(104));
    }

    #[test]
    fn test_classify_mouse_uses_button_count() {
        let query = FakeQuery::default().with_mouse(9, 5);
        let info = classify(&query, DeviceHandle(9), DeviceKind::Mouse).unwrap();
        assert_eq!(info.capacity, Some(5));
    }

    #[test]
    fn test_synthetic_handle_skips_query() {
        let query = FakeQuery::default();
        let err = classify(&query, DeviceHandle::SYNTHETIC, DeviceKind::Keyboard).unwrap_err();
        assert_eq!(err, ClassifyError::SyntheticDevice);
        assert_eq!(query.calls.get(), 0);
    }

    #[test]
    fn test_failed_query_is_unavailable() {
        let query = FakeQuery::default();
        let err = classify(&query, DeviceHandle(3), DeviceKind::Mouse).unwrap_err();
        assert_eq!(err, ClassifyError::QueryFailed(DeviceHandle(3)));
    }

    #[test]
    fn test_size_field_mismatch_reported() {
        let reply = DeviceInfoReply {
            bytes_copied: RECORD_SIZE,
            reported_size: RECORD_SIZE - 4,
            reported_type: RAW_TYPE_KEYBOARD,
            keyboard_keys_total: 104,
            mouse_buttons: 0,
        };
        let query = FakeQuery::default().with_reply(4, reply);
        let err = classify(&query, DeviceHandle(4), DeviceKind::Keyboard).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::Inconsistent(vec![Inconsistency::SizeField {
                expected: RECORD_SIZE,
                actual: RECORD_SIZE - 4,
            }])
        );
    }

    #[test]
    fn test_all_failed_checks_are_reported() {
        let reply = DeviceInfoReply {
            bytes_copied: 8,
            reported_size: 8,
            reported_type: RAW_TYPE_MOUSE,
            ..Default::default()
        };
        let query = FakeQuery::default().with_reply(4, reply);
        let err = classify(&query, DeviceHandle(4), DeviceKind::Keyboard).unwrap_err();

        let failures = match err {
            ClassifyError::Inconsistent(failures) => failures,
            other => panic!("expected inconsistency, got {other:?}"),
        };
        assert_eq!(failures.len(), 3);
        assert!(matches!(failures[2], Inconsistency::KindMismatch { .. }));
    }

    #[test]
    fn test_inconsistency_display_lists_each_failure() {
        let err = ClassifyError::Inconsistent(vec![
            Inconsistency::ByteCount {
                expected: 32,
                actual: 8,
            },
            Inconsistency::SizeField {
                expected: 32,
                actual: 16,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "inconsistent device info: query copied 8 bytes, expected 32; \
             record reports size 16, expected 32"
        );
    }
}
