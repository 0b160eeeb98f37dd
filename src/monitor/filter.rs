//! Event filtering.
//!
//! Decides whether a raw input event counts as user activity. Checks run
//! cheapest first: event kind, mouse button change and null handle are
//! decided from the event alone, the device query only runs after those,
//! and the deny list needs the classified capacity.

use super::classifier::{classify, ClassifyError, DeviceQuery};
use super::types::{DeviceInfo, DeviceKind, InputEvent};
use std::collections::BTreeSet;
use thiserror::Error;

/// Device capacities whose input is ignored.
///
/// Fixed at startup and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenyList(BTreeSet<u32>);

impl DenyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, capacity: u32) -> bool {
        self.0.contains(&capacity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u32> for DenyList {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Why an event did not count as activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("event is neither keyboard nor mouse")]
    OtherKind,

    #[error("mouse moved without a button change")]
    MouseMovement,

    #[error("synthetic device")]
    SyntheticDevice,

    #[error("device unavailable: {0}")]
    Unavailable(#[source] ClassifyError),

    #[error("device capacity {0} is deny-listed")]
    DenyListed(u32),
}

/// Activity filter over raw input events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    deny_list: DenyList,
}

impl EventFilter {
    pub fn new(deny_list: DenyList) -> Self {
        Self { deny_list }
    }

    /// Returns the classified device on acceptance, or the first reason to
    /// reject the event.
    pub fn evaluate<Q: DeviceQuery + ?Sized>(
        &self,
        query: &Q,
        event: &InputEvent,
    ) -> Result<DeviceInfo, Rejection> {
        match event.kind {
            DeviceKind::Other => return Err(Rejection::OtherKind),
            DeviceKind::Mouse if !event.mouse_buttons_changed => {
                return Err(Rejection::MouseMovement)
            }
            _ => {}
        }

        if event.device.is_synthetic() {
            return Err(Rejection::SyntheticDevice);
        }

        let info = classify(query, event.device, event.kind).map_err(Rejection::Unavailable)?;

        match info.capacity {
            Some(capacity) if self.deny_list.contains(capacity) => {
                Err(Rejection::DenyListed(capacity))
            }
            _ => Ok(info),
        }
    }

    /// Returns true if the event counts as activity.
    pub fn accept<Q: DeviceQuery + ?Sized>(&self, query: &Q, event: &InputEvent) -> bool {
        self.evaluate(query, event).is_ok()
    }
}
