//! Safe wrappers around Windows API calls.
//!
//! This module adapts the Win32 raw input API to the platform-independent
//! monitor core: a hidden window receives WM_INPUT and WM_TIMER, and device
//! metadata comes from the raw input device queries.

pub mod devices;
pub mod message_loop;
pub mod raw_input;
pub mod timer;
pub mod window;

pub use devices::*;
pub use message_loop::*;
pub use raw_input::*;
pub use timer::*;
pub use window::*;
