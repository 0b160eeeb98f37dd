//! Core activity detection logic.
//!
//! Raw input events flow through the classifier and filter into the
//! aggregator; each tick flushes the aggregator into an activity record.
//! Nothing in here touches the Win32 API.

pub mod aggregator;
pub mod classifier;
pub mod dispatch;
pub mod filter;
pub mod session;
pub mod tick;
pub mod types;

pub use aggregator::*;
pub use classifier::*;
pub use dispatch::*;
pub use filter::*;
pub use session::*;
pub use tick::*;
pub use types::*;
