//! Buffer contracts of the host input API.
//!
//! The raw input calls fill caller-provided buffers and report how much they
//! wrote or how much room they need. A reply that contradicts the buffer it
//! was given means the host broke its contract, which is fatal.

use crate::error::MonitorError;

/// Outcome of one failed fill attempt.
#[derive(Debug)]
pub enum FillError<E> {
    /// The buffer was too small; the count argument holds the required size.
    InsufficientBuffer,

    /// Any other failure.
    Failed(E),
}

/// Fills a growable buffer, retrying with the size the host asks for.
///
/// `fill` receives the buffer and its length as an in/out count, and returns
/// the number of entries written. On `InsufficientBuffer` the count must
/// have been raised above the buffer length.
///
/// # Errors
/// A contract violation if the host writes more entries than there was room
/// for, or asks for a bigger buffer without needing more room. Other
/// failures are passed through.
pub fn fill_growing<T, E, F>(what: &str, mut fill: F) -> Result<Vec<T>, MonitorError>
where
    T: Clone + Default,
    E: Into<MonitorError>,
    F: FnMut(&mut [T], &mut u32) -> Result<u32, FillError<E>>,
{
    // Must be non-empty
    let mut entries = vec![T::default(); 1];

    loop {
        let mut count = entries.len() as u32;
        match fill(&mut entries, &mut count) {
            Ok(returned) => {
                check_copied(what, returned, entries.len() as u32)?;
                entries.truncate(returned as usize);
                return Ok(entries);
            }
            Err(FillError::Failed(e)) => return Err(e.into()),
            Err(FillError::InsufficientBuffer) => {
                if count as usize <= entries.len() {
                    return Err(MonitorError::contract(format!(
                        "{what} reported a short buffer but asked for {count} entries with room for {}",
                        entries.len()
                    )));
                }
                entries.resize(count as usize, T::default());
            }
        }
    }
}

/// Checks that a call wrote no more than the room it was given.
pub fn check_copied(what: &str, copied: u32, capacity: u32) -> Result<(), MonitorError> {
    if copied > capacity {
        return Err(MonitorError::contract(format!(
            "{what} returned {copied} with room for {capacity}"
        )));
    }
    Ok(())
}
