//! Observable store events
//!
//! Events are explicit and typed; their string form is the `event` field
//! of a log line.

use std::fmt;

/// Observable events in a store's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Store constructed and path validated
    StoreOpened,
    /// Cache populated from disk (or from an absent/blank file)
    CacheLoaded,
    /// Load attempt failed; the cache stays unloaded
    CacheLoadFailed,
    /// Write task persisted its document
    WriteCommitted,
    /// Write task failed to encode or persist
    WriteFailed,
    /// Cache restored after a failed write
    CacheRolledBack,
    /// Document replaced with the empty mapping
    StoreEmptied,
}

impl Event {
    /// Returns the event name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreOpened => "STORE_OPENED",
            Event::CacheLoaded => "CACHE_LOADED",
            Event::CacheLoadFailed => "CACHE_LOAD_FAILED",
            Event::WriteCommitted => "WRITE_COMMITTED",
            Event::WriteFailed => "WRITE_FAILED",
            Event::CacheRolledBack => "CACHE_ROLLED_BACK",
            Event::StoreEmptied => "STORE_EMPTIED",
        }
    }

    /// Returns whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::CacheLoadFailed | Event::WriteFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
