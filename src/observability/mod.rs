//! Observability for jsonkv
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Per-store counters
//!
//! Log fields carry paths, counts and error codes. They never carry key
//! material or document content.
//!
//! # Usage
//!
//! ```ignore
//! use jsonkv::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event_with_fields(Event::CacheLoaded, &[("keys", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, StoreMetrics};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}

/// Severity an event is logged at
///
/// Failure events are INFO and routine events TRACE. Both sit below the
/// default WARN threshold: the caller already receives every error.
pub fn event_severity(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Info
    } else {
        Severity::Trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity() {
        assert_eq!(event_severity(Event::StoreOpened), Severity::Trace);
        assert_eq!(event_severity(Event::WriteCommitted), Severity::Trace);
        assert_eq!(event_severity(Event::WriteFailed), Severity::Info);
        assert_eq!(event_severity(Event::CacheLoadFailed), Severity::Info);
    }

    #[test]
    fn test_events_below_default_threshold() {
        for event in [Event::StoreOpened, Event::CacheLoadFailed, Event::WriteFailed] {
            assert!(event_severity(event) < Severity::Warn);
        }
    }

    #[test]
    fn test_event_line_format() {
        let event = Event::WriteFailed;
        let line = logger::capture_log(
            event_severity(event),
            event.as_str(),
            &[("code", "JSONKV_IO_FAILURE")],
        );
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], event.as_str());
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["code"], "JSONKV_IO_FAILURE");
    }
}
