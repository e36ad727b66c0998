//! Cache loader
//!
//! Populates the in-memory document from disk at most once per successful
//! attempt. The loader runs only on the pipeline worker, so concurrent
//! callers queue behind the first attempt instead of issuing their own
//! reads.
//!
//! Failed attempts are shared too: a caller that arrived while an attempt
//! was in flight receives that attempt's error. A caller that arrives after
//! a failure starts a fresh attempt, so transient errors are never cached
//! as permanent.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::errors::{StoreError, StoreResult};
use super::file::StoreFile;
use super::Document;
use crate::observability::{log_event_with_fields, Event, StoreMetrics};

/// Cache state, owned by the pipeline worker
#[derive(Debug, Default)]
pub(crate) struct CacheSlot {
    document: Option<Document>,
    last_failure: Option<FailedAttempt>,
}

#[derive(Debug)]
struct FailedAttempt {
    /// Completed-attempt count after this attempt finished
    attempt: u64,
    error: StoreError,
}

impl CacheSlot {
    /// Install `next` as the cached document, returning the one it replaces.
    pub(crate) fn install(&mut self, next: Document) -> (Option<Document>, &Document) {
        let previous = self.document.take();
        let current: &Document = self.document.insert(next);
        (previous, current)
    }

    /// Put back a document saved by [`install`](Self::install).
    pub(crate) fn restore(&mut self, previous: Option<Document>) {
        self.document = previous;
    }
}

/// Number of completed load attempts observed when a caller arrived
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoadTicket(u64);

/// Single-flight loader for one store
#[derive(Debug, Default)]
pub(crate) struct CacheLoader {
    completed: AtomicU64,
    loaded: AtomicBool,
}

impl CacheLoader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take a ticket. Must be called when the operation is queued.
    pub(crate) fn ticket(&self) -> LoadTicket {
        LoadTicket(self.completed.load(Ordering::Acquire))
    }

    /// Returns whether the cache has been populated
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Return the cached document, loading it first if needed.
    pub(crate) async fn ensure_loaded<'a>(
        &self,
        slot: &'a mut CacheSlot,
        ticket: LoadTicket,
        file: &StoreFile,
        metrics: &StoreMetrics,
    ) -> StoreResult<&'a Document> {
        let document = match slot.document.take() {
            Some(document) => document,
            None => self.load(slot, ticket, file, metrics).await?,
        };
        let document: &Document = slot.document.insert(document);
        Ok(document)
    }

    async fn load(
        &self,
        slot: &mut CacheSlot,
        ticket: LoadTicket,
        file: &StoreFile,
        metrics: &StoreMetrics,
    ) -> StoreResult<Document> {
        if let Some(failed) = &slot.last_failure {
            if failed.attempt > ticket.0 {
                return Err(failed.error.clone());
            }
        }

        metrics.increment_load_attempts();
        let result = file.read_document().await;
        let attempt = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        let path = file.path().display().to_string();

        match result {
            Ok(document) => {
                slot.last_failure = None;
                self.loaded.store(true, Ordering::Release);
                let keys = document.len().to_string();
                log_event_with_fields(
                    Event::CacheLoaded,
                    &[("path", path.as_str()), ("keys", keys.as_str())],
                );
                Ok(document)
            }
            Err(error) => {
                metrics.increment_load_failures();
                log_event_with_fields(
                    Event::CacheLoadFailed,
                    &[("path", path.as_str()), ("code", error.code())],
                );
                slot.last_failure = Some(FailedAttempt {
                    attempt,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }
}
