//! Write pipeline
//!
//! Every operation on a store becomes a task on one unbounded FIFO queue,
//! drained by a single worker task that owns the cache. A task is queued
//! when the store method is called, not when its future is first polled,
//! so tasks run in call order and a queued task runs to completion whether
//! or not anyone awaits its reply.
//!
//! A write task:
//!
//! 1. ensures the cache is loaded
//! 2. applies the mutation to the cached document
//! 3. installs the new document in the cache
//! 4. encodes it through the codec
//! 5. replaces the store file
//!
//! Read tasks use the same queue, which also serializes the first load with
//! any writes queued behind it.
//!
//! The worker is spawned on the tokio runtime current at the first call and
//! exits once every handle to the store is dropped and the queue is drained.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use super::config::WriteFailurePolicy;
use super::errors::{StoreError, StoreResult};
use super::file::StoreFile;
use super::loader::{CacheLoader, CacheSlot, LoadTicket};
use super::Document;
use crate::observability::{log_event_with_fields, Event, MetricsSnapshot, StoreMetrics};

/// What a write task does with the document it was given
pub(crate) enum Mutation<R> {
    /// Install and persist `next`, then hand `output` to the caller
    Commit { next: Document, output: R },
    /// Leave the document as it is; nothing is written
    Unchanged(R),
}

/// State visible to both store handles and the worker
#[derive(Debug)]
struct Shared {
    path: PathBuf,
    encrypted: bool,
    loader: CacheLoader,
    metrics: StoreMetrics,
}

/// State owned by the worker alone
struct Engine {
    shared: Arc<Shared>,
    slot: CacheSlot,
    file: StoreFile,
    policy: WriteFailurePolicy,
}

/// A type-erased queued operation
trait Task: Send {
    fn run<'a>(self: Box<Self>, engine: &'a mut Engine)
        -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

type TaskQueue = mpsc::UnboundedSender<Box<dyn Task>>;

struct Worker {
    queue: mpsc::UnboundedReceiver<Box<dyn Task>>,
    engine: Engine,
}

impl Worker {
    async fn run(mut self) {
        while let Some(task) = self.queue.recv().await {
            task.run(&mut self.engine).await;
        }
    }
}

/// The queue behind a store
pub(crate) struct WritePipeline {
    shared: Arc<Shared>,
    queue: TaskQueue,
    /// Worker waiting to be spawned on first use
    idle: Mutex<Option<Worker>>,
}

impl WritePipeline {
    pub(crate) fn new(file: StoreFile, policy: WriteFailurePolicy) -> Self {
        let shared = Arc::new(Shared {
            path: file.path().to_path_buf(),
            encrypted: file.is_encrypted(),
            loader: CacheLoader::new(),
            metrics: StoreMetrics::new(),
        });
        let (queue, receiver) = mpsc::unbounded_channel();
        let worker = Worker {
            queue: receiver,
            engine: Engine {
                shared: Arc::clone(&shared),
                slot: CacheSlot::default(),
                file,
                policy,
            },
        };
        Self {
            shared,
            queue,
            idle: Mutex::new(Some(worker)),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.shared.path
    }

    pub(crate) fn is_encrypted(&self) -> bool {
        self.shared.encrypted
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.shared.loader.is_loaded()
    }

    pub(crate) fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Queue a read-only view over the loaded document.
    pub(crate) fn read<R, F>(&self, view: F) -> StoreResult<Reply<R>>
    where
        F: FnOnce(&Document) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        self.submit(Box::new(ReadTask {
            ticket: self.shared.loader.ticket(),
            view,
            reply,
        }))?;
        Ok(Reply { receiver })
    }

    /// Queue a mutation behind every previously queued task.
    pub(crate) fn enqueue<R, F>(&self, mutation: F) -> StoreResult<Reply<R>>
    where
        F: FnOnce(&Document) -> Mutation<R> + Send + 'static,
        R: Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        self.submit(Box::new(WriteTask {
            ticket: self.shared.loader.ticket(),
            mutation,
            reply,
        }))?;
        Ok(Reply { receiver })
    }

    fn submit(&self, task: Box<dyn Task>) -> StoreResult<()> {
        self.start_worker()?;
        self.queue
            .send(task)
            .map_err(|_| StoreError::WorkerUnavailable("store worker has stopped".to_string()))
    }

    fn start_worker(&self) -> StoreResult<()> {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.is_none() {
            return Ok(());
        }
        let handle = Handle::try_current().map_err(|_| {
            StoreError::WorkerUnavailable("no tokio runtime to run the store worker".to_string())
        })?;
        if let Some(worker) = idle.take() {
            handle.spawn(worker.run());
        }
        Ok(())
    }
}

impl fmt::Debug for WritePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePipeline")
            .field("path", &self.shared.path)
            .field("encrypted", &self.shared.encrypted)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// The pending result of a queued task
#[derive(Debug)]
pub(crate) struct Reply<R> {
    receiver: oneshot::Receiver<StoreResult<R>>,
}

impl<R> Future for Reply<R> {
    type Output = StoreResult<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(StoreError::WorkerUnavailable(
                    "store worker stopped before replying".to_string(),
                ))
            })
        })
    }
}

struct ReadTask<F, R> {
    ticket: LoadTicket,
    view: F,
    reply: oneshot::Sender<StoreResult<R>>,
}

impl<F, R> Task for ReadTask<F, R>
where
    F: FnOnce(&Document) -> R + Send + 'static,
    R: Send + 'static,
{
    fn run<'a>(
        self: Box<Self>,
        engine: &'a mut Engine,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let ReadTask {
            ticket,
            view,
            reply,
        } = *self;
        Box::pin(async move {
            let result = engine.read(ticket, view).await;
            // The caller may have stopped waiting
            let _ = reply.send(result);
        })
    }
}

struct WriteTask<F, R> {
    ticket: LoadTicket,
    mutation: F,
    reply: oneshot::Sender<StoreResult<R>>,
}

impl<F, R> Task for WriteTask<F, R>
where
    F: FnOnce(&Document) -> Mutation<R> + Send + 'static,
    R: Send + 'static,
{
    fn run<'a>(
        self: Box<Self>,
        engine: &'a mut Engine,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let WriteTask {
            ticket,
            mutation,
            reply,
        } = *self;
        Box::pin(async move {
            let result = engine.write(ticket, mutation).await;
            let _ = reply.send(result);
        })
    }
}

impl Engine {
    async fn read<R, F>(&mut self, ticket: LoadTicket, view: F) -> StoreResult<R>
    where
        F: FnOnce(&Document) -> R,
    {
        let shared = &self.shared;
        let document = shared
            .loader
            .ensure_loaded(&mut self.slot, ticket, &self.file, &shared.metrics)
            .await?;
        Ok(view(document))
    }

    async fn write<R, F>(&mut self, ticket: LoadTicket, mutation: F) -> StoreResult<R>
    where
        F: FnOnce(&Document) -> Mutation<R>,
    {
        let shared = Arc::clone(&self.shared);
        let metrics = &shared.metrics;
        let current = shared
            .loader
            .ensure_loaded(&mut self.slot, ticket, &self.file, metrics)
            .await?;

        let (next, output) = match mutation(current) {
            Mutation::Commit { next, output } => (next, output),
            Mutation::Unchanged(output) => {
                metrics.increment_writes_skipped();
                return Ok(output);
            }
        };

        let keys = next.len().to_string();
        let (previous, installed) = self.slot.install(next);
        let written = self.file.write_document(installed).await;
        let path = shared.path.display().to_string();

        match written {
            Ok(()) => {
                metrics.increment_writes_committed();
                log_event_with_fields(
                    Event::WriteCommitted,
                    &[("path", path.as_str()), ("keys", keys.as_str())],
                );
                Ok(output)
            }
            Err(error) => {
                metrics.increment_writes_failed();
                log_event_with_fields(
                    Event::WriteFailed,
                    &[("path", path.as_str()), ("code", error.code())],
                );
                if self.policy == WriteFailurePolicy::Rollback {
                    self.slot.restore(previous);
                    metrics.increment_rollbacks();
                    log_event_with_fields(Event::CacheRolledBack, &[("path", path.as_str())]);
                }
                Err(error)
            }
        }
    }
}
