//! Shared library state
//!
//! The catalog, the pending-request queue and the shutdown flag sit behind a
//! single lock, so loans, queue traffic, return/renew processing and reports
//! never interleave. Two notifiers gate the queue: `not_full` wakes blocked
//! producers, `not_empty` wakes blocked consumers (and is broadcast on
//! shutdown). A producer already waiting for room when shutdown arrives
//! still gets its entry in; the consumer keeps draining until it has.

use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard, Notify};

use crate::{
    error::{AppError, AppResult},
    models::{DueDate, Receipt, Request},
    queue::RequestQueue,
    repository::{Catalog, ReportLine},
    services::loans,
};

struct LibraryState {
    catalog: Catalog,
    pending: RequestQueue<Request>,
    shutdown: bool,
}

pub struct Library {
    state: Mutex<LibraryState>,
    not_full: Notify,
    not_empty: Notify,
    blocked_pushes: AtomicUsize,
    shutdown_tx: watch::Sender<bool>,
}

/// Marks a producer waiting for room; the consumer will not hand out the
/// quit sentinel while any are alive.
struct BlockedPush<'a> {
    library: &'a Library,
}

impl<'a> BlockedPush<'a> {
    fn new(library: &'a Library) -> Self {
        library.blocked_pushes.fetch_add(1, Ordering::SeqCst);
        Self { library }
    }
}

impl Drop for BlockedPush<'_> {
    fn drop(&mut self) {
        self.library.blocked_pushes.fetch_sub(1, Ordering::SeqCst);
        self.library.not_empty.notify_one();
    }
}

impl Library {
    pub fn new(catalog: Catalog, capacity: usize) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        let pending = RequestQueue::with_capacity(capacity);

        tracing::debug!(
            books = catalog.len(),
            capacity = pending.capacity(),
            "Library initialized"
        );

        Arc::new(Self {
            state: Mutex::new(LibraryState {
                catalog,
                pending,
                shutdown: false,
            }),
            not_full: Notify::new(),
            not_empty: Notify::new(),
            blocked_pushes: AtomicUsize::new(0),
            shutdown_tx,
        })
    }

    /// Queue a return or renewal, waiting while the queue is full.
    ///
    /// Fails with [`AppError::ShuttingDown`] if shutdown was requested
    /// before the call. A push that is already waiting for room when
    /// shutdown arrives still completes.
    pub async fn push(&self, request: Request) -> AppResult<()> {
        let mut request = request;
        let mut blocked = None;
        loop {
            let mut state = self.state.lock().await;
            if state.shutdown && blocked.is_none() {
                return Err(AppError::ShuttingDown);
            }
            match state.pending.try_push(request) {
                Ok(()) => {
                    drop(state);
                    self.not_empty.notify_one();
                    drop(blocked);
                    return Ok(());
                }
                Err(back) => {
                    request = back;
                    if blocked.is_none() {
                        blocked = Some(BlockedPush::new(self));
                    }
                    Self::wait(&self.not_full, state).await;
                }
            }
        }
    }

    /// Take the newest pending request, waiting while the queue is empty.
    ///
    /// Once shutdown is requested, the queue is drained and no producer is
    /// still waiting for room, this returns the quit sentinel immediately.
    pub async fn pop(&self) -> Request {
        loop {
            let mut state = self.state.lock().await;
            if let Some(request) = state.pending.pop() {
                drop(state);
                self.not_full.notify_one();
                return request;
            }
            if state.shutdown && self.blocked_pushes.load(Ordering::SeqCst) == 0 {
                return Request::quit_sentinel();
            }
            Self::wait(&self.not_empty, state).await;
        }
    }

    /// Raise the shutdown flag and wake every waiter.
    ///
    /// Returns `true` only for the call that actually raised it.
    pub async fn request_shutdown(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.shutdown {
            return false;
        }
        state.shutdown = true;
        drop(state);

        self.shutdown_tx.send_replace(true);
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
        tracing::info!("Shutdown requested");
        true
    }

    pub async fn is_shutting_down(&self) -> bool {
        self.state.lock().await.shutdown
    }

    /// Receiver that flips to `true` when shutdown is requested
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Execute a loan against the catalog, due one term from today
    pub async fn lend(&self, request: &Request) -> AppResult<Receipt> {
        self.lend_on(request, DueDate::today()).await
    }

    pub async fn lend_on(&self, request: &Request, today: DueDate) -> AppResult<Receipt> {
        let mut state = self.state.lock().await;
        loans::lend(&mut state.catalog, &request.book, request.isbn, today)
    }

    /// Apply a dequeued return or renewal to the catalog
    pub async fn settle(&self, request: &Request) -> AppResult<Receipt> {
        let mut state = self.state.lock().await;
        loans::apply(&mut state.catalog, request, DueDate::today())
    }

    pub async fn report(&self) -> Vec<ReportLine> {
        self.state.lock().await.catalog.report()
    }

    /// Copy of the current catalog, for saving
    pub async fn snapshot(&self) -> Catalog {
        self.state.lock().await.catalog.clone()
    }

    /// Release the lock and sleep until `notify` fires.
    ///
    /// The waiter is registered before the guard is dropped so a
    /// notification sent in between is not lost.
    async fn wait(notify: &Notify, guard: MutexGuard<'_, LibraryState>) {
        let mut notified = pin!(notify.notified());
        notified.as_mut().enable();
        drop(guard);
        notified.await;
    }
}
