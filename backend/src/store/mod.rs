//! Persistence gateway for items.
//!
//! Every read and write of the `items` table goes through an [`ItemStore`].
//! Each operation is a single store round trip: it either fully succeeds or
//! returns a [`StoreError`] without side effects. Implementations are
//! synchronous; async callers run them on the blocking pool and hand each
//! call the [`Deadline`] of the request that issued it.

mod memory;
mod postgres;

pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;

use shared::Item;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matches the requested id.
    #[error("item not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[source] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// The caller's time budget ran out before the operation finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The caller stopped waiting for the result.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// Time budget and cancellation signal for store operations, carried over
/// from the request that issued them.
///
/// Clones share the cancellation flag, so the request side can give up on an
/// operation that is already running on another thread. An operation that
/// finds the deadline spent or cancelled must not leave side effects.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Time left, or the reason there is none.
    pub fn remaining(&self) -> StoreResult<Duration> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(StoreError::Cancelled);
        }
        let Some(at) = self.at else {
            return Ok(Duration::MAX);
        };
        let left = at.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(StoreError::DeadlineExceeded);
        }
        Ok(left)
    }

    /// Blames a storage failure on the deadline when the budget ran out while
    /// it was in flight: a statement aborted by `statement_timeout` or a pool
    /// checkout that gave up.
    pub fn classify(&self, err: StoreError) -> StoreError {
        match err {
            StoreError::Database(_) | StoreError::Pool(_) => match self.remaining() {
                Err(expired) => expired,
                Ok(_) => err,
            },
            other => other,
        }
    }
}

/// Pagination as supplied by the caller, before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// Pagination window actually applied to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(0),
            offset: offset.unwrap_or(0),
        }
    }

    /// Non-positive limits fall back to [`DEFAULT_PAGE_SIZE`], large ones are
    /// capped at [`MAX_PAGE_SIZE`], negative offsets become zero.
    pub fn clamp(self) -> Page {
        let limit = if self.limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.min(MAX_PAGE_SIZE)
        };
        Page {
            limit,
            offset: self.offset.max(0),
        }
    }
}

/// One window of items, newest first, plus the size of the whole table.
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: i64,
    pub page: Page,
}

/// Field-level changes for an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl From<shared::UpdateItemRequest> for ItemChanges {
    fn from(req: shared::UpdateItemRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// Every operation gives up with [`StoreError::DeadlineExceeded`] or
/// [`StoreError::Cancelled`], and without side effects, once its
/// [`Deadline`] is spent.
pub trait ItemStore: Send + Sync {
    /// Inserts a new item and returns the row as the store persisted it.
    fn create(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: &Deadline,
    ) -> StoreResult<Item>;

    /// Returns a clamped window of items ordered by `created_at` descending
    /// (ties broken by `id` descending) and the total row count.
    fn list(&self, request: PageRequest, deadline: &Deadline) -> StoreResult<ItemPage>;

    fn get(&self, id: Uuid, deadline: &Deadline) -> StoreResult<Item>;

    /// Applies `changes` field by field and refreshes `updated_at`, even when
    /// nothing else changes.
    fn update(&self, id: Uuid, changes: &ItemChanges, deadline: &Deadline)
        -> StoreResult<Item>;

    /// Removes the item and returns its last state.
    fn delete(&self, id: Uuid, deadline: &Deadline) -> StoreResult<Item>;
}
