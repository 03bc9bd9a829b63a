use chrono::{DateTime, Duration, Utc};
use shared::Item;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Deadline, ItemChanges, ItemPage, ItemStore, PageRequest, StoreError, StoreResult};

/// Process-local [`ItemStore`] used in dev mode and tests.
///
/// Follows the same ordering, paging and merge rules as the PostgreSQL store.
/// Timestamps are kept monotonic so an update always moves `updated_at`
/// forward even when the wall clock has not ticked.
#[derive(Default)]
pub struct MemoryItemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    // Insertion order; newest last.
    items: Vec<Item>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn position(&self, id: Uuid) -> StoreResult<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::NotFound)
    }
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ItemStore for MemoryItemStore {
    fn create(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: &Deadline,
    ) -> StoreResult<Item> {
        let mut inner = self.lock();
        deadline.remaining()?;
        let stamp = inner.next_stamp();
        let item = Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: stamp,
            updated_at: stamp,
        };
        inner.items.push(item.clone());
        Ok(item)
    }

    fn list(&self, request: PageRequest, deadline: &Deadline) -> StoreResult<ItemPage> {
        let page = request.clamp();
        let inner = self.lock();
        deadline.remaining()?;

        let mut sorted: Vec<&Item> = inner.items.iter().collect();
        sorted.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let items = sorted
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(ItemPage {
            items,
            total: inner.items.len() as i64,
            page,
        })
    }

    fn get(&self, id: Uuid, deadline: &Deadline) -> StoreResult<Item> {
        let inner = self.lock();
        deadline.remaining()?;
        let pos = inner.position(id)?;
        Ok(inner.items[pos].clone())
    }

    fn update(
        &self,
        id: Uuid,
        changes: &ItemChanges,
        deadline: &Deadline,
    ) -> StoreResult<Item> {
        let mut inner = self.lock();
        deadline.remaining()?;
        let pos = inner.position(id)?;
        let stamp = inner.next_stamp();

        let item = &mut inner.items[pos];
        if let Some(name) = &changes.name {
            item.name = name.clone();
        }
        if let Some(description) = &changes.description {
            item.description = description.clone();
        }
        item.updated_at = stamp;
        Ok(item.clone())
    }

    fn delete(&self, id: Uuid, deadline: &Deadline) -> StoreResult<Item> {
        let mut inner = self.lock();
        deadline.remaining()?;
        let pos = inner.position(id)?;
        Ok(inner.items.remove(pos))
    }
}
