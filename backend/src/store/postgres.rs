use diesel::dsl::now;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use shared::Item;
use std::time::Duration;
use uuid::Uuid;

use super::{Deadline, ItemChanges, ItemPage, ItemStore, PageRequest, StoreError, StoreResult};
use crate::db::DbPool;
use crate::models::{ItemChangeset, ItemRow, NewItemRow};
use crate::schema::items;

/// [`ItemStore`] backed by PostgreSQL through a diesel r2d2 pool.
#[derive(Clone)]
pub struct PgItemStore {
    pool: DbPool,
    statement_timeout: Duration,
}

impl PgItemStore {
    /// `statement_timeout` caps every statement, however much of the
    /// caller's deadline is left.
    pub fn new(pool: DbPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Runs `op` in a transaction bounded by `deadline`.
    ///
    /// Checkout waits no longer than the budget left, and the transaction's
    /// `statement_timeout` is lowered to match, so the server aborts a blocked
    /// statement once the caller's time is up. If the budget ran out or the
    /// caller gave up while `op` ran, the transaction rolls back.
    fn with_deadline<T>(
        &self,
        deadline: &Deadline,
        op: impl FnOnce(&mut PgConnection) -> QueryResult<T>,
    ) -> StoreResult<T> {
        self.transaction(deadline, op)
            .map_err(|err| deadline.classify(err))
    }

    fn transaction<T>(
        &self,
        deadline: &Deadline,
        op: impl FnOnce(&mut PgConnection) -> QueryResult<T>,
    ) -> StoreResult<T> {
        let checkout = deadline.remaining()?.min(self.pool.connection_timeout());
        let mut pooled = self.pool.get_timeout(checkout)?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, StoreError, _>(|conn| {
            let budget = deadline.remaining()?.min(self.statement_timeout);
            // Round up so the server never fires before the deadline has passed.
            let millis = budget.as_millis().saturating_add(1);
            diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}")).execute(conn)?;

            let value = op(conn)?;
            deadline.remaining()?;
            Ok(value)
        })
    }
}

impl ItemStore for PgItemStore {
    fn create(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: &Deadline,
    ) -> StoreResult<Item> {
        let row = self.with_deadline(deadline, |conn| {
            diesel::insert_into(items::table)
                .values(&NewItemRow { name, description })
                .returning(ItemRow::as_returning())
                .get_result(conn)
        })?;
        Ok(row.into())
    }

    fn list(&self, request: PageRequest, deadline: &Deadline) -> StoreResult<ItemPage> {
        let page = request.clamp();
        let (total, rows) = self.with_deadline(deadline, |conn| {
            let total = items::table.count().get_result::<i64>(conn)?;
            let rows = items::table
                .select(ItemRow::as_select())
                .order((items::created_at.desc(), items::id.desc()))
                .limit(page.limit)
                .offset(page.offset)
                .load(conn)?;
            Ok((total, rows))
        })?;

        Ok(ItemPage {
            items: rows.into_iter().map(Item::from).collect(),
            total,
            page,
        })
    }

    fn get(&self, id: Uuid, deadline: &Deadline) -> StoreResult<Item> {
        let row = self.with_deadline(deadline, |conn| {
            items::table
                .find(id)
                .select(ItemRow::as_select())
                .first(conn)
        })?;
        Ok(row.into())
    }

    fn update(
        &self,
        id: Uuid,
        changes: &ItemChanges,
        deadline: &Deadline,
    ) -> StoreResult<Item> {
        let changeset = ItemChangeset {
            name: changes.name.as_deref(),
            description: changes.description.as_ref().map(|d| d.as_deref()),
        };
        // One statement, so the refreshed timestamp and the new fields land together.
        let row = self.with_deadline(deadline, |conn| {
            diesel::update(items::table.find(id))
                .set((changeset, items::updated_at.eq(now)))
                .returning(ItemRow::as_returning())
                .get_result(conn)
        })?;
        Ok(row.into())
    }

    fn delete(&self, id: Uuid, deadline: &Deadline) -> StoreResult<Item> {
        let row = self.with_deadline(deadline, |conn| {
            diesel::delete(items::table.find(id))
                .returning(ItemRow::as_returning())
                .get_result(conn)
        })?;
        Ok(row.into())
    }
}
