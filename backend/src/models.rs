use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::items;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. `id` and both timestamps come from column defaults.
#[derive(Debug, Insertable)]
#[diesel(table_name = items)]
pub struct NewItemRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

/// Partial update. A `None` field is left out of the `SET` clause;
/// `description: Some(None)` writes NULL.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = items)]
pub struct ItemChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
}

impl From<ItemRow> for shared::Item {
    fn from(row: ItemRow) -> Self {
        shared::Item {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
