use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::queue_errors::Result;
use super::skip_model::{SkipListEntry, SkipListEntryDB};
use crate::db::get_connection;
use crate::schema::skip_list;

pub trait SkipListRepositoryTrait: Send + Sync {
    fn upsert(&self, entry: SkipListEntry) -> Result<SkipListEntry>;
    fn get(&self, entity_key: &str) -> Result<Option<SkipListEntry>>;
    fn delete(&self, entity_key: &str) -> Result<()>;
    fn all(&self) -> Result<Vec<SkipListEntry>>;
}

pub struct SkipListRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl SkipListRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl SkipListRepositoryTrait for SkipListRepository {
    fn upsert(&self, entry: SkipListEntry) -> Result<SkipListEntry> {
        let mut conn = get_connection(&self.pool)?;
        let db_entry = SkipListEntryDB::from(entry);

        diesel::replace_into(skip_list::table)
            .values(&db_entry)
            .execute(&mut conn)?;

        Ok(db_entry.into())
    }

    fn get(&self, entity_key: &str) -> Result<Option<SkipListEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let row = skip_list::table
            .find(entity_key)
            .first::<SkipListEntryDB>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn delete(&self, entity_key: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(skip_list::table.find(entity_key)).execute(&mut conn)?;

        Ok(())
    }

    fn all(&self) -> Result<Vec<SkipListEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = skip_list::table
            .order(skip_list::last_failed_at.desc())
            .load::<SkipListEntryDB>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
