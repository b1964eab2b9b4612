use crate::database::ListQuery;
use sqlx::{Pool, QueryBuilder, Sqlite};

mod blocks;
mod pages;
mod snapshots;

/// Page, block and snapshot store backed by one SQLite pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

// ORDER BY the validated sort fields, rowid last for a stable order, then the window
fn push_sort_and_window<C>(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery<C>) {
    builder.push(" ORDER BY ");
    for (field, direction) in &query.sort {
        builder.push(*field).push(" ").push(direction.as_sql()).push(", ");
    }
    builder.push("rowid");

    builder
        .push(" LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);
}
