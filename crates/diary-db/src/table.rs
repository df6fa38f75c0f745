//! Table-bound data access.
//!
//! A [`Table`] binds one table name, its primary key and its default sort
//! column. Every operation takes a caller-owned `&mut MySqlConnection`
//! (a `PoolConnection` or a `Transaction` both deref to one) and never closes
//! it.

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlConnection};
use tracing::{debug, error, instrument};

use crate::error::{DbError, DbResult};
use crate::filter::{Filter, Predicate};
use crate::query::{self, Limit, Statement, compile_order_by};
use crate::record::Record;
use crate::sort::Sort;

/// Page number and size for [`Table::find_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Rejects `page < 1`, `page_size < 1` and offsets past `i64::MAX`
    /// instead of producing a negative or wrapped offset.
    fn limit(&self) -> DbResult<Limit> {
        if self.page < 1 {
            return Err(DbError::validation(format!(
                "page must be at least 1, got {}",
                self.page
            )));
        }
        if self.page_size < 1 {
            return Err(DbError::validation(format!(
                "page_size must be at least 1, got {}",
                self.page_size
            )));
        }

        let offset = (self.page - 1).checked_mul(self.page_size).ok_or_else(|| {
            DbError::validation(format!(
                "page {} with page_size {} is out of range",
                self.page, self.page_size
            ))
        })?;

        Ok(Limit {
            count: self.page_size as u64,
            offset: offset as u64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            page: 1,
            page_size: 0,
            total_count: 0,
            total_pages: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
        if total_count <= 0 || page_size <= 0 {
            0
        } else {
            (total_count + page_size - 1) / page_size
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    primary_key: String,
    default_sort: String,
}

impl Table {
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        let primary_key = primary_key.into();
        Self {
            name: name.into(),
            default_sort: primary_key.clone(),
            primary_key,
        }
    }

    #[must_use]
    pub fn with_default_sort(mut self, column: impl Into<String>) -> Self {
        self.default_sort = column.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn default_sort(&self) -> &str {
        &self.default_sort
    }

    fn order_by(&self, sort: Option<&Sort>) -> String {
        compile_order_by(sort, &self.default_sort)
    }

    fn log_failure(&self, operation: &str, statement: &Statement, err: &sqlx::Error) {
        error!(
            db.table = %self.name,
            db.operation = operation,
            db.statement = %statement.sql,
            error = %err,
            "Statement failed"
        );
    }

    async fn fetch_all<T>(
        &self,
        conn: &mut MySqlConnection,
        statement: &Statement,
    ) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        debug!(db.statement = %statement.sql, db.params = statement.values.len(), "Executing");
        sqlx::query_as_with::<_, T, _>(&statement.sql, statement.arguments()?)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                self.log_failure("SELECT", statement, &e);
                DbError::from(e)
            })
    }

    async fn fetch_count(&self, conn: &mut MySqlConnection, statement: &Statement) -> DbResult<i64> {
        debug!(db.statement = %statement.sql, db.params = statement.values.len(), "Executing");
        sqlx::query_scalar_with::<_, i64, _>(&statement.sql, statement.arguments()?)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                self.log_failure("COUNT", statement, &e);
                DbError::from(e)
            })
    }

    async fn execute(
        &self,
        conn: &mut MySqlConnection,
        operation: &str,
        statement: &Statement,
    ) -> DbResult<sqlx::mysql::MySqlQueryResult> {
        debug!(db.statement = %statement.sql, db.params = statement.values.len(), "Executing");
        sqlx::query_with(&statement.sql, statement.arguments()?)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                self.log_failure(operation, statement, &e);
                DbError::from(e)
            })
    }

    /// Every row, or `None` when the table is empty.
    #[instrument(skip(self, conn), fields(db.table = %self.name, db.operation = "SELECT"))]
    pub async fn all<T>(
        &self,
        conn: &mut MySqlConnection,
        select: &[&str],
        sort: Option<&Sort>,
    ) -> DbResult<Option<Vec<T>>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let statement = query::select(
            &self.name,
            select,
            &Filter::new(),
            &self.order_by(sort),
            None,
        );
        let rows = self.fetch_all(conn, &statement).await?;
        Ok((!rows.is_empty()).then_some(rows))
    }

    /// First matching row, or `None`.
    #[instrument(skip(self, conn), fields(db.table = %self.name, db.operation = "SELECT"))]
    pub async fn find_one<T>(
        &self,
        conn: &mut MySqlConnection,
        filter: &Filter,
        select: &[&str],
    ) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let statement = query::select(&self.name, select, filter, "", Some(Limit::first()));
        let rows = self.fetch_all::<T>(conn, &statement).await?;
        Ok(rows.into_iter().next())
    }

    /// Every matching row. An empty filter returns the whole table.
    #[instrument(skip(self, conn), fields(db.table = %self.name, db.operation = "SELECT"))]
    pub async fn find_many<T>(
        &self,
        conn: &mut MySqlConnection,
        filter: &Filter,
        select: &[&str],
        sort: Option<&Sort>,
    ) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let statement = query::select(&self.name, select, filter, &self.order_by(sort), None);
        self.fetch_all(conn, &statement).await
    }

    #[instrument(skip(self, conn), fields(db.table = %self.name, db.operation = "COUNT"))]
    pub async fn count(&self, conn: &mut MySqlConnection, filter: &Filter) -> DbResult<i64> {
        let statement = query::count(&self.name, filter);
        self.fetch_count(conn, &statement).await
    }

    /// One page of matching rows plus the total count.
    ///
    /// Runs two statements on the same connection. They observe one snapshot
    /// only if the caller runs them inside a transaction.
    #[instrument(skip(self, conn), fields(db.table = %self.name, db.operation = "SELECT"))]
    pub async fn find_page<T>(
        &self,
        conn: &mut MySqlConnection,
        filter: &Filter,
        select: &[&str],
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> DbResult<Page<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let limit = request.limit()?;
        let statement = query::select(
            &self.name,
            select,
            filter,
            &self.order_by(sort),
            Some(limit),
        );
        let rows = self.fetch_all(conn, &statement).await?;
        let total_count = self.count(conn, filter).await?;

        Ok(Page {
            rows,
            page: request.page,
            page_size: request.page_size,
            total_count,
            total_pages: Page::<T>::total_pages(total_count, request.page_size),
        })
    }

    /// Inserts one row and returns its generated key, or `None` when the
    /// server reports no affected row.
    #[instrument(skip(self, conn, record), fields(db.table = %self.name, db.operation = "INSERT"))]
    pub async fn insert(
        &self,
        conn: &mut MySqlConnection,
        record: &Record,
    ) -> DbResult<Option<u64>> {
        record.ensure_not_empty()?;

        let statement = query::insert(&self.name, record);
        let result = self.execute(conn, "INSERT", &statement).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        debug!(db.insert_id = result.last_insert_id(), "Row inserted");
        Ok(Some(result.last_insert_id()))
    }

    /// True iff at least one row changed.
    #[instrument(skip(self, conn, predicate, record), fields(db.table = %self.name, db.operation = "UPDATE"))]
    pub async fn update_by_filter(
        &self,
        conn: &mut MySqlConnection,
        predicate: &Predicate,
        record: &Record,
    ) -> DbResult<bool> {
        record.ensure_not_empty()?;
        predicate.ensure_usable()?;

        let statement = query::update(&self.name, predicate, record);
        let result = self.execute(conn, "UPDATE", &statement).await?;
        Ok(result.rows_affected() > 0)
    }

    /// True iff at least one row was removed.
    #[instrument(skip(self, conn, predicate), fields(db.table = %self.name, db.operation = "DELETE"))]
    pub async fn delete_by_filter(
        &self,
        conn: &mut MySqlConnection,
        predicate: &Predicate,
    ) -> DbResult<bool> {
        predicate.ensure_usable()?;

        let statement = query::delete(&self.name, predicate);
        let result = self.execute(conn, "DELETE", &statement).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert-or-update keyed by a unique index.
    ///
    /// `filter` must name a primary or unique key; this is not checked. MySQL
    /// reports 0 affected rows when the existing row already holds the same
    /// values, so `false` can also mean "nothing to change".
    #[instrument(skip(self, conn, filter, record), fields(db.table = %self.name, db.operation = "UPSERT"))]
    pub async fn upsert(
        &self,
        conn: &mut MySqlConnection,
        filter: &Filter,
        record: &Record,
    ) -> DbResult<bool> {
        record.ensure_not_empty()?;

        let statement = query::upsert(&self.name, filter, record);
        let result = self.execute(conn, "UPSERT", &statement).await?;
        Ok(result.rows_affected() > 0)
    }
}
