//! Cache-aside reads over a [`Table`].
//!
//! Each read builds a canonical key from the table, the operation and its
//! parameters, then runs the plain [`Table`] call as the fetch closure. A
//! connection is only checked out of the pool when the cache cannot answer.
//! Writes never touch the cache, so cached reads may be stale for up to the
//! TTL.

use std::future::Future;
use std::time::Duration;

use diary_cache::{Cache, CacheKeys, CacheStatus, Fetched, get_or_set};
use diary_db::{DbResult, Filter, MySqlPool, Page, PageRequest, Sort, Table};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::FromRow;
use sqlx::mysql::MySqlRow;
use tracing::warn;

use crate::metrics::track_cache_lookup;
use crate::state::AppState;

/// Everything that shapes a read's result. Serialized into the cache key.
#[derive(Debug, Serialize)]
struct QueryParams<'a> {
    filter: Filter,
    #[serde(skip_serializing_if = "no_columns")]
    select: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<PageRequest>,
}

fn no_columns(select: &&[&str]) -> bool {
    select.is_empty()
}

impl<'a> QueryParams<'a> {
    fn new(filter: &Filter, select: &'a [&'a str]) -> Self {
        Self {
            filter: filter.canonical(),
            select,
            sort: None,
            page: None,
        }
    }

    fn sorted(mut self, sort: Option<&'a Sort>) -> Self {
        self.sort = sort.filter(|s| !s.is_empty());
        self
    }

    fn paged(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }
}

pub struct CachedTable<'a> {
    table: &'a Table,
    pool: &'a MySqlPool,
    cache: Option<&'a Cache>,
    keys: &'a CacheKeys,
    ttl: Duration,
}

impl<'a> CachedTable<'a> {
    pub fn new(
        table: &'a Table,
        pool: &'a MySqlPool,
        cache: Option<&'a Cache>,
        keys: &'a CacheKeys,
        ttl: Duration,
    ) -> Self {
        Self {
            table,
            pool,
            cache,
            keys,
            ttl,
        }
    }

    pub fn from_state(table: &'a Table, state: &'a AppState) -> Self {
        Self::new(
            table,
            &state.db,
            state.cache.as_ref(),
            &state.cache_keys,
            state.cache_ttl,
        )
    }

    async fn read<T, F, Fut>(
        &self,
        operation: &str,
        params: &QueryParams<'_>,
        fetch: F,
    ) -> DbResult<Fetched<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DbResult<Option<T>>>,
    {
        let table = self.table.name();

        let Some(cache) = self.cache else {
            let fetched = Fetched::bypass(fetch().await?);
            track_cache_lookup(table, operation, fetched.status);
            return Ok(fetched);
        };

        let key = match self.keys.table_query(table, operation, params) {
            Ok(key) => key,
            Err(e) => {
                warn!(db.table = %table, error = %e, "Could not build cache key");
                let fetched = Fetched::bypass(fetch().await?);
                track_cache_lookup(table, operation, fetched.status);
                return Ok(fetched);
            }
        };

        let fetched = get_or_set(cache, &key, self.ttl, fetch).await?;
        track_cache_lookup(table, operation, fetched.status);
        Ok(fetched)
    }

    pub async fn find_one<T>(&self, filter: &Filter, select: &[&str]) -> DbResult<Fetched<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Serialize + DeserializeOwned + Send + Unpin,
    {
        let params = QueryParams::new(filter, select);
        self.read("find_one", &params, move || async move {
            let mut conn = self.pool.acquire().await?;
            self.table.find_one(&mut conn, filter, select).await
        })
        .await
    }

    pub async fn find_many<T>(
        &self,
        filter: &Filter,
        select: &[&str],
        sort: Option<&Sort>,
    ) -> DbResult<Fetched<Vec<T>>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Serialize + DeserializeOwned + Send + Unpin,
    {
        let params = QueryParams::new(filter, select).sorted(sort);
        self.read("find_many", &params, move || async move {
            let mut conn = self.pool.acquire().await?;
            self.table
                .find_many(&mut conn, filter, select, sort)
                .await
                .map(Some)
        })
        .await
    }

    /// `value` is `None` when the table is empty.
    pub async fn all<T>(&self, select: &[&str], sort: Option<&Sort>) -> DbResult<Fetched<Vec<T>>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Serialize + DeserializeOwned + Send + Unpin,
    {
        let params = QueryParams::new(&Filter::new(), select).sorted(sort);
        self.read("all", &params, move || async move {
            let mut conn = self.pool.acquire().await?;
            self.table.all(&mut conn, select, sort).await
        })
        .await
    }

    pub async fn count(&self, filter: &Filter) -> DbResult<Fetched<i64>> {
        let params = QueryParams::new(filter, &[]);
        self.read("count", &params, move || async move {
            let mut conn = self.pool.acquire().await?;
            self.table.count(&mut conn, filter).await.map(Some)
        })
        .await
    }

    pub async fn find_page<T>(
        &self,
        filter: &Filter,
        select: &[&str],
        request: PageRequest,
        sort: Option<&Sort>,
    ) -> DbResult<Fetched<Page<T>>>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Serialize + DeserializeOwned + Send + Unpin,
    {
        let params = QueryParams::new(filter, select).sorted(sort).paged(request);
        self.read("find_page", &params, move || async move {
            let mut conn = self.pool.acquire().await?;
            self.table
                .find_page(&mut conn, filter, select, request, sort)
                .await
                .map(Some)
        })
        .await
    }
}

/// Label for the `x-cache` response header.
pub fn cache_header(status: CacheStatus) -> [(&'static str, &'static str); 1] {
    [("x-cache", status.as_str())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use diary_db::SortKey;

    #[test]
    fn test_params_ignore_condition_order() {
        let a = Filter::new().like("title", "rain").eq("id", 1);
        let b = Filter::new().eq("id", 1).like("title", "rain");

        let ka = CacheKeys::new("test", "diary")
            .table_query("diaries", "find_one", &QueryParams::new(&a, &[]))
            .unwrap();
        let kb = CacheKeys::new("test", "diary")
            .table_query("diaries", "find_one", &QueryParams::new(&b, &[]))
            .unwrap();
        assert_eq!(ka, kb);
    }

    #[test]
    fn test_params_distinguish_pages_and_sorts() {
        let keys = CacheKeys::new("test", "diary");
        let filter = Filter::new();
        let sort = Sort::keys([SortKey::desc("created_at")]);

        let page1 = QueryParams::new(&filter, &[]).paged(PageRequest::new(1, 10));
        let page2 = QueryParams::new(&filter, &[]).paged(PageRequest::new(2, 10));
        let sorted = QueryParams::new(&filter, &[])
            .sorted(Some(&sort))
            .paged(PageRequest::new(1, 10));

        let k1 = keys.table_query("diaries", "find_page", &page1).unwrap();
        let k2 = keys.table_query("diaries", "find_page", &page2).unwrap();
        let k3 = keys.table_query("diaries", "find_page", &sorted).unwrap();
        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
    }

    #[test]
    fn test_empty_sort_is_omitted_from_key() {
        let keys = CacheKeys::new("test", "diary");
        let filter = Filter::new();
        let empty = Sort::Keys(vec![]);

        let a = QueryParams::new(&filter, &[]).sorted(Some(&empty));
        let b = QueryParams::new(&filter, &[]).sorted(None);
        assert_eq!(
            keys.table_query("diaries", "find_many", &a).unwrap(),
            keys.table_query("diaries", "find_many", &b).unwrap()
        );
    }

    #[test]
    fn test_cache_header() {
        assert_eq!(cache_header(CacheStatus::Hit), [("x-cache", "HIT")]);
    }
}
