//! Request deduplication and caching of query results.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tokio::sync::OnceCell;

/// What a query loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Cities,
    City,
    CitiesByIds,
    PointsByCity,
    Point,
    PointsByIds,
    PointsByRoute,
    PointsByEvent,
    RoutesByCity,
    Route,
    RoutesByIds,
    RoutesByPoint,
    RoutesByEvent,
    Events,
    EventsByCity,
    Event,
    EventsByIds,
    EventsByPoint,
    EventsByRoute,
    Search,
    Languages,
}

/// Identifies a query by its kind and its argument, e.g. an id or a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    pub arg: Option<String>,
}

impl QueryKey {
    pub const fn all(kind: QueryKind) -> Self {
        Self { kind, arg: None }
    }

    pub fn with(kind: QueryKind, arg: impl Into<String>) -> Self {
        Self {
            kind,
            arg: Some(arg.into()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{:?}({arg})", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

struct Entry<T> {
    cell: OnceCell<(Instant, Arc<T>)>,
}

impl<T> Entry<T> {
    fn is_stale(&self, ttl: Option<Duration>) -> bool {
        match (self.cell.get(), ttl) {
            (Some((loaded_at, _)), Some(ttl)) => loaded_at.elapsed() >= ttl,
            _ => false,
        }
    }
}

/// Cache of query results of a single type.
///
/// Concurrent requests with the same key share one in-flight
/// fetch and one result. Results are kept until they are
/// invalidated or, if a time to live is set, until they are stale.
pub struct QueryCache<T> {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<QueryKey, Arc<Entry<T>>>>,
}

impl<T> fmt::Debug for QueryCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> QueryCache<T> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached result or run `fetch` to create it.
    pub async fn get_or_fetch<F>(&self, key: &QueryKey, fetch: F) -> Arc<T>
    where
        F: Future<Output = T>,
    {
        let entry = {
            let mut entries = self.entries.lock();
            if entries.get(key).is_some_and(|e| e.is_stale(self.ttl)) {
                log::debug!("Discarding stale result of {key}");
                entries.remove(key);
            }
            Arc::clone(entries.entry(key.clone()).or_insert_with(|| {
                Arc::new(Entry {
                    cell: OnceCell::new(),
                })
            }))
        };
        let (_, value) = entry
            .cell
            .get_or_init(|| async {
                log::debug!("Fetching {key}");
                (Instant::now(), Arc::new(fetch.await))
            })
            .await;
        Arc::clone(value)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|e| e.cell.initialized() && !e.is_stale(self.ttl))
    }

    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
