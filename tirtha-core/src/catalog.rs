use std::{collections::HashSet, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    cache::{QueryCache, QueryKey, QueryKind},
    diagnostics::DiagnosticsSink,
    entities::*,
    repositories::Backend,
    usecases::{self, LanguageName, SearchResults},
};

/// Cached read access to all entities.
///
/// Every query records its key so that all results of a page
/// can be invalidated when the user navigates away.
pub struct Catalog {
    db: Arc<dyn Backend>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    touched: Mutex<HashSet<QueryKey>>,
    city: QueryCache<Option<City>>,
    cities: QueryCache<Vec<City>>,
    point: QueryCache<Option<Point>>,
    points: QueryCache<Vec<Point>>,
    route: QueryCache<Option<Route>>,
    routes: QueryCache<Vec<Route>>,
    event: QueryCache<Option<Event>>,
    events: QueryCache<Vec<Event>>,
    search: QueryCache<SearchResults>,
    languages: QueryCache<Vec<LanguageName>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("touched", &self.touched.lock().len())
            .finish_non_exhaustive()
    }
}

fn ids_arg(ids: &[Id]) -> String {
    ids.iter().map(Id::as_str).collect::<Vec<_>>().join(",")
}

impl Catalog {
    pub fn new(
        db: Arc<dyn Backend>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            db,
            diagnostics,
            touched: Mutex::new(HashSet::new()),
            city: QueryCache::new(ttl),
            cities: QueryCache::new(ttl),
            point: QueryCache::new(ttl),
            points: QueryCache::new(ttl),
            route: QueryCache::new(ttl),
            routes: QueryCache::new(ttl),
            event: QueryCache::new(ttl),
            events: QueryCache::new(ttl),
            search: QueryCache::new(ttl),
            languages: QueryCache::new(ttl),
        }
    }

    fn db(&self) -> &dyn Backend {
        &*self.db
    }

    fn sink(&self) -> &dyn DiagnosticsSink {
        &*self.diagnostics
    }

    fn touch(&self, key: QueryKind, arg: Option<&str>) -> QueryKey {
        let key = match arg {
            Some(arg) => QueryKey::with(key, arg),
            None => QueryKey::all(key),
        };
        self.touched.lock().insert(key.clone());
        key
    }

    pub async fn cities(&self) -> Arc<Vec<City>> {
        let key = self.touch(QueryKind::Cities, None);
        let fetch = usecases::fetch_cities(self.db(), self.sink());
        self.cities.get_or_fetch(&key, fetch).await
    }

    pub async fn city(&self, id: &str) -> Arc<Option<City>> {
        let key = self.touch(QueryKind::City, Some(id));
        let fetch = usecases::fetch_city(self.db(), self.sink(), id);
        self.city.get_or_fetch(&key, fetch).await
    }

    pub async fn cities_by_ids(&self, ids: &[Id]) -> Arc<Vec<City>> {
        let key = self.touch(QueryKind::CitiesByIds, Some(&ids_arg(ids)));
        let fetch = usecases::fetch_cities_by_ids(self.db(), self.sink(), ids);
        self.cities.get_or_fetch(&key, fetch).await
    }

    pub async fn points_by_city(&self, city_id: &str) -> Arc<Vec<Point>> {
        let key = self.touch(QueryKind::PointsByCity, Some(city_id));
        let fetch = usecases::fetch_points_by_city(self.db(), self.sink(), city_id);
        self.points.get_or_fetch(&key, fetch).await
    }

    pub async fn point(&self, id: &str) -> Arc<Option<Point>> {
        let key = self.touch(QueryKind::Point, Some(id));
        let fetch = usecases::fetch_point(self.db(), self.sink(), id);
        self.point.get_or_fetch(&key, fetch).await
    }

    pub async fn points_by_ids(&self, ids: &[Id]) -> Arc<Vec<Point>> {
        let key = self.touch(QueryKind::PointsByIds, Some(&ids_arg(ids)));
        let fetch = usecases::fetch_points_by_ids(self.db(), self.sink(), ids);
        self.points.get_or_fetch(&key, fetch).await
    }

    pub async fn points_by_route(&self, route_id: &str) -> Arc<Vec<Point>> {
        let key = self.touch(QueryKind::PointsByRoute, Some(route_id));
        let fetch = usecases::fetch_points_by_route(self.db(), self.sink(), route_id);
        self.points.get_or_fetch(&key, fetch).await
    }

    pub async fn points_by_event(&self, event_id: &str) -> Arc<Vec<Point>> {
        let key = self.touch(QueryKind::PointsByEvent, Some(event_id));
        let fetch = usecases::fetch_points_by_event(self.db(), self.sink(), event_id);
        self.points.get_or_fetch(&key, fetch).await
    }

    pub async fn routes_by_city(&self, city_id: &str) -> Arc<Vec<Route>> {
        let key = self.touch(QueryKind::RoutesByCity, Some(city_id));
        let fetch = usecases::fetch_routes_by_city(self.db(), self.sink(), city_id);
        self.routes.get_or_fetch(&key, fetch).await
    }

    pub async fn route(&self, id: &str) -> Arc<Option<Route>> {
        let key = self.touch(QueryKind::Route, Some(id));
        let fetch = usecases::fetch_route(self.db(), self.sink(), id);
        self.route.get_or_fetch(&key, fetch).await
    }

    pub async fn routes_by_ids(&self, ids: &[Id]) -> Arc<Vec<Route>> {
        let key = self.touch(QueryKind::RoutesByIds, Some(&ids_arg(ids)));
        let fetch = usecases::fetch_routes_by_ids(self.db(), self.sink(), ids);
        self.routes.get_or_fetch(&key, fetch).await
    }

    pub async fn routes_by_point(&self, point_id: &str) -> Arc<Vec<Route>> {
        let key = self.touch(QueryKind::RoutesByPoint, Some(point_id));
        let fetch = usecases::fetch_routes_by_point(self.db(), self.sink(), point_id);
        self.routes.get_or_fetch(&key, fetch).await
    }

    pub async fn routes_by_event(&self, event_id: &str) -> Arc<Vec<Route>> {
        let key = self.touch(QueryKind::RoutesByEvent, Some(event_id));
        let fetch = usecases::fetch_routes_by_event(self.db(), self.sink(), event_id);
        self.routes.get_or_fetch(&key, fetch).await
    }

    pub async fn events(&self) -> Arc<Vec<Event>> {
        let key = self.touch(QueryKind::Events, None);
        let fetch = usecases::fetch_events(self.db(), self.sink());
        self.events.get_or_fetch(&key, fetch).await
    }

    pub async fn events_by_city(&self, city_id: &str) -> Arc<Vec<Event>> {
        let key = self.touch(QueryKind::EventsByCity, Some(city_id));
        let fetch = usecases::fetch_events_by_city(self.db(), self.sink(), city_id);
        self.events.get_or_fetch(&key, fetch).await
    }

    pub async fn event(&self, id: &str) -> Arc<Option<Event>> {
        let key = self.touch(QueryKind::Event, Some(id));
        let fetch = usecases::fetch_event(self.db(), self.sink(), id);
        self.event.get_or_fetch(&key, fetch).await
    }

    pub async fn events_by_ids(&self, ids: &[Id]) -> Arc<Vec<Event>> {
        let key = self.touch(QueryKind::EventsByIds, Some(&ids_arg(ids)));
        let fetch = usecases::fetch_events_by_ids(self.db(), self.sink(), ids);
        self.events.get_or_fetch(&key, fetch).await
    }

    pub async fn events_by_point(&self, point_id: &str) -> Arc<Vec<Event>> {
        let key = self.touch(QueryKind::EventsByPoint, Some(point_id));
        let fetch = usecases::fetch_events_by_point(self.db(), self.sink(), point_id);
        self.events.get_or_fetch(&key, fetch).await
    }

    pub async fn events_by_route(&self, route_id: &str) -> Arc<Vec<Event>> {
        let key = self.touch(QueryKind::EventsByRoute, Some(route_id));
        let fetch = usecases::fetch_events_by_route(self.db(), self.sink(), route_id);
        self.events.get_or_fetch(&key, fetch).await
    }

    pub async fn search(&self, text: &str) -> Arc<SearchResults> {
        let text = text.trim().to_lowercase();
        let key = self.touch(QueryKind::Search, Some(&text));
        let fetch = usecases::search(self.db(), self.sink(), &text);
        self.search.get_or_fetch(&key, fetch).await
    }

    pub async fn languages(&self) -> Arc<Vec<LanguageName>> {
        let key = self.touch(QueryKind::Languages, None);
        let fetch = usecases::fetch_languages(self.db(), self.sink());
        self.languages.get_or_fetch(&key, fetch).await
    }

    /// Take the keys of all queries issued since the last call.
    pub fn take_touched(&self) -> HashSet<QueryKey> {
        std::mem::take(&mut *self.touched.lock())
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.city.invalidate(key);
        self.cities.invalidate(key);
        self.point.invalidate(key);
        self.points.invalidate(key);
        self.route.invalidate(key);
        self.routes.invalidate(key);
        self.event.invalidate(key);
        self.events.invalidate(key);
        self.search.invalidate(key);
        self.languages.invalidate(key);
    }

    pub fn invalidate_all<'a>(&self, keys: impl IntoIterator<Item = &'a QueryKey>) {
        for key in keys {
            self.invalidate(key);
        }
    }

    pub fn clear(&self) {
        self.touched.lock().clear();
        self.city.clear();
        self.cities.clear();
        self.point.clear();
        self.points.clear();
        self.route.clear();
        self.routes.clear();
        self.event.clear();
        self.events.clear();
        self.search.clear();
        self.languages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::RecordingSink, usecases::tests::*};
    use serde_json::json;
    use tirtha_boundary::tables;

    fn catalog() -> (Arc<MockBackend>, Catalog) {
        let db = Arc::new(
            MockBackend::new()
                .with(tables::CITIES, vec![json!({ "id": "vns", "spots_count": 1 })])
                .with(tables::SPOTS, vec![json!({ "id": 1, "city_id": "vns" })]),
        );
        let catalog = Catalog::new(db.clone(), Arc::new(RecordingSink::default()), None);
        (db, catalog)
    }

    #[tokio::test]
    async fn deduplicate_concurrent_queries() {
        let (db, catalog) = catalog();
        let (a, b) = tokio::join!(catalog.points_by_city("vns"), catalog.points_by_city("vns"));
        assert_eq!(a.len(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(db.select_count(tables::SPOTS), 1);
    }

    #[tokio::test]
    async fn refetch_after_invalidation_of_touched_keys() {
        let (db, catalog) = catalog();
        catalog.cities().await;
        catalog.cities().await;
        assert_eq!(db.select_count(tables::CITIES), 1);
        let touched = catalog.take_touched();
        assert_eq!(touched.len(), 1);
        catalog.invalidate_all(&touched);
        catalog.cities().await;
        assert_eq!(db.select_count(tables::CITIES), 2);
    }

    #[tokio::test]
    async fn cache_keys_distinguish_arguments() {
        let (_, catalog) = catalog();
        assert!(catalog.city("vns").await.is_some());
        assert!(catalog.city("vrn").await.is_none());
        assert_eq!(catalog.take_touched().len(), 2);
    }
}
