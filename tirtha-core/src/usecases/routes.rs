use super::prelude::*;

pub async fn fetch_routes_by_city(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    city_id: &str,
) -> Vec<Route> {
    let query = Select::table(tables::ROUTES).eq(tables::CITY_ID, city_id);
    load_all(db, sink, query).await
}

/// A single route with its ordered points and its events.
///
/// The join tables take precedence over ids that are stored
/// inline. The inline point list is only used if the route
/// has no linked points at all.
pub async fn fetch_route(db: &dyn Backend, sink: &dyn DiagnosticsSink, id: &str) -> Option<Route> {
    let mut route: Route = load_one(db, sink, id).await?;
    let (point_ids, event_ids) = tokio::join!(
        linked_ids(db, sink, Relation::SpotRoute, Side::Right, id),
        linked_ids(db, sink, Relation::RouteEvent, Side::Left, id),
    );
    if !point_ids.is_empty() {
        route.point_ids = point_ids;
    }
    route.event_ids = unique_ids(event_ids.into_iter().chain(route.event_ids));
    Some(route)
}

pub async fn fetch_routes_by_ids(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    ids: &[Id],
) -> Vec<Route> {
    load_by_ids(db, sink, ids).await
}
