use super::prelude::*;

pub async fn fetch_points_by_city(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    city_id: &str,
) -> Vec<Point> {
    let query = Select::table(tables::SPOTS).eq(tables::CITY_ID, city_id);
    load_all(db, sink, query).await
}

/// A single point with its routes and events.
pub async fn fetch_point(db: &dyn Backend, sink: &dyn DiagnosticsSink, id: &str) -> Option<Point> {
    let mut point: Point = load_one(db, sink, id).await?;
    let (route_ids, event_ids) = tokio::join!(
        linked_ids(db, sink, Relation::SpotRoute, Side::Left, id),
        linked_ids(db, sink, Relation::SpotEvent, Side::Left, id),
    );
    point.route_ids = route_ids;
    point.event_ids = event_ids;
    Some(point)
}

pub async fn fetch_points_by_ids(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    ids: &[Id],
) -> Vec<Point> {
    load_by_ids(db, sink, ids).await
}
