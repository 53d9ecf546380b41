//! Many-to-many relations resolved in two round trips:
//! the join table yields the ids, the entity table the rows.
//!
//! Points that are loaded in the context of a route or an event
//! carry the id of that route or event as a back reference.

use super::prelude::*;

pub async fn fetch_points_by_route(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    route_id: &str,
) -> Vec<Point> {
    let ids = linked_ids(db, sink, Relation::SpotRoute, Side::Right, route_id).await;
    let mut points: Vec<Point> = load_by_ids(db, sink, &ids).await;
    for point in &mut points {
        point.route_ids.push(route_id.into());
    }
    points
}

pub async fn fetch_points_by_event(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    event_id: &str,
) -> Vec<Point> {
    let ids = linked_ids(db, sink, Relation::SpotEvent, Side::Right, event_id).await;
    let mut points: Vec<Point> = load_by_ids(db, sink, &ids).await;
    for point in &mut points {
        point.event_ids.push(event_id.into());
    }
    points
}

pub async fn fetch_routes_by_point(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    point_id: &str,
) -> Vec<Route> {
    let ids = linked_ids(db, sink, Relation::SpotRoute, Side::Left, point_id).await;
    load_by_ids(db, sink, &ids).await
}

pub async fn fetch_routes_by_event(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    event_id: &str,
) -> Vec<Route> {
    let ids = linked_ids(db, sink, Relation::RouteEvent, Side::Right, event_id).await;
    load_by_ids(db, sink, &ids).await
}

pub async fn fetch_events_by_point(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    point_id: &str,
) -> Vec<Event> {
    let ids = linked_ids(db, sink, Relation::SpotEvent, Side::Left, point_id).await;
    load_by_ids(db, sink, &ids).await
}

pub async fn fetch_events_by_route(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    route_id: &str,
) -> Vec<Event> {
    let ids = linked_ids(db, sink, Relation::RouteEvent, Side::Left, route_id).await;
    load_by_ids(db, sink, &ids).await
}
