use std::cmp::Ordering;

use super::prelude::*;

pub async fn fetch_events(db: &dyn Backend, sink: &dyn DiagnosticsSink) -> Vec<Event> {
    let mut events = load_all(db, sink, Select::table(tables::EVENTS)).await;
    sort_chronologically(&mut events);
    events
}

pub async fn fetch_events_by_city(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    city_id: &str,
) -> Vec<Event> {
    let query = Select::table(tables::EVENTS).eq(tables::CITY_ID, city_id);
    let mut events = load_all(db, sink, query).await;
    sort_chronologically(&mut events);
    events
}

/// A single event with its points.
pub async fn fetch_event(db: &dyn Backend, sink: &dyn DiagnosticsSink, id: &str) -> Option<Event> {
    let mut event: Event = load_one(db, sink, id).await?;
    let point_ids = linked_ids(db, sink, Relation::SpotEvent, Side::Right, id).await;
    event.point_ids = unique_ids(point_ids.into_iter().chain(event.point_ids));
    Some(event)
}

pub async fn fetch_events_by_ids(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    ids: &[Id],
) -> Vec<Event> {
    load_by_ids(db, sink, ids).await
}

/// Dated events by start time followed by the daily ones.
///
/// The order is stable, i.e. events without a start time
/// keep their relative order.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| match (a.schedule, b.schedule) {
        (EventSchedule::Calendar, EventSchedule::Daily) => Ordering::Less,
        (EventSchedule::Daily, EventSchedule::Calendar) => Ordering::Greater,
        _ => match (a.starts_at, b.starts_at) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    });
}
