use std::collections::HashMap;

use serde_json::Value;

use super::prelude::*;

pub async fn fetch_cities(db: &dyn Backend, sink: &dyn DiagnosticsSink) -> Vec<City> {
    let cities = load_all(db, sink, Select::table(tables::CITIES)).await;
    with_derived_counts(db, cities).await
}

pub async fn fetch_city(db: &dyn Backend, sink: &dyn DiagnosticsSink, id: &str) -> Option<City> {
    let city = load_one(db, sink, id).await?;
    with_derived_counts(db, vec![city]).await.pop()
}

pub async fn fetch_cities_by_ids(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    ids: &[Id],
) -> Vec<City> {
    load_by_ids(db, sink, ids).await
}

/// Count the points, routes and events of each city.
///
/// Cities without any related row are reported with zero counts.
pub async fn derive_city_counts(db: &dyn Backend, ids: &[Id]) -> HashMap<Id, CityCounts> {
    let mut counts: HashMap<Id, CityCounts> = ids
        .iter()
        .map(|id| (id.clone(), CityCounts::default()))
        .collect();
    if counts.is_empty() {
        return counts;
    }
    let query = |table| {
        Select::table(table)
            .columns(&[tables::ID, tables::CITY_ID])
            .any_of(tables::CITY_ID, ids.iter().map(Id::to_string))
    };
    let (spots, routes, events) = (
        query(tables::SPOTS),
        query(tables::ROUTES),
        query(tables::EVENTS),
    );
    let (spots, routes, events) = tokio::join!(
        select_rows(db, &spots),
        select_rows(db, &routes),
        select_rows(db, &events)
    );
    let mut tally = |rows: Vec<Value>, field: fn(&mut CityCounts) -> &mut usize| {
        for row in rows {
            let Some(city_id) = raw_id(row.get(tables::CITY_ID)) else {
                continue;
            };
            if let Some(c) = counts.get_mut(&city_id) {
                *field(c) += 1;
            }
        }
    };
    tally(spots, |c| &mut c.points);
    tally(routes, |c| &mut c.routes);
    tally(events, |c| &mut c.events);
    counts
}

// Server supplied counts take precedence
async fn with_derived_counts(db: &dyn Backend, cities: Vec<City>) -> Vec<City> {
    let missing: Vec<_> = cities
        .iter()
        .filter(|c| c.counts.is_none())
        .map(|c| c.id.clone())
        .collect();
    if missing.is_empty() {
        return cities;
    }
    let mut derived = derive_city_counts(db, &missing).await;
    cities
        .into_iter()
        .map(|city| match derived.remove(&city.id) {
            Some(counts) if city.counts.is_none() => city.with_counts(counts),
            _ => city,
        })
        .collect()
}
