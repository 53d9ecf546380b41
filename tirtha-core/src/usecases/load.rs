use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tirtha_boundary::{
    CityRow, Diagnostic, EventRow, Issue, RawId, RecordKind, RouteEventRow, RouteRow,
    SpotEventRow, SpotRouteRow, SpotRow, Transformed,
};

use super::prelude::*;
use crate::repositories::Error;

/// An entity that is loaded from a table and normalized by a transformer.
pub(crate) trait Record: Sized {
    type Row: DeserializeOwned;
    const TABLE: &'static str;
    const KIND: RecordKind;
    fn transform(row: Self::Row) -> Transformed<Self>;
    fn id(&self) -> &Id;
}

impl Record for City {
    type Row = CityRow;
    const TABLE: &'static str = tables::CITIES;
    const KIND: RecordKind = RecordKind::City;
    fn transform(row: Self::Row) -> Transformed<Self> {
        row.into()
    }
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Record for Point {
    type Row = SpotRow;
    const TABLE: &'static str = tables::SPOTS;
    const KIND: RecordKind = RecordKind::Spot;
    fn transform(row: Self::Row) -> Transformed<Self> {
        row.into()
    }
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Record for Route {
    type Row = RouteRow;
    const TABLE: &'static str = tables::ROUTES;
    const KIND: RecordKind = RecordKind::Route;
    fn transform(row: Self::Row) -> Transformed<Self> {
        row.into()
    }
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Record for Event {
    type Row = EventRow;
    const TABLE: &'static str = tables::EVENTS;
    const KIND: RecordKind = RecordKind::Event;
    fn transform(row: Self::Row) -> Transformed<Self> {
        row.into()
    }
    fn id(&self) -> &Id {
        &self.id
    }
}

/// Run a read query and degrade every failure to an empty result.
pub(crate) async fn select_rows(db: &dyn Backend, query: &Select) -> Vec<Value> {
    if query.is_void() {
        return vec![];
    }
    match db.select(query).await {
        Ok(rows) => rows,
        Err(Error::NotFound) => vec![],
        Err(err) => {
            log::warn!("Failed to read from '{}': {err}", query.table);
            vec![]
        }
    }
}

/// Zero-or-one variant of [`select_rows`].
pub(crate) async fn select_single(db: &dyn Backend, query: &Select) -> Option<Value> {
    match db.maybe_single(query).await {
        Ok(row) => row,
        Err(Error::NotFound) => None,
        Err(err) => {
            log::warn!("Failed to read a single row from '{}': {err}", query.table);
            None
        }
    }
}

/// Decode a raw row or report it as malformed.
pub(crate) fn decode<R: DeserializeOwned>(
    sink: &dyn DiagnosticsSink,
    record: RecordKind,
    value: Value,
) -> Option<R> {
    let id = value.get(tables::ID).and_then(value_to_key);
    match serde_json::from_value(value) {
        Ok(row) => Some(row),
        Err(err) => {
            sink.report(Diagnostic {
                record,
                id,
                field: "row",
                issue: Issue::MalformedRow(err.to_string()),
            });
            None
        }
    }
}

pub(crate) fn transform<T: Record>(sink: &dyn DiagnosticsSink, value: Value) -> Option<T> {
    let row = decode::<T::Row>(sink, T::KIND, value)?;
    let Transformed {
        entity,
        diagnostics,
    } = T::transform(row);
    for diagnostic in diagnostics {
        sink.report(diagnostic);
    }
    Some(entity)
}

pub(crate) async fn load_all<T: Record>(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    query: Select,
) -> Vec<T> {
    debug_assert_eq!(query.table, T::TABLE);
    select_rows(db, &query)
        .await
        .into_iter()
        .filter_map(|value| transform(sink, value))
        .collect()
}

pub(crate) async fn load_one<T: Record>(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    id: &str,
) -> Option<T> {
    let query = Select::table(T::TABLE).eq(tables::ID, id);
    let value = select_single(db, &query).await?;
    transform(sink, value)
}

/// Load entities by id in the given order.
///
/// Duplicates are ignored and ids without a row are dropped.
pub(crate) async fn load_by_ids<T: Record>(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    ids: &[Id],
) -> Vec<T> {
    let ids = unique_ids(ids.iter().cloned());
    if ids.is_empty() {
        return vec![];
    }
    let query = Select::table(T::TABLE).any_of(tables::ID, ids.iter().map(Id::to_string));
    let mut loaded: Vec<T> = load_all(db, sink, query).await;
    let mut ordered = Vec::with_capacity(loaded.len());
    for id in &ids {
        if let Some(pos) = loaded.iter().position(|e| e.id() == id) {
            ordered.push(loaded.swap_remove(pos));
        }
    }
    ordered
}

pub(crate) fn unique_ids(ids: impl IntoIterator<Item = Id>) -> Vec<Id> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| id.is_valid() && seen.insert(id.clone()))
        .collect()
}

/// Read the `id` column of rows that were selected without a transformer.
pub(crate) fn ids_of(rows: Vec<Value>, column: &str) -> Vec<Id> {
    unique_ids(
        rows.iter()
            .filter_map(|row| row.get(column).and_then(value_to_key))
            .map(Id::from),
    )
}

/// A many-to-many relation stored in a join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    SpotRoute,
    SpotEvent,
    RouteEvent,
}

/// The side of a relation whose id is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

struct Link {
    left: Id,
    right: Id,
    position: Option<f64>,
}

impl Relation {
    const fn table(self) -> &'static str {
        match self {
            Self::SpotRoute => tables::SPOT_ROUTE,
            Self::SpotEvent => tables::SPOT_EVENT,
            Self::RouteEvent => tables::ROUTE_EVENT,
        }
    }

    const fn column(self, side: Side) -> &'static str {
        match (self, side) {
            (Self::SpotRoute | Self::SpotEvent, Side::Left) => tables::SPOT_ID,
            (Self::RouteEvent, Side::Left) => tables::ROUTE_ID,
            (Self::SpotRoute, Side::Right) => tables::ROUTE_ID,
            (Self::SpotEvent | Self::RouteEvent, Side::Right) => tables::EVENT_ID,
        }
    }

    fn decode(self, sink: &dyn DiagnosticsSink, value: Value) -> Option<Link> {
        let link = match self {
            Self::SpotRoute => {
                let row: SpotRouteRow = decode(sink, RecordKind::Relation, value)?;
                Link {
                    left: row.spot_id.into_string().into(),
                    right: row.route_id.into_string().into(),
                    position: row.position.and_then(|p| p.to_f64()),
                }
            }
            Self::SpotEvent => {
                let row: SpotEventRow = decode(sink, RecordKind::Relation, value)?;
                Link {
                    left: row.spot_id.into_string().into(),
                    right: row.event_id.into_string().into(),
                    position: None,
                }
            }
            Self::RouteEvent => {
                let row: RouteEventRow = decode(sink, RecordKind::Relation, value)?;
                Link {
                    left: row.route_id.into_string().into(),
                    right: row.event_id.into_string().into(),
                    position: None,
                }
            }
        };
        Some(link)
    }
}

/// Resolve the ids on the other side of a relation.
///
/// Links with a position are returned in ascending order,
/// followed by the unordered ones.
pub(crate) async fn linked_ids(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    relation: Relation,
    known: Side,
    id: &str,
) -> Vec<Id> {
    let query = Select::table(relation.table()).eq(relation.column(known), id);
    let mut links: Vec<_> = select_rows(db, &query)
        .await
        .into_iter()
        .filter_map(|value| relation.decode(sink, value))
        .collect();
    links.sort_by(|a, b| match (a.position, b.position) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    unique_ids(links.into_iter().map(|link| match known {
        Side::Left => link.right,
        Side::Right => link.left,
    }))
}

pub(crate) fn raw_id(value: Option<&Value>) -> Option<Id> {
    let raw: RawId = serde_json::from_value(value?.clone()).ok()?;
    Some(Id::from(raw.into_string())).filter(Id::is_valid)
}
