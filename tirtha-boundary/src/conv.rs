//! Normalization of raw rows into entities.
//!
//! Conversions never fail: every malformed or missing field
//! degrades to a fallback value and is reported as a [`Diagnostic`].

use super::*;
use e::{
    city::{City, CityCounts},
    event::{Event, EventSchedule},
    favorite::FavoriteKind,
    geo::GeoPoint,
    id::Id,
    language::Language,
    localized::LocalizedText,
    media::{thumbnail_of, MediaItem, MediaKind},
    point::{Point, PointKind},
    route::Route,
    time::Timestamp,
};
use tirtha_entities as e;

pub mod fallback {
    //! Placeholder texts for missing localized fields.

    use super::LocalizedText;

    pub fn city_name() -> LocalizedText {
        LocalizedText::new("Unknown city", "Неизвестный город", "अज्ञात शहर")
    }

    pub fn spot_name() -> LocalizedText {
        LocalizedText::new("Unknown spot", "Неизвестная точка", "अज्ञात स्थान")
    }

    pub fn route_name() -> LocalizedText {
        LocalizedText::new("Unknown route", "Неизвестный маршрут", "अज्ञात मार्ग")
    }

    pub fn event_name() -> LocalizedText {
        LocalizedText::new("Unknown event", "Неизвестное событие", "अज्ञात कार्यक्रम")
    }

    pub fn description() -> LocalizedText {
        LocalizedText::new(
            "No description available",
            "Описание отсутствует",
            "विवरण उपलब्ध नहीं है",
        )
    }
}

/// Collects the diagnostics of a single row.
struct Report {
    record: RecordKind,
    id: String,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    fn new(record: RecordKind, id: &str) -> Self {
        Self {
            record,
            id: id.to_owned(),
            diagnostics: vec![],
        }
    }

    fn issue(&mut self, field: &'static str, issue: Issue) {
        self.diagnostics.push(Diagnostic {
            record: self.record,
            id: Some(self.id.clone()),
            field,
            issue,
        });
    }

    fn finish<T>(self, entity: T) -> Transformed<T> {
        Transformed {
            entity,
            diagnostics: self.diagnostics,
        }
    }
}

fn localized(
    report: &mut Report,
    field: &'static str,
    value: Option<LocalizedField>,
    fallback: LocalizedText,
) -> LocalizedText {
    let map = match value {
        None => {
            report.issue(field, Issue::Missing);
            return fallback;
        }
        Some(LocalizedField::Map(map)) => map,
        Some(LocalizedField::Text(text)) => match serde_json::from_str::<Map<String, Value>>(&text)
        {
            Ok(map) => map,
            Err(err) => {
                report.issue(field, Issue::Unparseable(err.to_string()));
                return fallback;
            }
        },
        Some(LocalizedField::Other(other)) => {
            report.issue(field, Issue::Unparseable(format!("unexpected value {other}")));
            return fallback;
        }
    };
    let mut missing = vec![];
    let text = LocalizedText::fill_from(
        |lang| {
            let text = map
                .get(lang.code())
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(ToOwned::to_owned);
            if text.is_none() {
                missing.push(lang.code());
            }
            text
        },
        &fallback,
    );
    if missing.len() == Language::ALL.len() {
        report.issue(field, Issue::Missing);
    } else if !missing.is_empty() {
        report.issue(field, Issue::MissingTranslations(missing));
    }
    text
}

fn media_urls(report: &mut Report, field: &'static str, value: Option<MediaField>) -> Vec<String> {
    let values = match value {
        None => return vec![],
        Some(MediaField::List(values)) => values,
        Some(MediaField::Text(text)) if text.trim().is_empty() => return vec![],
        Some(MediaField::Text(text)) => match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(values) => values,
            Err(err) => {
                report.issue(field, Issue::Unparseable(err.to_string()));
                return vec![];
            }
        },
        Some(MediaField::Other(other)) => {
            report.issue(field, Issue::Unparseable(format!("unexpected value {other}")));
            return vec![];
        }
    };
    let total = values.len();
    let urls: Vec<_> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect();
    if urls.len() < total {
        report.issue(field, Issue::DroppedMediaEntries(total - urls.len()));
    }
    urls
}

fn media_items(owner: &str, kind: MediaKind, urls: Vec<String>) -> impl Iterator<Item = MediaItem> + '_ {
    urls.into_iter().enumerate().map(move |(i, url)| {
        let id = format!("{owner}-{kind}-{i}");
        match kind {
            MediaKind::Image => MediaItem::image(id, url),
            _ => MediaItem {
                id: id.into(),
                kind,
                url,
                thumbnail_url: None,
                title: None,
                description: None,
            },
        }
    })
}

fn resolve(shape: &LegacyCoordinates) -> Option<GeoPoint> {
    match shape {
        LegacyCoordinates::GeoJson { coordinates } => match coordinates.as_slice() {
            [lng, lat, ..] => GeoPoint::try_new(loose_f64(lat)?, loose_f64(lng)?),
            _ => None,
        },
        LegacyCoordinates::Flat {
            latitude,
            longitude,
        } => GeoPoint::try_new(loose_f64(latitude)?, loose_f64(longitude)?),
    }
}

/// Probe all geometry columns: GeoJSON shapes first, then flat ones.
fn location(
    report: &mut Report,
    fields: Vec<Option<CoordinatesField>>,
    latitude: Option<LooseNumber>,
    longitude: Option<LooseNumber>,
) -> GeoPoint {
    let mut geo_json_shapes = vec![];
    let mut flat_shapes = vec![];
    let mut present = false;
    for field in fields.into_iter().flatten() {
        present = true;
        let object = match field {
            CoordinatesField::Object(object) => object,
            CoordinatesField::Text(text) => {
                match serde_json::from_str::<Map<String, Value>>(&text) {
                    Ok(object) => object,
                    Err(_) => continue,
                }
            }
            CoordinatesField::Other(_) => continue,
        };
        let (geo_json, flat) = LegacyCoordinates::probe(&object);
        geo_json_shapes.extend(geo_json);
        flat_shapes.extend(flat);
    }
    let columns = latitude
        .as_ref()
        .zip(longitude.as_ref())
        .and_then(|(lat, lng)| GeoPoint::try_new(lat.to_f64()?, lng.to_f64()?));
    present |= latitude.is_some() || longitude.is_some();

    let resolved = geo_json_shapes
        .iter()
        .chain(flat_shapes.iter())
        .find_map(resolve)
        .or(columns);
    match resolved {
        Some(point) => point,
        None => {
            let issue = if present {
                Issue::UnresolvedCoordinates
            } else {
                Issue::Missing
            };
            report.issue("coordinates", issue);
            GeoPoint::ORIGIN
        }
    }
}

fn point_kind(report: &mut Report, value: Option<TypeCodeField>) -> PointKind {
    match value {
        Some(TypeCodeField::Code(code)) => PointKind::from_code(code),
        Some(TypeCodeField::Text(text)) => {
            let text = text.trim();
            if let Ok(code) = text.parse::<i64>() {
                PointKind::from_code(code)
            } else if let Ok(kind) = text.parse::<PointKind>() {
                kind
            } else {
                report.issue("type", Issue::UnknownTypeCode(text.to_owned()));
                PointKind::Other
            }
        }
        Some(TypeCodeField::Other(other)) => {
            report.issue("type", Issue::UnknownTypeCode(other.to_string()));
            PointKind::Other
        }
        None => {
            report.issue("type", Issue::Missing);
            PointKind::Other
        }
    }
}

fn schedule(report: &mut Report, value: Option<FlagField>) -> EventSchedule {
    let flag = match value {
        Some(FlagField::Bool(flag)) => Some(flag),
        Some(FlagField::Number(n)) => Some(n != 0),
        Some(FlagField::Text(text)) => match text.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        Some(FlagField::Other(_)) => None,
        None => {
            report.issue("type", Issue::Missing);
            Some(false)
        }
    };
    let flag = flag.unwrap_or_else(|| {
        report.issue("type", Issue::Unparseable("expected a boolean".into()));
        false
    });
    EventSchedule::from_flag(flag)
}

fn timestamp(report: &mut Report, field: &'static str, value: Option<TimestampField>) -> Option<Timestamp> {
    match value? {
        TimestampField::Text(text) if text.trim().is_empty() => None,
        TimestampField::Text(text) => {
            let ts = Timestamp::parse_iso(&text);
            if ts.is_none() {
                report.issue(field, Issue::InvalidTimestamp(text));
            }
            ts
        }
        TimestampField::Unix(seconds) => {
            let ts = Timestamp::from_unix_timestamp(seconds);
            if ts.is_none() {
                report.issue(field, Issue::InvalidTimestamp(seconds.to_string()));
            }
            ts
        }
        TimestampField::Other(other) => {
            report.issue(field, Issue::InvalidTimestamp(other.to_string()));
            None
        }
    }
}

fn number(report: &mut Report, field: &'static str, value: Option<LooseNumber>) -> Option<f64> {
    let value = value?;
    let n = value.to_f64();
    if n.is_none() {
        report.issue(field, Issue::InvalidNumber);
    }
    n
}

fn count(report: &mut Report, field: &'static str, value: Option<LooseNumber>) -> Option<usize> {
    number(report, field, value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
}

fn id_list(report: &mut Report, field: &'static str, value: Option<IdListField>) -> Vec<Id> {
    let values = match value {
        None => return vec![],
        Some(IdListField::List(values)) => values,
        Some(IdListField::Text(text)) if text.trim().is_empty() => return vec![],
        Some(IdListField::Text(text)) => match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(values) => values,
            Err(err) => {
                report.issue(field, Issue::Unparseable(err.to_string()));
                return vec![];
            }
        },
        Some(IdListField::Other(other)) => {
            report.issue(field, Issue::Unparseable(format!("unexpected value {other}")));
            return vec![];
        }
    };
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(Id::from(s)),
            Value::Number(n) => n.as_i64().map(Id::from),
            _ => None,
        })
        .collect()
}

fn opt_id(id: Option<RawId>) -> Option<Id> {
    id.map(RawId::into_string)
        .filter(|s| !s.trim().is_empty())
        .map(Id::from)
}

impl From<CityRow> for Transformed<City> {
    fn from(row: CityRow) -> Self {
        let CityRow {
            id,
            name,
            description,
            images,
            spots_count,
            routes_count,
            events_count,
            coordinates,
            location: location_field,
            latitude,
            longitude,
        } = row;
        let id = id.into_string();
        let mut report = Report::new(RecordKind::City, &id);

        let name = localized(&mut report, "name", name, fallback::city_name());
        let description = localized(&mut report, "description", description, fallback::description());
        let urls = media_urls(&mut report, "images", images);
        let media: Vec<_> = media_items(&id, MediaKind::Image, urls).collect();
        let thumbnail = thumbnail_of(&media);
        let points = count(&mut report, "spots_count", spots_count);
        let routes = count(&mut report, "routes_count", routes_count);
        let events = count(&mut report, "events_count", events_count);
        let counts = match (points, routes, events) {
            (None, None, None) => None,
            (points, routes, events) => Some(CityCounts {
                points: points.unwrap_or_default(),
                routes: routes.unwrap_or_default(),
                events: events.unwrap_or_default(),
            }),
        };
        let center = location(&mut report, vec![coordinates, location_field], latitude, longitude);

        report.finish(City {
            id: id.into(),
            name,
            description,
            thumbnail,
            media,
            counts,
            center,
        })
    }
}

impl From<SpotRow> for Transformed<Point> {
    fn from(row: SpotRow) -> Self {
        let SpotRow {
            id,
            city_id,
            kind,
            name,
            description,
            images,
            videos,
            audio,
            coordinates,
            point,
            location: location_field,
            latitude,
            longitude,
            created_by,
        } = row;
        let id = id.into_string();
        let mut report = Report::new(RecordKind::Spot, &id);

        let kind = point_kind(&mut report, kind);
        let name = localized(&mut report, "name", name, fallback::spot_name());
        let description = localized(&mut report, "description", description, fallback::description());
        let images = media_urls(&mut report, "images", images);
        let videos = media_urls(&mut report, "videos", videos);
        let audio = media_urls(&mut report, "audio", audio);
        let mut media: Vec<_> = media_items(&id, MediaKind::Image, images).collect();
        // The thumbnail is only ever taken from the images
        let thumbnail = thumbnail_of(&media);
        media.extend(media_items(&id, MediaKind::Video, videos));
        media.extend(media_items(&id, MediaKind::Audio, audio));
        let location = location(
            &mut report,
            vec![coordinates, point, location_field],
            latitude,
            longitude,
        );

        report.finish(Point {
            id: id.into(),
            city_id: opt_id(city_id),
            kind,
            name,
            description,
            thumbnail,
            media,
            location,
            route_ids: vec![],
            event_ids: vec![],
            created_by: opt_id(created_by),
        })
    }
}

impl From<RouteRow> for Transformed<Route> {
    fn from(row: RouteRow) -> Self {
        let RouteRow {
            id,
            city_id,
            name,
            description,
            images,
            spots,
            events,
            distance,
            duration,
        } = row;
        let id = id.into_string();
        let mut report = Report::new(RecordKind::Route, &id);

        let name = localized(&mut report, "name", name, fallback::route_name());
        let description = localized(&mut report, "description", description, fallback::description());
        let urls = media_urls(&mut report, "images", images);
        let media: Vec<_> = media_items(&id, MediaKind::Image, urls).collect();
        let thumbnail = thumbnail_of(&media);
        let point_ids = id_list(&mut report, "spots", spots);
        let event_ids = id_list(&mut report, "events", events);
        let distance_km = number(&mut report, "distance", distance);
        let duration_minutes = number(&mut report, "duration", duration);

        report.finish(Route {
            id: id.into(),
            city_id: opt_id(city_id),
            name,
            description,
            thumbnail,
            media,
            point_ids,
            event_ids,
            distance_km,
            duration_minutes,
        })
    }
}

impl From<EventRow> for Transformed<Event> {
    fn from(row: EventRow) -> Self {
        let EventRow {
            id,
            city_id,
            name,
            description,
            images,
            starts_at,
            ends_at,
            kind,
            spots,
            created_by,
        } = row;
        let id = id.into_string();
        let mut report = Report::new(RecordKind::Event, &id);

        let name = localized(&mut report, "name", name, fallback::event_name());
        let description = localized(&mut report, "description", description, fallback::description());
        let urls = media_urls(&mut report, "images", images);
        let media: Vec<_> = media_items(&id, MediaKind::Image, urls).collect();
        let thumbnail = thumbnail_of(&media);
        let starts_at = timestamp(&mut report, "time", starts_at);
        let ends_at = timestamp(&mut report, "end_time", ends_at);
        let schedule = schedule(&mut report, kind);
        let point_ids = id_list(&mut report, "spots", spots);

        report.finish(Event {
            id: id.into(),
            city_id: opt_id(city_id),
            name,
            description,
            thumbnail,
            media,
            starts_at,
            ends_at,
            schedule,
            point_ids,
            created_by: opt_id(created_by),
        })
    }
}

// The persistence layer calls points "spots". This is the
// only place where both vocabularies are mapped onto each other.

impl From<FavoriteKind> for ItemType {
    fn from(from: FavoriteKind) -> Self {
        match from {
            FavoriteKind::City => Self::City,
            FavoriteKind::Point => Self::Spot,
            FavoriteKind::Route => Self::Route,
            FavoriteKind::Event => Self::Event,
        }
    }
}

impl From<ItemType> for FavoriteKind {
    fn from(from: ItemType) -> Self {
        match from {
            ItemType::City => Self::City,
            ItemType::Spot => Self::Point,
            ItemType::Route => Self::Route,
            ItemType::Event => Self::Event,
        }
    }
}

impl FavoriteRow {
    /// The favorite as `(kind, item id)` or a diagnostic for unknown kinds.
    pub fn try_into_favorite(self) -> Result<(FavoriteKind, Id), Diagnostic> {
        let item_id = self.item_id.clone().into_string();
        match self.item_type() {
            Some(item_type) => Ok((item_type.into(), item_id.into())),
            None => Err(Diagnostic {
                record: RecordKind::Favorite,
                id: Some(item_id),
                field: "item_type",
                issue: Issue::UnknownTypeCode(self.item_type.to_string()),
            }),
        }
    }
}

impl From<GeoPoint> for Location {
    fn from(from: GeoPoint) -> Self {
        let GeoPoint {
            latitude,
            longitude,
        } = from;
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<e::geo::GeoJsonPoint> for GeoJsonPoint {
    fn from(from: e::geo::GeoJsonPoint) -> Self {
        let e::geo::GeoJsonPoint { coordinates } = from;
        Self {
            kind: GeoJsonType::Point,
            coordinates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e::PLACEHOLDER_IMAGE;
    use serde_json::json;

    fn city(value: Value) -> Transformed<City> {
        serde_json::from_value::<CityRow>(value).unwrap().into()
    }

    fn spot(value: Value) -> Transformed<Point> {
        serde_json::from_value::<SpotRow>(value).unwrap().into()
    }

    fn event(value: Value) -> Transformed<Event> {
        serde_json::from_value::<EventRow>(value).unwrap().into()
    }

    #[test]
    fn partial_stringified_name_is_completed_with_fallback() {
        let t = city(json!({ "id": "c1", "name": "{\"en\":\"Varanasi\"}", "images": null }));
        let fallback = fallback::city_name();
        assert_eq!(t.entity.name.get(Language::En), "Varanasi");
        assert_eq!(t.entity.name.get(Language::Ru), fallback.get(Language::Ru));
        assert_eq!(t.entity.name.get(Language::Hi), fallback.get(Language::Hi));
        assert_eq!(t.entity.thumbnail, PLACEHOLDER_IMAGE);
        assert!(t
            .diagnostics
            .iter()
            .any(|d| d.field == "name" && d.issue == Issue::MissingTranslations(vec!["ru", "hi"])));
    }

    #[test]
    fn missing_or_broken_names_fall_back_in_all_languages() {
        for name in [json!(null), json!("{not json"), json!(17), json!({})] {
            let t = spot(json!({ "id": 1, "name": name }));
            for lang in Language::ALL {
                let text = t.entity.name.get(lang);
                assert!(!text.is_empty());
                assert_eq!(text, fallback::spot_name().get(lang));
            }
            assert!(t.diagnostics.iter().any(|d| d.field == "name"));
        }
        let t = spot(json!({ "id": 1 }));
        assert_eq!(t.entity.name.get(Language::En), "Unknown spot");
        assert_eq!(t.entity.name.get(Language::Ru), "Неизвестная точка");
        assert_eq!(t.entity.name.get(Language::Hi), "अज्ञात स्थान");
    }

    #[test]
    fn native_name_objects_are_used_as_is() {
        let t = city(json!({
            "id": 3,
            "name": { "en": "Vrindavan", "ru": "Вриндаван", "hi": "वृन्दावन" },
            "description": { "en": "Forest of Tulsi", "ru": "", "hi": 5 }
        }));
        assert_eq!(t.entity.id.as_str(), "3");
        assert_eq!(t.entity.name.get(Language::Hi), "वृन्दावन");
        assert_eq!(t.entity.description.get(Language::En), "Forest of Tulsi");
        assert_eq!(
            t.entity.description.get(Language::Ru),
            fallback::description().get(Language::Ru)
        );
        assert!(!t.diagnostics.iter().any(|d| d.field == "name"));
    }

    #[test]
    fn thumbnail_for_all_image_encodings() {
        let native = city(json!({ "id": "a", "images": ["/1.jpg", "/2.jpg"] }));
        assert_eq!(native.entity.thumbnail, "/1.jpg");
        assert_eq!(native.entity.media.len(), 2);
        assert_eq!(native.entity.media[1].thumbnail_url.as_deref(), Some("/2.jpg"));
        assert!(native.entity.media.iter().all(|m| m.kind == MediaKind::Image));

        let encoded = city(json!({ "id": "a", "images": "[\"/x.jpg\"]" }));
        assert_eq!(encoded.entity.thumbnail, "/x.jpg");

        for absent in [json!(null), json!([]), json!(""), json!("[broken"), json!(7)] {
            let t = city(json!({ "id": "a", "images": absent }));
            assert_eq!(t.entity.thumbnail, PLACEHOLDER_IMAGE);
            assert!(t.entity.media.is_empty());
        }
    }

    #[test]
    fn non_string_images_are_dropped() {
        let t = city(json!({ "id": "a", "images": [null, 1, "/ok.png", {"url": "/no"}] }));
        assert_eq!(t.entity.thumbnail, "/ok.png");
        assert_eq!(t.entity.media.len(), 1);
        assert!(t
            .diagnostics
            .iter()
            .any(|d| d.issue == Issue::DroppedMediaEntries(3)));
    }

    #[test]
    fn spot_videos_and_audio() {
        let t = spot(json!({
            "id": 9,
            "videos": ["/v.mp4"],
            "audio": "[\"/a.mp3\"]"
        }));
        assert_eq!(t.entity.thumbnail, PLACEHOLDER_IMAGE);
        let kinds: Vec<_> = t.entity.media.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MediaKind::Video, MediaKind::Audio]);
        assert!(t.entity.media.iter().all(|m| m.thumbnail_url.is_none()));
    }

    #[test]
    fn coordinates_geo_json_first() {
        let t = spot(json!({
            "id": 1,
            "coordinates": { "type": "Point", "coordinates": [83.0, 25.3] },
            "location": { "latitude": 1.0, "longitude": 2.0 }
        }));
        assert_eq!(t.entity.location, GeoPoint::new(25.3, 83.0));
        assert_eq!(t.entity.geo_json().coordinates, [83.0, 25.3]);
        let wire = serde_json::to_value(GeoJsonPoint::from(t.entity.geo_json())).unwrap();
        assert_eq!(wire, json!({ "type": "Point", "coordinates": [83.0, 25.3] }));
    }

    #[test]
    fn coordinates_flat_shape() {
        let t = spot(json!({ "id": 1, "location": { "latitude": "27.5", "longitude": 77.7 } }));
        assert_eq!(t.entity.location, GeoPoint::new(27.5, 77.7));
        let t = spot(json!({ "id": 1, "latitude": 10, "longitude": 20 }));
        assert_eq!(t.entity.location, GeoPoint::new(10.0, 20.0));
        let t = spot(json!({ "id": 1, "point": "{\"coordinates\":[77.7,27.5]}" }));
        assert_eq!(t.entity.location, GeoPoint::new(27.5, 77.7));
    }

    #[test]
    fn malformed_geo_json_falls_through_to_flat_shape() {
        let t = spot(json!({
            "id": 1,
            "coordinates": { "coordinates": ["x", 1], "latitude": 5, "longitude": 6 }
        }));
        assert_eq!(t.entity.location, GeoPoint::new(5.0, 6.0));
    }

    #[test]
    fn unresolvable_coordinates_default_to_origin() {
        for coordinates in [
            json!(null),
            json!({ "coordinates": [] }),
            json!({ "latitude": "north", "longitude": 1 }),
            json!({ "coordinates": ["NaN", "NaN"] }),
            json!("garbage"),
        ] {
            let t = spot(json!({ "id": 1, "coordinates": coordinates }));
            assert_eq!(t.entity.location, GeoPoint::ORIGIN);
            assert!(t.diagnostics.iter().any(|d| d.field == "coordinates"));
        }
    }

    #[test]
    fn pinned_point_type_mapping() {
        let kind = |t: Value| spot(json!({ "id": 1, "type": t })).entity.kind;
        assert_eq!(kind(json!(0)), PointKind::Temple);
        assert_eq!(kind(json!(1)), PointKind::Ashram);
        assert_eq!(kind(json!(2)), PointKind::Kund);
        assert_eq!(kind(json!(3)), PointKind::Other);
        assert_eq!(kind(json!("1")), PointKind::Ashram);
        assert_eq!(kind(json!("kund")), PointKind::Kund);
        assert_eq!(kind(json!("?")), PointKind::Other);
        assert_eq!(kind(json!(null)), PointKind::Other);
    }

    #[test]
    fn event_schedule_and_times() {
        let t = event(json!({
            "id": "e1",
            "type": true,
            "time": "2025-01-14T05:00:00+05:30",
            "end_time": "tomorrow"
        }));
        assert_eq!(t.entity.schedule, EventSchedule::Calendar);
        assert_eq!(
            t.entity.starts_at.map(|ts| ts.to_rfc3339()).as_deref(),
            Some("2025-01-13T23:30:00Z")
        );
        assert!(t.entity.ends_at.is_none());
        assert!(t
            .diagnostics
            .iter()
            .any(|d| d.issue == Issue::InvalidTimestamp("tomorrow".into())));

        let daily = event(json!({ "id": "e2", "type": "false" }));
        assert_eq!(daily.entity.schedule, EventSchedule::Daily);
        let missing = event(json!({ "id": "e3" }));
        assert_eq!(missing.entity.schedule, EventSchedule::Daily);
    }

    #[test]
    fn route_inline_relations() {
        let row: RouteRow = serde_json::from_value(json!({
            "id": "r1",
            "spots": ["s2", 1, null, ""],
            "events": "[\"e1\"]",
            "distance": "12.5",
            "duration": "long"
        }))
        .unwrap();
        let t: Transformed<Route> = row.into();
        assert_eq!(t.entity.point_ids, vec![Id::from("s2"), Id::from("1")]);
        assert_eq!(t.entity.event_ids, vec![Id::from("e1")]);
        assert_eq!(t.entity.distance_km, Some(12.5));
        assert_eq!(t.entity.duration_minutes, None);
        assert!(t.diagnostics.iter().any(|d| d.field == "duration"));
    }

    #[test]
    fn server_supplied_counts() {
        let t = city(json!({ "id": "c", "spots_count": 4, "routes_count": "2" }));
        assert_eq!(
            t.entity.counts,
            Some(CityCounts {
                points: 4,
                routes: 2,
                events: 0
            })
        );
        assert_eq!(city(json!({ "id": "c" })).entity.counts, None);
    }

    #[test]
    fn favorite_vocabulary_round_trip() {
        for kind in FavoriteKind::ALL {
            assert_eq!(FavoriteKind::from(ItemType::from(kind)), kind);
        }
        assert_eq!(ItemType::from(FavoriteKind::Point).as_str(), "spot");
        let row: FavoriteRow = serde_json::from_value(json!({
            "user_id": "u", "item_id": 5, "item_type": "spot"
        }))
        .unwrap();
        assert_eq!(
            row.try_into_favorite().unwrap(),
            (FavoriteKind::Point, Id::from("5"))
        );
    }
}
