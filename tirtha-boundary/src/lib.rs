//! Raw rows as they are stored in the hosted backend.
//!
//! The backend grew over time and several columns are stored in more
//! than one shape. Every ambiguous column is modeled as an untagged
//! enum with one variant per known shape plus a catch-all, so that a
//! single malformed field never prevents a row from being decoded.
//! Use the conversions in [`conv`] to turn rows into entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "entity-conversions")]
pub mod conv;

mod diagnostics;
pub mod tables;

pub use self::diagnostics::*;

/// Primary or foreign key: text (UUID) or integer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Localized text column (`name`, `description`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LocalizedField {
    /// Native JSON object, e.g. `{"en":"Varanasi","ru":"Варанаси"}`
    Map(Map<String, Value>),
    /// Stringified JSON object
    Text(String),
    Other(Value),
}

/// List of media URLs.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MediaField {
    List(Vec<Value>),
    /// JSON encoded array
    Text(String),
    Other(Value),
}

/// Geometry column in one of the legacy shapes.
///
/// Objects are kept as maps and probed later on, because the
/// same object may contain both a malformed GeoJSON geometry
/// and valid flat coordinates.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CoordinatesField {
    Object(Map<String, Value>),
    /// Stringified JSON object
    Text(String),
    Other(Value),
}

/// The legacy coordinate shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyCoordinates {
    /// `{"type":"Point","coordinates":[lng,lat]}`
    GeoJson { coordinates: Vec<Value> },
    /// `{"latitude":..,"longitude":..}`
    Flat { latitude: Value, longitude: Value },
}

impl LegacyCoordinates {
    /// Extract every legacy shape found in a JSON object.
    pub fn probe(object: &Map<String, Value>) -> (Option<Self>, Option<Self>) {
        let geo_json = match object.get("coordinates") {
            Some(Value::Array(coordinates)) => Some(Self::GeoJson {
                coordinates: coordinates.clone(),
            }),
            _ => None,
        };
        let latitude = object.get("latitude").or_else(|| object.get("lat"));
        let longitude = object
            .get("longitude")
            .or_else(|| object.get("lng"))
            .or_else(|| object.get("lon"));
        let flat = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::Flat {
                latitude: latitude.clone(),
                longitude: longitude.clone(),
            }),
            _ => None,
        };
        (geo_json, flat)
    }
}

/// Numeric type code of a spot, sometimes stored as text.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TypeCodeField {
    Code(i64),
    Text(String),
    Other(Value),
}

/// Boolean flag, sometimes stored as number or text.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FlagField {
    Bool(bool),
    Number(i64),
    Text(String),
    Other(Value),
}

/// Number that might have been stored as text.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
    Other(Value),
}

impl LooseNumber {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Other(v) => loose_f64(v),
        }
        .filter(|n: &f64| n.is_finite())
    }
}

/// Coerce a JSON number or numeric string into a finite float.
pub fn loose_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Timestamp column (ISO 8601 text or UNIX seconds).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TimestampField {
    Text(String),
    Unix(i64),
    Other(Value),
}

/// List of foreign keys stored inline.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum IdListField {
    List(Vec<Value>),
    /// JSON encoded array
    Text(String),
    Other(Value),
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CityRow {
    pub id           : RawId,
    pub name         : Option<LocalizedField>,
    pub description  : Option<LocalizedField>,
    #[serde(alias = "image", alias = "photos")]
    pub images       : Option<MediaField>,
    #[serde(alias = "points_count")]
    pub spots_count  : Option<LooseNumber>,
    pub routes_count : Option<LooseNumber>,
    pub events_count : Option<LooseNumber>,
    pub coordinates  : Option<CoordinatesField>,
    pub location     : Option<CoordinatesField>,
    pub latitude     : Option<LooseNumber>,
    pub longitude    : Option<LooseNumber>,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SpotRow {
    pub id          : RawId,
    pub city_id     : Option<RawId>,
    #[serde(rename = "type")]
    pub kind        : Option<TypeCodeField>,
    pub name        : Option<LocalizedField>,
    pub description : Option<LocalizedField>,
    #[serde(alias = "image", alias = "photos")]
    pub images      : Option<MediaField>,
    pub videos      : Option<MediaField>,
    #[serde(alias = "audios")]
    pub audio       : Option<MediaField>,
    pub coordinates : Option<CoordinatesField>,
    pub point       : Option<CoordinatesField>,
    pub location    : Option<CoordinatesField>,
    pub latitude    : Option<LooseNumber>,
    pub longitude   : Option<LooseNumber>,
    #[serde(alias = "user_id")]
    pub created_by  : Option<RawId>,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub id          : RawId,
    pub city_id     : Option<RawId>,
    pub name        : Option<LocalizedField>,
    pub description : Option<LocalizedField>,
    #[serde(alias = "image", alias = "photos")]
    pub images      : Option<MediaField>,
    #[serde(alias = "spot_ids", alias = "points")]
    pub spots       : Option<IdListField>,
    #[serde(alias = "event_ids")]
    pub events      : Option<IdListField>,
    pub distance    : Option<LooseNumber>,
    pub duration    : Option<LooseNumber>,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EventRow {
    pub id          : RawId,
    pub city_id     : Option<RawId>,
    pub name        : Option<LocalizedField>,
    pub description : Option<LocalizedField>,
    #[serde(alias = "image", alias = "photos")]
    pub images      : Option<MediaField>,
    #[serde(alias = "time", alias = "start", alias = "start_time")]
    pub starts_at   : Option<TimestampField>,
    #[serde(alias = "end", alias = "end_time")]
    pub ends_at     : Option<TimestampField>,
    #[serde(rename = "type")]
    pub kind        : Option<FlagField>,
    #[serde(alias = "spot_ids", alias = "points")]
    pub spots       : Option<IdListField>,
    #[serde(alias = "user_id")]
    pub created_by  : Option<RawId>,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub id           : RawId,
    pub email        : Option<String>,
    #[serde(alias = "full_name", alias = "name", alias = "username")]
    pub display_name : Option<String>,
    pub avatar_url   : Option<String>,
}

/// The kind of a favorite item as stored in the `user_favorites` table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    City,
    // Older rows used the view vocabulary
    #[serde(alias = "point")]
    Spot,
    Route,
    Event,
}

impl ItemType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Spot => "spot",
            Self::Route => "route",
            Self::Event => "event",
        }
    }

    /// All names under which this type might have been stored.
    pub const fn stored_names(self) -> &'static [&'static str] {
        match self {
            Self::City => &["city"],
            Self::Spot => &["spot", "point"],
            Self::Route => &["route"],
            Self::Event => &["event"],
        }
    }
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FavoriteRow {
    pub user_id   : RawId,
    pub item_id   : RawId,
    // Kept as text so that unknown kinds don't break the whole list
    pub item_type : Value,
}

impl FavoriteRow {
    pub fn item_type(&self) -> Option<ItemType> {
        serde_json::from_value(self.item_type.clone()).ok()
    }
}

#[rustfmt::skip]
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub user_id   : String,
    pub item_id   : String,
    pub item_type : ItemType,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SpotRouteRow {
    pub spot_id  : RawId,
    pub route_id : RawId,
    #[serde(alias = "order", alias = "sort_order", alias = "sequence")]
    pub position : Option<LooseNumber>,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SpotEventRow {
    pub spot_id  : RawId,
    pub event_id : RawId,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RouteEventRow {
    pub route_id : RawId,
    pub event_id : RawId,
}

#[rustfmt::skip]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LanguageRow {
    pub code        : String,
    pub name        : Option<String>,
    pub native_name : Option<String>,
}

/// Wire form of the entity `GeoJsonPoint`, consumed by map widgets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoJsonPoint {
    #[serde(rename = "type")]
    pub kind: GeoJsonType,
    pub coordinates: [f64; 2],
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoJsonType {
    Point,
}

/// Serializable flat location.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A clickable marker of a map widget.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: String,
    pub label: String,
    pub location: Location,
    pub point: GeoJsonPoint,
    /// Navigation target when the marker is clicked
    pub href: String,
}

/// Input of a map widget.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MapWidget {
    pub center: Location,
    pub zoom: f64,
    pub markers: Vec<MapMarker>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_rows_with_mixed_shapes() {
        let row: SpotRow = serde_json::from_value(json!({
            "id": 12,
            "city_id": "c-1",
            "type": "1",
            "name": "{\"en\":\"Kashi Vishwanath\"}",
            "images": ["/a.jpg", 3],
            "coordinates": { "type": "Point", "coordinates": [83.0107, 25.3109] },
            "unknown_column": true
        }))
        .unwrap();
        assert_eq!(row.id, RawId::Number(12));
        assert_eq!(row.kind, Some(TypeCodeField::Text("1".into())));
        assert!(matches!(row.name, Some(LocalizedField::Text(_))));
        assert!(matches!(row.images, Some(MediaField::List(ref l)) if l.len() == 2));
        assert!(matches!(row.coordinates, Some(CoordinatesField::Object(_))));
    }

    #[test]
    fn null_columns_are_absent() {
        let row: CityRow = serde_json::from_value(json!({
            "id": "c-1",
            "name": null,
            "images": null
        }))
        .unwrap();
        assert!(row.name.is_none());
        assert!(row.images.is_none());
    }

    #[test]
    fn garbage_columns_do_not_break_decoding() {
        let row: EventRow = serde_json::from_value(json!({
            "id": "e-1",
            "name": 42,
            "images": { "nested": true },
            "time": [],
            "type": { "flag": true }
        }))
        .unwrap();
        assert!(matches!(row.name, Some(LocalizedField::Other(_))));
        assert!(matches!(row.images, Some(MediaField::Other(_))));
        assert!(matches!(row.starts_at, Some(TimestampField::Other(_))));
        assert!(matches!(row.kind, Some(FlagField::Other(_))));
    }

    #[test]
    fn probe_legacy_coordinate_shapes() {
        let object = json!({
            "coordinates": [],
            "latitude": "25.3",
            "longitude": 83.0
        });
        let (geo_json, flat) = LegacyCoordinates::probe(object.as_object().unwrap());
        assert_eq!(geo_json, Some(LegacyCoordinates::GeoJson { coordinates: vec![] }));
        assert_eq!(
            flat,
            Some(LegacyCoordinates::Flat {
                latitude: json!("25.3"),
                longitude: json!(83.0)
            })
        );
    }

    #[test]
    fn item_type_vocabulary() {
        let row: FavoriteRow = serde_json::from_value(json!({
            "user_id": "u", "item_id": 5, "item_type": "spot"
        }))
        .unwrap();
        assert_eq!(row.item_type(), Some(ItemType::Spot));
        let legacy: FavoriteRow = serde_json::from_value(json!({
            "user_id": "u", "item_id": 5, "item_type": "point"
        }))
        .unwrap();
        assert_eq!(legacy.item_type(), Some(ItemType::Spot));
        let unknown: FavoriteRow = serde_json::from_value(json!({
            "user_id": "u", "item_id": 5, "item_type": "hotel"
        }))
        .unwrap();
        assert_eq!(unknown.item_type(), None);
        let new = NewFavorite {
            user_id: "u".into(),
            item_id: "5".into(),
            item_type: ItemType::Spot,
        };
        assert_eq!(
            serde_json::to_value(new).unwrap(),
            json!({"user_id":"u","item_id":"5","item_type":"spot"})
        );
    }

    #[test]
    fn loose_numbers() {
        assert_eq!(LooseNumber::Text(" 12.5 ".into()).to_f64(), Some(12.5));
        assert_eq!(LooseNumber::Text("abc".into()).to_f64(), None);
        assert_eq!(loose_f64(&Value::Null), None);
        assert_eq!(loose_f64(&serde_json::json!("NaN")), None);
    }
}
