use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    geo::{GeoJsonPoint, GeoPoint},
    id::Id,
    localized::LocalizedText,
    media::MediaItem,
};

/// Category of a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PointKind {
    Temple,
    Ashram,
    Kund,
    Other,
}

impl PointKind {
    /// Map the numeric type code stored in the backend.
    ///
    /// The codes are zero based: `0` is a temple, `1` an ashram
    /// and `2` a kund. Every other code is [`PointKind::Other`].
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Temple,
            1 => Self::Ashram,
            2 => Self::Kund,
            _ => Self::Other,
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::Temple => 0,
            Self::Ashram => 1,
            Self::Kund => 2,
            Self::Other => 3,
        }
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id          : Id,
    pub city_id     : Option<Id>,
    pub kind        : PointKind,
    pub name        : LocalizedText,
    pub description : LocalizedText,
    pub thumbnail   : String,
    pub media       : Vec<MediaItem>,
    pub location    : GeoPoint,
    // Back references are only populated if the point
    // has been loaded in the context of a relation.
    pub route_ids   : Vec<Id>,
    pub event_ids   : Vec<Id>,
    pub created_by  : Option<Id>,
}

impl Point {
    pub const fn geo_json(&self) -> GeoJsonPoint {
        self.location.to_geo_json()
    }
}
