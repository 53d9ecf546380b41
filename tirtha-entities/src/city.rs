use crate::{geo::GeoPoint, id::Id, localized::LocalizedText, media::MediaItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityCounts {
    pub points: usize,
    pub routes: usize,
    pub events: usize,
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id          : Id,
    pub name        : LocalizedText,
    pub description : LocalizedText,
    pub thumbnail   : String,
    pub media       : Vec<MediaItem>,
    // Server supplied counts or derived from the related tables.
    pub counts      : Option<CityCounts>,
    pub center      : GeoPoint,
}

impl City {
    pub fn with_counts(self, counts: CityCounts) -> Self {
        Self {
            counts: Some(counts),
            ..self
        }
    }
}
