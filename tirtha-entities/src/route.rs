use crate::{id::Id, localized::LocalizedText, media::MediaItem};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id               : Id,
    pub city_id          : Option<Id>,
    pub name             : LocalizedText,
    pub description      : LocalizedText,
    pub thumbnail        : String,
    pub media            : Vec<MediaItem>,
    // Ordered itinerary
    pub point_ids        : Vec<Id>,
    pub event_ids        : Vec<Id>,
    pub distance_km      : Option<f64>,
    pub duration_minutes : Option<f64>,
}
