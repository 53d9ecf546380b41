use crate::{id::Id, localized::LocalizedText, media::MediaItem, time::Timestamp};

/// Distinguishes dated events from daily recurring ones.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventSchedule {
    /// Happens at a specific date (e.g. a festival).
    Calendar,
    /// Recurs every day (e.g. an evening aarti).
    Daily,
}

impl EventSchedule {
    /// The backend stores the schedule as a boolean `type` flag.
    pub const fn from_flag(is_calendar: bool) -> Self {
        if is_calendar {
            Self::Calendar
        } else {
            Self::Daily
        }
    }

    pub const fn is_calendar(self) -> bool {
        matches!(self, Self::Calendar)
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id          : Id,
    pub city_id     : Option<Id>,
    pub name        : LocalizedText,
    pub description : LocalizedText,
    pub thumbnail   : String,
    pub media       : Vec<MediaItem>,
    pub starts_at   : Option<Timestamp>,
    pub ends_at     : Option<Timestamp>,
    pub schedule    : EventSchedule,
    pub point_ids   : Vec<Id>,
    pub created_by  : Option<Id>,
}

impl Event {
    /// Calendar events that have already ended are considered past.
    pub fn is_past(&self, now: Timestamp) -> bool {
        if !self.schedule.is_calendar() {
            return false;
        }
        match (self.ends_at, self.starts_at) {
            (Some(end), _) => end < now,
            (None, Some(start)) => start < now,
            (None, None) => false,
        }
    }
}
