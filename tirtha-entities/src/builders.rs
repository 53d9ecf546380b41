pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::{city_builder::*, event_builder::*, point_builder::*, route_builder::*};

fn text(s: &str) -> crate::localized::LocalizedText {
    crate::localized::LocalizedText::new(s, s, s)
}

pub mod city_builder {

    use super::*;
    use crate::{city::*, geo::*, id::*, media::*, PLACEHOLDER_IMAGE};

    #[derive(Debug)]
    pub struct CityBuild {
        city: City,
    }

    impl CityBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.city.id = id.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.city.name = text(name);
            self
        }
        pub fn center(mut self, center: GeoPoint) -> Self {
            self.city.center = center;
            self
        }
        pub fn counts(mut self, counts: CityCounts) -> Self {
            self.city.counts = Some(counts);
            self
        }
        pub fn images(mut self, urls: &[&str]) -> Self {
            self.city.media = urls
                .iter()
                .enumerate()
                .map(|(i, url)| MediaItem::image(i.to_string(), *url))
                .collect();
            self.city.thumbnail = thumbnail_of(&self.city.media);
            self
        }
        pub fn finish(self) -> City {
            self.city
        }
    }

    impl Builder for City {
        type Build = CityBuild;
        fn build() -> Self::Build {
            CityBuild {
                city: City {
                    id: Id::new(),
                    name: text("city"),
                    description: text(""),
                    thumbnail: PLACEHOLDER_IMAGE.into(),
                    media: vec![],
                    counts: None,
                    center: GeoPoint::ORIGIN,
                },
            }
        }
    }
}

pub mod point_builder {

    use super::*;
    use crate::{geo::*, id::*, point::*, PLACEHOLDER_IMAGE};

    #[derive(Debug)]
    pub struct PointBuild {
        point: Point,
    }

    impl PointBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.point.id = id.into();
            self
        }
        pub fn city_id(mut self, id: &str) -> Self {
            self.point.city_id = Some(id.into());
            self
        }
        pub fn kind(mut self, kind: PointKind) -> Self {
            self.point.kind = kind;
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.point.name = text(name);
            self
        }
        pub fn location(mut self, location: GeoPoint) -> Self {
            self.point.location = location;
            self
        }
        pub fn finish(self) -> Point {
            self.point
        }
    }

    impl Builder for Point {
        type Build = PointBuild;
        fn build() -> Self::Build {
            PointBuild {
                point: Point {
                    id: Id::new(),
                    city_id: None,
                    kind: PointKind::Other,
                    name: text("point"),
                    description: text(""),
                    thumbnail: PLACEHOLDER_IMAGE.into(),
                    media: vec![],
                    location: GeoPoint::ORIGIN,
                    route_ids: vec![],
                    event_ids: vec![],
                    created_by: None,
                },
            }
        }
    }
}

pub mod route_builder {

    use super::*;
    use crate::{id::*, route::*, PLACEHOLDER_IMAGE};

    #[derive(Debug)]
    pub struct RouteBuild {
        route: Route,
    }

    impl RouteBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.route.id = id.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.route.name = text(name);
            self
        }
        pub fn point_ids(mut self, ids: &[&str]) -> Self {
            self.route.point_ids = ids.iter().map(|id| Id::from(*id)).collect();
            self
        }
        pub fn finish(self) -> Route {
            self.route
        }
    }

    impl Builder for Route {
        type Build = RouteBuild;
        fn build() -> Self::Build {
            RouteBuild {
                route: Route {
                    id: Id::new(),
                    city_id: None,
                    name: text("route"),
                    description: text(""),
                    thumbnail: PLACEHOLDER_IMAGE.into(),
                    media: vec![],
                    point_ids: vec![],
                    event_ids: vec![],
                    distance_km: None,
                    duration_minutes: None,
                },
            }
        }
    }
}

pub mod event_builder {

    use super::*;
    use crate::{event::*, id::*, time::*, PLACEHOLDER_IMAGE};

    #[derive(Debug)]
    pub struct EventBuild {
        event: Event,
    }

    impl EventBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.event.id = id.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.event.name = text(name);
            self
        }
        pub fn schedule(mut self, schedule: EventSchedule) -> Self {
            self.event.schedule = schedule;
            self
        }
        pub fn starts_at(mut self, ts: Option<Timestamp>) -> Self {
            self.event.starts_at = ts;
            self
        }
        pub fn ends_at(mut self, ts: Option<Timestamp>) -> Self {
            self.event.ends_at = ts;
            self
        }
        pub fn finish(self) -> Event {
            self.event
        }
    }

    impl Builder for Event {
        type Build = EventBuild;
        fn build() -> Self::Build {
            EventBuild {
                event: Event {
                    id: Id::new(),
                    city_id: None,
                    name: text("event"),
                    description: text(""),
                    thumbnail: PLACEHOLDER_IMAGE.into(),
                    media: vec![],
                    starts_at: None,
                    ends_at: None,
                    schedule: EventSchedule::Calendar,
                    point_ids: vec![],
                    created_by: None,
                },
            }
        }
    }
}
