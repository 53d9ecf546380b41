//! Plain text rendering of pages for the terminal.

use std::fmt::{self, Write as _};

use time::{format_description::FormatItem, macros::format_description};
use tirtha_core::{
    entities::{self, City, Event, EventSchedule, FavoriteKind, Id, Point, PointKind, Timestamp},
    gateways::auth::OAuthProvider,
    i18n::Translator,
    session::{SessionPhase, SessionStore},
    usecases::SearchResults,
};

use super::{
    pages::{CityTabContent, FavoriteItems, Page, ProfilePage},
    CityTab, Route,
};

const DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[day].[month].[year] [hour]:[minute] UTC");

pub fn format_date(ts: Timestamp) -> String {
    ts.as_offset_date_time()
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| ts.to_string())
}

pub const fn point_kind_key(kind: PointKind) -> &'static str {
    match kind {
        PointKind::Temple => "point.kind.temple",
        PointKind::Ashram => "point.kind.ashram",
        PointKind::Kund => "point.kind.kund",
        PointKind::Other => "point.kind.other",
    }
}

/// A page rendered in the active language.
pub struct Rendered<'a> {
    page: &'a Page,
    tr: &'a Translator,
    session: &'a SessionStore,
}

impl<'a> Rendered<'a> {
    pub fn new(page: &'a Page, tr: &'a Translator, session: &'a SessionStore) -> Self {
        Self { page, tr, session }
    }

    fn star(&self, kind: FavoriteKind, id: &Id) -> &'static str {
        if self.session.is_favorite(kind, id.as_str()) {
            "★ "
        } else {
            ""
        }
    }

    fn heading(&self, f: &mut fmt::Formatter, key: &str) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "## {}", self.tr.t(key))
    }

    fn empty(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  {}", self.tr.t("common.no_items"))
    }

    fn cities(&self, f: &mut fmt::Formatter, cities: &[City]) -> fmt::Result {
        if cities.is_empty() {
            return self.empty(f);
        }
        for city in cities {
            write!(
                f,
                "- {}{} {}",
                self.star(FavoriteKind::City, &city.id),
                self.tr.localize(&city.name),
                Route::city(city.id.clone())
            )?;
            if let Some(counts) = &city.counts {
                write!(
                    f,
                    " ({} {}, {} {}, {} {})",
                    counts.points,
                    self.tr.t("city.counts.points"),
                    counts.routes,
                    self.tr.t("city.counts.routes"),
                    counts.events,
                    self.tr.t("city.counts.events")
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn points(&self, f: &mut fmt::Formatter, points: &[Point], numbered: bool) -> fmt::Result {
        if points.is_empty() {
            return self.empty(f);
        }
        for (i, point) in points.iter().enumerate() {
            let bullet = if numbered {
                format!("{}.", i + 1)
            } else {
                "-".to_owned()
            };
            writeln!(
                f,
                "{bullet} {}{} [{}] {}",
                self.star(FavoriteKind::Point, &point.id),
                self.tr.localize(&point.name),
                self.tr.t(point_kind_key(point.kind)),
                Route::Point(point.id.clone())
            )?;
        }
        Ok(())
    }

    fn routes(&self, f: &mut fmt::Formatter, routes: &[entities::Route]) -> fmt::Result {
        if routes.is_empty() {
            return self.empty(f);
        }
        for route in routes {
            write!(
                f,
                "- {}{} {}",
                self.star(FavoriteKind::Route, &route.id),
                self.tr.localize(&route.name),
                Route::Route(route.id.clone())
            )?;
            if let Some(km) = route.distance_km {
                write!(f, " ({}: {km})", self.tr.t("route.distance"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn schedule(&self, event: &Event) -> String {
        match (event.schedule, event.starts_at) {
            (EventSchedule::Calendar, Some(start)) => format_date(start),
            (EventSchedule::Calendar, None) => self.tr.t("event.schedule.calendar").to_owned(),
            (EventSchedule::Daily, _) => self.tr.t("event.schedule.daily").to_owned(),
        }
    }

    fn events(&self, f: &mut fmt::Formatter, events: &[Event]) -> fmt::Result {
        if events.is_empty() {
            return self.empty(f);
        }
        for event in events {
            writeln!(
                f,
                "- {}{} ({}) {}",
                self.star(FavoriteKind::Event, &event.id),
                self.tr.localize(&event.name),
                self.schedule(event),
                Route::Event(event.id.clone())
            )?;
        }
        Ok(())
    }

    fn description(&self, f: &mut fmt::Formatter, text: &entities::LocalizedText) -> fmt::Result {
        let text = self.tr.localize(text);
        if !text.is_empty() {
            writeln!(f)?;
            writeln!(f, "{text}")?;
        }
        Ok(())
    }

    fn favorites(&self, f: &mut fmt::Formatter, items: &FavoriteItems) -> fmt::Result {
        self.heading(f, "profile.favorites")?;
        if items.is_empty() {
            return self.empty(f);
        }
        if !items.cities.is_empty() {
            self.cities(f, &items.cities)?;
        }
        if !items.points.is_empty() {
            self.points(f, &items.points, false)?;
        }
        if !items.routes.is_empty() {
            self.routes(f, &items.routes)?;
        }
        if !items.events.is_empty() {
            self.events(f, &items.events)?;
        }
        Ok(())
    }

    fn search(&self, f: &mut fmt::Formatter, query: &str, results: &SearchResults) -> fmt::Result {
        writeln!(f, "# {}: {query}", self.tr.t("search.query"))?;
        if query.trim().is_empty() {
            return writeln!(f, "{}", self.tr.t("search.empty_query"));
        }
        if results.is_empty() {
            return writeln!(f, "{}", self.tr.t("search.no_results"));
        }
        if !results.cities.is_empty() {
            self.heading(f, "nav.cities")?;
            self.cities(f, &results.cities)?;
        }
        if !results.points.is_empty() {
            self.heading(f, "city.tab.points")?;
            self.points(f, &results.points, false)?;
        }
        if !results.routes.is_empty() {
            self.heading(f, "city.tab.routes")?;
            self.routes(f, &results.routes)?;
        }
        if !results.events.is_empty() {
            self.heading(f, "city.tab.events")?;
            self.events(f, &results.events)?;
        }
        Ok(())
    }

    fn tabs(&self, active: CityTab) -> String {
        let mut line = String::new();
        for tab in CityTab::all() {
            let title = self.tr.t(tab.title_key());
            if tab == active {
                let _ = write!(line, "[{title}] ");
            } else {
                let _ = write!(line, " {title}  ");
            }
        }
        line.trim_end().to_owned()
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tr = self.tr;
        match self.page {
            Page::Home(page) => {
                writeln!(f, "# {}", tr.t("app.title"))?;
                writeln!(f, "{}", tr.t("home.welcome"))?;
                self.heading(f, "home.cities")?;
                self.cities(f, &page.cities)?;
                self.heading(f, "home.events")?;
                self.events(f, &page.upcoming_events)
            }
            Page::Cities(page) => {
                writeln!(f, "# {}", tr.t("nav.cities"))?;
                self.cities(f, &page.cities)
            }
            Page::City(page) => {
                let city = &page.city;
                writeln!(
                    f,
                    "# {}{}",
                    self.star(FavoriteKind::City, &city.id),
                    tr.localize(&city.name)
                )?;
                self.description(f, &city.description)?;
                writeln!(f)?;
                writeln!(f, "{}", self.tabs(page.tab))?;
                match &page.content {
                    CityTabContent::Points(points) => self.points(f, points, false),
                    CityTabContent::Routes(routes) => self.routes(f, routes),
                    CityTabContent::Events(events) => self.events(f, events),
                    CityTabContent::Map(map) => writeln!(f, "{}", map.render(tr)),
                }
            }
            Page::Point(page) => {
                let point = &page.point;
                writeln!(
                    f,
                    "# {}{}",
                    self.star(FavoriteKind::Point, &point.id),
                    tr.localize(&point.name)
                )?;
                writeln!(f, "{}", tr.t(point_kind_key(point.kind)))?;
                if let Some(city_id) = &point.city_id {
                    writeln!(f, "{}", Route::city(city_id.clone()))?;
                }
                self.description(f, &point.description)?;
                self.heading(f, "point.routes")?;
                self.routes(f, &page.routes)?;
                self.heading(f, "point.events")?;
                self.events(f, &page.events)?;
                self.heading(f, "city.tab.map")?;
                writeln!(f, "{}", page.map.render(tr))
            }
            Page::Route(page) => {
                let route = &page.route;
                writeln!(
                    f,
                    "# {}{}",
                    self.star(FavoriteKind::Route, &route.id),
                    tr.localize(&route.name)
                )?;
                if let Some(km) = route.distance_km {
                    writeln!(f, "{}: {km}", tr.t("route.distance"))?;
                }
                if let Some(minutes) = route.duration_minutes {
                    writeln!(f, "{}: {minutes}", tr.t("route.duration"))?;
                }
                self.description(f, &route.description)?;
                self.heading(f, "route.points")?;
                self.points(f, &page.points, true)?;
                self.heading(f, "route.events")?;
                self.events(f, &page.events)?;
                self.heading(f, "city.tab.map")?;
                writeln!(f, "{}", page.map.render(tr))
            }
            Page::Event(page) => {
                let event = &page.event;
                writeln!(
                    f,
                    "# {}{}",
                    self.star(FavoriteKind::Event, &event.id),
                    tr.localize(&event.name)
                )?;
                writeln!(f, "{}", self.schedule(event))?;
                if event.schedule.is_calendar() {
                    if let Some(end) = event.ends_at {
                        writeln!(f, "{}: {}", tr.t("event.ends"), format_date(end))?;
                    }
                }
                if page.is_past {
                    writeln!(f, "{}", tr.t("event.past"))?;
                }
                self.description(f, &event.description)?;
                self.heading(f, "event.points")?;
                self.points(f, &page.points, false)
            }
            Page::Profile(ProfilePage::SignInRequired) => {
                writeln!(f, "{}", tr.t("profile.sign_in_required"))?;
                writeln!(f, "{}", Route::Auth)
            }
            Page::Profile(ProfilePage::User {
                user,
                favorites,
                owned_points,
                owned_events,
            }) => {
                writeln!(f, "# {}", user.display_name)?;
                writeln!(f, "{}", user.email)?;
                self.favorites(f, favorites)?;
                if !owned_points.is_empty() {
                    self.heading(f, "profile.owned_points")?;
                    self.points(f, owned_points, false)?;
                }
                if !owned_events.is_empty() {
                    self.heading(f, "profile.owned_events")?;
                    self.events(f, owned_events)?;
                }
                Ok(())
            }
            Page::Search(page) => self.search(f, &page.query, &page.results),
            Page::Auth(page) => {
                writeln!(f, "# {}", tr.t("nav.auth"))?;
                match (&page.phase, &page.user) {
                    (SessionPhase::Authenticated, Some(user)) => {
                        writeln!(f, "{}: {}", tr.t("auth.signed_in"), user.email)
                    }
                    (SessionPhase::Loading, _) => writeln!(f, "{}", tr.t("common.loading")),
                    _ => {
                        for (provider, url) in &page.oauth {
                            let key = match provider {
                                OAuthProvider::Google => "auth.google",
                                OAuthProvider::Apple => "auth.apple",
                            };
                            writeln!(f, "- {}: {url}", tr.t(key))?;
                        }
                        Ok(())
                    }
                }
            }
            Page::NotFound(route) => writeln!(f, "{}: {route}", tr.t("common.not_found")),
        }
    }
}
