//! Page containers.
//!
//! A page issues its queries through the catalog, running independent
//! ones concurrently, and keeps the loaded entities for rendering.

use std::sync::Arc;

use tirtha_core::{
    entities::{self, City, Event, FavoriteKind, Id, Point, Timestamp, User},
    gateways::auth::OAuthProvider,
    session::SessionPhase,
    usecases::SearchResults,
};
use url::Url;

use super::{map::MapView, CityTab, Route};
use crate::app::App;

/// Number of upcoming events shown on the home page.
pub const HOME_EVENTS: usize = 5;

#[derive(Debug, Clone)]
pub struct HomePage {
    pub cities: Arc<Vec<City>>,
    pub upcoming_events: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct CitiesPage {
    pub cities: Arc<Vec<City>>,
}

#[derive(Debug, Clone)]
pub enum CityTabContent {
    Points(Arc<Vec<Point>>),
    Routes(Arc<Vec<entities::Route>>),
    Events(Arc<Vec<Event>>),
    Map(MapView),
}

#[derive(Debug, Clone)]
pub struct CityPage {
    pub city: City,
    pub tab: CityTab,
    pub content: CityTabContent,
}

#[derive(Debug, Clone)]
pub struct PointPage {
    pub point: Point,
    pub routes: Arc<Vec<entities::Route>>,
    pub events: Arc<Vec<Event>>,
    pub map: MapView,
}

#[derive(Debug, Clone)]
pub struct RoutePage {
    pub route: entities::Route,
    /// The stops in the order of the route
    pub points: Arc<Vec<Point>>,
    pub events: Arc<Vec<Event>>,
    pub map: MapView,
}

#[derive(Debug, Clone)]
pub struct EventPage {
    pub event: Event,
    pub points: Arc<Vec<Point>>,
    pub is_past: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FavoriteItems {
    pub cities: Arc<Vec<City>>,
    pub points: Arc<Vec<Point>>,
    pub routes: Arc<Vec<entities::Route>>,
    pub events: Arc<Vec<Event>>,
}

impl FavoriteItems {
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
            && self.points.is_empty()
            && self.routes.is_empty()
            && self.events.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum ProfilePage {
    SignInRequired,
    User {
        user: User,
        favorites: FavoriteItems,
        owned_points: Arc<Vec<Point>>,
        owned_events: Arc<Vec<Event>>,
    },
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub query: String,
    pub results: Arc<SearchResults>,
}

#[derive(Debug, Clone)]
pub struct AuthPage {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub oauth: Vec<(OAuthProvider, Url)>,
}

#[derive(Debug, Clone)]
pub enum Page {
    Home(HomePage),
    Cities(CitiesPage),
    City(CityPage),
    Point(PointPage),
    Route(RoutePage),
    Event(EventPage),
    Profile(ProfilePage),
    Search(SearchPage),
    Auth(AuthPage),
    /// The requested entity does not exist
    NotFound(Route),
}

impl Page {
    pub async fn load(app: &App, route: &Route) -> Self {
        log::debug!("Loading {route}");
        match route {
            Route::Home => Self::Home(load_home(app).await),
            Route::Cities => Self::Cities(CitiesPage {
                cities: app.catalog.cities().await,
            }),
            Route::City { id, tab } => load_city(app, id, *tab)
                .await
                .map_or_else(|| Self::NotFound(route.clone()), Self::City),
            Route::Point(id) => load_point(app, id)
                .await
                .map_or_else(|| Self::NotFound(route.clone()), Self::Point),
            Route::Route(id) => load_route(app, id)
                .await
                .map_or_else(|| Self::NotFound(route.clone()), Self::Route),
            Route::Event(id) => load_event(app, id)
                .await
                .map_or_else(|| Self::NotFound(route.clone()), Self::Event),
            Route::Profile => Self::Profile(load_profile(app).await),
            Route::Search(query) => Self::Search(SearchPage {
                query: query.clone(),
                results: app.catalog.search(query).await,
            }),
            Route::Auth => Self::Auth(load_auth(app)),
        }
    }

    /// The item a favorite toggle on this page refers to.
    pub fn favorite_target(&self) -> Option<(FavoriteKind, Id)> {
        match self {
            Self::City(page) => Some((FavoriteKind::City, page.city.id.clone())),
            Self::Point(page) => Some((FavoriteKind::Point, page.point.id.clone())),
            Self::Route(page) => Some((FavoriteKind::Route, page.route.id.clone())),
            Self::Event(page) => Some((FavoriteKind::Event, page.event.id.clone())),
            _ => None,
        }
    }
}

async fn load_home(app: &App) -> HomePage {
    let (cities, events) = tokio::join!(app.catalog.cities(), app.catalog.events());
    let now = Timestamp::now();
    let upcoming_events = events
        .iter()
        .filter(|e| !e.is_past(now))
        .take(HOME_EVENTS)
        .cloned()
        .collect();
    HomePage {
        cities,
        upcoming_events,
    }
}

async fn load_city(app: &App, id: &Id, tab: CityTab) -> Option<CityPage> {
    let catalog = &app.catalog;
    // Only the active tab is queried
    let content = async {
        match tab {
            CityTab::Routes => CityTabContent::Routes(catalog.routes_by_city(id.as_str()).await),
            CityTab::Events => CityTabContent::Events(catalog.events_by_city(id.as_str()).await),
            CityTab::Points | CityTab::Map => {
                CityTabContent::Points(catalog.points_by_city(id.as_str()).await)
            }
        }
    };
    let (city, content) = tokio::join!(catalog.city(id.as_str()), content);
    let city = Option::clone(&city)?;
    let content = match (tab, content) {
        (CityTab::Map, CityTabContent::Points(points)) => CityTabContent::Map(MapView::of_points(
            app.map_token(),
            &points,
            Some(city.center),
            app.map.zoom,
            app.translator.language(),
        )),
        (_, content) => content,
    };
    Some(CityPage { city, tab, content })
}

async fn load_point(app: &App, id: &Id) -> Option<PointPage> {
    let catalog = &app.catalog;
    let (point, routes, events) = tokio::join!(
        catalog.point(id.as_str()),
        catalog.routes_by_point(id.as_str()),
        catalog.events_by_point(id.as_str()),
    );
    let point = Option::clone(&point)?;
    let map = MapView::of_points(
        app.map_token(),
        std::slice::from_ref(&point),
        None,
        app.map.detail_zoom,
        app.translator.language(),
    );
    Some(PointPage {
        point,
        routes,
        events,
        map,
    })
}

async fn load_route(app: &App, id: &Id) -> Option<RoutePage> {
    let catalog = &app.catalog;
    let (route, points, events) = tokio::join!(
        catalog.route(id.as_str()),
        catalog.points_by_route(id.as_str()),
        catalog.events_by_route(id.as_str()),
    );
    let route = Option::clone(&route)?;
    let map = MapView::of_points(
        app.map_token(),
        &points,
        None,
        app.map.zoom,
        app.translator.language(),
    );
    Some(RoutePage {
        route,
        points,
        events,
        map,
    })
}

async fn load_event(app: &App, id: &Id) -> Option<EventPage> {
    let catalog = &app.catalog;
    let (event, points) = tokio::join!(
        catalog.event(id.as_str()),
        catalog.points_by_event(id.as_str()),
    );
    let event = Option::clone(&event)?;
    let is_past = event.is_past(Timestamp::now());
    Some(EventPage {
        event,
        points,
        is_past,
    })
}

async fn load_profile(app: &App) -> ProfilePage {
    let Some(user) = app.session.user() else {
        return ProfilePage::SignInRequired;
    };
    let catalog = &app.catalog;
    let favorites = &user.favorites;
    let (cities, points, routes, events, owned_points, owned_events) = tokio::join!(
        catalog.cities_by_ids(favorites.ids(FavoriteKind::City)),
        catalog.points_by_ids(favorites.ids(FavoriteKind::Point)),
        catalog.routes_by_ids(favorites.ids(FavoriteKind::Route)),
        catalog.events_by_ids(favorites.ids(FavoriteKind::Event)),
        catalog.points_by_ids(&user.owned_points),
        catalog.events_by_ids(&user.owned_events),
    );
    ProfilePage::User {
        favorites: FavoriteItems {
            cities,
            points,
            routes,
            events,
        },
        owned_points,
        owned_events,
        user,
    }
}

fn load_auth(app: &App) -> AuthPage {
    let oauth = [OAuthProvider::Google, OAuthProvider::Apple]
        .into_iter()
        .filter_map(|provider| match app.session.oauth_authorize_url(provider, None) {
            Ok(url) => Some((provider, url)),
            Err(err) => {
                log::warn!("No sign-in with {}: {err}", provider.as_str());
                None
            }
        })
        .collect();
    AuthPage {
        phase: app.session.phase(),
        user: app.session.user(),
        oauth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use tirtha_core::{
        cache::QueryKind,
        entities::{Language, PointKind},
        gateways::auth::Credentials,
    };

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &Id) -> Vec<String> {
        items.iter().map(|i| id(i).to_string()).collect()
    }

    #[tokio::test]
    async fn home_lists_cities_and_events() {
        let (_, app) = test_app();
        let Page::Home(page) = Page::load(&app, &Route::Home).await else {
            panic!("expected the home page");
        };
        assert_eq!(ids(&page.cities, |c| &c.id), ["vns", "mtr"]);
        assert_eq!(ids(&page.upcoming_events, |e| &e.id), ["e1"]);
    }

    #[tokio::test]
    async fn city_queries_only_the_active_tab() {
        let (_, app) = test_app();
        let route = Route::City {
            id: "vns".into(),
            tab: CityTab::Routes,
        };
        let Page::City(page) = Page::load(&app, &route).await else {
            panic!("expected a city page");
        };
        assert_eq!(page.city.name.get(Language::Ru), "Варанаси");
        let CityTabContent::Routes(routes) = &page.content else {
            panic!("expected routes");
        };
        assert_eq!(ids(routes, |r| &r.id), ["r1"]);
        let kinds: Vec<_> = app.catalog.take_touched().into_iter().map(|k| k.kind).collect();
        assert!(kinds.contains(&QueryKind::RoutesByCity));
        assert!(!kinds.contains(&QueryKind::PointsByCity));
        assert!(!kinds.contains(&QueryKind::EventsByCity));
    }

    #[tokio::test]
    async fn city_map_requires_a_token() {
        let (_, app) = test_app();
        let route = Route::City {
            id: "vns".into(),
            tab: CityTab::Map,
        };
        let Page::City(page) = Page::load(&app, &route).await else {
            panic!("expected a city page");
        };
        assert!(matches!(page.content, CityTabContent::Map(MapView::TokenRequired)));

        app.set_map_token("pk.test").unwrap();
        let Page::City(page) = Page::load(&app, &route).await else {
            panic!("expected a city page");
        };
        let CityTabContent::Map(map) = &page.content else {
            panic!("expected a map");
        };
        assert_eq!(map.markers().len(), 2);
    }

    #[tokio::test]
    async fn route_lists_stops_in_order() {
        let (_, app) = test_app();
        let Page::Route(page) = Page::load(&app, &Route::Route("r1".into())).await else {
            panic!("expected a route page");
        };
        assert_eq!(ids(&page.points, |p| &p.id), ["1", "2"]);
        assert_eq!(page.route.distance_km, Some(80.0));
        assert!(page.events.is_empty());
    }

    #[tokio::test]
    async fn point_with_relations() {
        let (_, app) = test_app();
        let Page::Point(page) = Page::load(&app, &Route::Point("1".into())).await else {
            panic!("expected a point page");
        };
        assert_eq!(page.point.kind, PointKind::Temple);
        assert_eq!(ids(&page.routes, |r| &r.id), ["r1"]);
        assert_eq!(ids(&page.events, |e| &e.id), ["e1"]);
        assert_eq!(
            Page::Point(page).favorite_target(),
            Some((FavoriteKind::Point, "1".into()))
        );
    }

    #[tokio::test]
    async fn missing_entities() {
        let (_, app) = test_app();
        for route in [
            Route::city("nowhere".into()),
            Route::Point("99".into()),
            Route::Event("e9".into()),
        ] {
            assert!(matches!(Page::load(&app, &route).await, Page::NotFound(r) if r == route));
        }
    }

    #[tokio::test]
    async fn profile_of_the_signed_in_user() {
        let (_, app) = test_app();
        assert!(matches!(
            Page::load(&app, &Route::Profile).await,
            Page::Profile(ProfilePage::SignInRequired)
        ));
        app.session
            .sign_in_with_password(&Credentials {
                email: "sita@example.org".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        app.session
            .add_favorite(FavoriteKind::Point, &"2".into())
            .await
            .unwrap();
        let Page::Profile(ProfilePage::User { user, favorites, .. }) =
            Page::load(&app, &Route::Profile).await
        else {
            panic!("expected a profile");
        };
        assert_eq!(user.email, "sita@example.org");
        assert_eq!(ids(&favorites.points, |p| &p.id), ["2"]);
        assert!(favorites.cities.is_empty());
    }

    #[tokio::test]
    async fn search_in_all_languages() {
        let (_, app) = test_app();
        let Page::Search(page) = Page::load(&app, &Route::Search("кунд".into())).await else {
            panic!("expected search results");
        };
        assert_eq!(ids(&page.results.points, |p| &p.id), ["2"]);
        assert_eq!(page.results.len(), 1);
    }

    #[tokio::test]
    async fn auth_offers_oauth_providers() {
        let (_, app) = test_app();
        let Page::Auth(page) = Page::load(&app, &Route::Auth).await else {
            panic!("expected the auth page");
        };
        assert_eq!(page.phase, SessionPhase::Unauthenticated);
        assert_eq!(page.oauth.len(), 2);
        assert_eq!(page.oauth[0].1.query(), Some("provider=google"));
    }
}
