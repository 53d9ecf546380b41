use std::{fmt, str::FromStr};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};
use thiserror::Error;
use tirtha_core::entities::Id;
use url::form_urlencoded;

/// The sections of a city page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CityTab {
    #[default]
    Points,
    Routes,
    Events,
    Map,
}

impl CityTab {
    pub fn all() -> impl Iterator<Item = CityTab> {
        Self::iter()
    }

    pub const fn title_key(self) -> &'static str {
        match self {
            Self::Points => "city.tab.points",
            Self::Routes => "city.tab.routes",
            Self::Events => "city.tab.events",
            Self::Map => "city.tab.map",
        }
    }
}

/// A navigation target of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Auth,
    Cities,
    City { id: Id, tab: CityTab },
    Point(Id),
    Route(Id),
    Event(Id),
    Profile,
    Search(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("There is no page at '{0}'")]
    Unknown(String),
    #[error("Unknown city tab '{0}'")]
    UnknownTab(String),
}

fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// A literal '+' is encoded, so every '+' stems from a space
fn encode_segment(segment: &str) -> String {
    encode(segment).replace('+', "%20")
}

fn decode(segment: &str) -> String {
    let segment = segment.replace('+', "%2B");
    form_urlencoded::parse(format!("x={segment}").as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

impl Route {
    pub const fn city(id: Id) -> Self {
        Self::City {
            id,
            tab: CityTab::Points,
        }
    }

    /// Parse an application path like `/cities/varanasi?tab=map`.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let path = path.trim();
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let segments: Vec<_> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode)
            .collect();
        let segments: Vec<_> = segments.iter().map(String::as_str).collect();
        let unknown = || RouteError::Unknown(path.to_owned());
        let route = match segments.as_slice() {
            [] => Self::Home,
            ["auth"] => Self::Auth,
            ["cities"] => Self::Cities,
            ["cities", id] => {
                let tab = match query_param(query, "tab") {
                    Some(tab) => CityTab::from_str(&tab).map_err(|_| RouteError::UnknownTab(tab))?,
                    None => CityTab::default(),
                };
                Self::City {
                    id: (*id).into(),
                    tab,
                }
            }
            ["points", id] => Self::Point((*id).into()),
            ["routes", id] => Self::Route((*id).into()),
            ["events", id] => Self::Event((*id).into()),
            ["profile"] => Self::Profile,
            ["search"] => Self::Search(query_param(query, "q").unwrap_or_default()),
            _ => return Err(unknown()),
        };
        Ok(route)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Auth => "/auth".to_owned(),
            Self::Cities => "/cities".to_owned(),
            Self::City { id, tab } => match tab {
                CityTab::Points => format!("/cities/{}", encode_segment(id.as_str())),
                tab => format!("/cities/{}?tab={tab}", encode_segment(id.as_str())),
            },
            Self::Point(id) => format!("/points/{}", encode_segment(id.as_str())),
            Self::Route(id) => format!("/routes/{}", encode_segment(id.as_str())),
            Self::Event(id) => format!("/events/{}", encode_segment(id.as_str())),
            Self::Profile => "/profile".to_owned(),
            Self::Search(text) if text.is_empty() => "/search".to_owned(),
            Self::Search(text) => format!("/search?q={}", encode(text)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
