mod map;
mod navigator;
mod notice;
mod pages;
mod render;
mod route;

pub use self::{
    map::MapView,
    navigator::Navigator,
    notice::{Level, Notice},
    pages::*,
    render::{format_date, Rendered},
    route::{CityTab, Route, RouteError},
};
