use tirtha_boundary::{GeoJsonPoint, Location, MapMarker, MapWidget};
use tirtha_core::{
    entities::{GeoPoint, Language, Point},
    i18n::Translator,
};

use super::Route;

/// What a map section shows.
#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    /// The map provider requires an access token.
    TokenRequired,
    /// None of the items has a known position.
    NoLocations,
    Ready { token: String, widget: MapWidget },
}

impl MapView {
    /// Place a marker for every point with a known position.
    ///
    /// The map is centered on `center` if known and on
    /// the centroid of the markers otherwise.
    pub fn of_points(
        token: Option<String>,
        points: &[Point],
        center: Option<GeoPoint>,
        zoom: f64,
        language: Language,
    ) -> Self {
        let Some(token) = token else {
            return Self::TokenRequired;
        };
        let located: Vec<_> = points.iter().filter(|p| !p.location.is_origin()).collect();
        let center = center
            .filter(|c| !c.is_origin())
            .or_else(|| GeoPoint::centroid(located.iter().map(|p| &p.location)));
        let Some(center) = center else {
            return Self::NoLocations;
        };
        let markers = located
            .into_iter()
            .map(|point| MapMarker {
                id: point.id.to_string(),
                label: point.name.get(language).to_owned(),
                location: Location::from(point.location),
                point: GeoJsonPoint::from(point.geo_json()),
                href: Route::Point(point.id.clone()).path(),
            })
            .collect();
        Self::Ready {
            token,
            widget: MapWidget {
                center: center.into(),
                zoom,
                markers,
            },
        }
    }

    pub fn markers(&self) -> &[MapMarker] {
        match self {
            Self::Ready { widget, .. } => &widget.markers,
            _ => &[],
        }
    }

    /// The route a click on a marker leads to.
    pub fn click(&self, marker_id: &str) -> Option<Route> {
        self.markers()
            .iter()
            .find(|m| m.id == marker_id)
            .and_then(|m| Route::parse(&m.href).ok())
    }

    pub fn render(&self, tr: &Translator) -> String {
        match self {
            Self::TokenRequired => tr.t("map.token_required").to_owned(),
            Self::NoLocations => tr.t("common.no_items").to_owned(),
            Self::Ready { widget, .. } => {
                let mut lines = vec![format!(
                    "({:.4}, {:.4}) zoom {}",
                    widget.center.latitude, widget.center.longitude, widget.zoom
                )];
                lines.extend(widget.markers.iter().map(|m| {
                    format!(
                        "  ◉ {} ({:.4}, {:.4}) {}",
                        m.label, m.location.latitude, m.location.longitude, m.href
                    )
                }));
                lines.join("\n")
            }
        }
    }
}
