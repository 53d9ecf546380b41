/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point only if both axes are finite numbers.
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self::new(latitude, longitude))
    }

    /// The `(0,0)` default marks an unresolved position.
    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }

    pub const fn to_geo_json(self) -> GeoJsonPoint {
        GeoJsonPoint {
            coordinates: [self.longitude, self.latitude],
        }
    }

    /// Arithmetic mean of all given points, ignoring unresolved ones.
    pub fn centroid<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<GeoPoint> {
        let (count, lat, lng) = points
            .into_iter()
            .filter(|p| !p.is_origin())
            .fold((0usize, 0.0, 0.0), |(n, lat, lng), p| {
                (n + 1, lat + p.latitude, lng + p.longitude)
            });
        (count > 0).then(|| GeoPoint::new(lat / count as f64, lng / count as f64))
    }
}

/// GeoJSON shaped point geometry, i.e. `{"type":"Point","coordinates":[lng,lat]}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoJsonPoint {
    pub coordinates: [f64; 2],
}

impl GeoJsonPoint {
    pub const TYPE: &'static str = "Point";

    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

impl From<GeoJsonPoint> for GeoPoint {
    fn from(from: GeoJsonPoint) -> Self {
        GeoPoint::new(from.latitude(), from.longitude())
    }
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(from: GeoPoint) -> Self {
        from.to_geo_json()
    }
}
