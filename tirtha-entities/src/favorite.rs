use strum::{Display, EnumString, IntoStaticStr};

use crate::id::Id;

/// The kinds of items a user can mark as favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FavoriteKind {
    City,
    Point,
    Route,
    Event,
}

impl FavoriteKind {
    pub const ALL: [FavoriteKind; 4] = [Self::City, Self::Point, Self::Route, Self::Event];
}

/// Favorite item ids partitioned by kind.
///
/// Every kind is an independent list without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    cities: Vec<Id>,
    points: Vec<Id>,
    routes: Vec<Id>,
    events: Vec<Id>,
}

impl Favorites {
    pub fn ids(&self, kind: FavoriteKind) -> &[Id] {
        match kind {
            FavoriteKind::City => &self.cities,
            FavoriteKind::Point => &self.points,
            FavoriteKind::Route => &self.routes,
            FavoriteKind::Event => &self.events,
        }
    }

    fn ids_mut(&mut self, kind: FavoriteKind) -> &mut Vec<Id> {
        match kind {
            FavoriteKind::City => &mut self.cities,
            FavoriteKind::Point => &mut self.points,
            FavoriteKind::Route => &mut self.routes,
            FavoriteKind::Event => &mut self.events,
        }
    }

    pub fn contains(&self, kind: FavoriteKind, id: &str) -> bool {
        self.ids(kind).iter().any(|x| x.as_str() == id)
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, kind: FavoriteKind, id: Id) -> bool {
        if self.contains(kind, id.as_str()) {
            return false;
        }
        self.ids_mut(kind).push(id);
        true
    }

    /// Returns `false` if the id was not present.
    pub fn remove(&mut self, kind: FavoriteKind, id: &str) -> bool {
        let ids = self.ids_mut(kind);
        let len = ids.len();
        ids.retain(|x| x.as_str() != id);
        ids.len() != len
    }

    pub fn is_empty(&self) -> bool {
        FavoriteKind::ALL.iter().all(|kind| self.ids(*kind).is_empty())
    }

    pub fn len(&self) -> usize {
        FavoriteKind::ALL.iter().map(|kind| self.ids(*kind).len()).sum()
    }
}

impl FromIterator<(FavoriteKind, Id)> for Favorites {
    fn from_iter<T: IntoIterator<Item = (FavoriteKind, Id)>>(iter: T) -> Self {
        let mut favorites = Self::default();
        for (kind, id) in iter {
            favorites.insert(kind, id);
        }
        favorites
    }
}
