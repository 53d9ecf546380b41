use crate::{favorite::Favorites, id::Id};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id           : Id,
    pub email        : String,
    pub display_name : String,
    pub avatar_url   : Option<String>,
    pub favorites    : Favorites,
    pub owned_points : Vec<Id>,
    pub owned_events : Vec<Id>,
}

impl User {
    /// A user without profile data yet.
    pub fn new(id: Id, email: String) -> Self {
        let display_name = default_display_name(&email);
        Self {
            id,
            email,
            display_name,
            avatar_url: None,
            favorites: Favorites::default(),
            owned_points: vec![],
            owned_events: vec![],
        }
    }
}

/// Derive a display name from the local part of an email address.
pub fn default_display_name(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or(email)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_from_email() {
        assert_eq!(default_display_name("sita@example.org"), "sita");
        assert_eq!(default_display_name("@example.org"), "@example.org");
        assert_eq!(default_display_name("ram"), "ram");
    }
}
