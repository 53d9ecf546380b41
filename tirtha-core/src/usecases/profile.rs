use tirtha_boundary::{FavoriteRow, ProfileRow, RecordKind};

use super::prelude::*;
use crate::gateways::auth::AuthUser;

/// Load everything the session needs to know about a signed in user.
///
/// Profile data that cannot be loaded is replaced by the
/// data of the auth service.
pub async fn load_user_profile(
    db: &dyn Backend,
    sink: &dyn DiagnosticsSink,
    identity: &AuthUser,
) -> User {
    let user_id = identity.id.as_str();
    let profile_query = Select::table(tables::PROFILES).eq(tables::ID, user_id);
    let favorites_query = Select::table(tables::USER_FAVORITES).eq(tables::USER_ID, user_id);
    let owned_points_query = Select::table(tables::SPOTS)
        .columns(&[tables::ID])
        .eq(tables::CREATED_BY, user_id);
    let owned_events_query = Select::table(tables::EVENTS)
        .columns(&[tables::ID])
        .eq(tables::CREATED_BY, user_id);
    let (profile, favorites, owned_points, owned_events) = tokio::join!(
        select_single(db, &profile_query),
        select_rows(db, &favorites_query),
        select_rows(db, &owned_points_query),
        select_rows(db, &owned_events_query),
    );

    let mut user = User::new(identity.id.clone(), identity.email.clone());
    let profile = profile.and_then(|value| decode::<ProfileRow>(sink, RecordKind::Profile, value));
    let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
    if let Some(name) = non_blank(profile.as_ref().and_then(|p| p.display_name.clone()))
        .or_else(|| non_blank(identity.display_name.clone()))
    {
        user.display_name = name;
    }
    user.avatar_url = non_blank(profile.as_ref().and_then(|p| p.avatar_url.clone()))
        .or_else(|| non_blank(identity.avatar_url.clone()));
    if user.email.trim().is_empty() {
        if let Some(email) = non_blank(profile.and_then(|p| p.email)) {
            user.display_name = default_display_name(&email);
            user.email = email;
        }
    }

    user.favorites = favorites
        .into_iter()
        .filter_map(|value| decode::<FavoriteRow>(sink, RecordKind::Favorite, value))
        .filter_map(|row| match row.try_into_favorite() {
            Ok(favorite) => Some(favorite),
            Err(diagnostic) => {
                sink.report(diagnostic);
                None
            }
        })
        .collect();
    user.owned_points = ids_of(owned_points, tables::ID);
    user.owned_events = ids_of(owned_events, tables::ID);
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::tests::*;
    use serde_json::json;

    fn identity() -> AuthUser {
        AuthUser {
            id: "u1".into(),
            email: "sita@example.org".into(),
            display_name: None,
            avatar_url: Some("/me.png".into()),
        }
    }

    #[tokio::test]
    async fn load_profile_favorites_and_ownership() {
        let db = MockBackend::new()
            .with(
                tables::PROFILES,
                vec![json!({ "id": "u1", "full_name": "Sita Devi", "avatar_url": null })],
            )
            .with(
                tables::USER_FAVORITES,
                vec![
                    json!({ "user_id": "u1", "item_id": 5, "item_type": "spot" }),
                    json!({ "user_id": "u1", "item_id": "c1", "item_type": "city" }),
                    json!({ "user_id": "u1", "item_id": "h", "item_type": "hotel" }),
                    json!({ "user_id": "u2", "item_id": "r", "item_type": "route" }),
                ],
            )
            .with(
                tables::SPOTS,
                vec![json!({ "id": 5, "created_by": "u1" }), json!({ "id": 6 })],
            );
        let sink = sink();
        let user = load_user_profile(&db, &sink, &identity()).await;
        assert_eq!(user.display_name, "Sita Devi");
        assert_eq!(user.avatar_url.as_deref(), Some("/me.png"));
        assert!(user.favorites.contains(FavoriteKind::Point, "5"));
        assert!(user.favorites.contains(FavoriteKind::City, "c1"));
        assert!(user.favorites.ids(FavoriteKind::Route).is_empty());
        assert_eq!(user.favorites.len(), 2);
        assert_eq!(user.owned_points, vec![Id::from("5")]);
        assert!(user.owned_events.is_empty());
        assert_eq!(sink.filter_by_record(RecordKind::Favorite).len(), 1);
    }

    #[tokio::test]
    async fn missing_profile_falls_back_to_identity() {
        let db = MockBackend::new();
        db.fail(tables::PROFILES);
        let user = load_user_profile(&db, &sink(), &identity()).await;
        assert_eq!(user.display_name, "sita");
        assert!(user.favorites.is_empty());
    }
}
