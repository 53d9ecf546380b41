use tirtha_boundary::{ItemType, NewFavorite};

use super::prelude::*;
use crate::repositories::{Error, Result};

/// Store a favorite of a user.
///
/// Fails with [`Error::AlreadyExists`] if the item is already a favorite.
pub async fn add_favorite(
    db: &dyn Backend,
    user_id: &Id,
    kind: FavoriteKind,
    item_id: &Id,
) -> Result<()> {
    let row = NewFavorite {
        user_id: user_id.to_string(),
        item_id: item_id.to_string(),
        item_type: kind.into(),
    };
    let row = serde_json::to_value(row).map_err(|err| Error::Other(err.into()))?;
    db.insert(tables::USER_FAVORITES, row).await
}

/// Delete a favorite of a user and return whether it existed.
pub async fn remove_favorite(
    db: &dyn Backend,
    user_id: &Id,
    kind: FavoriteKind,
    item_id: &Id,
) -> Result<bool> {
    let item_types = ItemType::from(kind).stored_names();
    let filters = [
        Filter::Eq(tables::USER_ID, user_id.to_string()),
        Filter::Eq(tables::ITEM_ID, item_id.to_string()),
        Filter::In(
            tables::ITEM_TYPE,
            item_types.iter().map(ToString::to_string).collect(),
        ),
    ];
    let deleted = db.delete(tables::USER_FAVORITES, &filters).await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::tests::*;
    use serde_json::json;

    #[tokio::test]
    async fn favorites_use_the_persistence_vocabulary() {
        let db = MockBackend::new();
        let user = Id::from("u1");
        add_favorite(&db, &user, FavoriteKind::Point, &"5".into())
            .await
            .unwrap();
        assert_eq!(
            db.rows(tables::USER_FAVORITES),
            vec![json!({ "user_id": "u1", "item_id": "5", "item_type": "spot" })]
        );
        assert!(matches!(
            add_favorite(&db, &user, FavoriteKind::Point, &"5".into()).await,
            Err(Error::AlreadyExists)
        ));
        assert!(!remove_favorite(&db, &user, FavoriteKind::Route, &"5".into())
            .await
            .unwrap());
        assert!(remove_favorite(&db, &user, FavoriteKind::Point, &"5".into())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn remove_legacy_rows() {
        let db = MockBackend::new().with(
            tables::USER_FAVORITES,
            vec![json!({ "user_id": "u1", "item_id": "5", "item_type": "point" })],
        );
        assert!(remove_favorite(&db, &"u1".into(), FavoriteKind::Point, &"5".into())
            .await
            .unwrap());
        assert!(db.rows(tables::USER_FAVORITES).is_empty());
    }
}
