//! The authenticated user and their favorites.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use url::Url;

use crate::{
    diagnostics::DiagnosticsSink,
    entities::*,
    gateways::auth::{AuthError, AuthEvent, AuthGateway, AuthUser, Credentials, OAuthProvider},
    repositories::{self, Backend},
    usecases,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A session check or sign-in is in flight
    Loading,
    Authenticated(User),
}

impl SessionState {
    pub const fn phase(&self) -> SessionPhase {
        match self {
            Self::Unauthenticated => SessionPhase::Unauthenticated,
            Self::Loading => SessionPhase::Loading,
            Self::Authenticated(_) => SessionPhase::Authenticated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Unauthenticated,
    Loading,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTransition {
    pub from: SessionPhase,
    pub to: SessionPhase,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please sign in first")]
    NotAuthenticated,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("The favorites could not be updated: {0}")]
    Favorites(#[from] repositories::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added,
    /// The item already was a favorite
    AlreadyFavorite,
    Removed,
    /// The item was not a favorite
    NotFavorite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn,
    ConfirmationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Add,
    Remove,
}

/// A favorite change that has been applied locally
/// but not yet confirmed by the backend.
#[derive(Debug)]
#[must_use]
struct Staged {
    user_id: Id,
    kind: FavoriteKind,
    item_id: Id,
    change: Change,
}

/// Application-scoped store of the session state.
///
/// The state is only mutated through the methods of
/// this store. Every phase change is broadcast.
pub struct SessionStore {
    auth: Arc<dyn AuthGateway>,
    db: Arc<dyn Backend>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    state: RwLock<SessionState>,
    transitions: broadcast::Sender<SessionTransition>,
    // Favorite changes are applied one at a time
    mutations: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        db: Arc<dyn Backend>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        let (transitions, _) = broadcast::channel(32);
        Self {
            auth,
            db,
            diagnostics,
            state: RwLock::new(SessionState::Unauthenticated),
            transitions,
            mutations: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase()
    }

    pub fn user(&self) -> Option<User> {
        match &*self.state.read() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionTransition> {
        self.transitions.subscribe()
    }

    fn set_state(&self, next: SessionState) {
        let to = next.phase();
        let from = std::mem::replace(&mut *self.state.write(), next).phase();
        if from != to {
            log::debug!("Session {from:?} -> {to:?}");
            // Nobody might be listening
            let _ = self.transitions.send(SessionTransition { from, to });
        }
    }

    async fn enter_authenticated(&self, identity: &AuthUser) {
        self.set_state(SessionState::Loading);
        let user =
            usecases::load_user_profile(&*self.db, &*self.diagnostics, identity).await;
        log::info!("Signed in as {}", user.email);
        self.set_state(SessionState::Authenticated(user));
    }

    fn teardown(&self) {
        if self.phase() != SessionPhase::Unauthenticated {
            log::info!("Signed out");
        }
        self.set_state(SessionState::Unauthenticated);
    }

    /// Restore an existing session at start-up.
    pub async fn init(&self) {
        self.set_state(SessionState::Loading);
        match self.auth.current_session().await {
            Ok(Some(session)) => self.enter_authenticated(&session.user).await,
            Ok(None) => self.teardown(),
            Err(err) => {
                log::warn!("Unable to restore the session: {err}");
                self.teardown();
            }
        }
    }

    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<(), SessionError> {
        let previous = self.state();
        self.set_state(SessionState::Loading);
        match self.auth.sign_in_with_password(credentials).await {
            Ok(session) => {
                self.enter_authenticated(&session.user).await;
                Ok(())
            }
            Err(err) => {
                self.set_state(previous);
                Err(err.into())
            }
        }
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, SessionError> {
        let previous = self.state();
        self.set_state(SessionState::Loading);
        match self.auth.sign_up(credentials).await {
            Ok(Some(session)) => {
                self.enter_authenticated(&session.user).await;
                Ok(SignUpOutcome::SignedIn)
            }
            Ok(None) => {
                self.set_state(previous);
                Ok(SignUpOutcome::ConfirmationRequired)
            }
            Err(err) => {
                self.set_state(previous);
                Err(err.into())
            }
        }
    }

    pub fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<Url, SessionError> {
        Ok(self.auth.authorize_url(provider, redirect_to)?)
    }

    /// Sign out and clear all user data.
    ///
    /// The local state is kept if the auth service fails.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.auth.sign_out().await?;
        self.teardown();
        Ok(())
    }

    /// Apply a session change that has been pushed by the auth service.
    pub async fn apply_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                if self.phase() == SessionPhase::Loading {
                    log::debug!("Ignoring pushed session of {} while loading", session.user.email);
                    return;
                }
                let current = self.user().map(|u| u.id);
                if current.as_ref() != Some(&session.user.id) {
                    self.enter_authenticated(&session.user).await;
                }
            }
            AuthEvent::UserUpdated(identity) => {
                let mut state = self.state.write();
                if let SessionState::Authenticated(user) = &mut *state {
                    if user.id == identity.id {
                        user.email = identity.email;
                        if let Some(name) = identity.display_name {
                            user.display_name = name;
                        }
                        if identity.avatar_url.is_some() {
                            user.avatar_url = identity.avatar_url;
                        }
                    }
                }
            }
            AuthEvent::SignedOut => self.teardown(),
        }
    }

    /// Follow the events of the auth service until it goes away.
    pub async fn follow_auth_events(&self) {
        let mut events = self.auth.subscribe();
        loop {
            match events.recv().await {
                Ok(event) => self.apply_auth_event(event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("Missed {missed} auth events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Whether an item is a favorite of the signed in user.
    pub fn is_favorite(&self, kind: FavoriteKind, id: &str) -> bool {
        match &*self.state.read() {
            SessionState::Authenticated(user) => user.favorites.contains(kind, id),
            _ => false,
        }
    }

    pub async fn add_favorite(
        &self,
        kind: FavoriteKind,
        item_id: &Id,
    ) -> Result<FavoriteOutcome, SessionError> {
        let _guard = self.mutations.lock().await;
        self.apply_add(kind, item_id).await
    }

    pub async fn remove_favorite(
        &self,
        kind: FavoriteKind,
        item_id: &Id,
    ) -> Result<FavoriteOutcome, SessionError> {
        let _guard = self.mutations.lock().await;
        self.apply_remove(kind, item_id).await
    }

    /// Add or remove a favorite depending on its current state.
    pub async fn toggle_favorite(
        &self,
        kind: FavoriteKind,
        item_id: &Id,
    ) -> Result<FavoriteOutcome, SessionError> {
        let _guard = self.mutations.lock().await;
        if self.is_favorite(kind, item_id.as_str()) {
            self.apply_remove(kind, item_id).await
        } else {
            self.apply_add(kind, item_id).await
        }
    }

    async fn apply_add(
        &self,
        kind: FavoriteKind,
        item_id: &Id,
    ) -> Result<FavoriteOutcome, SessionError> {
        let Some(staged) = self.stage(kind, item_id, Change::Add)? else {
            return Ok(FavoriteOutcome::AlreadyFavorite);
        };
        let result = usecases::add_favorite(&*self.db, &staged.user_id, kind, item_id).await;
        match result {
            Ok(()) => {
                self.commit(staged);
                Ok(FavoriteOutcome::Added)
            }
            Err(repositories::Error::AlreadyExists) => {
                // Stored by another client
                self.commit(staged);
                Ok(FavoriteOutcome::AlreadyFavorite)
            }
            Err(err) => {
                self.rollback(staged);
                Err(err.into())
            }
        }
    }

    async fn apply_remove(
        &self,
        kind: FavoriteKind,
        item_id: &Id,
    ) -> Result<FavoriteOutcome, SessionError> {
        let Some(staged) = self.stage(kind, item_id, Change::Remove)? else {
            return Ok(FavoriteOutcome::NotFavorite);
        };
        let result = usecases::remove_favorite(&*self.db, &staged.user_id, kind, item_id).await;
        match result {
            Ok(_) => {
                self.commit(staged);
                Ok(FavoriteOutcome::Removed)
            }
            Err(err) => {
                self.rollback(staged);
                Err(err.into())
            }
        }
    }

    // Returns `None` if there is nothing to change.
    fn stage(
        &self,
        kind: FavoriteKind,
        item_id: &Id,
        change: Change,
    ) -> Result<Option<Staged>, SessionError> {
        let mut state = self.state.write();
        let SessionState::Authenticated(user) = &mut *state else {
            return Err(SessionError::NotAuthenticated);
        };
        let changed = match change {
            Change::Add => user.favorites.insert(kind, item_id.clone()),
            Change::Remove => user.favorites.remove(kind, item_id.as_str()),
        };
        Ok(changed.then(|| Staged {
            user_id: user.id.clone(),
            kind,
            item_id: item_id.clone(),
            change,
        }))
    }

    fn commit(&self, staged: Staged) {
        log::debug!(
            "Committed {:?} of {} {}",
            staged.change,
            staged.kind,
            staged.item_id
        );
    }

    fn rollback(&self, staged: Staged) {
        let Staged {
            user_id,
            kind,
            item_id,
            change,
        } = staged;
        log::debug!("Rolling back {change:?} of {kind} {item_id}");
        let mut state = self.state.write();
        // The user might have signed out in the meantime
        let SessionState::Authenticated(user) = &mut *state else {
            return;
        };
        if user.id != user_id {
            return;
        }
        match change {
            Change::Add => {
                user.favorites.remove(kind, item_id.as_str());
            }
            Change::Remove => {
                user.favorites.insert(kind, item_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::RecordingSink,
        usecases::tests::{session_of, MockAuth, MockBackend},
    };
    use serde_json::json;
    use std::time::Duration;
    use tirtha_boundary::tables;

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "sita@example.org".into(),
            password: password.into(),
        }
    }

    fn session_store(auth: MockAuth, db: MockBackend) -> (Arc<MockAuth>, Arc<MockBackend>, SessionStore) {
        let auth = Arc::new(auth);
        let db = Arc::new(db);
        let store = SessionStore::new(auth.clone(), db.clone(), Arc::new(RecordingSink::default()));
        (auth, db, store)
    }

    fn favorites() -> Vec<serde_json::Value> {
        vec![json!({ "user_id": "u1", "item_id": "7", "item_type": "spot" })]
    }

    fn drain(rx: &mut broadcast::Receiver<SessionTransition>) -> Vec<SessionPhase> {
        let mut phases = vec![];
        while let Ok(t) = rx.try_recv() {
            phases.push(t.to);
        }
        phases
    }

    #[tokio::test]
    async fn sign_in_loads_the_favorites() {
        let auth = MockAuth::default().with_account("u1", "sita@example.org", "secret");
        let db = MockBackend::new().with(tables::USER_FAVORITES, favorites());
        let (_, db, store) = session_store(auth, db);
        let mut rx = store.subscribe();
        assert_eq!(store.phase(), SessionPhase::Unauthenticated);

        store.sign_in_with_password(&credentials("secret")).await.unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![SessionPhase::Loading, SessionPhase::Authenticated]
        );
        assert_eq!(db.select_count(tables::USER_FAVORITES), 1);
        assert!(store.is_favorite(FavoriteKind::Point, "7"));
        assert!(!store.is_favorite(FavoriteKind::Route, "7"));
    }

    #[tokio::test]
    async fn failed_sign_in_returns_to_previous_state() {
        let auth = MockAuth::default().with_account("u1", "sita@example.org", "secret");
        let (_, _, store) = session_store(auth, MockBackend::new());
        let err = store
            .sign_in_with_password(&credentials("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Auth(AuthError::InvalidCredentials)));
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn restore_session_on_init() {
        let auth = MockAuth::default()
            .with_account("u1", "sita@example.org", "secret")
            .with_session("sita@example.org");
        let (_, _, store) = session_store(auth, MockBackend::new());
        store.init().await;
        assert_eq!(store.user().map(|u| u.id), Some(Id::from("u1")));

        let (_, _, store) = session_store(MockAuth::default(), MockBackend::new());
        store.init().await;
        assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn favorites_require_a_user() {
        let (_, db, store) = session_store(MockAuth::default(), MockBackend::new());
        for kind in FavoriteKind::ALL {
            assert!(!store.is_favorite(kind, "7"));
        }
        let err = store
            .add_favorite(FavoriteKind::City, &"c".into())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
        assert!(db.rows(tables::USER_FAVORITES).is_empty());
    }

    #[tokio::test]
    async fn adding_twice_does_not_duplicate() {
        let auth = MockAuth::default()
            .with_account("u1", "sita@example.org", "secret")
            .with_session("sita@example.org");
        let (_, db, store) = session_store(auth, MockBackend::new());
        store.init().await;
        let id = Id::from("r1");
        assert_eq!(
            store.add_favorite(FavoriteKind::Route, &id).await.unwrap(),
            FavoriteOutcome::Added
        );
        assert_eq!(
            store.add_favorite(FavoriteKind::Route, &id).await.unwrap(),
            FavoriteOutcome::AlreadyFavorite
        );
        let user = store.user().unwrap();
        assert_eq!(user.favorites.ids(FavoriteKind::Route), &[id]);
        assert_eq!(db.rows(tables::USER_FAVORITES).len(), 1);
    }

    #[tokio::test]
    async fn unique_violation_is_a_soft_success() {
        let auth = MockAuth::default()
            .with_account("u1", "sita@example.org", "secret")
            .with_session("sita@example.org");
        let (_, db, store) = session_store(auth, MockBackend::new());
        store.init().await;
        // Stored by another device after the favorites were loaded
        db.insert(
            tables::USER_FAVORITES,
            json!({ "user_id": "u1", "item_id": "c1", "item_type": "city" }),
        )
        .await
        .unwrap();
        let id = Id::from("c1");
        assert_eq!(
            store.add_favorite(FavoriteKind::City, &id).await.unwrap(),
            FavoriteOutcome::AlreadyFavorite
        );
        assert!(store.is_favorite(FavoriteKind::City, "c1"));
        assert_eq!(store.user().unwrap().favorites.len(), 1);
    }

    #[tokio::test]
    async fn roll_back_on_backend_failure() {
        let auth = MockAuth::default()
            .with_account("u1", "sita@example.org", "secret")
            .with_session("sita@example.org");
        let db = MockBackend::new().with(tables::USER_FAVORITES, favorites());
        let (_, db, store) = session_store(auth, db);
        store.init().await;
        db.fail(tables::USER_FAVORITES);

        let before = store.user().unwrap().favorites;
        assert!(store
            .add_favorite(FavoriteKind::Event, &"e1".into())
            .await
            .is_err());
        assert!(store
            .remove_favorite(FavoriteKind::Point, &"7".into())
            .await
            .is_err());
        assert_eq!(store.user().unwrap().favorites, before);

        db.recover(tables::USER_FAVORITES);
        assert_eq!(
            store
                .remove_favorite(FavoriteKind::Point, &"7".into())
                .await
                .unwrap(),
            FavoriteOutcome::Removed
        );
        assert!(!store.is_favorite(FavoriteKind::Point, "7"));
    }

    #[tokio::test]
    async fn sign_out_clears_the_user() {
        let auth = MockAuth::default()
            .with_account("u1", "sita@example.org", "secret")
            .with_session("sita@example.org");
        let db = MockBackend::new().with(tables::USER_FAVORITES, favorites());
        let (auth, _, store) = session_store(auth, db);
        store.init().await;

        *auth.fail_sign_out.lock() = true;
        assert!(store.sign_out().await.is_err());
        assert_eq!(store.phase(), SessionPhase::Authenticated);

        *auth.fail_sign_out.lock() = false;
        store.sign_out().await.unwrap();
        assert_eq!(store.state(), SessionState::Unauthenticated);
        assert!(!store.is_favorite(FavoriteKind::Point, "7"));
    }

    #[tokio::test]
    async fn follow_pushed_auth_events() {
        let (_, _, store) = session_store(MockAuth::default(), MockBackend::new());
        let identity = AuthUser {
            id: "u9".into(),
            email: "ram@example.org".into(),
            display_name: None,
            avatar_url: None,
        };
        store
            .apply_auth_event(AuthEvent::SignedIn(session_of(identity.clone())))
            .await;
        assert_eq!(store.user().unwrap().display_name, "ram");

        store
            .apply_auth_event(AuthEvent::UserUpdated(AuthUser {
                display_name: Some("Ram Das".into()),
                ..identity
            }))
            .await;
        assert_eq!(store.user().unwrap().display_name, "Ram Das");

        store.apply_auth_event(AuthEvent::SignedOut).await;
        assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn ignore_pushed_sessions_while_loading() {
        let auth = MockAuth::default().with_account("u1", "sita@example.org", "secret");
        let (_, db, store) = session_store(auth, MockBackend::new());
        store.set_state(SessionState::Loading);
        let identity = AuthUser {
            id: "u1".into(),
            email: "sita@example.org".into(),
            display_name: None,
            avatar_url: None,
        };
        store
            .apply_auth_event(AuthEvent::SignedIn(session_of(identity)))
            .await;
        assert_eq!(store.phase(), SessionPhase::Loading);
        assert_eq!(db.select_count(tables::USER_FAVORITES), 0);
    }

    #[tokio::test]
    async fn concurrent_changes_of_one_favorite_are_serialized() {
        let auth = MockAuth::default()
            .with_account("u1", "sita@example.org", "secret")
            .with_session("sita@example.org");
        let db = MockBackend::new().with_latency(Duration::from_millis(20));
        let (_, db, store) = session_store(auth, db);
        store.init().await;
        db.fail(tables::USER_FAVORITES);

        let id = Id::from("r1");
        let (first, second) = tokio::join!(
            store.add_favorite(FavoriteKind::Route, &id),
            store.add_favorite(FavoriteKind::Route, &id),
        );
        assert!(first.is_err());
        assert!(second.is_err());
        assert!(!store.is_favorite(FavoriteKind::Route, "r1"));

        db.recover(tables::USER_FAVORITES);
        let (add, remove) = tokio::join!(
            store.add_favorite(FavoriteKind::Route, &id),
            store.remove_favorite(FavoriteKind::Route, &id),
        );
        assert_eq!(add.unwrap(), FavoriteOutcome::Added);
        assert_eq!(remove.unwrap(), FavoriteOutcome::Removed);
        assert!(!store.is_favorite(FavoriteKind::Route, "r1"));
        assert!(db.rows(tables::USER_FAVORITES).is_empty());
    }

    #[tokio::test]
    async fn sign_up_requires_confirmation() {
        let (_, _, store) = session_store(MockAuth::default(), MockBackend::new());
        assert_eq!(
            store.sign_up(&credentials("secret")).await.unwrap(),
            SignUpOutcome::ConfirmationRequired
        );
        assert_eq!(store.phase(), SessionPhase::Unauthenticated);
        assert!(matches!(
            store.sign_up(&credentials("secret")).await,
            Err(SessionError::Auth(AuthError::UserExists))
        ));
    }
}
