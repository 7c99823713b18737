//! Locate and persist the current user record.

use crate::model::User;
use crate::storage::{Scope, SessionStore, keys};

/// Lookup order when both scopes somehow hold a record.
const LOOKUP_ORDER: [Scope; 2] = [Scope::Durable, Scope::Session];

#[derive(Clone, Debug)]
pub struct UserRepository {
    store: SessionStore,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Whether any scope holds a serialized record, even an unreadable one.
    pub async fn exists(&self) -> bool {
        for scope in LOOKUP_ORDER {
            if self.store.contains(scope, keys::CURRENT_USER).await {
                return true;
            }
        }
        false
    }

    /// Find the current user and the scope holding it.
    pub async fn locate(&self) -> Option<(Scope, User)> {
        for scope in LOOKUP_ORDER {
            if let Some(user) = self.store.read::<User>(scope, keys::CURRENT_USER).await {
                return Some((scope, user));
            }
        }
        None
    }

    /// Write `user` into `scope`.
    pub async fn save(&self, scope: Scope, user: &User) -> bool {
        self.store.write(scope, keys::CURRENT_USER, user).await
    }

    /// Write `user` into `scope` and drop any copy left in the other one.
    pub async fn replace(&self, scope: Scope, user: &User) -> bool {
        self.save(scope, user).await && self.store.remove(scope.other(), keys::CURRENT_USER).await
    }

    /// Remove the record and cached token from both scopes.
    pub async fn clear(&self) -> bool {
        let mut cleared = true;
        for scope in LOOKUP_ORDER {
            cleared &= self.store.remove(scope, keys::CURRENT_USER).await;
            cleared &= self.store.remove(scope, keys::TOKEN).await;
        }
        cleared
    }
}
