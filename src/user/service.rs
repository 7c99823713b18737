use std::sync::Arc;

use crate::clock::Clock;
use crate::model::{ProfilePatch, Subscription, SubscriptionPlan, User};
use crate::storage::{Scope, SessionStore, keys};
use crate::user::{AuthGateway, LogoutRedirect, UserRepository};

/// Operations on the current user.
///
/// Every mutation reports `false` when nobody is signed in.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    clock: Arc<dyn Clock>,
    gateway: Arc<dyn AuthGateway>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(store: SessionStore, clock: Arc<dyn Clock>, gateway: Arc<dyn AuthGateway>) -> Self {
        Self {
            repo: UserRepository::new(store),
            clock,
            gateway,
        }
    }

    pub async fn is_logged_in(&self) -> bool {
        self.repo.exists().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.repo.locate().await.map(|(_, user)| user)
    }

    /// Store `user` as the current one, durable when `remember` is set.
    ///
    /// Stands in for the external login flow.
    pub async fn sign_in(&self, user: &User, remember: bool) -> bool {
        let scope = if remember { Scope::Durable } else { Scope::Session };
        let saved = self.repo.replace(scope, user).await;
        if saved {
            tracing::info!(user_id = %user.id, %scope, "user signed in");
        }
        saved
    }

    /// Shallow-merge `patch` into the current user, in its own scope.
    pub async fn update_profile(&self, patch: ProfilePatch) -> bool {
        let Some((scope, mut user)) = self.repo.locate().await else {
            tracing::warn!("profile update without current user");
            return false;
        };

        patch.apply(&mut user);
        user.last_updated = Some(self.clock.now());

        self.repo.save(scope, &user).await
    }

    /// Replace the subscription with an active one for `plan`.
    pub async fn add_subscription(&self, plan: SubscriptionPlan) -> bool {
        let Some((scope, mut user)) = self.repo.locate().await else {
            tracing::warn!("subscription without current user");
            return false;
        };

        let plan_id = plan.plan_id.clone();
        user.subscription = Some(Subscription::activate(plan, self.clock.now()));

        let saved = self.repo.save(scope, &user).await;
        if saved {
            tracing::info!(user_id = %user.id, %plan_id, "subscription activated");
        }
        saved
    }

    /// Sign out remotely (best-effort) and clear every local trace of the
    /// session. Returns where navigation should go from `origin`.
    pub async fn logout(&self, origin: &str) -> LogoutRedirect {
        if let Err(err) = self.gateway.sign_out().await {
            tracing::warn!(error = %err, "remote sign-out failed, clearing local session anyway");
        }

        if !self.repo.clear().await {
            tracing::error!("local session not fully cleared");
        }
        self.gateway.clear_authorization();

        let redirect = LogoutRedirect::from_origin(origin);
        tracing::info!(redirect = redirect.path(), "user signed out");
        redirect
    }

    /// Profile picture as a data URI.
    pub async fn profile_image(&self) -> Option<String> {
        let user = self.current_user().await?;
        self.store()
            .read(Scope::Durable, &keys::profile_image(&user.id))
            .await
    }

    pub async fn set_profile_image(&self, data_uri: &str) -> bool {
        let Some(user) = self.current_user().await else {
            return false;
        };
        self.store()
            .write(Scope::Durable, &keys::profile_image(&user.id), &data_uri)
            .await
    }

    fn store(&self) -> &SessionStore {
        self.repo.store()
    }
}
