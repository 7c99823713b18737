//! Paid content gating and course enrollment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::model::CourseId;
use crate::user::UserRepository;

/// How subscription expiry dates are treated when gating content.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPolicy {
    /// Active until explicitly deactivated, expiry date is informational.
    #[default]
    IgnoreExpiry,
    /// Also require the expiry date, when set, to be in the future.
    EnforceExpiry,
}

#[derive(Clone)]
pub struct EnrollmentManager {
    repo: UserRepository,
    clock: Arc<dyn Clock>,
    policy: SubscriptionPolicy,
}

impl EnrollmentManager {
    /// Create a new [`EnrollmentManager`].
    pub fn new(repo: UserRepository, clock: Arc<dyn Clock>, policy: SubscriptionPolicy) -> Self {
        Self { repo, clock, policy }
    }

    /// Enrolled course ids in enrollment order, empty without user.
    pub async fn enrolled_course_ids(&self) -> Vec<CourseId> {
        self.repo
            .locate()
            .await
            .map(|(_, user)| user.enrolled_courses)
            .unwrap_or_default()
    }

    pub async fn enrollment_date(&self, course_id: CourseId) -> Option<DateTime<Utc>> {
        let (_, user) = self.repo.locate().await?;
        user.enrollment_dates.get(&course_id).copied()
    }

    pub async fn has_active_subscription(&self) -> bool {
        let Some((_, user)) = self.repo.locate().await else {
            return false;
        };

        match user.subscription {
            Some(subscription) if subscription.is_active => match self.policy {
                SubscriptionPolicy::IgnoreExpiry => true,
                SubscriptionPolicy::EnforceExpiry => !subscription.is_expired(self.clock.now()),
            },
            _ => false,
        }
    }

    /// Record an enrollment. Enrolling twice is a successful no-op.
    pub async fn enroll(&self, course_id: CourseId) -> bool {
        let Some((scope, mut user)) = self.repo.locate().await else {
            tracing::warn!(course_id, "enrollment without current user");
            return false;
        };

        if user.is_enrolled(course_id) {
            return true;
        }

        user.enrolled_courses.push(course_id);
        user.enrollment_dates.insert(course_id, self.clock.now());

        let saved = self.repo.save(scope, &user).await;
        if saved {
            metrics::counter!("learner_enrollments_total").increment(1);
            tracing::info!(user_id = %user.id, course_id, "course enrolled");
        }
        saved
    }

    /// Gated content is visible with a subscription or an enrollment.
    pub async fn can_access(&self, course_id: CourseId) -> bool {
        self.has_active_subscription().await
            || self.enrolled_course_ids().await.contains(&course_id)
    }
}
