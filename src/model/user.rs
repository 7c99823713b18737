use std::collections::BTreeMap;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::CourseId;

/// The current user record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// Opaque, replaced wholesale on change.
    pub password: String,
    pub subscription: Option<Subscription>,
    /// Insertion order is enrollment order.
    pub enrolled_courses: Vec<CourseId>,
    pub enrollment_dates: BTreeMap<CourseId, DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl User {
    /// Whether `course_id` is in the enrollment list.
    pub fn is_enrolled(&self, course_id: CourseId) -> bool {
        self.enrolled_courses.contains(&course_id)
    }
}

/// Shallow patch applied by a profile edit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ProfilePatch {
    /// Merge present fields into `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
    }
}

/// Billing period of a plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    #[serde(alias = "monthly")]
    Month,
    #[serde(alias = "quarterly")]
    Quarter,
    #[serde(alias = "yearly", alias = "annual")]
    Year,
    Lifetime,
}

impl BillingPeriod {
    /// Expiry date of a subscription bought at `start`. `None` never expires.
    pub fn expiry_from(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match self {
            BillingPeriod::Month => 1,
            BillingPeriod::Quarter => 3,
            BillingPeriod::Year => 12,
            BillingPeriod::Lifetime => return None,
        };
        start.checked_add_months(Months::new(months))
    }
}

/// Plan picked on the pricing page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub plan_id: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub period: BillingPeriod,
    #[serde(default)]
    pub featured: bool,
}

/// Subscription embedded in [`User`]. At most one per user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan_id: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub period: BillingPeriod,
    #[serde(default)]
    pub featured: bool,
    pub purchase_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

impl Subscription {
    /// Activate `plan` at `now`.
    pub fn activate(plan: SubscriptionPlan, now: DateTime<Utc>) -> Self {
        Self {
            expiry_date: plan.period.expiry_from(now),
            plan_id: plan.plan_id,
            title: plan.title,
            price: plan.price,
            period: plan.period,
            featured: plan.featured,
            purchase_date: now,
            start_date: now,
            is_active: true,
        }
    }

    /// Whether the expiry date has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }
}
