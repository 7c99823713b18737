//! Certificate issuance once a course is completed and its quiz passed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::model::{Certificate, Course, CourseId, User, completion_date};
use crate::progress::ProgressTracker;
use crate::quiz::QuizEngine;

const PREFIX: &str = "CERT";
const TIMESTAMP_DIGITS: i64 = 1_000_000;
const RANDOM_SUFFIX_LENGTH: usize = 8;
pub const DEFAULT_USER_PREFIX: usize = 5;

/// How the trailing part of a certificate id is produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStrategy {
    /// Random alphanumeric suffix.
    #[default]
    Random,
    /// Last six digits of the millisecond timestamp. Two certificates for the
    /// same course and user prefix can collide.
    Timestamp,
}

/// Build `CERT-<course>-<user prefix>-<suffix>`.
///
/// Pure: every call generates a new id, persisting it is up to the caller.
pub fn generate_id(
    course_id: CourseId,
    user_id: &str,
    user_prefix: usize,
    now: DateTime<Utc>,
    strategy: CertificateStrategy,
) -> String {
    let user: String = user_id.chars().take(user_prefix).collect();
    let suffix = match strategy {
        CertificateStrategy::Timestamp => {
            format!("{:06}", now.timestamp_millis().rem_euclid(TIMESTAMP_DIGITS))
        },
        CertificateStrategy::Random => Alphanumeric
            .sample_string(&mut OsRng, RANDOM_SUFFIX_LENGTH)
            .to_uppercase(),
    };

    format!("{PREFIX}-{course_id}-{user}-{suffix}")
}

#[derive(Clone)]
pub struct CertificateIssuer {
    progress: ProgressTracker,
    quiz: QuizEngine,
    clock: Arc<dyn Clock>,
    strategy: CertificateStrategy,
    user_prefix: usize,
}

impl CertificateIssuer {
    /// Create a new [`CertificateIssuer`].
    pub fn new(
        progress: ProgressTracker,
        quiz: QuizEngine,
        clock: Arc<dyn Clock>,
        strategy: CertificateStrategy,
    ) -> Self {
        Self {
            progress,
            quiz,
            clock,
            strategy,
            user_prefix: DEFAULT_USER_PREFIX,
        }
    }

    /// Number of user id characters kept in generated ids.
    pub fn user_prefix(mut self, length: usize) -> Self {
        self.user_prefix = length;
        self
    }

    /// Every lesson done and the latest quiz attempt passed.
    pub async fn is_eligible(&self, course_id: CourseId, course: &Course) -> bool {
        self.progress.is_course_completed(course_id, course).await
            && self
                .quiz
                .prior_result(course_id)
                .await
                .is_some_and(|result| result.passed)
    }

    /// Stored id, or a freshly generated one that is NOT persisted.
    /// Refused when not eligible.
    pub async fn certificate_id(
        &self,
        course_id: CourseId,
        course: &Course,
        user_id: &str,
    ) -> Option<String> {
        if !self.is_eligible(course_id, course).await {
            return None;
        }

        let result = self.quiz.prior_result(course_id).await?;
        Some(result.certificate_id.unwrap_or_else(|| {
            generate_id(course_id, user_id, self.user_prefix, self.clock.now(), self.strategy)
        }))
    }

    /// Certificate for `user`, with its id written back onto the quiz
    /// result so later views show the same one.
    pub async fn issue(
        &self,
        course_id: CourseId,
        course: &Course,
        user: &User,
    ) -> Option<Certificate> {
        if !self.is_eligible(course_id, course).await {
            tracing::debug!(course_id, user_id = %user.id, "certificate refused");
            return None;
        }

        let mut result = self.quiz.prior_result(course_id).await?;
        let certificate_id = match &result.certificate_id {
            Some(id) => id.clone(),
            None => {
                let id = generate_id(
                    course_id,
                    &user.id,
                    self.user_prefix,
                    self.clock.now(),
                    self.strategy,
                );
                result.certificate_id = Some(id.clone());
                if !self.quiz.save_result(course_id, &result).await {
                    tracing::warn!(course_id, "certificate id not persisted");
                } else {
                    metrics::counter!("learner_certificates_issued_total").increment(1);
                    tracing::info!(course_id, user_id = %user.id, %id, "certificate issued");
                }
                id
            },
        };

        Some(Certificate {
            certificate_id,
            issued_to: user.full_name.clone(),
            course_title: course.title.clone(),
            score: result.score,
            completion_date: completion_date(result.timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::catalog::tests::catalog;
    use crate::clock::FixedClock;
    use crate::model::{Answers, QuizScore};
    use crate::storage::SessionStore;

    struct Fixture {
        issuer: CertificateIssuer,
        progress: ProgressTracker,
        quiz: QuizEngine,
        clock: Arc<FixedClock>,
    }

    fn fixture(strategy: CertificateStrategy) -> Fixture {
        let store = SessionStore::in_memory();
        let clock = Arc::new(FixedClock::default_instant());
        let progress = ProgressTracker::new(store.clone());
        let quiz = QuizEngine::new(store, clock.clone());
        let issuer = CertificateIssuer::new(progress.clone(), quiz.clone(), clock.clone(), strategy);

        Fixture {
            issuer,
            progress,
            quiz,
            clock,
        }
    }

    fn learner() -> User {
        User {
            id: "ada42lovelace".into(),
            full_name: "Ada Lovelace".into(),
            ..Default::default()
        }
    }

    async fn complete_course(progress: &ProgressTracker) {
        for id in ["1-1", "1-2", "2-1"] {
            progress.toggle_lesson(1, id.into()).await;
        }
    }

    fn outcome(passed: bool) -> QuizScore {
        QuizScore {
            score: if passed { 100 } else { 33 },
            correct_answers: if passed { 3 } else { 1 },
            total_questions: 3,
            passed,
        }
    }

    #[test]
    fn test_timestamp_id_format() {
        let now = Utc.timestamp_millis_opt(1_760_866_200_123).unwrap();
        let id = generate_id(7, "abcdefgh", 5, now, CertificateStrategy::Timestamp);
        assert_eq!(id, "CERT-7-abcde-200123");

        // Short user ids are kept whole.
        let id = generate_id(7, "ab", 5, now, CertificateStrategy::Timestamp);
        assert_eq!(id, "CERT-7-ab-200123");
    }

    #[test]
    fn test_random_id_format() {
        let now = Utc::now();
        let id = generate_id(3, "abcdefgh", 5, now, CertificateStrategy::Random);
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts[..3], ["CERT", "3", "abcde"]);
        assert_eq!(parts[3].len(), RANDOM_SUFFIX_LENGTH);
        assert!(parts[3].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_refused_until_quiz_passed() {
        let fixture = fixture(CertificateStrategy::Random);
        let catalog = catalog();
        let course = catalog.course(1).unwrap();
        let user = learner();

        // Nothing done.
        assert!(fixture.issuer.issue(1, course, &user).await.is_none());

        // Quiz passed but lessons missing.
        fixture.quiz.submit(1, outcome(true), Answers::new(), 10).await;
        assert!(fixture.issuer.certificate_id(1, course, &user.id).await.is_none());

        // Lessons done but latest attempt failed.
        complete_course(&fixture.progress).await;
        fixture.quiz.submit(1, outcome(false), Answers::new(), 10).await;
        assert!(!fixture.issuer.is_eligible(1, course).await);
        assert!(fixture.issuer.issue(1, course, &user).await.is_none());

        fixture.quiz.submit(1, outcome(true), Answers::new(), 10).await;
        assert!(fixture.issuer.is_eligible(1, course).await);
        assert!(fixture.issuer.issue(1, course, &user).await.is_some());
    }

    #[tokio::test]
    async fn test_issued_id_is_stable() {
        let fixture = fixture(CertificateStrategy::Timestamp);
        let catalog = catalog();
        let course = catalog.course(1).unwrap();
        let user = learner();
        complete_course(&fixture.progress).await;
        fixture.quiz.submit(1, outcome(true), Answers::new(), 10).await;

        // Generated but not stored: peeking twice at different times differs.
        let peek = fixture.issuer.certificate_id(1, course, &user.id).await.unwrap();
        fixture.clock.advance(Duration::milliseconds(7));
        let second_peek = fixture.issuer.certificate_id(1, course, &user.id).await.unwrap();
        assert_ne!(peek, second_peek);

        let certificate = fixture.issuer.issue(1, course, &user).await.unwrap();
        fixture.clock.advance(Duration::days(2));
        let again = fixture.issuer.issue(1, course, &user).await.unwrap();

        assert_eq!(certificate, again);
        assert!(certificate.certificate_id.starts_with("CERT-1-ada42-"));
        assert_eq!(certificate.issued_to, "Ada Lovelace");
        assert_eq!(certificate.course_title, "Rust for Beginners");
        assert_eq!(certificate.score, 100);
        assert_eq!(certificate.completion_date, "October 19, 2026");
        assert_eq!(
            fixture.issuer.certificate_id(1, course, &user.id).await,
            Some(certificate.certificate_id.clone())
        );
        assert_eq!(
            fixture.quiz.prior_result(1).await.unwrap().certificate_id,
            Some(certificate.certificate_id)
        );
    }

    #[tokio::test]
    async fn test_new_attempt_drops_certificate_id() {
        let fixture = fixture(CertificateStrategy::Random);
        let catalog = catalog();
        let course = catalog.course(1).unwrap();
        let user = learner();
        complete_course(&fixture.progress).await;

        fixture.quiz.submit(1, outcome(true), Answers::new(), 10).await;
        let first = fixture.issuer.issue(1, course, &user).await.unwrap();

        fixture.quiz.submit(1, outcome(true), Answers::new(), 10).await;
        let second = fixture.issuer.issue(1, course, &user).await.unwrap();

        assert_ne!(first.certificate_id, second.certificate_id);
    }
}
